use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::document::MapDocument;

/// What a surface reports after being handed a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Loaded,
    Error {
        code: i32,
        description: String,
        url: Option<String>,
    },
}

/// Something that can show a map page.
///
/// Surfaces that finish loading inside `display` return the outcome
/// directly. Asynchronous ones return `None` and later report through
/// `OverlaySelector::on_surface_event`.
pub trait RenderSurface: Send + Sync {
    fn display(&self, document: &MapDocument) -> Option<SurfaceEvent>;
}

/// Writes each page to a file, replacing the previous one.
///
/// Open the file in a browser to view the map.
#[derive(Debug, Clone)]
pub struct FileSurface {
    path: PathBuf,
}

impl FileSurface {
    /// Error code reported when the page cannot be written
    pub const WRITE_FAILED: i32 = -1;

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, html: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create map directory")?;
        }
        fs::write(&self.path, html).context("Failed to write map page")?;
        Ok(())
    }
}

impl RenderSurface for FileSurface {
    fn display(&self, document: &MapDocument) -> Option<SurfaceEvent> {
        match self.write(document.html()) {
            Ok(()) => {
                tracing::debug!(target: "map", "Wrote {} map to {:?}", document.layer(), self.path);
                Some(SurfaceEvent::Loaded)
            }
            Err(e) => Some(SurfaceEvent::Error {
                code: Self::WRITE_FAILED,
                description: format!("{:#}", e),
                url: Some(self.path.display().to_string()),
            }),
        }
    }
}
