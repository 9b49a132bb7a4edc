use std::sync::Arc;

use anyhow::Result;
use nimbus_app::AppServices;
use nimbus_core::Config;
use nimbus_map::FileSurface;

fn main() -> Result<()> {
    // Initialize core
    nimbus_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let services = AppServices::new(config)?;

    tracing::info!("Nimbus application started");

    println!("Nimbus - weather map and location sharing");
    println!("\nConfiguration:");
    println!("  Config directory: {}", services.config().config_dir.display());

    match services.session().current() {
        Some(session) => println!("  Signed in as:     {}", session.email),
        None => println!("  Signed in as:     (nobody)"),
    }
    println!("  Screen:           {}", services.screen().title());
    if services.store().is_offline() {
        println!("  Store:            in memory (offline)");
    } else {
        println!("  Store:            {}", services.config().store.base_url);
    }

    let map_path = services.config().config_dir.join("map.html");
    let surface = Arc::new(FileSurface::new(&map_path));
    match services.overlay_selector(surface) {
        Ok(selector) => {
            let document = selector.render();
            match selector.last_error() {
                None => println!(
                    "  Map ({}):  {}",
                    document.layer().label(),
                    map_path.display()
                ),
                Some(e) => println!("  Map:              {}", e.user_message()),
            }
        }
        Err(e) => {
            tracing::warn!("Map not rendered: {}", e);
            println!("  Map:              {}", e.user_message());
        }
    }

    // Graceful shutdown
    services.shutdown();

    Ok(())
}
