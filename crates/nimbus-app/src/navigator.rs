use std::sync::Arc;

use nimbus_core::{Screen, ScreenEvent};
use parking_lot::Mutex;

/// Current screen, shared between the auth flow and the dashboard.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    screen: Arc<Mutex<Screen>>,
}

impl Navigator {
    pub fn new(initial: Screen) -> Self {
        Self {
            screen: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn current(&self) -> Screen {
        *self.screen.lock()
    }

    /// Apply `event` and return the resulting screen
    pub fn dispatch(&self, event: ScreenEvent) -> Screen {
        let mut screen = self.screen.lock();
        let next = screen.on(event);
        if next != *screen {
            tracing::info!("Screen {} -> {}", screen.title(), next.title());
        }
        *screen = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let nav = Navigator::new(Screen::Login);
        let other = nav.clone();

        assert_eq!(nav.dispatch(ScreenEvent::SwitchToRegister), Screen::Register);
        assert_eq!(other.current(), Screen::Register);
    }

    #[test]
    fn ignored_events_keep_screen() {
        let nav = Navigator::new(Screen::Dashboard);
        assert_eq!(nav.dispatch(ScreenEvent::SwitchToRegister), Screen::Dashboard);
    }
}
