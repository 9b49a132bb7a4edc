//! Screen state machine (login/register/dashboard).
//!
//! Every screen change goes through `Screen::on`, so an unknown screen
//! cannot be reached.

/// Top-level screen shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Login,
    Register,
    Dashboard,
}

/// User or session events that may move between screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    SwitchToRegister,
    SwitchToLogin,
    Authenticated,
    SignedOut,
}

impl Screen {
    /// Screen shown at launch: straight to the dashboard when a session was restored.
    pub fn initial(has_session: bool) -> Self {
        if has_session {
            Screen::Dashboard
        } else {
            Screen::Login
        }
    }

    /// State after processing `event`. Events that make no sense on the
    /// current screen leave it unchanged.
    pub fn on(self, event: ScreenEvent) -> Self {
        match (self, event) {
            (Screen::Login, ScreenEvent::SwitchToRegister) => Screen::Register,
            (Screen::Register, ScreenEvent::SwitchToLogin) => Screen::Login,
            (Screen::Login | Screen::Register, ScreenEvent::Authenticated) => Screen::Dashboard,
            (Screen::Dashboard, ScreenEvent::SignedOut) => Screen::Login,
            (screen, _) => screen,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Register => "Register",
            Screen::Dashboard => "Dashboard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_screen_follows_session() {
        assert_eq!(Screen::initial(true), Screen::Dashboard);
        assert_eq!(Screen::initial(false), Screen::Login);
    }

    #[test]
    fn login_and_register_toggle() {
        let s = Screen::Login.on(ScreenEvent::SwitchToRegister);
        assert_eq!(s, Screen::Register);
        assert_eq!(s.on(ScreenEvent::SwitchToLogin), Screen::Login);
    }

    #[test]
    fn authentication_leads_to_dashboard() {
        assert_eq!(Screen::Login.on(ScreenEvent::Authenticated), Screen::Dashboard);
        assert_eq!(Screen::Register.on(ScreenEvent::Authenticated), Screen::Dashboard);
    }

    #[test]
    fn sign_out_returns_to_login() {
        assert_eq!(Screen::Dashboard.on(ScreenEvent::SignedOut), Screen::Login);
    }

    #[test]
    fn irrelevant_events_are_ignored() {
        assert_eq!(Screen::Dashboard.on(ScreenEvent::SwitchToRegister), Screen::Dashboard);
        assert_eq!(Screen::Dashboard.on(ScreenEvent::Authenticated), Screen::Dashboard);
        assert_eq!(Screen::Login.on(ScreenEvent::SignedOut), Screen::Login);
        assert_eq!(Screen::Register.on(ScreenEvent::SwitchToRegister), Screen::Register);
    }
}
