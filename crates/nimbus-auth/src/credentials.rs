use crate::error::AuthError;

/// Email/password pair submitted from the login screen
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Reject empty fields before anything goes over the network
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        Ok(())
    }
}

// Keep passwords out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fields of the registration screen
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub credentials: Credentials,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            credentials: Credentials::new(email, password),
            confirm_password: confirm_password.into(),
        }
    }

    /// Check the form and hand back the credentials to register with.
    ///
    /// The password confirmation is checked first, matching what the user
    /// sees on screen.
    pub fn into_credentials(self) -> Result<Credentials, AuthError> {
        if self.credentials.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        self.credentials.validate()?;
        Ok(self.credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_trimmed() {
        let creds = Credentials::new("  ana@example.com ", "pw");
        assert_eq!(creds.email, "ana@example.com");
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn test_empty_fields_rejected() {
        assert!(matches!(
            Credentials::new("", "pw").validate(),
            Err(AuthError::MissingField("email"))
        ));
        assert!(matches!(
            Credentials::new("a@b.c", "").validate(),
            Err(AuthError::MissingField("password"))
        ));
    }

    #[test]
    fn test_password_mismatch() {
        let form = RegistrationForm::new("a@b.c", "secret1", "secret2");
        assert!(matches!(form.into_credentials(), Err(AuthError::PasswordMismatch)));
    }

    #[test]
    fn test_matching_passwords() {
        let form = RegistrationForm::new("a@b.c", "secret1", "secret1");
        let creds = form.into_credentials().unwrap();
        assert_eq!(creds.email, "a@b.c");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("a@b.c", "hunter2");
        let out = format!("{:?}", creds);
        assert!(!out.contains("hunter2"));
    }
}
