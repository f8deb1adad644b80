//! Login and registration forms.
//!
//! Forms are checked locally before any request is made. Checks run in field
//! order and stop at the first failure, so the shopper sees one message at a
//! time.

use secrecy::{ExposeSecret, SecretString};

use super::error::ValidationError;

/// Minimum username and password length at registration.
pub const MIN_FIELD_LENGTH: usize = 6;

/// Credentials entered on the login page.
pub struct LoginForm {
    pub username: String,
    pub password: SecretString,
}

impl LoginForm {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check that both fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.username) {
            return Err(ValidationError::UsernameRequired);
        }
        if is_blank(self.password.expose_secret()) {
            return Err(ValidationError::PasswordRequired);
        }
        Ok(())
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Fields entered on the registration page.
pub struct RegisterForm {
    pub username: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl RegisterForm {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<SecretString>,
        confirm_password: impl Into<SecretString>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Check presence, minimum lengths and that the passwords match.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.username) {
            return Err(ValidationError::UsernameRequired);
        }
        if char_len(&self.username) < MIN_FIELD_LENGTH {
            return Err(ValidationError::UsernameTooShort {
                min: MIN_FIELD_LENGTH,
            });
        }

        let password = self.password.expose_secret();
        if is_blank(password) {
            return Err(ValidationError::PasswordRequired);
        }
        if char_len(password) < MIN_FIELD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_FIELD_LENGTH,
            });
        }
        if password != self.confirm_password.expose_secret() {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn register(username: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm::new(username, password, confirm)
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(
            LoginForm::new("  ", "secret").validate(),
            Err(ValidationError::UsernameRequired)
        );
        assert_eq!(
            LoginForm::new("crio.do", "").validate(),
            Err(ValidationError::PasswordRequired)
        );
        assert_eq!(LoginForm::new("crio.do", "x").validate(), Ok(()));
    }

    #[test]
    fn test_register_checks_in_field_order() {
        assert_eq!(
            register("", "", "").validate(),
            Err(ValidationError::UsernameRequired)
        );
        assert_eq!(
            register("crio", "", "").validate(),
            Err(ValidationError::UsernameTooShort { min: 6 })
        );
        assert_eq!(
            register("crio.do", "", "").validate(),
            Err(ValidationError::PasswordRequired)
        );
        assert_eq!(
            register("crio.do", "12345", "12345").validate(),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        assert_eq!(
            register("crio.do", "learnbydoing", "learnbydoin").validate(),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            register("crio.do", "learnbydoing", "learnbydoing").validate(),
            Ok(())
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert_eq!(register("ünïcødé", "пароль", "пароль").validate(), Ok(()));
    }

    #[test]
    fn test_messages_match_form_copy() {
        assert_eq!(
            ValidationError::UsernameTooShort { min: 6 }.to_string(),
            "Username must be at least 6 characters"
        );
        assert_eq!(
            ValidationError::PasswordMismatch.to_string(),
            "Passwords do not match"
        );
    }

    #[test]
    fn test_login_and_register_share_required_copy() {
        let login = LoginForm::new("", "secret").validate().unwrap_err();
        let register = register("", "secret", "secret").validate().unwrap_err();
        assert_eq!(login.to_string(), "Username is a required field");
        assert_eq!(login.to_string(), register.to_string());
        assert_eq!(
            ValidationError::PasswordRequired.to_string(),
            "Password is a required field"
        );
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let debug = format!("{:?}", register("crio.do", "hunter22", "hunter22"));
        assert!(!debug.contains("hunter22"));
    }
}
