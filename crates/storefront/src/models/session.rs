//! Session-related types.
//!
//! A [`Session`] is passed explicitly into every flow that needs to know who
//! is shopping. Nothing reads credentials from ambient global state.

use rust_decimal::Decimal;
use secrecy::SecretString;

use crate::backend::LoginResponse;

/// Identity of a logged-in shopper.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CurrentUser {
    /// Bearer token attached to cart calls.
    pub token: SecretString,
    /// Username as returned by the backend.
    pub username: String,
    /// Wallet balance at login time.
    pub balance: Decimal,
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish()
    }
}

/// Who the storefront is acting for.
#[derive(Debug, Clone, Default)]
pub enum Session {
    /// Browsing without an account; cart operations are refused locally.
    #[default]
    Anonymous,
    /// Logged in with a bearer token.
    Authenticated(CurrentUser),
}

impl Session {
    /// Build an authenticated session.
    #[must_use]
    pub fn authenticated(
        token: impl Into<SecretString>,
        username: impl Into<String>,
        balance: Decimal,
    ) -> Self {
        Self::Authenticated(CurrentUser {
            token: token.into(),
            username: username.into(),
            balance,
        })
    }

    /// The bearer token, if logged in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(&user.token),
        }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    /// The username, if logged in.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.user().map(|u| u.username.as_str())
    }

    /// Whether a bearer token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Self::Authenticated(CurrentUser {
            token: resp.token,
            username: resp.username,
            balance: resp.balance,
        })
    }
}

/// Environment keys used to carry a session between CLI invocations.
pub mod keys {
    /// Bearer token.
    pub const TOKEN: &str = "QKART_TOKEN";

    /// Username shown in greetings.
    pub const USERNAME: &str = "QKART_USERNAME";

    /// Wallet balance.
    pub const BALANCE: &str = "QKART_BALANCE";
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_anonymous_has_no_token() {
        let session = Session::default();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(session.username().is_none());
    }

    #[test]
    fn test_authenticated_exposes_token() {
        let session = Session::authenticated("tok-123", "crio.do", Decimal::from(5000));
        assert!(session.is_authenticated());
        assert_eq!(session.token().map(|t| t.expose_secret()), Some("tok-123"));
        assert_eq!(session.username(), Some("crio.do"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::authenticated("very-secret-token", "crio.do", Decimal::ZERO);
        let debug = format!("{session:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very-secret-token"));
    }
}
