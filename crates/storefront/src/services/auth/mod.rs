//! Authentication service.
//!
//! Validates login and registration forms locally, then calls the backend.
//! A successful login yields a [`Session`] that the caller passes into the
//! cart flow; nothing is stored globally.

mod error;
mod forms;

pub use error::{AuthError, ValidationError};
pub use forms::{LoginForm, MIN_FIELD_LENGTH, RegisterForm};

use tracing::{info, instrument};

use crate::backend::{ApiError, BackendClient, SERVICE_UNREACHABLE};
use crate::error::{
    add_breadcrumb, api_error_notice, clear_sentry_user, report_api_error, set_sentry_user,
};
use crate::models::notice::messages;
use crate::models::{Notice, NoticeSink, Session};

/// Authentication service.
///
/// This struct is cheaply cloneable; the backend client is `Arc`-backed.
#[derive(Clone)]
pub struct AuthService {
    client: BackendClient,
    notices: NoticeSink,
}

impl AuthService {
    #[must_use]
    pub const fn new(client: BackendClient, notices: NoticeSink) -> Self {
        Self { client, notices }
    }

    /// Log in with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is blank (no request is
    /// sent) and `AuthError::Api` if the backend refused or failed.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: &LoginForm) -> Result<Session, AuthError> {
        self.check(form.validate())?;

        let response = self
            .client
            .login(form.username.trim(), &form.password)
            .await
            .map_err(|err| self.fail("auth.login", err))?;

        set_sentry_user(&response.username);
        add_breadcrumb("auth", "Logged in", None);
        info!(username = %response.username, "Logged in");
        self.notices.emit(Notice::success(messages::LOGGED_IN));

        Ok(Session::from(response))
    }

    /// Register a new account.
    ///
    /// Registration does not log the shopper in; they continue at the login
    /// page.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the form is invalid (no request is
    /// sent) and `AuthError::Api` if the backend refused or failed, for
    /// example because the username is taken.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &RegisterForm) -> Result<(), AuthError> {
        self.check(form.validate())?;

        self.client
            .register(form.username.trim(), &form.password)
            .await
            .map_err(|err| self.fail("auth.register", err))?;

        add_breadcrumb("auth", "Registered", None);
        info!("Registered");
        self.notices.emit(Notice::success(messages::REGISTERED));
        Ok(())
    }

    /// End the session.
    ///
    /// Tokens are not revocable server-side, so this only forgets locally.
    #[must_use]
    pub fn logout(&self) -> Session {
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        self.notices.emit(Notice::info(messages::LOGGED_OUT));
        Session::Anonymous
    }

    fn check(&self, result: Result<(), ValidationError>) -> Result<(), AuthError> {
        result.map_err(|err| {
            self.notices.emit(Notice::warning(err.to_string()));
            AuthError::Validation(err)
        })
    }

    fn fail(&self, operation: &str, err: ApiError) -> AuthError {
        report_api_error(operation, &err);
        self.notices.emit(api_error_notice(&err, SERVICE_UNREACHABLE));
        AuthError::Api(err)
    }
}
