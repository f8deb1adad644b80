//! Error reporting with Sentry integration.
//!
//! Flows never fail the process: every error becomes a [`Notice`] for the
//! shopper. Outages (transport failures, 5xx, malformed bodies) are also
//! captured to Sentry; structured client errors are expected traffic and
//! only logged.

use crate::backend::ApiError;
use crate::models::Notice;

/// Log an API error and capture it to Sentry if it is an outage.
pub fn report_api_error(operation: &str, err: &ApiError) {
    if err.is_client_error() {
        tracing::info!(operation, error = %err, "Backend rejected request");
        return;
    }

    let event_id = sentry::capture_error(err);
    tracing::error!(
        operation,
        error = %err,
        sentry_event_id = %event_id,
        "Backend request failed"
    );
}

/// Build the notice for an API error.
///
/// Structured client errors keep the server's text; anything else shows
/// `fallback`.
#[must_use]
pub fn api_error_notice(err: &ApiError, fallback: &str) -> Notice {
    if err.is_client_error() {
        Notice::error(err.user_message())
    } else {
        Notice::error(fallback)
    }
}

/// Set the Sentry user context from a username.
///
/// Call this after successful login to associate errors with users.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "KCRwjF7lN97HnEaY")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
