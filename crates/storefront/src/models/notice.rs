//! User-facing notices.
//!
//! Flows report outcomes the shopper should see (success toasts, warnings,
//! errors) as [`Notice`] values pushed onto a [`NoticeSink`]. The front-end
//! owns the receiving half and decides how to render them.

use tokio::sync::mpsc;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    /// Lowercase label for display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A transient message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receiving half of a notice channel.
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Sending half of a notice channel.
///
/// Cloneable; a sink whose receiver has been dropped silently discards.
#[derive(Debug, Clone, Default)]
pub struct NoticeSink {
    tx: Option<mpsc::UnboundedSender<Notice>>,
}

impl NoticeSink {
    /// Create a connected sink and receiver pair.
    #[must_use]
    pub fn channel() -> (Self, NoticeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that only logs.
    #[must_use]
    pub const fn discard() -> Self {
        Self { tx: None }
    }

    /// Deliver a notice.
    pub fn emit(&self, notice: Notice) {
        tracing::debug!(level = notice.level.as_str(), message = %notice.message, "Notice");
        if let Some(tx) = &self.tx
            && tx.send(notice).is_err()
        {
            tracing::trace!("Notice receiver dropped");
        }
    }
}

/// Fixed notice texts.
pub mod messages {
    pub const ALREADY_IN_CART: &str =
        "Item already in cart. Use the cart sidebar to update quantity or remove item.";

    pub const LOGIN_REQUIRED: &str = "Login to add an item to the Cart";

    pub const CART_UNAVAILABLE: &str = "Could not fetch cart details. Check that the backend is running, reachable and returns valid JSON.";

    pub const LOGGED_IN: &str = "Logged in successfully";

    pub const REGISTERED: &str = "Registered successfully";

    pub const LOGGED_OUT: &str = "Logged out";
}
