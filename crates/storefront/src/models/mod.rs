//! Domain models for the storefront.
//!
//! - [`session`] - who is shopping (anonymous or bearer-token user)
//! - [`notice`] - transient messages for the shopper

pub mod notice;
pub mod session;

pub use notice::{Notice, NoticeLevel, NoticeReceiver, NoticeSink};
pub use session::{CurrentUser, Session};
