//! Session management.
//!
//! Each browser tab owns one [`Session`], which wraps the tab's
//! [`ChatWidget`](crate::widget::ChatWidget). Sessions live in memory only
//! and are swept once idle for longer than the configured timeout.
//!
//! # Example
//!
//! ```rust
//! use netcafe_chat::session::SessionStore;
//!
//! let store = SessionStore::new();
//! let session = store.create();
//! let submission = session.update(|w| w.submit("2 bàn"));
//!
//! assert!(submission.is_some());
//! assert_eq!(session.read(|w| w.entries().len()), 1);
//! ```

mod store;

pub use store::{DEFAULT_SESSION_TIMEOUT, Session, SessionStore};
