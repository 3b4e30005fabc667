//! Net-cafe design chat
//!
//! A chat widget served over HTTP that relays each message to a room-design
//! backend and shows the reply as text, a parameter table, or a downloadable
//! design image.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server rendering HTML fragments for HTMX
//! - **Widget**: view-model of the chat output, one per session
//! - **Backend**: client for the design service, decoded at the boundary
//!
//! # Modules
//!
//! - [`backend`]: design service client
//! - [`protocol`]: wire types and response decoding
//! - [`widget`]: chat view-model and submission flow
//! - [`render`]: HTML rendering of the widget
//! - [`session`]: per-tab sessions and their store

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod backend;
pub mod config;
pub mod error;
pub mod protocol;
pub mod render;
pub mod server;
pub mod session;
pub mod widget;

use crate::backend::ChatBackend;
use crate::config::AppConfig;

use session::SessionStore;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Design service client.
    pub backend: Arc<dyn ChatBackend>,
    /// Session store, one widget per browser tab.
    pub sessions: SessionStore,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
