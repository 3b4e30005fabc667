//! The chat widget.
//!
//! A [`ChatWidget`] is the view-model of one chat window: an ordered list of
//! [`Entry`] values (messages, parameter tables, design images) plus the
//! input draft. Rendering it to HTML lives in [`crate::render`].
//!
//! # Lifecycle of a submission
//!
//! 1. [`ChatWidget::submit`] appends the user message and hands back a
//!    [`Submission`] carrying a fresh [`SubmissionId`].
//! 2. [`send_and_render`] shows a typing placeholder tagged with that id and
//!    spawns the backend exchange.
//! 3. [`ChatWidget::complete`] removes the placeholder and appends the
//!    outcome entries, all tagged with the same id.
//!
//! Submissions may overlap and settle in any order.

mod flow;
mod model;
mod state;

pub use flow::send_and_render;
pub use model::{
    CONFIRM_PROMPT, ChatMessage, DESIGN_ALT_TEXT, DESIGN_FILE_NAME, DESIGN_READY_TEXT, Entry,
    EntryId, ImageView, MessageKind, ParameterTable, Sender, SubmissionId, TABLE_HEADERS,
    TYPING_TEXT, ViewEntry, entity_label,
};
pub use state::{ChatWidget, Submission, SubmissionState};
