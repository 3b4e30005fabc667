//! The chat widget view-model.

use std::collections::HashMap;

use tracing::warn;

use super::model::{
    CONFIRM_PROMPT, ChatMessage, DESIGN_READY_TEXT, Entry, EntryId, ImageView, ParameterTable,
    SubmissionId, ViewEntry,
};
use crate::error::ChatError;
use crate::protocol::ServerResponse;

/// Lifecycle of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// Request issued, placeholder showing.
    AwaitingResponse,
    /// Reply rendered.
    Rendered,
    /// Error message rendered.
    Errored,
}

/// An accepted user message waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Correlation token.
    pub id: SubmissionId,
    /// Trimmed message text.
    pub message: String,
    /// The user message entry this submission created.
    pub entry: EntryId,
}

/// Ordered chat output plus the input draft.
///
/// Entries are only ever appended, except typing placeholders, which are
/// removed when their submission settles.
#[derive(Debug, Default)]
pub struct ChatWidget {
    entries: Vec<Entry>,
    input: String,
    next_entry: u64,
    submissions: HashMap<SubmissionId, SubmissionState>,
}

impl ChatWidget {
    /// Create an empty widget.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Current input draft.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input draft.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// State of a submission, `None` when unknown.
    #[must_use]
    pub fn submission_state(&self, id: SubmissionId) -> Option<SubmissionState> {
        self.submissions.get(&id).copied()
    }

    /// Number of typing placeholders in the output.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_placeholder()).count()
    }

    /// Entries rendered as the outcome of a submission.
    pub fn outcome(&self, id: SubmissionId) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .filter(move |e| e.reply_to == Some(id) && !e.is_placeholder())
    }

    /// Entries created by a submission: its user message, then either the
    /// placeholder or the outcome.
    pub fn submission_entries(&self, submission: &Submission) -> impl Iterator<Item = &Entry> {
        let (entry, id) = (submission.entry, submission.id);
        self.entries
            .iter()
            .filter(move |e| e.id == entry || e.reply_to == Some(id))
    }

    /// Look up a design image by id.
    #[must_use]
    pub fn image(&self, id: uuid::Uuid) -> Option<&ImageView> {
        self.entries.iter().find_map(|e| match &e.view {
            ViewEntry::Image(image) if image.id == id => Some(image),
            _ => None,
        })
    }

    /// Accept a line of input.
    ///
    /// Whitespace-only input is ignored and the draft is kept. Otherwise the
    /// trimmed text is appended as a user message, the draft is cleared and
    /// the returned submission must be passed to [`super::send_and_render`].
    pub fn submit(&mut self, raw_input: &str) -> Option<Submission> {
        let message = raw_input.trim();
        if message.is_empty() {
            self.input = raw_input.to_string();
            return None;
        }

        let entry = self.push(None, ViewEntry::Message(ChatMessage::user(message)));
        self.input.clear();

        Some(Submission {
            id: SubmissionId::new(),
            message: message.to_string(),
            entry,
        })
    }

    /// Show the typing placeholder for a submission about to be sent.
    ///
    /// Calling it twice for the same submission keeps a single placeholder.
    pub fn begin(&mut self, id: SubmissionId) -> EntryId {
        if let Some(existing) = self.placeholder_of(id) {
            return existing;
        }
        self.submissions.insert(id, SubmissionState::AwaitingResponse);
        self.push(Some(id), ViewEntry::Message(ChatMessage::typing()))
    }

    /// Render the outcome of a submission.
    ///
    /// The placeholder is removed before anything is appended. Settling an
    /// unknown or already settled submission changes nothing.
    pub fn complete(
        &mut self,
        id: SubmissionId,
        outcome: Result<ServerResponse, ChatError>,
    ) -> Option<SubmissionState> {
        if self.submission_state(id) != Some(SubmissionState::AwaitingResponse) {
            warn!(
                name: "chat.submission.unexpected",
                submission = %id,
                "Ignoring outcome for a submission that is not awaiting a response"
            );
            return None;
        }

        self.entries
            .retain(|e| !(e.reply_to == Some(id) && e.is_placeholder()));

        let state = match outcome {
            Ok(ServerResponse::Text { message }) => {
                self.push(Some(id), ViewEntry::Message(ChatMessage::bot(message)));
                SubmissionState::Rendered
            }
            Ok(ServerResponse::Parameters {
                message,
                parameters,
            }) => {
                self.push(Some(id), ViewEntry::Message(ChatMessage::bot(message)));
                self.push(
                    Some(id),
                    ViewEntry::Table(ParameterTable::from_parameters(&parameters)),
                );
                self.push(
                    Some(id),
                    ViewEntry::Message(ChatMessage::bot(CONFIRM_PROMPT)),
                );
                SubmissionState::Rendered
            }
            Ok(ServerResponse::Binary { image }) => {
                self.push(Some(id), ViewEntry::Image(ImageView::new(image)));
                self.push(
                    Some(id),
                    ViewEntry::Message(ChatMessage::bot(DESIGN_READY_TEXT)),
                );
                SubmissionState::Rendered
            }
            Err(err) => {
                self.push(
                    Some(id),
                    ViewEntry::Message(ChatMessage::error(err.chat_text())),
                );
                SubmissionState::Errored
            }
        };

        self.submissions.insert(id, state);
        Some(state)
    }

    fn placeholder_of(&self, id: SubmissionId) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|e| e.reply_to == Some(id) && e.is_placeholder())
            .map(|e| e.id)
    }

    fn push(&mut self, reply_to: Option<SubmissionId>, view: ViewEntry) -> EntryId {
        let id = EntryId(self.next_entry);
        self.next_entry += 1;
        self.entries.push(Entry { id, reply_to, view });
        id
    }
}
