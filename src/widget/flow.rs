//! Send a submission to the backend and render its outcome.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{Submission, SubmissionState};
use crate::backend::ChatBackend;
use crate::error::ChatError;
use crate::session::Session;

/// Show the typing placeholder, then exchange the message with the backend
/// on a spawned task and render whatever comes back.
///
/// The placeholder is in the widget by the time this returns. The returned
/// handle resolves to the settled state; dropping it does not cancel the
/// request.
pub fn send_and_render(
    session: &Session,
    backend: Arc<dyn ChatBackend>,
    submission: Submission,
) -> JoinHandle<Option<SubmissionState>> {
    session.update(|w| w.begin(submission.id));

    let session = session.clone();
    tokio::spawn(async move {
        let Submission { id, message, .. } = submission;
        // A panicking backend must still settle the placeholder.
        let exchange = tokio::spawn(async move { backend.send(&message).await });
        let outcome = exchange.await.unwrap_or_else(|err| Err(ChatError::from(err)));

        if let Err(err) = &outcome {
            warn!(
                name: "chat.backend.failed",
                session_id = %session.id(),
                submission = %id,
                error = %err,
                "Backend exchange failed"
            );
        }

        let state = session.update(|w| w.complete(id, outcome));
        info!(
            name: "chat.submission.settled",
            session_id = %session.id(),
            submission = %id,
            state = ?state,
            "Submission settled"
        );
        state
    })
}
