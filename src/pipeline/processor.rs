//! Webhook message processor — the extraction pipeline orchestrator.
//!
//! Strictly linear flow: guard → command short-circuit → content assembly →
//! extraction → decode → validate → append → reply. No stage is retried and
//! nothing branches back. A failure before authorization (or with no
//! content) is dropped silently; a failure past it produces exactly one
//! user-facing reply. The transport ack is the webhook handler's job and
//! happens regardless of the outcome here.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::AccessGuard;
use crate::error::PipelineError;
use crate::extract::ExtractionModel;
use crate::extract::payload::{image_payload, text_payload};
use crate::extract::response::decode_candidate;
use crate::ledger::Ledger;
use crate::pipeline::types::{ContentPayload, InboundMessage, ValidatedRecord};
use crate::pipeline::validate::validate;
use crate::telegram::api::{FileFetcher, Notifier};

/// Fixed reply for `/start`.
const WELCOME_REPLY: &str = "🤖 **Bot is Ready!**\nType `15 Lunch` or send a receipt.";

/// Sent before the blocking photo download so the user sees progress.
const SCANNING_REPLY: &str = "👀 Scanning receipt...";

/// Reply when the candidate has no usable amount.
const NO_AMOUNT_REPLY: &str = "⚠️ I couldn't find an amount.";

/// Generic failure reply. Never carries internal error detail.
const ERROR_REPLY: &str = "⚠️ Error. Try '15 Lunch'";

/// Terminal success outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Record appended and confirmation sent.
    Saved(ValidatedRecord),
    /// `/start` handled with the fixed welcome reply.
    CommandHandled,
}

/// The pipeline orchestrator. All collaborators are injected seams so tests
/// can substitute fakes.
pub struct Processor {
    guard: AccessGuard,
    model: Arc<dyn ExtractionModel>,
    ledger: Arc<dyn Ledger>,
    notifier: Arc<dyn Notifier>,
    files: Arc<dyn FileFetcher>,
}

impl Processor {
    pub fn new(
        guard: AccessGuard,
        model: Arc<dyn ExtractionModel>,
        ledger: Arc<dyn Ledger>,
        notifier: Arc<dyn Notifier>,
        files: Arc<dyn FileFetcher>,
    ) -> Self {
        Self {
            guard,
            model,
            ledger,
            notifier,
            files,
        }
    }

    /// Process one inbound message to completion.
    ///
    /// Sends the user-facing reply (confirmation or error) itself; the
    /// returned result is for the caller's logging only.
    pub async fn process(&self, message: InboundMessage) -> Result<Outcome, PipelineError> {
        let trace_id = Uuid::new_v4();
        info!(
            %trace_id,
            chat_id = message.chat_id,
            has_text = message.text.is_some(),
            has_photo = message.photo_file_id.is_some(),
            "Processing inbound message"
        );

        // Authorization gate. Unauthorized senders are dropped silently.
        let sender = message.sender_id.map(|id| id.to_string());
        if !sender
            .as_deref()
            .is_some_and(|id| self.guard.is_allowed(id))
        {
            warn!(%trace_id, "Dropping message from unauthorized sender");
            return Err(PipelineError::Unauthorized);
        }

        // Command short-circuit: recognized commands get a fixed reply,
        // unrecognized ones are ignored. Neither reaches extraction.
        if let Some(command) = message.command() {
            if command == "/start" {
                self.notify(message.chat_id, WELCOME_REPLY).await;
                return Ok(Outcome::CommandHandled);
            }
            debug!(%trace_id, command, "Ignoring unrecognized command");
            return Err(PipelineError::NoContent);
        }

        match self.extract_and_persist(&message).await {
            Ok(record) => {
                let confirmation =
                    format!("✅ Saved *€{}* to *{}*", record.amount, record.category);
                self.notify(message.chat_id, &confirmation).await;
                info!(%trace_id, amount = %record.amount, "Expense saved");
                Ok(Outcome::Saved(record))
            }
            Err(e) => {
                if let Some(reply) = failure_reply(&e) {
                    self.notify(message.chat_id, reply).await;
                }
                warn!(%trace_id, error = %e, "Pipeline run failed");
                Err(e)
            }
        }
    }

    /// The content → extraction → validation → persistence stages.
    async fn extract_and_persist(
        &self,
        message: &InboundMessage,
    ) -> Result<ValidatedRecord, PipelineError> {
        let payload = self.content_payload(message).await?;
        let raw = self.model.generate(&payload).await?;
        let candidate = decode_candidate(&raw)?;
        let record = validate(candidate, message.display_name())?;
        self.ledger.append(&record).await?;
        Ok(record)
    }

    /// Assemble the content payload. A photo takes precedence over text.
    async fn content_payload(
        &self,
        message: &InboundMessage,
    ) -> Result<ContentPayload, PipelineError> {
        if let Some(file_id) = &message.photo_file_id {
            // The download is a blocking network hop with perceptible
            // latency; tell the user before starting it.
            self.notify(message.chat_id, SCANNING_REPLY).await;
            let bytes = self.files.fetch(file_id).await?;
            return Ok(image_payload(bytes));
        }
        if let Some(text) = message.text.as_deref() {
            return Ok(text_payload(text));
        }
        Err(PipelineError::NoContent)
    }

    /// Best-effort reply. A send failure is logged, never escalated — the
    /// webhook must still ack, and for a persisted record the row is
    /// already durable.
    async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.notifier.send(chat_id, text).await {
            warn!(error = %e, chat_id, "Failed to send reply");
        }
    }
}

/// The single user-facing reply for a failed run, or `None` for the
/// silent-drop cases.
fn failure_reply(error: &PipelineError) -> Option<&'static str> {
    match error {
        PipelineError::Unauthorized | PipelineError::NoContent => None,
        PipelineError::NoAmount => Some(NO_AMOUNT_REPLY),
        PipelineError::ContentUnavailable(_)
        | PipelineError::ExtractionFailed(_)
        | PipelineError::AppendFailed(_) => Some(ERROR_REPLY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_failures_have_no_reply() {
        assert_eq!(failure_reply(&PipelineError::Unauthorized), None);
        assert_eq!(failure_reply(&PipelineError::NoContent), None);
    }

    #[test]
    fn no_amount_gets_the_specific_reply() {
        let reply = failure_reply(&PipelineError::NoAmount).unwrap();
        assert!(reply.contains("couldn't find an amount"));
    }

    #[test]
    fn extraction_failure_gets_the_generic_reply() {
        let err = PipelineError::ExtractionFailed(crate::error::ExtractionError::RequestFailed {
            reason: "socket closed".into(),
        });
        let reply = failure_reply(&err).unwrap();
        // Safe for end users: no internal detail leaks into the reply.
        assert!(!reply.contains("socket closed"));
        assert!(reply.contains("Try '15 Lunch'"));
    }
}
