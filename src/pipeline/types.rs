//! Shared types for the extraction pipeline.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

// ── Inbound message ─────────────────────────────────────────────────

/// Unified inbound message, built once per webhook update and immutable.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Chat to reply into.
    pub chat_id: i64,
    /// Sender id; absent for updates without a `from` (channel posts etc.).
    pub sender_id: Option<i64>,
    /// Human-readable sender name, when Telegram provides one.
    pub sender_name: Option<String>,
    /// Raw message text.
    pub text: Option<String>,
    /// File id of the largest photo size, if the message carries a photo.
    pub photo_file_id: Option<String>,
}

impl InboundMessage {
    /// The command carried by this message, if the text starts with `/`.
    pub fn command(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| t.starts_with('/'))
    }

    /// Display name used for the ledger's submitter column.
    pub fn display_name(&self) -> &str {
        self.sender_name.as_deref().unwrap_or("User")
    }
}

// ── Content payload ─────────────────────────────────────────────────

/// The single content modality of a message.
#[derive(Debug, Clone)]
pub enum ContentBody {
    /// Free text, already wrapped with the input directive.
    Text(String),
    /// Downloaded photo bytes plus the sniffed mime type.
    Image { mime_type: String, bytes: Vec<u8> },
}

/// What gets sent to the extraction model: the per-call instruction block
/// plus exactly one content modality.
#[derive(Debug, Clone)]
pub struct ContentPayload {
    pub instructions: String,
    pub body: ContentBody,
}

// ── Candidate record (untrusted) ────────────────────────────────────

/// Raw decode target for the model's JSON output.
///
/// Every field is optional and loosely typed. This is model-influenced
/// input; it carries no invariants until it passes the validator, and it is
/// never written anywhere in this form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CandidateRecord {
    /// Amount as the model produced it: number, numeric string, or absent.
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

// ── Validated record (trusted) ──────────────────────────────────────

/// Category assigned when the model omits one.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Merchant assigned when the model omits one.
pub const FALLBACK_MERCHANT: &str = "Unknown";

/// A record that passed the amount gate — the only type ever written to
/// the ledger. Constructed exclusively by `pipeline::validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    /// Strictly positive amount.
    pub amount: Decimal,
    pub category: String,
    pub merchant: String,
    pub note: String,
    /// Capture time of processing, not of the original message.
    pub timestamp: DateTime<Utc>,
    /// Submitter display name.
    pub submitter: String,
}

impl ValidatedRecord {
    /// The fixed-order ledger row:
    /// timestamp, amount, category, merchant, note, submitter.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            self.amount.to_string(),
            self.category.clone(),
            self.merchant.clone(),
            self.note.clone(),
            self.submitter.clone(),
        ]
    }
}
