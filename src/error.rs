//! Error types for Expense Bot.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Telegram Bot API errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message to chat {chat_id}: {reason}")]
    SendFailed { chat_id: i64, reason: String },

    #[error("Failed to fetch file {file_id}: {reason}")]
    FileFetchFailed { file_id: String, reason: String },
}

/// Extraction service errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Extraction request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Extraction service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid extraction response: {reason}")]
    InvalidResponse { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ledger append errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Append failed: {reason}")]
    AppendFailed { reason: String },

    #[error("Ledger API returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Pipeline-stage errors.
///
/// Each variant maps to exactly one user-facing outcome in the processor:
/// `Unauthorized` and `NoContent` are silent drops, everything else gets
/// one reply that never carries internal error detail.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Sender is not on the allow-list.
    #[error("Sender not authorized")]
    Unauthorized,

    /// Message carries neither a recognized command, text, nor a photo.
    #[error("Message has no actionable content")]
    NoContent,

    /// The photo could not be resolved to bytes.
    #[error("Content unavailable: {0}")]
    ContentUnavailable(#[from] ChannelError),

    /// The AI call or the response decode failed. Never retried.
    #[error("Extraction failed: {0}")]
    ExtractionFailed(#[from] ExtractionError),

    /// The decoded candidate has no usable positive amount.
    #[error("No usable amount in candidate record")]
    NoAmount,

    /// The validated record could not be appended to the ledger.
    #[error("Ledger append failed: {0}")]
    AppendFailed(#[from] LedgerError),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
