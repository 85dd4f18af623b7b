//! Sender authorization against a static allow-list.

/// Allow-list gate checked before any processing.
///
/// Rejection is silent by policy: the webhook acks the update and sends no
/// reply, so the bot's existence is never leaked to unknown senders.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    allowed_users: Vec<String>,
}

impl AccessGuard {
    pub fn new(allowed_users: Vec<String>) -> Self {
        Self { allowed_users }
    }

    /// Check if a sender identity is in the allowed list.
    /// A `*` entry allows everyone.
    pub fn is_allowed(&self, sender_id: &str) -> bool {
        self.allowed_users.iter().any(|u| u == "*" || u == sender_id)
    }
}
