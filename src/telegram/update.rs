//! Inbound update schema for the Telegram webhook.

use serde::Deserialize;

use crate::pipeline::types::InboundMessage;

/// One webhook call delivers one update.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    #[serde(default)]
    pub update_id: Option<i64>,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub chat: TelegramChat,
    pub from: Option<TelegramUser>,
    pub text: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: Option<String>,
}

/// One entry of the `photo` size array. Telegram orders the sizes smallest
/// to largest; the last entry is the full-resolution one.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
}

impl TelegramUpdate {
    /// Convert the update into the pipeline's inbound message.
    ///
    /// Returns `None` when the update carries no `message` — edited
    /// messages, channel posts and other update kinds are not handled.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let msg = self.message?;
        let from = msg.from;
        Some(InboundMessage {
            chat_id: msg.chat.id,
            sender_id: from.as_ref().map(|f| f.id),
            sender_name: from.and_then(|f| f.first_name),
            text: msg.text,
            photo_file_id: msg
                .photo
                .and_then(|sizes| sizes.into_iter().next_back())
                .map(|s| s.file_id),
        })
    }
}
