//! Telegram Bot API client — outbound replies and file retrieval.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ChannelError;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Outbound reply seam.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), ChannelError>;
}

/// File retrieval seam — resolves a Telegram file id to its bytes.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, ChannelError>;
}

/// Bot API client used for both seams in production.
pub struct TelegramApi {
    bot_token: SecretString,
    client: reqwest::Client,
}

impl TelegramApi {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }

    fn file_url(&self, file_path: &str) -> String {
        format!(
            "https://api.telegram.org/file/bot{}/{file_path}",
            self.bot_token.expose_secret()
        )
    }

    /// Send a text message, splitting anything over Telegram's 4096 char
    /// limit. Replies normally fit in one chunk, but category and merchant
    /// text echoed in confirmations is model-influenced and unbounded.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        let chunks = split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH);
        for chunk in &chunks {
            self.send_message_chunk(chat_id, chunk).await?;
        }
        Ok(())
    }

    /// Send a single chunk. Markdown is attempted first; Telegram rejects
    /// the whole message when entity parsing fails, so a rejected chunk is
    /// resent as plain text.
    async fn send_message_chunk(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        let markdown = self
            .post_send_message(chat_id, text, Some("Markdown"))
            .await?;
        if markdown.status().is_success() {
            return Ok(());
        }

        let markdown_status = markdown.status();
        tracing::warn!(
            status = ?markdown_status,
            chat_id,
            "Markdown reply rejected; resending as plain text"
        );

        let plain = self.post_send_message(chat_id, text, None).await?;
        if plain.status().is_success() {
            return Ok(());
        }

        let detail = plain.text().await.unwrap_or_default();
        Err(ChannelError::SendFailed {
            chat_id,
            reason: format!("sendMessage failed (markdown: {markdown_status}, plain: {detail})"),
        })
    }

    async fn post_send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<reqwest::Response, ChannelError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = serde_json::Value::String(mode.to_string());
        }

        self.client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                chat_id,
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl Notifier for TelegramApi {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        self.send_message(chat_id, text).await
    }
}

#[async_trait]
impl FileFetcher for TelegramApi {
    /// Resolve a file id via getFile, then download the binary content.
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, ChannelError> {
        let fail = |reason: String| ChannelError::FileFetchFailed {
            file_id: file_id.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(self.api_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let info: GetFileResponse = resp.json().await.map_err(|e| fail(e.to_string()))?;
        if !info.ok {
            return Err(fail("getFile returned ok=false".to_string()));
        }
        let file_path = info
            .result
            .and_then(|r| r.file_path)
            .ok_or_else(|| fail("getFile returned no file_path".to_string()))?;

        let download = self
            .client
            .get(self.file_url(&file_path))
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !download.status().is_success() {
            return Err(fail(format!("download returned {}", download.status())));
        }

        let bytes = download.bytes().await.map_err(|e| fail(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Deserialize)]
struct GetFileResponse {
    #[serde(default)]
    ok: bool,
    result: Option<GetFileResult>,
}

#[derive(Deserialize)]
struct GetFileResult {
    file_path: Option<String>,
}

/// Split a reply into chunks within Telegram's length limit, preferring
/// newline then space boundaries. Cuts fall on UTF-8 char boundaries —
/// replies echo model-produced text, so multibyte content near the limit is
/// a real input, not a corner case.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.len() > max_len {
        let mut cut = max_len;
        while cut > 0 && !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            // max_len smaller than the first char; emit that char whole.
            cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }

        let window = &rest[..cut];
        if let Some(at) = window.rfind('\n').or_else(|| window.rfind(' ')) {
            if at > 0 {
                cut = at;
            }
        }

        chunks.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start();
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(token: &str) -> TelegramApi {
        TelegramApi::new(SecretString::from(token.to_string()))
    }

    #[test]
    fn api_url_embeds_token_and_method() {
        let tg = api("123:ABC");
        assert_eq!(
            tg.api_url("sendMessage"),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
    }

    #[test]
    fn file_url_uses_file_endpoint() {
        let tg = api("123:ABC");
        assert_eq!(
            tg.file_url("photos/file_1.jpg"),
            "https://api.telegram.org/file/bot123:ABC/photos/file_1.jpg"
        );
    }

    #[tokio::test]
    async fn fetch_with_bad_token_fails() {
        let tg = api("fake-token");
        let result = tg.fetch("some-file-id").await;
        assert!(matches!(
            result,
            Err(ChannelError::FileFetchFailed { .. })
        ));
    }

    // ── Message splitting ───────────────────────────────────────────

    #[test]
    fn split_message_short() {
        let chunks = split_message("Hello", 4096);
        assert_eq!(chunks, vec!["Hello"]);
    }

    #[test]
    fn split_message_exact_limit() {
        let msg = "a".repeat(4096);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 4096);
    }

    #[test]
    fn split_message_over_limit_on_newline() {
        let msg = format!("{}\n{}", "a".repeat(2000), "b".repeat(3000));
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a".repeat(2000));
        assert_eq!(chunks[1], "b".repeat(3000));
    }

    #[test]
    fn split_message_no_good_split_point() {
        let msg = "a".repeat(5000);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 904);
    }

    #[test]
    fn split_message_multibyte_confirmation_reply() {
        // Confirmations echo the model's category/merchant text, which can
        // push a multibyte char across the length limit.
        let msg = format!("✅ Saved *€15* to *{}*", "🍕".repeat(1200));
        let chunks = split_message(&msg, 4096);
        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= 4096));
    }

    #[test]
    fn split_message_multibyte_without_split_points() {
        let msg = "é".repeat(3000);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].len() <= 4096);
        assert_eq!(chunks.concat(), msg);
    }

    #[test]
    fn split_message_cut_lands_inside_a_char() {
        // 4-byte chars with a 2-byte limit offset: byte 4096 is mid-char.
        let msg = format!("ab{}", "🍕".repeat(1100));
        let chunks = split_message(&msg, 4096);
        assert!(chunks.iter().all(|c| c.len() <= 4096));
        assert_eq!(chunks.concat(), msg);
    }

    #[test]
    fn split_message_limit_smaller_than_one_char() {
        let chunks = split_message("🍕🍕", 2);
        assert_eq!(chunks, vec!["🍕", "🍕"]);
    }
}
