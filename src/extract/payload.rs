//! Instruction block and content payload construction.

use chrono::Utc;

use crate::pipeline::types::{ContentBody, ContentPayload};

/// The fixed category list offered to the model.
pub const CATEGORIES: &str = "Groceries 🛒, Food Takeout 🍕, Travel ✈️, Subscription 📺, \
     Investment 💰, Household 🏠, Transport 🚌";

/// Directive sent alongside an image part.
pub const IMAGE_DIRECTIVE: &str = "Analyze this image.";

/// Build the instruction block for one extraction call.
///
/// Rebuilt fresh per call so the embedded date stays current without any
/// persisted state.
pub fn instruction_block() -> String {
    instruction_block_for_date(&Utc::now().format("%Y-%m-%d").to_string())
}

fn instruction_block_for_date(date: &str) -> String {
    format!(
        "Current Date: {date}\n\
         Categories: {CATEGORIES}.\n\
         Task: Parse input (text or image) into JSON: \
         {{\"amount\": float, \"category\": str, \"merchant\": str, \"note\": str}}.\n\
         Rules:\n\
         1. If no currency, assume EUR.\n\
         2. If category is ambiguous, use \"Other\".\n\
         3. Auto-fix merchant names.\n\
         4. Output JSON only."
    )
}

/// Wrap free text as the content payload.
pub fn text_payload(text: &str) -> ContentPayload {
    ContentPayload {
        instructions: instruction_block(),
        body: ContentBody::Text(format!("Input: {text}")),
    }
}

/// Wrap downloaded photo bytes as the content payload.
pub fn image_payload(bytes: Vec<u8>) -> ContentPayload {
    ContentPayload {
        instructions: instruction_block(),
        body: ContentBody::Image {
            mime_type: sniff_mime(&bytes).to_string(),
            bytes,
        },
    }
}

/// Sniff the image mime type from magic bytes. Telegram photos are JPEG in
/// practice; PNG and WebP are recognized as well.
fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_block_embeds_date_and_categories() {
        let block = instruction_block_for_date("2026-08-29");
        assert!(block.contains("Current Date: 2026-08-29"));
        assert!(block.contains("Food Takeout"));
        assert!(block.contains("Output JSON only."));
    }

    #[test]
    fn instruction_block_uses_today() {
        let block = instruction_block();
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert!(block.contains(&today));
    }

    #[test]
    fn text_payload_wraps_with_input_directive() {
        let payload = text_payload("15 Lunch");
        match payload.body {
            ContentBody::Text(text) => assert_eq!(text, "Input: 15 Lunch"),
            ContentBody::Image { .. } => panic!("expected text body"),
        }
    }

    #[test]
    fn image_payload_sniffs_png() {
        let payload = image_payload(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        match payload.body {
            ContentBody::Image { mime_type, .. } => assert_eq!(mime_type, "image/png"),
            ContentBody::Text(_) => panic!("expected image body"),
        }
    }

    #[test]
    fn unknown_magic_defaults_to_jpeg() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF]), "image/jpeg");
        assert_eq!(sniff_mime(&[]), "image/jpeg");
    }

    #[test]
    fn webp_magic_is_recognized() {
        let mut bytes = b"RIFF\x00\x00\x00\x00WEBP".to_vec();
        bytes.extend_from_slice(&[0; 4]);
        assert_eq!(sniff_mime(&bytes), "image/webp");
    }
}
