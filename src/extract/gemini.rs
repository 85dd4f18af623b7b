//! Gemini generateContent client behind the extraction seam.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::extract::payload::IMAGE_DIRECTIVE;
use crate::pipeline::types::{ContentBody, ContentPayload};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// The extraction model seam. The pipeline never talks to the Gemini API
/// directly; tests substitute fakes here.
#[async_trait]
pub trait ExtractionModel: Send + Sync {
    /// Send one payload, get the model's raw text back. Single attempt.
    async fn generate(&self, payload: &ContentPayload) -> Result<String, ExtractionError>;
}

/// Gemini REST client.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ExtractionModel for GeminiClient {
    async fn generate(&self, payload: &ContentPayload) -> Result<String, ExtractionError> {
        let url = format!(
            "{BASE_URL}/{model}:generateContent?key={key}",
            model = self.model,
            key = self.api_key.expose_secret()
        );

        let response = self
            .client
            .post(url)
            .json(&request_body(payload))
            .send()
            .await
            .map_err(|e| ExtractionError::RequestFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status,
                message: api_error_message(&body),
            });
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| ExtractionError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        response_text(parsed)
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorWrapper {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// Build the request: the instruction block as systemInstruction and one
/// user turn carrying the single content modality. Image bytes go inline,
/// base64-encoded, followed by the analysis directive.
fn request_body(payload: &ContentPayload) -> GenerateContentRequest {
    let parts = match &payload.body {
        ContentBody::Text(text) => vec![Part::Text { text: text.clone() }],
        ContentBody::Image { mime_type, bytes } => vec![
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: BASE64_STANDARD.encode(bytes),
                },
            },
            Part::Text {
                text: IMAGE_DIRECTIVE.to_string(),
            },
        ],
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
        system_instruction: Some(Content {
            role: "system".to_string(),
            parts: vec![Part::Text {
                text: payload.instructions.clone(),
            }],
        }),
    }
}

fn response_text(response: GenerateContentResponse) -> Result<String, ExtractionError> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| ExtractionError::InvalidResponse {
            reason: "no text in response candidates".to_string(),
        })
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use crate::extract::payload::{image_payload, text_payload};

    use super::*;

    #[test]
    fn text_request_carries_instructions_and_input() {
        let body = request_body(&text_payload("15 Lunch"));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Input: 15 Lunch");
        let system = json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap();
        assert!(system.contains("Categories:"));
    }

    #[test]
    fn image_request_inlines_base64_data() {
        let bytes = vec![0x89, 0x50, 0x4E, 0x47];
        let body = request_body(&image_payload(bytes.clone()));
        let json = serde_json::to_value(&body).unwrap();

        let inline = &json["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(inline["mimeType"], "image/png");
        assert_eq!(inline["data"], BASE64_STANDARD.encode(&bytes));
        assert_eq!(json["contents"][0]["parts"][1]["text"], IMAGE_DIRECTIVE);
    }

    #[test]
    fn response_text_picks_first_text_part() {
        let response = GenerateContentResponse {
            candidates: Some(vec![Candidate {
                content: Some(CandidateContent {
                    parts: vec![
                        CandidatePart { text: None },
                        CandidatePart {
                            text: Some("{\"amount\": 15}".into()),
                        },
                    ],
                }),
            }]),
        };
        assert_eq!(response_text(response).unwrap(), "{\"amount\": 15}");
    }

    #[test]
    fn empty_candidates_is_invalid_response() {
        let response = GenerateContentResponse {
            candidates: Some(vec![]),
        };
        assert!(matches!(
            response_text(response),
            Err(ExtractionError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn api_error_message_prefers_structured_body() {
        let body = r#"{"error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(api_error_message(body), "quota exceeded");
        assert_eq!(api_error_message("plain failure"), "plain failure");
    }
}
