use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const CLAUDE_MODEL: &str = "claude-3-5-sonnet-20240620";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: String,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Thin client for the Anthropic Messages API. Every call is a single
/// attempt; callers turn failures into in-band report text, so errors are
/// plain strings rather than a typed hierarchy.
pub struct ClaudeAgent {
    client: Client,
    api_key: String,
}

impl ClaudeAgent {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }

    /// Text-only generation under a fixed system instruction.
    pub async fn generate(&self, system: &str, input: &str) -> Result<String, String> {
        info!("Generating text ({} input chars)", input.len());
        self.request(
            system,
            vec![ContentBlock::Text {
                text: input.to_string(),
            }],
        )
        .await
    }

    /// Vision call: the image bytes go up base64-encoded alongside a short
    /// text block, with the captioning instruction as the system prompt.
    pub async fn caption(
        &self,
        system: &str,
        image: &[u8],
        media_type: &str,
    ) -> Result<String, String> {
        info!("Captioning image ({} bytes, {})", image.len(), media_type);
        self.request(
            system,
            vec![
                ContentBlock::Image {
                    source: ImageSource {
                        kind: "base64".to_string(),
                        media_type: media_type.to_string(),
                        data: BASE64.encode(image),
                    },
                },
                ContentBlock::Text {
                    text: "Caption this photograph.".to_string(),
                },
            ],
        )
        .await
    }

    async fn request(&self, system: &str, content: Vec<ContentBlock>) -> Result<String, String> {
        let body = ClaudeRequest {
            model: CLAUDE_MODEL.to_string(),
            max_tokens: MAX_TOKENS,
            system: system.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content,
            }],
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("Response read failed: {}", e))?;

        if status.is_success() {
            let parsed: ClaudeResponse =
                serde_json::from_str(&text).map_err(|e| format!("Parse error: {}", e))?;

            if let Some(block) = parsed.content.first() {
                if let Some(ref t) = block.text {
                    return Ok(t.clone());
                }
            }
            return Err("No text in response".to_string());
        }

        let detail = serde_json::from_str::<ErrorEnvelope>(&text)
            .ok()
            .and_then(|e| e.error)
            .and_then(|e| e.message)
            .unwrap_or(text);
        Err(format!("AI service error ({}): {}", status.as_u16(), detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_blocks_serialize_with_type_tag() {
        let block = ContentBlock::Text {
            text: "hello".to_string(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hello");
    }

    #[test]
    fn image_blocks_carry_base64_source() {
        let block = ContentBlock::Image {
            source: ImageSource {
                kind: "base64".to_string(),
                media_type: "image/png".to_string(),
                data: BASE64.encode(b"fake"),
            },
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["source"]["type"], "base64");
        assert_eq!(json["source"]["media_type"], "image/png");
        assert_eq!(json["source"]["data"], "ZmFrZQ==");
    }

    #[test]
    fn error_envelope_extracts_api_message() {
        let raw = r#"{"type":"error","error":{"type":"invalid_request_error","message":"bad key"}}"#;
        let parsed: ErrorEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.unwrap().message.unwrap(), "bad key");
    }
}
