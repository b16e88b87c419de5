use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// One typed piece of a request: text or inline binary with a media type.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Base64-encoded payload plus its media type.
    InlineData {
        media_type: String,
        data: String,
    },
}

/// A single generation request: which model, an ordered part list, and
/// whether image output should be requested.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub parts: Vec<Part>,
    pub image_output: bool,
}

/// Inline image returned by the model, still base64-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub media_type: String,
    pub data: String,
}

/// Aggregated view over a model response: all text parts concatenated,
/// plus the first inline image if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub image: Option<InlineImage>,
}

/// A model endpoint that turns an ordered part list into content.
#[async_trait]
pub trait ContentModel: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<ModelResponse>;
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

pub struct GeminiClient {
    http: Client,
    auth_token: String,
}

impl GeminiClient {
    /// Reads the service credential from `GEMINI_API_KEY`. The key is
    /// required: callers treat a missing key as fatal at startup.
    pub fn new() -> Result<Self> {
        let key = env::var("GEMINI_API_KEY").map_err(|_| anyhow!("GEMINI_API_KEY not set"))?;
        Ok(Self {
            http: Client::builder().timeout(Duration::from_secs(45)).build()?,
            auth_token: key,
        })
    }

    fn wire_parts(parts: Vec<Part>) -> Vec<GeminiPart> {
        parts
            .into_iter()
            .map(|part| match part {
                Part::Text(text) => GeminiPart {
                    text: Some(text),
                    inline_data: None,
                },
                Part::InlineData { media_type, data } => GeminiPart {
                    text: None,
                    inline_data: Some(GeminiInlineData {
                        mime_type: media_type,
                        data,
                    }),
                },
            })
            .collect()
    }

    fn wire_request(request: GenerateRequest) -> GeminiRequest {
        let generation_config = request.image_output.then(|| GenerationConfig {
            response_modalities: vec!["IMAGE".to_string()],
        });
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: Self::wire_parts(request.parts),
            }],
            generation_config,
        }
    }

    fn collect_response(body: GeminiResponse) -> ModelResponse {
        let mut text = String::new();
        let mut image = None;
        if let Some(content) = body.candidates.first().and_then(|c| c.content.as_ref()) {
            for part in &content.parts {
                if let Some(t) = &part.text {
                    text.push_str(t);
                }
                if image.is_none() {
                    if let Some(inline) = &part.inline_data {
                        image = Some(InlineImage {
                            media_type: inline.mime_type.clone(),
                            data: inline.data.clone(),
                        });
                    }
                }
            }
        }
        ModelResponse {
            text: (!text.is_empty()).then_some(text),
            image,
        }
    }
}

#[async_trait]
impl ContentModel for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<ModelResponse> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            request.model, self.auth_token
        );
        let req = Self::wire_request(request);

        let resp = self.http.post(url).json(&req).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let body = body.trim();
            if body.is_empty() {
                return Err(anyhow!("gemini error: {}", status));
            }
            let body = if body.len() > 800 {
                format!("{}...", &body[..800])
            } else {
                body.to_string()
            };
            return Err(anyhow!("gemini error: {}\n{}", status, body));
        }

        let body: GeminiResponse = resp.json().await?;
        Ok(Self::collect_response(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_keeps_part_order_and_casing() {
        let req = GeminiClient::wire_request(GenerateRequest {
            model: "gemini-2.5-pro".to_string(),
            parts: vec![
                Part::InlineData {
                    media_type: "image/png".to_string(),
                    data: "QUJD".to_string(),
                },
                Part::Text("what is this?".to_string()),
            ],
            image_output: false,
        });

        let json = serde_json::to_value(&req).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "QUJD");
        assert_eq!(parts[1]["text"], "what is this?");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_image_output_requests_image_modality() {
        let req = GeminiClient::wire_request(GenerateRequest {
            model: "gemini-2.5-flash-image".to_string(),
            parts: vec![Part::Text("a cat".to_string())],
            image_output: true,
        });

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn test_response_aggregates_text_and_first_image() {
        let body: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [
                            {"text": "Here "},
                            {"inlineData": {"mimeType": "image/png", "data": "QUJD"}},
                            {"text": "you go"},
                            {"inlineData": {"mimeType": "image/png", "data": "REVG"}}
                        ]
                    }
                }]
            }"#,
        )
        .unwrap();

        let response = GeminiClient::collect_response(body);
        assert_eq!(response.text.as_deref(), Some("Here you go"));
        assert_eq!(response.image.unwrap().data, "QUJD");
    }

    #[test]
    fn test_empty_response_yields_nothing() {
        let body: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let response = GeminiClient::collect_response(body);
        assert!(response.text.is_none());
        assert!(response.image.is_none());
    }
}
