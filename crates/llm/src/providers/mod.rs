use crate::error::{GeminiError, GeminiResult};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub mod google_provider;

pub use google_provider::{GeminiClient, GeminiConfig};

/// A model that turns a `generateContent` request into text.
///
/// The recognition pipeline and chat sessions depend on this seam rather than
/// on [`GeminiClient`] so they can run against scripted models in tests.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_text(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<String>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_settings: Option<Vec<SafetySetting>>,
}

impl GenerateContentRequest {
    /// One user turn
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content::user(parts)],
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(Content {
            role: None,
            parts: vec![Part::text(text)],
        });
        self
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    /// Number of inline images across all turns
    pub fn inline_image_count(&self) -> usize {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter(|p| p.inline_data.is_some())
            .count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts,
        }
    }

    /// Concatenated text of non-thought parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Set by thinking models on reasoning parts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Inline image or audio, already base64-encoded
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            ..Default::default()
        }
    }

    pub fn inline_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::inline_data(
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(bytes),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

impl GenerationConfig {
    /// Constrain output to JSON matching `schema`
    pub fn json_schema(schema: serde_json::Value) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            ..Default::default()
        }
    }

    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_config = Some(ThinkingConfig {
            thinking_budget: budget,
        });
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Text of the first candidate
    pub fn text(&self) -> GeminiResult<String> {
        let Some(candidate) = self.candidates.first() else {
            return Err(match self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.clone())
            {
                Some(reason) => GeminiError::Blocked(reason),
                None => GeminiError::EmptyResponse,
            });
        };

        let text = candidate
            .content
            .as_ref()
            .map(Content::text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(match candidate.finish_reason.as_deref() {
                Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
                    GeminiError::Blocked(reason.to_string())
                }
                _ => GeminiError::EmptyResponse,
            });
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest::from_parts(vec![
            Part::text("TARGET:"),
            Part::inline_bytes("image/jpeg", &[0xff, 0xd8]),
        ])
        .with_system_instruction("be brief")
        .with_generation_config(
            GenerationConfig::json_schema(json!({"type": "OBJECT"})).with_thinking_budget(128),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(value["contents"][0]["parts"][1]["inlineData"]["data"], "/9g=");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["thinkingConfig"]["thinkingBudget"], 128);
        assert!(value.get("safetySettings").is_none());
        assert_eq!(request.inline_image_count(), 1);
    }

    #[test]
    fn test_response_text_skips_thoughts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "Part "},
                    {"text": "A-1"}
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(response.text().unwrap(), "Part A-1");
    }

    #[test]
    fn test_blocked_and_empty_responses() {
        let blocked: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(matches!(blocked.text(), Err(GeminiError::Blocked(r)) if r == "SAFETY"));

        let empty: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"content": {"parts": []}}]})).unwrap();
        assert!(matches!(empty.text(), Err(GeminiError::EmptyResponse)));
    }
}
