//! Hosted language model client.

use crate::config::LlmConfig;
use crate::error::AssistError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A hosted text-generation model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Free-form completion.
    async fn generate_text(&self, prompt: &str) -> Result<String, AssistError>;

    /// Completion constrained to a JSON schema, parsed into a value.
    ///
    /// The value is *not* validated against `schema` beyond being JSON;
    /// callers check the fields they rely on.
    async fn generate_json(&self, prompt: &str, schema: &Value) -> Result<Value, AssistError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: LlmConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: LlmConfig) -> Result<Self, AssistError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AssistError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    async fn send(&self, request: &GenerateContentRequest<'_>) -> Result<String, AssistError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(AssistError::RemoteService(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            AssistError::ModelContractViolation(format!("unreadable model response: {}", e))
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AssistError::ModelContractViolation(
                "model returned no text".to_string(),
            ));
        }

        debug!(model = %self.config.model, chars = text.len(), "model responded");
        Ok(text)
    }

    fn request<'a>(
        &self,
        prompt: &str,
        schema: Option<&'a Value>,
    ) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: schema.map(|_| "application/json"),
                response_schema: schema,
            },
        }
    }
}

/// Strips a Markdown code fence some models wrap around JSON.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parses model output as JSON.
pub fn parse_json_output(text: &str) -> Result<Value, AssistError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| AssistError::ModelContractViolation(format!("output is not JSON: {}", e)))
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, AssistError> {
        let text = self.send(&self.request(prompt, None)).await?;
        Ok(text.trim().to_string())
    }

    async fn generate_json(&self, prompt: &str, schema: &Value) -> Result<Value, AssistError> {
        let text = self.send(&self.request(prompt, Some(schema))).await?;
        parse_json_output(&text)
    }
}
