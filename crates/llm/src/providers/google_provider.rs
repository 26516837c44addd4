use super::{GenerateContentRequest, GenerateContentResponse, GenerativeModel};
use crate::error::{GeminiError, GeminiResult};
use crate::retry::{execute_with_retry, RetryConfig};
use async_trait::async_trait;
use common::{AppConfig, GeminiSettings};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Connection settings for [`GeminiClient`]
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    /// Up to and including the API version, e.g. `.../v1beta`
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl GeminiConfig {
    pub fn from_settings(settings: &GeminiSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
            retry: RetryConfig::none(),
        }
    }
}

/// `generateContent` client for the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    base_url: String,
    client: Client,
    retry_config: RetryConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GeminiError::from_reqwest)?;

        Ok(Self {
            api_key: config.api_key.filter(|k| !k.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            retry_config: config.retry,
        })
    }

    pub fn from_settings(settings: &GeminiSettings) -> GeminiResult<Self> {
        Self::new(GeminiConfig::from_settings(settings))
    }

    pub fn from_config(config: &AppConfig) -> GeminiResult<Self> {
        Self::from_settings(&config.gemini)
    }

    /// Same connection, different retry policy
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// POST one request, retrying transient failures per the configured policy
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        let endpoint = self.endpoint(model);
        let start_time = Instant::now();

        debug!(
            model,
            turns = request.contents.len(),
            images = request.inline_image_count(),
            "Sending generateContent request"
        );

        let response = execute_with_retry(&self.retry_config, || async {
            let response = self
                .client
                .post(&endpoint)
                .header("x-goog-api-key", api_key)
                .json(request)
                .send()
                .await
                .map_err(GeminiError::from_reqwest)?;

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error response".to_string());
                return Err(GeminiError::from_status(status.as_u16(), &body));
            }

            response
                .json::<GenerateContentResponse>()
                .await
                .map_err(|e| GeminiError::MalformedResponse(format!("Failed to parse response: {e}")))
        })
        .await?;

        let total_tokens = response
            .usage_metadata
            .as_ref()
            .and_then(|u| u.total_token_count)
            .unwrap_or(0);
        info!(
            model,
            duration_ms = start_time.elapsed().as_millis() as u64,
            total_tokens,
            "Gemini response received"
        );

        Ok(response)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_text(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<String> {
        self.generate_content(model, request).await?.text()
    }
}
