//! LLM provider abstraction
//!
//! Provides a common interface for the generative-language service the
//! guide talks to.

mod error;
mod gemini;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::{GeminiService, DEFAULT_GEMINI_MODEL};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Configuration for the LLM provider
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    /// Gateway URL; when set the gateway handles authentication
    pub gateway: Option<String>,
    pub model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .ok(),
            gateway: std::env::var("LLM_GATEWAY").ok(),
            model: std::env::var("GEMINI_MODEL").ok(),
        }
    }

    /// Build the configured service wrapped in logging.
    ///
    /// Returns None if neither an API key nor a gateway is configured.
    pub fn build_service(&self) -> Result<Option<Arc<dyn LlmService>>, LlmError> {
        // In gateway mode, use "implicit" as the API key
        let api_key = if self.gateway.is_some() {
            "implicit".to_string()
        } else {
            match self.gemini_api_key.as_deref() {
                Some(key) if !key.is_empty() => key.to_string(),
                _ => return Ok(None),
            }
        };

        let model = self.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
        let service = GeminiService::new(api_key, model, self.gateway.as_deref())?;
        Ok(Some(Arc::new(LoggingService::new(Arc::new(service)))))
    }
}

/// Stand-in used when no credentials are configured; every request fails
/// with an auth error, so callers fall back to their canned replies.
pub struct OfflineService;

#[async_trait]
impl LlmService for OfflineService {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::auth(
            "No API key configured. Set GEMINI_API_KEY or LLM_GATEWAY.",
        ))
    }

    fn model_id(&self) -> &str {
        "offline"
    }
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    structured = request.response_schema.is_some(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    structured = request.response_schema.is_some(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_service_fails_with_auth() {
        let err = OfflineService
            .complete(&LlmRequest::prompt("hello"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Auth);
        assert!(!err.kind.is_transient());
    }

    #[test]
    fn test_no_key_no_service() {
        let config = LlmConfig::default();
        assert!(config.build_service().unwrap().is_none());
    }

    #[test]
    fn test_empty_key_no_service() {
        let config = LlmConfig {
            gemini_api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(config.build_service().unwrap().is_none());
    }

    #[test]
    fn test_key_builds_default_model() {
        let config = LlmConfig {
            gemini_api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        let service = config.build_service().unwrap().unwrap();
        assert_eq!(service.model_id(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_gateway_without_key_builds_service() {
        let config = LlmConfig {
            gateway: Some("http://localhost:9999/llm".to_string()),
            model: Some("gemini-3-pro-preview".to_string()),
            ..Default::default()
        };
        let service = config.build_service().unwrap().unwrap();
        assert_eq!(service.model_id(), "gemini-3-pro-preview");
    }
}
