//! Model provider trait and the serving-endpoint implementation.

pub mod http;
pub mod openai;

use async_trait::async_trait;

use crate::config::StoreIntelConfig;
use crate::error::StoreIntelError;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "databricks").
    fn provider_name(&self) -> &str;
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate text (non-streaming).
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, StoreIntelError>;
}

/// Create the chat provider for the configured serving endpoint.
pub fn create_provider(config: &StoreIntelConfig) -> Result<Box<dyn ModelProvider>, StoreIntelError> {
    let (host, token) = config.credentials()?;
    let model = config
        .model()
        .ok_or_else(|| StoreIntelError::Configuration("Missing DATABRICKS_MODEL".into()))?;
    Ok(Box::new(openai::OpenAiProvider::new(
        model,
        token,
        openai::serving_endpoints_url(host),
    )))
}
