//! Shared test helpers and mock provider.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use store_intel::config::{SpaceIds, StoreIntelConfig};
use store_intel::error::StoreIntelError;
use store_intel::genie::{GenieClient, HttpGenieTransport, PollPolicy};
use store_intel::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use store_intel::types::*;

pub const STORE_PERF_SPACE: &str = "01f023ae84651418a1203b194dff21a9";
pub const PRODUCT_INV_SPACE: &str = "01f0235d8ef711eea2abd1d6f0d0ca11";

/// A mock provider that returns canned responses in order and records
/// every request it receives.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<Vec<Result<ProviderResponse, StoreIntelError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push(Ok(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        }));
    }

    /// Queue a response requesting one tool call.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.queue_tool_calls(vec![(id, name, args)]);
    }

    /// Queue a response requesting several tool calls at once.
    pub fn queue_tool_calls(&self, calls: Vec<(&str, &str, serde_json::Value)>) {
        self.responses.lock().unwrap().push(Ok(ProviderResponse {
            text: String::new(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            },
            tool_calls: calls
                .into_iter()
                .map(|(id, name, arguments)| AgentToolCall {
                    id: id.to_string(),
                    name: name.to_string(),
                    arguments,
                })
                .collect(),
            finish_reason: Some(FinishReason::ToolCalls),
        }));
    }

    /// Queue a provider failure.
    pub fn queue_error(&self, error: StoreIntelError) {
        self.responses.lock().unwrap().push(Err(error));
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, StoreIntelError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(ProviderResponse {
                text: "Mock response".to_string(),
                usage: Usage::default(),
                tool_calls: vec![],
                finish_reason: Some(FinishReason::Stop),
            });
        }
        responses.remove(0)
    }
}

/// Genie client against a mock server, polling fast enough for real-time tests.
pub fn fast_genie(server_uri: &str, timeout_ms: u64) -> GenieClient {
    let transport = HttpGenieTransport::new(server_uri, "test-token");
    GenieClient::new(Arc::new(transport)).with_poll_policy(PollPolicy {
        interval: Duration::from_millis(10),
        timeout: Duration::from_millis(timeout_ms),
    })
}

/// Config with both spaces pointed at the test ids.
pub fn test_config(host: &str) -> StoreIntelConfig {
    StoreIntelConfig::new()
        .with_host(host)
        .with_token("test-token")
        .with_model("databricks-claude-sonnet")
        .with_spaces(SpaceIds {
            store_performance: Some(STORE_PERF_SPACE.to_string()),
            product_inventory: Some(PRODUCT_INV_SPACE.to_string()),
        })
}

pub fn start_path(space: &str) -> String {
    format!("/api/2.0/genie/spaces/{space}/start-conversation")
}

pub fn message_path(space: &str, conversation: &str, message: &str) -> String {
    format!("/api/2.0/genie/spaces/{space}/conversations/{conversation}/messages/{message}")
}

pub fn result_path(space: &str, conversation: &str, message: &str, attachment: &str) -> String {
    format!(
        "{}/attachments/{attachment}/query-result",
        message_path(space, conversation, message)
    )
}
