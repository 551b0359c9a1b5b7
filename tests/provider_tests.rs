//! Tests for the serving-endpoint chat provider.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use store_intel::error::StoreIntelError;
use store_intel::provider::{create_provider, ModelProvider, ProviderRequest, ToolDefinition};
use store_intel::types::*;

fn request_with_tool() -> ProviderRequest {
    ProviderRequest {
        messages: vec![
            ModelMessage::system("You answer store questions."),
            ModelMessage::user("How did store 110 do last year?"),
        ],
        settings: GenerationSettings::builder().temperature(0.1).build(),
        tools: Some(vec![ToolDefinition {
            name: "get_store_performance_info".into(),
            description: "Store performance".into(),
            parameters: json!({ "type": "object", "properties": {} }),
        }]),
    }
}

#[tokio::test]
async fn tool_call_response_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/serving-endpoints/chat/completions"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "model": "databricks-claude-sonnet",
            "temperature": 0.1,
            "tools": [{ "type": "function", "function": { "name": "get_store_performance_info" } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call-1",
                        "type": "function",
                        "function": {
                            "name": "get_store_performance_info",
                            "arguments": "{\"user_query\":\"sales for store 110 last year\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 50, "completion_tokens": 12, "total_tokens": 62 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = create_provider(&common::test_config(&server.uri())).unwrap();
    assert_eq!(provider.provider_name(), "databricks");
    assert_eq!(provider.model_id(), "databricks-claude-sonnet");

    let response = provider.generate_text(&request_with_tool()).await.unwrap();

    assert_eq!(response.text, "");
    assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
    assert_eq!(response.usage.total_tokens, 62);
    assert_eq!(
        response.tool_calls,
        vec![AgentToolCall {
            id: "call-1".into(),
            name: "get_store_performance_info".into(),
            arguments: json!({ "user_query": "sales for store 110 last year" }),
        }]
    );
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/serving-endpoints/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({ "error": { "message": "slow down", "retry_after": 2 } })),
        )
        .mount(&server)
        .await;

    let provider = create_provider(&common::test_config(&server.uri())).unwrap();
    let err = provider.generate_text(&request_with_tool()).await.unwrap_err();

    assert!(matches!(err, StoreIntelError::RateLimited { .. }), "got {err:?}");
}

#[test]
fn create_provider_requires_a_model() {
    let config = store_intel::config::StoreIntelConfig::new()
        .with_host("adb-1.azuredatabricks.net")
        .with_token("t");
    let err = create_provider(&config).err().unwrap();
    assert!(matches!(err, StoreIntelError::Configuration(msg) if msg.contains("DATABRICKS_MODEL")));
}
