//! Text generation with tool loop.

use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::StoreIntelError;
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::tools::tool::{Tool, ToolExecutionContext};
use crate::tools::ToolArguments;
use crate::types::*;

/// Maximum tool loop iterations to prevent infinite loops.
pub const MAX_TOOL_ITERATIONS: usize = 20;

/// Called once per tool call, before the tool runs.
pub type ToolCallNotice = Arc<dyn Fn(&AgentToolCall) + Send + Sync>;

/// Per-run hooks for [`generate_text`].
#[derive(Clone, Default)]
pub struct GenerationControl {
    pub on_tool_call: Option<ToolCallNotice>,
    pub cancel: CancellationToken,
}

/// Generate text with an optional tool loop.
///
/// If the model returns tool calls, they are executed (concurrently, each
/// independent of the others) and fed back until the model produces a final
/// text response or we hit the iteration limit. A failing tool does not end
/// the run: its error is handed back to the model as an error result.
pub async fn generate_text(
    provider: &dyn ModelProvider,
    mut messages: Vec<ModelMessage>,
    settings: GenerationSettings,
    tools: &[Arc<dyn Tool>],
    control: &GenerationControl,
) -> Result<GenerateTextResult, StoreIntelError> {
    let tool_defs: Option<Vec<ToolDefinition>> = if tools.is_empty() {
        None
    } else {
        Some(
            tools
                .iter()
                .map(|t| ToolDefinition {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters().schema.clone(),
                })
                .collect(),
        )
    };

    let mut steps = Vec::new();
    let mut total_usage = Usage::default();

    for iteration in 0..MAX_TOOL_ITERATIONS {
        let request = ProviderRequest {
            messages: messages.clone(),
            settings: settings.clone(),
            tools: tool_defs.clone(),
        };

        debug!(iteration, "generate_text: calling provider");
        let response = tokio::select! {
            biased;
            _ = control.cancel.cancelled() => return Err(StoreIntelError::Cancelled),
            response = provider.generate_text(&request) => response?,
        };

        total_usage.merge(&response.usage);

        if response.tool_calls.is_empty() {
            steps.push(GenerationStep {
                text: response.text.clone(),
                tool_calls: Vec::new(),
                tool_results: Vec::new(),
                usage: response.usage,
                finish_reason: response.finish_reason,
            });
            messages.push(ModelMessage::assistant(response.text.clone()));

            return Ok(GenerateTextResult {
                text: response.text,
                steps,
                messages,
                usage: total_usage,
                finish_reason: response.finish_reason,
            });
        }

        messages.push(ModelMessage::assistant_tool_calls(
            response.text.clone(),
            response.tool_calls.clone(),
        ));

        if let Some(notice) = &control.on_tool_call {
            for tc in &response.tool_calls {
                notice(tc);
            }
        }

        let results = join_all(
            response
                .tool_calls
                .iter()
                .map(|tc| run_tool_call(tools, tc, &control.cancel)),
        )
        .await;

        if control.cancel.is_cancelled() {
            return Err(StoreIntelError::Cancelled);
        }

        for result in &results {
            messages.push(ModelMessage::tool_result(
                result.tool_call_id.clone(),
                result.result.clone(),
                result.is_error,
            ));
        }

        steps.push(GenerationStep {
            text: response.text,
            tool_calls: response.tool_calls,
            tool_results: results,
            usage: response.usage,
            finish_reason: response.finish_reason,
        });
    }

    warn!(max = MAX_TOOL_ITERATIONS, "generate_text: tool iteration limit reached");
    let last_text = steps.last().map(|s| s.text.clone()).unwrap_or_default();
    Ok(GenerateTextResult {
        text: last_text,
        steps,
        messages,
        usage: total_usage,
        finish_reason: Some(FinishReason::Length),
    })
}

async fn run_tool_call(
    tools: &[Arc<dyn Tool>],
    tc: &AgentToolCall,
    cancel: &CancellationToken,
) -> AgentToolResult {
    let Some(tool) = tools.iter().find(|t| t.name() == tc.name) else {
        warn!(tool = %tc.name, "Tool not found");
        return AgentToolResult {
            tool_call_id: tc.id.clone(),
            result: serde_json::json!({"error": format!("Tool '{}' not found", tc.name)}),
            is_error: true,
        };
    };

    let ctx = ToolExecutionContext {
        tool_call_id: Some(tc.id.clone()),
        cancel: cancel.child_token(),
    };
    let args = ToolArguments::new(tc.arguments.clone());

    match tool.execute(&args, &ctx).await {
        Ok(value) => AgentToolResult {
            tool_call_id: tc.id.clone(),
            result: value,
            is_error: false,
        },
        Err(e) => {
            warn!(tool = %tc.name, error = %e, "Tool execution failed");
            AgentToolResult {
                tool_call_id: tc.id.clone(),
                result: tool_error_payload(&e),
                is_error: true,
            }
        }
    }
}

/// Error payload handed back to the model; the wording depends on whether
/// the tool was slow, unreachable or rejected the question.
fn tool_error_payload(error: &StoreIntelError) -> serde_json::Value {
    serde_json::json!({
        "error": error.user_message(),
        "detail": error.to_string(),
    })
}
