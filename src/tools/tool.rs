//! The tool seam between the generation loop and the lookups it can run.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::arguments::ToolArguments;
use super::types::AgentToolParameters;
use crate::error::StoreIntelError;

/// Per-call context handed to a tool.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// Id the model gave this call, when it gave one.
    pub tool_call_id: Option<String>,
    /// Fires when the surrounding turn is aborted.
    pub cancel: CancellationToken,
}

/// A lookup the model may call by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Shown to the model so it can decide when to call the tool.
    fn description(&self) -> &str;

    /// JSON Schema of the arguments.
    fn parameters(&self) -> &AgentToolParameters;

    /// Run one call. Slow tools should stop with
    /// [`StoreIntelError::Cancelled`] once `ctx.cancel` fires.
    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, StoreIntelError>;
}

type BoxedCall =
    Pin<Box<dyn Future<Output = Result<serde_json::Value, StoreIntelError>> + Send>>;

type Handler = dyn Fn(ToolArguments, ToolExecutionContext) -> BoxedCall + Send + Sync;

/// A [`Tool`] backed by an async closure.
pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    handler: Arc<Handler>,
}

impl AgentTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, StoreIntelError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, StoreIntelError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}
