//! Convenience re-exports for common use.

pub use crate::agent::StoreAssistant;
pub use crate::config::StoreIntelConfig;
pub use crate::error::{Result, StoreIntelError};
pub use crate::generation::GenerationControl;
pub use crate::genie::{GenieAnswer, GenieClient, PollPolicy, QueryResult};
pub use crate::policy::PolicySearch;
pub use crate::provider::ModelProvider;
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments};
pub use crate::types::{GenerationSettings, ModelMessage, Role};
