//! Tool system for function calling.

pub mod arguments;
pub mod retail;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use retail::{
    answer_to_tool_output, business_conduct_policy_tool, genie_space_tool, product_inventory_tool,
    retail_tools, store_performance_tool, BUSINESS_CONDUCT_POLICY_TOOL, PRODUCT_INVENTORY_TOOL,
    STORE_PERFORMANCE_TOOL,
};
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::AgentToolParameters;
