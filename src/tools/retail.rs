//! The assistant's lookup tools.
//!
//! Store performance and product inventory are both Genie spaces, so they
//! are the same binding over one shared [`GenieClient`] with a different
//! fixed space id. Policy questions go to [`PolicySearch`].

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::config::StoreIntelConfig;
use crate::error::StoreIntelError;
use crate::genie::{GenieAnswer, GenieClient};
use crate::policy::PolicySearch;

use super::tool::{AgentTool, Tool};
use super::types::AgentToolParameters;

pub const STORE_PERFORMANCE_TOOL: &str = "get_store_performance_info";
pub const PRODUCT_INVENTORY_TOOL: &str = "get_product_inventory_info";
pub const BUSINESS_CONDUCT_POLICY_TOOL: &str = "get_business_conduct_policy_info";

const STORE_PERFORMANCE_DESCRIPTION: &str = "Get information about store locations, store \
performance, returns and BOPIS (buy online, pick up in store). Ask in plain English.";
const PRODUCT_INVENTORY_DESCRIPTION: &str = "Get information about products and the current \
inventory snapshot across stores. Ask in plain English.";
const BUSINESS_CONDUCT_POLICY_DESCRIPTION: &str = "Search the retail business conduct policy \
(vendor rules, overtime, returns policy and similar) for passages relevant to a question.";

/// Shape a Genie answer as a tool result for the model.
pub fn answer_to_tool_output(answer: GenieAnswer) -> serde_json::Value {
    match answer {
        GenieAnswer::Resolved(result) => {
            let mut output = json!({
                "status": "ok",
                "statement_response": result.statement,
            });
            if let Some(sql) = result.sql {
                output["sql"] = json!(sql);
            }
            output
        }
        GenieAnswer::Empty { .. } => json!({
            "status": "empty",
            "message": "The question was answered but no data was returned.",
        }),
    }
}

/// Bind a Genie space as a tool taking a single `user_query` argument.
pub fn genie_space_tool(
    name: &str,
    description: &str,
    genie: GenieClient,
    space_id: impl Into<String>,
) -> AgentTool {
    let tool_name = name.to_string();
    let space_id = space_id.into();
    AgentTool::new(
        name,
        description,
        AgentToolParameters::object()
            .string("user_query", "The question to ask, in natural language", true)
            .build(),
        move |args, ctx| {
            let genie = genie.clone();
            let space_id = space_id.clone();
            let tool_name = tool_name.clone();
            async move {
                let query = args.get_str("user_query")?;
                info!(tool = %tool_name, space_id = %space_id, "tool called");
                let answer = genie
                    .fetch_answer_with_cancel(&space_id, query, &ctx.cancel)
                    .await?;
                Ok(answer_to_tool_output(answer))
            }
        },
    )
}

pub fn store_performance_tool(genie: GenieClient, space_id: impl Into<String>) -> AgentTool {
    genie_space_tool(
        STORE_PERFORMANCE_TOOL,
        STORE_PERFORMANCE_DESCRIPTION,
        genie,
        space_id,
    )
}

pub fn product_inventory_tool(genie: GenieClient, space_id: impl Into<String>) -> AgentTool {
    genie_space_tool(
        PRODUCT_INVENTORY_TOOL,
        PRODUCT_INVENTORY_DESCRIPTION,
        genie,
        space_id,
    )
}

pub fn business_conduct_policy_tool(search: Arc<dyn PolicySearch>) -> AgentTool {
    AgentTool::new(
        BUSINESS_CONDUCT_POLICY_TOOL,
        BUSINESS_CONDUCT_POLICY_DESCRIPTION,
        AgentToolParameters::object()
            .string("search_query", "What to look up in the policy", true)
            .build(),
        move |args, ctx| {
            let search = search.clone();
            async move {
                let query = args.get_str("search_query")?;
                info!(tool = BUSINESS_CONDUCT_POLICY_TOOL, "tool called");
                tokio::select! {
                    biased;
                    _ = ctx.cancel.cancelled() => Err(StoreIntelError::Cancelled),
                    result = search.search(query) => result,
                }
            }
        },
    )
}

/// Every tool the configuration supports.
///
/// A tool whose backing resource is not configured is left out with a
/// warning rather than failing start-up.
pub fn retail_tools(
    config: &StoreIntelConfig,
    genie: &GenieClient,
    policy: Option<Arc<dyn PolicySearch>>,
) -> Vec<Arc<dyn Tool>> {
    let mut tools: Vec<Arc<dyn Tool>> = Vec::new();

    match &config.spaces().store_performance {
        Some(space) => tools.push(Arc::new(store_performance_tool(genie.clone(), space.clone()))),
        None => warn!("GENIE_SPACE_STORE_PERFORMANCE_ID not set; {STORE_PERFORMANCE_TOOL} disabled"),
    }
    match &config.spaces().product_inventory {
        Some(space) => tools.push(Arc::new(product_inventory_tool(genie.clone(), space.clone()))),
        None => warn!("GENIE_SPACE_PRODUCT_INV_ID not set; {PRODUCT_INVENTORY_TOOL} disabled"),
    }
    match policy {
        Some(search) => tools.push(Arc::new(business_conduct_policy_tool(search))),
        None => warn!("policy search not configured; {BUSINESS_CONDUCT_POLICY_TOOL} disabled"),
    }

    tools
}
