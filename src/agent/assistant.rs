//! Store intelligence assistant.

use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::StoreIntelConfig;
use crate::error::StoreIntelError;
use crate::generation::{generate_text, GenerationControl};
use crate::genie::GenieClient;
use crate::policy::{PolicySearch, SqlFunctionPolicySearch};
use crate::provider::{self, ModelProvider};
use crate::tools::retail_tools;
use crate::tools::tool::Tool;
use crate::types::{GenerationSettings, ModelMessage};

use super::history::ChatHistory;

/// Role instructions for the assistant.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant that answers questions about \
store performance, returns, BOPIS (buy online, pick up in store), product inventory and business \
conduct policy. You may use the tools provided to answer.
If a question is not about stores, inventory or policy, answer from your own knowledge or say that \
you don't know.
Use get_store_performance_info for store performance or location questions. When forecasts are \
returned, present the table as is and note that it is an on-demand forecast for the given store \
and horizon.
Use get_business_conduct_policy_info for any policy question.
Use get_product_inventory_info for product and inventory questions.
You can see the full chat history; use it to keep context across turns.";

/// A chat session with the store assistant.
pub struct StoreAssistant {
    provider: Arc<dyn ModelProvider>,
    tools: Vec<Arc<dyn Tool>>,
    instructions: String,
    settings: GenerationSettings,
    history: ChatHistory,
}

impl StoreAssistant {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            tools: Vec::new(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            settings: GenerationSettings::default(),
            history: ChatHistory::new(),
        }
    }

    /// Wire the serving-endpoint provider and every configured tool.
    pub fn from_config(config: &StoreIntelConfig) -> Result<Self, StoreIntelError> {
        config.validate()?;
        let provider: Arc<dyn ModelProvider> = Arc::from(provider::create_provider(config)?);
        let genie = GenieClient::from_config(config)?;
        // Without both a warehouse and a function there is nothing to search;
        // `retail_tools` warns and leaves the policy tool out.
        let policy: Option<Arc<dyn PolicySearch>> =
            match (config.warehouse_id(), config.policy_function()) {
                (Some(_), Some(_)) => Some(Arc::new(SqlFunctionPolicySearch::from_config(config)?)),
                _ => None,
            };
        let tools = retail_tools(config, &genie, policy);
        info!(model = provider.model_id(), tools = tools.len(), "assistant ready");
        Ok(Self::new(provider).with_tools(tools))
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Answer one user turn, propagating failures.
    ///
    /// The user message and the reply are added to the history only when
    /// the turn succeeds.
    pub async fn try_respond(
        &mut self,
        prompt: &str,
        control: &GenerationControl,
    ) -> Result<String, StoreIntelError> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ModelMessage::system(self.instructions.clone()));
        messages.extend(self.history.messages().iter().cloned());
        messages.push(ModelMessage::user(prompt));

        let turn_id = Uuid::new_v4();
        let result = generate_text(
            self.provider.as_ref(),
            messages,
            self.settings.clone(),
            &self.tools,
            control,
        )
        .instrument(info_span!("turn", %turn_id, model = self.provider.model_id()))
        .await?;

        info!(%turn_id, steps = result.steps.len(), tokens = result.usage.total_tokens, "turn complete");

        self.history.add_user_message(prompt);
        self.history.add_assistant_message(result.text.clone());
        Ok(result.text)
    }

    /// Answer one user turn; failures become an apology instead of an error
    /// so the chat session can continue.
    pub async fn respond(&mut self, prompt: &str, control: &GenerationControl) -> String {
        match self.try_respond(prompt, control).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "turn failed");
                let reply = format!("An error occurred: {e}");
                self.history.add_user_message(prompt);
                self.history.add_assistant_message(reply.clone());
                reply
            }
        }
    }
}
