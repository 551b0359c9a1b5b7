//! Genie wire calls.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::{normalize_host, StoreIntelConfig};
use crate::error::StoreIntelError;
use crate::provider::http::{bearer_headers, read_json_body, shared_client};

use super::types::{GenieMessage, MessageRef};

/// The three calls a Genie exchange is built from.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait GenieTransport: Send + Sync {
    /// Ask `content` in a new conversation of `space_id`.
    async fn start_conversation(
        &self,
        space_id: &str,
        content: &str,
    ) -> Result<MessageRef, StoreIntelError>;

    /// Fetch the current state of a message.
    async fn get_message(&self, message: &MessageRef) -> Result<GenieMessage, StoreIntelError>;

    /// Fetch the statement response behind an attachment.
    async fn get_query_result(
        &self,
        message: &MessageRef,
        attachment_id: &str,
    ) -> Result<serde_json::Value, StoreIntelError>;
}

#[derive(Deserialize)]
struct StartConversationResponse {
    conversation_id: String,
    message_id: String,
}

/// Genie REST API over a workspace host and bearer token.
#[derive(Clone)]
pub struct HttpGenieTransport {
    host: String,
    token: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpGenieTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenieTransport")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl HttpGenieTransport {
    pub fn new(host: impl AsRef<str>, token: impl Into<String>) -> Self {
        Self {
            host: normalize_host(host.as_ref()),
            token: token.into(),
            client: shared_client().clone(),
        }
    }

    pub fn from_config(config: &StoreIntelConfig) -> Result<Self, StoreIntelError> {
        let (host, token) = config.credentials()?;
        Ok(Self::new(host, token))
    }

    /// Use a specific reqwest client instead of the shared one.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn space_url(&self, space_id: &str) -> String {
        format!("{}/api/2.0/genie/spaces/{space_id}", self.host)
    }

    fn message_url(&self, message: &MessageRef) -> String {
        format!(
            "{}/conversations/{}/messages/{}",
            self.space_url(message.space_id()),
            message.conversation_id(),
            message.message_id()
        )
    }
}

#[async_trait]
impl GenieTransport for HttpGenieTransport {
    async fn start_conversation(
        &self,
        space_id: &str,
        content: &str,
    ) -> Result<MessageRef, StoreIntelError> {
        let url = format!("{}/start-conversation", self.space_url(space_id));
        debug!(space_id, "Genie start-conversation");

        let resp = self
            .client
            .post(&url)
            .headers(bearer_headers(&self.token))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        let data: StartConversationResponse = serde_json::from_value(read_json_body(resp).await?)?;

        Ok(MessageRef::new(space_id, data.conversation_id, data.message_id))
    }

    async fn get_message(&self, message: &MessageRef) -> Result<GenieMessage, StoreIntelError> {
        let resp = self
            .client
            .get(self.message_url(message))
            .headers(bearer_headers(&self.token))
            .send()
            .await?;
        Ok(serde_json::from_value(read_json_body(resp).await?)?)
    }

    async fn get_query_result(
        &self,
        message: &MessageRef,
        attachment_id: &str,
    ) -> Result<serde_json::Value, StoreIntelError> {
        let url = format!(
            "{}/attachments/{attachment_id}/query-result",
            self.message_url(message)
        );
        debug!(
            conversation_id = message.conversation_id(),
            message_id = message.message_id(),
            attachment_id,
            "Genie query-result"
        );

        let resp = self
            .client
            .get(&url)
            .headers(bearer_headers(&self.token))
            .send()
            .await?;
        let mut body = read_json_body(resp).await?;

        // Only the statement response is the answer; fall back to the full
        // body if the service ever returns it unwrapped.
        Ok(match body.get_mut("statement_response") {
            Some(statement) => statement.take(),
            None => body,
        })
    }
}
