//! Wire and result types for Genie conversations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one message of one conversation in one space.
///
/// Produced by [`GenieTransport::start_conversation`](super::GenieTransport::start_conversation);
/// every later call in the exchange is keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    space_id: String,
    conversation_id: String,
    message_id: String,
}

impl MessageRef {
    /// Build a reference from the ids the service assigned.
    pub fn new(
        space_id: impl Into<String>,
        conversation_id: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            space_id: space_id.into(),
            conversation_id: conversation_id.into(),
            message_id: message_id.into(),
        }
    }

    pub fn space_id(&self) -> &str {
        &self.space_id
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }
}

/// Status of a Genie message.
///
/// The service owns this inventory and may add values at any time, so
/// unrecognised strings are kept in [`MessageStatus::Other`] and treated as
/// still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageStatus {
    Submitted,
    FetchingMetadata,
    FilteringContext,
    AskingAi,
    PendingWarehouse,
    ExecutingQuery,
    Completed,
    Failed,
    Cancelled,
    QueryResultExpired,
    Other(String),
}

impl MessageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::FetchingMetadata => "FETCHING_METADATA",
            Self::FilteringContext => "FILTERING_CONTEXT",
            Self::AskingAi => "ASKING_AI",
            Self::PendingWarehouse => "PENDING_WAREHOUSE",
            Self::ExecutingQuery => "EXECUTING_QUERY",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::QueryResultExpired => "QUERY_RESULT_EXPIRED",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Terminal states that will never produce a result.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled | Self::QueryResultExpired)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.is_failure()
    }
}

impl From<&str> for MessageStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "SUBMITTED" => Self::Submitted,
            "FETCHING_METADATA" => Self::FetchingMetadata,
            "FILTERING_CONTEXT" => Self::FilteringContext,
            "ASKING_AI" => Self::AskingAi,
            "PENDING_WAREHOUSE" => Self::PendingWarehouse,
            "EXECUTING_QUERY" => Self::ExecutingQuery,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            "QUERY_RESULT_EXPIRED" => Self::QueryResultExpired,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for MessageStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<MessageStatus> for String {
    fn from(status: MessageStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated query advertised by an attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Handle to a result produced by a completed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(alias = "id")]
    pub attachment_id: String,
    #[serde(default)]
    pub query: Option<AttachmentQuery>,
}

/// Error block the service attaches to failed messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageError {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// One poll of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenieMessage {
    #[serde(default)]
    pub status: Option<MessageStatus>,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default)]
    pub error: Option<MessageError>,
}

impl GenieMessage {
    pub fn attachments(&self) -> &[Attachment] {
        self.attachments.as_deref().unwrap_or(&[])
    }

    /// Best available explanation for a failed message.
    pub fn error_message(&self) -> Option<&str> {
        let error = self.error.as_ref()?;
        error.error.as_deref().or(error.kind.as_deref())
    }
}

/// Structured answer fetched through a message attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub conversation_id: String,
    pub message_id: String,
    pub attachment_id: String,
    /// SQL the service generated, when the attachment advertised it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The statement response exactly as the service returned it.
    pub statement: serde_json::Value,
}

/// Outcome of a successful exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenieAnswer {
    /// The message completed and its first attachment was fetched.
    Resolved(QueryResult),
    /// The message completed without attachments: a valid "no data" answer.
    Empty {
        conversation_id: String,
        message_id: String,
    },
}

impl GenieAnswer {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub fn statement(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Resolved(result) => Some(&result.statement),
            Self::Empty { .. } => None,
        }
    }

    pub fn into_result(self) -> Option<QueryResult> {
        match self {
            Self::Resolved(result) => Some(result),
            Self::Empty { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_is_kept_and_not_terminal() {
        let status: MessageStatus = serde_json::from_value(json!("REWRITING_QUERY")).unwrap();
        assert_eq!(status, MessageStatus::Other("REWRITING_QUERY".into()));
        assert!(!status.is_terminal());
        assert_eq!(status.to_string(), "REWRITING_QUERY");
    }

    #[test]
    fn status_round_trips_through_wire_names() {
        let status: MessageStatus = serde_json::from_value(json!("QUERY_RESULT_EXPIRED")).unwrap();
        assert!(status.is_failure());
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("QUERY_RESULT_EXPIRED"));
    }

    #[test]
    fn message_tolerates_null_attachments_and_missing_status() {
        let message: GenieMessage =
            serde_json::from_value(json!({"attachments": null, "id": "m1"})).unwrap();
        assert!(message.status.is_none());
        assert!(message.attachments().is_empty());
    }

    #[test]
    fn attachment_reads_generated_query() {
        let message: GenieMessage = serde_json::from_value(json!({
            "status": "COMPLETED",
            "attachments": [{
                "attachment_id": "a1",
                "query": {"query": "SELECT 1", "description": "one"}
            }]
        }))
        .unwrap();
        let attachment = &message.attachments()[0];
        assert_eq!(attachment.attachment_id, "a1");
        assert_eq!(
            attachment.query.as_ref().and_then(|q| q.query.as_deref()),
            Some("SELECT 1")
        );
    }

    #[test]
    fn error_message_prefers_error_text() {
        let message: GenieMessage = serde_json::from_value(json!({
            "status": "FAILED",
            "error": {"error": "warehouse stopped", "type": "SQL_EXECUTION_EXCEPTION"}
        }))
        .unwrap();
        assert_eq!(message.error_message(), Some("warehouse stopped"));
    }
}
