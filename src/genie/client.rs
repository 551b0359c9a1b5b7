//! Request/poll/fetch exchange against a Genie space.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::StoreIntelConfig;
use crate::error::StoreIntelError;

use super::transport::{GenieTransport, HttpGenieTransport};
use super::types::{GenieAnswer, MessageStatus, QueryResult};

/// How often and for how long a message is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait between two status polls.
    pub interval: Duration,
    /// Budget measured from the first poll; exceeded means [`StoreIntelError::Timeout`].
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Client for asking questions of Genie spaces.
///
/// Cheap to clone; clones share the transport. Each call runs its own
/// exchange and keeps no state once it returns.
#[derive(Clone)]
pub struct GenieClient {
    transport: Arc<dyn GenieTransport>,
    policy: PollPolicy,
}

impl std::fmt::Debug for GenieClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenieClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl GenieClient {
    pub fn new(transport: Arc<dyn GenieTransport>) -> Self {
        Self {
            transport,
            policy: PollPolicy::default(),
        }
    }

    /// HTTP client using the configured host, token and poll policy.
    pub fn from_config(config: &StoreIntelConfig) -> Result<Self, StoreIntelError> {
        let transport = HttpGenieTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport)).with_poll_policy(config.poll_policy()))
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.policy
    }

    /// Ask `query` of the space `space_id` and wait for the answer.
    pub async fn fetch_answer(
        &self,
        space_id: &str,
        query: &str,
    ) -> Result<GenieAnswer, StoreIntelError> {
        self.fetch_answer_with_cancel(space_id, query, &CancellationToken::new())
            .await
    }

    /// Like [`fetch_answer`](Self::fetch_answer), but stops as soon as
    /// `cancel` fires with [`StoreIntelError::Cancelled`].
    ///
    /// Transport failures in any phase are returned immediately and never
    /// retried. A completed message without attachments yields
    /// [`GenieAnswer::Empty`].
    pub async fn fetch_answer_with_cancel(
        &self,
        space_id: &str,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<GenieAnswer, StoreIntelError> {
        if space_id.trim().is_empty() {
            return Err(StoreIntelError::InvalidArgument(
                "Genie space id must not be empty".into(),
            ));
        }
        if query.trim().is_empty() {
            return Err(StoreIntelError::InvalidArgument(
                "Genie query must not be empty".into(),
            ));
        }

        let message = until_cancelled(cancel, self.transport.start_conversation(space_id, query))
            .await?;
        debug!(
            space_id,
            conversation_id = message.conversation_id(),
            message_id = message.message_id(),
            "Genie conversation started"
        );

        let started = Instant::now();
        let mut attempt: u32 = 0;
        let completed = loop {
            attempt += 1;
            let polled = until_cancelled(cancel, self.transport.get_message(&message)).await?;

            match polled.status.clone() {
                Some(status) if status.is_completed() => break polled,
                Some(status) if status.is_failure() => {
                    let reason = polled
                        .error_message()
                        .unwrap_or("no error details reported")
                        .to_string();
                    warn!(
                        space_id,
                        conversation_id = message.conversation_id(),
                        message_id = message.message_id(),
                        status = %status,
                        "Genie message failed"
                    );
                    return Err(StoreIntelError::QueryFailed {
                        status: status.to_string(),
                        message: reason,
                    });
                }
                status => {
                    debug!(
                        attempt,
                        status = status.as_ref().map(MessageStatus::as_str).unwrap_or("<missing>"),
                        "Genie message still running"
                    );
                }
            }

            if started.elapsed() > self.policy.timeout {
                warn!(
                    space_id,
                    conversation_id = message.conversation_id(),
                    message_id = message.message_id(),
                    attempts = attempt,
                    "Genie query timed out"
                );
                return Err(StoreIntelError::Timeout(self.policy.timeout.as_millis() as u64));
            }

            until_cancelled(cancel, async {
                tokio::time::sleep(self.policy.interval).await;
                Ok(())
            })
            .await?;
        };

        let Some(attachment) = completed.attachments().first() else {
            debug!(
                conversation_id = message.conversation_id(),
                message_id = message.message_id(),
                "Genie message completed without attachments"
            );
            return Ok(GenieAnswer::Empty {
                conversation_id: message.conversation_id().to_string(),
                message_id: message.message_id().to_string(),
            });
        };

        let statement = until_cancelled(
            cancel,
            self.transport
                .get_query_result(&message, &attachment.attachment_id),
        )
        .await?;

        let (sql, description) = match &attachment.query {
            Some(q) => (q.query.clone(), q.description.clone()),
            None => (None, None),
        };

        Ok(GenieAnswer::Resolved(QueryResult {
            conversation_id: message.conversation_id().to_string(),
            message_id: message.message_id().to_string(),
            attachment_id: attachment.attachment_id.clone(),
            sql,
            description,
            statement,
        }))
    }
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, StoreIntelError>>,
) -> Result<T, StoreIntelError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreIntelError::Cancelled),
        result = fut => result,
    }
}
