//! Genie conversational query client.
//!
//! A Genie space answers natural-language questions asynchronously: a
//! question opens a conversation, the resulting message is polled until the
//! service finishes, and the tabular answer is fetched through the message's
//! first attachment. [`GenieClient::fetch_answer`] hides that exchange behind
//! one call; the wire calls themselves sit behind [`GenieTransport`].

pub mod client;
pub mod transport;
pub mod types;

pub use client::{GenieClient, PollPolicy};
pub use transport::{GenieTransport, HttpGenieTransport};
pub use types::{
    Attachment, GenieAnswer, GenieMessage, MessageError, MessageRef, MessageStatus, QueryResult,
};
