//! Mailbox collaborator interface.
//!
//! The scheduling engine only needs a capability to persist a confirmation
//! draft and to list/fetch messages with threading metadata. Production and
//! test implementations live behind this trait and are selected by
//! injection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailError;

/// Message headers and body as returned by a metadata fetch. Absent headers
/// are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub subject: String,
    pub from: String,
    pub to: String,
    pub date: String,
    pub message_id: String,
    #[serde(default)]
    pub in_reply_to: String,
    #[serde(default)]
    pub references: String,
    pub body: String,
}

/// A mail store holding confirmation drafts and received messages.
///
/// Sessions are scoped per engine operation: open, operate, close, with
/// close guaranteed on every exit path after a successful open. Operations
/// outside an open session fail with [`MailError::NotConnected`].
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Open a session.
    async fn open_session(&self) -> Result<(), MailError>;

    /// Persist a confirmation draft. Returns whether the store accepted it.
    ///
    /// A reply reference is propagated into both the in-reply-to and the
    /// references fields, following mail threading convention.
    async fn record_confirmation(
        &self,
        subject: &str,
        body: &str,
        to: &str,
        in_reply_to: Option<&str>,
    ) -> Result<bool, MailError>;

    /// List message ids in a mailbox matching the filter criteria.
    async fn list_messages(&self, mailbox: &str, criteria: &str)
        -> Result<Vec<String>, MailError>;

    /// Fetch one message's metadata, marking the message seen.
    async fn fetch_message_metadata(
        &self,
        id: &str,
        mailbox: &str,
    ) -> Result<MessageMetadata, MailError>;

    /// Close the session.
    async fn close_session(&self) -> Result<(), MailError>;
}
