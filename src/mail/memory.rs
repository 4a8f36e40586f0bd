//! In-memory mailbox for tests and dry runs.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::error::MailError;
use crate::mail::mailbox::{Mailbox, MessageMetadata};

#[derive(Debug, Default)]
struct State {
    connected: bool,
    next_id: u64,
    messages: Vec<(String, MessageMetadata)>,
}

/// Mailbox keeping everything in memory, with switches to simulate an
/// unreachable or rejecting store.
pub struct MemoryMailbox {
    state: RwLock<State>,
    fail_on_open: bool,
    fail_on_record: bool,
}

impl MemoryMailbox {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            fail_on_open: false,
            fail_on_record: false,
        }
    }

    /// Make `open_session` fail, as an unreachable store would.
    pub fn with_open_failure(mut self) -> Self {
        self.fail_on_open = true;
        self
    }

    /// Make `record_confirmation` report rejection.
    pub fn with_record_failure(mut self) -> Self {
        self.fail_on_record = true;
        self
    }

    /// Messages recorded so far, in order.
    pub fn saved_drafts(&self) -> Vec<MessageMetadata> {
        let state = self.state.read().unwrap();
        state.messages.iter().map(|(_, m)| m.clone()).collect()
    }

    /// Whether a session is currently open.
    pub fn is_connected(&self) -> bool {
        self.state.read().unwrap().connected
    }

    fn check_connected(&self) -> Result<(), MailError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(MailError::NotConnected)
        }
    }
}

impl Default for MemoryMailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailbox for MemoryMailbox {
    async fn open_session(&self) -> Result<(), MailError> {
        if self.fail_on_open {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "mailbox unreachable",
            )
            .into());
        }
        self.state.write().unwrap().connected = true;
        Ok(())
    }

    async fn record_confirmation(
        &self,
        subject: &str,
        body: &str,
        to: &str,
        in_reply_to: Option<&str>,
    ) -> Result<bool, MailError> {
        self.check_connected()?;
        if self.fail_on_record {
            return Ok(false);
        }

        let reference = in_reply_to.unwrap_or_default();
        let mut state = self.state.write().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.messages.push((
            id.to_string(),
            MessageMetadata {
                subject: subject.to_string(),
                from: "scheduler@example.com".to_string(),
                to: to.to_string(),
                date: "Mon, 15 Dec 2025 10:00:00 +0100".to_string(),
                message_id: format!("<{}.termin@example.invalid>", id),
                in_reply_to: reference.to_string(),
                references: reference.to_string(),
                body: body.to_string(),
            },
        ));
        Ok(true)
    }

    /// Lists every stored message; the mailbox and criteria arguments are
    /// accepted and ignored.
    async fn list_messages(
        &self,
        _mailbox: &str,
        _criteria: &str,
    ) -> Result<Vec<String>, MailError> {
        self.check_connected()?;
        let state = self.state.read().unwrap();
        Ok(state.messages.iter().map(|(id, _)| id.clone()).collect())
    }

    async fn fetch_message_metadata(
        &self,
        id: &str,
        _mailbox: &str,
    ) -> Result<MessageMetadata, MailError> {
        self.check_connected()?;
        let state = self.state.read().unwrap();
        state
            .messages
            .iter()
            .find(|(stored_id, _)| stored_id == id)
            .map(|(_, metadata)| metadata.clone())
            .ok_or_else(|| MailError::MessageNotFound(id.to_string()))
    }

    async fn close_session(&self) -> Result<(), MailError> {
        self.state.write().unwrap().connected = false;
        Ok(())
    }
}
