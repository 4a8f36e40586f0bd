//! File-backed mailbox implementation.
//!
//! One JSON file per message, grouped into per-mailbox directories under a
//! root folder. The draft folder is created on demand when the first
//! confirmation is recorded. A metadata fetch marks the message seen, so
//! `UNSEEN` searches behave the way they do against a real mail store.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::MailError;
use crate::mail::mailbox::{Mailbox, MessageMetadata};

/// On-disk message record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredMessage {
    subject: String,
    from: String,
    to: String,
    date: String,
    message_id: String,
    #[serde(default)]
    in_reply_to: String,
    #[serde(default)]
    references: String,
    body: String,
    #[serde(default)]
    seen: bool,
}

impl From<StoredMessage> for MessageMetadata {
    fn from(message: StoredMessage) -> Self {
        Self {
            subject: message.subject,
            from: message.from,
            to: message.to,
            date: message.date,
            message_id: message.message_id,
            in_reply_to: message.in_reply_to,
            references: message.references,
            body: message.body,
        }
    }
}

/// Search criteria understood by [`FileMailbox::list_messages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageFilter {
    All,
    Seen,
    Unseen,
}

impl MessageFilter {
    fn parse(criteria: &str) -> Result<Self, MailError> {
        match criteria.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "SEEN" => Ok(Self::Seen),
            // The empty string falls back to the conventional default.
            "UNSEEN" | "" => Ok(Self::Unseen),
            other => Err(MailError::UnsupportedCriteria(other.to_string())),
        }
    }

    fn matches(self, message: &StoredMessage) -> bool {
        match self {
            Self::All => true,
            Self::Seen => message.seen,
            Self::Unseen => !message.seen,
        }
    }
}

/// Production mailbox persisting messages under a root directory.
pub struct FileMailbox {
    root: PathBuf,
    drafts_folder: String,
    sender: String,
    connected: RwLock<bool>,
}

impl FileMailbox {
    pub fn new(
        root: impl Into<PathBuf>,
        drafts_folder: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            drafts_folder: drafts_folder.into(),
            sender: sender.into(),
            connected: RwLock::new(false),
        }
    }

    fn check_connected(&self) -> Result<(), MailError> {
        if *self.connected.read().unwrap() {
            Ok(())
        } else {
            Err(MailError::NotConnected)
        }
    }

    fn mailbox_dir(&self, mailbox: &str) -> Result<PathBuf, MailError> {
        let dir = self.root.join(mailbox);
        if !dir.is_dir() {
            return Err(MailError::MailboxNotFound(mailbox.to_string()));
        }
        Ok(dir)
    }

    fn read_message(path: &Path) -> Result<StoredMessage, MailError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_message(path: &Path, message: &StoredMessage) -> Result<(), MailError> {
        let raw = serde_json::to_string_pretty(message)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[async_trait]
impl Mailbox for FileMailbox {
    async fn open_session(&self) -> Result<(), MailError> {
        std::fs::create_dir_all(&self.root)?;
        *self.connected.write().unwrap() = true;
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

        let folder = self.root.join(&self.drafts_folder);
        if let Err(e) = std::fs::create_dir_all(&folder) {
            tracing::error!("Failed to create draft folder {}: {}", folder.display(), e);
            return Ok(false);
        }

        let reference = in_reply_to.unwrap_or_default();
        let id = Uuid::new_v4();
        let message = StoredMessage {
            subject: subject.to_string(),
            from: self.sender.clone(),
            to: to.to_string(),
            date: Utc::now().to_rfc2822(),
            message_id: format!("<{}@termin.local>", id),
            in_reply_to: reference.to_string(),
            references: reference.to_string(),
            body: body.to_string(),
            seen: false,
        };

        match Self::write_message(&folder.join(format!("{}.json", id)), &message) {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::error!("Failed to record confirmation draft: {}", e);
                Ok(false)
            }
        }
    }

    async fn list_messages(
        &self,
        mailbox: &str,
        criteria: &str,
    ) -> Result<Vec<String>, MailError> {
        self.check_connected()?;

        let filter = MessageFilter::parse(criteria)?;
        let dir = self.mailbox_dir(mailbox)?;

        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let message = Self::read_message(&path)?;
            if filter.matches(&message) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn fetch_message_metadata(
        &self,
        id: &str,
        mailbox: &str,
    ) -> Result<MessageMetadata, MailError> {
        self.check_connected()?;

        let dir = self.mailbox_dir(mailbox)?;
        let path = dir.join(format!("{}.json", id));
        if !path.is_file() {
            return Err(MailError::MessageNotFound(id.to_string()));
        }

        let mut message = Self::read_message(&path)?;
        if !message.seen {
            message.seen = true;
            Self::write_message(&path, &message)?;
        }

        Ok(message.into())
    }

    async fn close_session(&self) -> Result<(), MailError> {
        *self.connected.write().unwrap() = false;
        Ok(())
    }
}
