//! MCP tool payloads for Termin.

use serde::{Deserialize, Serialize};

use crate::mail::MessageMetadata;
use crate::schedule::AvailableSlot;

/// Free slots response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeSlotsResponse {
    /// Available slots, earliest first
    pub slots: Vec<AvailableSlot>,
    /// Number of slots returned
    pub count: usize,
}

/// Block slot response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSlotResponse {
    /// Whether the slot was blocked and the draft recorded
    pub success: bool,
    /// Status message
    pub message: String,
}

/// One email in a search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailInfo {
    /// Message id within its mailbox
    pub id: String,
    /// Subject header
    pub subject: String,
    /// From header
    pub from: String,
    /// To header
    pub to: String,
    /// Date header
    pub date: String,
    /// Message-ID header
    pub message_id: String,
    /// In-Reply-To header, empty when absent
    #[serde(default)]
    pub in_reply_to: String,
    /// References header, empty when absent
    #[serde(default)]
    pub references: String,
    /// Message body
    pub body: String,
}

impl EmailInfo {
    /// Build the payload entry from a fetched message.
    pub fn from_metadata(id: String, metadata: MessageMetadata) -> Self {
        Self {
            id,
            subject: metadata.subject,
            from: metadata.from,
            to: metadata.to,
            date: metadata.date,
            message_id: metadata.message_id,
            in_reply_to: metadata.in_reply_to,
            references: metadata.references,
            body: metadata.body,
        }
    }
}

/// Email search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEmailsResponse {
    /// Matching messages with full metadata
    pub emails: Vec<EmailInfo>,
    /// Number of matches
    pub count: usize,
}
