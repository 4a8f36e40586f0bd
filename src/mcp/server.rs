//! MCP server implementation for Termin.

use std::future::Future;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::*,
    schemars, tool, tool_handler, tool_router, Error as McpError, ServerHandler,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::mail::FileMailbox;
use crate::mcp::tools::{BlockSlotResponse, EmailInfo, FreeSlotsResponse, SearchEmailsResponse};
use crate::schedule::{ReservationRequest, ScheduleStore, SchedulingEngine};

/// Termin MCP server state.
pub struct TerminState {
    /// Settings the engine is built from
    pub config: Config,
    /// Scheduling engine, created lazily on first tool call
    pub engine: Option<Arc<SchedulingEngine>>,
}

impl TerminState {
    pub fn new(config: Config) -> Self {
        Self::with_engine(config, None)
    }

    pub fn with_engine(config: Config, engine: Option<Arc<SchedulingEngine>>) -> Self {
        Self { config, engine }
    }
}

/// Termin MCP server handler.
#[derive(Clone)]
pub struct TerminServer {
    state: Arc<RwLock<TerminState>>,
    tool_router: ToolRouter<Self>,
}

impl TerminServer {
    /// Create a new Termin server with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            state: Arc::new(RwLock::new(TerminState::new(config))),
            tool_router: Self::tool_router(),
        }
    }

    /// Create a new Termin server with a shared engine.
    pub fn with_shared_engine(config: Config, engine: Arc<SchedulingEngine>) -> Self {
        Self {
            state: Arc::new(RwLock::new(TerminState::with_engine(config, Some(engine)))),
            tool_router: Self::tool_router(),
        }
    }

    /// Create a new Termin server with default configuration.
    pub fn with_defaults() -> crate::error::Result<Self> {
        let config = Config::load()?;
        Ok(Self::new(config))
    }

    /// Ensure the engine is initialized.
    async fn ensure_engine(&self) -> Result<(), McpError> {
        let mut state = self.state.write().await;
        if state.engine.is_none() {
            let schedule_path = state.config.schedule_path().map_err(|e| {
                McpError::internal_error(format!("Failed to resolve schedule path: {}", e), None)
            })?;
            let maildir = state.config.maildir_path().map_err(|e| {
                McpError::internal_error(format!("Failed to resolve maildir: {}", e), None)
            })?;

            let mailbox = Arc::new(FileMailbox::new(
                maildir,
                state.config.mail.drafts_folder.clone(),
                state.config.mail.sender.clone(),
            ));
            let engine = SchedulingEngine::new(ScheduleStore::new(schedule_path), mailbox)
                .map_err(|e| {
                    McpError::internal_error(format!("Failed to initialize engine: {}", e), None)
                })?;

            state.engine = Some(Arc::new(engine));
        }
        Ok(())
    }
}

// Parameters for save_draft_and_block_slot tool
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SaveDraftAndBlockSlotParams {
    /// ISO 8601 meeting start, e.g. 2025-12-15T14:00:00+01:00. Offset-less
    /// values are read in the calendar's timezone
    pub datetime: String,
    /// Meeting length in minutes, 1 to 1440
    pub duration_minutes: u64,
    /// Reason stored on the calendar entry (e.g. 'Meeting with Lisa')
    pub reason: String,
    /// Subject line of the confirmation email
    pub subject: String,
    /// Body of the confirmation email
    pub body: String,
    /// Recipient email address
    pub to: String,
    /// Message-ID this confirmation replies to, for email threading
    #[serde(default)]
    pub in_reply_to: Option<String>,
}

// Parameters for search_emails tool
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchEmailsParams {
    /// Mailbox to search (default: the configured inbox)
    #[serde(default)]
    pub mailbox: Option<String>,
    /// Search criteria: ALL, SEEN, or UNSEEN (default: UNSEEN)
    #[serde(default)]
    pub criteria: Option<String>,
}

#[tool_router]
impl TerminServer {
    /// List available meeting slots from the schedule.
    #[tool(
        description = "Get up to 50 available time slots from the calendar with timezone information. Holidays, blocked intervals, past times, and short-notice starts are filtered out automatically. Returns slots with date, start, end, and timezone."
    )]
    async fn get_free_slots(&self) -> Result<CallToolResult, McpError> {
        self.ensure_engine().await?;

        let state = self.state.read().await;
        let engine = state.engine.as_ref().unwrap();

        let slots = engine.free_slots();
        let response = FreeSlotsResponse {
            count: slots.len(),
            slots,
        };

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&response).unwrap(),
        )]))
    }

    /// Block a calendar slot and save a confirmation email draft.
    #[tool(
        description = "Block a calendar slot and save a confirmation email as a draft in one step. Requires an ISO 8601 datetime with timezone, a duration in minutes (1 to 1440), and the confirmation email content. Pass in_reply_to to thread the confirmation into an existing conversation. Returns a success flag."
    )]
    async fn save_draft_and_block_slot(
        &self,
        Parameters(params): Parameters<SaveDraftAndBlockSlotParams>,
    ) -> Result<CallToolResult, McpError> {
        if !(1..=1440).contains(&params.duration_minutes) {
            return Err(McpError::invalid_params(
                format!(
                    "duration_minutes must be between 1 and 1440, got {}",
                    params.duration_minutes
                ),
                None,
            ));
        }

        self.ensure_engine().await?;

        let state = self.state.read().await;
        let engine = state.engine.as_ref().unwrap();

        let request = ReservationRequest {
            datetime: params.datetime,
            duration: params.duration_minutes as i64,
            reason: params.reason,
            subject: params.subject,
            body: params.body,
            to: params.to,
            in_reply_to: params.in_reply_to.filter(|id| !id.is_empty()),
        };

        let success = engine.reserve_slot_and_notify(&request).await;
        let response = BlockSlotResponse {
            success,
            message: if success {
                "Slot blocked and confirmation draft saved".to_string()
            } else {
                "Failed to block the slot or save the draft; see server logs".to_string()
            },
        };

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&response).unwrap(),
        )]))
    }

    /// Search stored emails with threading metadata.
    #[tool(
        description = "Search emails in a mailbox and return full metadata including Message-ID, In-Reply-To, and References headers for email threading. Defaults to unseen messages in the configured inbox. Criteria: ALL, SEEN, or UNSEEN."
    )]
    async fn search_emails(
        &self,
        Parameters(params): Parameters<SearchEmailsParams>,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_engine().await?;

        let state = self.state.read().await;
        let engine = state.engine.as_ref().unwrap();

        let mailbox = params
            .mailbox
            .unwrap_or_else(|| state.config.mail.inbox.clone());
        let criteria = params.criteria.unwrap_or_else(|| "UNSEEN".to_string());

        match engine.search_messages(&mailbox, &criteria).await {
            Ok(messages) => {
                let emails: Vec<EmailInfo> = messages
                    .into_iter()
                    .map(|(id, metadata)| EmailInfo::from_metadata(id, metadata))
                    .collect();
                let response = SearchEmailsResponse {
                    count: emails.len(),
                    emails,
                };

                Ok(CallToolResult::success(vec![Content::text(
                    serde_json::to_string_pretty(&response).unwrap(),
                )]))
            }
            Err(e) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Failed to search emails: {}",
                e
            ))])),
        }
    }
}

#[tool_handler]
impl ServerHandler for TerminServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Termin is a meeting scheduling MCP server. \
                 It reports free calendar slots, blocks reserved slots, and files \
                 confirmation email drafts. Use 'get_free_slots' to list availability, \
                 'save_draft_and_block_slot' to confirm a meeting, \
                 and 'search_emails' to find meeting requests."
                    .to_string(),
            ),
        }
    }
}
