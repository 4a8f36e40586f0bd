//! Scheduling engine over the schedule document and the mailbox.
//!
//! The engine is the operation boundary the serving layers call into.
//! Read operations reload the document on every call so edits made
//! outside the process are picked up. The reservation path appends the
//! blocked interval before touching the mailbox, so a failed
//! notification never silently frees a slot that was promised.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::mail::{Mailbox, MessageMetadata};
use crate::schedule::finder::{SlotFinder, SlotQuery};
use crate::schedule::store::ScheduleStore;
use crate::schedule::types::{parse_zoned_datetime, AvailableSlot};

// ============================================================================
// Scheduling Engine
// ============================================================================

/// Cap on the number of slots reported by [`SchedulingEngine::free_slots`].
const FREE_SLOTS_CAP: usize = 50;

/// A reservation to perform: the interval to block plus the confirmation
/// draft announcing it.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    /// Start of the meeting. Offset-less values are read in the document's
    /// timezone.
    pub datetime: String,
    /// Meeting length in minutes. Must be positive.
    pub duration: i64,
    /// Reason stored on the blocked interval.
    pub reason: String,
    /// Subject line of the confirmation draft.
    pub subject: String,
    /// Body of the confirmation draft.
    pub body: String,
    /// Recipient of the confirmation draft.
    pub to: String,
    /// Message id the draft replies to, if any.
    pub in_reply_to: Option<String>,
}

/// Coordinates the schedule store, the slot finder, and the mailbox.
pub struct SchedulingEngine {
    store: ScheduleStore,
    mailbox: Arc<dyn Mailbox>,
}

impl SchedulingEngine {
    /// Create an engine over the store, writing the default document first
    /// if the schedule file does not exist yet.
    pub fn new(store: ScheduleStore, mailbox: Arc<dyn Mailbox>) -> Result<Self> {
        store.ensure_exists()?;
        Ok(Self { store, mailbox })
    }

    /// The underlying schedule store.
    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    /// Up to 50 free slots starting today, earliest first.
    ///
    /// This is a reporting call and never fails: an unreadable or invalid
    /// document degrades to an empty list with the failure logged.
    pub fn free_slots(&self) -> Vec<AvailableSlot> {
        let document = match self.store.load() {
            Ok(document) => document,
            Err(e) => {
                error!("Failed to load schedule document: {}", e);
                return Vec::new();
            }
        };

        let finder = match SlotFinder::new(document) {
            Ok(finder) => finder,
            Err(e) => {
                error!("Schedule document failed validation: {}", e);
                return Vec::new();
            }
        };

        let query = SlotQuery::default().with_max_results(FREE_SLOTS_CAP);
        match finder.find_available_slots(&query) {
            Ok(slots) => {
                debug!("Found {} free slots", slots.len());
                slots
            }
            Err(e) => {
                error!("Failed to enumerate free slots: {}", e);
                Vec::new()
            }
        }
    }

    /// Whether [start,end) on the date could be booked, with the rejection
    /// reason when it could not.
    pub fn check_slot(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(bool, String)> {
        let document = self.store.load()?;
        let finder = SlotFinder::new(document)?;
        Ok(finder.is_slot_bookable(date, start, end)?)
    }

    /// Block the requested interval, then record a confirmation draft in
    /// the mailbox.
    ///
    /// The blocked interval is durable as soon as it is written and is not
    /// rolled back when the notification fails; the return value reports
    /// whether the draft was recorded. Invalid input and downstream
    /// failures all degrade to `false` with the cause logged.
    pub async fn reserve_slot_and_notify(&self, request: &ReservationRequest) -> bool {
        let document = match self.store.load() {
            Ok(document) => document,
            Err(e) => {
                error!("Failed to load schedule document: {}", e);
                return false;
            }
        };
        let zone = match document.schedule.tz() {
            Ok(zone) => zone,
            Err(e) => {
                error!("Schedule document failed validation: {}", e);
                return false;
            }
        };

        let start = match parse_zoned_datetime(&request.datetime, zone) {
            Ok(start) => start,
            Err(e) => {
                error!("Invalid reservation start '{}': {}", request.datetime, e);
                return false;
            }
        };
        let duration = match u32::try_from(request.duration) {
            Ok(minutes) if minutes > 0 => minutes,
            _ => {
                error!("Invalid reservation duration: {}", request.duration);
                return false;
            }
        };

        if let Err(e) =
            self.store
                .add_blocked(start, Some(duration), None, Some(request.reason.clone()))
        {
            error!("Failed to record blocked interval: {}", e);
            return false;
        }
        debug!(
            "Blocked {} minutes starting {} ({})",
            duration, request.datetime, request.reason
        );

        self.record_confirmation(request).await
    }

    /// Record the confirmation draft within one mail session.
    async fn record_confirmation(&self, request: &ReservationRequest) -> bool {
        if let Err(e) = self.mailbox.open_session().await {
            error!("Failed to open mail session: {}", e);
            return false;
        }

        let recorded = self
            .mailbox
            .record_confirmation(
                &request.subject,
                &request.body,
                &request.to,
                request.in_reply_to.as_deref(),
            )
            .await;

        if let Err(e) = self.mailbox.close_session().await {
            warn!("Failed to close mail session: {}", e);
        }

        match recorded {
            Ok(saved) => saved,
            Err(e) => {
                error!("Failed to record confirmation draft: {}", e);
                false
            }
        }
    }

    /// List the matching messages in a mailbox and fetch each one's
    /// metadata, within one mail session.
    pub async fn search_messages(
        &self,
        mailbox: &str,
        criteria: &str,
    ) -> Result<Vec<(String, MessageMetadata)>> {
        self.mailbox.open_session().await?;

        let fetched = self.fetch_matching(mailbox, criteria).await;

        if let Err(e) = self.mailbox.close_session().await {
            warn!("Failed to close mail session: {}", e);
        }

        fetched
    }

    async fn fetch_matching(
        &self,
        mailbox: &str,
        criteria: &str,
    ) -> Result<Vec<(String, MessageMetadata)>> {
        let ids = self.mailbox.list_messages(mailbox, criteria).await?;
        debug!("Criteria '{}' matched {} messages", criteria, ids.len());

        let mut messages = Vec::with_capacity(ids.len());
        for id in ids {
            let metadata = self.mailbox.fetch_message_metadata(&id, mailbox).await?;
            messages.push((id, metadata));
        }
        Ok(messages)
    }
}

// ============================================================================
// Tests
// ============================================================================
