//! Durable storage for the schedule document.
//!
//! One JSON file holds the whole document. Every operation loads it in full;
//! every mutation rewrites it in full. Field order follows the struct
//! declarations, so rewrites stay diff-friendly.

use chrono::DateTime;
use chrono_tz::Tz;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::schedule::types::{BlockedInterval, ScheduleDocument};

/// Loads and saves the schedule file.
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with the default document if it does not exist yet.
    pub fn ensure_exists(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.save(&ScheduleDocument::default())?;
        tracing::info!("Created default schedule document at {}", self.path.display());
        Ok(())
    }

    /// Load and validate the document.
    pub fn load(&self) -> Result<ScheduleDocument, StorageError> {
        let raw = std::fs::read_to_string(&self.path).map_err(StorageError::ReadFile)?;
        let document: ScheduleDocument = serde_json::from_str(&raw)?;
        document.validate()?;
        Ok(document)
    }

    /// Validate and write the document, overwriting any previous contents.
    pub fn save(&self, document: &ScheduleDocument) -> Result<(), StorageError> {
        document.validate()?;
        let mut raw = serde_json::to_string_pretty(document)?;
        raw.push('\n');
        std::fs::write(&self.path, raw).map_err(StorageError::WriteFile)
    }

    /// Append one blocked interval: load, push, save.
    ///
    /// Plain read-modify-write; concurrent writers can lose updates. The
    /// engine is a single caller per document by contract.
    pub fn add_blocked(
        &self,
        start: DateTime<Tz>,
        duration: Option<u32>,
        until: Option<DateTime<Tz>>,
        reason: Option<String>,
    ) -> Result<(), StorageError> {
        let mut document = self.load()?;

        let entry = BlockedInterval::new(
            start.to_rfc3339(),
            duration,
            until.map(|dt| dt.to_rfc3339()),
            reason,
        )?;

        document.blocked.push(entry);
        self.save(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, ScheduleStore) {
        let dir = TempDir::new().unwrap();
        let store = ScheduleStore::new(dir.path().join("schedule.json"));
        (dir, store)
    }

    #[test]
    fn test_ensure_exists_creates_default() {
        let (_dir, store) = create_test_store();
        store.ensure_exists().unwrap();

        let document = store.load().unwrap();
        assert_eq!(document, ScheduleDocument::default());
    }

    #[test]
    fn test_ensure_exists_keeps_existing_file() {
        let (_dir, store) = create_test_store();
        store.ensure_exists().unwrap();

        let mut document = store.load().unwrap();
        document.schedule.slot_duration = 60;
        store.save(&document).unwrap();

        store.ensure_exists().unwrap();
        assert_eq!(store.load().unwrap().schedule.slot_duration, 60);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let (_dir, store) = create_test_store();
        assert!(matches!(store.load(), Err(StorageError::ReadFile(_))));
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let (_dir, store) = create_test_store();
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(StorageError::Parse(_))));
    }

    #[test]
    fn test_load_invalid_document_fails() {
        let (_dir, store) = create_test_store();
        let raw = r#"{"schedule": {"timezone": "Europe/Atlantis", "slot_duration": 30, "weekly": []}}"#;
        std::fs::write(store.path(), raw).unwrap();
        assert!(matches!(store.load(), Err(StorageError::Invalid(_))));
    }

    #[test]
    fn test_save_load_round_trip_is_stable() {
        let (_dir, store) = create_test_store();
        store.ensure_exists().unwrap();

        let first = std::fs::read_to_string(store.path()).unwrap();
        let document = store.load().unwrap();
        store.save(&document).unwrap();
        let second = std::fs::read_to_string(store.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.load().unwrap(), document);
    }

    #[test]
    fn test_add_blocked_appends_in_order() {
        let (_dir, store) = create_test_store();
        store.ensure_exists().unwrap();

        let first = Berlin.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap();
        let second = Berlin.with_ymd_and_hms(2025, 1, 7, 14, 0, 0).unwrap();
        store
            .add_blocked(first, Some(60), None, Some("Team sync".to_string()))
            .unwrap();
        store.add_blocked(second, Some(30), None, None).unwrap();

        let document = store.load().unwrap();
        assert_eq!(document.blocked.len(), 2);
        assert_eq!(document.blocked[0].reason.as_deref(), Some("Team sync"));
        assert_eq!(document.blocked[0].duration, Some(60));
        assert!(document.blocked[0].datetime.starts_with("2025-01-06T10:00:00"));
        assert!(document.blocked[1].datetime.starts_with("2025-01-07T14:00:00"));
    }

    #[test]
    fn test_add_blocked_with_until() {
        let (_dir, store) = create_test_store();
        store.ensure_exists().unwrap();

        let start = Berlin.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap();
        let until = Berlin.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap();
        store
            .add_blocked(start, None, Some(until), Some("Workshop".to_string()))
            .unwrap();

        let document = store.load().unwrap();
        let entry = &document.blocked[0];
        assert_eq!(entry.duration, None);
        assert!(entry.until.as_deref().unwrap().starts_with("2025-01-06T12:00:00"));
    }
}
