//! Tests for the MCP server surface.

use std::sync::Arc;

use tempfile::TempDir;

use termin::config::Config;
use termin::mail::MemoryMailbox;
use termin::mcp::TerminServer;
use termin::schedule::{ScheduleStore, SchedulingEngine};

/// Configuration whose schedule file and maildir live under a temp dir.
fn test_config(data_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.calendar.schedule_file = data_dir
        .join("schedule.json")
        .to_string_lossy()
        .to_string();
    config.mail.maildir = data_dir.join("mail").to_string_lossy().to_string();
    config
}

#[tokio::test]
async fn test_server_constructs_without_engine() {
    let data_dir = TempDir::new().unwrap();
    let config = test_config(data_dir.path());

    let server = TerminServer::new(config);

    // The engine is lazy, so constructing the server must not touch disk.
    assert!(!data_dir.path().join("schedule.json").exists());
    drop(server);
}

#[tokio::test]
async fn test_server_info() {
    use rmcp::ServerHandler;

    let data_dir = TempDir::new().unwrap();
    let config = test_config(data_dir.path());
    let server = TerminServer::new(config);

    let info = server.get_info();
    // from_build_env() resolves names at rmcp's own compile time, so the
    // reported name is not ours. Presence is all we can pin down.
    assert!(!info.server_info.name.is_empty());
    assert!(!info.server_info.version.is_empty());

    let instructions = info.instructions.expect("server should ship instructions");
    assert!(
        instructions.contains("meeting") || instructions.contains("Termin"),
        "instructions should describe the scheduling domain"
    );
}

#[tokio::test]
async fn test_server_with_shared_engine() {
    let data_dir = TempDir::new().unwrap();
    let config = test_config(data_dir.path());

    let store = ScheduleStore::new(data_dir.path().join("schedule.json"));
    let mailbox = Arc::new(MemoryMailbox::new());
    let engine = Arc::new(SchedulingEngine::new(store, mailbox).unwrap());

    // Building the engine eagerly writes the starter document.
    assert!(data_dir.path().join("schedule.json").exists());

    let server = TerminServer::with_shared_engine(config, engine);
    drop(server);
}
