//! Error types for the Termin MCP server.

use thiserror::Error;

/// Main error type for Termin operations.
#[derive(Error, Debug)]
pub enum TerminError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Path expansion failed: {0}")]
    PathExpansion(String),
}

/// Schedule model validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Interval end {end} is not after start {start}")]
    EmptyInterval { start: String, end: String },

    #[error("Weekly availability entry has no days")]
    NoDays,

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Slot duration {0} outside 5..=480 minutes")]
    SlotDurationOutOfRange(u32),

    #[error("Blocked entry has both duration and until")]
    DurationAndUntil,

    #[error("Timed blocked entry has neither duration nor until")]
    UnboundedBlock,

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Local time {0} does not exist in timezone {1}")]
    NonexistentLocalTime(String, String),
}

/// Schedule persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read schedule file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to write schedule file: {0}")]
    WriteFile(#[source] std::io::Error),

    #[error("Failed to parse schedule: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid schedule document: {0}")]
    Invalid(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Mailbox collaborator errors.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("No open mail session")]
    NotConnected,

    #[error("Mailbox not found: {0}")]
    MailboxNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Unsupported search criteria: {0}")]
    UnsupportedCriteria(String),

    #[error("Malformed message file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Termin operations.
pub type Result<T> = std::result::Result<T, TerminError>;
