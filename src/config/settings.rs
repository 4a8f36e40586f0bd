//! Configuration settings for the Termin MCP server.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the server binary and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub calendar: CalendarConfig,
    pub mail: MailConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            calendar: CalendarConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Config {
    /// Read and validate a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration from the usual locations, falling back to
    /// built-in defaults when no file exists.
    pub fn load() -> Result<Self> {
        // Probe order: working directory first, then per-user locations.
        let config_paths = [
            PathBuf::from("termin.toml"),
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .map(|p| p.join("termin/config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".termin/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!(path = %path.display(), "Using configuration file");
                return Self::from_file(path);
            }
        }

        tracing::info!("No configuration file found, using built-in defaults");
        Ok(Config::default())
    }

    /// Reject settings that cannot work at runtime.
    fn validate(&self) -> Result<()> {
        if self.server.transport == TransportType::Http && self.server.http_port == 0 {
            return Err(ConfigError::Invalid("http_port must be > 0".to_string()).into());
        }

        if self.calendar.schedule_file.is_empty() {
            return Err(ConfigError::MissingField("calendar.schedule_file".to_string()).into());
        }

        if self.mail.maildir.is_empty() {
            return Err(ConfigError::MissingField("mail.maildir".to_string()).into());
        }
        if self.mail.inbox.is_empty() {
            return Err(ConfigError::MissingField("mail.inbox".to_string()).into());
        }
        if self.mail.drafts_folder.is_empty() {
            return Err(ConfigError::MissingField("mail.drafts_folder".to_string()).into());
        }
        if self.mail.sender.is_empty() {
            return Err(ConfigError::MissingField("mail.sender".to_string()).into());
        }

        Ok(())
    }

    /// Expand the schedule file path.
    pub fn schedule_path(&self) -> Result<PathBuf> {
        expand_path(&self.calendar.schedule_file)
    }

    /// Expand the maildir root path.
    pub fn maildir_path(&self) -> Result<PathBuf> {
        expand_path(&self.mail.maildir)
    }
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).map_err(|e| ConfigError::PathExpansion(e.to_string()))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// MCP serving options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Transport the server speaks ("stdio" or "http")
    pub transport: TransportType,
    /// Listen port, meaningful for the http transport only
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportType::Stdio,
            http_port: 8080,
        }
    }
}

/// Supported MCP transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Stdio,
    Http,
}

/// Calendar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Path of the schedule document
    pub schedule_file: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            schedule_file: "~/.local/share/termin/schedule.json".to_string(),
        }
    }
}

/// Mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Root directory of the file-backed mail store
    pub maildir: String,
    /// Mailbox searched when a tool call names none
    pub inbox: String,
    /// Folder confirmation drafts are written to
    pub drafts_folder: String,
    /// Sender address stamped on drafts
    pub sender: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            maildir: "~/.local/share/termin/mail".to_string(),
            inbox: "INBOX".to_string(),
            drafts_folder: "Drafts".to_string(),
            sender: "scheduler@localhost".to_string(),
        }
    }
}
