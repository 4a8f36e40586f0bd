//! Configuration loading and validation.

mod settings;

pub use settings::{CalendarConfig, Config, MailConfig, ServerConfig, TransportType};
