//! CLI module for the Termin command-line interface.
//!
//! This module provides command handlers that execute scheduling
//! operations against the local schedule document.

mod commands;
mod output;

pub use commands::*;
