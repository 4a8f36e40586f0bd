//! Binary entry point: one-shot scheduling commands and the MCP server.

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use termin::config::TransportType;
use termin::{run_server, Config, TerminServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

/// Termin: Meeting Scheduling MCP Server
#[derive(Parser, Debug)]
#[command(name = "termin")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file to use instead of the default search path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List free meeting slots
    Slots {
        /// First date to consider (YYYY-MM-DD, default: today)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last date to consider, inclusive (YYYY-MM-DD, default: 30 days after from)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Maximum number of slots
        #[arg(short, long, default_value = "10")]
        max: usize,
        /// Minimum notice in hours
        #[arg(short, long, default_value = "2")]
        notice: i64,
    },
    /// Check whether a specific slot could be booked
    Check {
        /// Date of the slot (YYYY-MM-DD)
        date: NaiveDate,
        /// Start time (HH:MM)
        #[arg(value_parser = parse_time_of_day)]
        start: NaiveTime,
        /// End time (HH:MM)
        #[arg(value_parser = parse_time_of_day)]
        end: NaiveTime,
    },
    /// Create the default schedule document if missing
    Init,
    /// Run the MCP server (also the default when no command is given)
    Serve {
        /// Transport to serve on (stdio or http), overriding the config file
        #[arg(short, long)]
        transport: Option<String>,
        /// Port for the http transport, overriding the config file
        #[arg(short, long)]
        port: Option<u16>,
        /// Emit logs as JSON lines
        #[arg(long)]
        json_logs: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Server mode configures logging itself. The one-shot commands only
    // surface warnings on stderr so stdout stays clean for their output.
    let is_serve = matches!(args.command, Some(Command::Serve { .. }) | None);

    if !is_serve {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .init();
    }

    match args.command {
        Some(Command::Slots {
            from,
            to,
            max,
            notice,
        }) => {
            let config = load_config(&args.config)?;
            cli::run_slots(config, from, to, max, notice, args.json)
        }
        Some(Command::Check { date, start, end }) => {
            let config = load_config(&args.config)?;
            cli::run_check(config, date, start, end, args.json)
        }
        Some(Command::Init) => {
            let config = load_config(&args.config)?;
            cli::run_init(config, args.json)
        }
        Some(Command::Serve {
            transport,
            port,
            json_logs,
        }) => run_mcp_server(&args.config, transport, port, json_logs).await,
        None => {
            // No subcommand means serve with the settings from the config file.
            run_mcp_server(&args.config, None, None, false).await
        }
    }
}

fn parse_time_of_day(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| format!("invalid time '{}': {}", raw, e))
}

fn load_config(config_path: &Option<String>) -> anyhow::Result<Config> {
    Ok(if let Some(path) = config_path {
        Config::from_file(path)?
    } else {
        Config::load()?
    })
}

/// Set up logging, resolve the configuration, and serve MCP.
async fn run_mcp_server(
    config_path: &Option<String>,
    transport: Option<String>,
    port: Option<u16>,
    json_logs: bool,
) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Termin MCP Server v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(config_path)?;

    // Flags beat the config file, but only when actually given.
    if let Some(ref t) = transport {
        config.server.transport = match t.as_str() {
            "stdio" => TransportType::Stdio,
            "http" => TransportType::Http,
            other => anyhow::bail!("unknown transport '{}', expected stdio or http", other),
        };
    }
    if let Some(p) = port {
        config.server.http_port = p;
    }

    tracing::info!(
        transport = ?config.server.transport,
        schedule_file = %config.calendar.schedule_file,
        maildir = %config.mail.maildir,
        "Loaded configuration"
    );

    let server = TerminServer::new(config.clone());
    run_server(
        server,
        config.server.transport,
        config.server.http_port,
        config,
    )
    .await?;

    Ok(())
}
