//! MCP transport bindings.
//!
//! The server speaks MCP over two transports: stdio for desktop clients
//! that spawn us as a subprocess, and streamable HTTP for running as a
//! network service. HTTP mode serves the MCP endpoint at the root path
//! next to a small health and info surface.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::tower::{
    StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::ServiceExt;
use serde_json::{json, Value};
use tracing::info;

use crate::config::{Config, TransportType};
use crate::mcp::TerminServer;

/// Serve MCP on stdin/stdout until the client closes the stream.
pub async fn run_stdio(server: TerminServer) -> Result<()> {
    info!("Serving MCP over stdio");

    let session = server.serve(stdio()).await?;
    session.waiting().await?;

    info!("Stdio session closed, shutting down");
    Ok(())
}

/// Serve MCP over streamable HTTP on the given port.
///
/// Each HTTP session gets its own server instance from the factory
/// closure. Sessions share nothing beyond the configuration, and the
/// engine inside each instance is created lazily on first tool call.
pub async fn run_http(config: Config, port: u16) -> Result<()> {
    let sessions = Arc::new(LocalSessionManager::default());
    let factory_config = config.clone();
    let mcp_service = StreamableHttpService::new(
        move || Ok(TerminServer::new(factory_config.clone())),
        sessions,
        StreamableHttpServerConfig::default(),
    );

    // Tower services cannot be nested under a path, so the MCP endpoint
    // lives at the fallback while the info routes take priority.
    let app = Router::new()
        .route("/health", get(health))
        .route("/", get(server_info))
        .fallback_service(mcp_service);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Serving MCP over HTTP on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    info!("HTTP server shut down");
    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

async fn server_info() -> Json<Value> {
    Json(json!({
        "name": "termin",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Meeting Scheduling MCP Server",
        "transport": "streamable-http",
        "endpoints": {
            "mcp": "/",
            "health": "/health"
        }
    }))
}

/// Dispatch to the transport selected in the configuration.
pub async fn run_server(
    server: TerminServer,
    transport: TransportType,
    port: u16,
    config: Config,
) -> Result<()> {
    match transport {
        TransportType::Stdio => run_stdio(server).await,
        TransportType::Http => run_http(config, port).await,
    }
}
