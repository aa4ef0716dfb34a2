// crates/dojo-board-server/src/main.rs
// ============================================================================
// Module: Server Binary
// Description: Entry point for the dojo-board HTTP server.
// Purpose: Load configuration, build state, and serve the exam API.
// Dependencies: clap, dojo-board-config, dojo-board-server, tokio
// ============================================================================

//! ## Overview
//! The binary loads the TOML configuration, builds the exam engine state
//! over the configured store backend, and serves the API on the configured
//! bind address until the process is terminated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dojo_board_config::DojoBoardConfig;
use dojo_board_server::NoopMetrics;
use dojo_board_server::ServerError;
use dojo_board_server::build_router;
use dojo_board_server::build_state;
use tokio::net::TcpListener;

// ============================================================================
// SECTION: Command Line
// ============================================================================

/// Belt-promotion exam lifecycle server.
#[derive(Debug, Parser)]
#[command(name = "dojo-board-server", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Loads configuration and serves the exam API.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let cli = Cli::parse();
    let config = DojoBoardConfig::load(cli.config.as_deref())?;
    let state = build_state(&config, Arc::new(NoopMetrics))?;
    let router = build_router(state, config.server.request_body_limit);
    let listener = TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
