//! CLI command implementations

pub mod account;
pub mod assets;
pub mod create_asset;
pub mod demo;
pub mod logs;
pub mod opt_in;
pub mod ore;
pub mod pay;
pub mod status;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use asaflow_core::config::asaflow_dir;
use asaflow_core::services::EntryPoint;
use asaflow_core::{Address, AsaflowContext};

/// Get the asaflow directory from environment or default
pub fn get_asaflow_dir() -> Result<PathBuf> {
    asaflow_dir().context("Could not determine the asaflow directory")
}

/// Build the context for a command and record the invocation
pub fn get_context(command: &str) -> Result<AsaflowContext> {
    let dir = get_asaflow_dir()?;
    tracing::debug!("Using asaflow directory {}", dir.display());

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create asaflow directory: {:?}", dir))?;

    let ctx = AsaflowContext::new(&dir, EntryPoint::Cli)
        .context("Failed to initialize asaflow context")?;
    ctx.log_command(command);
    Ok(ctx)
}

/// Parse an address argument with a readable error
pub fn parse_address(value: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid address: {}", value))
}
