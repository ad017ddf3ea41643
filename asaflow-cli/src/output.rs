//! Output formatting utilities

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;

use asaflow_core::OperationResult;

/// Microalgos per ALGO
const MICROALGO_SCALE: u32 = 6;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format microalgos as ALGO, e.g. `200000` as `0.2 ALGO`
pub fn format_algo(microalgos: u64) -> String {
    let algo = Decimal::from_i128_with_scale(microalgos as i128, MICROALGO_SCALE).normalize();
    format!("{} ALGO", algo)
}

/// Spinner for blocking network waits; finish with `finish_and_clear`
pub fn spinner(msg: &str) -> ProgressBar {
    if atty::isnt(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Ask before an irreversible action
///
/// Returns true without asking when `yes` is set or stdin is not a terminal.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes || atty::isnt(atty::Stream::Stdin) {
        return Ok(true);
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an operation result; a failure becomes the command's error
pub fn report<T: Serialize>(result: &OperationResult<T>, json: bool) -> Result<()> {
    if json {
        print_json(result)?;
    } else if result.success {
        success(&result.message);
    }

    if !result.success {
        if json {
            anyhow::bail!("{}", result.message);
        }
        let code = result
            .error_code
            .map(|c| format!(" [{:?}]", c))
            .unwrap_or_default();
        anyhow::bail!("{}{}", result.message, code);
    }
    Ok(())
}
