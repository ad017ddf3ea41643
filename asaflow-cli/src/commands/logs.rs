//! Logs command - view and manage the activity log

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::get_asaflow_dir;
use crate::output;
use asaflow_core::services::{EntryPoint, LoggingService};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only errors
        #[arg(long)]
        errors: bool,
        /// Show every event of one operation
        #[arg(long)]
        operation: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear old log entries
    Clear {
        /// Delete logs older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Delete every entry
        #[arg(long)]
        all: bool,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show log statistics and database path
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn get_logging_service() -> Result<LoggingService> {
    let dir = get_asaflow_dir()?;
    LoggingService::new(&dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    use chrono::{TimeZone, Utc};
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List {
            limit,
            errors,
            operation,
            json,
        } => {
            let service = get_logging_service()?;
            let entries = match &operation {
                Some(op) => service.get_operation(op)?,
                None if errors => service.get_errors(limit)?,
                None => service.get_recent(limit)?,
            };

            if json {
                return output::print_json(&entries);
            }

            if entries.is_empty() {
                println!("No log entries found.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Time", "Operation", "Event", "Context", "Error"]);

            for entry in &entries {
                let asset = entry.asset_id.map(|id| format!("asset {}", id));
                let round = entry.confirmed_round.map(|r| format!("round {}", r));
                let context = [
                    entry.command.clone(),
                    entry.tx_id.clone(),
                    asset,
                    round,
                ]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(", ");

                let error_indicator = if entry.error_message.is_some() {
                    "!".red().to_string()
                } else {
                    String::new()
                };

                table.add_row(vec![
                    format_timestamp(entry.timestamp),
                    entry.operation_id.as_deref().map(short_id).unwrap_or_default(),
                    entry.event.clone(),
                    context,
                    error_indicator,
                ]);
            }

            println!("{}", table);

            let failed: Vec<_> = entries.iter().filter(|e| e.error_message.is_some()).collect();
            if !failed.is_empty() && !errors {
                println!();
                println!("{}", "Recent Errors:".red().bold());
                for err in failed.iter().take(3) {
                    println!(
                        "  {} [{}]: {}",
                        format_timestamp(err.timestamp).dimmed(),
                        err.event,
                        err.error_message.as_deref().unwrap_or("Unknown error")
                    );
                }
            }
        }
        LogsCommands::Clear {
            older_than_days,
            all,
            force,
            json,
        } => {
            let service = get_logging_service()?;

            let prompt = if all {
                "Delete all log entries?".to_string()
            } else {
                format!("Delete logs older than {} days?", older_than_days)
            };
            if !json && !output::confirm(&prompt, force)? {
                println!("Cancelled.");
                return Ok(());
            }

            let deleted = if all {
                service.clear()?
            } else {
                let cutoff_ms = chrono::Utc::now().timestamp_millis()
                    - (older_than_days as i64 * 24 * 60 * 60 * 1000);
                service.delete_before(cutoff_ms)?
            };

            if json {
                println!("{}", serde_json::json!({"deleted": deleted}));
            } else {
                println!("Deleted {} log entries", deleted);
            }
        }
        LogsCommands::Stats { json } => {
            let service = get_logging_service()?;
            let stats = service.stats()?;
            let db_path = service.db_path().to_path_buf();
            let size_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "total_entries": stats.total,
                        "error_count": stats.errors,
                        "operations": stats.operations,
                        "by_event": stats.by_event,
                        "database_path": db_path.to_string_lossy(),
                        "database_size_bytes": size_bytes
                    })
                );
            } else {
                println!("{}", "Log Statistics".bold());
                println!("  Total entries: {}", stats.total);
                println!("  Errors: {}", stats.errors);
                println!("  Operations: {}", stats.operations);
                println!("  Database: {}", db_path.display());
                println!("  Size: {} bytes", size_bytes);
                if !stats.by_event.is_empty() {
                    println!();
                    let mut table = output::create_table();
                    table.set_header(vec!["Event", "Count"]);
                    for (event, count) in &stats.by_event {
                        table.add_row(vec![event.clone(), count.to_string()]);
                    }
                    println!("{}", table);
                }
            }
        }
    }

    Ok(())
}
