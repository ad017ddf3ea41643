//! Status command - node round and creator balance

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context("status")?;
    let creator = ctx.config.creator_address().ok();
    let status = ctx.status_service.get_status(creator.as_ref())?;

    if json {
        return output::print_json(&status);
    }

    println!("{}", "Network Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Network", &status.genesis_id]);
    table.add_row(vec!["Last round", &status.last_round.to_string()]);
    table.add_row(vec!["Minimum fee", &output::format_algo(status.min_fee)]);
    table.add_row(vec!["Asset", &ctx.config.asset_id.to_string()]);

    if let Some(account) = &status.account {
        table.add_row(vec!["Creator", &account.address]);
        table.add_row(vec!["Creator balance", &output::format_algo(account.amount)]);
    }

    println!("{}", table);

    match &status.account {
        Some(account) if !account.funded => {
            println!();
            output::warning(&format!(
                "Creator balance is below {}; transfers that need funding will fail.",
                output::format_algo(asaflow_core::domain::MIN_FUNDED_BALANCE)
            ));
        }
        None => {
            println!();
            output::info("No creator account configured (ALGO_FAUCET_PRIVATE_KEY).");
        }
        _ => {}
    }

    Ok(())
}
