//! Assets command - list holdings or transfer history of an account

use std::io;

use anyhow::Result;
use colored::Colorize;

use super::{get_context, parse_address};
use crate::output;
use asaflow_core::domain::AssetListing;

pub fn run(
    address: Option<&str>,
    include_zero: bool,
    details: bool,
    history: bool,
    format: &str,
) -> Result<()> {
    let ctx = get_context("assets")?;
    let address = match address {
        Some(a) => parse_address(a)?,
        None => ctx.config.creator_address()?,
    };
    let address = address.to_string();

    let spinner = output::spinner("Querying indexer...");
    let service = &ctx.asset_service;
    let result = match (history, details) {
        (true, true) => service.fetch_asset_transfers_with_details(&address),
        (true, false) => service.fetch_asset_transfers(&address),
        (false, true) => service.fetch_asset_info_with_details(&address, include_zero),
        (false, false) => service.fetch_asset_info(&address, include_zero),
    };
    spinner.finish_and_clear();

    let listing = match (&result.data, format) {
        (_, "json") => return output::report(&result, true),
        (Some(listing), _) if result.success => listing,
        _ => return output::report(&result, false),
    };

    match format {
        "csv" => write_csv(listing, details),
        _ => {
            print_table(listing, details);
            Ok(())
        }
    }
}

fn print_table(listing: &AssetListing, details: bool) {
    if let Some(amount) = listing.account_amount {
        println!("Balance: {}", output::format_algo(amount).bold());
    }
    println!("{}", listing.message);
    if listing.assets.is_empty() {
        return;
    }

    let mut table = output::create_table();
    if details {
        table.set_header(vec!["Asset ID", "Name", "Amount"]);
    } else {
        table.set_header(vec!["Asset ID", "Amount"]);
    }
    for asset in &listing.assets {
        let mut row = vec![asset.asset_id.to_string()];
        if details {
            row.push(asset.asset_name.clone().unwrap_or_default());
        }
        row.push(asset.asset_amount.to_string());
        table.add_row(row);
    }
    println!("{}", table);
}

fn write_csv(listing: &AssetListing, details: bool) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    if details {
        writer.write_record(["asset_id", "asset_name", "asset_amount"])?;
    } else {
        writer.write_record(["asset_id", "asset_amount"])?;
    }
    for asset in &listing.assets {
        let id = asset.asset_id.to_string();
        let amount = asset.asset_amount.to_string();
        if details {
            writer.write_record([id.as_str(), asset.asset_name.as_deref().unwrap_or(""), amount.as_str()])?;
        } else {
            writer.write_record([id.as_str(), amount.as_str()])?;
        }
    }
    writer.flush()?;
    Ok(())
}
