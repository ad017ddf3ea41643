//! Demo command - end-to-end walkthrough of both signing paths
//!
//! Moves the configured asset from the creator to the custodial chain
//! account three ways: a direct transfer, an ORE ID opt-in (zero-amount
//! transfer) and an ORE ID transfer. A failed step is reported and the next
//! one still runs.

use anyhow::{Context, Result};
use colored::Colorize;

use super::{get_context, parse_address};
use crate::output;
use asaflow_core::services::{ChainActionType, SignOptions, TransferAction};
use asaflow_core::{AssetTransferIntent, OperationResult};

/// Asset amount moved by each transfer step
const DEMO_AMOUNT: u64 = 10;

fn section(title: &str) {
    println!();
    println!("{}", format!("---------- {} ----------", title).bold());
}

fn outcome<T>(step: &str, result: &OperationResult<T>) -> bool {
    if result.success {
        output::success(&result.message);
    } else {
        output::error(&format!("{} Error: {}", step, result.message));
    }
    result.success
}

pub fn run(yes: bool) -> Result<()> {
    let ctx = get_context("demo")?;
    let creator = ctx.creator_account()?;
    let chain_account = ctx
        .config
        .ore_id
        .chain_account
        .clone()
        .context("ORE_ID_CHAIN_ACCOUNT is not set")?;
    let receiver = parse_address(&chain_account)?;
    let asset_id = ctx.config.asset_id;

    println!(
        "Asset {} from {} to {}",
        asset_id,
        creator.address.to_string().dimmed(),
        receiver.to_string().dimmed()
    );
    if !output::confirm("Run the walkthrough? It submits real transactions.", yes)? {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }

    let mut passed = 0;

    section("ASA Transfer with a local key");
    let spinner = output::spinner("Waiting for confirmation...");
    let result = ctx.transfer_service.fund_account_and_transfer(
        &creator,
        &receiver,
        DEMO_AMOUNT,
        asset_id,
        &ctx.transfer_options(),
    );
    spinner.finish_and_clear();
    if outcome("ASA Transfer with a local key", &result) {
        passed += 1;
    }

    let custodial = match (ctx.custodial(), ctx.config.ore_id.credentials()) {
        (Ok(service), Some(credentials)) => Some((service, credentials)),
        _ => None,
    };
    let Some((custodial, credentials)) = custodial else {
        output::warning("ORE ID is not configured; skipping the custodial steps.");
        println!();
        println!("{} of 1 steps succeeded", passed);
        return Ok(());
    };

    let options = SignOptions {
        broadcast: true,
        chain_account: chain_account.clone(),
        chain_network: ctx.config.ore_id.chain_network.clone(),
    };
    let steps = [("ASA Opt In using ORE ID", 0), ("ASA Transfer using ORE ID", DEMO_AMOUNT)];

    for (title, amount) in steps {
        section(title);
        let action = TransferAction::from_intent(&AssetTransferIntent {
            asset_id,
            amount,
            sender: creator.address,
            receiver,
        });
        let spinner = output::spinner("Signing with ORE ID...");
        let result = custodial.sign_transaction(
            &credentials,
            &action,
            ChainActionType::AssetTransfer,
            &options,
        );
        spinner.finish_and_clear();
        if outcome(title, &result) {
            passed += 1;
        }
    }

    println!();
    println!("{} of 3 steps succeeded", passed);
    Ok(())
}
