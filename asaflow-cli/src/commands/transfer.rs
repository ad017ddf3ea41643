//! Transfer command - fund the receiver if needed, then move the asset

use anyhow::{bail, Context, Result};
use colored::Colorize;

use super::{get_context, parse_address};
use crate::output;
use asaflow_core::services::OptInPolicy;
use asaflow_core::{Account, PrivateKey};

pub struct TransferArgs {
    pub receiver: String,
    pub amount: u64,
    pub asset_id: Option<u64>,
    pub no_fund: bool,
    pub fund_amount: Option<u64>,
    pub opt_in: Option<String>,
    pub receiver_key: Option<String>,
    pub keyed_receiver: bool,
    pub yes: bool,
    pub json: bool,
}

pub fn run(args: TransferArgs) -> Result<()> {
    let ctx = get_context("transfer")?;
    let creator = ctx.creator_account()?;
    let receiver = parse_address(&args.receiver)?;
    let asset_id = args.asset_id.unwrap_or(ctx.config.asset_id);

    let mut options = ctx.transfer_options();
    if args.no_fund {
        options.auto_fund = false;
    }
    if let Some(fund_amount) = args.fund_amount {
        options.fund_amount = fund_amount;
    }
    if let Some(policy) = &args.opt_in {
        options.opt_in = policy.parse::<OptInPolicy>()?;
    }
    if let Some(key) = &args.receiver_key {
        options.receiver_key =
            Some(PrivateKey::from_base64(key).context("Invalid receiver private key")?);
    }
    let keyed_receiver = match options.receiver_key.take() {
        Some(key) if args.keyed_receiver => {
            let account = Account::from_private_key(key);
            if account.address != receiver {
                bail!("--receiver-key does not belong to {}", receiver);
            }
            Some(account)
        }
        None if args.keyed_receiver => bail!("--keyed-receiver needs --receiver-key"),
        key => {
            options.receiver_key = key;
            None
        }
    };

    if !args.json {
        println!(
            "Transfer {} of asset {} from {} to {}",
            args.amount.to_string().bold(),
            asset_id,
            creator.address.to_string().dimmed(),
            receiver.to_string().dimmed()
        );
        if keyed_receiver.is_some() {
            println!(
                "{}",
                "Receiver must already hold algos; it opts in with its own key".dimmed()
            );
        } else if options.auto_fund {
            println!(
                "{}",
                format!(
                    "Receivers below {} are funded with {} first",
                    output::format_algo(options.min_balance),
                    output::format_algo(options.funding_amount())
                )
                .dimmed()
            );
        }
    }

    if !output::confirm("Submit transactions?", args.yes)? {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }

    let spinner = output::spinner("Waiting for confirmation...");
    let result = match &keyed_receiver {
        Some(account) => ctx
            .transfer_service
            .transfer_asset(&creator, account, args.amount, asset_id),
        None => ctx.transfer_service.fund_account_and_transfer(
            &creator,
            &receiver,
            args.amount,
            asset_id,
            &options,
        ),
    };
    spinner.finish_and_clear();

    if !args.json && result.success {
        if let Some(outcome) = &result.data {
            if let Some(funding) = &outcome.funding {
                output::info(&format!(
                    "Funded receiver in txn {} (round {})",
                    funding.tx_id, funding.confirmed_round
                ));
            }
            if let Some(opt_in) = &outcome.opt_in {
                output::info(&format!("Receiver opted in with txn {}", opt_in.tx_id));
            }
        }
    }

    output::report(&result, args.json)
}
