//! Account command - generate keys and inspect balances

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::{get_context, parse_address};
use crate::output;
use asaflow_core::PrivateKey;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Generate a new keypair
    New {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show balance and holdings of an account
    Show {
        /// Account address (defaults to the creator account)
        address: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AccountCommands) -> Result<()> {
    match command {
        AccountCommands::New { json } => {
            let key = PrivateKey::generate();
            if json {
                return output::print_json(&serde_json::json!({
                    "address": key.address().to_string(),
                    "private_key": key.to_base64(),
                }));
            }
            println!("Address:     {}", key.address().to_string().bold());
            println!("Private key: {}", key.to_base64());
            println!();
            output::warning("Store the private key safely; it cannot be recovered.");
            output::info(&format!(
                "Fund the account via {}",
                asaflow_core::domain::TESTNET_DISPENSER_URL
            ));
            Ok(())
        }
        AccountCommands::Show { address, json } => {
            let ctx = get_context("account show")?;
            let address = match address {
                Some(a) => parse_address(&a)?,
                None => ctx.config.creator_address()?,
            };

            let status = ctx.status_service.get_status(Some(&address))?;
            let Some(account) = status.account else {
                anyhow::bail!("No account information for {}", address);
            };
            if json {
                return output::print_json(&account);
            }

            let mut table = output::create_table();
            table.add_row(vec!["Address".to_string(), account.address.clone()]);
            table.add_row(vec!["Balance".to_string(), output::format_algo(account.amount)]);
            table.add_row(vec![
                "Minimum balance".to_string(),
                output::format_algo(account.min_balance),
            ]);
            table.add_row(vec!["Assets".to_string(), account.asset_count.to_string()]);
            println!("{}", table);

            if !account.funded {
                output::warning(&asaflow_core::domain::funding_hint(&account.address));
            }
            Ok(())
        }
    }
}
