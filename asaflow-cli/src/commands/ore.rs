//! Ore command - custodial signing and user management through ORE ID

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use super::{get_context, parse_address};
use crate::output;
use asaflow_core::services::{ChainActionType, NewUser, SignOptions, TransferAction};
use asaflow_core::AssetTransferIntent;

#[derive(Subcommand)]
pub enum OreCommands {
    /// Compose, sign and broadcast an asset transfer from the custodial account
    Sign {
        /// Receiver address
        #[arg(long)]
        receiver: String,
        /// Amount in base units of the asset
        #[arg(long)]
        amount: u64,
        /// Asset id (defaults to the configured asset)
        #[arg(long)]
        asset_id: Option<u64>,
        /// Chain action type: AssetTransfer, ValueTransfer or AppNoOp
        #[arg(long, default_value = "AssetTransfer")]
        action_type: String,
        /// Sign without broadcasting
        #[arg(long)]
        no_broadcast: bool,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show an ORE ID user
    User {
        /// ORE ID account name (defaults to ORE_ID_ACCOUNT)
        account: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a custodial user
    CreateUser {
        #[arg(long)]
        email: String,
        /// Password for the new user (prompted when omitted)
        #[arg(long, env = "ASAFLOW_NEW_USER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        picture: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send a passwordless login code
    SendCode {
        #[arg(long, conflicts_with = "phone", required_unless_present = "phone")]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: OreCommands) -> Result<()> {
    match command {
        OreCommands::Sign {
            receiver,
            amount,
            asset_id,
            action_type,
            no_broadcast,
            yes,
            json,
        } => {
            let ctx = get_context("ore sign")?;
            let custodial = ctx.custodial()?;
            let credentials = ctx
                .config
                .ore_id
                .credentials()
                .context("ORE_ID_ACCOUNT and ORE_ID_ACCOUNT_PASSWORD must be set")?;
            let chain_account = ctx
                .config
                .ore_id
                .chain_account
                .clone()
                .context("ORE_ID_CHAIN_ACCOUNT is not set")?;

            let intent = AssetTransferIntent {
                asset_id: asset_id.unwrap_or(ctx.config.asset_id),
                amount,
                sender: parse_address(&chain_account)?,
                receiver: parse_address(&receiver)?,
            };
            let action = TransferAction::from_intent(&intent);
            let action_type: ChainActionType = action_type.parse()?;
            let options = SignOptions {
                broadcast: !no_broadcast,
                chain_account,
                chain_network: ctx.config.ore_id.chain_network.clone(),
            };

            if !json {
                println!(
                    "{} {} of asset {} from {} to {}",
                    action_type.as_str().bold(),
                    amount,
                    intent.asset_id,
                    intent.sender.to_string().dimmed(),
                    intent.receiver.to_string().dimmed()
                );
            }
            if options.broadcast && !output::confirm("Sign and broadcast?", yes)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }

            let spinner = output::spinner("Signing with ORE ID...");
            let result = custodial.sign_transaction(&credentials, &action, action_type, &options);
            spinner.finish_and_clear();

            if !json && result.success {
                if let Some(tx_id) = result
                    .data
                    .as_ref()
                    .and_then(|body| body.get("transactionId"))
                    .and_then(|v| v.as_str())
                {
                    println!("Transaction ID: {}", tx_id.bold());
                }
            }
            output::report(&result, json)
        }
        OreCommands::User { account, json } => {
            let ctx = get_context("ore user")?;
            let account = account
                .or_else(|| ctx.config.ore_id.account.clone())
                .context("No account given and ORE_ID_ACCOUNT is not set")?;
            let result = ctx.custodial()?.get_user(&account);

            if !json && result.success {
                if let Some(body) = &result.data {
                    output::print_json(body)?;
                }
                return Ok(());
            }
            output::report(&result, json)
        }
        OreCommands::CreateUser {
            email,
            password,
            first_name,
            last_name,
            phone,
            picture,
            json,
        } => {
            let ctx = get_context("ore create-user")?;
            let password = match password {
                Some(p) => p,
                None => dialoguer::Password::new()
                    .with_prompt("Password for the new user")
                    .with_confirmation("Repeat password", "Passwords do not match")
                    .interact()?,
            };
            let user = NewUser {
                first_name,
                last_name,
                email,
                picture,
                password,
                phone,
                account_type: None,
            };

            let result = ctx.custodial()?.create_user(&user);
            if !json {
                if let Some(created) = &result.data {
                    if let Some(name) = &created.account_name {
                        println!("Account name: {}", name.bold());
                    }
                }
            }
            output::report(&result, json)
        }
        OreCommands::SendCode { email, phone, json } => {
            let ctx = get_context("ore send-code")?;
            let result = ctx
                .custodial()?
                .send_verification_code(email.as_deref(), phone.as_deref());
            output::report(&result, json)
        }
    }
}
