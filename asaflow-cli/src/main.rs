//! asaflow CLI - Algorand Standard Asset transfers from your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{account, assets, create_asset, demo, logs, opt_in, ore, pay, status, transfer};

/// asaflow - move Algorand Standard Assets with local keys or ORE ID custody
#[derive(Parser)]
#[command(name = "asaflow", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fund the receiver if needed, then transfer an asset from the creator account
    Transfer {
        /// Receiver address
        #[arg(long)]
        receiver: String,
        /// Amount in base units of the asset
        #[arg(long)]
        amount: u64,
        /// Asset id (defaults to the configured asset)
        #[arg(long)]
        asset_id: Option<u64>,
        /// Fail instead of funding an under-funded receiver
        #[arg(long)]
        no_fund: bool,
        /// Funding amount in microalgos
        #[arg(long)]
        fund_amount: Option<u64>,
        /// Opt-in precondition: skip, require or auto
        #[arg(long)]
        opt_in: Option<String>,
        /// Base64 private key of the receiver, used by --opt-in auto and --keyed-receiver
        #[arg(long, env = "ASAFLOW_RECEIVER_KEY", hide_env_values = true)]
        receiver_key: Option<String>,
        /// Never fund; the receiver must hold algos and is opted in with --receiver-key
        #[arg(long, requires = "receiver_key", conflicts_with_all = ["no_fund", "fund_amount", "opt_in"])]
        keyed_receiver: bool,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send a plain payment from the creator account
    Pay {
        /// Receiver address
        #[arg(long)]
        receiver: String,
        /// Amount in microalgos
        #[arg(long)]
        amount: u64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Opt the creator account in to an asset
    OptIn {
        /// Asset id (defaults to the configured asset)
        #[arg(long)]
        asset_id: Option<u64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new asset owned by the creator account
    CreateAsset {
        /// Unit name (up to 8 characters)
        #[arg(long)]
        unit_name: String,
        /// Asset name
        #[arg(long)]
        name: String,
        /// Asset URL
        #[arg(long, default_value = "")]
        url: String,
        /// Total supply in base units
        #[arg(long, default_value = "1000000")]
        total: u64,
        /// Decimal places
        #[arg(long, default_value = "0")]
        decimals: u32,
        /// Store the new asset id as the default in settings.json
        #[arg(long)]
        set_default: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the assets of an account
    Assets {
        /// Account address (defaults to the creator account)
        address: Option<String>,
        /// Include holdings with a zero balance
        #[arg(long)]
        include_zero: bool,
        /// Look up asset names
        #[arg(long)]
        details: bool,
        /// Build the list from asset-transfer history
        #[arg(long)]
        history: bool,
        /// Output format
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Custodial signing through ORE ID
    Ore {
        #[command(subcommand)]
        command: ore::OreCommands,
    },

    /// Generate or inspect accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Show node status and the creator balance
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the end-to-end walkthrough
    Demo {
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// View and manage the activity log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Transfer {
            receiver,
            amount,
            asset_id,
            no_fund,
            fund_amount,
            opt_in,
            receiver_key,
            keyed_receiver,
            yes,
            json,
        } => transfer::run(transfer::TransferArgs {
            receiver,
            amount,
            asset_id,
            no_fund,
            fund_amount,
            opt_in,
            receiver_key,
            keyed_receiver,
            yes,
            json,
        }),
        Commands::Pay {
            receiver,
            amount,
            yes,
            json,
        } => pay::run(&receiver, amount, yes, json),
        Commands::OptIn { asset_id, json } => opt_in::run(asset_id, json),
        Commands::CreateAsset {
            unit_name,
            name,
            url,
            total,
            decimals,
            set_default,
            json,
        } => create_asset::run(&unit_name, &name, &url, total, decimals, set_default, json),
        Commands::Assets {
            address,
            include_zero,
            details,
            history,
            format,
        } => assets::run(address.as_deref(), include_zero, details, history, &format),
        Commands::Ore { command } => ore::run(command),
        Commands::Account { command } => account::run(command),
        Commands::Status { json } => status::run(json),
        Commands::Demo { yes } => demo::run(yes),
        Commands::Logs { command } => logs::run(command),
    }
}
