//! Create-asset command - mint a new asset held by the creator

use anyhow::{Context, Result};
use colored::Colorize;

use super::get_context;
use crate::output;
use asaflow_core::domain::AssetParams;

pub fn run(
    unit_name: &str,
    name: &str,
    url: &str,
    total: u64,
    decimals: u32,
    set_default: bool,
    json: bool,
) -> Result<()> {
    let mut ctx = get_context("create-asset")?;
    let creator = ctx.creator_account()?;

    // Creator keeps every management role
    let params = AssetParams {
        total,
        decimals,
        default_frozen: false,
        unit_name: unit_name.to_string(),
        asset_name: name.to_string(),
        url: url.to_string(),
        manager: Some(creator.address),
        reserve: Some(creator.address),
        freeze: Some(creator.address),
        clawback: Some(creator.address),
    };

    let spinner = output::spinner("Creating asset...");
    let result = ctx.transfer_service.create_asset(&creator, params);
    spinner.finish_and_clear();

    if !json {
        if let Some(created) = &result.data {
            println!("Asset ID: {}", created.asset_id.to_string().bold());
        }
    }

    if set_default {
        if let Some(created) = &result.data {
            ctx.config.asset_id = created.asset_id;
            ctx.config
                .save(&ctx.asaflow_dir)
                .context("Failed to save settings")?;
            if !json {
                output::info(&format!("Default asset set to {}", created.asset_id));
            }
            if std::env::var("ASSET_ID").is_ok() {
                output::warning("ASSET_ID is set in the environment and overrides the saved default");
            }
        }
    }
    output::report(&result, json)
}
