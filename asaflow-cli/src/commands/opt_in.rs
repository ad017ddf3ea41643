//! Opt-in command - opt the creator account in to an asset

use anyhow::Result;

use super::get_context;
use crate::output;

pub fn run(asset_id: Option<u64>, json: bool) -> Result<()> {
    let ctx = get_context("opt-in")?;
    let creator = ctx.creator_account()?;
    let asset_id = asset_id.unwrap_or(ctx.config.asset_id);

    let spinner = output::spinner(&format!("Opting in to asset {}...", asset_id));
    let result = ctx.transfer_service.asset_opt_in(&creator, asset_id);
    spinner.finish_and_clear();

    output::report(&result, json)
}
