//! Pay command - plain payment from the creator account

use anyhow::Result;
use colored::Colorize;

use super::{get_context, parse_address};
use crate::output;

pub fn run(receiver: &str, amount: u64, yes: bool, json: bool) -> Result<()> {
    let ctx = get_context("pay")?;
    let creator = ctx.creator_account()?;
    let receiver = parse_address(receiver)?;

    if !json {
        println!(
            "Pay {} to {}",
            output::format_algo(amount).bold(),
            receiver.to_string().dimmed()
        );
    }
    if !output::confirm("Submit payment?", yes)? {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }

    let spinner = output::spinner("Waiting for confirmation...");
    let result = ctx.transfer_service.payment(&creator, &receiver, amount);
    spinner.finish_and_clear();

    output::report(&result, json)
}
