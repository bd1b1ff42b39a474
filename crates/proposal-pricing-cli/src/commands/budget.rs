use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use proposal_pricing_core::budget::consolidation::{self, BudgetInput};

use crate::input;

/// Arguments for budget consolidation
#[derive(Args)]
pub struct BudgetArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the margin value from the input (percent, or amount for fixed margins)
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Override the contract duration in months
    #[arg(long)]
    pub months: Option<u32>,
}

pub fn run_budget(args: BudgetArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut budget_input: BudgetInput = input::read_input(args.input.as_deref(), "budget")?;
    if let Some(margin) = args.margin {
        budget_input.margin.value = margin;
    }
    if let Some(months) = args.months {
        budget_input.contract_duration_months = Some(months);
    }
    let result = consolidation::consolidate_budget(&budget_input)?;
    Ok(serde_json::to_value(result)?)
}
