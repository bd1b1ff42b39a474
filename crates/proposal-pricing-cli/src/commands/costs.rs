use clap::Args;
use serde_json::Value;

use proposal_pricing_core::costs::analysis::{self, CostAnalysisInput};
use proposal_pricing_core::costs::model::AdditionalCost;
use proposal_pricing_core::costs::templates::{apply_cost_template, cost_templates};

use crate::input;

/// Arguments for cost analysis
#[derive(Args)]
pub struct CostAnalysisArgs {
    /// Path to JSON input file (`{"costs": [...]}`)
    #[arg(long)]
    pub input: Option<String>,

    /// Analyse a built-in cost template instead of an input file
    #[arg(long, conflicts_with = "input")]
    pub template: Option<String>,
}

pub fn run_cost_analysis(args: CostAnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cost_input: CostAnalysisInput = match &args.template {
        Some(id) => CostAnalysisInput {
            costs: apply_cost_template(id)?,
        },
        None => input::read_input(args.input.as_deref(), "cost analysis")?,
    };
    let result = analysis::run_cost_analysis(&cost_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for duplicate detection
#[derive(Args)]
pub struct CostDuplicatesArgs {
    /// Path to JSON array of cost entries
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_cost_duplicates(args: CostDuplicatesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let costs: Vec<AdditionalCost> = input::read_input(args.input.as_deref(), "duplicate check")?;
    let duplicates = analysis::validate_for_duplicates(&costs);
    Ok(serde_json::json!({ "duplicates": duplicates }))
}

pub fn run_cost_templates() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(cost_templates())?)
}

/// Arguments for expanding a cost template
#[derive(Args)]
pub struct CostTemplateArgs {
    /// Template id, e.g. "service-desk-basic"
    pub id: String,
}

pub fn run_cost_template(args: CostTemplateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let costs = apply_cost_template(&args.id)?;
    Ok(serde_json::to_value(costs)?)
}
