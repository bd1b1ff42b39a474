use clap::Args;
use serde_json::Value;

use proposal_pricing_core::forecast::scenarios::ForecastInput;
use proposal_pricing_core::insights::dashboard::{self, DashboardInput};
use proposal_pricing_core::insights::risks::{advisory_risks, identify_risks};
use proposal_pricing_core::insights::calculate_scenario_summary;

use crate::input;

/// Arguments for commands over a projection series (`{"projections": [...]}`)
#[derive(Args)]
pub struct ProjectionsArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_scenario_summary(args: ProjectionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series: DashboardInput = input::read_input(args.input.as_deref(), "scenario summary")?;
    let summary = calculate_scenario_summary(&series.projections);
    Ok(serde_json::to_value(summary)?)
}

pub fn run_risks(args: ProjectionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series: DashboardInput = input::read_input(args.input.as_deref(), "risk identification")?;
    Ok(serde_json::json!({
        "risks": identify_risks(&series.projections),
        "advisories": advisory_risks(),
    }))
}

/// Arguments for the dashboard
#[derive(Args)]
pub struct DashboardArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Treat the input as a forecast input and build the dashboard for its baseline
    #[arg(long)]
    pub from_forecast: bool,
}

pub fn run_dashboard(args: DashboardArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = if args.from_forecast {
        let forecast_input: ForecastInput = input::read_input(args.input.as_deref(), "dashboard")?;
        dashboard::build_forecast_dashboard(&forecast_input)?
    } else {
        let series: DashboardInput = input::read_input(args.input.as_deref(), "dashboard")?;
        dashboard::build_dashboard(&series)?
    };
    Ok(serde_json::to_value(result)?)
}
