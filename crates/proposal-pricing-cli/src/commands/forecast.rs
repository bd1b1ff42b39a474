use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use proposal_pricing_core::forecast::model::KpiJitter;
use proposal_pricing_core::forecast::scenarios::{self, ForecastInput};

use crate::input;

/// Arguments for a multi-scenario forecast
#[derive(Args)]
pub struct ForecastArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Seed for KPI jitter; omit for deterministic KPIs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Calendar year of the first projected month
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Print summaries only, without the monthly projections
    #[arg(long)]
    pub summary_only: bool,
}

pub fn run_forecast(args: ForecastArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut forecast_input: ForecastInput = input::read_input(args.input.as_deref(), "forecast")?;
    if let Some(seed) = args.seed {
        forecast_input.jitter = Some(KpiJitter {
            seed,
            amplitude: Decimal::ONE,
        });
    }
    if args.start_year.is_some() {
        forecast_input.start_year = args.start_year;
    }

    let mut result = scenarios::run_forecast(&forecast_input)?;
    if args.summary_only {
        for s in &mut result.result.scenarios {
            s.scenario.projections.clear();
        }
    }
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the default scenario set
#[derive(Args)]
pub struct DefaultScenariosArgs {
    /// Monthly revenue at contract start
    #[arg(long)]
    pub base_revenue: Decimal,

    /// Monthly cost at contract start
    #[arg(long)]
    pub base_costs: Decimal,
}

pub fn run_default_scenarios(args: DefaultScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenarios = scenarios::generate_default_scenarios(args.base_revenue, args.base_costs);
    Ok(serde_json::to_value(scenarios)?)
}
