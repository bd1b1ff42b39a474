mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::budget::BudgetArgs;
use commands::costs::{CostAnalysisArgs, CostDuplicatesArgs, CostTemplateArgs};
use commands::forecast::{DefaultScenariosArgs, ForecastArgs};
use commands::insights::{DashboardArgs, ProjectionsArgs};
use commands::tax::{TaxAmountsArgs, TaxConfigArgs, TaxImportArgs, TaxTemplateArgs};

/// Pricing and forecasting for IT service proposals
#[derive(Parser)]
#[command(
    name = "proposal",
    version,
    about = "Pricing and forecasting for IT service proposals",
    long_about = "A CLI for pricing managed IT service proposals with decimal precision. \
                  Validates Brazilian tax configurations, normalises additional costs, \
                  consolidates budgets with margin-on-price, projects multi-scenario \
                  forecasts and derives KPIs, alerts and risks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a tax configuration
    ValidateTax(TaxConfigArgs),
    /// Suggest ways to lower the tax burden
    TaxSuggestions(TaxConfigArgs),
    /// List the built-in tax templates
    TaxTemplates,
    /// Print the configuration of one tax template
    TaxTemplate(TaxTemplateArgs),
    /// Wrap a tax configuration in a versioned export document
    TaxExport(TaxConfigArgs),
    /// Read an exported tax configuration back
    TaxImport(TaxImportArgs),
    /// Compute tax amounts for a revenue and payroll base
    Taxes(TaxAmountsArgs),
    /// Normalise and analyse additional costs
    CostAnalysis(CostAnalysisArgs),
    /// Find duplicate cost entries
    CostDuplicates(CostDuplicatesArgs),
    /// List the built-in cost templates
    CostTemplates,
    /// Expand a cost template into cost entries
    CostTemplate(CostTemplateArgs),
    /// Consolidate team, additional costs and taxes into a price
    Budget(BudgetArgs),
    /// Project revenue, costs and KPIs for each scenario
    Forecast(ForecastArgs),
    /// Print the optimistic / realistic / pessimistic scenarios
    DefaultScenarios(DefaultScenariosArgs),
    /// Summarise a projection series
    ScenarioSummary(ProjectionsArgs),
    /// Identify risks in a projection series
    Risks(ProjectionsArgs),
    /// Build KPIs, alerts, insights and risks
    Dashboard(DashboardArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing() {
    let log_format = std::env::var("PRICING_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::ValidateTax(args) => commands::tax::run_validate_tax(args),
        Commands::TaxSuggestions(args) => commands::tax::run_tax_suggestions(args),
        Commands::TaxTemplates => commands::tax::run_tax_templates(),
        Commands::TaxTemplate(args) => commands::tax::run_tax_template(args),
        Commands::TaxExport(args) => commands::tax::run_tax_export(args),
        Commands::TaxImport(args) => commands::tax::run_tax_import(args),
        Commands::Taxes(args) => commands::tax::run_taxes(args),
        Commands::CostAnalysis(args) => commands::costs::run_cost_analysis(args),
        Commands::CostDuplicates(args) => commands::costs::run_cost_duplicates(args),
        Commands::CostTemplates => commands::costs::run_cost_templates(),
        Commands::CostTemplate(args) => commands::costs::run_cost_template(args),
        Commands::Budget(args) => commands::budget::run_budget(args),
        Commands::Forecast(args) => commands::forecast::run_forecast(args),
        Commands::DefaultScenarios(args) => commands::forecast::run_default_scenarios(args),
        Commands::ScenarioSummary(args) => commands::insights::run_scenario_summary(args),
        Commands::Risks(args) => commands::insights::run_risks(args),
        Commands::Dashboard(args) => commands::insights::run_dashboard(args),
        Commands::Version => {
            println!("proposal {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
