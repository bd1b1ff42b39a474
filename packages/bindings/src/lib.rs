use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use proposal_pricing_core::budget::consolidation::{self, BudgetInput};
use proposal_pricing_core::costs::analysis::{self, CostAnalysisInput};
use proposal_pricing_core::costs::model::{self, AdditionalCost};
use proposal_pricing_core::costs::templates as cost_templates;
use proposal_pricing_core::forecast::model::{ForecastScenario, SeasonalFactor};
use proposal_pricing_core::forecast::projection;
use proposal_pricing_core::forecast::scenarios::{self, ForecastInput};
use proposal_pricing_core::insights::dashboard::{self, DashboardInput};
use proposal_pricing_core::insights::{calculate_scenario_summary, risks};
use proposal_pricing_core::tax::config::{self, TaxConfiguration};
use proposal_pricing_core::tax::templates as tax_templates;
use proposal_pricing_core::tax::validation;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> NapiResult<T> {
    serde_json::from_str(json).map_err(to_napi_error)
}

fn to_json<T: serde::Serialize>(value: &T) -> NapiResult<String> {
    serde_json::to_string(value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn validate_tax_configuration(config_json: String) -> NapiResult<String> {
    let config: TaxConfiguration = parse(&config_json)?;
    to_json(&validation::validate_tax_configuration(&config))
}

#[napi]
pub fn get_tax_optimization_suggestions(config_json: String) -> NapiResult<String> {
    let config: TaxConfiguration = parse(&config_json)?;
    to_json(&validation::get_tax_optimization_suggestions(&config))
}

#[napi]
pub fn list_tax_templates() -> NapiResult<String> {
    to_json(&tax_templates::tax_templates())
}

#[napi]
pub fn apply_tax_template(template_id: String) -> NapiResult<String> {
    let config = tax_templates::apply_tax_template(&template_id).map_err(to_napi_error)?;
    to_json(&config)
}

/// Returns the export document itself, not a JSON-encoded string of it.
#[napi]
pub fn export_tax_configuration(config_json: String) -> NapiResult<String> {
    let config: TaxConfiguration = parse(&config_json)?;
    tax_templates::export_configuration(&config).map_err(to_napi_error)
}

#[napi]
pub fn import_tax_configuration(document_json: String) -> NapiResult<String> {
    let config = tax_templates::import_configuration(&document_json).map_err(to_napi_error)?;
    to_json(&config)
}

#[derive(Deserialize)]
struct TaxAmountsRequest {
    configuration: TaxConfiguration,
    revenue: Decimal,
    #[serde(default)]
    payroll: Decimal,
}

#[napi]
pub fn calculate_taxes(input_json: String) -> NapiResult<String> {
    let req: TaxAmountsRequest = parse(&input_json)?;
    to_json(&config::calculate_taxes(&req.configuration, req.revenue, req.payroll))
}

// ---------------------------------------------------------------------------
// Additional costs
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_monthly_cost(cost_json: String) -> NapiResult<String> {
    let cost: AdditionalCost = parse(&cost_json)?;
    to_json(&model::calculate_monthly_cost(&cost))
}

#[napi]
pub fn analyze_costs(input_json: String) -> NapiResult<String> {
    let input: CostAnalysisInput = parse(&input_json)?;
    let output = analysis::run_cost_analysis(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn validate_cost_duplicates(costs_json: String) -> NapiResult<String> {
    let costs: Vec<AdditionalCost> = parse(&costs_json)?;
    to_json(&analysis::validate_for_duplicates(&costs))
}

#[napi]
pub fn list_cost_templates() -> NapiResult<String> {
    to_json(&cost_templates::cost_templates())
}

#[napi]
pub fn apply_cost_template(template_id: String) -> NapiResult<String> {
    let costs = cost_templates::apply_cost_template(&template_id).map_err(to_napi_error)?;
    to_json(&costs)
}

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

#[napi]
pub fn consolidate_budget(input_json: String) -> NapiResult<String> {
    let input: BudgetInput = parse(&input_json)?;
    let output = consolidation::consolidate_budget(&input).map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[napi]
pub fn run_forecast(input_json: String) -> NapiResult<String> {
    let input: ForecastInput = parse(&input_json)?;
    let output = scenarios::run_forecast(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct BaseFigures {
    base_revenue: Decimal,
    base_costs: Decimal,
}

#[napi]
pub fn generate_default_scenarios(input_json: String) -> NapiResult<String> {
    let base: BaseFigures = parse(&input_json)?;
    to_json(&scenarios::generate_default_scenarios(base.base_revenue, base.base_costs))
}

#[derive(Deserialize)]
struct ProjectionRequest {
    scenario: ForecastScenario,
    base_revenue: Decimal,
    base_costs: Decimal,
    contract_duration: u32,
    #[serde(default)]
    seasonal_factors: Vec<SeasonalFactor>,
}

#[napi]
pub fn calculate_monthly_projections(input_json: String) -> NapiResult<String> {
    let req: ProjectionRequest = parse(&input_json)?;
    let projections = projection::calculate_monthly_projections(
        &req.scenario,
        req.base_revenue,
        req.base_costs,
        req.contract_duration,
        &req.seasonal_factors,
    )
    .map_err(to_napi_error)?;
    to_json(&projections)
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[napi]
pub fn scenario_summary(input_json: String) -> NapiResult<String> {
    let input: DashboardInput = parse(&input_json)?;
    to_json(&calculate_scenario_summary(&input.projections))
}

#[napi]
pub fn identify_risks(input_json: String) -> NapiResult<String> {
    let input: DashboardInput = parse(&input_json)?;
    to_json(&risks::identify_risks(&input.projections))
}

#[napi]
pub fn advisory_risks() -> NapiResult<String> {
    to_json(&risks::advisory_risks())
}

#[napi]
pub fn build_dashboard(input_json: String) -> NapiResult<String> {
    let input: DashboardInput = parse(&input_json)?;
    let output = dashboard::build_dashboard(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn build_forecast_dashboard(input_json: String) -> NapiResult<String> {
    let input: ForecastInput = parse(&input_json)?;
    let output = dashboard::build_forecast_dashboard(&input).map_err(to_napi_error)?;
    to_json(&output)
}
