use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::model::{
    ForecastAssumptions, ForecastModel, ForecastScenario, KpiJitter, MarketFactor, ScenarioType,
    SeasonalFactor,
};
use super::projection::{calculate_monthly_projections_with, ProjectionContext, MAX_CONTRACT_MONTHS};
use super::summary::{calculate_scenario_summary, ScenarioSummary};
use crate::error::PricingError;
use crate::types::{pct_to_fraction, with_metadata, ComputationOutput, Money};
use crate::PricingResult;

/// Contracts longer than this are projected but flagged.
const LONG_CONTRACT_MONTHS: u32 = 60;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a full multi-scenario forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastInput {
    /// Monthly revenue at contract start
    pub base_revenue: Money,
    /// Monthly cost at contract start
    pub base_costs: Money,
    /// Number of months to project
    pub contract_duration: u32,
    #[serde(default)]
    pub seasonal_factors: Vec<SeasonalFactor>,
    /// Scenarios to project; the three defaults when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<Vec<ForecastScenario>>,
    #[serde(default)]
    pub model: ForecastModel,
    /// Defaults to the current calendar year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<KpiJitter>,
}

/// A projected scenario and its summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioForecast {
    pub scenario: ForecastScenario,
    pub summary: ScenarioSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastOutput {
    pub scenarios: Vec<ScenarioForecast>,
    /// Id of the first scenario flagged as baseline
    pub baseline_id: Option<String>,
    /// Σ probability × total profit over all scenarios
    pub probability_weighted_profit: Money,
}

impl ForecastOutput {
    /// The baseline scenario, falling back to the first one.
    pub fn baseline(&self) -> Option<&ScenarioForecast> {
        self.scenarios
            .iter()
            .find(|s| s.scenario.is_baseline)
            .or_else(|| self.scenarios.first())
    }
}

// ---------------------------------------------------------------------------
// Default scenarios
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn default_scenario(
    id: &str,
    name: &str,
    scenario_type: ScenarioType,
    probability: Decimal,
    [revenue_growth, cost_inflation, team_growth, efficiency_gains]: [Decimal; 4],
    market_factors: Vec<MarketFactor>,
    is_baseline: bool,
    base_revenue: Money,
    base_costs: Money,
) -> ForecastScenario {
    ForecastScenario {
        id: id.into(),
        name: name.into(),
        scenario_type,
        probability,
        assumptions: ForecastAssumptions {
            revenue_growth,
            cost_inflation,
            team_growth,
            efficiency_gains,
            market_factors,
            custom_adjustments: vec![],
        },
        is_baseline,
        description: format!(
            "{revenue_growth}% revenue growth and {cost_inflation}% cost inflation per year \
             from a base of {base_revenue} revenue / {base_costs} cost per month"
        ),
        projections: vec![],
    }
}

/// The standard optimistic / realistic / pessimistic trio, realistic as baseline.
/// Assumptions are revenue growth, cost inflation, team growth, efficiency gains.
pub fn generate_default_scenarios(base_revenue: Money, base_costs: Money) -> Vec<ForecastScenario> {
    vec![
        default_scenario(
            "optimistic",
            "Optimistic",
            ScenarioType::Optimistic,
            dec!(25),
            [dec!(20), dec!(5), dec!(15), dec!(10)],
            vec![MarketFactor {
                name: "Digital transformation demand".into(),
                description: "Clients expanding managed service scope".into(),
                impact: dec!(10),
                probability: dec!(60),
            }],
            false,
            base_revenue,
            base_costs,
        ),
        default_scenario(
            "realistic",
            "Realistic",
            ScenarioType::Realistic,
            dec!(50),
            [dec!(12), dec!(8), dec!(10), dec!(5)],
            vec![MarketFactor {
                name: "Stable renewals".into(),
                description: "Contract renewals at historical rates".into(),
                impact: dec!(0),
                probability: dec!(70),
            }],
            true,
            base_revenue,
            base_costs,
        ),
        default_scenario(
            "pessimistic",
            "Pessimistic",
            ScenarioType::Pessimistic,
            dec!(25),
            [dec!(5), dec!(12), dec!(5), dec!(2)],
            vec![MarketFactor {
                name: "Price pressure".into(),
                description: "Competitors undercutting on renewal".into(),
                impact: dec!(-15),
                probability: dec!(40),
            }],
            false,
            base_revenue,
            base_costs,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Forecast run
// ---------------------------------------------------------------------------

fn validate_forecast_input(input: &ForecastInput, scenarios: &[ForecastScenario]) -> PricingResult<()> {
    if input.base_revenue < Decimal::ZERO {
        return Err(PricingError::InvalidInput {
            field: "base_revenue".into(),
            reason: "Base revenue cannot be negative".into(),
        });
    }
    if input.base_costs < Decimal::ZERO {
        return Err(PricingError::InvalidInput {
            field: "base_costs".into(),
            reason: "Base costs cannot be negative".into(),
        });
    }
    if input.contract_duration == 0 {
        return Err(PricingError::InvalidInput {
            field: "contract_duration".into(),
            reason: "Contract must last at least one month".into(),
        });
    }
    if input.contract_duration > MAX_CONTRACT_MONTHS {
        return Err(PricingError::InvalidInput {
            field: "contract_duration".into(),
            reason: format!("Contract cannot exceed {MAX_CONTRACT_MONTHS} months"),
        });
    }
    if let Some(jitter) = &input.jitter {
        if jitter.amplitude < Decimal::ZERO || jitter.amplitude > dec!(100) {
            return Err(PricingError::InvalidInput {
                field: "jitter.amplitude".into(),
                reason: "Amplitude must be between 0 and 100".into(),
            });
        }
    }
    for f in &input.seasonal_factors {
        if !(1..=12).contains(&f.month) {
            return Err(PricingError::InvalidInput {
                field: "seasonal_factors".into(),
                reason: format!("Month {} is outside 1-12", f.month),
            });
        }
        if f.factor < Decimal::ZERO {
            return Err(PricingError::InvalidInput {
                field: "seasonal_factors".into(),
                reason: format!("Factor for month {} cannot be negative", f.month),
            });
        }
    }
    for s in scenarios {
        if s.probability < Decimal::ZERO || s.probability > dec!(100) {
            return Err(PricingError::InvalidInput {
                field: format!("scenario:{} probability", s.id),
                reason: "Probability must be between 0 and 100".into(),
            });
        }
        let a = &s.assumptions;
        for (name, rate) in [
            ("revenue_growth", a.revenue_growth),
            ("cost_inflation", a.cost_inflation),
            ("team_growth", a.team_growth),
            ("efficiency_gains", a.efficiency_gains),
        ] {
            if rate <= dec!(-100) {
                return Err(PricingError::InvalidInput {
                    field: format!("scenario:{} {name}", s.id),
                    reason: "Annual rate must be greater than -100%".into(),
                });
            }
        }
    }
    input.model.validate()
}

/// Project every scenario and summarise it.
///
/// Probabilities that do not sum to 100 and a baseline count other than one
/// are reported as warnings.
pub fn run_forecast(input: &ForecastInput) -> PricingResult<ComputationOutput<ForecastOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let scenarios = match &input.scenarios {
        Some(s) if !s.is_empty() => s.clone(),
        _ => generate_default_scenarios(input.base_revenue, input.base_costs),
    };
    validate_forecast_input(input, &scenarios)?;
    tracing::debug!(
        scenarios = scenarios.len(),
        months = input.contract_duration,
        "running forecast"
    );

    let total_probability: Decimal = scenarios.iter().map(|s| s.probability).sum();
    if total_probability != dec!(100) {
        warnings.push(format!(
            "Scenario probabilities sum to {total_probability}%, not 100%"
        ));
    }
    let baselines = scenarios.iter().filter(|s| s.is_baseline).count();
    if baselines != 1 {
        warnings.push(format!("{baselines} scenarios are marked as baseline; expected 1"));
    }
    if input.contract_duration > LONG_CONTRACT_MONTHS {
        warnings.push(format!(
            "{}-month contract; compounding assumptions become unreliable beyond {} months",
            input.contract_duration, LONG_CONTRACT_MONTHS
        ));
    }

    let ctx = ProjectionContext {
        model: input.model.clone(),
        start_year: input.start_year.unwrap_or_else(|| Utc::now().year()),
        jitter: input.jitter.clone(),
    };

    let mut probability_weighted_profit = Decimal::ZERO;
    let mut results: Vec<ScenarioForecast> = Vec::with_capacity(scenarios.len());
    for mut scenario in scenarios {
        scenario.projections = calculate_monthly_projections_with(
            &ctx,
            &scenario,
            input.base_revenue,
            input.base_costs,
            input.contract_duration,
            &input.seasonal_factors,
        )?;
        let summary = calculate_scenario_summary(&scenario.projections);
        probability_weighted_profit += pct_to_fraction(scenario.probability) * summary.total_profit;
        results.push(ScenarioForecast { scenario, summary });
    }

    let baseline_id = results
        .iter()
        .find(|r| r.scenario.is_baseline)
        .map(|r| r.scenario.id.clone());

    let output = ForecastOutput {
        scenarios: results,
        baseline_id,
        probability_weighted_profit,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Compound monthly projection per scenario",
        &serde_json::json!({
            "base_revenue": input.base_revenue.to_string(),
            "base_costs": input.base_costs.to_string(),
            "contract_duration": input.contract_duration,
            "start_year": ctx.start_year,
            "jitter_seed": input.jitter.as_ref().map(|j| j.seed),
            "base_team_size": input.model.base_team_size,
            "base_ticket_volume": input.model.base_ticket_volume,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input() -> ForecastInput {
        ForecastInput {
            base_revenue: dec!(100000),
            base_costs: dec!(80000),
            contract_duration: 12,
            seasonal_factors: vec![],
            scenarios: None,
            model: ForecastModel::default(),
            start_year: Some(2025),
            jitter: None,
        }
    }

    #[test]
    fn test_default_scenarios_shape() {
        let s = generate_default_scenarios(dec!(100000), dec!(80000));
        assert_eq!(s.len(), 3);
        let baselines: Vec<_> = s.iter().filter(|x| x.is_baseline).collect();
        assert_eq!(baselines.len(), 1);
        assert_eq!(baselines[0].scenario_type, ScenarioType::Realistic);
        let probs: Decimal = s.iter().map(|x| x.probability).sum();
        assert_eq!(probs, dec!(100));
        assert!(s.iter().all(|x| x.projections.is_empty()));
        assert_eq!(s[0].assumptions.revenue_growth, dec!(20));
        assert_eq!(s[2].assumptions.cost_inflation, dec!(12));
    }

    #[test]
    fn test_run_forecast_defaults() {
        let out = run_forecast(&input()).unwrap();
        let r = &out.result;
        assert_eq!(r.scenarios.len(), 3);
        assert_eq!(r.baseline_id.as_deref(), Some("realistic"));
        assert!(r.scenarios.iter().all(|s| s.scenario.projections.len() == 12));
        assert!(out.warnings.is_empty());
        assert_eq!(r.baseline().unwrap().scenario.id, "realistic");
    }

    #[test]
    fn test_optimistic_beats_pessimistic() {
        let out = run_forecast(&input()).unwrap();
        let r = &out.result;
        assert!(r.scenarios[0].summary.total_profit > r.scenarios[2].summary.total_profit);
        let weighted: Decimal = r
            .scenarios
            .iter()
            .map(|s| s.scenario.probability / dec!(100) * s.summary.total_profit)
            .sum();
        assert_eq!(r.probability_weighted_profit, weighted);
    }

    #[test]
    fn test_probability_and_baseline_warnings() {
        let mut inp = input();
        let mut s = generate_default_scenarios(inp.base_revenue, inp.base_costs);
        s[0].probability = dec!(40);
        s[0].is_baseline = true;
        inp.scenarios = Some(s);
        let out = run_forecast(&inp).unwrap();
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut inp = input();
        inp.contract_duration = 0;
        assert!(run_forecast(&inp).is_err());

        let mut inp = input();
        inp.base_costs = dec!(-1);
        assert!(run_forecast(&inp).is_err());

        let mut inp = input();
        inp.seasonal_factors = vec![SeasonalFactor { month: 13, factor: dec!(1) }];
        assert!(run_forecast(&inp).is_err());

        let mut inp = input();
        let mut s = generate_default_scenarios(inp.base_revenue, inp.base_costs);
        s[1].assumptions.efficiency_gains = dec!(-100);
        inp.scenarios = Some(s);
        assert!(run_forecast(&inp).is_err());
    }

    #[test]
    fn test_long_contract_warning() {
        let mut inp = input();
        inp.contract_duration = 72;
        let out = run_forecast(&inp).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("72-month")));
    }
}
