use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::types::{Money, Percent};
use crate::PricingResult;

// ---------------------------------------------------------------------------
// Scenario types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioType {
    Optimistic,
    Realistic,
    Pessimistic,
}

/// External factor recorded alongside a scenario's assumptions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketFactor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Expected effect on revenue, percentage points (negative = adverse)
    pub impact: Percent,
    pub probability: Percent,
}

/// Free-form analyst adjustment attached to a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomAdjustment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub value: Decimal,
    #[serde(default)]
    pub description: String,
}

/// Annual rates, in percentage points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastAssumptions {
    pub revenue_growth: Percent,
    pub cost_inflation: Percent,
    pub team_growth: Percent,
    pub efficiency_gains: Percent,
    #[serde(default)]
    pub market_factors: Vec<MarketFactor>,
    #[serde(default)]
    pub custom_adjustments: Vec<CustomAdjustment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastScenario {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub scenario_type: ScenarioType,
    /// 0–100; a set of scenarios should sum to 100 but this is not enforced
    pub probability: Percent,
    pub assumptions: ForecastAssumptions,
    #[serde(default)]
    pub is_baseline: bool,
    #[serde(default)]
    pub description: String,
    /// Filled by the projector; empty on input
    #[serde(default)]
    pub projections: Vec<MonthlyProjection>,
}

// ---------------------------------------------------------------------------
// Projection types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostBreakdown {
    pub personnel: Money,
    pub infrastructure: Money,
    pub operations: Money,
    pub taxes: Money,
    pub other: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyKpis {
    pub customer_satisfaction: Percent,
    pub sla_compliance: Percent,
    pub first_call_resolution: Percent,
    /// Hours
    pub average_resolution_time: Decimal,
    pub cost_per_ticket: Money,
    pub revenue_per_employee: Money,
}

/// One month of a forecast. Produced only by the projector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyProjection {
    /// Calendar month, 1–12
    pub month: u32,
    pub year: i32,
    pub revenue: Money,
    pub costs: CostBreakdown,
    /// revenue - costs.total
    pub profit: Money,
    /// profit / revenue, percentage points; zero when revenue is zero
    pub margin: Percent,
    pub team_size: u32,
    pub ticket_volume: u32,
    pub kpis: MonthlyKpis,
}

/// Multiplier applied to revenue and ticket volume in a calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonalFactor {
    /// 1–12
    pub month: u32,
    pub factor: Decimal,
}

// ---------------------------------------------------------------------------
// Model constants
// ---------------------------------------------------------------------------

/// Fractions of total monthly cost attributed to each bucket. Must sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostSplit {
    pub personnel: Decimal,
    pub infrastructure: Decimal,
    pub operations: Decimal,
    pub taxes: Decimal,
    pub other: Decimal,
}

impl Default for CostSplit {
    fn default() -> Self {
        Self {
            personnel: dec!(0.65),
            infrastructure: dec!(0.15),
            operations: dec!(0.12),
            taxes: dec!(0.05),
            other: dec!(0.03),
        }
    }
}

impl CostSplit {
    pub fn sum(&self) -> Decimal {
        self.personnel + self.infrastructure + self.operations + self.taxes + self.other
    }
}

/// One year, in hours.
const MAX_RESOLUTION_HOURS: Decimal = dec!(8760);

/// Starting values for the service quality KPIs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KpiBaseline {
    pub customer_satisfaction: Percent,
    pub sla_compliance: Percent,
    pub first_call_resolution: Percent,
    /// Hours
    pub average_resolution_time: Decimal,
}

impl Default for KpiBaseline {
    fn default() -> Self {
        Self {
            customer_satisfaction: dec!(85),
            sla_compliance: dec!(95),
            first_call_resolution: dec!(70),
            average_resolution_time: dec!(4),
        }
    }
}

/// Constants of the forecast model. Defaults reproduce the legacy proposal
/// spreadsheets: 65/15/12/5/3 split, 10 people, 1000 tickets per month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastModel {
    pub cost_split: CostSplit,
    pub base_team_size: u32,
    pub base_ticket_volume: u32,
    pub kpi_baseline: KpiBaseline,
}

impl Default for ForecastModel {
    fn default() -> Self {
        Self {
            cost_split: CostSplit::default(),
            base_team_size: 10,
            base_ticket_volume: 1000,
            kpi_baseline: KpiBaseline::default(),
        }
    }
}

impl ForecastModel {
    pub fn validate(&self) -> PricingResult<()> {
        let split = &self.cost_split;
        for (name, v) in [
            ("personnel", split.personnel),
            ("infrastructure", split.infrastructure),
            ("operations", split.operations),
            ("taxes", split.taxes),
            ("other", split.other),
        ] {
            if v < Decimal::ZERO {
                return Err(PricingError::InvalidInput {
                    field: format!("model.cost_split.{name}"),
                    reason: "Cost split fractions cannot be negative".into(),
                });
            }
        }
        if split.sum() != Decimal::ONE {
            return Err(PricingError::InvalidInput {
                field: "model.cost_split".into(),
                reason: format!("Cost split must sum to 1 (got {})", split.sum()),
            });
        }

        let kpi = &self.kpi_baseline;
        for (name, v) in [
            ("customer_satisfaction", kpi.customer_satisfaction),
            ("sla_compliance", kpi.sla_compliance),
            ("first_call_resolution", kpi.first_call_resolution),
        ] {
            if v < Decimal::ZERO || v > dec!(100) {
                return Err(PricingError::InvalidInput {
                    field: format!("model.kpi_baseline.{name}"),
                    reason: "KPI baseline must be between 0 and 100".into(),
                });
            }
        }
        if kpi.average_resolution_time < Decimal::ZERO
            || kpi.average_resolution_time > MAX_RESOLUTION_HOURS
        {
            return Err(PricingError::InvalidInput {
                field: "model.kpi_baseline.average_resolution_time".into(),
                reason: format!("Resolution time must be between 0 and {MAX_RESOLUTION_HOURS} hours"),
            });
        }
        Ok(())
    }
}

/// Seeded noise added to the service quality KPIs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KpiJitter {
    pub seed: u64,
    /// Scales every noise term; 1 = default spread
    #[serde(default = "default_amplitude")]
    pub amplitude: Decimal,
}

fn default_amplitude() -> Decimal {
    Decimal::ONE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_split_sums_to_one() {
        assert_eq!(CostSplit::default().sum(), Decimal::ONE);
        assert!(ForecastModel::default().validate().is_ok());
    }

    #[test]
    fn test_bad_split_rejected() {
        let mut model = ForecastModel::default();
        model.cost_split.other = dec!(0.10);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_kpi_baseline_out_of_range_rejected() {
        let mut model = ForecastModel::default();
        model.kpi_baseline.sla_compliance = dec!(100.5);
        assert!(model.validate().is_err());

        let mut model = ForecastModel::default();
        model.kpi_baseline.average_resolution_time = dec!(8761);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_model_partial_json_uses_defaults() {
        let model: ForecastModel = serde_json::from_str(r#"{"base_team_size": 25}"#).unwrap();
        assert_eq!(model.base_team_size, 25);
        assert_eq!(model.base_ticket_volume, 1000);
    }
}
