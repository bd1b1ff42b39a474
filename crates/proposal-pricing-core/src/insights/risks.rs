use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::forecast::model::MonthlyProjection;
use crate::types::{safe_pct, Money, Percent};

/// Average margin below which the forecast carries a low-margin risk.
const LOW_MARGIN_THRESHOLD: Decimal = dec!(15);
/// Growth of monthly cost (last vs first month) above which inflation is a risk.
const COST_GROWTH_THRESHOLD: Decimal = dec!(50);
/// Share of total revenue at stake when margins are thin.
const LOW_MARGIN_LOSS_SHARE: Decimal = dec!(0.10);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Financial,
    Operational,
    Market,
    Regulatory,
    Technical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastRisk {
    pub id: String,
    pub name: String,
    pub category: RiskCategory,
    pub probability: Percent,
    pub impact: Percent,
    pub severity: RiskSeverity,
    pub description: String,
    pub potential_loss: Money,
    pub timeframe: String,
}

/// Mean of the monthly margins; zero for an empty series.
pub fn average_margin(projections: &[MonthlyProjection]) -> Percent {
    if projections.is_empty() {
        return Decimal::ZERO;
    }
    projections.iter().map(|p| p.margin).sum::<Decimal>() / Decimal::from(projections.len())
}

/// Growth of total monthly cost from the first to the last month, in percent.
pub fn cost_growth(projections: &[MonthlyProjection]) -> Percent {
    match (projections.first(), projections.last()) {
        (Some(first), Some(last)) => {
            safe_pct(last.costs.total - first.costs.total, first.costs.total)
        }
        _ => Decimal::ZERO,
    }
}

/// Risks derived from the projection data. An empty series has no risks.
pub fn identify_risks(projections: &[MonthlyProjection]) -> Vec<ForecastRisk> {
    let mut risks: Vec<ForecastRisk> = Vec::new();
    let Some(first) = projections.first() else {
        return risks;
    };

    let avg_margin = average_margin(projections);
    if avg_margin < LOW_MARGIN_THRESHOLD {
        let total_revenue: Money = projections.iter().map(|p| p.revenue).sum();
        risks.push(ForecastRisk {
            id: "low-margin".into(),
            name: "Low margin".into(),
            category: RiskCategory::Financial,
            probability: dec!(70),
            impact: dec!(80),
            severity: RiskSeverity::High,
            description: format!(
                "Average margin of {}% leaves little room for cost overruns",
                avg_margin.round_dp(2)
            ),
            potential_loss: total_revenue * LOW_MARGIN_LOSS_SHARE,
            timeframe: "6-12 months".into(),
        });
    }

    let growth = cost_growth(projections);
    if growth > COST_GROWTH_THRESHOLD {
        let excess: Money = projections
            .iter()
            .map(|p| (p.costs.total - first.costs.total).max(Decimal::ZERO))
            .sum();
        risks.push(ForecastRisk {
            id: "cost-inflation".into(),
            name: "Cost inflation".into(),
            category: RiskCategory::Operational,
            probability: dec!(60),
            impact: dec!(60),
            severity: RiskSeverity::Medium,
            description: format!(
                "Monthly costs grow {}% over the contract",
                growth.round_dp(2)
            ),
            potential_loss: excess,
            timeframe: "12-24 months".into(),
        });
    }

    risks
}

/// Standing disclaimers attached to every forecast regardless of its data.
pub fn advisory_risks() -> Vec<ForecastRisk> {
    vec![ForecastRisk {
        id: "client-dependency".into(),
        name: "Client dependency".into(),
        category: RiskCategory::Market,
        probability: dec!(30),
        impact: dec!(70),
        severity: RiskSeverity::Medium,
        description: "Revenue depends on a single client contract; renewal and scope \
                      changes are outside the forecast"
            .into(),
        potential_loss: Decimal::ZERO,
        timeframe: "Contract term".into(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::summary::tests::month;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_has_no_risks() {
        assert!(identify_risks(&[]).is_empty());
    }

    #[test]
    fn test_healthy_forecast_has_no_risks() {
        let p = vec![month(dec!(100), dec!(70)), month(dec!(100), dec!(75))];
        assert!(identify_risks(&p).is_empty());
    }

    #[test]
    fn test_low_margin_risk() {
        let p = vec![month(dec!(1000), dec!(900)), month(dec!(1000), dec!(950))];
        let risks = identify_risks(&p);
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].id, "low-margin");
        assert_eq!(risks[0].severity, RiskSeverity::High);
        assert_eq!(risks[0].potential_loss, dec!(200));
    }

    #[test]
    fn test_cost_inflation_risk() {
        let p = vec![
            month(dec!(1000), dec!(100)),
            month(dec!(1000), dec!(120)),
            month(dec!(1000), dec!(160)),
        ];
        let risks = identify_risks(&p);
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].id, "cost-inflation");
        assert_eq!(risks[0].category, RiskCategory::Operational);
        assert_eq!(risks[0].potential_loss, dec!(80));
    }

    #[test]
    fn test_advisories_separate_from_data_risks() {
        let advisories = advisory_risks();
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].id, "client-dependency");
        assert_eq!(advisories[0].category, RiskCategory::Market);
    }

    #[test]
    fn test_cost_growth_zero_first_month() {
        let p = vec![month(dec!(10), Decimal::ZERO), month(dec!(10), dec!(5))];
        assert_eq!(cost_growth(&p), Decimal::ZERO);
    }
}
