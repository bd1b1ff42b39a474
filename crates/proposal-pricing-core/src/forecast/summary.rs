use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::MonthlyProjection;
use crate::types::{safe_pct, Money, Percent};

/// Totals and timing metrics for one projection series.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSummary {
    pub total_revenue: Money,
    pub total_costs: Money,
    pub total_profit: Money,
    /// Mean of the monthly margins
    pub average_margin: Percent,
    /// total_profit / total_costs
    pub roi: Percent,
    /// First month (1-based) whose cumulative profit covers the first
    /// month's cost; 0 if never reached
    pub payback_period: u32,
    /// First month (1-based) with positive profit; 0 if none
    pub break_even_month: u32,
}

/// Summarise a projection series. An empty series yields all zeros.
pub fn calculate_scenario_summary(projections: &[MonthlyProjection]) -> ScenarioSummary {
    let Some(first) = projections.first() else {
        return ScenarioSummary::default();
    };

    let total_revenue: Money = projections.iter().map(|p| p.revenue).sum();
    let total_costs: Money = projections.iter().map(|p| p.costs.total).sum();
    let total_profit: Money = projections.iter().map(|p| p.profit).sum();
    let average_margin =
        projections.iter().map(|p| p.margin).sum::<Decimal>() / Decimal::from(projections.len());

    let initial_cost = first.costs.total;
    let mut cumulative = Decimal::ZERO;
    let mut payback_period = 0;
    for (i, p) in projections.iter().enumerate() {
        cumulative += p.profit;
        if cumulative >= initial_cost {
            payback_period = i as u32 + 1;
            break;
        }
    }

    let break_even_month = projections
        .iter()
        .position(|p| p.profit > Decimal::ZERO)
        .map(|i| i as u32 + 1)
        .unwrap_or(0);

    ScenarioSummary {
        total_revenue,
        total_costs,
        total_profit,
        average_margin,
        roi: safe_pct(total_profit, total_costs),
        payback_period,
        break_even_month,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::forecast::model::{CostBreakdown, MonthlyKpis};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    /// Hand-built month with a flat cost split, for summary and insight tests.
    pub(crate) fn month(revenue: Decimal, cost: Decimal) -> MonthlyProjection {
        let profit = revenue - cost;
        MonthlyProjection {
            month: 1,
            year: 2025,
            revenue,
            costs: CostBreakdown {
                personnel: cost,
                infrastructure: Decimal::ZERO,
                operations: Decimal::ZERO,
                taxes: Decimal::ZERO,
                other: Decimal::ZERO,
                total: cost,
            },
            profit,
            margin: safe_pct(profit, revenue),
            team_size: 10,
            ticket_volume: 1000,
            kpis: MonthlyKpis {
                customer_satisfaction: dec!(85),
                sla_compliance: dec!(95),
                first_call_resolution: dec!(70),
                average_resolution_time: dec!(4),
                cost_per_ticket: Decimal::ZERO,
                revenue_per_employee: Decimal::ZERO,
            },
        }
    }

    #[test]
    fn test_empty_summary_is_all_zero() {
        let summary = calculate_scenario_summary(&[]);
        assert_eq!(
            summary,
            ScenarioSummary {
                total_revenue: Decimal::ZERO,
                total_costs: Decimal::ZERO,
                total_profit: Decimal::ZERO,
                average_margin: Decimal::ZERO,
                roi: Decimal::ZERO,
                payback_period: 0,
                break_even_month: 0,
            }
        );
    }

    #[test]
    fn test_totals_and_roi() {
        let p = vec![month(dec!(100), dec!(80)), month(dec!(100), dec!(60))];
        let s = calculate_scenario_summary(&p);
        assert_eq!(s.total_revenue, dec!(200));
        assert_eq!(s.total_costs, dec!(140));
        assert_eq!(s.total_profit, dec!(60));
        // (20 + 40) / 2
        assert_eq!(s.average_margin, dec!(30));
        assert_eq!(s.roi.round_dp(4), dec!(42.8571));
    }

    #[test]
    fn test_payback_and_break_even() {
        // profits: -10, 5, 40, 40 ; first month cost 110
        let p = vec![
            month(dec!(100), dec!(110)),
            month(dec!(100), dec!(95)),
            month(dec!(100), dec!(60)),
            month(dec!(100), dec!(60)),
        ];
        let s = calculate_scenario_summary(&p);
        assert_eq!(s.break_even_month, 2);
        // cumulative: -10, -5, 35, 75, never reaches 110
        assert_eq!(s.payback_period, 0);

        let p = vec![month(dec!(300), dec!(100)), month(dec!(300), dec!(100))];
        let s = calculate_scenario_summary(&p);
        assert_eq!(s.payback_period, 1);
        assert_eq!(s.break_even_month, 1);
    }
}
