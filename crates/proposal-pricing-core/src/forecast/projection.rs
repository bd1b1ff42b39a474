use chrono::{Datelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use super::model::{
    CostBreakdown, ForecastModel, ForecastScenario, KpiJitter, MonthlyKpis, MonthlyProjection,
    SeasonalFactor,
};
use crate::error::PricingError;
use crate::types::{pct_to_fraction, safe_pct, Money};
use crate::PricingResult;

/// Longest contract the projector accepts.
pub const MAX_CONTRACT_MONTHS: u32 = 600;
/// Ceiling on any monthly amount or margin, keeping contract-length sums exact.
const MAX_MONTHLY_FIGURE: Decimal = dec!(1000000000000000000);
const KPI_GAIN_LIMIT: Decimal = dec!(10);

/// Noise wider than this only pins the KPIs at their bounds.
const MAX_JITTER_AMPLITUDE: Decimal = dec!(100);

/// Everything the projector needs besides the scenario and base figures.
#[derive(Debug, Clone)]
pub struct ProjectionContext {
    pub model: ForecastModel,
    /// Calendar year of the first projected month
    pub start_year: i32,
    /// `None` keeps the KPI mapping deterministic
    pub jitter: Option<KpiJitter>,
}

impl Default for ProjectionContext {
    fn default() -> Self {
        Self {
            model: ForecastModel::default(),
            start_year: Utc::now().year(),
            jitter: None,
        }
    }
}

/// `(1 + rate%)^years`. Exactly one at year zero or a zero rate; zero when the rate wipes
/// out the base (≤ -100%). `None` when the factor overflows.
pub fn compound_factor(rate_pct: Decimal, years: Decimal) -> Option<Decimal> {
    if years.is_zero() || rate_pct.is_zero() {
        return Some(Decimal::ONE);
    }
    let base = Decimal::ONE + pct_to_fraction(rate_pct);
    if base <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    base.checked_powd(years)
}

fn seasonal_factor_for(month_in_year: u32, factors: &[SeasonalFactor]) -> Decimal {
    factors
        .iter()
        .find(|f| f.month == month_in_year)
        .map(|f| f.factor)
        .unwrap_or(Decimal::ONE)
}

fn ceil_count(value: Decimal) -> Option<u32> {
    value.ceil().to_u32()
}

fn overflow(month: u32, what: &str) -> PricingError {
    PricingError::FinancialImpossibility(format!(
        "{what} in month {month} exceeds the representable range; reduce the growth rates or the contract length"
    ))
}

fn clamp_pct(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(dec!(100))
}

/// Source of KPI noise: silent unless a seed was supplied.
struct Noise {
    rng: Option<StdRng>,
    amplitude: Decimal,
}

impl Noise {
    fn new(jitter: Option<&KpiJitter>) -> Self {
        match jitter {
            Some(j) => Self {
                rng: Some(StdRng::seed_from_u64(j.seed)),
                amplitude: j.amplitude.abs().min(MAX_JITTER_AMPLITUDE),
            },
            None => Self {
                rng: None,
                amplitude: Decimal::ZERO,
            },
        }
    }

    /// Uniform in `[-spread, spread]` scaled by the amplitude.
    fn next(&mut self, spread: Decimal) -> Decimal {
        match self.rng.as_mut() {
            Some(rng) => {
                let u: f64 = rng.gen_range(-1.0..=1.0);
                Decimal::from_f64(u).unwrap_or_default() * spread * self.amplitude
            }
            None => Decimal::ZERO,
        }
    }
}

fn monthly_kpis(
    model: &ForecastModel,
    efficiency_factor: Decimal,
    revenue: Money,
    costs: Money,
    team_size: u32,
    ticket_volume: u32,
    noise: &mut Noise,
) -> MonthlyKpis {
    let base = &model.kpi_baseline;
    // beyond ±10 every percentage KPI is already pinned at 0 or 100
    let gain = (efficiency_factor - Decimal::ONE).max(-KPI_GAIN_LIMIT).min(KPI_GAIN_LIMIT);
    let resolution_time = if efficiency_factor.is_zero() {
        base.average_resolution_time
    } else {
        base.average_resolution_time
            .checked_div(efficiency_factor)
            .unwrap_or(Decimal::MAX)
    };

    MonthlyKpis {
        customer_satisfaction: clamp_pct(base.customer_satisfaction + gain * dec!(50) + noise.next(dec!(2)))
            .round_dp(2),
        sla_compliance: clamp_pct(base.sla_compliance + gain * dec!(20) + noise.next(dec!(1))).round_dp(2),
        first_call_resolution: clamp_pct(
            base.first_call_resolution + gain * dec!(40) + noise.next(dec!(3)),
        )
        .round_dp(2),
        average_resolution_time: (resolution_time
            .checked_add(noise.next(dec!(0.25)))
            .unwrap_or(resolution_time))
            .max(Decimal::ZERO)
            .round_dp(2),
        cost_per_ticket: if ticket_volume == 0 {
            Decimal::ZERO
        } else {
            costs / Decimal::from(ticket_volume)
        },
        revenue_per_employee: if team_size == 0 {
            Decimal::ZERO
        } else {
            revenue / Decimal::from(team_size)
        },
    }
}

/// Project a scenario month by month with the default model, the current
/// calendar year and no KPI jitter.
pub fn calculate_monthly_projections(
    scenario: &ForecastScenario,
    base_revenue: Money,
    base_costs: Money,
    contract_duration: u32,
    seasonal_factors: &[SeasonalFactor],
) -> PricingResult<Vec<MonthlyProjection>> {
    calculate_monthly_projections_with(
        &ProjectionContext::default(),
        scenario,
        base_revenue,
        base_costs,
        contract_duration,
        seasonal_factors,
    )
}

/// Project a scenario month by month.
///
/// Growth, inflation and efficiency compound annually from month 1
/// (`(month - 1) / 12` years). Efficiency divides costs rather than
/// subtracting from them. The result always has `contract_duration` entries.
///
/// Contracts longer than [`MAX_CONTRACT_MONTHS`] are rejected, and growth that
/// pushes a monthly figure past 10^18 is a `FinancialImpossibility`.
pub fn calculate_monthly_projections_with(
    ctx: &ProjectionContext,
    scenario: &ForecastScenario,
    base_revenue: Money,
    base_costs: Money,
    contract_duration: u32,
    seasonal_factors: &[SeasonalFactor],
) -> PricingResult<Vec<MonthlyProjection>> {
    if contract_duration > MAX_CONTRACT_MONTHS {
        return Err(PricingError::InvalidInput {
            field: "contract_duration".into(),
            reason: format!("Contract cannot exceed {MAX_CONTRACT_MONTHS} months"),
        });
    }
    ctx.model.validate()?;
    let a = &scenario.assumptions;
    let split = &ctx.model.cost_split;
    let mut noise = Noise::new(ctx.jitter.as_ref());
    let mut projections = Vec::with_capacity(contract_duration as usize);

    for month in 1..=contract_duration {
        let time_in_years = Decimal::from(month - 1) / dec!(12);
        let growth = |rate: Decimal, what: &str| {
            compound_factor(rate, time_in_years).ok_or_else(|| overflow(month, what))
        };
        let revenue_growth = growth(a.revenue_growth, "Revenue growth")?;
        let cost_inflation = growth(a.cost_inflation, "Cost inflation")?;
        let team_growth = growth(a.team_growth, "Team growth")?;
        let efficiency = growth(a.efficiency_gains, "Efficiency gain")?;

        let month_in_year = ((month - 1) % 12) + 1;
        let seasonal = seasonal_factor_for(month_in_year, seasonal_factors);

        let revenue = base_revenue
            .checked_mul(revenue_growth)
            .and_then(|r| r.checked_mul(seasonal))
            .filter(|r| r.abs() <= MAX_MONTHLY_FIGURE)
            .ok_or_else(|| overflow(month, "Revenue"))?;
        let raw_costs = base_costs
            .checked_mul(cost_inflation)
            .ok_or_else(|| overflow(month, "Cost"))?;
        let total = if efficiency.is_zero() {
            Some(raw_costs)
        } else {
            raw_costs.checked_div(efficiency)
        }
        .filter(|c| c.abs() <= MAX_MONTHLY_FIGURE)
        .ok_or_else(|| overflow(month, "Cost"))?;
        let profit = revenue - total;
        let margin = Some(safe_pct(profit, revenue))
            .filter(|m| m.abs() <= MAX_MONTHLY_FIGURE)
            .ok_or_else(|| overflow(month, "Margin"))?;

        let team_size = Decimal::from(ctx.model.base_team_size)
            .checked_mul(team_growth)
            .and_then(ceil_count)
            .ok_or_else(|| overflow(month, "Team size"))?;
        let ticket_volume = Decimal::from(ctx.model.base_ticket_volume)
            .checked_mul(revenue_growth)
            .and_then(|t| t.checked_mul(seasonal))
            .and_then(ceil_count)
            .ok_or_else(|| overflow(month, "Ticket volume"))?;

        let kpis = monthly_kpis(
            &ctx.model,
            efficiency,
            revenue,
            total,
            team_size,
            ticket_volume,
            &mut noise,
        );

        projections.push(MonthlyProjection {
            month: month_in_year,
            year: ctx.start_year + ((month - 1) / 12) as i32,
            revenue,
            costs: CostBreakdown {
                personnel: total * split.personnel,
                infrastructure: total * split.infrastructure,
                operations: total * split.operations,
                taxes: total * split.taxes,
                other: total * split.other,
                total,
            },
            profit,
            margin,
            team_size,
            ticket_volume,
            kpis,
        });
    }

    Ok(projections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::model::{ForecastAssumptions, ScenarioType};
    use pretty_assertions::assert_eq;

    fn scenario(revenue_growth: Decimal) -> ForecastScenario {
        ForecastScenario {
            id: "realistic".into(),
            name: "Realistic".into(),
            scenario_type: ScenarioType::Realistic,
            probability: dec!(50),
            assumptions: ForecastAssumptions {
                revenue_growth,
                cost_inflation: dec!(8),
                team_growth: dec!(10),
                efficiency_gains: dec!(5),
                market_factors: vec![],
                custom_adjustments: vec![],
            },
            is_baseline: true,
            description: String::new(),
            projections: vec![],
        }
    }

    fn ctx() -> ProjectionContext {
        ProjectionContext {
            start_year: 2025,
            ..ProjectionContext::default()
        }
    }

    #[test]
    fn test_length_and_first_month() {
        let p = calculate_monthly_projections(&scenario(dec!(12)), dec!(100000), dec!(80000), 12, &[]).unwrap();
        assert_eq!(p.len(), 12);
        assert_eq!(p[0].team_size, 10);
        assert_eq!(p[0].ticket_volume, 1000);
        assert_eq!(p[0].revenue, dec!(100000));
        assert_eq!(p[0].costs.total, dec!(80000));
        assert_eq!(p[0].costs.personnel, p[0].costs.total * dec!(0.65));
        assert_eq!(p[0].profit, dec!(20000));
        assert_eq!(p[0].margin, dec!(20));
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let p = calculate_monthly_projections_with(&ctx(), &scenario(dec!(12)), dec!(100000), dec!(80000), 6, &[]).unwrap();
        for m in &p {
            let c = &m.costs;
            let sum = c.personnel + c.infrastructure + c.operations + c.taxes + c.other;
            assert!((sum - c.total).abs() < dec!(0.000001));
        }
    }

    #[test]
    fn test_revenue_grows_with_positive_growth() {
        let p = calculate_monthly_projections_with(&ctx(), &scenario(dec!(12)), dec!(100000), dec!(80000), 24, &[]).unwrap();
        assert!(p[23].revenue > p[0].revenue);
        // after one full year revenue has grown ~12%
        let ratio = p[12].revenue / p[0].revenue;
        assert!((ratio - dec!(1.12)).abs() < dec!(0.0001), "ratio {ratio}");
    }

    #[test]
    fn test_year_and_month_rollover() {
        let p = calculate_monthly_projections_with(&ctx(), &scenario(dec!(12)), dec!(1), dec!(1), 25, &[]).unwrap();
        assert_eq!((p[0].month, p[0].year), (1, 2025));
        assert_eq!((p[11].month, p[11].year), (12, 2025));
        assert_eq!((p[12].month, p[12].year), (1, 2026));
        assert_eq!((p[24].month, p[24].year), (1, 2027));
    }

    #[test]
    fn test_seasonal_factor_applied() {
        let factors = vec![SeasonalFactor { month: 2, factor: dec!(1.5) }];
        let mut s = scenario(Decimal::ZERO);
        s.assumptions.cost_inflation = Decimal::ZERO;
        s.assumptions.efficiency_gains = Decimal::ZERO;
        let p = calculate_monthly_projections_with(&ctx(), &s, dec!(1000), dec!(500), 3, &factors).unwrap();
        assert_eq!(p[0].revenue, dec!(1000));
        assert_eq!(p[1].revenue, dec!(1500));
        assert_eq!(p[1].ticket_volume, 1500);
        assert_eq!(p[2].revenue, dec!(1000));
    }

    #[test]
    fn test_zero_revenue_margin_guard() {
        let p = calculate_monthly_projections_with(&ctx(), &scenario(dec!(12)), Decimal::ZERO, dec!(100), 2, &[]).unwrap();
        assert_eq!(p[0].margin, Decimal::ZERO);
        assert_eq!(p[0].kpis.revenue_per_employee, Decimal::ZERO);
    }

    #[test]
    fn test_zero_duration_is_empty() {
        let p = calculate_monthly_projections_with(&ctx(), &scenario(dec!(12)), dec!(1), dec!(1), 0, &[]).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn test_kpis_deterministic_without_jitter() {
        let a = calculate_monthly_projections_with(&ctx(), &scenario(dec!(12)), dec!(100000), dec!(80000), 12, &[]).unwrap();
        let b = calculate_monthly_projections_with(&ctx(), &scenario(dec!(12)), dec!(100000), dec!(80000), 12, &[]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].kpis.customer_satisfaction, dec!(85));
        assert_eq!(a[0].kpis.cost_per_ticket, dec!(80));
        assert_eq!(a[0].kpis.revenue_per_employee, dec!(10000));
    }

    #[test]
    fn test_seeded_jitter_reproducible() {
        let jittered = ProjectionContext {
            jitter: Some(KpiJitter { seed: 42, amplitude: Decimal::ONE }),
            ..ctx()
        };
        let a = calculate_monthly_projections_with(&jittered, &scenario(dec!(12)), dec!(100000), dec!(80000), 12, &[]).unwrap();
        let b = calculate_monthly_projections_with(&jittered, &scenario(dec!(12)), dec!(100000), dec!(80000), 12, &[]).unwrap();
        assert_eq!(a, b);
        for m in &a {
            assert!(m.kpis.customer_satisfaction >= Decimal::ZERO);
            assert!(m.kpis.customer_satisfaction <= dec!(100));
            // noise never touches the financial figures
            assert_eq!(m.profit, m.revenue - m.costs.total);
        }
    }

    #[test]
    fn test_compound_factor() {
        assert_eq!(compound_factor(dec!(12), Decimal::ZERO), Some(Decimal::ONE));
        assert_eq!(compound_factor(dec!(-100), Decimal::ONE), Some(Decimal::ZERO));
        let f = compound_factor(dec!(10), Decimal::ONE).unwrap();
        assert!((f - dec!(1.1)).abs() < dec!(0.000001));
        assert_eq!(compound_factor(dec!(100000000000000000000), dec!(49)), None);
    }

    #[test]
    fn test_costs_and_tickets_after_first_year() {
        let p = calculate_monthly_projections_with(&ctx(), &scenario(dec!(12)), dec!(100000), dec!(80000), 13, &[])
            .unwrap();
        // 8% inflation against 5% efficiency, tickets follow the 12% revenue growth
        let expected = dec!(80000) * dec!(1.08) / dec!(1.05);
        assert!((p[12].costs.total - expected).abs() < dec!(0.000001), "costs {}", p[12].costs.total);
        assert_eq!(p[12].ticket_volume, 1120);
        assert_eq!(p[12].team_size, 11);
    }

    #[test]
    fn test_contract_length_capped() {
        let s = scenario(dec!(12));
        let err = calculate_monthly_projections_with(&ctx(), &s, dec!(1), dec!(1), 6000, &[]).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput { ref field, .. } if field == "contract_duration"));
        let p = calculate_monthly_projections_with(&ctx(), &s, dec!(1), dec!(1), MAX_CONTRACT_MONTHS, &[]).unwrap();
        assert_eq!(p.len(), MAX_CONTRACT_MONTHS as usize);
    }

    #[test]
    fn test_runaway_growth_is_financial_impossibility() {
        let s = scenario(dec!(100000000000000000000));
        let err = calculate_monthly_projections_with(&ctx(), &s, dec!(100000), dec!(80000), 600, &[]).unwrap_err();
        assert!(matches!(err, PricingError::FinancialImpossibility(_)), "{err}");
    }
}
