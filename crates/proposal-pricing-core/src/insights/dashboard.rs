use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::risks::{advisory_risks, average_margin, cost_growth, identify_risks, ForecastRisk};
use crate::error::PricingError;
use crate::forecast::model::MonthlyProjection;
use crate::forecast::scenarios::{run_forecast, ForecastInput};
use crate::forecast::summary::{calculate_scenario_summary, ScenarioSummary};
use crate::types::{safe_pct, with_metadata, ComputationOutput, Percent};
use crate::PricingResult;

const MARGIN_TARGET: Decimal = dec!(20);
const ROI_TARGET: Decimal = dec!(25);
/// Changes within ±1 are reported as stable.
const STABLE_BAND: Decimal = dec!(1);
/// Share of target below which a KPI is critical rather than a warning.
const CRITICAL_SHARE_OF_TARGET: Decimal = dec!(0.75);

const ALERT_MARGIN_WARNING: Decimal = dec!(15);
const ALERT_MARGIN_CRITICAL: Decimal = dec!(10);
const ALERT_COST_GROWTH: Decimal = dec!(50);

const INSIGHT_HEALTHY_MARGIN: Decimal = dec!(25);
const INSIGHT_LOW_MARGIN: Decimal = dec!(20);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    Good,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardKpi {
    pub id: String,
    pub name: String,
    pub value: Decimal,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Decimal>,
    /// Change from the first to the last month backing the trend
    pub change: Decimal,
    pub trend: Trend,
    pub status: KpiStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardAlert {
    pub id: String,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub metric: String,
    pub value: Decimal,
    pub threshold: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Opportunity,
    Optimization,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardInsight {
    pub id: String,
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    /// Fixed per insight kind, not statistically derived
    pub confidence: Percent,
    pub impact: ImpactLevel,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardInput {
    pub projections: Vec<MonthlyProjection>,
}

/// Everything a dashboard needs for one projection series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub summary: ScenarioSummary,
    pub kpis: Vec<DashboardKpi>,
    pub alerts: Vec<DashboardAlert>,
    pub insights: Vec<DashboardInsight>,
    /// Data-derived risks
    pub risks: Vec<ForecastRisk>,
    /// Standing disclaimers, independent of the data
    pub advisories: Vec<ForecastRisk>,
}

// ---------------------------------------------------------------------------
// Classification helpers
// ---------------------------------------------------------------------------

fn classify_trend(change: Decimal) -> Trend {
    if change > STABLE_BAND {
        Trend::Up
    } else if change < -STABLE_BAND {
        Trend::Down
    } else {
        Trend::Stable
    }
}

fn status_against_target(value: Decimal, target: Decimal) -> KpiStatus {
    if value >= target {
        KpiStatus::Good
    } else if value >= target * CRITICAL_SHARE_OF_TARGET {
        KpiStatus::Warning
    } else {
        KpiStatus::Critical
    }
}

// ---------------------------------------------------------------------------
// KPIs, alerts, insights
// ---------------------------------------------------------------------------

/// The four headline KPIs. Empty input yields no KPIs.
pub fn calculate_dashboard_kpis(projections: &[MonthlyProjection]) -> Vec<DashboardKpi> {
    let (Some(first), Some(last)) = (projections.first(), projections.last()) else {
        return Vec::new();
    };
    let summary = calculate_scenario_summary(projections);

    let revenue_change = safe_pct(last.revenue - first.revenue, first.revenue);
    let margin_change = last.margin - first.margin;
    let team_growth = safe_pct(
        Decimal::from(last.team_size) - Decimal::from(first.team_size),
        Decimal::from(first.team_size),
    );
    let profit_change = safe_pct(last.profit - first.profit, first.profit.abs());

    vec![
        DashboardKpi {
            id: "total-revenue".into(),
            name: "Total revenue".into(),
            value: summary.total_revenue,
            unit: "BRL".into(),
            target: None,
            change: revenue_change,
            trend: classify_trend(revenue_change),
            status: if revenue_change >= Decimal::ZERO {
                KpiStatus::Good
            } else {
                KpiStatus::Warning
            },
        },
        DashboardKpi {
            id: "avg-margin".into(),
            name: "Average margin".into(),
            value: summary.average_margin,
            unit: "%".into(),
            target: Some(MARGIN_TARGET),
            change: margin_change,
            trend: classify_trend(margin_change),
            status: status_against_target(summary.average_margin, MARGIN_TARGET),
        },
        DashboardKpi {
            id: "team-growth".into(),
            name: "Team growth".into(),
            value: team_growth,
            unit: "%".into(),
            target: None,
            change: team_growth,
            trend: classify_trend(team_growth),
            status: KpiStatus::Good,
        },
        DashboardKpi {
            id: "roi-projection".into(),
            name: "Projected ROI".into(),
            value: summary.roi,
            unit: "%".into(),
            target: Some(ROI_TARGET),
            change: profit_change,
            trend: classify_trend(profit_change),
            status: status_against_target(summary.roi, ROI_TARGET),
        },
    ]
}

/// Threshold alerts on margin, cost growth and loss-making months.
pub fn generate_alerts(projections: &[MonthlyProjection]) -> Vec<DashboardAlert> {
    let mut alerts: Vec<DashboardAlert> = Vec::new();
    if projections.is_empty() {
        return alerts;
    }

    let avg_margin = average_margin(projections);
    if avg_margin < ALERT_MARGIN_WARNING {
        let critical = avg_margin < ALERT_MARGIN_CRITICAL;
        alerts.push(DashboardAlert {
            id: "low-margin".into(),
            severity: if critical {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            },
            title: "Low margin".into(),
            message: format!(
                "Average margin is {}%, below the {}% floor",
                avg_margin.round_dp(2),
                ALERT_MARGIN_WARNING
            ),
            metric: "average_margin".into(),
            value: avg_margin,
            threshold: if critical {
                ALERT_MARGIN_CRITICAL
            } else {
                ALERT_MARGIN_WARNING
            },
        });
    }

    let growth = cost_growth(projections);
    if growth > ALERT_COST_GROWTH {
        alerts.push(DashboardAlert {
            id: "cost-growth".into(),
            severity: AlertSeverity::Warning,
            title: "High cost growth".into(),
            message: format!("Monthly costs grow {}% over the contract", growth.round_dp(2)),
            metric: "cost_growth".into(),
            value: growth,
            threshold: ALERT_COST_GROWTH,
        });
    }

    let loss_months = projections.iter().filter(|p| p.profit < Decimal::ZERO).count();
    if loss_months > 0 {
        alerts.push(DashboardAlert {
            id: "loss-months".into(),
            severity: if loss_months * 2 > projections.len() {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            },
            title: "Loss-making months".into(),
            message: format!("{loss_months} of {} months run at a loss", projections.len()),
            metric: "loss_months".into(),
            value: Decimal::from(loss_months),
            threshold: Decimal::ZERO,
        });
    }

    alerts
}

/// Margin-driven recommendations. Empty input yields no insights.
pub fn generate_insights(projections: &[MonthlyProjection]) -> Vec<DashboardInsight> {
    let mut insights: Vec<DashboardInsight> = Vec::new();
    if projections.is_empty() {
        return insights;
    }

    let avg_margin = average_margin(projections);
    if avg_margin > INSIGHT_HEALTHY_MARGIN {
        insights.push(DashboardInsight {
            id: "expansion-opportunity".into(),
            insight_type: InsightType::Opportunity,
            title: "Room to expand scope".into(),
            description: format!(
                "An average margin of {}% supports adding services or competing harder on price",
                avg_margin.round_dp(2)
            ),
            confidence: dec!(75),
            impact: ImpactLevel::High,
            recommendations: vec![
                "Offer NOC or field support as an add-on".into(),
                "Use part of the margin for a multi-year renewal discount".into(),
            ],
        });
    } else if avg_margin < INSIGHT_LOW_MARGIN {
        insights.push(DashboardInsight {
            id: "cost-optimization".into(),
            insight_type: InsightType::Optimization,
            title: "Optimise costs".into(),
            description: format!(
                "Average margin of {}% is below the {}% target",
                avg_margin.round_dp(2),
                MARGIN_TARGET
            ),
            confidence: dec!(85),
            impact: ImpactLevel::Medium,
            recommendations: vec![
                "Automate level-1 tickets to reduce personnel cost".into(),
                "Renegotiate licences and infrastructure contracts".into(),
            ],
        });
    }

    insights
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

fn assemble(projections: &[MonthlyProjection]) -> DashboardReport {
    DashboardReport {
        summary: calculate_scenario_summary(projections),
        kpis: calculate_dashboard_kpis(projections),
        alerts: generate_alerts(projections),
        insights: generate_insights(projections),
        risks: identify_risks(projections),
        advisories: advisory_risks(),
    }
}

/// Build the full dashboard for a projection series.
pub fn build_dashboard(input: &DashboardInput) -> PricingResult<ComputationOutput<DashboardReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    if input.projections.is_empty() {
        warnings.push("No projections supplied; dashboard is empty".into());
    }

    let report = assemble(&input.projections);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Threshold-based KPI, alert, insight and risk synthesis",
        &serde_json::json!({
            "months": input.projections.len(),
            "margin_target": MARGIN_TARGET.to_string(),
            "roi_target": ROI_TARGET.to_string(),
        }),
        warnings,
        elapsed,
        report,
    ))
}

/// Run a forecast and build the dashboard for its baseline scenario.
pub fn build_forecast_dashboard(
    input: &ForecastInput,
) -> PricingResult<ComputationOutput<DashboardReport>> {
    let start = Instant::now();
    let forecast = run_forecast(input)?;
    let baseline = forecast.result.baseline().ok_or_else(|| PricingError::InvalidInput {
        field: "scenarios".into(),
        reason: "Forecast produced no scenarios".into(),
    })?;

    let report = assemble(&baseline.scenario.projections);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Threshold-based KPI, alert, insight and risk synthesis",
        &serde_json::json!({
            "scenario": baseline.scenario.id,
            "months": input.contract_duration,
            "margin_target": MARGIN_TARGET.to_string(),
            "roi_target": ROI_TARGET.to_string(),
        }),
        forecast.warnings,
        elapsed,
        report,
    ))
}
