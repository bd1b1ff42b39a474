use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::costs::analysis::analyze_costs;
use crate::costs::model::AdditionalCost;
use crate::error::PricingError;
use crate::tax::config::{
    calculate_taxes, total_payroll_tax_rate, total_revenue_tax_rate, TaxBreakdown,
    TaxConfiguration,
};
use crate::tax::validation::validate_tax_configuration;
use crate::types::{pct_to_fraction, safe_pct, with_metadata, ComputationOutput, Money, Percent};
use crate::PricingResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Monthly cost of one team role, as produced by the team-cost calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamCostLine {
    pub role: String,
    pub monthly_cost: Money,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarginType {
    /// `value` is a margin on price, in percentage points
    Percentage,
    /// `value` is a flat monthly amount added to cost
    Fixed,
}

/// Pricing policy. The minimum/maximum bounds are soft: breaching them only
/// produces warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginPolicy {
    pub margin_type: MarginType,
    pub value: Decimal,
    pub minimum_margin: Percent,
    pub target_margin: Percent,
    pub maximum_margin: Percent,
}

impl Default for MarginPolicy {
    fn default() -> Self {
        Self {
            margin_type: MarginType::Percentage,
            value: dec!(20),
            minimum_margin: dec!(10),
            target_margin: dec!(20),
            maximum_margin: dec!(35),
        }
    }
}

/// Input for budget consolidation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetInput {
    pub team_costs: Vec<TeamCostLine>,
    #[serde(default)]
    pub additional_costs: Vec<AdditionalCost>,
    pub taxes: TaxConfiguration,
    /// Monthly revenue the revenue taxes are levied on. When absent the price
    /// is grossed up so that taxes are levied on the resulting price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_base: Option<Money>,
    #[serde(default)]
    pub margin: MarginPolicy,
    /// Contract length, used only for the contract value figure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_duration_months: Option<u32>,
}

/// Consolidated monthly budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetOutput {
    pub team_cost: Money,
    pub additional_costs: Money,
    pub taxes: TaxBreakdown,
    /// team + additional + taxes
    pub total_costs: Money,
    pub margin_amount: Money,
    pub total_price: Money,
    /// margin_amount / total_price
    pub margin_on_price_pct: Percent,
    /// margin_amount / total_costs
    pub markup_on_cost_pct: Percent,
    /// Revenue figure the revenue taxes were computed on
    pub revenue_base: Money,
    pub annual_price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_value: Option<Money>,
}

// ---------------------------------------------------------------------------
// Margin application
// ---------------------------------------------------------------------------

/// Turn a cost into a price under `policy`.
///
/// Percentage margins are margins on price: `cost / (1 - m)`, so 85 000 at 20%
/// prices at 106 250.
pub fn apply_margin(total_costs: Money, policy: &MarginPolicy) -> PricingResult<Money> {
    validate_margin(policy)?;
    match policy.margin_type {
        MarginType::Percentage => Ok(total_costs / (Decimal::ONE - pct_to_fraction(policy.value))),
        MarginType::Fixed => Ok(total_costs + policy.value),
    }
}

fn validate_margin(policy: &MarginPolicy) -> PricingResult<()> {
    if policy.value < Decimal::ZERO {
        return Err(PricingError::InvalidInput {
            field: "margin.value".into(),
            reason: "Margin cannot be negative; price must cover costs".into(),
        });
    }
    if policy.margin_type == MarginType::Percentage && policy.value >= dec!(100) {
        return Err(PricingError::InvalidInput {
            field: "margin.value".into(),
            reason: "A margin on price must be below 100%".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Consolidation
// ---------------------------------------------------------------------------

/// Combine team, additional costs and taxes into total costs, then price them.
pub fn consolidate_budget(input: &BudgetInput) -> PricingResult<ComputationOutput<BudgetOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    tracing::debug!(
        team_lines = input.team_costs.len(),
        cost_lines = input.additional_costs.len(),
        "consolidating budget"
    );

    validate_margin(&input.margin)?;
    for line in &input.team_costs {
        if line.monthly_cost < Decimal::ZERO {
            return Err(PricingError::InvalidInput {
                field: format!("team_costs:{}", line.role),
                reason: "Monthly cost cannot be negative".into(),
            });
        }
    }
    if let Some(base) = input.revenue_base {
        if base < Decimal::ZERO {
            return Err(PricingError::InvalidInput {
                field: "revenue_base".into(),
                reason: "Revenue base cannot be negative".into(),
            });
        }
    }

    let tax_check = validate_tax_configuration(&input.taxes);
    warnings.extend(tax_check.errors.iter().map(|e| format!("Tax configuration: {e}")));
    warnings.extend(tax_check.warnings.iter().map(|w| format!("Tax configuration: {w}")));

    let team_cost: Money = input.team_costs.iter().map(|l| l.monthly_cost).sum();
    let cost_analysis = analyze_costs(&input.additional_costs);
    let additional_costs = cost_analysis.total_monthly_cost;
    warnings.extend(cost_analysis.warnings);

    let pre_tax = team_cost + additional_costs;
    let payroll_taxes = team_cost * pct_to_fraction(total_payroll_tax_rate(&input.taxes));
    let revenue_rate = pct_to_fraction(total_revenue_tax_rate(&input.taxes));

    let revenue_base = match input.revenue_base {
        Some(base) => base,
        None => gross_up(pre_tax + payroll_taxes, revenue_rate, &input.margin)?,
    };

    let taxes = calculate_taxes(&input.taxes, revenue_base, team_cost);
    let total_costs = pre_tax + taxes.total_taxes;
    let total_price = apply_margin(total_costs, &input.margin)?;
    let margin_amount = total_price - total_costs;
    let margin_on_price_pct = safe_pct(margin_amount, total_price);

    if margin_on_price_pct < input.margin.minimum_margin {
        tracing::warn!(%margin_on_price_pct, "margin below policy minimum");
        warnings.push(format!(
            "Margin of {}% is below the minimum of {}%",
            margin_on_price_pct.round_dp(2),
            input.margin.minimum_margin
        ));
    } else if margin_on_price_pct > input.margin.maximum_margin {
        tracing::warn!(%margin_on_price_pct, "margin above policy maximum");
        warnings.push(format!(
            "Margin of {}% is above the maximum of {}%",
            margin_on_price_pct.round_dp(2),
            input.margin.maximum_margin
        ));
    }
    if total_costs.is_zero() {
        warnings.push("Total costs are zero; price reflects margin only".into());
    }

    let output = BudgetOutput {
        team_cost,
        additional_costs,
        total_costs,
        margin_amount,
        total_price,
        margin_on_price_pct,
        markup_on_cost_pct: safe_pct(margin_amount, total_costs),
        revenue_base,
        annual_price: total_price * dec!(12),
        contract_value: input
            .contract_duration_months
            .map(|m| total_price * Decimal::from(m)),
        taxes,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cost consolidation with margin-on-price",
        &serde_json::json!({
            "margin_type": input.margin.margin_type,
            "margin_value": input.margin.value.to_string(),
            "revenue_tax_rate": total_revenue_tax_rate(&input.taxes).to_string(),
            "tax_base": if input.revenue_base.is_some() { "explicit" } else { "gross_up" },
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Solve for the price when revenue taxes are levied on the price itself.
///
/// Percentage: `P = C / (1 - m - t)`; fixed: `P = (C + f) / (1 - t)`.
fn gross_up(cost_ex_revenue_tax: Money, revenue_rate: Decimal, policy: &MarginPolicy) -> PricingResult<Money> {
    let (numerator, denominator) = match policy.margin_type {
        MarginType::Percentage => (
            cost_ex_revenue_tax,
            Decimal::ONE - pct_to_fraction(policy.value) - revenue_rate,
        ),
        MarginType::Fixed => (cost_ex_revenue_tax + policy.value, Decimal::ONE - revenue_rate),
    };
    if denominator <= Decimal::ZERO {
        return Err(PricingError::FinancialImpossibility(format!(
            "Margin plus revenue taxes reach {}% of price; no price can cover them",
            ((Decimal::ONE - denominator) * dec!(100)).round_dp(2)
        )));
    }
    Ok(numerator / denominator)
}
