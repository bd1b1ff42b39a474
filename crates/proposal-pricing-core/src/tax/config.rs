use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{pct_to_fraction, safe_pct, Money, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Brazilian corporate tax regime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxRegime {
    SimplesNacional,
    LucroPresumido,
    LucroReal,
}

impl TaxRegime {
    pub fn label(&self) -> &'static str {
        match self {
            TaxRegime::SimplesNacional => "Simples Nacional",
            TaxRegime::LucroPresumido => "Lucro Presumido",
            TaxRegime::LucroReal => "Lucro Real",
        }
    }
}

/// What a custom tax rate is levied on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalculationBase {
    #[default]
    Revenue,
    Payroll,
}

/// A tax outside the six standard ones (municipal fees, sector contributions).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomTax {
    pub name: String,
    /// Rate in percentage points
    pub rate: Percent,
    #[serde(default)]
    pub calculation_base: CalculationBase,
    #[serde(default)]
    pub description: String,
}

/// Regional tax setup for a proposal. All rates in percentage points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxConfiguration {
    /// State / municipality label, e.g. "SP", "Rio de Janeiro"
    pub region: String,
    /// `None` when the user has not picked a regime yet
    pub tax_regime: Option<TaxRegime>,
    pub icms: Percent,
    pub pis: Percent,
    pub cofins: Percent,
    pub iss: Percent,
    pub ir: Percent,
    pub csll: Percent,
    #[serde(default)]
    pub custom_taxes: Vec<CustomTax>,
}

impl TaxConfiguration {
    /// The six standard rates paired with their display names, in a fixed order.
    pub fn standard_rates(&self) -> [(&'static str, Percent); 6] {
        [
            ("ICMS", self.icms),
            ("PIS", self.pis),
            ("COFINS", self.cofins),
            ("ISS", self.iss),
            ("IR", self.ir),
            ("CSLL", self.csll),
        ]
    }

    /// PIS + COFINS + IR + CSLL.
    pub fn federal_rate(&self) -> Percent {
        self.pis + self.cofins + self.ir + self.csll
    }
}

/// Sum of every rate levied on revenue: the six standard ones plus
/// revenue-based custom taxes.
pub fn total_revenue_tax_rate(config: &TaxConfiguration) -> Percent {
    let standard: Decimal = config.standard_rates().iter().map(|(_, r)| *r).sum();
    let custom: Decimal = config
        .custom_taxes
        .iter()
        .filter(|t| t.calculation_base == CalculationBase::Revenue)
        .map(|t| t.rate)
        .sum();
    standard + custom
}

/// Sum of payroll-based custom tax rates.
pub fn total_payroll_tax_rate(config: &TaxConfiguration) -> Percent {
    config
        .custom_taxes
        .iter()
        .filter(|t| t.calculation_base == CalculationBase::Payroll)
        .map(|t| t.rate)
        .sum()
}

/// One line of a tax breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxLine {
    pub name: String,
    pub rate: Percent,
    pub base: CalculationBase,
    pub amount: Money,
}

/// Tax amounts for a given revenue and payroll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxBreakdown {
    pub lines: Vec<TaxLine>,
    pub revenue_taxes: Money,
    pub payroll_taxes: Money,
    pub total_taxes: Money,
    /// total_taxes / revenue, in percentage points
    pub effective_rate: Percent,
}

/// Apply every rate of `config` to its base.
pub fn calculate_taxes(config: &TaxConfiguration, revenue: Money, payroll: Money) -> TaxBreakdown {
    let mut lines: Vec<TaxLine> = config
        .standard_rates()
        .iter()
        .map(|(name, rate)| TaxLine {
            name: (*name).to_string(),
            rate: *rate,
            base: CalculationBase::Revenue,
            amount: revenue * pct_to_fraction(*rate),
        })
        .collect();

    for tax in &config.custom_taxes {
        let base_amount = match tax.calculation_base {
            CalculationBase::Revenue => revenue,
            CalculationBase::Payroll => payroll,
        };
        lines.push(TaxLine {
            name: tax.name.clone(),
            rate: tax.rate,
            base: tax.calculation_base,
            amount: base_amount * pct_to_fraction(tax.rate),
        });
    }

    let revenue_taxes: Money = lines
        .iter()
        .filter(|l| l.base == CalculationBase::Revenue)
        .map(|l| l.amount)
        .sum();
    let payroll_taxes: Money = lines
        .iter()
        .filter(|l| l.base == CalculationBase::Payroll)
        .map(|l| l.amount)
        .sum();
    let total_taxes = revenue_taxes + payroll_taxes;

    TaxBreakdown {
        lines,
        revenue_taxes,
        payroll_taxes,
        total_taxes,
        effective_rate: safe_pct(total_taxes, revenue),
    }
}
