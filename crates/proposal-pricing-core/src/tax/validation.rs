use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::config::{total_revenue_tax_rate, TaxConfiguration, TaxRegime};
use crate::types::Percent;

/// Aggregate revenue tax above which the burden is flagged as very high.
const AGGREGATE_VERY_HIGH: Decimal = dec!(50);
/// Aggregate revenue tax above which the burden is flagged as high.
const AGGREGATE_HIGH: Decimal = dec!(35);

/// Accepted range and advisory threshold for one standard rate.
struct RateRule {
    name: &'static str,
    min: Percent,
    max: Percent,
    warn_above: Percent,
}

const RATE_RULES: [RateRule; 6] = [
    RateRule { name: "ICMS", min: dec!(0), max: dec!(25), warn_above: dec!(20) },
    RateRule { name: "PIS", min: dec!(0), max: dec!(5), warn_above: dec!(3) },
    RateRule { name: "COFINS", min: dec!(0), max: dec!(15), warn_above: dec!(10) },
    RateRule { name: "ISS", min: dec!(0), max: dec!(10), warn_above: dec!(5) },
    RateRule { name: "IR", min: dec!(0), max: dec!(30), warn_above: dec!(25) },
    RateRule { name: "CSLL", min: dec!(0), max: dec!(15), warn_above: dec!(12) },
];

/// Outcome of [`validate_tax_configuration`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check a tax configuration against rate ranges and regime rules.
///
/// Never fails: every problem is reported through `errors` (which make the
/// configuration invalid) or `warnings` (advisory only).
pub fn validate_tax_configuration(config: &TaxConfiguration) -> TaxValidationResult {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if config.region.trim().is_empty() {
        errors.push("Region is required".into());
    }
    if config.tax_regime.is_none() {
        errors.push("Tax regime is required".into());
    }

    let rates = config.standard_rates();
    for (rule, (_, value)) in RATE_RULES.iter().zip(rates.iter()) {
        if *value < rule.min || *value > rule.max {
            errors.push(format!(
                "{} rate {}% is outside the allowed range {}%-{}%",
                rule.name, value, rule.min, rule.max
            ));
        } else if *value > rule.warn_above {
            warnings.push(format!(
                "{} rate {}% is above the usual ceiling of {}%",
                rule.name, value, rule.warn_above
            ));
        }
    }

    for (i, tax) in config.custom_taxes.iter().enumerate() {
        if tax.name.trim().is_empty() {
            errors.push(format!("Custom tax #{} has no name", i + 1));
        }
        if tax.rate < Decimal::ZERO || tax.rate > dec!(100) {
            errors.push(format!(
                "Custom tax '{}' rate {}% must be between 0% and 100%",
                tax.name, tax.rate
            ));
        }
    }

    if let Some(regime @ TaxRegime::SimplesNacional) = config.tax_regime {
        for (name, value) in [
            ("PIS", config.pis),
            ("COFINS", config.cofins),
            ("IR", config.ir),
            ("CSLL", config.csll),
        ] {
            if !value.is_zero() {
                warnings.push(format!(
                    "{name} is normally collected inside the {} unified rate; \
                     a separate {value}% rate may double count it",
                    regime.label()
                ));
            }
        }
    }

    let aggregate = total_revenue_tax_rate(config);
    if aggregate > AGGREGATE_VERY_HIGH {
        warnings.push(format!(
            "Total tax burden of {aggregate}% is very high"
        ));
    } else if aggregate > AGGREGATE_HIGH {
        warnings.push(format!("Total tax burden of {aggregate}% is high"));
    }

    TaxValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Free-text suggestions for lowering the tax burden. Advisory only.
pub fn get_tax_optimization_suggestions(config: &TaxConfiguration) -> Vec<String> {
    let mut suggestions: Vec<String> = Vec::new();
    let aggregate = total_revenue_tax_rate(config);
    let federal = config.federal_rate();

    match config.tax_regime {
        Some(regime @ TaxRegime::LucroPresumido) if federal > dec!(10) => {
            suggestions.push(format!(
                "Federal taxes total {federal}% under {}; review whether \
                 {} would lower the burden given actual profit margins",
                regime.label(),
                TaxRegime::LucroReal.label()
            ));
        }
        Some(regime @ TaxRegime::LucroReal) if aggregate < dec!(15) => {
            suggestions.push(format!(
                "Aggregate burden is low under {}; compare against {} \
                 before renewing the regime choice",
                regime.label(),
                TaxRegime::LucroPresumido.label()
            ));
        }
        Some(regime @ TaxRegime::SimplesNacional) if aggregate > dec!(15) => {
            suggestions.push(format!(
                "Aggregate burden of {aggregate}% is high for {}; check the \
                 revenue bracket and annex used for the unified rate",
                regime.label()
            ));
        }
        _ => {}
    }

    if config.iss > dec!(5) {
        suggestions.push(
            "ISS above 5% exceeds the national ceiling; confirm the municipality and \
             service code"
                .into(),
        );
    }
    if config.icms > dec!(18) {
        suggestions.push(
            "ICMS above 18%: check for ICMS incentives or interstate rate differences \
             on equipment supply"
                .into(),
        );
    }
    if config.custom_taxes.len() > 3 {
        suggestions.push(format!(
            "{} custom taxes configured; consolidate or remove any that no longer apply",
            config.custom_taxes.len()
        ));
    }
    if aggregate > AGGREGATE_HIGH {
        suggestions.push(
            "Consider splitting equipment supply from services to separate ICMS and ISS bases"
                .into(),
        );
    }

    suggestions
}
