use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages in percentage points (18 = 18%). Business inputs arrive in this
/// form, so the engine keeps it end to end and converts only inside formulas.
pub type Percent = Decimal;

/// Convert percentage points into a decimal fraction (18 -> 0.18).
pub fn pct_to_fraction(pct: Percent) -> Decimal {
    pct / dec!(100)
}

/// `numerator / denominator * 100`, or zero when the denominator is zero.
/// Saturates at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
pub fn safe_pct(numerator: Decimal, denominator: Decimal) -> Percent {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .unwrap_or(
            if numerator.is_sign_negative() == denominator.is_sign_negative() {
                Decimal::MAX
            } else {
                Decimal::MIN
            },
        )
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_to_fraction() {
        assert_eq!(pct_to_fraction(dec!(18)), dec!(0.18));
    }

    #[test]
    fn test_safe_pct_zero_denominator() {
        assert_eq!(safe_pct(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_pct(dec!(25), dec!(200)), dec!(12.5));
    }

    #[test]
    fn test_safe_pct_saturates() {
        let tiny = dec!(0.0000000000000000000000000001);
        assert_eq!(safe_pct(Decimal::MAX, tiny), Decimal::MAX);
        assert_eq!(safe_pct(-Decimal::MAX, tiny), Decimal::MIN);
    }

    #[test]
    fn test_with_metadata_envelope() {
        let out = with_metadata(
            "Test",
            &serde_json::json!({"a": 1}),
            vec!["w".into()],
            12,
            dec!(1),
        );
        assert_eq!(out.methodology, "Test");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
