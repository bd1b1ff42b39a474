use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Money;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostCategory {
    Infrastructure,
    Licenses,
    Utilities,
    Training,
    Legal,
    Insurance,
    Marketing,
    Other,
}

/// Cost behaviour classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostType {
    Fixed,
    Variable,
    Eventual,
}

/// How often the cost's `value` is incurred.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostFrequency {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    OneTime,
}

impl CostFrequency {
    /// Number of months one payment covers.
    ///
    /// One-time costs are spread over a nominal year regardless of the
    /// contract duration.
    pub fn months_covered(&self) -> rust_decimal::Decimal {
        match self {
            CostFrequency::Monthly => dec!(1),
            CostFrequency::Quarterly => dec!(3),
            CostFrequency::SemiAnnual => dec!(6),
            CostFrequency::Annual => dec!(12),
            CostFrequency::OneTime => dec!(12),
        }
    }
}

/// How a shared cost is attributed to the proposal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationMethod {
    #[default]
    Direct,
    Proportional,
    PerHead,
}

/// A non-personnel cost line of a proposal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdditionalCost {
    pub id: String,
    pub name: String,
    pub category: CostCategory,
    /// Amount per occurrence of `frequency`
    pub value: Money,
    #[serde(rename = "type")]
    pub cost_type: CostType,
    pub frequency: CostFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub allocation: AllocationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Monthly-equivalent of a cost. No rounding; callers round for display.
pub fn calculate_monthly_cost(cost: &AdditionalCost) -> Money {
    cost.value / cost.frequency.months_covered()
}
