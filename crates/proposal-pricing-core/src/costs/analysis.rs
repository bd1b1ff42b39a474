use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use super::model::{calculate_monthly_cost, AdditionalCost, CostCategory, CostFrequency, CostType};
use crate::types::{safe_pct, with_metadata, ComputationOutput, Money, Percent};
use crate::PricingResult;

/// Share of infrastructure in the monthly total above which a warning is raised.
const INFRASTRUCTURE_SHARE_LIMIT: Decimal = dec!(60);
/// Share of eventual costs above which a warning is raised.
const EVENTUAL_SHARE_LIMIT: Decimal = dec!(30);
/// Item count above which consolidation is suggested.
const CONSOLIDATION_ITEM_COUNT: usize = 20;
/// Number of monthly-billed licence lines that triggers the annual billing hint.
const MONTHLY_LICENSE_LINES: usize = 3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub category: CostCategory,
    pub monthly: Money,
    pub share_pct: Percent,
    pub items: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeTotal {
    pub cost_type: CostType,
    pub monthly: Money,
    pub share_pct: Percent,
    pub items: usize,
}

/// Result of folding a cost list into monthly/annual totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostAnalysis {
    pub total_monthly_cost: Money,
    /// Always `total_monthly_cost * 12`
    pub total_annual_cost: Money,
    pub by_category: Vec<CategoryTotal>,
    pub by_type: Vec<TypeTotal>,
    pub suggestions: Vec<String>,
    pub warnings: Vec<String>,
}

/// Costs sharing a case-insensitive name and a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateGroup {
    pub name: String,
    pub category: CostCategory,
    /// Positions in the input list, ascending
    pub indices: Vec<usize>,
}

/// Input for the combined analysis entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAnalysisInput {
    pub costs: Vec<AdditionalCost>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAnalysisOutput {
    pub analysis: CostAnalysis,
    pub duplicates: Vec<DuplicateGroup>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Fold a cost list into totals, breakdowns and heuristic hints.
///
/// Totals and breakdowns are sums, so they do not depend on input order.
/// Per-item warnings are listed in input order.
pub fn analyze_costs(costs: &[AdditionalCost]) -> CostAnalysis {
    let mut by_category: BTreeMap<CostCategory, (Money, usize)> = BTreeMap::new();
    let mut by_type: BTreeMap<CostType, (Money, usize)> = BTreeMap::new();
    let mut warnings: Vec<String> = Vec::new();
    let mut suggestions: Vec<String> = Vec::new();
    let mut total_monthly_cost = Decimal::ZERO;

    for cost in costs {
        let monthly = calculate_monthly_cost(cost);
        total_monthly_cost += monthly;

        let entry = by_category.entry(cost.category).or_insert((Decimal::ZERO, 0));
        entry.0 += monthly;
        entry.1 += 1;
        let entry = by_type.entry(cost.cost_type).or_insert((Decimal::ZERO, 0));
        entry.0 += monthly;
        entry.1 += 1;

        if cost.value <= Decimal::ZERO {
            warnings.push(format!("Cost '{}' has a non-positive value ({})", cost.name, cost.value));
        }
        if let (Some(start), Some(end)) = (cost.start_date, cost.end_date) {
            if end < start {
                warnings.push(format!(
                    "Cost '{}' ends ({end}) before it starts ({start})",
                    cost.name
                ));
            }
        }
    }

    let by_category: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, (monthly, items))| CategoryTotal {
            category,
            monthly,
            share_pct: safe_pct(monthly, total_monthly_cost),
            items,
        })
        .collect();
    let by_type: Vec<TypeTotal> = by_type
        .into_iter()
        .map(|(cost_type, (monthly, items))| TypeTotal {
            cost_type,
            monthly,
            share_pct: safe_pct(monthly, total_monthly_cost),
            items,
        })
        .collect();

    if let Some(infra) = by_category
        .iter()
        .find(|c| c.category == CostCategory::Infrastructure)
    {
        if infra.share_pct > INFRASTRUCTURE_SHARE_LIMIT {
            warnings.push(format!(
                "Infrastructure accounts for {}% of monthly costs",
                infra.share_pct.round_dp(1)
            ));
        }
    }
    if let Some(eventual) = by_type.iter().find(|t| t.cost_type == CostType::Eventual) {
        if eventual.share_pct > EVENTUAL_SHARE_LIMIT {
            warnings.push(format!(
                "Eventual costs account for {}% of monthly costs; forecast may be unstable",
                eventual.share_pct.round_dp(1)
            ));
        }
    }

    if costs.len() > CONSOLIDATION_ITEM_COUNT {
        suggestions.push(format!(
            "{} cost items; consider consolidating similar items",
            costs.len()
        ));
    }
    let monthly_licenses = costs
        .iter()
        .filter(|c| c.category == CostCategory::Licenses && c.frequency == CostFrequency::Monthly)
        .count();
    if monthly_licenses >= MONTHLY_LICENSE_LINES {
        suggestions.push(format!(
            "{monthly_licenses} licences are billed monthly; annual billing usually carries a discount"
        ));
    }

    CostAnalysis {
        total_monthly_cost,
        total_annual_cost: total_monthly_cost * dec!(12),
        by_category,
        by_type,
        suggestions,
        warnings,
    }
}

/// Group costs by `(lowercase name, category)` and report groups with more
/// than one member. Detection only; nothing is merged.
pub fn validate_for_duplicates(costs: &[AdditionalCost]) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut slot: BTreeMap<(String, CostCategory), usize> = BTreeMap::new();

    for (i, cost) in costs.iter().enumerate() {
        let key = (cost.name.trim().to_lowercase(), cost.category);
        match slot.get(&key) {
            Some(&g) => groups[g].indices.push(i),
            None => {
                slot.insert(key, groups.len());
                groups.push(DuplicateGroup {
                    name: cost.name.clone(),
                    category: cost.category,
                    indices: vec![i],
                });
            }
        }
    }

    groups.retain(|g| g.indices.len() > 1);
    groups
}

/// Analysis plus duplicate detection wrapped in the standard envelope.
pub fn run_cost_analysis(
    input: &CostAnalysisInput,
) -> PricingResult<ComputationOutput<CostAnalysisOutput>> {
    let start = Instant::now();
    tracing::debug!(items = input.costs.len(), "running cost analysis");

    let analysis = analyze_costs(&input.costs);
    let duplicates = validate_for_duplicates(&input.costs);

    let mut warnings = analysis.warnings.clone();
    for group in &duplicates {
        warnings.push(format!(
            "Possible duplicate '{}' ({:?}) at positions {:?}",
            group.name, group.category, group.indices
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly-equivalent cost aggregation",
        &serde_json::json!({
            "items": input.costs.len(),
            "one_time_spread_months": 12,
        }),
        warnings,
        elapsed,
        CostAnalysisOutput {
            analysis,
            duplicates,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::model::AllocationMethod;
    use pretty_assertions::assert_eq;

    fn cost(
        name: &str,
        category: CostCategory,
        value: Decimal,
        cost_type: CostType,
        frequency: CostFrequency,
    ) -> AdditionalCost {
        AdditionalCost {
            id: name.to_lowercase(),
            name: name.into(),
            category,
            value,
            cost_type,
            frequency,
            start_date: None,
            end_date: None,
            allocation: AllocationMethod::Direct,
            notes: None,
        }
    }

    #[test]
    fn test_single_annual_cost() {
        let costs = vec![cost(
            "Datacenter",
            CostCategory::Infrastructure,
            dec!(1200),
            CostType::Fixed,
            CostFrequency::Annual,
        )];
        let analysis = analyze_costs(&costs);
        assert_eq!(analysis.total_monthly_cost, dec!(100));
        assert_eq!(analysis.total_annual_cost, dec!(1200));
    }

    #[test]
    fn test_annual_is_twelve_times_monthly() {
        let costs = vec![
            cost("A", CostCategory::Licenses, dec!(100), CostType::Fixed, CostFrequency::Quarterly),
            cost("B", CostCategory::Training, dec!(7), CostType::Eventual, CostFrequency::OneTime),
            cost("C", CostCategory::Legal, dec!(55.5), CostType::Variable, CostFrequency::SemiAnnual),
        ];
        let analysis = analyze_costs(&costs);
        assert_eq!(analysis.total_annual_cost, analysis.total_monthly_cost * dec!(12));
    }

    #[test]
    fn test_order_independent() {
        let a = cost("A", CostCategory::Licenses, dec!(300), CostType::Fixed, CostFrequency::Monthly);
        let b = cost("B", CostCategory::Utilities, dec!(600), CostType::Variable, CostFrequency::Quarterly);
        let forward = analyze_costs(&[a.clone(), b.clone()]);
        let backward = analyze_costs(&[b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_item_warnings_follow_input_order() {
        let a = cost("A", CostCategory::Legal, dec!(0), CostType::Fixed, CostFrequency::Monthly);
        let b = cost("B", CostCategory::Legal, dec!(-5), CostType::Fixed, CostFrequency::Monthly);
        let forward = analyze_costs(&[a.clone(), b.clone()]);
        let backward = analyze_costs(&[b, a]);
        assert_eq!(forward.total_monthly_cost, backward.total_monthly_cost);
        assert_eq!(forward.by_category, backward.by_category);
        assert!(forward.warnings[0].contains("'A'"));
        assert!(backward.warnings[0].contains("'B'"));
    }

    #[test]
    fn test_eventual_share_warning_threshold() {
        let split = |eventual: Decimal| {
            analyze_costs(&[
                cost("Spare parts", CostCategory::Utilities, eventual, CostType::Eventual, CostFrequency::Monthly),
                cost("Support", CostCategory::Other, dec!(100) - eventual, CostType::Fixed, CostFrequency::Monthly),
            ])
        };
        let over = split(dec!(31));
        assert!(over.warnings.iter().any(|w| w.contains("Eventual costs account for 31")));
        for eventual in [dec!(30), dec!(29.9)] {
            let under = split(eventual);
            assert!(
                !under.warnings.iter().any(|w| w.contains("Eventual")),
                "{eventual}% should not warn"
            );
        }
    }

    #[test]
    fn test_monthly_licences_suggest_annual_billing() {
        let licence = |name: &str, frequency: CostFrequency| {
            cost(name, CostCategory::Licenses, dec!(50), CostType::Fixed, frequency)
        };
        let three = analyze_costs(&[
            licence("ITSM", CostFrequency::Monthly),
            licence("Monitoring", CostFrequency::Monthly),
            licence("Backup", CostFrequency::Monthly),
        ]);
        assert!(three.suggestions.iter().any(|s| s.starts_with("3 licences are billed monthly")));

        let two = analyze_costs(&[
            licence("ITSM", CostFrequency::Monthly),
            licence("Monitoring", CostFrequency::Monthly),
            licence("Backup", CostFrequency::Annual),
        ]);
        assert!(!two.suggestions.iter().any(|s| s.contains("annual billing")));

        // monthly lines outside the licence category do not count
        let mixed = analyze_costs(&[
            licence("ITSM", CostFrequency::Monthly),
            licence("Monitoring", CostFrequency::Monthly),
            cost("Hosting", CostCategory::Infrastructure, dec!(50), CostType::Fixed, CostFrequency::Monthly),
        ]);
        assert!(mixed.suggestions.is_empty());
    }

    #[test]
    fn test_breakdowns() {
        let costs = vec![
            cost("Servers", CostCategory::Infrastructure, dec!(300), CostType::Fixed, CostFrequency::Monthly),
            cost("ITSM", CostCategory::Licenses, dec!(100), CostType::Fixed, CostFrequency::Monthly),
        ];
        let analysis = analyze_costs(&costs);
        assert_eq!(analysis.by_category.len(), 2);
        let infra = &analysis.by_category[0];
        assert_eq!(infra.category, CostCategory::Infrastructure);
        assert_eq!(infra.share_pct, dec!(75));
        assert_eq!(analysis.by_type.len(), 1);
        assert_eq!(analysis.by_type[0].items, 2);
        // 75% infrastructure
        assert!(analysis.warnings.iter().any(|w| w.contains("Infrastructure")));
    }

    #[test]
    fn test_empty_list() {
        let analysis = analyze_costs(&[]);
        assert_eq!(analysis.total_monthly_cost, Decimal::ZERO);
        assert!(analysis.by_category.is_empty());
        assert!(analysis.warnings.is_empty());
    }

    #[test]
    fn test_consolidation_suggestion() {
        let costs: Vec<AdditionalCost> = (0..21)
            .map(|i| {
                cost(
                    &format!("Item {i}"),
                    CostCategory::Other,
                    dec!(10),
                    CostType::Fixed,
                    CostFrequency::Monthly,
                )
            })
            .collect();
        let analysis = analyze_costs(&costs);
        assert!(analysis.suggestions.iter().any(|s| s.contains("consolidating")));
    }

    #[test]
    fn test_date_and_value_warnings() {
        let mut bad = cost("Bad", CostCategory::Legal, dec!(0), CostType::Fixed, CostFrequency::Monthly);
        bad.start_date = chrono::NaiveDate::from_ymd_opt(2024, 6, 1);
        bad.end_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1);
        let analysis = analyze_costs(&[bad]);
        assert_eq!(analysis.warnings.len(), 2);
    }

    #[test]
    fn test_duplicates_case_insensitive() {
        let costs = vec![
            cost("Link MPLS", CostCategory::Infrastructure, dec!(1), CostType::Fixed, CostFrequency::Monthly),
            cost("ITSM", CostCategory::Licenses, dec!(1), CostType::Fixed, CostFrequency::Monthly),
            cost("link mpls", CostCategory::Infrastructure, dec!(2), CostType::Fixed, CostFrequency::Monthly),
            cost("Link MPLS", CostCategory::Utilities, dec!(3), CostType::Fixed, CostFrequency::Monthly),
        ];
        let dups = validate_for_duplicates(&costs);
        assert_eq!(
            dups,
            vec![DuplicateGroup {
                name: "Link MPLS".into(),
                category: CostCategory::Infrastructure,
                indices: vec![0, 2],
            }]
        );
    }

    #[test]
    fn test_run_cost_analysis_reports_duplicates_as_warnings() {
        let input = CostAnalysisInput {
            costs: vec![
                cost("VPN", CostCategory::Licenses, dec!(10), CostType::Fixed, CostFrequency::Monthly),
                cost("vpn", CostCategory::Licenses, dec!(10), CostType::Fixed, CostFrequency::Monthly),
            ],
        };
        let out = run_cost_analysis(&input).unwrap();
        assert_eq!(out.result.duplicates.len(), 1);
        assert!(out.warnings.iter().any(|w| w.contains("duplicate")));
        assert_eq!(out.result.analysis.total_monthly_cost, dec!(20));
    }
}
