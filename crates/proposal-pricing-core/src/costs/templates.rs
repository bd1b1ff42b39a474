use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::model::{AdditionalCost, AllocationMethod, CostCategory, CostFrequency, CostType};
use crate::error::PricingError;
use crate::PricingResult;

/// One line of a cost template; becomes an [`AdditionalCost`] when applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTemplateItem {
    pub name: String,
    pub category: CostCategory,
    pub value: Decimal,
    pub cost_type: CostType,
    pub frequency: CostFrequency,
    pub allocation: AllocationMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub items: Vec<CostTemplateItem>,
}

fn item(
    name: &str,
    category: CostCategory,
    value: Decimal,
    cost_type: CostType,
    frequency: CostFrequency,
) -> CostTemplateItem {
    CostTemplateItem {
        name: name.into(),
        category,
        value,
        cost_type,
        frequency,
        allocation: AllocationMethod::Direct,
    }
}

/// Built-in starting points for the three proposal families.
pub fn cost_templates() -> Vec<CostTemplate> {
    use CostCategory::*;
    use CostFrequency::*;
    use CostType::*;

    vec![
        CostTemplate {
            id: "service-desk-basic".into(),
            name: "Service Desk: basic".into(),
            description: "Tooling and facilities for an 8x5 service desk".into(),
            items: vec![
                item("ITSM platform licences", Licenses, dec!(4500), Fixed, Monthly),
                item("Telephony / contact center", Infrastructure, dec!(2200), Fixed, Monthly),
                item("Workstations", Infrastructure, dec!(36000), Fixed, Annual),
                item("Electricity and internet", Utilities, dec!(1800), Variable, Monthly),
                item("ITIL Foundation training", Training, dec!(12000), Eventual, OneTime),
            ],
        },
        CostTemplate {
            id: "noc-24x7".into(),
            name: "NOC 24x7".into(),
            description: "Network operations center with round-the-clock monitoring".into(),
            items: vec![
                item("Monitoring platform", Licenses, dec!(8000), Fixed, Monthly),
                item("Video wall and NOC room", Infrastructure, dec!(60000), Fixed, OneTime),
                item("Redundant links", Infrastructure, dec!(5400), Fixed, Monthly),
                item("Night shift facilities", Utilities, dec!(2500), Variable, Monthly),
                item("Vendor certifications", Training, dec!(18000), Eventual, SemiAnnual),
                item("SLA insurance", Insurance, dec!(9600), Fixed, Annual),
            ],
        },
        CostTemplate {
            id: "equipment-leasing".into(),
            name: "Equipment leasing".into(),
            description: "Leased endpoints and network gear with field logistics".into(),
            items: vec![
                item("Equipment insurance", Insurance, dec!(14400), Fixed, Annual),
                item("Logistics and field visits", Other, dec!(3000), Variable, Monthly),
                item("Leasing contract review", Legal, dec!(6000), Eventual, OneTime),
                item("Asset management licences", Licenses, dec!(2700), Fixed, Quarterly),
            ],
        },
    ]
}

/// Instantiate a template as a list of costs with ids `"<template>-<n>"`.
pub fn apply_cost_template(template_id: &str) -> PricingResult<Vec<AdditionalCost>> {
    let template = cost_templates()
        .into_iter()
        .find(|t| t.id == template_id)
        .ok_or_else(|| {
            tracing::warn!(template_id, "cost template not found");
            PricingError::TemplateNotFound(template_id.to_string())
        })?;

    Ok(template
        .items
        .into_iter()
        .enumerate()
        .map(|(i, it)| AdditionalCost {
            id: format!("{}-{}", template.id, i + 1),
            name: it.name,
            category: it.category,
            value: it.value,
            cost_type: it.cost_type,
            frequency: it.frequency,
            start_date: None,
            end_date: None,
            allocation: it.allocation,
            notes: Some(format!("From template '{}'", template.name)),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::analysis::{analyze_costs, validate_for_duplicates};

    #[test]
    fn test_apply_service_desk_template() {
        let costs = apply_cost_template("service-desk-basic").unwrap();
        assert_eq!(costs.len(), 5);
        assert_eq!(costs[0].id, "service-desk-basic-1");
        // 4500 + 2200 + 3000 + 1800 + 1000
        assert_eq!(analyze_costs(&costs).total_monthly_cost, dec!(12500));
    }

    #[test]
    fn test_templates_have_no_duplicates() {
        for t in cost_templates() {
            let costs = apply_cost_template(&t.id).unwrap();
            assert!(validate_for_duplicates(&costs).is_empty(), "{}", t.id);
        }
    }

    #[test]
    fn test_unknown_template() {
        let err = apply_cost_template("missing").unwrap_err();
        assert_eq!(err.to_string(), "Template not found: missing");
    }
}
