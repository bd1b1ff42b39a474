use proposal_pricing_core::budget::consolidation::{consolidate_budget, BudgetInput, MarginPolicy, MarginType, TeamCostLine};
use proposal_pricing_core::costs::templates::apply_cost_template;
use proposal_pricing_core::tax::templates::apply_tax_template;
use proposal_pricing_core::PricingError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn team() -> Vec<TeamCostLine> {
    vec![
        TeamCostLine {
            role: "Analyst N1".into(),
            monthly_cost: dec!(36000),
        },
        TeamCostLine {
            role: "Analyst N2".into(),
            monthly_cost: dec!(24000),
        },
        TeamCostLine {
            role: "Coordinator".into(),
            monthly_cost: dec!(12000),
        },
    ]
}

#[test]
fn test_price_never_below_cost() {
    for template in ["sp-lucro-presumido", "sp-simples-nacional", "rj-lucro-real", "mg-equipment-leasing"] {
        let input = BudgetInput {
            team_costs: team(),
            additional_costs: apply_cost_template("service-desk-basic").unwrap(),
            taxes: apply_tax_template(template).unwrap(),
            revenue_base: None,
            margin: MarginPolicy::default(),
            contract_duration_months: Some(24),
        };
        let out = consolidate_budget(&input).unwrap();
        let r = &out.result;
        assert!(r.total_price >= r.total_costs, "{template}");
        // gross-up keeps the 20% margin on price exact
        assert!((r.margin_on_price_pct - dec!(20)).abs() < dec!(0.0001), "{template}");
        assert!((r.revenue_base - r.total_price).abs() < dec!(0.0001), "{template}");
    }
}

#[test]
fn test_fixed_margin_gross_up() {
    let mut taxes = apply_tax_template("sp-lucro-presumido").unwrap();
    taxes.custom_taxes.clear();
    let input = BudgetInput {
        team_costs: team(),
        additional_costs: vec![],
        taxes,
        revenue_base: None,
        margin: MarginPolicy {
            margin_type: MarginType::Fixed,
            value: dec!(10000),
            ..MarginPolicy::default()
        },
        contract_duration_months: None,
    };
    let out = consolidate_budget(&input).unwrap();
    let r = &out.result;
    assert!((r.total_price - r.total_costs - dec!(10000)).abs() < dec!(0.0001));
    assert!(r.contract_value.is_none());
    assert!(r.taxes.total_taxes > Decimal::ZERO);
}

#[test]
fn test_margin_plus_taxes_over_100_is_impossible() {
    let input = BudgetInput {
        team_costs: team(),
        additional_costs: vec![],
        taxes: apply_tax_template("sp-lucro-presumido").unwrap(),
        revenue_base: None,
        margin: MarginPolicy {
            value: dec!(90),
            ..MarginPolicy::default()
        },
        contract_duration_months: None,
    };
    assert!(matches!(
        consolidate_budget(&input),
        Err(PricingError::FinancialImpossibility(_))
    ));
}

#[test]
fn test_explicit_revenue_base_is_used_for_taxes() {
    let input = BudgetInput {
        team_costs: team(),
        additional_costs: vec![],
        taxes: apply_tax_template("sp-lucro-presumido").unwrap(),
        revenue_base: Some(dec!(100000)),
        margin: MarginPolicy::default(),
        contract_duration_months: Some(12),
    };
    let out = consolidate_budget(&input).unwrap();
    let r = &out.result;
    // 0.65 + 3 + 5 + 4.8 + 2.88 = 16.33% of 100000
    assert_eq!(r.taxes.total_taxes, dec!(16330));
    assert_eq!(r.total_costs, dec!(88330));
    assert_eq!(r.contract_value, Some(r.total_price * dec!(12)));
}
