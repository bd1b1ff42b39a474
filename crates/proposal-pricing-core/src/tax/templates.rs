use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::config::{CalculationBase, CustomTax, TaxConfiguration, TaxRegime};
use crate::error::PricingError;
use crate::PricingResult;

/// Version written by [`export_configuration`]; imports reject anything else.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// A named, ready-to-use regional tax configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub configuration: TaxConfiguration,
}

/// Document produced by [`export_configuration`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTaxConfiguration {
    pub format_version: u32,
    pub exported_at: DateTime<Utc>,
    pub configuration: TaxConfiguration,
}

fn template(
    id: &str,
    name: &str,
    description: &str,
    region: &str,
    regime: TaxRegime,
    rates: [Decimal; 6],
    custom_taxes: Vec<CustomTax>,
) -> TaxTemplate {
    let [icms, pis, cofins, iss, ir, csll] = rates;
    TaxTemplate {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        configuration: TaxConfiguration {
            region: region.into(),
            tax_regime: Some(regime),
            icms,
            pis,
            cofins,
            iss,
            ir,
            csll,
            custom_taxes,
        },
    }
}

/// Built-in templates. Rates are ICMS, PIS, COFINS, ISS, IR, CSLL.
pub fn tax_templates() -> Vec<TaxTemplate> {
    vec![
        template(
            "sp-lucro-presumido",
            "São Paulo: Lucro Presumido (services)",
            "IT services billed from São Paulo with presumed-profit IR/CSLL",
            "SP",
            TaxRegime::LucroPresumido,
            [dec!(0), dec!(0.65), dec!(3), dec!(5), dec!(4.8), dec!(2.88)],
            vec![],
        ),
        template(
            "sp-simples-nacional",
            "São Paulo: Simples Nacional",
            "Unified DAS rate for small providers, federal taxes collected inside it",
            "SP",
            TaxRegime::SimplesNacional,
            [dec!(0), dec!(0), dec!(0), dec!(0), dec!(0), dec!(0)],
            vec![CustomTax {
                name: "DAS".into(),
                rate: dec!(15.5),
                calculation_base: CalculationBase::Revenue,
                description: "Simples Nacional unified rate, Annex III bracket 4".into(),
            }],
        ),
        template(
            "rj-lucro-real",
            "Rio de Janeiro: Lucro Real",
            "Non-cumulative PIS/COFINS with IR/CSLL estimated on revenue",
            "RJ",
            TaxRegime::LucroReal,
            [dec!(0), dec!(1.65), dec!(7.6), dec!(5), dec!(2.4), dec!(1.44)],
            vec![CustomTax {
                name: "INSS patronal".into(),
                rate: dec!(20),
                calculation_base: CalculationBase::Payroll,
                description: "Employer social security on payroll".into(),
            }],
        ),
        template(
            "mg-equipment-leasing",
            "Minas Gerais: equipment supply and leasing",
            "ICMS on equipment with presumed-profit federal taxes",
            "MG",
            TaxRegime::LucroPresumido,
            [dec!(18), dec!(0.65), dec!(3), dec!(0), dec!(4.8), dec!(2.88)],
            vec![],
        ),
    ]
}

/// Look up a built-in template and return its configuration.
pub fn apply_tax_template(template_id: &str) -> PricingResult<TaxConfiguration> {
    tax_templates()
        .into_iter()
        .find(|t| t.id == template_id)
        .map(|t| t.configuration)
        .ok_or_else(|| {
            tracing::warn!(template_id, "tax template not found");
            PricingError::TemplateNotFound(template_id.to_string())
        })
}

/// Serialise a configuration into a versioned JSON document.
pub fn export_configuration(config: &TaxConfiguration) -> PricingResult<String> {
    let doc = ExportedTaxConfiguration {
        format_version: EXPORT_FORMAT_VERSION,
        exported_at: Utc::now(),
        configuration: config.clone(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parse a document written by [`export_configuration`].
///
/// A bare configuration object (no envelope) is accepted as well.
pub fn import_configuration(json: &str) -> PricingResult<TaxConfiguration> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("configuration").is_none() {
        return Ok(serde_json::from_value(value)?);
    }
    let doc: ExportedTaxConfiguration = serde_json::from_value(value)?;
    if doc.format_version != EXPORT_FORMAT_VERSION {
        return Err(PricingError::InvalidInput {
            field: "format_version".into(),
            reason: format!(
                "Unsupported export version {} (expected {})",
                doc.format_version, EXPORT_FORMAT_VERSION
            ),
        });
    }
    Ok(doc.configuration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::validation::validate_tax_configuration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_templates_are_valid() {
        for t in tax_templates() {
            let result = validate_tax_configuration(&t.configuration);
            assert!(result.is_valid, "template {} invalid: {:?}", t.id, result.errors);
        }
    }

    #[test]
    fn test_template_ids_unique() {
        let templates = tax_templates();
        let mut ids: Vec<&str> = templates.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), templates.len());
    }

    #[test]
    fn test_apply_known_template() {
        let cfg = apply_tax_template("rj-lucro-real").unwrap();
        assert_eq!(cfg.region, "RJ");
        assert_eq!(cfg.tax_regime, Some(TaxRegime::LucroReal));
    }

    #[test]
    fn test_apply_unknown_template() {
        let err = apply_tax_template("nope").unwrap_err();
        assert!(matches!(err, PricingError::TemplateNotFound(ref id) if id == "nope"));
    }

    #[test]
    fn test_export_import_round_trip() {
        let cfg = apply_tax_template("sp-simples-nacional").unwrap();
        let json = export_configuration(&cfg).unwrap();
        let back = import_configuration(&json).unwrap();
        assert_eq!(back, cfg);
        assert!(validate_tax_configuration(&back).is_valid);
    }

    #[test]
    fn test_import_bare_configuration() {
        let cfg = apply_tax_template("sp-lucro-presumido").unwrap();
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(import_configuration(&json).unwrap(), cfg);
    }

    #[test]
    fn test_import_rejects_unknown_version() {
        let cfg = apply_tax_template("sp-lucro-presumido").unwrap();
        let json = serde_json::json!({
            "format_version": 99,
            "exported_at": "2024-01-01T00:00:00Z",
            "configuration": cfg,
        })
        .to_string();
        assert!(matches!(
            import_configuration(&json),
            Err(PricingError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_import_malformed_json() {
        assert!(matches!(
            import_configuration("{not json"),
            Err(PricingError::SerializationError(_))
        ));
    }
}
