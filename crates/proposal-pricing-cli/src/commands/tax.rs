use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use proposal_pricing_core::tax::config::{calculate_taxes, TaxConfiguration};
use proposal_pricing_core::tax::templates::{
    apply_tax_template, export_configuration, import_configuration, tax_templates,
};
use proposal_pricing_core::tax::validation::{
    get_tax_optimization_suggestions, validate_tax_configuration,
};

use crate::input;

/// Arguments for commands that take a tax configuration
#[derive(Args)]
pub struct TaxConfigArgs {
    /// Path to JSON tax configuration
    #[arg(long)]
    pub input: Option<String>,

    /// Use a built-in template instead of an input file
    #[arg(long, conflicts_with = "input")]
    pub template: Option<String>,
}

fn load_config(args: &TaxConfigArgs) -> Result<TaxConfiguration, Box<dyn std::error::Error>> {
    match &args.template {
        Some(id) => Ok(apply_tax_template(id)?),
        None => input::read_input(args.input.as_deref(), "tax configuration"),
    }
}

pub fn run_validate_tax(args: TaxConfigArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    let result = validate_tax_configuration(&config);
    Ok(serde_json::to_value(result)?)
}

pub fn run_tax_suggestions(args: TaxConfigArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    let suggestions = get_tax_optimization_suggestions(&config);
    Ok(serde_json::json!({ "suggestions": suggestions }))
}

pub fn run_tax_templates() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(tax_templates())?)
}

/// Arguments for looking up a tax template
#[derive(Args)]
pub struct TaxTemplateArgs {
    /// Template id, e.g. "sp-lucro-presumido"
    pub id: String,
}

pub fn run_tax_template(args: TaxTemplateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = apply_tax_template(&args.id)?;
    Ok(serde_json::to_value(config)?)
}

pub fn run_tax_export(args: TaxConfigArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    let document = export_configuration(&config)?;
    Ok(serde_json::from_str(&document)?)
}

/// Arguments for importing an exported tax configuration
#[derive(Args)]
pub struct TaxImportArgs {
    /// Path to an exported configuration document
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_tax_import(args: TaxImportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let document: Value = input::read_input(args.input.as_deref(), "tax import")?;
    let config = import_configuration(&document.to_string())?;
    Ok(serde_json::to_value(config)?)
}

/// Arguments for computing tax amounts
#[derive(Args)]
pub struct TaxAmountsArgs {
    /// Path to JSON tax configuration
    #[arg(long)]
    pub input: Option<String>,

    /// Use a built-in template instead of an input file
    #[arg(long, conflicts_with = "input")]
    pub template: Option<String>,

    /// Monthly revenue the revenue taxes apply to
    #[arg(long)]
    pub revenue: Decimal,

    /// Monthly payroll the payroll taxes apply to
    #[arg(long, default_value = "0")]
    pub payroll: Decimal,
}

pub fn run_taxes(args: TaxAmountsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(&TaxConfigArgs {
        input: args.input,
        template: args.template,
    })?;
    if args.revenue < Decimal::ZERO || args.payroll < Decimal::ZERO {
        return Err("--revenue and --payroll cannot be negative".into());
    }
    let breakdown = calculate_taxes(&config, args.revenue, args.payroll);
    Ok(serde_json::to_value(breakdown)?)
}
