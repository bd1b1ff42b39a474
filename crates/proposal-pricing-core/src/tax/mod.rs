pub mod config;
pub mod templates;
pub mod validation;
