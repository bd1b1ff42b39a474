pub mod budget;
pub mod costs;
pub mod forecast;
pub mod insights;
pub mod tax;
