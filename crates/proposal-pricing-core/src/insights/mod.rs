pub mod dashboard;
pub mod risks;

pub use crate::forecast::summary::{calculate_scenario_summary, ScenarioSummary};
