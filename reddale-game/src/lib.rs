//! Reddale Game Engine
//!
//! Platform-agnostic core logic for the Mayor of Reddale policy simulation.
//! This crate provides the policy catalog, round engine and outcome classifier
//! without UI or platform-specific dependencies.

pub mod availability;
pub mod catalog;
pub mod constants;
pub mod engine;
pub mod metrics;
pub mod outcome;
pub mod result;
pub mod stakeholders;
pub mod state;

// Re-export commonly used types
pub use availability::{available_policies, is_available};
pub use catalog::{CatalogError, Policy, PolicyCatalog};
pub use constants::{INITIAL_BUDGET, MAX_ROUNDS};
pub use engine::{
    BundledCatalog, CatalogSource, EngineError, RoundEngine, RoundReport, ToggleOutcome,
    projected_metrics, round_start_metrics,
};
pub use metrics::{Metric, Metrics, clamp_metric};
pub use outcome::{OUTCOME_RULES, Outcome, OutcomeKind, OutcomeRule, classify, matching_rules};
pub use result::{DecisionLine, ResultSummary, result_summary};
pub use stakeholders::{Stakeholder, StakeholderList};
pub use state::{GameEvent, GamePhase, GameState};
