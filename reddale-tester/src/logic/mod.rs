pub mod reports;
pub mod simulation;
pub mod strategy;

pub use simulation::{PlaythroughResult, run_strategies};
pub use strategy::StrategyKind;
