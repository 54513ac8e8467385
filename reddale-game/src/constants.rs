//! Centralized balance constants for the Reddale simulation.
//!
//! Gameplay can only be retuned by changing these values in code, never through
//! the bundled JSON assets.

// Budget economy -----------------------------------------------------------
/// Points granted at the start of every round.
pub const INITIAL_BUDGET: u32 = 100;
/// Number of rounds (years in office) in a full game.
pub const MAX_ROUNDS: u32 = 4;
/// Remaining budget below this share of [`INITIAL_BUDGET`] counts as low.
pub const LOW_BUDGET_PCT: u32 = 20;

// Metric bounds ------------------------------------------------------------
pub const METRIC_MIN: i32 = 0;
pub const METRIC_MAX: i32 = 100;
/// Value every metric starts from before any policy is enacted.
pub const METRIC_BASELINE: i32 = 50;

// Outcome thresholds -------------------------------------------------------
pub const GOOD_THRESHOLD: i32 = 65;
pub const GREAT_THRESHOLD: i32 = 80;
/// Strictly below this value a metric is considered bad.
pub const BAD_THRESHOLD: i32 = 50;
/// Half-open band `[min, max)` of the four-metric average for "Incremental Progress".
pub const INCREMENTAL_AVERAGE_MIN: i32 = 55;
pub const INCREMENTAL_AVERAGE_MAX: i32 = 65;
