//! Round engine: the select/submit/restart state machine.
//!
//! The engine owns the [`GameState`] and shares the catalog read-only. Every
//! operation either applies completely or returns before touching state.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::availability::available_policies;
use crate::catalog::{CatalogError, PolicyCatalog};
use crate::constants::{INITIAL_BUDGET, MAX_ROUNDS};
use crate::metrics::Metrics;
use crate::outcome::{Outcome, classify};
use crate::result::{ResultSummary, result_summary};
use crate::state::{GameEvent, GamePhase, GameState};

/// User-facing rejections. None of these are faults; the caller retries with valid input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("not enough budget for `{policy}`: costs {cost}, {budget} remaining")]
    InsufficientBudget {
        policy: String,
        cost: u32,
        budget: u32,
    },
    #[error("select at least one policy before advancing")]
    EmptySelection,
    #[error("`{operation}` is not allowed while the game is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: &'static str,
    },
}

/// What a successful `toggle_select` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// Id is not on offer this round; state unchanged.
    Unavailable,
    /// Id was committed in an earlier round; state unchanged.
    AlreadyEnacted,
}

impl ToggleOutcome {
    #[must_use]
    pub const fn changed_state(self) -> bool {
        matches!(self, Self::Selected | Self::Deselected)
    }
}

/// Summary of a submitted round for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u32,
    pub enacted: Vec<GameEvent>,
    pub metrics: Metrics,
    pub game_over: bool,
}

/// Committed metrics: baseline plus every enacted effect, clamped once.
#[must_use]
pub fn round_start_metrics<S: AsRef<str>>(catalog: &PolicyCatalog, history: &[S]) -> Metrics {
    Metrics::baseline().apply_clamped(catalog.sum_effects(history))
}

/// Displayed metrics during a round.
///
/// History is clamped first, then the tentative selections are added and the
/// result is clamped again. A metric saturated by history does not bank the
/// overflow, so the two clamps are lossy and order-dependent.
#[must_use]
pub fn projected_metrics<S: AsRef<str>, T: AsRef<str>>(
    catalog: &PolicyCatalog,
    history: &[S],
    selected: &[T],
) -> Metrics {
    round_start_metrics(catalog, history).apply_clamped(catalog.sum_effects(selected))
}

/// Where a catalog comes from. Platform layers provide their own sources.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the policy catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or fails validation.
    fn load_catalog(&self) -> Result<PolicyCatalog, Self::Error>;
}

/// The catalog compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCatalog;

impl CatalogSource for BundledCatalog {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<PolicyCatalog, Self::Error> {
        PolicyCatalog::load_default()
    }
}

#[derive(Debug, Clone)]
pub struct RoundEngine {
    catalog: Arc<PolicyCatalog>,
    state: GameState,
}

impl RoundEngine {
    #[must_use]
    pub fn new(catalog: Arc<PolicyCatalog>) -> Self {
        let state = GameState::new(&catalog);
        Self { catalog, state }
    }

    /// Build an engine over a catalog loaded from `source`.
    ///
    /// # Errors
    ///
    /// Propagates the source's load error.
    pub fn from_source<S: CatalogSource>(source: &S) -> Result<Self, S::Error> {
        Ok(Self::new(Arc::new(source.load_catalog()?)))
    }

    /// Build an engine over the bundled Reddale catalog.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled asset is corrupt.
    pub fn with_default_catalog() -> Result<Self, CatalogError> {
        Self::from_source(&BundledCatalog)
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn catalog(&self) -> &PolicyCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn shared_catalog(&self) -> Arc<PolicyCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Select a policy on offer, or deselect it if it is already tentative.
    ///
    /// # Errors
    ///
    /// [`EngineError::InsufficientBudget`] when the remaining budget cannot
    /// cover a new selection, [`EngineError::InvalidTransition`] once the game
    /// is over. Unknown or stale ids are reported as
    /// [`ToggleOutcome::Unavailable`], not as errors.
    pub fn toggle_select(&mut self, policy_id: &str) -> Result<ToggleOutcome, EngineError> {
        self.ensure_playing("toggle_select")?;

        let Some(policy) = self.state.available(policy_id) else {
            log::debug!("ignoring toggle of unavailable policy `{policy_id}`");
            return Ok(ToggleOutcome::Unavailable);
        };
        let cost = policy.cost;
        if self.state.is_enacted(policy_id) {
            log::debug!("ignoring toggle of enacted policy `{policy_id}`");
            return Ok(ToggleOutcome::AlreadyEnacted);
        }

        if let Some(pos) = self
            .state
            .selected_policies
            .iter()
            .position(|id| id == policy_id)
        {
            self.state.selected_policies.remove(pos);
            self.state.budget = self.state.budget.saturating_add(cost);
            self.refresh_projected_metrics();
            log::debug!(
                "round {}: deselected `{policy_id}`, refunded {cost}, budget {}",
                self.state.round,
                self.state.budget
            );
            return Ok(ToggleOutcome::Deselected);
        }

        if self.state.budget < cost {
            log::debug!(
                "round {}: `{policy_id}` costs {cost}, only {} left",
                self.state.round,
                self.state.budget
            );
            return Err(EngineError::InsufficientBudget {
                policy: policy_id.to_string(),
                cost,
                budget: self.state.budget,
            });
        }

        self.state.selected_policies.push(policy_id.to_string());
        self.state.budget -= cost;
        self.refresh_projected_metrics();
        log::debug!(
            "round {}: selected `{policy_id}` for {cost}, budget {}",
            self.state.round,
            self.state.budget
        );
        Ok(ToggleOutcome::Selected)
    }

    /// Commit this round's selections and advance to the next round.
    ///
    /// # Errors
    ///
    /// [`EngineError::EmptySelection`] when nothing is selected,
    /// [`EngineError::InvalidTransition`] once the game is over.
    pub fn submit_round(&mut self) -> Result<RoundReport, EngineError> {
        self.ensure_playing("submit_round")?;
        if self.state.selected_policies.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        let round = self.state.round;
        let selected = std::mem::take(&mut self.state.selected_policies);
        let enacted: Vec<GameEvent> = selected
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .map(|policy| GameEvent::enacted(round, policy))
            .collect();

        self.state.events.extend(enacted.iter().cloned());
        self.state.historical_selections.extend(selected);
        self.state.available_policies =
            available_policies(&self.catalog, &self.state.historical_selections)
                .into_iter()
                .cloned()
                .collect();
        self.state.metrics = round_start_metrics(&self.catalog, &self.state.historical_selections);
        self.state.budget = INITIAL_BUDGET;

        let game_over = round >= MAX_ROUNDS;
        if game_over {
            self.state.phase = GamePhase::GameOver;
            log::info!(
                "game over after round {round}: jobs {} equity {} climate {} support {}",
                self.state.metrics.jobs,
                self.state.metrics.equity,
                self.state.metrics.climate,
                self.state.metrics.support
            );
        } else {
            self.state.round += 1;
            log::debug!(
                "round {round} committed {} policies; {} on offer next",
                enacted.len(),
                self.state.available_policies.len()
            );
        }

        Ok(RoundReport {
            round,
            enacted,
            metrics: self.state.metrics,
            game_over,
        })
    }

    /// Discard the current game and start over at round one.
    pub fn restart(&mut self) {
        log::debug!("restarting game from round {}", self.state.round);
        self.state = GameState::new(&self.catalog);
    }

    /// Final classification, available once the game is over.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.state
            .is_game_over()
            .then(|| classify(&self.state.metrics))
    }

    /// End-of-game summary.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidTransition`] while the game is still being played.
    pub fn summary(&self) -> Result<ResultSummary, EngineError> {
        result_summary(&self.state, &self.catalog)
    }

    fn ensure_playing(&self, operation: &'static str) -> Result<(), EngineError> {
        if self.state.is_game_over() {
            log::warn!("rejected `{operation}` after game over");
            return Err(EngineError::InvalidTransition {
                operation,
                phase: self.state.phase.as_str(),
            });
        }
        Ok(())
    }

    fn refresh_projected_metrics(&mut self) {
        self.state.metrics = projected_metrics(
            &self.catalog,
            &self.state.historical_selections,
            &self.state.selected_policies,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Policy;

    fn engine() -> RoundEngine {
        RoundEngine::with_default_catalog().unwrap()
    }

    fn policy(id: &str, cost: u32, effects: Metrics) -> Policy {
        Policy {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            cost,
            effects,
            narrative: format!("{id} narrative"),
            unlocked_by: None,
            is_upgrade: false,
        }
    }

    #[test]
    fn selecting_debits_and_projects_metrics() {
        let mut engine = engine();
        assert_eq!(
            engine.toggle_select("tech-jobs").unwrap(),
            ToggleOutcome::Selected
        );
        let state = engine.state();
        assert_eq!(state.budget, 65);
        assert_eq!(state.selected_policies, vec!["tech-jobs".to_string()]);
        assert_eq!(state.metrics, Metrics::new(65, 42, 47, 40));
    }

    #[test]
    fn deselecting_refunds_and_restores_metrics() {
        let mut engine = engine();
        let before = engine.state().clone();
        engine.toggle_select("tech-jobs").unwrap();
        assert_eq!(
            engine.toggle_select("tech-jobs").unwrap(),
            ToggleOutcome::Deselected
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn unknown_ids_are_silent_noops() {
        let mut engine = engine();
        let before = engine.state().clone();
        assert_eq!(
            engine.toggle_select("moon-base").unwrap(),
            ToggleOutcome::Unavailable
        );
        assert_eq!(
            engine.toggle_select("solar-microgrid").unwrap(),
            ToggleOutcome::Unavailable
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn insufficient_budget_leaves_state_untouched() {
        let mut engine = engine();
        engine.toggle_select("affordable-housing").unwrap();
        engine.toggle_select("tech-jobs").unwrap();
        let before = engine.state().clone();
        let err = engine.toggle_select("workforce-training").unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientBudget {
                policy: "workforce-training".to_string(),
                cost: 30,
                budget: 25,
            }
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn empty_submit_is_rejected() {
        let mut engine = engine();
        let before = engine.state().clone();
        assert_eq!(engine.submit_round(), Err(EngineError::EmptySelection));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn submit_commits_events_and_resets_round_budget() {
        let mut engine = engine();
        engine.toggle_select("brownfield-cleanup").unwrap();
        engine.toggle_select("participatory-budget").unwrap();
        let report = engine.submit_round().unwrap();

        assert_eq!(report.round, 1);
        assert!(!report.game_over);
        assert_eq!(report.enacted.len(), 2);
        assert_eq!(report.enacted[0].policy, "brownfield-cleanup");
        assert_eq!(report.enacted[1].policy, "participatory-budget");

        let state = engine.state();
        assert_eq!(state.round, 2);
        assert_eq!(state.budget, INITIAL_BUDGET);
        assert!(state.selected_policies.is_empty());
        assert_eq!(
            state.historical_selections,
            vec![
                "brownfield-cleanup".to_string(),
                "participatory-budget".to_string()
            ]
        );
        assert_eq!(state.events, report.enacted);
        assert_eq!(state.metrics, Metrics::new(54, 77, 62, 50));
        assert_eq!(report.metrics, state.metrics);
    }

    #[test]
    fn enacted_policies_cannot_be_toggled_again() {
        let mut engine = engine();
        engine.toggle_select("cultural-hub").unwrap();
        engine.submit_round().unwrap();
        let before = engine.state().clone();
        assert_eq!(
            engine.toggle_select("cultural-hub").unwrap(),
            ToggleOutcome::Unavailable
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn enacted_id_still_listed_as_available_is_reported_as_enacted() {
        let mut engine = engine();
        engine.toggle_select("cultural-hub").unwrap();
        engine.submit_round().unwrap();
        // Simulate a presentation layer holding a stale offer list.
        let stale = engine.catalog().get("cultural-hub").unwrap().clone();
        engine.state.available_policies.push(stale);
        assert_eq!(
            engine.toggle_select("cultural-hub").unwrap(),
            ToggleOutcome::AlreadyEnacted
        );
    }

    #[test]
    fn double_clamp_does_not_bank_overflow() {
        let catalog = PolicyCatalog::new(vec![
            policy("surge", 10, Metrics::new(70, 0, 0, 0)),
            policy("slump", 10, Metrics::new(-30, 0, 0, 0)),
        ])
        .unwrap();
        let mut engine = RoundEngine::new(Arc::new(catalog));
        engine.toggle_select("surge").unwrap();
        engine.submit_round().unwrap();
        assert_eq!(engine.state().metrics.jobs, 100);

        engine.toggle_select("slump").unwrap();
        // History saturates at 100, so the tentative -30 lands at 70, not 90.
        assert_eq!(engine.state().metrics.jobs, 70);
        engine.submit_round().unwrap();
        // Committing refolds everything from the baseline in one clamp: 50 + 70 - 30.
        assert_eq!(engine.state().metrics.jobs, 90);
    }

    #[test]
    fn fourth_submit_ends_the_game_and_fifth_is_rejected() {
        let mut engine = engine();
        for (round, id) in ["participatory-budget", "cultural-hub", "health-equity", "tech-jobs"]
            .into_iter()
            .enumerate()
        {
            assert_eq!(engine.state().round, u32::try_from(round).unwrap() + 1);
            engine.toggle_select(id).unwrap();
            let report = engine.submit_round().unwrap();
            assert_eq!(report.game_over, round == 3);
        }
        assert!(engine.state().is_game_over());
        assert_eq!(engine.state().round, MAX_ROUNDS);
        assert!(engine.outcome().is_some());

        let before = engine.state().clone();
        assert_eq!(
            engine.submit_round(),
            Err(EngineError::InvalidTransition {
                operation: "submit_round",
                phase: "game_over",
            })
        );
        assert!(matches!(
            engine.toggle_select("workforce-training"),
            Err(EngineError::InvalidTransition { operation: "toggle_select", .. })
        ));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn restart_resets_from_any_phase() {
        let mut engine = engine();
        engine.toggle_select("tech-jobs").unwrap();
        engine.restart();
        assert_eq!(engine.state(), &GameState::new(engine.catalog()));

        for _ in 0..MAX_ROUNDS {
            let id = engine.state().available_policies[0].id.clone();
            engine.toggle_select(&id).unwrap();
            engine.submit_round().unwrap();
        }
        assert!(engine.state().is_game_over());
        engine.restart();
        assert_eq!(engine.state().phase, GamePhase::Playing);
        assert_eq!(engine.state().round, 1);
        assert!(engine.outcome().is_none());
    }

    #[test]
    fn summary_requires_game_over() {
        let engine = engine();
        let err = engine.summary().unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTransition {
                operation: "summary",
                phase: "playing",
            }
        );
        assert_eq!(
            err.to_string(),
            "`summary` is not allowed while the game is playing"
        );
    }
}
