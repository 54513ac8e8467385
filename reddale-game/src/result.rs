//! End game result summary
use serde::{Deserialize, Serialize};

use crate::catalog::PolicyCatalog;
use crate::engine::EngineError;
use crate::metrics::Metrics;
use crate::outcome::{OutcomeKind, classify};
use crate::state::GameState;

/// One enacted policy as shown in the decisions recap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionLine {
    pub round: u32,
    pub policy_id: String,
    pub policy_name: String,
    pub narrative: String,
}

/// Complete summary of a finished game for the result screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub outcome: OutcomeKind,
    pub headline: String,
    pub epilogue: String,
    pub metrics: Metrics,
    pub rounds_played: u32,
    pub decisions: Vec<DecisionLine>,
}

impl ResultSummary {
    /// Decisions made during `round`, in commit order.
    pub fn decisions_for_round(&self, round: u32) -> impl Iterator<Item = &DecisionLine> {
        self.decisions.iter().filter(move |line| line.round == round)
    }
}

/// Build the result summary from a finished game.
///
/// # Errors
///
/// Returns [`EngineError::InvalidTransition`] if the game is still in progress.
pub fn result_summary(
    state: &GameState,
    catalog: &PolicyCatalog,
) -> Result<ResultSummary, EngineError> {
    if !state.is_game_over() {
        return Err(EngineError::InvalidTransition {
            operation: "summary",
            phase: state.phase.as_str(),
        });
    }

    let outcome = classify(&state.metrics);
    let decisions = state
        .events
        .iter()
        .map(|event| DecisionLine {
            round: event.round,
            policy_id: event.policy.clone(),
            policy_name: catalog
                .get(&event.policy)
                .map_or_else(|| event.policy.clone(), |policy| policy.name.clone()),
            narrative: event.narrative.clone(),
        })
        .collect();

    Ok(ResultSummary {
        outcome: outcome.kind,
        headline: outcome.title.to_string(),
        epilogue: outcome.description.to_string(),
        metrics: state.metrics,
        rounds_played: state.round,
        decisions,
    })
}
