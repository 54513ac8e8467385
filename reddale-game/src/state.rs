//! Mutable game aggregate and its event log.
use serde::{Deserialize, Serialize};

use crate::availability::available_policies;
use crate::catalog::{Policy, PolicyCatalog};
use crate::constants::{INITIAL_BUDGET, LOW_BUDGET_PCT, MAX_ROUNDS};
use crate::metrics::Metrics;

/// Coarse state machine tag for the round engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Playing,
    GameOver,
}

impl GamePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::GameOver => "game_over",
        }
    }
}

/// Record of one policy committed at round submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub round: u32,
    pub policy: String,
    pub narrative: String,
    pub metric_changes: Metrics,
}

impl GameEvent {
    #[must_use]
    pub fn enacted(round: u32, policy: &Policy) -> Self {
        Self {
            round,
            policy: policy.id.clone(),
            narrative: policy.narrative.clone(),
            metric_changes: policy.effects,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// 1-indexed; stays at [`MAX_ROUNDS`] once the game is over.
    pub round: u32,
    pub budget: u32,
    /// Committed metrics plus this round's tentative selections.
    pub metrics: Metrics,
    pub available_policies: Vec<Policy>,
    pub selected_policies: Vec<String>,
    pub historical_selections: Vec<String>,
    pub events: Vec<GameEvent>,
    #[serde(default)]
    pub phase: GamePhase,
}

impl GameState {
    /// Fresh round-one state for `catalog`.
    #[must_use]
    pub fn new(catalog: &PolicyCatalog) -> Self {
        Self {
            round: 1,
            budget: INITIAL_BUDGET,
            metrics: Metrics::baseline(),
            available_policies: available_policies::<String>(catalog, &[])
                .into_iter()
                .cloned()
                .collect(),
            selected_policies: Vec::new(),
            historical_selections: Vec::new(),
            events: Vec::new(),
            phase: GamePhase::Playing,
        }
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver)
    }

    #[must_use]
    pub fn available(&self, id: &str) -> Option<&Policy> {
        self.available_policies.iter().find(|policy| policy.id == id)
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_policies.iter().any(|selected| selected == id)
    }

    #[must_use]
    pub fn is_enacted(&self, id: &str) -> bool {
        self.historical_selections.iter().any(|enacted| enacted == id)
    }

    #[must_use]
    pub const fn can_afford(&self, policy: &Policy) -> bool {
        self.budget >= policy.cost
    }

    #[must_use]
    pub const fn spent_this_round(&self) -> u32 {
        INITIAL_BUDGET.saturating_sub(self.budget)
    }

    /// Whether the remaining budget has dropped below the warning threshold.
    #[must_use]
    pub const fn budget_is_low(&self) -> bool {
        self.budget.saturating_mul(100) < INITIAL_BUDGET * LOW_BUDGET_PCT
    }

    /// Rounds left including the current one.
    #[must_use]
    pub const fn years_remaining(&self) -> u32 {
        if self.is_game_over() {
            0
        } else {
            MAX_ROUNDS.saturating_sub(self.round) + 1
        }
    }

    /// Events committed during `round`, in commit order.
    pub fn events_for_round(&self, round: u32) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().filter(move |event| event.round == round)
    }

    /// Policies on offer this round that the remaining budget still covers.
    pub fn affordable_policies(&self) -> impl Iterator<Item = &Policy> {
        self.available_policies
            .iter()
            .filter(move |policy| !self.is_selected(&policy.id) && self.can_afford(policy))
    }
}
