use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reddale_game::{
    EngineError, INITIAL_BUDGET, MAX_ROUNDS, Metrics, OutcomeKind, PolicyCatalog, RoundEngine,
    ToggleOutcome, classify,
};

use crate::logic::strategy::{PlayerStrategy, StrategyKind};

/// One submitted round of an automated playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub enacted: Vec<String>,
    pub budget_spent: u32,
    pub metrics: Metrics,
    /// The strategy picked nothing usable and the cheapest offer was taken instead.
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaythroughResult {
    pub strategy: String,
    pub passed: bool,
    pub rounds: Vec<RoundRecord>,
    pub final_metrics: Metrics,
    pub outcome: Option<OutcomeKind>,
    pub headline: Option<String>,
    pub checks_run: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Drives one strategy through a full game, checking engine invariants at every step.
pub struct SimulationSession {
    engine: RoundEngine,
    strategy: Box<dyn PlayerStrategy>,
    verbose: bool,
    checks_run: usize,
    failures: Vec<String>,
}

impl SimulationSession {
    #[must_use]
    pub fn new(catalog: Arc<PolicyCatalog>, kind: StrategyKind, verbose: bool) -> Self {
        Self {
            engine: RoundEngine::new(catalog),
            strategy: kind.create_strategy(),
            verbose,
            checks_run: 0,
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub fn run(mut self) -> PlaythroughResult {
        let start = Instant::now();
        let mut rounds = Vec::new();

        while !self.engine.state().is_game_over() {
            let Some(record) = self.play_round() else {
                break;
            };
            rounds.push(record);
        }
        self.check_round_bound(rounds.len());

        let final_metrics = self.engine.state().metrics;
        let summary = self.engine.summary().ok();
        if let Some(summary) = &summary {
            self.check(
                summary.outcome == classify(&final_metrics).kind,
                || "summary outcome disagrees with classifier".to_string(),
            );
        }

        PlaythroughResult {
            strategy: self.strategy.name().to_string(),
            passed: self.failures.is_empty(),
            rounds,
            final_metrics,
            outcome: summary.as_ref().map(|s| s.outcome),
            headline: summary.map(|s| s.headline),
            checks_run: self.checks_run,
            failures: self.failures,
            duration: start.elapsed(),
        }
    }

    fn play_round(&mut self) -> Option<RoundRecord> {
        let round = self.engine.state().round;
        let offered_before: Vec<String> = self
            .engine
            .state()
            .available_policies
            .iter()
            .map(|p| p.id.clone())
            .collect();

        let picks = self.strategy.pick_policies(self.engine.state());
        for id in &picks {
            self.toggle_checked(id);
        }

        let mut fallback = false;
        if self.engine.state().selected_policies.is_empty() {
            let cheapest = self
                .engine
                .state()
                .affordable_policies()
                .min_by_key(|p| (p.cost, p.id.clone()))
                .map(|p| p.id.clone());
            let Some(id) = cheapest else {
                self.failures
                    .push(format!("round {round}: nothing affordable on offer"));
                return None;
            };
            log::debug!("{}: falling back to `{id}` in round {round}", self.strategy.name());
            fallback = true;
            self.toggle_checked(&id);
        }

        let selected = self.engine.state().selected_policies.clone();
        let budget_spent = INITIAL_BUDGET - self.engine.state().budget;
        match self.engine.submit_round() {
            Ok(report) => {
                self.check_after_submit(round, &offered_before, &selected);
                if self.verbose {
                    println!(
                        "   round {round}: {} -> {:?}",
                        selected.join(", "),
                        report.metrics
                    );
                }
                Some(RoundRecord {
                    round,
                    enacted: selected,
                    budget_spent,
                    metrics: report.metrics,
                    fallback,
                })
            }
            Err(err) => {
                self.failures.push(format!("round {round}: submit failed: {err}"));
                None
            }
        }
    }

    /// Toggle `id` on, first probing on a clone that select-then-deselect is a no-op.
    fn toggle_checked(&mut self, id: &str) {
        let round = self.engine.state().round;
        let mut probe = self.engine.clone();
        if matches!(probe.toggle_select(id), Ok(ToggleOutcome::Selected)) {
            let restored = matches!(probe.toggle_select(id), Ok(ToggleOutcome::Deselected))
                && probe.state() == self.engine.state();
            self.check(restored, || {
                format!("round {round}: toggling `{id}` twice changed state")
            });
        }

        match self.engine.toggle_select(id) {
            Ok(ToggleOutcome::Selected) => {}
            Ok(other) => self.failures.push(format!(
                "round {round}: strategy picked `{id}` but toggle reported {other:?}"
            )),
            Err(EngineError::InsufficientBudget { cost, budget, .. }) => {
                log::debug!("skipping `{id}`: costs {cost}, {budget} left");
            }
            Err(err) => self.failures.push(format!("round {round}: {err}")),
        }
        self.check_budget_and_bounds(round);
    }

    fn check_budget_and_bounds(&mut self, round: u32) {
        let state = self.engine.state();
        let spent = self.engine.catalog().total_cost(&state.selected_policies);
        let budget = state.budget;
        let in_bounds = state.metrics.all_within_bounds();
        let metrics = state.metrics;
        self.check(budget + spent == INITIAL_BUDGET, || {
            format!("round {round}: budget {budget} + selected {spent} != {INITIAL_BUDGET}")
        });
        self.check(in_bounds, || {
            format!("round {round}: metrics out of range {metrics:?}")
        });
    }

    fn check_after_submit(&mut self, round: u32, offered_before: &[String], enacted: &[String]) {
        let state = self.engine.state();
        let reoffered: Vec<String> = state
            .historical_selections
            .iter()
            .filter(|id| state.available(id).is_some())
            .cloned()
            .collect();
        let withdrawn: Vec<String> = offered_before
            .iter()
            .filter(|id| !enacted.contains(*id) && state.available(id).is_none())
            .cloned()
            .collect();
        let budget = state.budget;
        let in_bounds = state.metrics.all_within_bounds();

        self.check(reoffered.is_empty(), || {
            format!("round {round}: enacted policies offered again: {reoffered:?}")
        });
        self.check(withdrawn.is_empty(), || {
            format!("round {round}: offers withdrawn without being enacted: {withdrawn:?}")
        });
        self.check(budget == INITIAL_BUDGET, || {
            format!("round {round}: budget not reset after submit ({budget})")
        });
        self.check(in_bounds, || {
            format!("round {round}: committed metrics out of range")
        });
    }

    fn check_round_bound(&mut self, rounds_played: usize) {
        let state = self.engine.state();
        let game_over = state.is_game_over();
        let round = state.round;
        self.check(
            !game_over || (round == MAX_ROUNDS && u32::try_from(rounds_played) == Ok(MAX_ROUNDS)),
            || format!("game ended at round {round} after {rounds_played} submissions"),
        );
        if !game_over {
            return;
        }

        let before = self.engine.state().clone();
        let rejected = matches!(
            self.engine.submit_round(),
            Err(EngineError::InvalidTransition { .. })
        );
        let unchanged = self.engine.state() == &before;
        self.check(rejected && unchanged, || {
            "submit after game over was not rejected cleanly".to_string()
        });
    }

    fn check(&mut self, ok: bool, describe: impl FnOnce() -> String) {
        self.checks_run += 1;
        if !ok {
            let message = describe();
            log::warn!("{}: {message}", self.strategy.name());
            self.failures.push(message);
        }
    }
}

/// Run every requested strategy against the same shared catalog.
#[must_use]
pub fn run_strategies(
    catalog: &Arc<PolicyCatalog>,
    kinds: &[StrategyKind],
    verbose: bool,
) -> Vec<PlaythroughResult> {
    kinds
        .iter()
        .map(|&kind| {
            if verbose {
                println!("🧪 Playing strategy: {kind}");
            }
            SimulationSession::new(Arc::clone(catalog), kind, verbose).run()
        })
        .collect()
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
