use std::cmp::Reverse;
use std::fmt;

use reddale_game::{GameState, Metric, Metrics, Policy};

fn floor(metrics: &Metrics) -> i32 {
    metrics.iter().map(|(_, value)| value).min().unwrap_or_default()
}

/// Strategy interface for automated playthroughs.
pub trait PlayerStrategy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Policy ids to select this round, in toggle order.
    fn pick_policies(&mut self, state: &GameState) -> Vec<String>;
}

/// Built-in deterministic strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Balanced,
    JobsFirst,
    EquityFirst,
    ClimateFirst,
    Cheapest,
}

impl StrategyKind {
    pub const ALL: [Self; 5] = [
        Self::Balanced,
        Self::JobsFirst,
        Self::EquityFirst,
        Self::ClimateFirst,
        Self::Cheapest,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::JobsFirst => "jobs-first",
            Self::EquityFirst => "equity-first",
            Self::ClimateFirst => "climate-first",
            Self::Cheapest => "cheapest",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Balanced => "Balanced",
            Self::JobsFirst => "Jobs First",
            Self::EquityFirst => "Equity First",
            Self::ClimateFirst => "Climate First",
            Self::Cheapest => "Cheapest",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Balanced => "Lift whichever metric is currently lowest",
            Self::JobsFirst => "Favour job creation, then everything else",
            Self::EquityFirst => "Favour equity, then everything else",
            Self::ClimateFirst => "Favour climate, then everything else",
            Self::Cheapest => "Spread the budget over as many policies as possible",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    #[must_use]
    pub fn create_strategy(self) -> Box<dyn PlayerStrategy> {
        match self {
            Self::Balanced => Box::new(BalancedStrategy),
            Self::JobsFirst => Box::new(FocusedStrategy::new(self, Metric::Jobs)),
            Self::EquityFirst => Box::new(FocusedStrategy::new(self, Metric::Equity)),
            Self::ClimateFirst => Box::new(FocusedStrategy::new(self, Metric::Climate)),
            Self::Cheapest => Box::new(CheapestStrategy),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Greedy fill: walk `ranked` in order and take everything still affordable.
fn fill_budget<'a>(budget: u32, ranked: impl IntoIterator<Item = &'a Policy>) -> Vec<String> {
    let mut remaining = budget;
    let mut picks = Vec::new();
    for policy in ranked {
        if policy.cost <= remaining {
            remaining -= policy.cost;
            picks.push(policy.id.clone());
        }
    }
    picks
}

struct BalancedStrategy;

impl PlayerStrategy for BalancedStrategy {
    fn name(&self) -> &'static str {
        StrategyKind::Balanced.key()
    }

    fn pick_policies(&mut self, state: &GameState) -> Vec<String> {
        let mut projected = state.metrics;
        let mut remaining = state.budget;
        let mut picks: Vec<String> = Vec::new();

        loop {
            let best = state
                .available_policies
                .iter()
                .filter(|p| p.cost <= remaining && !picks.contains(&p.id))
                .map(|p| (p, projected.apply_clamped(p.effects)))
                .max_by_key(|(p, after)| {
                    (floor(after), after.total(), Reverse(p.cost), Reverse(p.id.clone()))
                });
            // Stop once the best remaining pick would drag the weakest metric down.
            let Some((policy, after)) = best.filter(|(_, after)| floor(after) >= floor(&projected))
            else {
                break;
            };
            projected = after;
            remaining -= policy.cost;
            picks.push(policy.id.clone());
        }
        picks
    }
}

/// Ranks by the focus metric, breaking ties on the overall effect.
struct FocusedStrategy {
    kind: StrategyKind,
    focus: Metric,
}

impl FocusedStrategy {
    const fn new(kind: StrategyKind, focus: Metric) -> Self {
        Self { kind, focus }
    }
}

impl PlayerStrategy for FocusedStrategy {
    fn name(&self) -> &'static str {
        self.kind.key()
    }

    fn pick_policies(&mut self, state: &GameState) -> Vec<String> {
        let mut ranked: Vec<&Policy> = state.available_policies.iter().collect();
        ranked.sort_by_key(|p| {
            (
                Reverse(p.effects.get(self.focus)),
                Reverse(p.effects.total()),
                p.cost,
                p.id.clone(),
            )
        });
        fill_budget(state.budget, ranked)
    }
}

struct CheapestStrategy;

impl PlayerStrategy for CheapestStrategy {
    fn name(&self) -> &'static str {
        StrategyKind::Cheapest.key()
    }

    fn pick_policies(&mut self, state: &GameState) -> Vec<String> {
        let mut ranked: Vec<&Policy> = state.available_policies.iter().collect();
        ranked.sort_by_key(|p| (p.cost, p.id.clone()));
        fill_budget(state.budget, ranked)
    }
}
