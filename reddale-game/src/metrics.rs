//! City metrics and the clamping rules applied to them.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{METRIC_BASELINE, METRIC_MAX, METRIC_MIN};

/// One of the four city-health dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Jobs,
    Equity,
    Climate,
    Support,
}

impl Metric {
    pub const ALL: [Self; 4] = [Self::Jobs, Self::Equity, Self::Climate, Self::Support];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Equity => "equity",
            Self::Climate => "climate",
            Self::Support => "support",
        }
    }

    /// Human-facing label used by metric bars and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Jobs => "Jobs & Economy",
            Self::Equity => "Equity & Trust",
            Self::Climate => "Climate & Environment",
            Self::Support => "Political Support",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp a raw metric value into `[METRIC_MIN, METRIC_MAX]`.
#[must_use]
pub const fn clamp_metric(value: i32) -> i32 {
    if value < METRIC_MIN {
        METRIC_MIN
    } else if value > METRIC_MAX {
        METRIC_MAX
    } else {
        value
    }
}

/// All four metric values.
///
/// The same shape carries policy effect deltas, which are signed and never
/// clamped. City state values are always clamped before they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Metrics {
    #[serde(default)]
    pub jobs: i32,
    #[serde(default)]
    pub equity: i32,
    #[serde(default)]
    pub climate: i32,
    #[serde(default)]
    pub support: i32,
}

impl Metrics {
    #[must_use]
    pub const fn new(jobs: i32, equity: i32, climate: i32, support: i32) -> Self {
        Self {
            jobs,
            equity,
            climate,
            support,
        }
    }

    /// Starting city state: every metric at the baseline.
    #[must_use]
    pub const fn baseline() -> Self {
        Self::splat(METRIC_BASELINE)
    }

    #[must_use]
    pub const fn splat(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    #[must_use]
    pub const fn get(&self, metric: Metric) -> i32 {
        match metric {
            Metric::Jobs => self.jobs,
            Metric::Equity => self.equity,
            Metric::Climate => self.climate,
            Metric::Support => self.support,
        }
    }

    pub const fn set(&mut self, metric: Metric, value: i32) {
        match metric {
            Metric::Jobs => self.jobs = value,
            Metric::Equity => self.equity = value,
            Metric::Climate => self.climate = value,
            Metric::Support => self.support = value,
        }
    }

    /// Iterate `(metric, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, i32)> + '_ {
        Metric::ALL
            .into_iter()
            .map(move |metric| (metric, self.get(metric)))
    }

    /// Component-wise sum without clamping. Saturates instead of overflowing.
    #[must_use]
    pub const fn plus(self, delta: Self) -> Self {
        Self::new(
            self.jobs.saturating_add(delta.jobs),
            self.equity.saturating_add(delta.equity),
            self.climate.saturating_add(delta.climate),
            self.support.saturating_add(delta.support),
        )
    }

    #[must_use]
    pub const fn clamped(self) -> Self {
        Self::new(
            clamp_metric(self.jobs),
            clamp_metric(self.equity),
            clamp_metric(self.climate),
            clamp_metric(self.support),
        )
    }

    /// Apply a delta and clamp the result.
    #[must_use]
    pub const fn apply_clamped(self, delta: Self) -> Self {
        self.plus(delta).clamped()
    }

    #[must_use]
    pub fn total(&self) -> i64 {
        self.iter().map(|(_, value)| i64::from(value)).sum()
    }

    #[must_use]
    pub fn all_within_bounds(&self) -> bool {
        self.iter()
            .all(|(_, value)| (METRIC_MIN..=METRIC_MAX).contains(&value))
    }
}

impl std::iter::Sum for Metrics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::plus)
    }
}

impl<'a> std::iter::Sum<&'a Metrics> for Metrics {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
