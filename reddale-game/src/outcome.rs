//! Final narrative classification of the city's metrics.
//!
//! Rules are checked top to bottom and the first match wins; the order is part
//! of the contract. "Mixed Results" is the fallback when no rule matches.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    BAD_THRESHOLD, GOOD_THRESHOLD, GREAT_THRESHOLD, INCREMENTAL_AVERAGE_MAX,
    INCREMENTAL_AVERAGE_MIN,
};
use crate::metrics::Metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Renaissance,
    Transformed,
    TechBoomShadow,
    GreenButStruggling,
    GoodIntentions,
    GrowthForSome,
    ProgressiveVision,
    PopularButUnfinished,
    CityOfContrasts,
    IncrementalProgress,
    DeepeningStruggles,
    MixedResults,
}

impl OutcomeKind {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Renaissance => "Reddale Renaissance",
            Self::Transformed => "A City Transformed",
            Self::TechBoomShadow => "The Tech Boom's Shadow",
            Self::GreenButStruggling => "Green But Struggling",
            Self::GoodIntentions => "Good Intentions, Hard Realities",
            Self::GrowthForSome => "Growth for Some",
            Self::ProgressiveVision => "Progressive Vision, Political Resistance",
            Self::PopularButUnfinished => "Popular but Unfinished",
            Self::CityOfContrasts => "A City of Contrasts",
            Self::IncrementalProgress => "Incremental Progress",
            Self::DeepeningStruggles => "Deepening Struggles",
            Self::MixedResults => "Mixed Results",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Renaissance => {
                "Against all odds, you've achieved what many thought impossible: equitable growth with environmental sustainability and broad political support. Reddale is now studied as a national model for post-industrial transformation. Other struggling cities send delegations to learn from your approach."
            }
            Self::Transformed => {
                "Reddale is thriving. You've balanced job creation with equity, earned political support across stakeholder groups, and made meaningful environmental progress. The city still faces challenges, but the foundation for long-term prosperity is solid."
            }
            Self::TechBoomShadow => {
                "Job growth is undeniable—new offices, rising wages, declining unemployment. But longtime residents feel left behind. Rents are climbing faster than wages for service workers. Political tensions are high. Without addressing equity and inclusion, this growth may prove fragile and divisive."
            }
            Self::GreenButStruggling => {
                "Reddale's environmental metrics are impressive—solar panels, clean transit, restored parks. But unemployment remains high and political opposition is mounting. Residents wonder: 'What good is a green city if I can't afford to live here or find work?' Economic opportunity must accompany environmental progress."
            }
            Self::GoodIntentions => {
                "You've prioritized equity and community voice, which matters deeply. But without job creation, the city's tax base continues to shrink. Participatory governance can't substitute for economic opportunity. The challenge is building equity alongside growth, not instead of it."
            }
            Self::GrowthForSome => {
                "The downtown is buzzing with new businesses and the business community is pleased. But low-income neighborhoods see little benefit, environmental justice concerns are ignored, and gentrification pressures are mounting. This is far from sustainable growth."
            }
            Self::ProgressiveVision => {
                "You've championed equity and environmental justice, earning praise from activists. However, political opposition is fierce. Business interests and some residents feel alienated. Building coalitions across divides will be essential for lasting change."
            }
            Self::PopularButUnfinished => {
                "You've maintained broad political support—no small feat in a polarized environment. But support alone doesn't pay bills or clean the air. The hard work of addressing jobs, equity, or climate remains. Political capital is valuable, but it must be spent on tangible improvements."
            }
            Self::CityOfContrasts => {
                "Reddale tells different stories depending on who you ask. Some neighborhoods are thriving, others declining. Some metrics improved, others worsened. The challenge ahead is ensuring progress reaches everyone—that economic opportunity, equity, political legitimacy, and environmental health move forward together."
            }
            Self::IncrementalProgress => {
                "You've made steady, if modest, gains across multiple fronts. No metric collapsed, but none soared either. Reddale is better than it was four years ago, but the transformation you hoped for remains elusive."
            }
            Self::DeepeningStruggles => {
                "Reddale faces mounting challenges. Economic stagnation persists, inequality has grown, and political polarization is high. Residents are frustrated, and trust in leadership is eroding. The next mayor will inherit a difficult situation. Sometimes setbacks teach us what not to do—a hard but valuable lesson."
            }
            Self::MixedResults => {
                "Your tenure brought both progress and setbacks. Some constituencies benefited, others didn't. Trade-offs are inherent in governance, but Reddale needs more cohesive, inclusive strategies. Reflect on which voices were centered, which were ignored, and how to build broader coalitions next time."
            }
        }
    }

    #[must_use]
    pub const fn outcome(self) -> Outcome {
        Outcome {
            kind: self,
            title: self.title(),
            description: self.description(),
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Classifier result: a fixed title and description pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub title: &'static str,
    pub description: &'static str,
}

/// Threshold bands for a single metric, computed independently of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub good: bool,
    pub great: bool,
    pub bad: bool,
}

impl Band {
    #[must_use]
    pub const fn of(value: i32) -> Self {
        Self {
            good: value >= GOOD_THRESHOLD,
            great: value >= GREAT_THRESHOLD,
            bad: value < BAD_THRESHOLD,
        }
    }
}

/// Per-metric bands plus the average check, the only inputs the rules read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub jobs: Band,
    pub equity: Band,
    pub climate: Band,
    pub support: Band,
    /// Average of the four metrics lies in `[55, 65)`.
    pub average_moderate: bool,
}

impl Assessment {
    #[must_use]
    pub fn of(metrics: &Metrics) -> Self {
        // avg in [min, max) over four metrics is sum in [4 * min, 4 * max).
        let total = metrics.total();
        let low = i64::from(INCREMENTAL_AVERAGE_MIN) * 4;
        let high = i64::from(INCREMENTAL_AVERAGE_MAX) * 4;
        Self {
            jobs: Band::of(metrics.jobs),
            equity: Band::of(metrics.equity),
            climate: Band::of(metrics.climate),
            support: Band::of(metrics.support),
            average_moderate: (low..high).contains(&total),
        }
    }

    const fn bands(&self) -> [Band; 4] {
        [self.jobs, self.equity, self.climate, self.support]
    }

    fn all(&self, pick: impl Fn(Band) -> bool) -> bool {
        self.bands().into_iter().all(pick)
    }

    fn any(&self, pick: impl Fn(Band) -> bool) -> bool {
        self.bands().into_iter().any(pick)
    }
}

/// One entry of the ordered rule table.
#[derive(Clone, Copy)]
pub struct OutcomeRule {
    pub kind: OutcomeKind,
    pub applies: fn(&Assessment) -> bool,
}

impl fmt::Debug for OutcomeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeRule")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Priority-ordered rules; [`OutcomeKind::MixedResults`] applies when none match.
pub const OUTCOME_RULES: [OutcomeRule; 11] = [
    OutcomeRule {
        kind: OutcomeKind::Renaissance,
        applies: |a| a.all(|b| b.great),
    },
    OutcomeRule {
        kind: OutcomeKind::Transformed,
        applies: |a| a.all(|b| b.good),
    },
    OutcomeRule {
        kind: OutcomeKind::TechBoomShadow,
        applies: |a| a.jobs.great && a.climate.bad && (a.equity.bad || a.support.bad),
    },
    OutcomeRule {
        kind: OutcomeKind::GreenButStruggling,
        applies: |a| a.climate.great && a.jobs.bad && a.support.bad,
    },
    OutcomeRule {
        kind: OutcomeKind::GoodIntentions,
        applies: |a| a.equity.good && a.jobs.bad,
    },
    OutcomeRule {
        kind: OutcomeKind::GrowthForSome,
        applies: |a| a.jobs.good && a.support.good && a.equity.bad && a.climate.bad,
    },
    OutcomeRule {
        kind: OutcomeKind::ProgressiveVision,
        applies: |a| a.equity.good && a.climate.good && a.support.bad,
    },
    OutcomeRule {
        kind: OutcomeKind::PopularButUnfinished,
        applies: |a| {
            (a.support.good || a.support.great) && (a.jobs.bad || a.equity.bad || a.climate.bad)
        },
    },
    OutcomeRule {
        kind: OutcomeKind::CityOfContrasts,
        applies: |a| a.any(|b| b.good) && a.any(|b| b.bad),
    },
    OutcomeRule {
        kind: OutcomeKind::IncrementalProgress,
        applies: |a| a.average_moderate,
    },
    OutcomeRule {
        kind: OutcomeKind::DeepeningStruggles,
        applies: |a| a.jobs.bad && a.equity.bad && a.support.bad,
    },
];

/// Classify final metrics. Total: every input maps to exactly one outcome.
#[must_use]
pub fn classify(metrics: &Metrics) -> Outcome {
    let assessment = Assessment::of(metrics);
    OUTCOME_RULES
        .iter()
        .find(|rule| (rule.applies)(&assessment))
        .map_or(OutcomeKind::MixedResults, |rule| rule.kind)
        .outcome()
}

/// Every rule `metrics` satisfies, in priority order. The first entry (or
/// [`OutcomeKind::MixedResults`] when empty) is what [`classify`] returns.
#[must_use]
pub fn matching_rules(metrics: &Metrics) -> Vec<OutcomeKind> {
    let assessment = Assessment::of(metrics);
    OUTCOME_RULES
        .iter()
        .filter(|rule| (rule.applies)(&assessment))
        .map(|rule| rule.kind)
        .collect()
}
