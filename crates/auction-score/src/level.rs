//! Cumulative experience → tier and level.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl ExperienceTier {
    pub const ALL: [ExperienceTier; 5] = [
        ExperienceTier::Bronze,
        ExperienceTier::Silver,
        ExperienceTier::Gold,
        ExperienceTier::Platinum,
        ExperienceTier::Diamond,
    ];

    /// Experience at which the tier starts.
    pub const fn threshold(self) -> u64 {
        match self {
            ExperienceTier::Bronze => 0,
            ExperienceTier::Silver => 1_000,
            ExperienceTier::Gold => 3_000,
            ExperienceTier::Platinum => 7_000,
            ExperienceTier::Diamond => 15_000,
        }
    }

    pub const fn next(self) -> Option<ExperienceTier> {
        match self {
            ExperienceTier::Bronze => Some(ExperienceTier::Silver),
            ExperienceTier::Silver => Some(ExperienceTier::Gold),
            ExperienceTier::Gold => Some(ExperienceTier::Platinum),
            ExperienceTier::Platinum => Some(ExperienceTier::Diamond),
            ExperienceTier::Diamond => None,
        }
    }

    pub fn for_experience(exp: u64) -> ExperienceTier {
        ExperienceTier::ALL
            .into_iter()
            .rev()
            .find(|t| exp >= t.threshold())
            .unwrap_or(ExperienceTier::Bronze)
    }
}

pub const MAX_TIER_LEVEL: u32 = 5;
pub const MAX_DIAMOND_LEVEL: u32 = 99;
/// Diamond experience per squared level step.
const DIAMOND_STEP: f64 = 2_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLevel {
    pub tier: ExperienceTier,
    pub level: u32,
    pub exp: u64,
    /// Experience still needed to reach the next tier, `None` in Diamond.
    pub exp_to_next_tier: Option<u64>,
}

impl PlayerLevel {
    pub fn from_experience(exp: u64) -> PlayerLevel {
        let tier = ExperienceTier::for_experience(exp);
        let start = tier.threshold();
        let (level, exp_to_next_tier) = match tier.next() {
            Some(next) => {
                let span = (next.threshold() - start) as f64;
                let progress = (exp - start) as f64 / span;
                let level = 1 + (5.0 * progress.sqrt()).floor() as u32;
                (level.min(MAX_TIER_LEVEL), Some(next.threshold() - exp))
            }
            None => {
                let steps = ((exp - start) as f64 / DIAMOND_STEP).sqrt().floor() as u32;
                ((1 + steps).min(MAX_DIAMOND_LEVEL), None)
            }
        };
        PlayerLevel {
            tier,
            level,
            exp,
            exp_to_next_tier,
        }
    }
}
