#![deny(warnings)]

//! Core domain models for the foreclosure auction trainer.
//!
//! This crate owns the inputs of the analysis engine and the stages that
//! resolve them into immutable records:
//! - property seeds and the appraisal estimate ([`property`])
//! - court document snapshots and legal-priority flags ([`court`])
//! - the versioned policy table and its difficulty overlays ([`policy`])

pub mod court;
pub mod policy;
pub mod property;

pub use court::{
    normalize_court_docs, CourtDocsError, CourtDocsNormalized, CourtDocsRaw, EvictionRiskLevel,
    Occupant, RawOccupant, RawRight, RegisteredRight, RightKind,
};
pub use policy::{
    merge_policy, overlay_value, CompetitorPolicy, CostPolicy, FmvRateTable, Policy, PolicyError,
    PolicyStore, ProfitPolicy, RightsPolicy, ValuationPolicy,
};
pub use property::{
    estimate_appraisal, normalize_property, Property, PropertyCategory, PropertySeed, PropertyType,
    SeedError, MAX_SIZE_M2,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::str::FromStr;

/// Holding horizon after acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Horizon {
    /// Three months.
    #[serde(rename = "3m")]
    Short,
    /// Six months.
    #[serde(rename = "6m")]
    Medium,
    /// Twelve months.
    #[serde(rename = "12m")]
    Long,
}

impl Horizon {
    /// Every horizon, shortest first.
    pub const ALL: [Horizon; 3] = [Horizon::Short, Horizon::Medium, Horizon::Long];

    /// Length of the horizon in months.
    pub const fn months(self) -> u32 {
        match self {
            Horizon::Short => 3,
            Horizon::Medium => 6,
            Horizon::Long => 12,
        }
    }

    /// Wire label, e.g. `"6m"`.
    pub const fn label(self) -> &'static str {
        match self {
            Horizon::Short => "3m",
            Horizon::Medium => "6m",
            Horizon::Long => "12m",
        }
    }
}

/// One value per holding horizon, serialized with the keys `3m`, `6m`, `12m`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonMap<T> {
    #[serde(rename = "3m")]
    pub short: T,
    #[serde(rename = "6m")]
    pub medium: T,
    #[serde(rename = "12m")]
    pub long: T,
}

impl<T> HorizonMap<T> {
    /// Build a map by evaluating `f` once per horizon, shortest first.
    pub fn from_fn(mut f: impl FnMut(Horizon) -> T) -> Self {
        Self {
            short: f(Horizon::Short),
            medium: f(Horizon::Medium),
            long: f(Horizon::Long),
        }
    }

    pub fn get(&self, horizon: Horizon) -> &T {
        match horizon {
            Horizon::Short => &self.short,
            Horizon::Medium => &self.medium,
            Horizon::Long => &self.long,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Horizon, &T)> {
        Horizon::ALL.into_iter().map(move |h| (h, self.get(h)))
    }
}

impl<T> Index<Horizon> for HorizonMap<T> {
    type Output = T;

    fn index(&self, horizon: Horizon) -> &T {
        self.get(horizon)
    }
}

/// Scenario difficulty. Selects the policy overlay and the competitor field.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub const fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = SeedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            _ => Err(SeedError::UnknownDifficulty(value.to_string())),
        }
    }
}

/// Pricing and tenant-protection region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Seoul,
    /// Overcrowding-control area around the capital (Gyeonggi, Incheon).
    Overcrowded,
    /// Metropolitan cities outside the capital area.
    Metropolitan,
    #[default]
    Other,
}

const REGION_KEYWORDS: &[(&str, Region)] = &[
    ("서울", Region::Seoul),
    ("seoul", Region::Seoul),
    ("경기", Region::Overcrowded),
    ("gyeonggi", Region::Overcrowded),
    ("인천", Region::Overcrowded),
    ("incheon", Region::Overcrowded),
    ("부산", Region::Metropolitan),
    ("busan", Region::Metropolitan),
    ("대구", Region::Metropolitan),
    ("daegu", Region::Metropolitan),
    ("광주", Region::Metropolitan),
    ("gwangju", Region::Metropolitan),
    ("대전", Region::Metropolitan),
    ("daejeon", Region::Metropolitan),
    ("울산", Region::Metropolitan),
    ("ulsan", Region::Metropolitan),
    ("세종", Region::Metropolitan),
    ("sejong", Region::Metropolitan),
];

impl Region {
    /// Detect the region from free text (an address or a region label).
    /// Falls back to [`Region::Other`] when nothing matches.
    pub fn detect(text: &str) -> Region {
        let lowered = text.to_lowercase();
        REGION_KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, region)| *region)
            .unwrap_or_default()
    }
}

/// Largest amount of won accepted anywhere in the engine (10^15).
///
/// Every input amount is checked against it, so products of amounts with
/// policy rates (all at most 1) and horizon months stay far below
/// `Decimal::MAX`.
pub const MAX_AMOUNT_WON: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Round a monetary amount to the nearest multiple of `unit`.
/// A non-positive unit returns the amount unchanged.
pub fn round_to_unit(amount: Decimal, unit: Decimal) -> Decimal {
    if unit <= Decimal::ZERO {
        return amount;
    }
    (amount / unit).round() * unit
}
