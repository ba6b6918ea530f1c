//! Property seed validation and appraisal estimation.
//!
//! A [`PropertySeed`] is the partially specified description produced by the
//! scenario generator. [`normalize_property`] validates it, fills defaults and
//! estimates the appraisal value, yielding the immutable [`Property`] that every
//! downstream stage reads.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::{round_to_unit, Difficulty, Region};

/// Oldest construction year accepted in a seed.
pub const MIN_YEAR_BUILT: i32 = 1900;
/// Auction steps (failed rounds + 1) are clamped into this range.
pub const MIN_AUCTION_STEP: i32 = 1;
pub const MAX_AUCTION_STEP: i32 = 5;
/// One square kilometre. Keeps the appraisal below [`crate::MAX_AMOUNT_WON`].
pub const MAX_SIZE_M2: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Building type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    /// Low-rise multi-family housing.
    Villa,
    Officetel,
    DetachedHouse,
    Commercial,
    Land,
}

impl PropertyType {
    pub const ALL: [PropertyType; 6] = [
        PropertyType::Apartment,
        PropertyType::Villa,
        PropertyType::Officetel,
        PropertyType::DetachedHouse,
        PropertyType::Commercial,
        PropertyType::Land,
    ];

    /// Construction year assumed when the seed leaves it out.
    pub const fn fallback_year_built(self) -> i32 {
        match self {
            PropertyType::Apartment => 2005,
            PropertyType::Villa => 1998,
            PropertyType::Officetel => 2010,
            PropertyType::DetachedHouse => 1990,
            PropertyType::Commercial => 2000,
            PropertyType::Land => 2000,
        }
    }
}

impl FromStr for PropertyType {
    type Err = SeedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "apartment" | "아파트" => Ok(Self::Apartment),
            "villa" | "빌라" | "다세대" => Ok(Self::Villa),
            "officetel" | "오피스텔" => Ok(Self::Officetel),
            "detached_house" | "house" | "단독주택" => Ok(Self::DetachedHouse),
            "commercial" | "상가" => Ok(Self::Commercial),
            "land" | "토지" => Ok(Self::Land),
            _ => Err(SeedError::UnknownType(value.to_string())),
        }
    }
}

/// Zoning / usage category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    Residential,
    Commercial,
    Industrial,
    Land,
}

impl FromStr for PropertyCategory {
    type Err = SeedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "residential" | "주거" | "주거용" => Ok(Self::Residential),
            "commercial" | "상업" | "상업용" => Ok(Self::Commercial),
            "industrial" | "공업" | "공업용" => Ok(Self::Industrial),
            "land" | "토지" => Ok(Self::Land),
            _ => Err(SeedError::UnknownCategory(value.to_string())),
        }
    }
}

/// Partially specified property description from the scenario generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySeed {
    #[serde(rename = "type")]
    pub property_type: String,
    pub category: String,
    pub size_m2: Decimal,
    pub year_built: Option<i32>,
    pub address: Option<String>,
    pub floor: Option<i32>,
    pub total_floors: Option<u32>,
    pub difficulty: Option<String>,
    /// 1 for the first sale, +1 for every failed round.
    pub auction_step: Option<i32>,
}

/// Fully resolved property record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub category: PropertyCategory,
    pub size_m2: Decimal,
    pub year_built: i32,
    pub age_years: u32,
    pub address: Option<String>,
    pub region: Region,
    pub floor: i32,
    pub total_floors: u32,
    pub difficulty: Difficulty,
    pub auction_step: u8,
    pub appraisal_value: Decimal,
}

/// A seed that cannot be turned into a property. Fatal for the whole run.
#[derive(Debug, Error, PartialEq)]
pub enum SeedError {
    #[error("unknown property type: {0}")]
    UnknownType(String),
    #[error("unknown property category: {0}")]
    UnknownCategory(String),
    #[error("property size must be > 0 (got {0})")]
    NonPositiveSize(Decimal),
    #[error("property size must be <= {max} m² (got {size})")]
    SizeOutOfRange { size: Decimal, max: Decimal },
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("year built {year} is out of supported range [1900, {max}]")]
    YearOutOfRange { year: i32, max: i32 },
}

/// Validate a seed and resolve it into a [`Property`].
///
/// `as_of` anchors the building age so the result does not depend on the
/// wall clock.
pub fn normalize_property(seed: &PropertySeed, as_of: NaiveDate) -> Result<Property, SeedError> {
    let property_type: PropertyType = seed.property_type.parse()?;
    let category: PropertyCategory = seed.category.parse()?;
    if seed.size_m2 <= Decimal::ZERO {
        return Err(SeedError::NonPositiveSize(seed.size_m2));
    }
    if seed.size_m2 > MAX_SIZE_M2 {
        return Err(SeedError::SizeOutOfRange {
            size: seed.size_m2,
            max: MAX_SIZE_M2,
        });
    }
    let difficulty = match seed.difficulty.as_deref() {
        Some(raw) => raw.parse::<Difficulty>()?,
        None => Difficulty::default(),
    };

    let current_year = as_of.year();
    let year_built = seed
        .year_built
        .unwrap_or_else(|| property_type.fallback_year_built());
    if !(MIN_YEAR_BUILT..=current_year).contains(&year_built) {
        return Err(SeedError::YearOutOfRange {
            year: year_built,
            max: current_year,
        });
    }
    let age_years = u32::try_from(current_year - year_built).unwrap_or(0);

    let region = seed
        .address
        .as_deref()
        .map(Region::detect)
        .unwrap_or_default();
    let auction_step = seed
        .auction_step
        .unwrap_or(MIN_AUCTION_STEP)
        .clamp(MIN_AUCTION_STEP, MAX_AUCTION_STEP) as u8;
    let appraisal_value = estimate_appraisal(seed.size_m2, region, property_type, age_years);

    debug!(
        ?property_type,
        ?region,
        age_years,
        auction_step,
        %appraisal_value,
        "property normalized"
    );

    Ok(Property {
        property_type,
        category,
        size_m2: seed.size_m2,
        year_built,
        age_years,
        address: seed.address.clone(),
        region,
        floor: seed.floor.unwrap_or(1),
        total_floors: seed.total_floors.unwrap_or(1).max(1),
        difficulty,
        auction_step,
        appraisal_value,
    })
}

/// Appraisal estimate rounded to the nearest 10,000 won:
/// `size × base price(region, type) × region multiplier × type adjustment × depreciation(age)`.
pub fn estimate_appraisal(
    size_m2: Decimal,
    region: Region,
    property_type: PropertyType,
    age_years: u32,
) -> Decimal {
    let raw = size_m2
        * base_price_per_m2(region, property_type)
        * region_multiplier(region)
        * type_adjustment(property_type)
        * depreciation(age_years);
    round_to_unit(raw, Decimal::new(10_000, 0))
}

/// Base price per square meter in won.
fn base_price_per_m2(region: Region, property_type: PropertyType) -> Decimal {
    use PropertyType::*;
    let thousands: i64 = match (region, property_type) {
        (Region::Seoul, Apartment) => 12_000,
        (Region::Seoul, Villa) => 6_000,
        (Region::Seoul, Officetel) => 7_000,
        (Region::Seoul, DetachedHouse) => 8_000,
        (Region::Seoul, Commercial) => 10_000,
        (Region::Seoul, Land) => 5_000,
        (Region::Overcrowded, Apartment) => 6_500,
        (Region::Overcrowded, Villa) => 3_500,
        (Region::Overcrowded, Officetel) => 4_500,
        (Region::Overcrowded, DetachedHouse) => 4_000,
        (Region::Overcrowded, Commercial) => 6_000,
        (Region::Overcrowded, Land) => 2_000,
        (Region::Metropolitan, Apartment) => 4_500,
        (Region::Metropolitan, Villa) => 2_500,
        (Region::Metropolitan, Officetel) => 3_500,
        (Region::Metropolitan, DetachedHouse) => 3_000,
        (Region::Metropolitan, Commercial) => 4_500,
        (Region::Metropolitan, Land) => 1_200,
        (Region::Other, Apartment) => 2_500,
        (Region::Other, Villa) => 1_500,
        (Region::Other, Officetel) => 2_000,
        (Region::Other, DetachedHouse) => 1_800,
        (Region::Other, Commercial) => 2_500,
        (Region::Other, Land) => 500,
    };
    Decimal::new(thousands * 1_000, 0)
}

fn region_multiplier(region: Region) -> Decimal {
    match region {
        Region::Seoul => Decimal::new(105, 2),
        Region::Overcrowded => Decimal::ONE,
        Region::Metropolitan => Decimal::new(95, 2),
        Region::Other => Decimal::new(90, 2),
    }
}

fn type_adjustment(property_type: PropertyType) -> Decimal {
    match property_type {
        PropertyType::Apartment | PropertyType::Land => Decimal::ONE,
        PropertyType::Villa => Decimal::new(90, 2),
        PropertyType::Officetel => Decimal::new(95, 2),
        PropertyType::DetachedHouse => Decimal::new(92, 2),
        PropertyType::Commercial => Decimal::new(110, 2),
    }
}

/// Banded depreciation by building age.
pub fn depreciation(age_years: u32) -> Decimal {
    match age_years {
        0..=10 => Decimal::ONE,
        11..=20 => Decimal::new(9, 1),
        21..=30 => Decimal::new(8, 1),
        _ => Decimal::new(7, 1),
    }
}
