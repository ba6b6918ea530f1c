//! Shared builders for unit tests.

use auction_core::{
    normalize_court_docs, CourtDocsNormalized, CourtDocsRaw, Difficulty, Property,
    PropertyCategory, PropertySeed, PropertyType, RawOccupant, RawRight, Region,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

pub fn property(appraisal: Decimal, step: u8) -> Property {
    Property {
        property_type: PropertyType::Apartment,
        category: PropertyCategory::Residential,
        size_m2: Decimal::new(84, 0),
        year_built: 2015,
        age_years: 9,
        address: None,
        region: Region::Overcrowded,
        floor: 5,
        total_floors: 20,
        difficulty: Difficulty::Normal,
        auction_step: step,
        appraisal_value: appraisal,
    }
}

pub fn seed() -> PropertySeed {
    PropertySeed {
        property_type: "apartment".to_string(),
        category: "residential".to_string(),
        size_m2: Decimal::new(59, 0),
        year_built: Some(2012),
        address: Some("경기도 성남시 분당구".to_string()),
        floor: Some(9),
        total_floors: Some(18),
        difficulty: Some("normal".to_string()),
        auction_step: Some(2),
    }
}

pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Mortgage (base right), a lien, one senior and one junior tenant in Seoul.
pub fn raw_docs() -> CourtDocsRaw {
    CourtDocsRaw {
        case_number: Some("2024타경5678".to_string()),
        region: Some("서울".to_string()),
        base_right_date: d(2020, 5, 1),
        registered_rights: vec![
            RawRight {
                right_type: "근저당권".to_string(),
                date: d(2020, 5, 1),
                creditor: "OO은행".to_string(),
                amount: Decimal::new(150_000_000, 0),
            },
            RawRight {
                right_type: "유치권".to_string(),
                date: d(2022, 3, 2),
                creditor: "OO건설".to_string(),
                amount: Decimal::new(30_000_000, 0),
            },
        ],
        occupants: vec![
            RawOccupant {
                name: "senior".to_string(),
                move_in_date: d(2019, 1, 10),
                fixed_date: Some(d(2019, 1, 10)),
                deposit: Decimal::new(100_000_000, 0),
                monthly_rent: Decimal::ZERO,
                is_business: false,
            },
            RawOccupant {
                name: "junior".to_string(),
                move_in_date: d(2022, 1, 1),
                fixed_date: None,
                deposit: Decimal::new(200_000_000, 0),
                monthly_rent: Decimal::ZERO,
                is_business: false,
            },
        ],
    }
}

pub fn docs() -> CourtDocsNormalized {
    normalize_court_docs(&raw_docs(), Region::Seoul).unwrap()
}
