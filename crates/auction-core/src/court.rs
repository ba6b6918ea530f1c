//! Court document snapshots: registered rights and occupants.
//!
//! Normalization computes the legal-priority flags of every occupant against
//! the base right date and classifies every registered right into a closed
//! [`RightKind`]. Free text that matches no known right stays
//! [`RightKind::Unclassified`] so it can be audited downstream.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{Region, MAX_AMOUNT_WON};

/// Raw legal snapshot as produced by the scenario generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtDocsRaw {
    pub case_number: Option<String>,
    /// Region label used for the small-claim deposit threshold.
    pub region: Option<String>,
    /// Date of the right that extinguishes everything registered after it.
    pub base_right_date: NaiveDate,
    #[serde(default)]
    pub registered_rights: Vec<RawRight>,
    #[serde(default)]
    pub occupants: Vec<RawOccupant>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRight {
    #[serde(rename = "type")]
    pub right_type: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub creditor: String,
    #[serde(default)]
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOccupant {
    pub name: String,
    pub move_in_date: NaiveDate,
    pub fixed_date: Option<NaiveDate>,
    #[serde(default)]
    pub deposit: Decimal,
    #[serde(default)]
    pub monthly_rent: Decimal,
    #[serde(default)]
    pub is_business: bool,
}

/// Canonical registered-right type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RightKind {
    Mortgage,
    Seizure,
    ProvisionalRegistration,
    Injunction,
    /// Registered jeonse / lease right.
    LeaseRight,
    Lien,
    StatutorySurfaceRight,
    /// No keyword matched. Priced like a mortgage but never reported as one.
    Unclassified,
}

/// Ordered keyword table; the first match wins, so longer Korean terms
/// precede the shorter terms they contain.
const RIGHT_KEYWORDS: &[(&str, RightKind)] = &[
    ("근저당", RightKind::Mortgage),
    ("mortgage", RightKind::Mortgage),
    ("가압류", RightKind::Seizure),
    ("provisional seizure", RightKind::Seizure),
    ("압류", RightKind::Seizure),
    ("seizure", RightKind::Seizure),
    ("attachment", RightKind::Seizure),
    ("가등기", RightKind::ProvisionalRegistration),
    ("provisional registration", RightKind::ProvisionalRegistration),
    ("가처분", RightKind::Injunction),
    ("injunction", RightKind::Injunction),
    ("전세권", RightKind::LeaseRight),
    ("임차권", RightKind::LeaseRight),
    ("jeonse", RightKind::LeaseRight),
    ("lease", RightKind::LeaseRight),
    ("유치권", RightKind::Lien),
    ("lien", RightKind::Lien),
    ("법정지상권", RightKind::StatutorySurfaceRight),
    ("surface right", RightKind::StatutorySurfaceRight),
    ("저당", RightKind::Mortgage),
];

impl RightKind {
    pub fn classify(raw: &str) -> RightKind {
        let lowered = raw.trim().to_lowercase();
        RIGHT_KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, kind)| *kind)
            .unwrap_or(RightKind::Unclassified)
    }

    /// Rights a buyer takes over regardless of registration order.
    pub const fn always_survives_sale(self) -> bool {
        matches!(self, RightKind::Lien | RightKind::StatutorySurfaceRight)
    }

    /// Rights extinguished by the sale even when registered early.
    pub const fn extinguished_by_sale(self) -> bool {
        matches!(
            self,
            RightKind::Mortgage | RightKind::Seizure | RightKind::Unclassified
        )
    }
}

/// Three-level eviction difficulty per occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionRiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredRight {
    /// 1-based rank in document order.
    pub rank: u32,
    /// Original free-text type, kept for audit.
    pub right_type: String,
    pub kind: RightKind,
    pub date: NaiveDate,
    pub creditor: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupant {
    pub name: String,
    pub move_in_date: NaiveDate,
    pub fixed_date: Option<NaiveDate>,
    pub deposit: Decimal,
    pub monthly_rent: Decimal,
    pub is_business: bool,
    /// Moved in before the base right date.
    pub has_countervailing_power: bool,
    /// Fixed date stamped before the base right date.
    pub has_fixed_date: bool,
    pub is_small_claim_tenant: bool,
    pub eviction_risk_level: EvictionRiskLevel,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtDocsNormalized {
    pub case_number: Option<String>,
    pub region: Region,
    pub base_right_date: NaiveDate,
    pub rights: Vec<RegisteredRight>,
    pub occupants: Vec<Occupant>,
}

impl CourtDocsNormalized {
    pub fn unclassified_rights(&self) -> impl Iterator<Item = &RegisteredRight> {
        self.rights
            .iter()
            .filter(|r| r.kind == RightKind::Unclassified)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CourtDocsError {
    #[error("registered right #{rank} has a negative amount ({amount})")]
    NegativeAmount { rank: u32, amount: Decimal },
    #[error("occupant `{name}` has a negative deposit ({deposit})")]
    NegativeDeposit { name: String, deposit: Decimal },
    #[error("registered right #{rank} exceeds the amount cap ({amount})")]
    AmountOutOfRange { rank: u32, amount: Decimal },
    #[error("occupant `{name}` exceeds the deposit cap ({deposit})")]
    DepositOutOfRange { name: String, deposit: Decimal },
}

/// Deposit at or below which a tenant counts as a small-claim tenant.
pub fn small_claim_threshold(region: Region) -> Decimal {
    let won: i64 = match region {
        Region::Seoul => 165_000_000,
        Region::Overcrowded => 145_000_000,
        Region::Metropolitan => 85_000_000,
        Region::Other => 75_000_000,
    };
    Decimal::new(won, 0)
}

/// Classify rights and occupants of a raw snapshot.
///
/// `property_region` applies when the snapshot carries no region text of its
/// own, so small-claim thresholds follow the property being auctioned.
pub fn normalize_court_docs(
    raw: &CourtDocsRaw,
    property_region: Region,
) -> Result<CourtDocsNormalized, CourtDocsError> {
    let region = raw
        .region
        .as_deref()
        .map_or(property_region, Region::detect);
    let base = raw.base_right_date;
    let threshold = small_claim_threshold(region);

    let mut rights = Vec::with_capacity(raw.registered_rights.len());
    for (idx, right) in raw.registered_rights.iter().enumerate() {
        let rank = idx as u32 + 1;
        if right.amount < Decimal::ZERO {
            return Err(CourtDocsError::NegativeAmount {
                rank,
                amount: right.amount,
            });
        }
        if right.amount > MAX_AMOUNT_WON {
            return Err(CourtDocsError::AmountOutOfRange {
                rank,
                amount: right.amount,
            });
        }
        let kind = RightKind::classify(&right.right_type);
        if kind == RightKind::Unclassified {
            warn!(rank, right_type = %right.right_type, "registered right left unclassified");
        }
        rights.push(RegisteredRight {
            rank,
            right_type: right.right_type.clone(),
            kind,
            date: right.date,
            creditor: right.creditor.clone(),
            amount: right.amount,
        });
    }

    let mut occupants = Vec::with_capacity(raw.occupants.len());
    for occ in &raw.occupants {
        if occ.deposit < Decimal::ZERO {
            return Err(CourtDocsError::NegativeDeposit {
                name: occ.name.clone(),
                deposit: occ.deposit,
            });
        }
        if occ.deposit > MAX_AMOUNT_WON {
            return Err(CourtDocsError::DepositOutOfRange {
                name: occ.name.clone(),
                deposit: occ.deposit,
            });
        }
        let has_countervailing_power = occ.move_in_date < base;
        let has_fixed_date = occ.fixed_date.is_some_and(|d| d < base);
        let eviction_risk_level = if has_countervailing_power && has_fixed_date {
            EvictionRiskLevel::High
        } else if has_countervailing_power || occ.is_business {
            EvictionRiskLevel::Medium
        } else {
            EvictionRiskLevel::Low
        };
        occupants.push(Occupant {
            name: occ.name.clone(),
            move_in_date: occ.move_in_date,
            fixed_date: occ.fixed_date,
            deposit: occ.deposit,
            monthly_rent: occ.monthly_rent,
            is_business: occ.is_business,
            has_countervailing_power,
            has_fixed_date,
            is_small_claim_tenant: occ.deposit <= threshold,
            eviction_risk_level,
        });
    }

    debug!(
        rights = rights.len(),
        occupants = occupants.len(),
        ?region,
        "court documents normalized"
    );

    Ok(CourtDocsNormalized {
        case_number: raw.case_number.clone(),
        region,
        base_right_date: base,
        rights,
        occupants,
    })
}
