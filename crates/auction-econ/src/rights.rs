//! Legal-liability assessment.
//!
//! Registered rights and occupants become breakdown lines, each with the
//! amount the buyer must take over and a 0–5 risk score. The totals feed the
//! eviction cost estimate and the 0–1 eviction risk.

use auction_core::{CourtDocsNormalized, Occupant, Policy, RegisteredRight, RightKind};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Eviction risk reported when documents exist but list nothing at all.
pub const RESIDUAL_EVICTION_RISK: f64 = 0.15;
/// Eviction risk above which [`RiskFlag::HighEvictionRisk`] is raised.
pub const HIGH_EVICTION_RISK: f64 = 0.6;
pub const MAX_LINE_RISK: u8 = 5;
const PROTECTED_TENANT_RISK: u8 = 5;
const UNPROTECTED_TENANT_RISK: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    Right(RightKind),
    Tenant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightLine {
    pub label: String,
    #[serde(rename = "type")]
    pub line_type: LineType,
    /// The buyer takes the line over.
    pub inheritable: bool,
    pub payout: Decimal,
    /// 0 (harmless) to 5 (severe).
    pub risk: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum RiskFlag {
    HighEvictionRisk,
    LienClaimed,
    StatutorySurfaceRight,
    /// A registered right whose type text matched no known right.
    UnclassifiedRight { rank: u32, raw: String },
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskFlag::HighEvictionRisk => write!(f, "high eviction risk"),
            RiskFlag::LienClaimed => write!(f, "lien claimed"),
            RiskFlag::StatutorySurfaceRight => write!(f, "statutory surface right"),
            RiskFlag::UnclassifiedRight { rank, raw } => {
                write!(f, "unclassified right #{rank}: {raw}")
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rights {
    pub assumable_rights_total: Decimal,
    pub eviction_cost_estimated: Decimal,
    /// 0–1.
    pub eviction_risk: f64,
    pub risk_flags: Vec<RiskFlag>,
    pub breakdown: Vec<RightLine>,
}

impl Rights {
    /// Eviction risk on the 0–5 line scale.
    pub fn eviction_risk_score(&self) -> f64 {
        self.eviction_risk * f64::from(MAX_LINE_RISK)
    }

    pub fn has_flag(&self, flag: &RiskFlag) -> bool {
        self.risk_flags.contains(flag)
    }
}

/// Assess legal liabilities. Without documents the result is all zero.
pub fn evaluate_rights(docs: Option<&CourtDocsNormalized>, policy: &Policy) -> Rights {
    let Some(docs) = docs else {
        return Rights::default();
    };

    let mut breakdown = Vec::with_capacity(docs.rights.len() + docs.occupants.len());
    let mut risk_flags = Vec::new();
    for right in &docs.rights {
        if right.kind == RightKind::Unclassified {
            warn!(
                rank = right.rank,
                raw = %right.right_type,
                "unclassified right priced as an extinguished mortgage"
            );
            risk_flags.push(RiskFlag::UnclassifiedRight {
                rank: right.rank,
                raw: right.right_type.clone(),
            });
        }
        breakdown.push(registered_line(right, docs));
    }
    for occupant in &docs.occupants {
        breakdown.push(tenant_line(occupant, policy));
    }

    let assumable_rights_total: Decimal = breakdown.iter().map(|l| l.payout).sum();
    let risk_sum: u32 = breakdown.iter().map(|l| u32::from(l.risk)).sum();
    let tenant_count = docs.occupants.len() as u32;

    let r = &policy.rights;
    let multiplier = Decimal::ONE
        + Decimal::from(risk_sum) * r.risk_weight
        + Decimal::from(tenant_count) * Decimal::new(4, 1);
    let eviction_cost_estimated = (r.eviction_base_cost * multiplier).round();

    let eviction_risk = if breakdown.is_empty() {
        RESIDUAL_EVICTION_RISK
    } else {
        let avg = f64::from(risk_sum) / breakdown.len() as f64;
        (avg / f64::from(MAX_LINE_RISK)).clamp(0.0, 1.0)
    };

    if eviction_risk > HIGH_EVICTION_RISK {
        risk_flags.push(RiskFlag::HighEvictionRisk);
    }
    if has_line(&breakdown, RightKind::Lien) {
        risk_flags.push(RiskFlag::LienClaimed);
    }
    if has_line(&breakdown, RightKind::StatutorySurfaceRight) {
        risk_flags.push(RiskFlag::StatutorySurfaceRight);
    }

    debug!(
        %assumable_rights_total,
        %eviction_cost_estimated,
        eviction_risk,
        lines = breakdown.len(),
        "rights assessed"
    );

    Rights {
        assumable_rights_total,
        eviction_cost_estimated,
        eviction_risk,
        risk_flags,
        breakdown,
    }
}

fn has_line(lines: &[RightLine], kind: RightKind) -> bool {
    lines
        .iter()
        .any(|l| l.line_type == LineType::Right(kind))
}

fn registered_line(right: &RegisteredRight, docs: &CourtDocsNormalized) -> RightLine {
    let senior = right.date < docs.base_right_date;
    let inheritable = right.kind.always_survives_sale()
        || (senior && !right.kind.extinguished_by_sale());
    let risk = match right.kind {
        RightKind::Mortgage | RightKind::Seizure | RightKind::Unclassified => 1,
        RightKind::ProvisionalRegistration | RightKind::Injunction if inheritable => 4,
        RightKind::ProvisionalRegistration | RightKind::Injunction => 2,
        RightKind::LeaseRight if inheritable => 3,
        RightKind::LeaseRight => 1,
        RightKind::Lien | RightKind::StatutorySurfaceRight => 5,
    };
    RightLine {
        label: format!("#{} {} ({})", right.rank, right.right_type, right.creditor),
        line_type: LineType::Right(right.kind),
        inheritable,
        payout: if inheritable {
            right.amount
        } else {
            Decimal::ZERO
        },
        risk,
    }
}

fn tenant_line(occupant: &Occupant, policy: &Policy) -> RightLine {
    let protected = occupant.has_countervailing_power || occupant.is_small_claim_tenant;
    let (payout, risk) = if protected {
        let payout = policy
            .rights
            .tenant_extra_payout
            .unwrap_or(occupant.deposit);
        (payout, PROTECTED_TENANT_RISK)
    } else {
        (Decimal::ZERO, UNPROTECTED_TENANT_RISK)
    };
    RightLine {
        label: format!("tenant {}", occupant.name),
        line_type: LineType::Tenant,
        inheritable: protected,
        payout,
        risk,
    }
}

/// Eviction cost as a fraction of `fmv`, used by scoring.
pub fn eviction_cost_ratio(rights: &Rights, fmv: Decimal) -> f64 {
    if fmv <= Decimal::ZERO {
        return 0.0;
    }
    let ratio = rights.eviction_cost_estimated / fmv;
    ratio.to_f64().unwrap_or(0.0)
}

/// Assumable rights as a fraction of `fmv`, used by scoring.
pub fn burden_ratio(rights: &Rights, fmv: Decimal) -> f64 {
    if fmv <= Decimal::ZERO {
        return 0.0;
    }
    (rights.assumable_rights_total / fmv).to_f64().unwrap_or(0.0)
}
