//! Outcome grading: how good is this property as an investment?
//!
//! The [`InvestmentGrade`] rates the deal itself from its 12-month annualized
//! ROI. It is independent of how well the player bid; bidding skill is graded
//! separately by the score calculator.

use auction_core::Horizon;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BidRange, Profit, Rights, Valuation};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InvestmentGrade {
    S,
    A,
    B,
    C,
    D,
}

impl InvestmentGrade {
    pub fn from_annualized_roi(annualized_roi: f64) -> InvestmentGrade {
        if annualized_roi >= 0.5 {
            InvestmentGrade::S
        } else if annualized_roi >= 0.35 {
            InvestmentGrade::A
        } else if annualized_roi >= 0.2 {
            InvestmentGrade::B
        } else if annualized_roi >= 0.1 {
            InvestmentGrade::C
        } else {
            InvestmentGrade::D
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
    High,
    Medium,
    Safe,
}

impl RiskLabel {
    pub fn from_eviction_risk(eviction_risk: f64) -> RiskLabel {
        if eviction_risk >= 0.6 {
            RiskLabel::High
        } else if eviction_risk >= 0.3 {
            RiskLabel::Medium
        } else {
            RiskLabel::Safe
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionSummary {
    pub grade: InvestmentGrade,
    pub risk_label: RiskLabel,
    pub recommended_range: BidRange,
    pub best_horizon: Horizon,
    pub generated_at: DateTime<Utc>,
}

pub fn summarize(
    valuation: &Valuation,
    rights: &Rights,
    profit: &Profit,
    generated_at: DateTime<Utc>,
) -> AuctionSummary {
    AuctionSummary {
        grade: InvestmentGrade::from_annualized_roi(profit.scenarios.long.annualized_roi),
        risk_label: RiskLabel::from_eviction_risk(rights.eviction_risk),
        recommended_range: valuation.recommended_bid_range,
        best_horizon: profit.best_horizon(),
        generated_at,
    }
}
