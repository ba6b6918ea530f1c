#![deny(warnings)]

//! Auction analysis engine: valuation, rights, costs and profit models.
//!
//! Every stage is a pure function of its inputs and an explicit
//! [`auction_core::Policy`]. The [`engine::analyze`] pipeline chains them into
//! one self-contained [`engine::AuctionAnalysisResult`]:
//!
//! property → valuation → (court docs → rights) → costs → profit → summary

pub mod costs;
pub mod engine;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod grade;
pub mod profit;
pub mod rights;
pub mod valuation;

pub use costs::{evaluate_costs, AcquisitionCosts, Costs, HorizonCost};
pub use engine::{analyze, analyze_with_store, AnalysisError, AnalysisInput, AuctionAnalysisResult};
pub use grade::{summarize, AuctionSummary, InvestmentGrade, RiskLabel};
pub use profit::{evaluate_profit, Profit, ProfitScenario};
pub use rights::{evaluate_rights, LineType, RightLine, Rights, RiskFlag};
pub use valuation::{evaluate_valuation, Valuation};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Smallest denominator used in ratios, in won.
pub const EPSILON_WON: Decimal = Decimal::ONE;

/// Inclusive bid range in won.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl BidRange {
    pub fn midpoint(&self) -> Decimal {
        (self.min + self.max) / Decimal::TWO
    }
}

/// `numerator / max(denominator, 1 won)` as a float.
pub fn guarded_ratio(numerator: Decimal, denominator: Decimal) -> f64 {
    let num = numerator.to_f64().unwrap_or(0.0);
    let den = denominator.max(EPSILON_WON).to_f64().unwrap_or(1.0);
    num / den
}
