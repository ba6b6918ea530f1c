#![deny(warnings)]

//! Competing bidders for a simulated auction round.
//!
//! Competitor bids are drawn from a [`RoundRng`] keyed by the property seed,
//! so replaying a round with the same seed and policy reproduces the same
//! bids and the same outcome.

pub mod rng;

pub use rng::{stream_key, RoundRng, BIDS_STREAM};

use std::collections::BTreeSet;

use auction_core::{Policy, PropertySeed};
use auction_econ::{AuctionAnalysisResult, Valuation};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("seed could not be hashed: {0}")]
    SeedEncode(#[from] serde_json::Error),
    #[error("bid window out of range: {low}..{high}")]
    Window { low: Decimal, high: Decimal },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundOutcome {
    Win,
    Lose,
    Overpay,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    /// Sorted descending.
    pub competitor_bids: Vec<Decimal>,
    pub user_bid: Decimal,
    pub outcome: RoundOutcome,
    /// Price the property sold at, `None` when nobody bid validly.
    pub winning_bid: Option<Decimal>,
    /// 1-based; ties rank behind competitors.
    pub user_rank: usize,
}

/// Draw `policy.competitor.count` distinct bids on the `bidUnit` grid.
///
/// The window is `[max(minBid, recMin × windowLow), recMax × windowHigh]`.
/// If the grid holds fewer slots than bidders it is widened upward.
pub fn generate_bids(
    seed: &PropertySeed,
    valuation: &Valuation,
    policy: &Policy,
) -> Result<Vec<Decimal>, SimError> {
    let c = &policy.competitor;
    if c.count == 0 {
        return Ok(Vec::new());
    }
    let unit = c.bid_unit;
    let range = valuation.recommended_bid_range;
    let low = valuation.min_bid.max(range.min * c.window_low);
    let high = range.max * c.window_high;

    let window_err = || SimError::Window { low, high };
    let lo = (low / unit).ceil().to_i64().ok_or_else(window_err)?;
    let hi = (high / unit).floor().to_i64().ok_or_else(window_err)?;
    let slots = c.count as i64;
    let hi = hi.max(lo + slots - 1);

    let mut rng = RoundRng::for_seed(BIDS_STREAM, seed)?;
    let mut drawn = BTreeSet::new();
    while drawn.len() < c.count {
        drawn.insert(rng.gen_range(lo..=hi));
    }
    let bids: Vec<Decimal> = drawn
        .into_iter()
        .rev()
        .map(|slot| Decimal::from(slot) * unit)
        .collect();

    debug!(count = bids.len(), %low, %high, "competitor bids drawn");
    Ok(bids)
}

/// Outcome of `user_bid` against already drawn competitor bids.
pub fn outcome_against(
    competitor_bids: &[Decimal],
    user_bid: Decimal,
    valuation: &Valuation,
    policy: &Policy,
) -> RoundOutcome {
    let ceiling = valuation.recommended_bid_range.max * policy.competitor.overpay_tolerance;
    if user_bid < valuation.min_bid {
        return RoundOutcome::Lose;
    }
    if user_bid > ceiling {
        return RoundOutcome::Overpay;
    }
    match competitor_bids.iter().max() {
        Some(top) if user_bid <= *top => RoundOutcome::Lose,
        _ => RoundOutcome::Win,
    }
}

pub fn determine_outcome(
    result: &AuctionAnalysisResult,
    user_bid: Decimal,
    seed: &PropertySeed,
    policy: &Policy,
) -> Result<RoundOutcome, SimError> {
    let bids = generate_bids(seed, &result.valuation, policy)?;
    Ok(outcome_against(&bids, user_bid, &result.valuation, policy))
}

/// Simulate the whole round: bids, outcome, sale price and the user's rank.
pub fn play_round(
    result: &AuctionAnalysisResult,
    user_bid: Decimal,
    seed: &PropertySeed,
    policy: &Policy,
) -> Result<RoundReport, SimError> {
    let competitor_bids = generate_bids(seed, &result.valuation, policy)?;
    let outcome = outcome_against(&competitor_bids, user_bid, &result.valuation, policy);
    let top = competitor_bids.first().copied();
    let winning_bid = match outcome {
        RoundOutcome::Win | RoundOutcome::Overpay => Some(user_bid),
        RoundOutcome::Lose => top,
    };
    let user_rank = 1 + competitor_bids.iter().filter(|b| **b >= user_bid).count();

    info!(
        ?outcome,
        %user_bid,
        competitors = competitor_bids.len(),
        user_rank,
        "round played"
    );

    Ok(RoundReport {
        competitor_bids,
        user_bid,
        outcome,
        winning_bid,
        user_rank,
    })
}
