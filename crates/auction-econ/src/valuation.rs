//! Fair-market value, minimum bid, exit prices and the recommended bid range.

use auction_core::{HorizonMap, Policy, Property};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::BidRange;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub appraisal_value: Decimal,
    pub base_fmv: Decimal,
    /// `base_fmv` clamped into `[appraisal × clampMin, appraisal × clampMax]`.
    pub adjusted_fmv: Decimal,
    pub min_bid: Decimal,
    pub exit_prices: HorizonMap<Decimal>,
    pub recommended_bid_range: BidRange,
}

/// Value a normalized property under `policy`.
///
/// Exit prices scale the adjusted FMV by `valuation.exitRatio` per horizon
/// (0.96 / 0.98 / 1.00 by default).
pub fn evaluate_valuation(property: &Property, policy: &Policy) -> Valuation {
    let v = &policy.valuation;
    let appraisal = property.appraisal_value;

    let base_fmv = appraisal * v.base_fmv_rate.rate_for(property.property_type);
    let floor = appraisal * v.clamp_min;
    let ceiling = appraisal * v.clamp_max;
    let adjusted_fmv = base_fmv.max(floor).min(ceiling);

    let min_bid = min_bid_for_step(appraisal, property.auction_step, policy);

    let exit_prices = HorizonMap::from_fn(|h| adjusted_fmv * v.exit_ratio[h]);
    let recommended_bid_range = BidRange {
        min: adjusted_fmv * v.gap_min,
        max: adjusted_fmv * v.gap_max,
    };

    debug!(%appraisal, %adjusted_fmv, %min_bid, "valuation computed");

    Valuation {
        appraisal_value: appraisal,
        base_fmv,
        adjusted_fmv,
        min_bid,
        exit_prices,
        recommended_bid_range,
    }
}

/// `appraisal × initialMinBidRate × reductionFactor^(step − 1)`, rounded to the won.
pub fn min_bid_for_step(appraisal: Decimal, auction_step: u8, policy: &Policy) -> Decimal {
    let v = &policy.valuation;
    let failed_rounds = i64::from(auction_step.max(1) - 1);
    (appraisal * v.initial_min_bid_rate * v.reduction_factor.powi(failed_rounds)).round()
}
