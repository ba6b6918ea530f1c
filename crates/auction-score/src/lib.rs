#![deny(warnings)]

//! Bidding-skill scoring for a played round.
//!
//! The score answers "how well did the player bid?", on a 0–1000 scale with
//! its own [`SkillGrade`]. It is deliberately separate from
//! [`auction_econ::InvestmentGrade`], which rates the property as a deal and
//! ignores the player's bid. The two can disagree for the same round.
//!
//! Three components add up to the final score:
//! - accuracy (0–400): distance of the bid from the recommended midpoint
//! - profitability (0–400): 12-month annualized ROI plus capped bonuses
//! - risk control (0–200): rights burden, eviction risk and eviction cost

pub mod level;

pub use level::{ExperienceTier, PlayerLevel};

use auction_econ::rights::{burden_ratio, eviction_cost_ratio};
use auction_econ::{guarded_ratio, AuctionAnalysisResult, BidRange, Profit, Rights};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const MAX_ACCURACY: f64 = 400.0;
pub const MAX_PROFITABILITY: f64 = 400.0;
pub const MAX_RISK_CONTROL: f64 = 200.0;
pub const MAX_FINAL: f64 = 1000.0;
/// Experience awarded per final-score point.
pub const EXP_RATE: f64 = 0.6;

/// 12-month annualized ROI → base profitability points, interpolated linearly.
const PROFIT_CURVE: [(f64, f64); 5] = [
    (0.0, 0.0),
    (0.10, 120.0),
    (0.20, 200.0),
    (0.35, 260.0),
    (0.50, 300.0),
];

/// Assumable-rights/FMV ratio at which the rights component reaches zero.
const BURDEN_CEILING: f64 = 0.30;
/// Eviction-cost/FMV ratio at which the eviction-cost component reaches zero.
const EVICTION_COST_CAP: f64 = 0.02;

/// Bidding-skill grade, banded on the final score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillGrade {
    S,
    A,
    B,
    C,
    D,
}

impl SkillGrade {
    pub fn from_final_score(score: f64) -> SkillGrade {
        if score >= 900.0 {
            SkillGrade::S
        } else if score >= 750.0 {
            SkillGrade::A
        } else if score >= 600.0 {
            SkillGrade::B
        } else if score >= 450.0 {
            SkillGrade::C
        } else {
            SkillGrade::D
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub accuracy_score: f64,
    pub profitability_score: f64,
    pub risk_control_score: f64,
    pub final_score: f64,
    pub grade: SkillGrade,
    pub exp_gain: u32,
}

/// Marker reported in place of a score that could not be computed.
pub const SCORE_UNAVAILABLE: &str = "score unavailable";

/// A computed score, or [`SCORE_UNAVAILABLE`] when scoring failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreReport {
    Scored(ScoreBreakdown),
    Unavailable(String),
}

impl ScoreReport {
    pub fn breakdown(&self) -> Option<&ScoreBreakdown> {
        match self {
            ScoreReport::Scored(b) => Some(b),
            ScoreReport::Unavailable(_) => None,
        }
    }
}

/// A finished analysis with its score attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredAnalysis {
    pub analysis: AuctionAnalysisResult,
    pub score: ScoreReport,
}

/// Attach a score to `analysis`. A scoring failure is logged and reported
/// as unavailable; the analysis is returned untouched either way.
pub fn score_analysis(analysis: AuctionAnalysisResult, user_bid: Decimal) -> ScoredAnalysis {
    let score = match calculate_score(&analysis, user_bid) {
        Ok(breakdown) => ScoreReport::Scored(breakdown),
        Err(e) => {
            warn!(error = %e, "score unavailable");
            ScoreReport::Unavailable(SCORE_UNAVAILABLE.to_string())
        }
    };
    ScoredAnalysis { analysis, score }
}

/// Inputs that would poison the score. The analysis itself stays valid.
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("bid must be >= 0 (got {0})")]
    NegativeBid(Decimal),
    #[error("non-finite {0}")]
    NonFinite(&'static str),
}

/// Score `user_bid` against a finished analysis.
pub fn calculate_score(
    result: &AuctionAnalysisResult,
    user_bid: Decimal,
) -> Result<ScoreBreakdown, ScoreError> {
    if user_bid < Decimal::ZERO {
        return Err(ScoreError::NegativeBid(user_bid));
    }
    finite("annualized roi", result.profit.scenarios.long.annualized_roi)?;
    finite("safety margin", result.profit.initial_safety_margin)?;
    finite("eviction risk", result.rights.eviction_risk)?;

    let accuracy_score = accuracy_score(user_bid, &result.valuation.recommended_bid_range);
    let profitability_score = profitability_score(&result.profit);
    let risk_control_score = risk_control_score(&result.rights, result.valuation.adjusted_fmv);

    let final_score =
        (accuracy_score + profitability_score + risk_control_score).clamp(0.0, MAX_FINAL);
    let grade = SkillGrade::from_final_score(final_score);
    let exp_gain = exp_for(final_score);

    debug!(
        accuracy_score,
        profitability_score, risk_control_score, final_score, ?grade, "round scored"
    );

    Ok(ScoreBreakdown {
        accuracy_score,
        profitability_score,
        risk_control_score,
        final_score,
        grade,
        exp_gain,
    })
}

fn finite(field: &'static str, value: f64) -> Result<(), ScoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScoreError::NonFinite(field))
    }
}

/// `400 × (1 − 2 × |bid − mid| / mid)`, floored at 0. No bid scores 0.
pub fn accuracy_score(bid: Decimal, range: &BidRange) -> f64 {
    let mid = range.midpoint();
    if bid.is_zero() || mid <= Decimal::ZERO {
        return 0.0;
    }
    let deviation = guarded_ratio((bid - mid).abs(), mid);
    (MAX_ACCURACY * (1.0 - 2.0 * deviation)).max(0.0)
}

/// Base curve on 12-month annualized ROI plus ROI, safety-margin and
/// breakeven bonuses, capped at 400.
pub fn profitability_score(profit: &Profit) -> f64 {
    let long = &profit.scenarios.long;
    let base = profit_curve(long.annualized_roi);
    let roi_bonus = (long.annualized_roi * 100.0).clamp(0.0, 50.0);
    let margin_bonus = (profit.initial_safety_margin * 100.0).clamp(0.0, 30.0);
    let breakeven_bonus =
        ((guarded_ratio(long.exit_price, long.breakeven_exit) - 1.0) * 100.0).clamp(0.0, 20.0);
    (base + roi_bonus + margin_bonus + breakeven_bonus).min(MAX_PROFITABILITY)
}

fn profit_curve(roi: f64) -> f64 {
    if roi <= PROFIT_CURVE[0].0 {
        return PROFIT_CURVE[0].1;
    }
    for pair in PROFIT_CURVE.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if roi <= x1 {
            return y0 + (y1 - y0) * (roi - x0) / (x1 - x0);
        }
    }
    PROFIT_CURVE[PROFIT_CURVE.len() - 1].1
}

/// Rights burden (0–120), eviction risk (0–50) and eviction cost (0–30).
pub fn risk_control_score(rights: &Rights, fmv: Decimal) -> f64 {
    let burden = 120.0 * (1.0 - burden_ratio(rights, fmv) / BURDEN_CEILING).max(0.0);
    let eviction = 50.0 * (1.0 - rights.eviction_risk_score() / 5.0).clamp(0.0, 1.0);
    let cost_ratio = eviction_cost_ratio(rights, fmv).clamp(0.0, EVICTION_COST_CAP);
    let cost = 30.0 * (1.0 - cost_ratio / EVICTION_COST_CAP);
    (burden + eviction + cost).min(MAX_RISK_CONTROL)
}

/// `round(final_score × 0.6)`.
pub fn exp_for(final_score: f64) -> u32 {
    (final_score.clamp(0.0, MAX_FINAL) * EXP_RATE).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_core::{Policy, PropertySeed};
    use auction_econ::{analyze, AnalysisInput};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal::prelude::ToPrimitive;

    fn analysis(bid: i64) -> AuctionAnalysisResult {
        let input = AnalysisInput {
            seed: PropertySeed {
                property_type: "apartment".into(),
                category: "residential".into(),
                size_m2: Decimal::new(84, 0),
                year_built: Some(2015),
                address: Some("부산광역시 해운대구".into()),
                floor: Some(10),
                total_floors: Some(25),
                difficulty: None,
                auction_step: Some(3),
            },
            court_docs: None,
            user_bid: Decimal::new(bid, 0),
            as_of: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        };
        analyze(&input, &Policy::default()).unwrap()
    }

    fn range(min: i64, max: i64) -> BidRange {
        BidRange {
            min: Decimal::new(min, 0),
            max: Decimal::new(max, 0),
        }
    }

    #[test]
    fn accuracy_peaks_at_midpoint() {
        let r = range(100, 300);
        assert_eq!(accuracy_score(Decimal::new(200, 0), &r), 400.0);
        assert!((accuracy_score(Decimal::new(220, 0), &r) - 320.0).abs() < 1e-9);
        assert_eq!(accuracy_score(Decimal::new(400, 0), &r), 0.0);
        assert_eq!(accuracy_score(Decimal::ZERO, &r), 0.0);
    }

    #[test]
    fn curve_interpolates_between_bands() {
        assert_eq!(profit_curve(-0.3), 0.0);
        assert_eq!(profit_curve(0.0), 0.0);
        assert!((profit_curve(0.05) - 60.0).abs() < 1e-9);
        assert!((profit_curve(0.10) - 120.0).abs() < 1e-9);
        assert!((profit_curve(0.275) - 230.0).abs() < 1e-9);
        assert_eq!(profit_curve(0.9), 300.0);
    }

    #[test]
    fn clean_title_gets_full_risk_control() {
        let score = risk_control_score(&Rights::default(), Decimal::new(100_000_000, 0));
        assert_eq!(score, 200.0);
    }

    #[test]
    fn heavy_burden_loses_rights_component() {
        let rights = Rights {
            assumable_rights_total: Decimal::new(40_000_000, 0),
            eviction_cost_estimated: Decimal::new(3_000_000, 0),
            eviction_risk: 1.0,
            ..Rights::default()
        };
        let score = risk_control_score(&rights, Decimal::new(100_000_000, 0));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn bid_at_midpoint_scores_well() {
        let base = analysis(0);
        let mid = base.valuation.recommended_bid_range.midpoint();
        let result = analysis(mid.to_i64().unwrap());
        let s = calculate_score(&result, mid).unwrap();
        assert_eq!(s.accuracy_score, 400.0);
        assert_eq!(s.risk_control_score, 200.0);
        assert_eq!(s.exp_gain, exp_for(s.final_score));
        assert_eq!(s.grade, SkillGrade::from_final_score(s.final_score));
    }

    #[test]
    fn negative_bid_is_rejected() {
        let result = analysis(0);
        assert_eq!(
            calculate_score(&result, Decimal::new(-1, 0)),
            Err(ScoreError::NegativeBid(Decimal::new(-1, 0)))
        );
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        let mut result = analysis(0);
        result.rights.eviction_risk = f64::NAN;
        assert_eq!(
            calculate_score(&result, Decimal::ONE),
            Err(ScoreError::NonFinite("eviction risk"))
        );
    }

    #[test]
    fn scoring_failure_keeps_the_analysis() {
        let result = analysis(0);
        let scored = score_analysis(result.clone(), Decimal::new(-1, 0));
        assert_eq!(scored.analysis, result);
        assert_eq!(
            scored.score,
            ScoreReport::Unavailable(SCORE_UNAVAILABLE.to_string())
        );
        assert!(scored.score.breakdown().is_none());

        let mut poisoned = analysis(0);
        poisoned.rights.eviction_risk = f64::NAN;
        let scored = score_analysis(poisoned.clone(), Decimal::ONE);
        assert!(scored.score.breakdown().is_none());
        assert!(scored.analysis.rights.eviction_risk.is_nan());
        assert_eq!(scored.analysis.valuation, poisoned.valuation);
        assert_eq!(scored.analysis.costs, poisoned.costs);
        assert_eq!(scored.analysis.summary, poisoned.summary);
    }

    #[test]
    fn scored_analysis_serializes_score_or_marker() {
        let result = analysis(0);
        let mid = result.valuation.recommended_bid_range.midpoint();
        let scored = score_analysis(result.clone(), mid);
        assert_eq!(scored.score.breakdown(), calculate_score(&result, mid).ok().as_ref());
        let json = serde_json::to_value(&scored).unwrap();
        assert!(json["score"]["finalScore"].is_number());
        assert!(json["analysis"]["valuation"].is_object());

        let failed = score_analysis(result, Decimal::new(-1, 0));
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["score"], SCORE_UNAVAILABLE);
        let back: ScoredAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(back, failed);
    }

    #[test]
    fn grade_bands() {
        assert_eq!(SkillGrade::from_final_score(1000.0), SkillGrade::S);
        assert_eq!(SkillGrade::from_final_score(900.0), SkillGrade::S);
        assert_eq!(SkillGrade::from_final_score(899.9), SkillGrade::A);
        assert_eq!(SkillGrade::from_final_score(600.0), SkillGrade::B);
        assert_eq!(SkillGrade::from_final_score(450.0), SkillGrade::C);
        assert_eq!(SkillGrade::from_final_score(0.0), SkillGrade::D);
    }

    proptest! {
        #[test]
        fn final_score_is_bounded(bid in 0i64..1_500_000_000) {
            let result = analysis(bid);
            let s = calculate_score(&result, Decimal::new(bid, 0)).unwrap();
            prop_assert!((0.0..=MAX_FINAL).contains(&s.final_score));
            prop_assert!((0.0..=MAX_ACCURACY).contains(&s.accuracy_score));
            prop_assert!((0.0..=MAX_PROFITABILITY).contains(&s.profitability_score));
            prop_assert!((0.0..=MAX_RISK_CONTROL).contains(&s.risk_control_score));
        }

        #[test]
        fn grade_is_monotonic(a in 0.0f64..=1000.0, b in 0.0f64..=1000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            // S sorts first, so a higher score never yields a later variant.
            prop_assert!(SkillGrade::from_final_score(hi) <= SkillGrade::from_final_score(lo));
        }
    }
}
