//! The analysis pipeline.

use auction_core::{
    normalize_court_docs, normalize_property, CourtDocsError, CourtDocsNormalized, CourtDocsRaw,
    Policy, PolicyError, PolicyStore, Property, PropertySeed, SeedError, MAX_AMOUNT_WON,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    evaluate_costs, evaluate_profit, evaluate_rights, evaluate_valuation, summarize,
    AuctionSummary, Costs, Profit, Rights, Valuation,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    pub seed: PropertySeed,
    pub court_docs: Option<CourtDocsRaw>,
    /// Zero means no bid has been placed yet.
    #[serde(default)]
    pub user_bid: Decimal,
    /// Anchors building age and the summary timestamp.
    pub as_of: DateTime<Utc>,
}

/// Self-contained analysis of one round, safe to persist verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionAnalysisResult {
    pub property: Property,
    pub valuation: Valuation,
    pub rights: Rights,
    /// Bid the costs and profit were computed for.
    pub cost_basis_bid: Decimal,
    pub costs: Costs,
    pub profit: Profit,
    pub court_docs: Option<CourtDocsNormalized>,
    pub summary: AuctionSummary,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid seed: {0}")]
    InvalidSeed(#[from] SeedError),
    #[error("invalid court documents: {0}")]
    CourtDocs(#[from] CourtDocsError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("bid must be >= 0 (got {0})")]
    NegativeBid(Decimal),
    #[error("bid must be <= {max} (got {bid})")]
    BidOutOfRange { bid: Decimal, max: Decimal },
}

/// Run the full pipeline under an explicit policy.
pub fn analyze(input: &AnalysisInput, policy: &Policy) -> Result<AuctionAnalysisResult, AnalysisError> {
    let property = normalize_property(&input.seed, input.as_of.date_naive())?;
    run(property, input, policy)
}

/// Run the full pipeline under the store's policy for the seed's difficulty.
pub fn analyze_with_store(
    input: &AnalysisInput,
    store: &PolicyStore,
) -> Result<(Policy, AuctionAnalysisResult), AnalysisError> {
    let property = normalize_property(&input.seed, input.as_of.date_naive())?;
    let policy = store.for_difficulty(property.difficulty)?;
    let result = run(property, input, &policy)?;
    Ok((policy, result))
}

fn run(
    property: Property,
    input: &AnalysisInput,
    policy: &Policy,
) -> Result<AuctionAnalysisResult, AnalysisError> {
    if input.user_bid < Decimal::ZERO {
        return Err(AnalysisError::NegativeBid(input.user_bid));
    }
    if input.user_bid > MAX_AMOUNT_WON {
        return Err(AnalysisError::BidOutOfRange {
            bid: input.user_bid,
            max: MAX_AMOUNT_WON,
        });
    }
    let court_docs = input
        .court_docs
        .as_ref()
        .map(|raw| normalize_court_docs(raw, property.region))
        .transpose()?;

    let valuation = evaluate_valuation(&property, policy);
    let rights = evaluate_rights(court_docs.as_ref(), policy);
    let cost_basis_bid = if input.user_bid.is_zero() {
        valuation.min_bid
    } else {
        input.user_bid
    };
    let costs = evaluate_costs(&property, &rights, cost_basis_bid, policy);
    let profit = evaluate_profit(&valuation, &costs, policy);
    let summary = summarize(&valuation, &rights, &profit, input.as_of);

    info!(
        difficulty = property.difficulty.as_str(),
        grade = ?summary.grade,
        risk = ?summary.risk_label,
        best_horizon = summary.best_horizon.label(),
        "auction analysis complete"
    );

    Ok(AuctionAnalysisResult {
        property,
        valuation,
        rights,
        cost_basis_bid,
        costs,
        profit,
        court_docs,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{as_of, raw_docs, seed};
    use crate::RiskFlag;
    use auction_core::{Difficulty, Horizon};

    fn input(bid: i64, with_docs: bool) -> AnalysisInput {
        AnalysisInput {
            seed: seed(),
            court_docs: with_docs.then(raw_docs),
            user_bid: Decimal::new(bid, 0),
            as_of: as_of(),
        }
    }

    #[test]
    fn full_pipeline_is_internally_consistent() {
        let result = analyze(&input(0, true), &Policy::default()).unwrap();
        assert_eq!(result.cost_basis_bid, result.valuation.min_bid);
        assert_eq!(result.costs.acquisition.bid, result.valuation.min_bid);
        assert_eq!(
            result.costs.acquisition.assumable_rights,
            result.rights.assumable_rights_total
        );
        for h in Horizon::ALL {
            let c = &result.costs.horizons[h];
            let s = &result.profit.scenarios[h];
            assert_eq!(
                c.total_cost,
                result.costs.acquisition.total + c.holding_cost + c.interest_cost
            );
            assert_eq!(s.net_profit, result.valuation.exit_prices[h] - c.total_cost);
        }
        assert!(result.court_docs.is_some());
        assert!(result.rights.has_flag(&RiskFlag::LienClaimed));
        assert_eq!(result.summary.generated_at, as_of());
        assert_eq!(
            result.summary.recommended_range,
            result.valuation.recommended_bid_range
        );
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let a = analyze(&input(250_000_000, true), &Policy::default()).unwrap();
        let b = analyze(&input(250_000_000, true), &Policy::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn missing_documents_give_zero_rights() {
        let result = analyze(&input(0, false), &Policy::default()).unwrap();
        assert_eq!(result.rights, Rights::default());
        assert!(result.court_docs.is_none());
    }

    #[test]
    fn invalid_seed_aborts_without_result() {
        let mut i = input(0, true);
        i.seed.size_m2 = Decimal::new(-5, 0);
        let err = analyze(&i, &Policy::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSeed(SeedError::NonPositiveSize(_))));
    }

    #[test]
    fn negative_bid_is_rejected() {
        let err = analyze(&input(-1, false), &Policy::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::NegativeBid(_)));
    }

    #[test]
    fn extreme_inputs_are_errors_not_panics() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(20), 0);
        let mut i = input(0, false);
        i.user_bid = huge;
        let err = analyze(&i, &Policy::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::BidOutOfRange { .. }));

        let mut i = input(0, false);
        i.seed.size_m2 = Decimal::from_i128_with_scale(10_i128.pow(22), 0);
        let err = analyze(&i, &Policy::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSeed(SeedError::SizeOutOfRange { .. })));

        let mut i = input(0, true);
        if let Some(docs) = i.court_docs.as_mut() {
            docs.registered_rights[0].amount = huge;
        }
        let err = analyze(&i, &Policy::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::CourtDocs(CourtDocsError::AmountOutOfRange { rank: 1, .. })
        ));
    }

    #[test]
    fn largest_accepted_inputs_still_analyze() {
        let mut i = input(0, false);
        i.seed.size_m2 = auction_core::MAX_SIZE_M2;
        i.user_bid = MAX_AMOUNT_WON;
        let result = analyze(&i, &Policy::default()).unwrap();
        assert_eq!(result.cost_basis_bid, MAX_AMOUNT_WON);
        assert!(result.costs.horizons[Horizon::Long].total_cost > MAX_AMOUNT_WON);
    }

    #[test]
    fn documents_without_region_use_the_property_region() {
        let mut i = input(0, true);
        if let Some(docs) = i.court_docs.as_mut() {
            docs.region = None;
        }
        let result = analyze(&i, &Policy::default()).unwrap();
        let docs = result.court_docs.as_ref().unwrap();
        assert_eq!(docs.region, result.property.region);
    }

    #[test]
    fn store_selects_policy_by_difficulty() {
        let mut i = input(0, false);
        i.seed.difficulty = Some("hard".to_string());
        let (policy, result) = analyze_with_store(&i, &PolicyStore::default()).unwrap();
        assert_eq!(policy.competitor.count, 6);
        assert_eq!(result.property.difficulty, Difficulty::Hard);
    }

    #[test]
    fn shipped_scenario_analyzes() {
        let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/scenarios");
        let read = |name: &str| std::fs::read_to_string(dir.join(name)).unwrap();
        let input = AnalysisInput {
            seed: serde_json::from_str(&read("bundang-apartment.seed.json")).unwrap(),
            court_docs: Some(serde_json::from_str(&read("bundang-apartment.docs.json")).unwrap()),
            user_bid: Decimal::new(610_000_000, 0),
            as_of: as_of(),
        };
        let (_, result) = analyze_with_store(&input, &PolicyStore::default()).unwrap();
        let docs = result.court_docs.as_ref().unwrap();
        assert_eq!(docs.rights.len(), 3);
        assert_eq!(docs.unclassified_rights().count(), 0);
        assert_eq!(result.property.auction_step, 2);
        assert_eq!(result.cost_basis_bid, Decimal::new(610_000_000, 0));
    }

    #[test]
    fn result_roundtrips_through_json() {
        let result = analyze(&input(300_000_000, true), &Policy::default()).unwrap();
        let text = serde_json::to_string(&result).unwrap();
        let back: AuctionAnalysisResult = serde_json::from_str(&text).unwrap();
        assert_eq!(back, result);
    }
}
