//! Versioned policy table and difficulty overlays.
//!
//! A [`Policy`] is plain immutable data passed explicitly into every stage.
//! Overlays are partial JSON trees merged key by key onto a base policy; keys
//! absent from an overlay keep the base value at every depth.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::{Difficulty, HorizonMap, PropertyType, MAX_AMOUNT_WON};

pub const POLICY_VERSION: &str = "2024.1";
/// Upper bound on synthetic rivals per round.
pub const MAX_COMPETITORS: usize = 16;
/// Upper bound on valuation multipliers.
pub const MAX_VALUATION_RATIO: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub version: String,
    pub valuation: ValuationPolicy,
    pub rights: RightsPolicy,
    pub cost: CostPolicy,
    pub profit: ProfitPolicy,
    pub competitor: CompetitorPolicy,
}

/// Ratio of fair-market value to appraisal, per property type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmvRateTable {
    pub apartment: Decimal,
    pub villa: Decimal,
    pub officetel: Decimal,
    pub detached_house: Decimal,
    pub commercial: Decimal,
    pub land: Decimal,
}

impl FmvRateTable {
    pub fn rate_for(&self, property_type: PropertyType) -> Decimal {
        match property_type {
            PropertyType::Apartment => self.apartment,
            PropertyType::Villa => self.villa,
            PropertyType::Officetel => self.officetel,
            PropertyType::DetachedHouse => self.detached_house,
            PropertyType::Commercial => self.commercial,
            PropertyType::Land => self.land,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPolicy {
    pub base_fmv_rate: FmvRateTable,
    pub clamp_min: Decimal,
    pub clamp_max: Decimal,
    pub initial_min_bid_rate: Decimal,
    /// Minimum-bid multiplier applied per failed round.
    pub reduction_factor: Decimal,
    /// Exit price as a fraction of adjusted FMV, per holding horizon.
    pub exit_ratio: HorizonMap<Decimal>,
    pub gap_min: Decimal,
    pub gap_max: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightsPolicy {
    pub eviction_base_cost: Decimal,
    pub risk_weight: Decimal,
    /// Flat payout for protected tenants; the deposit is used when unset.
    #[serde(default)]
    pub tenant_extra_payout: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostPolicy {
    pub acquisition_tax_rate: Decimal,
    pub legal_fees: Decimal,
    pub repair_rate: Decimal,
    pub ltv: Decimal,
    /// Annual loan interest rate.
    pub loan_rate: Decimal,
    pub holding_monthly_rate: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitPolicy {
    pub target_margin_rate: f64,
    pub target_annual_roi: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorPolicy {
    pub count: usize,
    /// Lower window edge as a fraction of the recommended minimum.
    pub window_low: Decimal,
    /// Upper window edge as a fraction of the recommended maximum.
    pub window_high: Decimal,
    pub bid_unit: Decimal,
    /// Bids above `recommended max × tolerance` count as overpaying.
    pub overpay_tolerance: Decimal,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            valuation: ValuationPolicy {
                base_fmv_rate: FmvRateTable {
                    apartment: Decimal::new(98, 2),
                    villa: Decimal::new(92, 2),
                    officetel: Decimal::new(95, 2),
                    detached_house: Decimal::new(93, 2),
                    commercial: Decimal::new(90, 2),
                    land: Decimal::new(88, 2),
                },
                clamp_min: Decimal::new(85, 2),
                clamp_max: Decimal::new(112, 2),
                initial_min_bid_rate: Decimal::new(7, 1),
                reduction_factor: Decimal::new(8, 1),
                exit_ratio: HorizonMap {
                    short: Decimal::new(96, 2),
                    medium: Decimal::new(98, 2),
                    long: Decimal::ONE,
                },
                gap_min: Decimal::new(75, 2),
                gap_max: Decimal::new(90, 2),
            },
            rights: RightsPolicy {
                eviction_base_cost: Decimal::new(3_000_000, 0),
                risk_weight: Decimal::new(1, 1),
                tenant_extra_payout: None,
            },
            cost: CostPolicy {
                acquisition_tax_rate: Decimal::new(11, 3),
                legal_fees: Decimal::new(1_500_000, 0),
                repair_rate: Decimal::new(2, 2),
                ltv: Decimal::new(7, 1),
                loan_rate: Decimal::new(55, 3),
                holding_monthly_rate: Decimal::new(1, 3),
            },
            profit: ProfitPolicy {
                target_margin_rate: 0.10,
                target_annual_roi: 0.15,
            },
            competitor: CompetitorPolicy {
                count: 4,
                window_low: Decimal::new(95, 2),
                window_high: Decimal::new(102, 2),
                bid_unit: Decimal::new(10_000, 0),
                overpay_tolerance: Decimal::new(11, 1),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy could not be encoded: {0}")]
    Encode(serde_json::Error),
    #[error("policy overlay does not fit the schema: {0}")]
    Decode(serde_json::Error),
    #[error("policy validation failed: {0}")]
    Invalid(String),
}

fn within_amount_cap(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount <= MAX_AMOUNT_WON
}

fn ensure(condition: bool, message: &str) -> Result<(), PolicyError> {
    if condition {
        Ok(())
    } else {
        Err(PolicyError::Invalid(message.to_string()))
    }
}

impl Policy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        let v = &self.valuation;
        let rates = &v.base_fmv_rate;
        ensure(
            [
                rates.apartment,
                rates.villa,
                rates.officetel,
                rates.detached_house,
                rates.commercial,
                rates.land,
            ]
            .iter()
            .all(|r| *r > Decimal::ZERO && *r <= MAX_VALUATION_RATIO),
            "valuation.baseFmvRate entries must be in (0, 10]",
        )?;
        ensure(
            v.clamp_min > Decimal::ZERO
                && v.clamp_min <= v.clamp_max
                && v.clamp_max <= MAX_VALUATION_RATIO,
            "valuation.clampMin must be > 0 and <= clampMax <= 10",
        )?;
        ensure(
            v.initial_min_bid_rate > Decimal::ZERO && v.initial_min_bid_rate <= Decimal::ONE,
            "valuation.initialMinBidRate must be in (0, 1]",
        )?;
        ensure(
            v.reduction_factor > Decimal::ZERO && v.reduction_factor <= Decimal::ONE,
            "valuation.reductionFactor must be in (0, 1]",
        )?;
        ensure(
            v.exit_ratio
                .iter()
                .all(|(_, r)| *r > Decimal::ZERO && *r <= MAX_VALUATION_RATIO),
            "valuation.exitRatio entries must be in (0, 10]",
        )?;
        ensure(
            v.gap_min > Decimal::ZERO && v.gap_min <= v.gap_max && v.gap_max <= MAX_VALUATION_RATIO,
            "valuation.gapMin must be > 0 and <= gapMax <= 10",
        )?;

        let r = &self.rights;
        ensure(
            within_amount_cap(r.eviction_base_cost),
            "rights.evictionBaseCost must be in [0, 10^15]",
        )?;
        ensure(
            r.risk_weight >= Decimal::ZERO && r.risk_weight <= Decimal::ONE,
            "rights.riskWeight must be in [0, 1]",
        )?;
        ensure(
            r.tenant_extra_payout.map_or(true, within_amount_cap),
            "rights.tenantExtraPayout must be in [0, 10^15]",
        )?;

        let c = &self.cost;
        ensure(
            [
                c.acquisition_tax_rate,
                c.repair_rate,
                c.loan_rate,
                c.holding_monthly_rate,
            ]
            .iter()
            .all(|x| *x >= Decimal::ZERO && *x <= Decimal::ONE),
            "cost rates must be in [0, 1]",
        )?;
        ensure(
            within_amount_cap(c.legal_fees),
            "cost.legalFees must be in [0, 10^15]",
        )?;
        ensure(
            c.ltv >= Decimal::ZERO && c.ltv <= Decimal::ONE,
            "cost.ltv must be in [0, 1]",
        )?;

        ensure(
            self.profit.target_margin_rate.is_finite() && self.profit.target_annual_roi.is_finite(),
            "profit targets must be finite",
        )?;

        let k = &self.competitor;
        ensure(
            k.count <= MAX_COMPETITORS,
            "competitor.count must be <= 16",
        )?;
        ensure(k.bid_unit > Decimal::ZERO, "competitor.bidUnit must be > 0")?;
        ensure(
            k.window_low > Decimal::ZERO && k.window_low <= k.window_high,
            "competitor.windowLow must be > 0 and <= windowHigh",
        )?;
        ensure(
            k.overpay_tolerance >= Decimal::ONE,
            "competitor.overpayTolerance must be >= 1",
        )?;
        // rivals drawn inside the window must never count as overpaying
        ensure(
            k.window_high <= k.overpay_tolerance,
            "competitor.windowHigh must be <= overpayTolerance",
        )?;
        Ok(())
    }
}

/// Recursively overlay `overlay` onto `target`. Objects merge key by key;
/// scalars and arrays replace the target value wholesale.
pub fn overlay_value(target: &mut Value, overlay: &Value) {
    match (target, overlay) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(key) {
                    Some(slot) => overlay_value(slot, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// Merge a partial overlay onto `base`, returning a new validated policy.
pub fn merge_policy(base: &Policy, overrides: &Value) -> Result<Policy, PolicyError> {
    let mut tree = serde_json::to_value(base).map_err(PolicyError::Encode)?;
    overlay_value(&mut tree, overrides);
    let merged: Policy = serde_json::from_value(tree).map_err(PolicyError::Decode)?;
    merged.validate()?;
    Ok(merged)
}

/// Overlays shipped with the engine.
pub fn builtin_overlays() -> BTreeMap<Difficulty, Value> {
    let mut overlays = BTreeMap::new();
    overlays.insert(
        Difficulty::Easy,
        json!({
            "competitor": { "count": 2, "windowLow": "0.90", "windowHigh": "0.97" },
            "rights": { "riskWeight": "0.08" }
        }),
    );
    overlays.insert(Difficulty::Normal, json!({}));
    overlays.insert(
        Difficulty::Hard,
        json!({
            "competitor": { "count": 6, "windowLow": "1.00", "windowHigh": "1.08" },
            "valuation": { "clampMax": "1.08" }
        }),
    );
    overlays
}

/// Base policy plus one overlay per difficulty.
#[derive(Clone, Debug)]
pub struct PolicyStore {
    base: Policy,
    overlays: BTreeMap<Difficulty, Value>,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self {
            base: Policy::default(),
            overlays: builtin_overlays(),
        }
    }
}

impl PolicyStore {
    /// A store with `base` and no overlays.
    pub fn new(base: Policy) -> Self {
        Self {
            base,
            overlays: BTreeMap::new(),
        }
    }

    pub fn base(&self) -> &Policy {
        &self.base
    }

    /// Replace the base with `overrides` merged onto it.
    pub fn with_base_overrides(mut self, overrides: &Value) -> Result<Self, PolicyError> {
        self.base = merge_policy(&self.base, overrides)?;
        Ok(self)
    }

    /// Register an overlay, layered on top of any overlay already present
    /// for the same difficulty.
    pub fn with_overlay(mut self, difficulty: Difficulty, overlay: Value) -> Self {
        match self.overlays.get_mut(&difficulty) {
            Some(existing) => overlay_value(existing, &overlay),
            None => {
                self.overlays.insert(difficulty, overlay);
            }
        }
        self
    }

    /// Merged policy for `difficulty`; the base alone when no overlay exists.
    pub fn for_difficulty(&self, difficulty: Difficulty) -> Result<Policy, PolicyError> {
        match self.overlays.get(&difficulty) {
            Some(overlay) => {
                debug!(difficulty = difficulty.as_str(), "merging policy overlay");
                merge_policy(&self.base, overlay)
            }
            None => Ok(self.base.clone()),
        }
    }
}
