//! Per-horizon profit projections.

use auction_core::{Horizon, HorizonMap, Policy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{guarded_ratio, Costs, Valuation};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitScenario {
    pub months: u32,
    pub exit_price: Decimal,
    pub total_cost: Decimal,
    /// `exit_price − total_cost`.
    pub net_profit: Decimal,
    /// Exit price at which this horizon breaks even.
    pub breakeven_exit: Decimal,
    /// Net profit over owner cash.
    pub roi: f64,
    pub annualized_roi: f64,
    pub projected_profit_margin: f64,
    pub meets_target_margin: bool,
    pub meets_target_roi: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profit {
    /// `(FMV − total acquisition) / FMV`.
    pub initial_safety_margin: f64,
    /// Total acquisition cost: the exit price that recovers the purchase alone.
    pub breakeven_exit: Decimal,
    #[serde(flatten)]
    pub scenarios: HorizonMap<ProfitScenario>,
}

impl Profit {
    /// Scenario with the highest ROI; ties go to the shorter horizon.
    pub fn best_horizon(&self) -> Horizon {
        let mut best = Horizon::Short;
        for (horizon, scenario) in self.scenarios.iter() {
            if scenario.roi > self.scenarios[best].roi {
                best = horizon;
            }
        }
        best
    }
}

pub fn evaluate_profit(valuation: &Valuation, costs: &Costs, policy: &Policy) -> Profit {
    let fmv = valuation.adjusted_fmv;
    let acquisition_total = costs.acquisition.total;
    let initial_safety_margin = guarded_ratio(fmv - acquisition_total, fmv);

    let scenarios = HorizonMap::from_fn(|h| {
        scenario(
            h,
            valuation.exit_prices[h],
            costs.horizons[h].total_cost,
            costs.acquisition.own_cash,
            policy,
        )
    });

    debug!(
        initial_safety_margin,
        roi_12m = scenarios.long.roi,
        "profit projected"
    );

    Profit {
        initial_safety_margin,
        breakeven_exit: acquisition_total,
        scenarios,
    }
}

fn scenario(
    horizon: Horizon,
    exit_price: Decimal,
    total_cost: Decimal,
    own_cash: Decimal,
    policy: &Policy,
) -> ProfitScenario {
    let net_profit = exit_price - total_cost;
    let roi = guarded_ratio(net_profit, own_cash);
    let annualized_roi = annualize(roi, horizon.months());
    let projected_profit_margin = guarded_ratio(net_profit, exit_price);
    ProfitScenario {
        months: horizon.months(),
        exit_price,
        total_cost,
        net_profit,
        breakeven_exit: total_cost,
        roi,
        annualized_roi,
        projected_profit_margin,
        meets_target_margin: projected_profit_margin >= policy.profit.target_margin_rate,
        meets_target_roi: annualized_roi >= policy.profit.target_annual_roi,
    }
}

/// `(1 + roi)^(12 / months) − 1`. A loss of the whole stake or more
/// annualizes to −1.
pub fn annualize(roi: f64, months: u32) -> f64 {
    let growth = 1.0 + roi;
    if growth <= 0.0 || months == 0 {
        return -1.0;
    }
    growth.powf(12.0 / f64::from(months)) - 1.0
}
