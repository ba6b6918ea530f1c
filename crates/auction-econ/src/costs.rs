//! Acquisition, financing and holding costs for a given bid.

use auction_core::{Horizon, HorizonMap, Policy, Property};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Rights;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionCosts {
    pub bid: Decimal,
    pub assumable_rights: Decimal,
    pub taxes: Decimal,
    pub legal_fees: Decimal,
    pub repair_cost: Decimal,
    pub eviction_cost: Decimal,
    pub total: Decimal,
    pub loan_principal: Decimal,
    /// Cash the buyer puts in: `max(0, total − loan)`.
    pub own_cash: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonCost {
    pub months: u32,
    pub holding_cost: Decimal,
    pub interest_cost: Decimal,
    /// `acquisition.total + holding_cost + interest_cost`.
    pub total_cost: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Costs {
    pub acquisition: AcquisitionCosts,
    #[serde(flatten)]
    pub horizons: HorizonMap<HorizonCost>,
}

pub fn evaluate_costs(property: &Property, rights: &Rights, bid: Decimal, policy: &Policy) -> Costs {
    let c = &policy.cost;
    let taxes = bid * c.acquisition_tax_rate;
    let legal_fees = c.legal_fees;
    let repair_cost = property.appraisal_value * c.repair_rate;
    let eviction_cost = rights.eviction_cost_estimated;
    let assumable_rights = rights.assumable_rights_total;
    let total = bid + assumable_rights + taxes + legal_fees + repair_cost + eviction_cost;
    let loan_principal = (bid * c.ltv).min(bid);
    let own_cash = (total - loan_principal).max(Decimal::ZERO);

    let acquisition = AcquisitionCosts {
        bid,
        assumable_rights,
        taxes,
        legal_fees,
        repair_cost,
        eviction_cost,
        total,
        loan_principal,
        own_cash,
    };
    let horizons = HorizonMap::from_fn(|h| horizon_cost(&acquisition, h, policy));

    debug!(%bid, %total, %own_cash, "costs computed");

    Costs {
        acquisition,
        horizons,
    }
}

fn horizon_cost(acquisition: &AcquisitionCosts, horizon: Horizon, policy: &Policy) -> HorizonCost {
    let c = &policy.cost;
    let months = Decimal::from(horizon.months());
    let holding_cost = acquisition.bid * c.holding_monthly_rate * months;
    let interest_cost = acquisition.loan_principal * c.loan_rate * months / Decimal::from(12);
    HorizonCost {
        months: horizon.months(),
        holding_cost,
        interest_cost,
        total_cost: acquisition.total + holding_cost + interest_cost,
    }
}
