//! Inventory planning helpers: consumption rate, coverage, EOQ and
//! purchase affordability checks. Pure calculations used by the runner
//! and by student-facing tooling; nothing here writes to the store.

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::store::SimStore;
use crate::types::{Day, FirmId, ProductId};

/// Average units consumed per day over a fulfilled-sales history.
pub fn average_daily_consumption(history: &[(Day, f64)]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    history.iter().map(|(_, qty)| qty).sum::<f64>() / history.len() as f64
}

/// Days of coverage the current stock gives at the observed consumption
/// rate. Infinite when nothing is being consumed.
pub fn coverage_days(on_hand: f64, daily_consumption: f64) -> f64 {
    if daily_consumption > 0.0 {
        on_hand / daily_consumption
    } else {
        f64::INFINITY
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EoqPlan {
    pub eoq: f64,
    pub reorder_point: f64,
    pub daily_demand: f64,
}

/// Classic economic order quantity with a lead-time reorder point plus
/// safety stock. `annual_demand` in units, `order_cost` per order,
/// `holding_cost` per unit per year.
pub fn eoq_plan(
    annual_demand: f64,
    order_cost: f64,
    holding_cost: f64,
    lead_time_days: Day,
    safety_stock: f64,
) -> EoqPlan {
    let daily_demand = annual_demand / 365.0;
    let eoq = if holding_cost > 0.0 {
        (2.0 * annual_demand * order_cost / holding_cost).sqrt()
    } else {
        0.0
    };
    EoqPlan {
        eoq,
        reorder_point: daily_demand * lead_time_days as f64 + safety_stock,
        daily_demand,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseCheck {
    pub can_buy: bool,
    pub total_cost: f64,
    pub free_capital: f64,
    pub deficit: f64,
    pub capital_use_pct: f64,
}

/// Affordability check for a prospective order against free capital
/// (capital minus the value already committed to in-transit orders).
pub fn validate_purchase(capital: f64, committed: f64, qty: f64, unit_cost: f64) -> PurchaseCheck {
    let total_cost = qty * unit_cost;
    let free_capital = capital - committed;
    let can_buy = total_cost <= free_capital;
    PurchaseCheck {
        can_buy,
        total_cost,
        free_capital,
        deficit: if can_buy { 0.0 } else { total_cost - free_capital },
        capital_use_pct: if free_capital > 0.0 {
            total_cost / free_capital * 100.0
        } else {
            0.0
        },
    }
}

/// Coverage report for one (firm, product) based on recent sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub product_id: ProductId,
    pub on_hand: f64,
    pub daily_consumption: f64,
    pub coverage_days: f64,
}

/// Compute stock coverage from the last `lookback_days` of fulfilled
/// sales. Missing inventory reads as zero stock with zero consumption.
pub fn stock_coverage(
    store: &SimStore,
    firm_id: FirmId,
    product_id: ProductId,
    up_to_day: Day,
    lookback_days: Day,
) -> SimResult<CoverageReport> {
    let history = store.daily_fulfilled_history(firm_id, product_id, up_to_day, lookback_days)?;
    let daily = average_daily_consumption(&history);
    let on_hand = store
        .get_inventory(firm_id, product_id)?
        .map(|inv| inv.on_hand)
        .unwrap_or(0.0);
    Ok(CoverageReport {
        product_id,
        on_hand,
        daily_consumption: daily,
        coverage_days: coverage_days(on_hand, daily),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_consumption_averages_over_observed_days() {
        let history = [(1, 30.0), (2, 50.0), (3, 40.0)];
        assert!((average_daily_consumption(&history) - 40.0).abs() < 1e-9);
        assert_eq!(average_daily_consumption(&[]), 0.0);
    }

    #[test]
    fn coverage_is_infinite_without_consumption() {
        assert_eq!(coverage_days(100.0, 0.0), f64::INFINITY);
        assert!((coverage_days(100.0, 25.0) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn eoq_matches_closed_form() {
        // sqrt(2 * 3650 * 100 / 2) = sqrt(365000) ~ 604.15
        let plan = eoq_plan(3650.0, 100.0, 2.0, 3, 20.0);
        assert!((plan.eoq - 365_000.0_f64.sqrt()).abs() < 1e-6);
        assert!((plan.daily_demand - 10.0).abs() < 1e-9);
        assert!((plan.reorder_point - 50.0).abs() < 1e-9);
    }

    #[test]
    fn purchase_check_reports_deficit() {
        let check = validate_purchase(1000.0, 400.0, 10.0, 70.0);
        assert!(!check.can_buy);
        assert!((check.free_capital - 600.0).abs() < 1e-9);
        assert!((check.deficit - 100.0).abs() < 1e-9);

        let ok = validate_purchase(1000.0, 0.0, 10.0, 70.0);
        assert!(ok.can_buy);
        assert_eq!(ok.deficit, 0.0);
        assert!((ok.capital_use_pct - 70.0).abs() < 1e-9);
    }
}
