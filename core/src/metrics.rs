//! Per-firm daily performance rollup.
//!
//! Runs once per (firm, day) after sales and receipts. Spend is
//! recognized when an order is placed, not when it arrives; capital moves
//! by revenue minus today's placed spend and is never clamped, since
//! negative capital is the insolvency signal.

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::store::SimStore;
use crate::types::{Day, FirmRow};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRow {
    pub metric_id: i64,
    pub firm_id: i64,
    pub day: Day,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub service_level_pct: f64,
    pub inventory_turnover: f64,
}

/// Aggregate one firm's day and persist the metric row. The UNIQUE
/// (firm, day) constraint in the store makes a second run for the same
/// day fail the whole advance rather than double-count.
pub fn aggregate_day(store: &SimStore, day: Day, firm: &FirmRow) -> SimResult<MetricRow> {
    let sales = store.sales_for_day(firm.firm_id, day)?;

    let revenue: f64 = sales.iter().map(|s| s.revenue).sum();
    let cogs: f64 = sales.iter().map(|s| s.fulfilled_qty * s.unit_cost).sum();

    let placed_today = store.orders_placed_on(firm.firm_id, day)?;
    let procurement_spend: f64 = placed_today.iter().map(|o| o.total_cost).sum();

    let requested: f64 = sales.iter().map(|s| s.requested_qty).sum();
    let fulfilled: f64 = sales.iter().map(|s| s.fulfilled_qty).sum();
    let service_level_pct = if requested > 0.0 {
        fulfilled / requested * 100.0
    } else {
        100.0
    };

    let inventory_value = store.inventory_value(firm.firm_id)?;
    let inventory_turnover = if inventory_value > 0.0 {
        cogs / inventory_value
    } else {
        0.0
    };

    let new_capital = firm.capital + (revenue - procurement_spend);
    store.update_firm_capital(firm.firm_id, new_capital)?;

    let mut metric = MetricRow {
        metric_id: 0,
        firm_id: firm.firm_id,
        day,
        revenue,
        cost: cogs + procurement_spend,
        profit: revenue - cogs,
        service_level_pct,
        inventory_turnover,
    };
    metric.metric_id = store.insert_metric(&metric)?;

    log::info!(
        "day {day} {}: revenue={revenue:.0} profit={:.0} service={:.1}% capital={new_capital:.0}",
        firm.name,
        metric.profit,
        service_level_pct
    );

    Ok(metric)
}
