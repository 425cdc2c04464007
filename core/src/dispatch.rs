//! Regional dispatch lifecycle: reservation, transit, delivery.
//!
//! Dispatch moves already-owned stock from the central warehouse to a
//! sales region. Creation reserves stock; the completer releases the
//! reservation when the dispatch arrives. No customer demand is served
//! here — that is the sales pass's job.

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::store::SimStore;
use crate::types::{Day, FirmId, ProductId, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    Pending,
    InTransit,
    Delivered,
}

impl DispatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchState::Pending => "pending",
            DispatchState::InTransit => "in_transit",
            DispatchState::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<DispatchState> {
        match s {
            "pending" => Some(DispatchState::Pending),
            "in_transit" => Some(DispatchState::InTransit),
            "delivered" => Some(DispatchState::Delivered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRow {
    pub dispatch_id: i64,
    pub firm_id: FirmId,
    pub product_id: ProductId,
    pub region: Region,
    pub dispatch_day: Day,
    pub estimated_due_day: Day,
    pub actual_due_day: Option<Day>,
    pub qty: f64,
    pub state: DispatchState,
}

/// Deliver every in-transit dispatch due today for one firm and release
/// its reservation. The release clamps at zero: a disrupted sales day may
/// already have pushed on-hand below the reserved quantity.
pub fn complete_due_dispatches(
    store: &SimStore,
    day: Day,
    firm_id: FirmId,
) -> SimResult<Vec<DispatchRow>> {
    let due = store.dispatches_due(firm_id, day)?;
    let mut delivered = Vec::with_capacity(due.len());

    for dispatch in due {
        store.mark_dispatch_delivered(dispatch.dispatch_id, day)?;

        let mut inventory = store.get_or_create_inventory(firm_id, dispatch.product_id)?;
        inventory.reserved = (inventory.reserved - dispatch.qty).max(0.0);
        store.update_inventory_stock(
            inventory.inventory_id,
            inventory.on_hand,
            inventory.reserved,
            inventory.weighted_avg_cost,
        )?;

        log::debug!(
            "firm {firm_id} dispatch {} delivered to {} ({:.0} units)",
            dispatch.dispatch_id,
            dispatch.region,
            dispatch.qty
        );

        delivered.push(DispatchRow {
            state: DispatchState::Delivered,
            actual_due_day: Some(day),
            ..dispatch
        });
    }

    Ok(delivered)
}
