//! Purchase order receipt and weighted-average costing.

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::store::SimStore;
use crate::types::{Day, FirmId, MovementRow, MovementType, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    InTransit,
    Received,
    Cancelled,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::InTransit => "in_transit",
            OrderState::Received => "received",
            OrderState::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<OrderState> {
        match s {
            "in_transit" => Some(OrderState::InTransit),
            "received" => Some(OrderState::Received),
            "cancelled" => Some(OrderState::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderRow {
    pub order_id: i64,
    pub firm_id: FirmId,
    pub product_id: ProductId,
    pub order_day: Day,
    pub due_day: Day,
    pub qty: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub state: OrderState,
}

/// Blend existing stock value with a receipt, proportional to quantity.
/// Empty-denominator guard: with nothing on either side, the order's own
/// cost becomes the new average.
pub fn blended_avg_cost(on_hand: f64, old_avg: f64, qty: f64, order_unit_cost: f64) -> f64 {
    let denom = on_hand + qty;
    if denom > 0.0 {
        (on_hand * old_avg + qty * order_unit_cost) / denom
    } else {
        order_unit_cost
    }
}

/// Receive every in-transit order due today for one firm. A missing
/// inventory row is created zeroed first, so the stock always lands and
/// an order is never marked received with its quantity dropped.
pub fn receive_due_orders(
    store: &SimStore,
    day: Day,
    firm_id: FirmId,
) -> SimResult<Vec<PurchaseOrderRow>> {
    let due = store.orders_due(firm_id, day)?;
    let mut received = Vec::with_capacity(due.len());

    for order in due {
        let mut inventory = store.get_or_create_inventory(firm_id, order.product_id)?;

        let new_avg = blended_avg_cost(
            inventory.on_hand,
            inventory.weighted_avg_cost,
            order.qty,
            order.unit_cost,
        );

        let balance_before = inventory.on_hand;
        inventory.on_hand += order.qty;
        inventory.weighted_avg_cost = new_avg;
        store.update_inventory_stock(
            inventory.inventory_id,
            inventory.on_hand,
            inventory.reserved,
            inventory.weighted_avg_cost,
        )?;

        store.append_movement(&MovementRow {
            movement_id: 0,
            firm_id,
            product_id: order.product_id,
            day,
            movement_type: MovementType::PurchaseIn,
            qty: order.qty,
            balance_before,
            balance_after: inventory.on_hand,
            sale_id: None,
            order_id: Some(order.order_id),
            dispatch_id: None,
            note: Some(format!("automatic receipt day {day}")),
        })?;

        store.set_order_state(order.order_id, OrderState::Received)?;
        log::debug!(
            "firm {firm_id} received order {} ({:.0} units, avg cost {:.2})",
            order.order_id,
            order.qty,
            new_avg
        );

        received.push(PurchaseOrderRow {
            state: OrderState::Received,
            ..order
        });
    }

    Ok(received)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blended_cost_is_quantity_weighted() {
        // 100 units @ 10 blended with 50 units @ 16 -> 12
        let avg = blended_avg_cost(100.0, 10.0, 50.0, 16.0);
        assert!((avg - 12.0).abs() < 1e-9);
    }

    #[test]
    fn blended_cost_empty_denominator_uses_order_cost() {
        assert_eq!(blended_avg_cost(0.0, 0.0, 0.0, 16.0), 16.0);
    }

    #[test]
    fn blended_cost_stays_within_bounds() {
        for &(on_hand, old, qty, unit) in &[
            (10.0, 5.0, 30.0, 20.0),
            (300.0, 8.0, 1.0, 2.0),
            (1.0, 100.0, 1.0, 100.0),
        ] {
            let avg = blended_avg_cost(on_hand, old, qty, unit);
            assert!(avg >= old.min(unit) - 1e-9 && avg <= old.max(unit) + 1e-9);
        }
    }
}
