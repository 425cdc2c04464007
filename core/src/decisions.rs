//! Student decision actions: pricing, procurement and dispatch creation.
//!
//! These are the writes the daily pipeline consumes. Each runs in its own
//! short transaction on the shared store, so a decision can never
//! interleave with an in-progress day advance. It blocks on the same
//! lock and either lands before the advance or after it.

use crate::dispatch::{DispatchRow, DispatchState};
use crate::disruption::{self, DisruptionEvent};
use crate::error::{SimError, SimResult};
use crate::procurement::{OrderState, PurchaseOrderRow};
use crate::store::SimStore;
use crate::types::{Day, FirmId, MovementRow, MovementType, ProductId, Region};

/// Change a product's list price. Prices are global to the catalog;
/// elasticity effects on demand are a forecasting concern, not enforced
/// here.
pub fn set_price(store: &SimStore, product_id: ProductId, new_price: f64) -> SimResult<()> {
    if !new_price.is_finite() || new_price <= 0.0 {
        return Err(SimError::InvalidPrice(new_price));
    }
    store.update_product_price(product_id, new_price)?;
    log::info!("product {product_id} price set to {new_price:.2}");
    Ok(())
}

/// Place a purchase order. Capital is debited now, at placement; the
/// stock arrives when the order falls due. Supplier delays extend the
/// catalog lead time, cost increases inflate the unit cost.
pub fn place_purchase_order(
    store: &SimStore,
    day: Day,
    firm_id: FirmId,
    product_id: ProductId,
    qty: f64,
    disruptions: &[DisruptionEvent],
) -> SimResult<PurchaseOrderRow> {
    if !qty.is_finite() || qty <= 0.0 {
        return Err(SimError::Other(anyhow::anyhow!(
            "order quantity must be positive, got {qty}"
        )));
    }

    store.begin()?;
    let result = (|| {
        let product = store.get_product(product_id)?;
        let firm = store.get_firm(firm_id)?;

        let unit_cost = product.unit_cost * disruption::cost_factor(product_id, day, disruptions);
        let total_cost = qty * unit_cost;

        // Free capital nets out orders already committed in transit.
        let committed: f64 = store
            .orders_in_transit(firm_id)?
            .iter()
            .map(|o| o.total_cost)
            .sum();
        let free = firm.capital - committed;
        if total_cost > free {
            return Err(SimError::InsufficientCapital {
                needed: total_cost,
                free,
            });
        }

        let lead = product.lead_time_days + disruption::lead_time_addition(product_id, day, disruptions);
        let mut order = PurchaseOrderRow {
            order_id: 0,
            firm_id,
            product_id,
            order_day: day,
            due_day: day + lead,
            qty,
            unit_cost,
            total_cost,
            state: OrderState::InTransit,
        };
        order.order_id = store.insert_order(&order)?;
        store.update_firm_capital(firm_id, firm.capital - total_cost)?;

        log::info!(
            "firm {firm_id} ordered {qty:.0} x product {product_id} for {total_cost:.2}, due day {}",
            order.due_day
        );
        Ok(order)
    })();

    finish_txn(store, result)
}

/// Dispatch stock to a region. Reserves the quantity against the central
/// inventory and emits a dispatch-out movement; the advance pipeline
/// delivers it after the region's transit time.
pub fn create_dispatch(
    store: &SimStore,
    day: Day,
    firm_id: FirmId,
    product_id: ProductId,
    region: Region,
    qty: f64,
    disruptions: &[DisruptionEvent],
) -> SimResult<DispatchRow> {
    if !qty.is_finite() || qty <= 0.0 {
        return Err(SimError::Other(anyhow::anyhow!(
            "dispatch quantity must be positive, got {qty}"
        )));
    }

    let access = disruption::region_available(region, day, disruptions);
    if !access.available {
        return Err(SimError::RegionUnavailable {
            region: region.as_str().to_string(),
            reason: access.reason,
        });
    }

    store.begin()?;
    let result = (|| {
        let mut inventory = store
            .get_inventory(firm_id, product_id)?
            .ok_or(SimError::InsufficientStock {
                requested: qty,
                available: 0.0,
            })?;

        // Capacity reductions shrink how much can leave the warehouse.
        let capacity = disruption::capacity_factor(region, day, disruptions);
        let available = inventory.available() * capacity;
        if qty > available {
            return Err(SimError::InsufficientStock {
                requested: qty,
                available,
            });
        }

        let mut dispatch = DispatchRow {
            dispatch_id: 0,
            firm_id,
            product_id,
            region,
            dispatch_day: day,
            estimated_due_day: day + region.transit_days(),
            actual_due_day: None,
            qty,
            state: DispatchState::InTransit,
        };
        dispatch.dispatch_id = store.insert_dispatch(&dispatch)?;

        let balance_before = inventory.on_hand;
        inventory.on_hand -= qty;
        inventory.reserved += qty;
        store.update_inventory_stock(
            inventory.inventory_id,
            inventory.on_hand,
            inventory.reserved,
            inventory.weighted_avg_cost,
        )?;
        store.append_movement(&MovementRow {
            movement_id: 0,
            firm_id,
            product_id,
            day,
            movement_type: MovementType::DispatchOut,
            qty,
            balance_before,
            balance_after: inventory.on_hand,
            sale_id: None,
            order_id: None,
            dispatch_id: Some(dispatch.dispatch_id),
            note: Some(format!("dispatch to region {region}")),
        })?;

        log::info!(
            "firm {firm_id} dispatched {qty:.0} x product {product_id} to {region}, due day {}",
            dispatch.estimated_due_day
        );
        Ok(dispatch)
    })();

    finish_txn(store, result)
}

fn finish_txn<T>(store: &SimStore, result: SimResult<T>) -> SimResult<T> {
    match result {
        Ok(value) => {
            store.commit()?;
            Ok(value)
        }
        Err(e) => {
            let _ = store.rollback();
            Err(e)
        }
    }
}
