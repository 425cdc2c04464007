//! Demand generation and sales resolution.
//!
//! For every active product and every region, one demand draw per day:
//! Normal(mean, stddev) floored at zero, scaled by any active demand
//! surges, rounded to whole units, then resolved against on-hand stock.
//! Every request becomes a sale row (fulfilled, partial or fully lost),
//! so lost demand is always visible in the history.
//!
//! Products and regions are walked in fixed order; the audit log is
//! reproducible for a given seed.

use serde::{Deserialize, Serialize};

use crate::disruption::{self, DisruptionEvent};
use crate::error::SimResult;
use crate::rng::RngBank;
use crate::store::SimStore;
use crate::types::{Day, FirmId, MovementRow, MovementType, ProductId, ProductRow, Region};

/// Immutable sale fact: one per (firm, product, day, region) with demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRow {
    pub sale_id: i64,
    pub firm_id: FirmId,
    pub product_id: ProductId,
    pub day: Day,
    pub region: Region,
    pub requested_qty: f64,
    pub fulfilled_qty: f64,
    pub lost_qty: f64,
    pub unit_price: f64,
    pub revenue: f64,
    pub unit_cost: f64,
    pub margin: f64,
}

/// Run the sales pass for one firm. Returns the sales created today.
pub fn process_sales(
    store: &SimStore,
    rng: &RngBank,
    day: Day,
    firm_id: FirmId,
    products: &[ProductRow],
    disruptions: &[DisruptionEvent],
) -> SimResult<Vec<SaleRow>> {
    let mut sales = Vec::new();

    for product in products {
        let mut inventory = store.get_or_create_inventory(firm_id, product.product_id)?;

        for region in Region::ALL {
            let base = rng
                .demand_rng(firm_id, product.product_id, region, day)
                .normal(product.mean_demand, product.demand_stddev)
                .max(0.0);

            let adjusted =
                disruption::adjusted_demand(product.product_id, region, base, day, disruptions);

            let requested = adjusted.round();
            if requested <= 0.0 {
                continue;
            }

            let fulfilled = requested.min(inventory.on_hand);
            let unit_price = product.current_price;
            let revenue = fulfilled * unit_price;
            let unit_cost = inventory.cost_basis(product.unit_cost);
            let margin = revenue - fulfilled * unit_cost;

            let mut sale = SaleRow {
                sale_id: 0,
                firm_id,
                product_id: product.product_id,
                day,
                region,
                requested_qty: requested,
                fulfilled_qty: fulfilled,
                lost_qty: requested - fulfilled,
                unit_price,
                revenue,
                unit_cost,
                margin,
            };
            sale.sale_id = store.insert_sale(&sale)?;

            if fulfilled > 0.0 {
                let balance_before = inventory.on_hand;
                inventory.on_hand -= fulfilled;
                store.update_inventory_stock(
                    inventory.inventory_id,
                    inventory.on_hand,
                    inventory.reserved,
                    inventory.weighted_avg_cost,
                )?;
                store.append_movement(&MovementRow {
                    movement_id: 0,
                    firm_id,
                    product_id: product.product_id,
                    day,
                    movement_type: MovementType::SaleOut,
                    qty: fulfilled,
                    balance_before,
                    balance_after: inventory.on_hand,
                    sale_id: Some(sale.sale_id),
                    order_id: None,
                    dispatch_id: None,
                    note: Some(format!("automatic sale day {day} - region {region}")),
                })?;
            }

            sales.push(sale);
        }
    }

    if !sales.is_empty() {
        let lost: f64 = sales.iter().map(|s| s.lost_qty).sum();
        log::debug!(
            "firm {firm_id} day {day}: {} sales, {lost:.0} units lost",
            sales.len()
        );
    }

    Ok(sales)
}
