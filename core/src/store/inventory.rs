//! Inventory rows and the append-only movement log.

use super::SimStore;
use crate::error::SimResult;
use crate::types::{Day, FirmId, InventoryRow, MovementRow, MovementType, ProductId};
use rusqlite::{params, OptionalExtension};

fn map_inventory(r: &rusqlite::Row<'_>) -> rusqlite::Result<InventoryRow> {
    Ok(InventoryRow {
        inventory_id: r.get(0)?,
        firm_id: r.get(1)?,
        product_id: r.get(2)?,
        on_hand: r.get(3)?,
        reserved: r.get(4)?,
        reorder_point: r.get(5)?,
        safety_stock: r.get(6)?,
        weighted_avg_cost: r.get(7)?,
    })
}

const INVENTORY_COLS: &str = "inventory_id, firm_id, product_id, on_hand, reserved,
                              reorder_point, safety_stock, weighted_avg_cost";

impl SimStore {
    #[allow(clippy::too_many_arguments)]
    pub fn insert_inventory(
        &self,
        firm_id: FirmId,
        product_id: ProductId,
        on_hand: f64,
        reorder_point: f64,
        safety_stock: f64,
        weighted_avg_cost: f64,
    ) -> SimResult<i64> {
        self.conn().execute(
            "INSERT INTO inventory (firm_id, product_id, on_hand, reorder_point,
                                    safety_stock, weighted_avg_cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                firm_id,
                product_id,
                on_hand,
                reorder_point,
                safety_stock,
                weighted_avg_cost
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    pub fn get_inventory(
        &self,
        firm_id: FirmId,
        product_id: ProductId,
    ) -> SimResult<Option<InventoryRow>> {
        let row = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {INVENTORY_COLS} FROM inventory
                     WHERE firm_id = ?1 AND product_id = ?2"
                ),
                params![firm_id, product_id],
                |r| map_inventory(r),
            )
            .optional()?;
        Ok(row)
    }

    /// The missing-row policy: rows absent from the inventory table are
    /// created lazily with zero stock, so demand against them is recorded
    /// as lost instead of silently dropped.
    pub fn get_or_create_inventory(
        &self,
        firm_id: FirmId,
        product_id: ProductId,
    ) -> SimResult<InventoryRow> {
        if let Some(row) = self.get_inventory(firm_id, product_id)? {
            return Ok(row);
        }
        log::debug!("lazily creating zero inventory for firm {firm_id} product {product_id}");
        self.conn().execute(
            "INSERT INTO inventory (firm_id, product_id, on_hand, reserved,
                                    reorder_point, safety_stock, weighted_avg_cost)
             VALUES (?1, ?2, 0, 0, 0, 0, 0)",
            params![firm_id, product_id],
        )?;
        self.get_inventory(firm_id, product_id)?
            .ok_or_else(|| crate::error::SimError::Other(anyhow::anyhow!("inventory vanished")))
    }

    /// Inventories of a firm in ascending product id order.
    pub fn inventories_for_firm(&self, firm_id: FirmId) -> SimResult<Vec<InventoryRow>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {INVENTORY_COLS} FROM inventory
             WHERE firm_id = ?1 ORDER BY product_id"
        ))?;
        let rows = stmt
            .query_map(params![firm_id], |r| map_inventory(r))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn update_inventory_stock(
        &self,
        inventory_id: i64,
        on_hand: f64,
        reserved: f64,
        weighted_avg_cost: f64,
    ) -> SimResult<()> {
        self.conn().execute(
            "UPDATE inventory SET on_hand = ?1, reserved = ?2, weighted_avg_cost = ?3
             WHERE inventory_id = ?4",
            params![on_hand, reserved, weighted_avg_cost, inventory_id],
        )?;
        Ok(())
    }

    pub fn update_inventory_thresholds(
        &self,
        inventory_id: i64,
        reorder_point: f64,
        safety_stock: f64,
    ) -> SimResult<()> {
        self.conn().execute(
            "UPDATE inventory SET reorder_point = ?1, safety_stock = ?2 WHERE inventory_id = ?3",
            params![reorder_point, safety_stock, inventory_id],
        )?;
        Ok(())
    }

    /// Total stock value at weighted-average cost across all products.
    pub fn inventory_value(&self, firm_id: FirmId) -> SimResult<f64> {
        let value: f64 = self.conn().query_row(
            "SELECT COALESCE(SUM(on_hand * weighted_avg_cost), 0) FROM inventory
             WHERE firm_id = ?1",
            params![firm_id],
            |r| r.get(0),
        )?;
        Ok(value)
    }

    // ── Movement log ───────────────────────────────────────────

    pub fn append_movement(&self, m: &MovementRow) -> SimResult<i64> {
        self.conn().execute(
            "INSERT INTO inventory_movement
                 (firm_id, product_id, day, movement_type, qty,
                  balance_before, balance_after, sale_id, order_id, dispatch_id, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                m.firm_id,
                m.product_id,
                m.day,
                m.movement_type.as_str(),
                m.qty,
                m.balance_before,
                m.balance_after,
                m.sale_id,
                m.order_id,
                m.dispatch_id,
                m.note,
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    pub fn movements_for_day(&self, firm_id: FirmId, day: Day) -> SimResult<Vec<MovementRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT movement_id, firm_id, product_id, day, movement_type, qty,
                    balance_before, balance_after, sale_id, order_id, dispatch_id, note
             FROM inventory_movement
             WHERE firm_id = ?1 AND day = ?2 ORDER BY movement_id",
        )?;
        let rows = stmt
            .query_map(params![firm_id, day], |r| {
                let type_str: String = r.get(4)?;
                Ok(MovementRow {
                    movement_id: r.get(0)?,
                    firm_id: r.get(1)?,
                    product_id: r.get(2)?,
                    day: r.get(3)?,
                    movement_type: MovementType::parse(&type_str)
                        .ok_or_else(|| super::bad_text_column(4, "movement type", &type_str))?,
                    qty: r.get(5)?,
                    balance_before: r.get(6)?,
                    balance_after: r.get(7)?,
                    sale_id: r.get(8)?,
                    order_id: r.get(9)?,
                    dispatch_id: r.get(10)?,
                    note: r.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn movement_count(&self, firm_id: FirmId) -> SimResult<i64> {
        let n: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM inventory_movement WHERE firm_id = ?1",
            params![firm_id],
            |r| r.get(0),
        )?;
        Ok(n)
    }
}
