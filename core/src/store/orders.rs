//! Purchase order queries.

use super::SimStore;
use crate::error::SimResult;
use crate::procurement::{OrderState, PurchaseOrderRow};
use crate::types::{Day, FirmId};
use rusqlite::params;

fn map_order(r: &rusqlite::Row<'_>) -> rusqlite::Result<PurchaseOrderRow> {
    let state_str: String = r.get(8)?;
    Ok(PurchaseOrderRow {
        order_id: r.get(0)?,
        firm_id: r.get(1)?,
        product_id: r.get(2)?,
        order_day: r.get(3)?,
        due_day: r.get(4)?,
        qty: r.get(5)?,
        unit_cost: r.get(6)?,
        total_cost: r.get(7)?,
        state: OrderState::parse(&state_str)
            .ok_or_else(|| super::bad_text_column(8, "order state", &state_str))?,
    })
}

const ORDER_COLS: &str =
    "order_id, firm_id, product_id, order_day, due_day, qty, unit_cost, total_cost, state";

impl SimStore {
    pub fn insert_order(&self, o: &PurchaseOrderRow) -> SimResult<i64> {
        self.conn().execute(
            "INSERT INTO purchase_order
                 (firm_id, product_id, order_day, due_day, qty, unit_cost, total_cost, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                o.firm_id,
                o.product_id,
                o.order_day,
                o.due_day,
                o.qty,
                o.unit_cost,
                o.total_cost,
                o.state.as_str(),
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// In-transit orders due on `day`, ascending id (receipt order).
    pub fn orders_due(&self, firm_id: FirmId, day: Day) -> SimResult<Vec<PurchaseOrderRow>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {ORDER_COLS} FROM purchase_order
             WHERE firm_id = ?1 AND due_day = ?2 AND state = 'in_transit'
             ORDER BY order_id"
        ))?;
        let rows = stmt
            .query_map(params![firm_id, day], |r| map_order(r))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Orders placed on `day` (spend is recognized at placement).
    pub fn orders_placed_on(&self, firm_id: FirmId, day: Day) -> SimResult<Vec<PurchaseOrderRow>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {ORDER_COLS} FROM purchase_order
             WHERE firm_id = ?1 AND order_day = ?2 ORDER BY order_id"
        ))?;
        let rows = stmt
            .query_map(params![firm_id, day], |r| map_order(r))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn orders_in_transit(&self, firm_id: FirmId) -> SimResult<Vec<PurchaseOrderRow>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {ORDER_COLS} FROM purchase_order
             WHERE firm_id = ?1 AND state = 'in_transit' ORDER BY order_id"
        ))?;
        let rows = stmt
            .query_map(params![firm_id], |r| map_order(r))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_order(&self, order_id: i64) -> SimResult<PurchaseOrderRow> {
        Ok(self.conn().query_row(
            &format!("SELECT {ORDER_COLS} FROM purchase_order WHERE order_id = ?1"),
            params![order_id],
            |r| map_order(r),
        )?)
    }

    pub fn set_order_state(&self, order_id: i64, state: OrderState) -> SimResult<()> {
        self.conn().execute(
            "UPDATE purchase_order SET state = ?1 WHERE order_id = ?2",
            params![state.as_str(), order_id],
        )?;
        Ok(())
    }
}
