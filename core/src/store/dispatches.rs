//! Regional dispatch queries.

use super::SimStore;
use crate::dispatch::{DispatchRow, DispatchState};
use crate::error::SimResult;
use crate::types::{Day, FirmId, Region};
use rusqlite::params;

fn map_dispatch(r: &rusqlite::Row<'_>) -> rusqlite::Result<DispatchRow> {
    let region_str: String = r.get(3)?;
    let state_str: String = r.get(8)?;
    Ok(DispatchRow {
        dispatch_id: r.get(0)?,
        firm_id: r.get(1)?,
        product_id: r.get(2)?,
        region: Region::parse(&region_str)
            .ok_or_else(|| super::bad_text_column(3, "region", &region_str))?,
        dispatch_day: r.get(4)?,
        estimated_due_day: r.get(5)?,
        actual_due_day: r.get(6)?,
        qty: r.get(7)?,
        state: DispatchState::parse(&state_str)
            .ok_or_else(|| super::bad_text_column(8, "dispatch state", &state_str))?,
    })
}

const DISPATCH_COLS: &str = "dispatch_id, firm_id, product_id, region, dispatch_day,
                             estimated_due_day, actual_due_day, qty, state";

impl SimStore {
    pub fn insert_dispatch(&self, d: &DispatchRow) -> SimResult<i64> {
        self.conn().execute(
            "INSERT INTO regional_dispatch
                 (firm_id, product_id, region, dispatch_day, estimated_due_day,
                  actual_due_day, qty, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                d.firm_id,
                d.product_id,
                d.region.as_str(),
                d.dispatch_day,
                d.estimated_due_day,
                d.actual_due_day,
                d.qty,
                d.state.as_str(),
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// In-transit dispatches due on `day`, ascending id (delivery order).
    pub fn dispatches_due(&self, firm_id: FirmId, day: Day) -> SimResult<Vec<DispatchRow>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {DISPATCH_COLS} FROM regional_dispatch
             WHERE firm_id = ?1 AND estimated_due_day = ?2 AND state = 'in_transit'
             ORDER BY dispatch_id"
        ))?;
        let rows = stmt
            .query_map(params![firm_id, day], |r| map_dispatch(r))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_dispatch(&self, dispatch_id: i64) -> SimResult<DispatchRow> {
        Ok(self.conn().query_row(
            &format!("SELECT {DISPATCH_COLS} FROM regional_dispatch WHERE dispatch_id = ?1"),
            params![dispatch_id],
            |r| map_dispatch(r),
        )?)
    }

    pub fn mark_dispatch_delivered(&self, dispatch_id: i64, actual_due_day: Day) -> SimResult<()> {
        self.conn().execute(
            "UPDATE regional_dispatch SET state = 'delivered', actual_due_day = ?1
             WHERE dispatch_id = ?2",
            params![actual_due_day, dispatch_id],
        )?;
        Ok(())
    }
}
