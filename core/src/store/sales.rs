//! Sale fact rows.

use super::SimStore;
use crate::demand::SaleRow;
use crate::error::SimResult;
use crate::types::{Day, FirmId, ProductId, Region};
use rusqlite::params;

fn map_sale(r: &rusqlite::Row<'_>) -> rusqlite::Result<SaleRow> {
    let region_str: String = r.get(4)?;
    Ok(SaleRow {
        sale_id: r.get(0)?,
        firm_id: r.get(1)?,
        product_id: r.get(2)?,
        day: r.get(3)?,
        region: Region::parse(&region_str)
            .ok_or_else(|| super::bad_text_column(4, "region", &region_str))?,
        requested_qty: r.get(5)?,
        fulfilled_qty: r.get(6)?,
        lost_qty: r.get(7)?,
        unit_price: r.get(8)?,
        revenue: r.get(9)?,
        unit_cost: r.get(10)?,
        margin: r.get(11)?,
    })
}

const SALE_COLS: &str = "sale_id, firm_id, product_id, day, region, requested_qty,
                         fulfilled_qty, lost_qty, unit_price, revenue, unit_cost, margin";

impl SimStore {
    pub fn insert_sale(&self, s: &SaleRow) -> SimResult<i64> {
        self.conn().execute(
            "INSERT INTO sale (firm_id, product_id, day, region, requested_qty,
                               fulfilled_qty, lost_qty, unit_price, revenue, unit_cost, margin)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                s.firm_id,
                s.product_id,
                s.day,
                s.region.as_str(),
                s.requested_qty,
                s.fulfilled_qty,
                s.lost_qty,
                s.unit_price,
                s.revenue,
                s.unit_cost,
                s.margin,
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    pub fn sales_for_day(&self, firm_id: FirmId, day: Day) -> SimResult<Vec<SaleRow>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {SALE_COLS} FROM sale WHERE firm_id = ?1 AND day = ?2 ORDER BY sale_id"
        ))?;
        let rows = stmt
            .query_map(params![firm_id, day], |r| map_sale(r))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fulfilled quantities per day for one product, most recent last.
    /// Feeds the forecasting and planning helpers.
    pub fn daily_fulfilled_history(
        &self,
        firm_id: FirmId,
        product_id: ProductId,
        up_to_day: Day,
        days: Day,
    ) -> SimResult<Vec<(Day, f64)>> {
        let mut stmt = self.conn().prepare(
            "SELECT day, SUM(fulfilled_qty) FROM sale
             WHERE firm_id = ?1 AND product_id = ?2 AND day > ?3 AND day <= ?4
             GROUP BY day ORDER BY day",
        )?;
        let rows = stmt
            .query_map(
                params![firm_id, product_id, up_to_day - days, up_to_day],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn sale_count(&self, firm_id: FirmId) -> SimResult<i64> {
        let n: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM sale WHERE firm_id = ?1",
            params![firm_id],
            |r| r.get(0),
        )?;
        Ok(n)
    }

    pub fn total_revenue(&self, firm_id: FirmId) -> SimResult<f64> {
        let v: f64 = self.conn().query_row(
            "SELECT COALESCE(SUM(revenue), 0) FROM sale WHERE firm_id = ?1",
            params![firm_id],
            |r| r.get(0),
        )?;
        Ok(v)
    }
}
