//! Daily metric rows, the append-only KPI history.

use super::SimStore;
use crate::error::SimResult;
use crate::metrics::MetricRow;
use crate::types::{Day, FirmId};
use rusqlite::{params, OptionalExtension};

fn map_metric(r: &rusqlite::Row<'_>) -> rusqlite::Result<MetricRow> {
    Ok(MetricRow {
        metric_id: r.get(0)?,
        firm_id: r.get(1)?,
        day: r.get(2)?,
        revenue: r.get(3)?,
        cost: r.get(4)?,
        profit: r.get(5)?,
        service_level_pct: r.get(6)?,
        inventory_turnover: r.get(7)?,
    })
}

const METRIC_COLS: &str =
    "metric_id, firm_id, day, revenue, cost, profit, service_level_pct, inventory_turnover";

impl SimStore {
    /// The UNIQUE (firm_id, day) constraint backs the at-most-once
    /// guarantee: a duplicate insert for the same day fails the advance.
    pub fn insert_metric(&self, m: &MetricRow) -> SimResult<i64> {
        self.conn().execute(
            "INSERT INTO daily_metric
                 (firm_id, day, revenue, cost, profit, service_level_pct, inventory_turnover)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                m.firm_id,
                m.day,
                m.revenue,
                m.cost,
                m.profit,
                m.service_level_pct,
                m.inventory_turnover,
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    pub fn metric_for_day(&self, firm_id: FirmId, day: Day) -> SimResult<Option<MetricRow>> {
        let row = self
            .conn()
            .query_row(
                &format!("SELECT {METRIC_COLS} FROM daily_metric WHERE firm_id = ?1 AND day = ?2"),
                params![firm_id, day],
                |r| map_metric(r),
            )
            .optional()?;
        Ok(row)
    }

    pub fn metrics_for_firm(&self, firm_id: FirmId) -> SimResult<Vec<MetricRow>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {METRIC_COLS} FROM daily_metric WHERE firm_id = ?1 ORDER BY day"
        ))?;
        let rows = stmt
            .query_map(params![firm_id], |r| map_metric(r))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// (total revenue, total profit, average service level) over all days.
    pub fn metric_totals(&self, firm_id: FirmId) -> SimResult<(f64, f64, f64)> {
        let totals = self.conn().query_row(
            "SELECT COALESCE(SUM(revenue), 0), COALESCE(SUM(profit), 0),
                    COALESCE(AVG(service_level_pct), 0)
             FROM daily_metric WHERE firm_id = ?1",
            params![firm_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )?;
        Ok(totals)
    }
}
