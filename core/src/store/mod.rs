//! SQLite persistence layer.
//!
//! RULE: only the store modules talk to the database. Pipeline components
//! call store methods and never execute SQL directly.
//!
//! The day advance runs inside a single `BEGIN IMMEDIATE` transaction
//! opened by the engine; every store call in between joins it. A second
//! writer hitting the same database mid-advance gets SQLITE_BUSY, which
//! surfaces as `SimError::AdvanceInProgress` instead of silently
//! double-advancing.

mod catalog;
mod dispatches;
mod disruptions;
mod inventory;
mod metrics;
mod orders;
mod sales;

use rusqlite::{params, Connection, ErrorCode};

use crate::clock::{ClockState, SimulationClock};
use crate::error::{SimError, SimResult};
use crate::types::Day;

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the simulation database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Transaction boundary ───────────────────────────────────

    /// Open the write transaction for a day advance (or any multi-row
    /// decision). SQLITE_BUSY here means another advance holds the lock.
    pub fn begin(&self) -> SimResult<()> {
        match self.conn.execute_batch("BEGIN IMMEDIATE;") {
            Ok(()) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::DatabaseBusy || e.code == ErrorCode::DatabaseLocked =>
            {
                Err(SimError::AdvanceInProgress)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn commit(&self) -> SimResult<()> {
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    pub fn rollback(&self) -> SimResult<()> {
        self.conn.execute_batch("ROLLBACK;")?;
        Ok(())
    }

    // ── Simulation clock (singleton row) ───────────────────────

    /// Insert the clock row if this is a fresh database.
    pub fn init_clock(&self, clock: &SimulationClock) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO simulation (id, run_id, current_day, state, duration_days)
             VALUES (1, ?1, ?2, ?3, ?4)",
            params![
                clock.run_id,
                clock.current_day,
                clock.state.as_str(),
                clock.duration_days
            ],
        )?;
        Ok(())
    }

    pub fn load_clock(&self) -> SimResult<SimulationClock> {
        let row = self
            .conn
            .query_row(
                "SELECT run_id, current_day, state, duration_days, started_at, finished_at
                 FROM simulation WHERE id = 1",
                [],
                |r| {
                    Ok((
                        r.get::<_, String>(0)?,
                        r.get::<_, Day>(1)?,
                        r.get::<_, String>(2)?,
                        r.get::<_, Day>(3)?,
                        r.get::<_, Option<String>>(4)?,
                        r.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => SimError::NoSimulation,
                other => other.into(),
            })?;

        let state = ClockState::parse(&row.2)
            .ok_or_else(|| SimError::Other(anyhow::anyhow!("bad clock state '{}'", row.2)))?;
        Ok(SimulationClock {
            run_id: row.0,
            current_day: row.1,
            state,
            duration_days: row.3,
            started_at: parse_ts(row.4.as_deref())?,
            finished_at: parse_ts(row.5.as_deref())?,
        })
    }

    pub fn save_clock(&self, clock: &SimulationClock) -> SimResult<()> {
        self.conn.execute(
            "UPDATE simulation
             SET run_id = ?1, current_day = ?2, state = ?3, duration_days = ?4,
                 started_at = ?5, finished_at = ?6
             WHERE id = 1",
            params![
                clock.run_id,
                clock.current_day,
                clock.state.as_str(),
                clock.duration_days,
                clock.started_at.map(|t| t.to_rfc3339()),
                clock.finished_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Wipe all run-generated history and restore firm capital to its
    /// initial value. Catalog, inventory positions and the clock row
    /// survive; used by the instructor reset.
    pub fn purge_history(&self) -> SimResult<()> {
        self.conn.execute_batch(
            "DELETE FROM inventory_movement;
             DELETE FROM sale;
             DELETE FROM daily_metric;
             DELETE FROM purchase_order;
             DELETE FROM regional_dispatch;
             DELETE FROM disruption_event;
             UPDATE inventory SET reserved = 0;
             UPDATE firm SET capital = initial_capital;",
        )?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Decode failure for an enum-coded TEXT column. Corrupt rows surface as
/// errors at the read boundary, the same policy the disruption decoder
/// applies to its severity and params columns.
pub(crate) fn bad_text_column(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("bad {what} '{value}'").into(),
    )
}

fn parse_ts(s: Option<&str>) -> SimResult<Option<chrono::DateTime<chrono::Utc>>> {
    match s {
        None => Ok(None),
        Some(raw) => Ok(Some(
            chrono::DateTime::parse_from_rfc3339(raw)
                .map_err(|e| SimError::Other(anyhow::anyhow!("bad timestamp: {e}")))?
                .with_timezone(&chrono::Utc),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::SimStore;
    use rusqlite::params;

    fn seeded_store() -> (SimStore, i64, i64) {
        let store = SimStore::in_memory().unwrap();
        store.migrate().unwrap();
        let firm = store.insert_firm("Andes Foods", 100_000.0).unwrap();
        let product = store
            .insert_product("CAF-250", "Cafe 250g", 18.0, 9.0, 40.0, 0.0, -1.2, 3)
            .unwrap();
        (store, firm, product)
    }

    #[test]
    fn corrupt_sale_region_is_an_error_not_a_default() {
        let (store, firm, product) = seeded_store();
        store
            .conn()
            .execute(
                "INSERT INTO sale (firm_id, product_id, day, region, requested_qty,
                                   fulfilled_qty, lost_qty, unit_price, revenue, unit_cost, margin)
                 VALUES (?1, ?2, 1, 'atlantis', 10, 10, 0, 18.0, 180.0, 9.0, 90.0)",
                params![firm, product],
            )
            .unwrap();

        let err = store.sales_for_day(firm, 1).unwrap_err();
        assert!(
            err.to_string().contains("atlantis"),
            "unknown region must surface in the error, got: {err}"
        );
    }

    #[test]
    fn corrupt_order_state_is_an_error_not_a_default() {
        let (store, firm, product) = seeded_store();
        store
            .conn()
            .execute(
                "INSERT INTO purchase_order
                     (firm_id, product_id, order_day, due_day, qty, unit_cost, total_cost, state)
                 VALUES (?1, ?2, 1, 4, 50, 9.0, 450.0, 'teleported')",
                params![firm, product],
            )
            .unwrap();

        assert!(store.orders_placed_on(firm, 1).is_err());
    }

    #[test]
    fn corrupt_movement_type_is_an_error_not_a_default() {
        let (store, firm, product) = seeded_store();
        store
            .conn()
            .execute(
                "INSERT INTO inventory_movement
                     (firm_id, product_id, day, movement_type, qty, balance_before, balance_after)
                 VALUES (?1, ?2, 1, 'conjured', 5, 0, 5)",
                params![firm, product],
            )
            .unwrap();

        assert!(store.movements_for_day(firm, 1).is_err());
    }
}
