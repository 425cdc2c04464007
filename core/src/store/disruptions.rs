//! Disruption event persistence. The typed parameter union is validated
//! here at the read boundary; a stored blob naming an unknown type is an
//! error, never a silent no-op.

use super::SimStore;
use crate::disruption::{DisruptionEvent, DisruptionKind, Severity};
use crate::error::{SimError, SimResult};
use crate::types::{Day, FirmId};
use rusqlite::params;

struct RawDisruption {
    disruption_id: i64,
    name: String,
    description: Option<String>,
    severity: String,
    start_day: Day,
    end_day: Day,
    active: bool,
    params_json: String,
    affected_firms_json: Option<String>,
}

fn decode(raw: RawDisruption) -> SimResult<DisruptionEvent> {
    let kind = DisruptionKind::from_json(&raw.params_json)?;
    let affected_firms: Option<Vec<FirmId>> = match raw.affected_firms_json {
        None => None,
        Some(json) => Some(serde_json::from_str(&json)?),
    };
    let severity = Severity::parse(&raw.severity).ok_or_else(|| {
        SimError::Other(anyhow::anyhow!("bad disruption severity '{}'", raw.severity))
    })?;
    Ok(DisruptionEvent {
        disruption_id: raw.disruption_id,
        name: raw.name,
        description: raw.description,
        severity,
        start_day: raw.start_day,
        end_day: raw.end_day,
        active: raw.active,
        kind,
        affected_firms,
    })
}

impl SimStore {
    pub fn insert_disruption(&self, d: &DisruptionEvent) -> SimResult<i64> {
        let params_json = serde_json::to_string(&d.kind)?;
        let firms_json = match &d.affected_firms {
            None => None,
            Some(firms) => Some(serde_json::to_string(firms)?),
        };
        self.conn().execute(
            "INSERT INTO disruption_event
                 (name, description, severity, start_day, end_day, active, params, affected_firms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                d.name,
                d.description,
                d.severity.as_str(),
                d.start_day,
                d.end_day,
                d.active,
                params_json,
                firms_json,
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// Events whose window covers `day` and whose active flag is set,
    /// ascending id. Firm filtering happens in the resolver.
    pub fn active_disruptions(&self, day: Day) -> SimResult<Vec<DisruptionEvent>> {
        let mut stmt = self.conn().prepare(
            "SELECT disruption_id, name, description, severity, start_day, end_day,
                    active, params, affected_firms
             FROM disruption_event
             WHERE active = 1 AND start_day <= ?1 AND end_day >= ?1
             ORDER BY disruption_id",
        )?;
        let raws = stmt
            .query_map(params![day], |r| {
                Ok(RawDisruption {
                    disruption_id: r.get(0)?,
                    name: r.get(1)?,
                    description: r.get(2)?,
                    severity: r.get(3)?,
                    start_day: r.get(4)?,
                    end_day: r.get(5)?,
                    active: r.get::<_, i64>(6)? != 0,
                    params_json: r.get(7)?,
                    affected_firms_json: r.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raws.into_iter().map(decode).collect()
    }

    pub fn deactivate_disruption(&self, disruption_id: i64) -> SimResult<()> {
        self.conn().execute(
            "UPDATE disruption_event SET active = 0 WHERE disruption_id = ?1",
            params![disruption_id],
        )?;
        Ok(())
    }
}
