//! The simulation engine: clock lifecycle and the atomic day advance.
//!
//! `advance_one_day` is the heart of the crate. The whole pipeline for
//! all firms runs inside one write transaction together with the clock
//! update; any failure rolls the database and the in-memory clock back
//! to the previous day. Partial days are unrepresentable.

use serde::{Deserialize, Serialize};

use crate::alerts::{self, Alert};
use crate::clock::{ClockState, SimulationClock};
use crate::config::{self, SimConfig};
use crate::decisions;
use crate::demand;
use crate::dispatch::{self, DispatchRow};
use crate::disruption::{self, DisruptionEvent, DisruptionKind, Severity};
use crate::error::{SimError, SimResult};
use crate::metrics;
use crate::procurement::{self, PurchaseOrderRow};
use crate::rng::RngBank;
use crate::store::SimStore;
use crate::types::{Day, FirmId, ProductId, Region};

/// What one advance produced, for the instructor's console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: Day,
    pub firms_processed: usize,
    pub total_sales: usize,
    pub total_orders_received: usize,
    pub total_dispatches_delivered: usize,
    pub alerts: Vec<FirmAlerts>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmAlerts {
    pub firm_id: FirmId,
    pub firm: String,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmSummary {
    pub firm_id: FirmId,
    pub name: String,
    pub capital: f64,
    pub initial_capital: f64,
    pub inventory_value: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub avg_service_level_pct: f64,
}

/// Run-level rollup across all days so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub run_id: String,
    pub day: Day,
    pub state: String,
    pub duration_days: Day,
    pub firms: Vec<FirmSummary>,
}

pub struct SimEngine {
    store: SimStore,
    clock: SimulationClock,
    rng: RngBank,
}

impl SimEngine {
    /// Attach to an existing simulation database.
    pub fn new(store: SimStore, seed: u64) -> SimResult<Self> {
        let clock = store.load_clock()?;
        Ok(Self {
            store,
            clock,
            rng: RngBank::new(seed),
        })
    }

    /// Migrate, seed from a scenario and attach in one step.
    pub fn bootstrap(store: SimStore, config: &SimConfig) -> SimResult<Self> {
        store.migrate()?;
        config::bootstrap(&store, config)?;
        Self::new(store, config.seed)
    }

    pub fn store(&self) -> &SimStore {
        &self.store
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn current_day(&self) -> Day {
        self.clock.current_day
    }

    // ── Lifecycle ──────────────────────────────────────────────

    pub fn start(&mut self) -> SimResult<()> {
        self.clock.start()?;
        self.store.save_clock(&self.clock)?;
        log::info!("simulation {} running from day {}", self.clock.run_id, self.clock.current_day);
        Ok(())
    }

    pub fn pause(&mut self) -> SimResult<()> {
        self.clock.pause()?;
        self.store.save_clock(&self.clock)
    }

    /// `paused -> running` again. Same transition as `start`; reads
    /// better at call sites that resume an interrupted run.
    pub fn resume(&mut self) -> SimResult<()> {
        self.start()
    }

    pub fn finish(&mut self) -> SimResult<()> {
        self.clock.finish()?;
        self.store.save_clock(&self.clock)?;
        log::info!("simulation {} finished on day {}", self.clock.run_id, self.clock.current_day);
        Ok(())
    }

    /// Reset to day 1, paused, wiping run history. Requires the explicit
    /// confirmation token; everything runs in one transaction.
    pub fn reset(&mut self, confirmation: &str) -> SimResult<()> {
        let saved = self.clock.clone();
        self.clock.reset(confirmation)?;

        self.store.begin()?;
        let result = self
            .store
            .purge_history()
            .and_then(|()| self.store.save_clock(&self.clock))
            .and_then(|()| self.store.commit());
        match result {
            Ok(()) => {
                log::info!("simulation {} reset to day 1", self.clock.run_id);
                Ok(())
            }
            Err(e) => Err(self.abandon_transaction(saved, e)),
        }
    }

    // ── Day advance ────────────────────────────────────────────

    /// Advance the whole simulation by one day, atomically.
    pub fn advance_one_day(&mut self) -> SimResult<DaySummary> {
        if !self.clock.is_running() {
            return Err(SimError::NotRunning {
                state: self.clock.state.as_str().to_string(),
            });
        }

        let saved = self.clock.clone();
        self.store.begin()?;
        let result = self
            .run_day_pipeline()
            .and_then(|summary| self.store.commit().map(|()| summary));
        match result {
            Ok(summary) => Ok(summary),
            Err(e) => {
                let e = self.abandon_transaction(saved, e);
                log::warn!("day advance failed and was rolled back: {e}");
                Err(e)
            }
        }
    }

    /// Shared failure path for transactional engine operations, including
    /// a failed COMMIT: roll back, restore the pre-transaction clock and
    /// hand the error back. The connection is left clean for a retry.
    fn abandon_transaction(&mut self, saved: SimulationClock, e: SimError) -> SimError {
        let _ = self.store.rollback();
        self.clock = saved;
        e
    }

    fn run_day_pipeline(&mut self) -> SimResult<DaySummary> {
        let day = self.clock.advance();
        if day >= self.clock.duration_days {
            self.clock.state = ClockState::Finished;
            self.clock.finished_at = Some(chrono::Utc::now());
        }
        self.store.save_clock(&self.clock)?;

        let firms = self.store.active_firms()?;
        let products = self.store.active_products()?;
        let all_disruptions = self.store.active_disruptions(day)?;

        let mut summary = DaySummary {
            day,
            firms_processed: 0,
            total_sales: 0,
            total_orders_received: 0,
            total_dispatches_delivered: 0,
            alerts: Vec::new(),
        };

        for firm in &firms {
            let firm_disruptions: Vec<DisruptionEvent> = all_disruptions
                .iter()
                .filter(|d| d.applies_to_firm(firm.firm_id))
                .cloned()
                .collect();

            let sales = demand::process_sales(
                &self.store,
                &self.rng,
                day,
                firm.firm_id,
                &products,
                &firm_disruptions,
            )?;
            let received = procurement::receive_due_orders(&self.store, day, firm.firm_id)?;
            let delivered = dispatch::complete_due_dispatches(&self.store, day, firm.firm_id)?;
            metrics::aggregate_day(&self.store, day, firm)?;
            let firm_alerts = alerts::scan_firm(&self.store, firm.firm_id)?;

            summary.firms_processed += 1;
            summary.total_sales += sales.len();
            summary.total_orders_received += received.len();
            summary.total_dispatches_delivered += delivered.len();
            if !firm_alerts.is_empty() {
                summary.alerts.push(FirmAlerts {
                    firm_id: firm.firm_id,
                    firm: firm.name.clone(),
                    alerts: firm_alerts,
                });
            }
        }

        log::info!(
            "day {day}: {} firms, {} sales, {} receipts, {} deliveries",
            summary.firms_processed,
            summary.total_sales,
            summary.total_orders_received,
            summary.total_dispatches_delivered
        );
        Ok(summary)
    }

    // ── Decisions ──────────────────────────────────────────────

    pub fn set_price(&self, product_id: ProductId, new_price: f64) -> SimResult<()> {
        decisions::set_price(&self.store, product_id, new_price)
    }

    pub fn place_purchase_order(
        &self,
        firm_id: FirmId,
        product_id: ProductId,
        qty: f64,
    ) -> SimResult<PurchaseOrderRow> {
        let day = self.clock.current_day;
        let disruptions = self.firm_disruptions(firm_id, day)?;
        decisions::place_purchase_order(&self.store, day, firm_id, product_id, qty, &disruptions)
    }

    pub fn create_dispatch(
        &self,
        firm_id: FirmId,
        product_id: ProductId,
        region: Region,
        qty: f64,
    ) -> SimResult<DispatchRow> {
        let day = self.clock.current_day;
        let disruptions = self.firm_disruptions(firm_id, day)?;
        decisions::create_dispatch(&self.store, day, firm_id, product_id, region, qty, &disruptions)
    }

    /// Inject a preset disruption starting today, aimed at the given
    /// product/region targets (empty = every product/region, except for
    /// `region_blocked`, which must name its regions to block anything).
    /// Returns the stored event.
    pub fn trigger_disruption(
        &self,
        kind: &str,
        severity: Severity,
        affected_firms: Option<Vec<FirmId>>,
        products: Vec<ProductId>,
        regions: Vec<Region>,
    ) -> SimResult<DisruptionEvent> {
        let (params, duration) = disruption::catalog_preset(kind, severity)
            .ok_or_else(|| SimError::Other(anyhow::anyhow!("unknown disruption preset '{kind}'")))?;
        let params = params.with_targets(products, regions);
        if let DisruptionKind::RegionBlocked { regions, .. } = &params {
            if regions.is_empty() {
                return Err(SimError::Other(anyhow::anyhow!(
                    "region_blocked needs at least one region to block"
                )));
            }
        }
        let start_day = self.clock.current_day;
        let mut event = DisruptionEvent {
            disruption_id: 0,
            name: format!("{kind} ({})", severity.as_str()),
            description: None,
            severity,
            start_day,
            end_day: start_day + duration,
            active: true,
            kind: params,
            affected_firms,
        };
        event.disruption_id = self.store.insert_disruption(&event)?;
        log::info!(
            "disruption {} injected for days {}..={}",
            event.name,
            event.start_day,
            event.end_day
        );
        Ok(event)
    }

    fn firm_disruptions(&self, firm_id: FirmId, day: Day) -> SimResult<Vec<DisruptionEvent>> {
        Ok(self
            .store
            .active_disruptions(day)?
            .into_iter()
            .filter(|d| d.applies_to_firm(firm_id))
            .collect())
    }

    // ── Reporting ──────────────────────────────────────────────

    pub fn simulation_summary(&self) -> SimResult<SimulationSummary> {
        let mut firms = Vec::new();
        for firm in self.store.active_firms()? {
            let (total_revenue, total_profit, avg_service) =
                self.store.metric_totals(firm.firm_id)?;
            firms.push(FirmSummary {
                firm_id: firm.firm_id,
                name: firm.name.clone(),
                capital: firm.capital,
                initial_capital: firm.initial_capital,
                inventory_value: self.store.inventory_value(firm.firm_id)?,
                total_revenue,
                total_profit,
                avg_service_level_pct: avg_service,
            });
        }
        Ok(SimulationSummary {
            run_id: self.clock.run_id.clone(),
            day: self.clock.current_day,
            state: self.clock.state.as_str().to_string(),
            duration_days: self.clock.duration_days,
            firms,
        })
    }
}
