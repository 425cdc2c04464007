//! Core engine for a multi-firm supply-chain teaching simulation.
//!
//! Firms share a product catalog and sell into five fixed regions. Time
//! moves in whole days: each advance draws demand, resolves sales,
//! receives due purchase orders, delivers due regional dispatches and
//! rolls up per-firm metrics, all inside one database transaction.
//! Instructors inject disruptions; students price, buy and dispatch
//! between advances.

pub mod alerts;
pub mod clock;
pub mod config;
pub mod decisions;
pub mod demand;
pub mod dispatch;
pub mod disruption;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod planning;
pub mod procurement;
pub mod rng;
pub mod store;
pub mod types;

pub use clock::{ClockState, SimulationClock, RESET_CONFIRMATION};
pub use config::SimConfig;
pub use engine::{DaySummary, SimEngine, SimulationSummary};
pub use error::{SimError, SimResult};
pub use store::SimStore;
pub use types::{Day, FirmId, ProductId, Region};
