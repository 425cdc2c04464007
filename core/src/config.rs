//! Scenario configuration and database bootstrap.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::SimulationClock;
use crate::error::SimResult;
use crate::store::SimStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmSpec {
    pub name: String,
    pub initial_capital: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSpec {
    pub code: String,
    pub name: String,
    pub base_price: f64,
    pub unit_cost: f64,
    pub mean_demand: f64,
    pub demand_stddev: f64,
    pub price_elasticity: f64,
    pub lead_time_days: i64,
    pub initial_stock: f64,
    pub reorder_point: f64,
    pub safety_stock: f64,
}

/// Full scenario definition: the master seed, run length, competing
/// firms and the shared product catalog every firm starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub seed: u64,
    pub duration_days: i64,
    pub firms: Vec<FirmSpec>,
    pub products: Vec<ProductSpec>,
}

impl SimConfig {
    pub fn from_file(path: &Path) -> SimResult<SimConfig> {
        let raw = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Built-in classroom scenario: three firms, four products, thirty
    /// days. Used by the runner when no config file is given.
    pub fn demo(seed: u64) -> SimConfig {
        let product = |code: &str,
                       name: &str,
                       base_price: f64,
                       unit_cost: f64,
                       mean: f64,
                       stddev: f64,
                       lead: i64,
                       stock: f64| ProductSpec {
            code: code.to_string(),
            name: name.to_string(),
            base_price,
            unit_cost,
            mean_demand: mean,
            demand_stddev: stddev,
            price_elasticity: 1.5,
            lead_time_days: lead,
            initial_stock: stock,
            reorder_point: mean * 3.0,
            safety_stock: mean,
        };
        SimConfig {
            seed,
            duration_days: 30,
            firms: vec![
                FirmSpec {
                    name: "Distribuidora Andina".to_string(),
                    initial_capital: 1_000_000.0,
                },
                FirmSpec {
                    name: "Comercial del Caribe".to_string(),
                    initial_capital: 1_000_000.0,
                },
                FirmSpec {
                    name: "Suministros del Pacifico".to_string(),
                    initial_capital: 1_000_000.0,
                },
            ],
            products: vec![
                product("SKU-001", "Cafe premium 500g", 150.0, 100.0, 40.0, 8.0, 3, 600.0),
                product("SKU-002", "Panela organica 1kg", 80.0, 45.0, 60.0, 12.0, 2, 900.0),
                product("SKU-003", "Aceite de palma 1L", 120.0, 75.0, 25.0, 6.0, 4, 400.0),
                product("SKU-004", "Harina de maiz 1kg", 60.0, 32.0, 80.0, 15.0, 2, 1200.0),
            ],
        }
    }
}

/// Seed a fresh database from a scenario: firms, shared catalog, initial
/// central stock valued at unit cost, and the paused day-1 clock.
pub fn bootstrap(store: &SimStore, config: &SimConfig) -> SimResult<SimulationClock> {
    let run_id = uuid::Uuid::new_v4().to_string();
    let clock = SimulationClock::new(run_id, config.duration_days);
    store.init_clock(&clock)?;

    let mut product_ids = Vec::with_capacity(config.products.len());
    for spec in &config.products {
        let id = store.insert_product(
            &spec.code,
            &spec.name,
            spec.base_price,
            spec.unit_cost,
            spec.mean_demand,
            spec.demand_stddev,
            spec.price_elasticity,
            spec.lead_time_days,
        )?;
        product_ids.push(id);
    }

    for spec in &config.firms {
        let firm_id = store.insert_firm(&spec.name, spec.initial_capital)?;
        for (product_id, product_spec) in product_ids.iter().zip(&config.products) {
            store.insert_inventory(
                firm_id,
                *product_id,
                product_spec.initial_stock,
                product_spec.reorder_point,
                product_spec.safety_stock,
                product_spec.unit_cost,
            )?;
        }
    }

    log::info!(
        "bootstrapped scenario: {} firms, {} products, {} days",
        config.firms.len(),
        config.products.len(),
        config.duration_days
    );
    Ok(clock)
}
