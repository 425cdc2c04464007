//! cadena-runner: headless runner for the supply-chain simulation.
//!
//! Usage:
//!   cadena-runner --seed 12345 --days 30 --db run.db
//!   cadena-runner --config scenario.json --disrupt demand_surge:high:10
//!   cadena-runner --disrupt region_blocked:critical:5:Amazonia,Orinoquia
//!   cadena-runner --seed 7 --json

use std::env;
use std::path::Path;

use anyhow::Result;
use cadena_core::disruption::Severity;
use cadena_core::{Region, SimConfig, SimEngine, SimStore};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());
    let disrupt = args
        .windows(2)
        .find(|w| w[0] == "--disrupt")
        .map(|w| w[1].to_string());
    let json_output = args.iter().any(|a| a == "--json");

    let mut config = match config_path {
        Some(path) => SimConfig::from_file(Path::new(path))?,
        None => SimConfig::demo(seed),
    };
    config.duration_days = parse_arg(&args, "--days", config.duration_days);

    println!("cadena-runner");
    println!("  seed:  {}", config.seed);
    println!("  days:  {}", config.duration_days);
    println!("  db:    {db}");
    println!();

    let store = SimStore::open(db)?;
    let mut engine = SimEngine::bootstrap(store, &config)?;
    engine.start()?;
    log::info!("run {} started", engine.clock().run_id);

    // "--disrupt kind:severity:day[:regions]" injects a preset event when
    // the clock reaches that day.
    let scheduled = disrupt.as_deref().map(parse_disruption).transpose()?;

    while engine.clock().is_running() {
        if let Some((kind, severity, on_day, regions)) = &scheduled {
            if engine.current_day() == *on_day {
                let event =
                    engine.trigger_disruption(kind, *severity, None, Vec::new(), regions.clone())?;
                println!(
                    ">>> disruption '{}' active days {}..={}",
                    event.name, event.start_day, event.end_day
                );
            }
        }

        let summary = engine.advance_one_day()?;
        println!(
            "day {:>3}: {} sales, {} receipts, {} deliveries",
            summary.day,
            summary.total_sales,
            summary.total_orders_received,
            summary.total_dispatches_delivered
        );
        for firm in &summary.alerts {
            for alert in &firm.alerts {
                println!("    [{}] {}: {}", firm.firm, alert.product, alert.message);
            }
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&engine.simulation_summary()?)?);
    } else {
        print_summary(&engine)?;
    }
    Ok(())
}

fn print_summary(engine: &SimEngine) -> Result<()> {
    let summary = engine.simulation_summary()?;
    println!();
    println!("=== RUN SUMMARY ===");
    println!("  run_id: {}", summary.run_id);
    println!("  days:   {} of {}", summary.day, summary.duration_days);
    println!("  state:  {}", summary.state);
    println!();
    for firm in &summary.firms {
        let delta = firm.capital - firm.initial_capital;
        println!("  {}", firm.name);
        println!("    capital:       {:>14.2} ({delta:+.2})", firm.capital);
        println!("    inventory:     {:>14.2}", firm.inventory_value);
        println!("    revenue:       {:>14.2}", firm.total_revenue);
        println!("    gross profit:  {:>14.2}", firm.total_profit);
        println!("    service level: {:>13.1}%", firm.avg_service_level_pct);
    }
    Ok(())
}

fn parse_disruption(spec: &str) -> Result<(String, Severity, i64, Vec<Region>)> {
    let parts: Vec<&str> = spec.split(':').collect();
    let (kind, severity, day, regions) = match parts.as_slice() {
        [kind, severity, day] => (kind, severity, day, Vec::new()),
        [kind, severity, day, regions] => {
            let regions = regions
                .split(',')
                .map(|name| {
                    Region::parse(name).ok_or_else(|| anyhow::anyhow!("unknown region '{name}'"))
                })
                .collect::<Result<Vec<_>>>()?;
            (kind, severity, day, regions)
        }
        _ => anyhow::bail!("expected --disrupt kind:severity:day[:regions], got '{spec}'"),
    };
    let severity = Severity::parse(severity)
        .ok_or_else(|| anyhow::anyhow!("unknown severity '{severity}'"))?;
    Ok((kind.to_string(), severity, day.parse()?, regions))
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
