//! Regional dispatch lifecycle: reservation at creation, region
//! blocks, capacity limits and delivery on the due day.

use cadena_core::config::{FirmSpec, ProductSpec, SimConfig};
use cadena_core::dispatch::DispatchState;
use cadena_core::disruption::{DisruptionEvent, DisruptionKind, Severity};
use cadena_core::{Region, SimEngine, SimError, SimStore};

fn build_engine(seed: u64, initial_stock: f64) -> SimEngine {
    let config = SimConfig {
        seed,
        duration_days: 30,
        firms: vec![FirmSpec {
            name: "Shipper".into(),
            initial_capital: 1_000_000.0,
        }],
        products: vec![ProductSpec {
            code: "A".into(),
            name: "product A".into(),
            base_price: 150.0,
            unit_cost: 100.0,
            mean_demand: 0.0,
            demand_stddev: 0.0,
            price_elasticity: 1.5,
            lead_time_days: 3,
            initial_stock,
            reorder_point: 50.0,
            safety_stock: 20.0,
        }],
    };
    let store = SimStore::in_memory().unwrap();
    SimEngine::bootstrap(store, &config).unwrap()
}

fn ids(engine: &SimEngine) -> (i64, i64) {
    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let product_id = engine.store().active_products().unwrap()[0].product_id;
    (firm_id, product_id)
}

#[test]
fn dispatch_reserves_stock_and_uses_region_transit_time() {
    let engine = build_engine(1, 500.0);
    let (firm_id, product_id) = ids(&engine);

    let dispatch = engine
        .create_dispatch(firm_id, product_id, Region::Amazonia, 120.0)
        .unwrap();
    assert_eq!(dispatch.estimated_due_day, 1 + 4, "Amazonia is 4 transit days");
    assert_eq!(dispatch.state, DispatchState::InTransit);

    let inv = engine.store().get_inventory(firm_id, product_id).unwrap().unwrap();
    assert_eq!(inv.on_hand, 380.0);
    assert_eq!(inv.reserved, 120.0);

    // The reservation shrinks what a second dispatch can take.
    let err = engine.create_dispatch(firm_id, product_id, Region::Andina, 300.0);
    match err {
        Err(SimError::InsufficientStock { requested, available }) => {
            assert_eq!(requested, 300.0);
            assert_eq!(available, 260.0); // 380 on hand - 120 reserved
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
}

#[test]
fn delivery_on_due_day_releases_the_reservation() {
    let mut engine = build_engine(2, 500.0);
    let (firm_id, product_id) = ids(&engine);

    let dispatch = engine
        .create_dispatch(firm_id, product_id, Region::Andina, 80.0)
        .unwrap();
    assert_eq!(dispatch.estimated_due_day, 2);

    engine.start().unwrap();
    let summary = engine.advance_one_day().unwrap();
    assert_eq!(summary.total_dispatches_delivered, 1);

    let stored = engine.store().get_dispatch(dispatch.dispatch_id).unwrap();
    assert_eq!(stored.state, DispatchState::Delivered);
    assert_eq!(stored.actual_due_day, Some(2));

    let inv = engine.store().get_inventory(firm_id, product_id).unwrap().unwrap();
    assert_eq!(inv.reserved, 0.0);
    assert_eq!(inv.on_hand, 420.0, "delivery releases the hold, stock already left");
}

#[test]
fn blocked_region_refuses_new_dispatches() {
    let engine = build_engine(3, 500.0);
    let (firm_id, product_id) = ids(&engine);

    let block = DisruptionEvent {
        disruption_id: 0,
        name: "road closure".into(),
        description: None,
        severity: Severity::High,
        start_day: 1,
        end_day: 8,
        active: true,
        kind: DisruptionKind::RegionBlocked {
            regions: vec![Region::Orinoquia],
            block_days: 6,
            reason: "landslide on the main corridor".into(),
        },
        affected_firms: None,
    };
    engine.store().insert_disruption(&block).unwrap();

    let err = engine.create_dispatch(firm_id, product_id, Region::Orinoquia, 10.0);
    match err {
        Err(SimError::RegionUnavailable { region, reason }) => {
            assert_eq!(region, "Orinoquia");
            assert_eq!(reason, "landslide on the main corridor");
        }
        other => panic!("expected RegionUnavailable, got {other:?}"),
    }

    // Other regions stay open.
    engine
        .create_dispatch(firm_id, product_id, Region::Caribe, 10.0)
        .unwrap();
}

#[test]
fn capacity_reduction_limits_dispatchable_quantity() {
    let engine = build_engine(4, 1000.0);
    let (firm_id, product_id) = ids(&engine);

    let squeeze = DisruptionEvent {
        disruption_id: 0,
        name: "carrier strike".into(),
        description: None,
        severity: Severity::High,
        start_day: 1,
        end_day: 12,
        active: true,
        kind: DisruptionKind::CapacityReduction {
            reduction_pct: 50.0,
            regions: vec![Region::Pacifica],
        },
        affected_firms: None,
    };
    engine.store().insert_disruption(&squeeze).unwrap();

    // 1000 available but only 50% can move to Pacifica.
    let err = engine.create_dispatch(firm_id, product_id, Region::Pacifica, 600.0);
    match err {
        Err(SimError::InsufficientStock { available, .. }) => assert_eq!(available, 500.0),
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    engine
        .create_dispatch(firm_id, product_id, Region::Pacifica, 500.0)
        .unwrap();

    let inv = engine.store().get_inventory(firm_id, product_id).unwrap().unwrap();
    assert_eq!(inv.available(), 0.0); // 500 on hand, 500 reserved
}
