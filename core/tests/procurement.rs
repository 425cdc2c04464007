//! Purchase order lifecycle: placement, capital accounting, receipt and
//! weighted-average costing.

use cadena_core::config::{FirmSpec, ProductSpec, SimConfig};
use cadena_core::disruption::{DisruptionEvent, DisruptionKind, Severity};
use cadena_core::procurement::OrderState;
use cadena_core::{SimEngine, SimError, SimStore};

fn build_engine(seed: u64, capital: f64, initial_stock: f64) -> SimEngine {
    let config = SimConfig {
        seed,
        duration_days: 30,
        firms: vec![FirmSpec {
            name: "Buyer".into(),
            initial_capital: capital,
        }],
        products: vec![ProductSpec {
            code: "A".into(),
            name: "product A".into(),
            base_price: 150.0,
            unit_cost: 100.0,
            mean_demand: 0.0, // no demand noise in these tests
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

#[test]
fn order_placement_debits_capital_and_sets_due_day() {
    let engine = build_engine(1, 100_000.0, 0.0);
    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let product_id = engine.store().active_products().unwrap()[0].product_id;

    let order = engine.place_purchase_order(firm_id, product_id, 200.0).unwrap();
    assert_eq!(order.total_cost, 20_000.0);
    assert_eq!(order.due_day, 1 + 3);
    assert_eq!(order.state, OrderState::InTransit);

    // Spend is recognized at placement.
    assert_eq!(engine.store().get_firm(firm_id).unwrap().capital, 80_000.0);
}

#[test]
fn free_capital_nets_out_in_transit_orders() {
    let engine = build_engine(2, 100_000.0, 0.0);
    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let product_id = engine.store().active_products().unwrap()[0].product_id;

    // First order commits 60k of the 100k.
    engine.place_purchase_order(firm_id, product_id, 600.0).unwrap();

    // Free capital is the debited balance minus the committed in-transit
    // value: 40k - 60k < 0, so any further order must fail.
    let err = engine.place_purchase_order(firm_id, product_id, 100.0);
    match err {
        Err(SimError::InsufficientCapital { needed, free }) => {
            assert_eq!(needed, 10_000.0);
            assert!(free < 0.0, "free capital should be negative, got {free}");
        }
        other => panic!("expected InsufficientCapital, got {other:?}"),
    }

    // The failed order left no trace.
    assert_eq!(engine.store().get_firm(firm_id).unwrap().capital, 40_000.0);
    assert_eq!(engine.store().orders_in_transit(firm_id).unwrap().len(), 1);
}

#[test]
fn receipt_blends_weighted_average_cost() {
    let mut engine = build_engine(3, 1_000_000.0, 100.0);
    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let product_id = engine.store().active_products().unwrap()[0].product_id;

    // 100 units on hand at 100/unit. Order 50 more; a 60% cost increase
    // makes them land at 160/unit.
    let shock = DisruptionEvent {
        disruption_id: 0,
        name: "import tariff".into(),
        description: None,
        severity: Severity::Critical,
        start_day: 1,
        end_day: 20,
        active: true,
        kind: DisruptionKind::CostIncrease {
            increase_pct: 60.0,
            products: vec![],
        },
        affected_firms: None,
    };
    engine.store().insert_disruption(&shock).unwrap();

    let order = engine.place_purchase_order(firm_id, product_id, 50.0).unwrap();
    assert_eq!(order.unit_cost, 160.0);

    engine.start().unwrap();
    for _ in 0..3 {
        engine.advance_one_day().unwrap();
    }

    // Due on day 4 = 1 + 3 lead days.
    let order = engine.store().get_order(order.order_id).unwrap();
    assert_eq!(order.state, OrderState::Received);

    let inv = engine
        .store()
        .get_inventory(firm_id, product_id)
        .unwrap()
        .unwrap();
    assert_eq!(inv.on_hand, 150.0);
    // (100 * 100 + 50 * 160) / 150 = 120
    assert!((inv.weighted_avg_cost - 120.0).abs() < 1e-9);
}

#[test]
fn supplier_delay_extends_the_due_day() {
    let engine = build_engine(4, 1_000_000.0, 0.0);
    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let product_id = engine.store().active_products().unwrap()[0].product_id;

    let delay = DisruptionEvent {
        disruption_id: 0,
        name: "port congestion".into(),
        description: None,
        severity: Severity::Medium,
        start_day: 1,
        end_day: 10,
        active: true,
        kind: DisruptionKind::SupplierDelay {
            extra_days: 5,
            products: vec![],
        },
        affected_firms: None,
    };
    engine.store().insert_disruption(&delay).unwrap();

    let order = engine.place_purchase_order(firm_id, product_id, 10.0).unwrap();
    assert_eq!(order.due_day, 1 + 3 + 5);
}

/// Stock for a product the firm never stocked before lands in a lazily
/// created inventory row instead of being dropped.
#[test]
fn receipt_creates_missing_inventory_row() {
    let mut engine = build_engine(5, 1_000_000.0, 0.0);
    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;

    // A product added after the firm was seeded has no inventory row.
    let product_id = engine
        .store()
        .insert_product("B", "late product", 90.0, 55.0, 0.0, 0.0, 1.0, 2)
        .unwrap();
    assert!(engine.store().get_inventory(firm_id, product_id).unwrap().is_none());

    engine.place_purchase_order(firm_id, product_id, 30.0).unwrap();
    engine.start().unwrap();
    engine.advance_one_day().unwrap();
    engine.advance_one_day().unwrap();

    let inv = engine
        .store()
        .get_inventory(firm_id, product_id)
        .unwrap()
        .expect("inventory row created at receipt");
    assert_eq!(inv.on_hand, 30.0);
    assert_eq!(inv.weighted_avg_cost, 55.0);
}

#[test]
fn rejects_nonpositive_quantities_and_prices() {
    let engine = build_engine(6, 1_000_000.0, 0.0);
    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let product_id = engine.store().active_products().unwrap()[0].product_id;

    assert!(engine.place_purchase_order(firm_id, product_id, 0.0).is_err());
    assert!(engine.place_purchase_order(firm_id, product_id, -5.0).is_err());
    assert!(matches!(
        engine.set_price(product_id, 0.0),
        Err(SimError::InvalidPrice(_))
    ));
    assert!(matches!(
        engine.set_price(product_id, -10.0),
        Err(SimError::InvalidPrice(_))
    ));
    engine.set_price(product_id, 175.0).unwrap();
    assert_eq!(
        engine.store().get_product(product_id).unwrap().current_price,
        175.0
    );
}
