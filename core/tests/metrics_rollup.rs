//! Daily metric aggregation: the financial identities, service level
//! conventions and capital movement.

use cadena_core::config::{FirmSpec, ProductSpec, SimConfig};
use cadena_core::{SimEngine, SimStore};

fn product(mean: f64, stock: f64) -> ProductSpec {
    ProductSpec {
        code: "A".into(),
        name: "product A".into(),
        base_price: 150.0,
        unit_cost: 100.0,
        mean_demand: mean,
        demand_stddev: 0.0, // exact quantities
        price_elasticity: 1.5,
        lead_time_days: 3,
        initial_stock: stock,
        reorder_point: 0.0,
        safety_stock: 0.0,
    }
}

fn build_engine(seed: u64, mean: f64, stock: f64) -> SimEngine {
    let config = SimConfig {
        seed,
        duration_days: 30,
        firms: vec![FirmSpec {
            name: "Metrics Co".into(),
            initial_capital: 1_000_000.0,
        }],
        products: vec![product(mean, stock)],
    };
    let store = SimStore::in_memory().unwrap();
    SimEngine::bootstrap(store, &config).unwrap()
}

/// The canonical worked example: 50 units sold at 150 against a 100
/// weighted-average cost, no orders placed today.
#[test]
fn revenue_cogs_profit_and_capital_line_up() {
    // Mean 10 over 5 regions gives exactly 50 units of demand.
    let mut engine = build_engine(1, 10.0, 10_000.0);
    engine.start().unwrap();
    engine.advance_one_day().unwrap();

    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let metric = engine.store().metric_for_day(firm_id, 2).unwrap().unwrap();

    assert_eq!(metric.revenue, 7_500.0);
    assert_eq!(metric.cost, 5_000.0, "cogs at weighted-average cost, no spend");
    assert_eq!(metric.profit, 2_500.0);
    assert_eq!(metric.service_level_pct, 100.0);

    let firm = engine.store().get_firm(firm_id).unwrap();
    assert_eq!(firm.capital, 1_007_500.0);
}

/// Zero requested demand is a perfect service day, not a 0/0.
#[test]
fn service_level_is_hundred_when_nothing_was_requested() {
    let mut engine = build_engine(2, 0.0, 100.0);
    engine.start().unwrap();
    engine.advance_one_day().unwrap();

    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let metric = engine.store().metric_for_day(firm_id, 2).unwrap().unwrap();
    assert_eq!(metric.service_level_pct, 100.0);
    assert_eq!(metric.revenue, 0.0);
}

/// With less stock than demand the shortfall shows up as lost sales and
/// a degraded service level, and only fulfilled units earn revenue.
#[test]
fn partial_fulfilment_degrades_service_level() {
    // 50 requested, 30 on hand.
    let mut engine = build_engine(3, 10.0, 30.0);
    engine.start().unwrap();
    engine.advance_one_day().unwrap();

    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let sales = engine.store().sales_for_day(firm_id, 2).unwrap();
    let requested: f64 = sales.iter().map(|s| s.requested_qty).sum();
    let fulfilled: f64 = sales.iter().map(|s| s.fulfilled_qty).sum();
    let lost: f64 = sales.iter().map(|s| s.lost_qty).sum();
    assert_eq!(requested, 50.0);
    assert_eq!(fulfilled, 30.0);
    assert_eq!(lost, 20.0);

    let metric = engine.store().metric_for_day(firm_id, 2).unwrap().unwrap();
    assert_eq!(metric.service_level_pct, 60.0);
    assert_eq!(metric.revenue, 30.0 * 150.0);

    // Stock is exhausted, never negative.
    let product_id = engine.store().active_products().unwrap()[0].product_id;
    let inv = engine.store().get_inventory(firm_id, product_id).unwrap().unwrap();
    assert_eq!(inv.on_hand, 0.0);
}

/// Capital is allowed to go negative; insolvency is a signal, not an error.
#[test]
fn capital_goes_negative_on_overspend() {
    use cadena_core::procurement::{OrderState, PurchaseOrderRow};

    let mut engine = build_engine(4, 0.0, 0.0);
    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let product_id = engine.store().active_products().unwrap()[0].product_id;

    // An order recognized on the processed day, larger than the bank.
    engine
        .store()
        .insert_order(&PurchaseOrderRow {
            order_id: 0,
            firm_id,
            product_id,
            order_day: 2,
            due_day: 5,
            qty: 15_000.0,
            unit_cost: 100.0,
            total_cost: 1_500_000.0,
            state: OrderState::InTransit,
        })
        .unwrap();

    engine.start().unwrap();
    engine.advance_one_day().unwrap();

    let metric = engine.store().metric_for_day(firm_id, 2).unwrap().unwrap();
    assert_eq!(metric.cost, 1_500_000.0);

    let firm = engine.store().get_firm(firm_id).unwrap();
    assert_eq!(firm.capital, -500_000.0, "capital must not be clamped at zero");
}

#[test]
fn every_sale_leaves_a_movement_with_matching_balances() {
    let mut engine = build_engine(5, 10.0, 10_000.0);
    engine.start().unwrap();
    engine.advance_one_day().unwrap();

    let firm_id = engine.store().active_firms().unwrap()[0].firm_id;
    let movements = engine.store().movements_for_day(firm_id, 2).unwrap();
    assert_eq!(movements.len(), 5, "one sale movement per region");

    // Balances chain: each movement starts where the previous ended.
    for pair in movements.windows(2) {
        assert_eq!(pair[0].balance_after, pair[1].balance_before);
    }
    for m in &movements {
        assert_eq!(m.balance_before - m.qty, m.balance_after);
        assert!(m.sale_id.is_some(), "sale movements link their sale");
    }
}
