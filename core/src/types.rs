//! Shared identifiers and the fixed sales geography.

use serde::{Deserialize, Serialize};

pub type Day = i64;
pub type FirmId = i64;
pub type ProductId = i64;

/// The five sales regions. Order is fixed: demand generation, dispatch
/// validation and the audit log all iterate regions in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Andina,
    Caribe,
    Pacifica,
    Orinoquia,
    Amazonia,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Andina,
        Region::Caribe,
        Region::Pacifica,
        Region::Orinoquia,
        Region::Amazonia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Andina => "Andina",
            Region::Caribe => "Caribe",
            Region::Pacifica => "Pacifica",
            Region::Orinoquia => "Orinoquia",
            Region::Amazonia => "Amazonia",
        }
    }

    pub fn parse(s: &str) -> Option<Region> {
        Region::ALL.iter().copied().find(|r| r.as_str() == s)
    }

    /// Transit days from the central warehouse to the region.
    pub fn transit_days(&self) -> Day {
        match self {
            Region::Andina => 1,
            Region::Caribe => 2,
            Region::Pacifica => 2,
            Region::Orinoquia => 3,
            Region::Amazonia => 4,
        }
    }

    /// Stable index used for RNG stream derivation.
    pub fn index(&self) -> u64 {
        match self {
            Region::Andina => 0,
            Region::Caribe => 1,
            Region::Pacifica => 2,
            Region::Orinoquia => 3,
            Region::Amazonia => 4,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A firm as persisted. Capital is never clamped: a negative balance is
/// the insolvency signal shown to the instructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmRow {
    pub firm_id: FirmId,
    pub name: String,
    pub initial_capital: f64,
    pub capital: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_id: ProductId,
    pub code: String,
    pub name: String,
    pub base_price: f64,
    pub current_price: f64,
    pub unit_cost: f64,
    pub mean_demand: f64,
    pub demand_stddev: f64,
    pub price_elasticity: f64,
    pub lead_time_days: Day,
    pub active: bool,
}

/// Per (firm, product) stock position. `on_hand` can legitimately drop
/// below `reserved` after a disrupted sales day; reservation release
/// clamps at zero instead of assuming the invariant holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRow {
    pub inventory_id: i64,
    pub firm_id: FirmId,
    pub product_id: ProductId,
    pub on_hand: f64,
    pub reserved: f64,
    pub reorder_point: f64,
    pub safety_stock: f64,
    pub weighted_avg_cost: f64,
}

impl InventoryRow {
    /// Stock not committed to an in-transit regional dispatch.
    pub fn available(&self) -> f64 {
        (self.on_hand - self.reserved).max(0.0)
    }

    /// Costing basis for a sale: weighted average when stock has been
    /// received at least once, the catalog cost otherwise.
    pub fn cost_basis(&self, fallback_unit_cost: f64) -> f64 {
        if self.weighted_avg_cost > 0.0 {
            self.weighted_avg_cost
        } else {
            fallback_unit_cost
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    PurchaseIn,
    SaleOut,
    DispatchOut,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::PurchaseIn => "purchase_in",
            MovementType::SaleOut => "sale_out",
            MovementType::DispatchOut => "dispatch_out",
            MovementType::Adjustment => "adjustment",
        }
    }

    pub fn parse(s: &str) -> Option<MovementType> {
        match s {
            "purchase_in" => Some(MovementType::PurchaseIn),
            "sale_out" => Some(MovementType::SaleOut),
            "dispatch_out" => Some(MovementType::DispatchOut),
            "adjustment" => Some(MovementType::Adjustment),
            _ => None,
        }
    }
}

/// Append-only audit row for every stock mutation. The sale/order/dispatch
/// links are weak references by id; the movement outlives all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRow {
    pub movement_id: i64,
    pub firm_id: FirmId,
    pub product_id: ProductId,
    pub day: Day,
    pub movement_type: MovementType,
    pub qty: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub sale_id: Option<i64>,
    pub order_id: Option<i64>,
    pub dispatch_id: Option<i64>,
    pub note: Option<String>,
}
