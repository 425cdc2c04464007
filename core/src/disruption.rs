//! Instructor-injected disruption events and the pure resolver that
//! turns them into adjustment factors.
//!
//! RULES:
//!   - Resolver functions are pure: same inputs, same outputs, no store
//!     access and no mutation.
//!   - An empty product or region filter on an event means "applies to
//!     everything"; a non-empty filter requires membership.
//!   - Demand surges multiply, supplier delays and cost increases add,
//!     capacity reductions add with a 90% cap, region blocks short-circuit
//!     on the first match.

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::types::{Day, FirmId, ProductId, Region};

/// Total capacity reduction is capped here no matter how many events stack.
pub const MAX_CAPACITY_REDUCTION_PCT: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Severity> {
        match s {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

/// Typed parameter payload, one variant per disruption type. Persisted as
/// a tagged JSON blob; deserialization rejects unknown types at the
/// boundary instead of carrying an untyped map around.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisruptionKind {
    SupplierDelay {
        extra_days: Day,
        #[serde(default)]
        products: Vec<ProductId>,
    },
    DemandSurge {
        multiplier: f64,
        #[serde(default)]
        products: Vec<ProductId>,
        #[serde(default)]
        regions: Vec<Region>,
    },
    CapacityReduction {
        reduction_pct: f64,
        #[serde(default)]
        regions: Vec<Region>,
    },
    CostIncrease {
        increase_pct: f64,
        #[serde(default)]
        products: Vec<ProductId>,
    },
    RegionBlocked {
        regions: Vec<Region>,
        block_days: Day,
        #[serde(default)]
        reason: String,
    },
}

impl DisruptionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            DisruptionKind::SupplierDelay { .. } => "supplier_delay",
            DisruptionKind::DemandSurge { .. } => "demand_surge",
            DisruptionKind::CapacityReduction { .. } => "capacity_reduction",
            DisruptionKind::CostIncrease { .. } => "cost_increase",
            DisruptionKind::RegionBlocked { .. } => "region_blocked",
        }
    }

    pub fn from_json(json: &str) -> SimResult<DisruptionKind> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply instructor-chosen product and region targets to a payload.
    /// Each variant takes only the filters it has; the rest are dropped.
    pub fn with_targets(self, products: Vec<ProductId>, regions: Vec<Region>) -> DisruptionKind {
        match self {
            DisruptionKind::SupplierDelay { extra_days, .. } => {
                DisruptionKind::SupplierDelay { extra_days, products }
            }
            DisruptionKind::DemandSurge { multiplier, .. } => DisruptionKind::DemandSurge {
                multiplier,
                products,
                regions,
            },
            DisruptionKind::CapacityReduction { reduction_pct, .. } => {
                DisruptionKind::CapacityReduction { reduction_pct, regions }
            }
            DisruptionKind::CostIncrease { increase_pct, .. } => {
                DisruptionKind::CostIncrease { increase_pct, products }
            }
            DisruptionKind::RegionBlocked {
                block_days, reason, ..
            } => DisruptionKind::RegionBlocked {
                regions,
                block_days,
                reason,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisruptionEvent {
    pub disruption_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub start_day: Day,
    pub end_day: Day,
    pub active: bool,
    pub kind: DisruptionKind,
    /// None = every firm is affected.
    pub affected_firms: Option<Vec<FirmId>>,
}

impl DisruptionEvent {
    pub fn is_active(&self, day: Day) -> bool {
        self.active && self.start_day <= day && day <= self.end_day
    }

    pub fn applies_to_firm(&self, firm: FirmId) -> bool {
        match &self.affected_firms {
            None => true,
            Some(firms) => firms.contains(&firm),
        }
    }
}

fn product_matches(filter: &[ProductId], product: ProductId) -> bool {
    filter.is_empty() || filter.contains(&product)
}

fn region_matches(filter: &[Region], region: Region) -> bool {
    filter.is_empty() || filter.contains(&region)
}

/// Demand multiplier for one (product, region, day) cell: the product of
/// every matching active surge.
pub fn adjusted_demand(
    product: ProductId,
    region: Region,
    base_demand: f64,
    day: Day,
    disruptions: &[DisruptionEvent],
) -> f64 {
    let mut multiplier = 1.0;
    for d in disruptions {
        if !d.is_active(day) {
            continue;
        }
        if let DisruptionKind::DemandSurge {
            multiplier: m,
            products,
            regions,
        } = &d.kind
        {
            if product_matches(products, product) && region_matches(regions, region) {
                multiplier *= m;
            }
        }
    }
    base_demand * multiplier
}

/// Additional supplier lead-time days for a product. Additive across events.
pub fn lead_time_addition(product: ProductId, day: Day, disruptions: &[DisruptionEvent]) -> Day {
    let mut extra = 0;
    for d in disruptions {
        if !d.is_active(day) {
            continue;
        }
        if let DisruptionKind::SupplierDelay {
            extra_days,
            products,
        } = &d.kind
        {
            if product_matches(products, product) {
                extra += extra_days;
            }
        }
    }
    extra
}

/// Remaining logistics capacity fraction for a region. Reductions add up
/// but never past [`MAX_CAPACITY_REDUCTION_PCT`].
pub fn capacity_factor(region: Region, day: Day, disruptions: &[DisruptionEvent]) -> f64 {
    let mut reduction = 0.0;
    for d in disruptions {
        if !d.is_active(day) {
            continue;
        }
        if let DisruptionKind::CapacityReduction {
            reduction_pct,
            regions,
        } = &d.kind
        {
            if region_matches(regions, region) {
                reduction += reduction_pct;
            }
        }
    }
    1.0 - reduction.min(MAX_CAPACITY_REDUCTION_PCT) / 100.0
}

/// Procurement cost factor for a product. Percentage increases add up;
/// two events of 10% and 20% yield 1.30, not 1.1 * 1.2.
pub fn cost_factor(product: ProductId, day: Day, disruptions: &[DisruptionEvent]) -> f64 {
    let mut increase = 0.0;
    for d in disruptions {
        if !d.is_active(day) {
            continue;
        }
        if let DisruptionKind::CostIncrease {
            increase_pct,
            products,
        } = &d.kind
        {
            if product_matches(products, product) {
                increase += increase_pct;
            }
        }
    }
    1.0 + increase / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionAccess {
    pub available: bool,
    pub extra_block_days: Day,
    pub reason: String,
}

impl RegionAccess {
    fn open() -> Self {
        Self {
            available: true,
            extra_block_days: 0,
            reason: String::new(),
        }
    }
}

/// Whether a region can receive dispatches today. First matching block
/// wins; blocks do not aggregate.
pub fn region_available(region: Region, day: Day, disruptions: &[DisruptionEvent]) -> RegionAccess {
    for d in disruptions {
        if !d.is_active(day) {
            continue;
        }
        if let DisruptionKind::RegionBlocked {
            regions,
            block_days,
            reason,
        } = &d.kind
        {
            if regions.contains(&region) {
                return RegionAccess {
                    available: false,
                    extra_block_days: *block_days,
                    reason: if reason.is_empty() {
                        "region temporarily unreachable".to_string()
                    } else {
                        reason.clone()
                    },
                };
            }
        }
    }
    RegionAccess::open()
}

/// Predefined severity presets for instructor-triggered events. Duration
/// is in days from the start day.
pub fn catalog_preset(kind: &str, severity: Severity) -> Option<(DisruptionKind, Day)> {
    let preset = match (kind, severity) {
        ("supplier_delay", Severity::Low) => (supplier_delay(2), 3),
        ("supplier_delay", Severity::Medium) => (supplier_delay(5), 7),
        ("supplier_delay", Severity::High) => (supplier_delay(10), 10),
        ("supplier_delay", Severity::Critical) => (supplier_delay(15), 14),
        ("demand_surge", Severity::Low) => (demand_surge(1.3), 5),
        ("demand_surge", Severity::Medium) => (demand_surge(1.8), 10),
        ("demand_surge", Severity::High) => (demand_surge(2.5), 7),
        ("demand_surge", Severity::Critical) => (demand_surge(3.5), 15),
        ("capacity_reduction", Severity::Low) => (capacity_reduction(15.0), 5),
        ("capacity_reduction", Severity::Medium) => (capacity_reduction(30.0), 7),
        ("capacity_reduction", Severity::High) => (capacity_reduction(50.0), 12),
        ("capacity_reduction", Severity::Critical) => (capacity_reduction(75.0), 10),
        ("cost_increase", Severity::Low) => (cost_increase(10.0), 10),
        ("cost_increase", Severity::Medium) => (cost_increase(20.0), 15),
        ("cost_increase", Severity::High) => (cost_increase(35.0), 20),
        ("cost_increase", Severity::Critical) => (cost_increase(60.0), 25),
        ("region_blocked", Severity::Low) => (region_blocked(2), 3),
        ("region_blocked", Severity::Medium) => (region_blocked(5), 8),
        ("region_blocked", Severity::High) => (region_blocked(7), 10),
        ("region_blocked", Severity::Critical) => (region_blocked(12), 15),
        _ => return None,
    };
    Some(preset)
}

fn supplier_delay(extra_days: Day) -> DisruptionKind {
    DisruptionKind::SupplierDelay {
        extra_days,
        products: vec![],
    }
}

fn demand_surge(multiplier: f64) -> DisruptionKind {
    DisruptionKind::DemandSurge {
        multiplier,
        products: vec![],
        regions: vec![],
    }
}

fn capacity_reduction(reduction_pct: f64) -> DisruptionKind {
    DisruptionKind::CapacityReduction {
        reduction_pct,
        regions: vec![],
    }
}

fn cost_increase(increase_pct: f64) -> DisruptionKind {
    DisruptionKind::CostIncrease {
        increase_pct,
        products: vec![],
    }
}

fn region_blocked(block_days: Day) -> DisruptionKind {
    DisruptionKind::RegionBlocked {
        regions: vec![],
        block_days,
        reason: String::new(),
    }
}
