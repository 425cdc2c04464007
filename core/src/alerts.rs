//! Stock level alert scanning. Pure classification over inventory rows;
//! nothing is persisted, alerts live only in the advance summary.

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::store::SimStore;
use crate::types::{FirmId, InventoryRow};

/// Overstock threshold as a multiple of the reorder point.
const OVERSTOCK_FACTOR: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub product: String,
    pub message: String,
}

/// Classify one inventory row. Critical (at or below safety stock) takes
/// precedence over warning; the overstock check is independent and can
/// coexist with neither low-stock alert firing.
pub fn classify(inventory: &InventoryRow, product_name: &str) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if inventory.on_hand <= inventory.safety_stock {
        alerts.push(Alert {
            severity: AlertSeverity::Critical,
            product: product_name.to_string(),
            message: format!(
                "critical stock: {:.0} units (safety stock {:.0})",
                inventory.on_hand, inventory.safety_stock
            ),
        });
    } else if inventory.on_hand <= inventory.reorder_point {
        alerts.push(Alert {
            severity: AlertSeverity::Warning,
            product: product_name.to_string(),
            message: format!(
                "below reorder point: {:.0} units (reorder at {:.0})",
                inventory.on_hand, inventory.reorder_point
            ),
        });
    }

    if inventory.reorder_point > 0.0 && inventory.on_hand > OVERSTOCK_FACTOR * inventory.reorder_point
    {
        alerts.push(Alert {
            severity: AlertSeverity::Info,
            product: product_name.to_string(),
            message: format!(
                "overstock: {:.0} units (more than {OVERSTOCK_FACTOR:.0}x reorder point)",
                inventory.on_hand
            ),
        });
    }

    alerts
}

/// Scan a firm's whole inventory, ordered by product id.
pub fn scan_firm(store: &SimStore, firm_id: FirmId) -> SimResult<Vec<Alert>> {
    let mut alerts = Vec::new();
    for inventory in store.inventories_for_firm(firm_id)? {
        let product = store.get_product(inventory.product_id)?;
        alerts.extend(classify(&inventory, &product.name));
    }
    Ok(alerts)
}
