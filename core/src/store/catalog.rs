//! Firm and product catalog queries.

use super::SimStore;
use crate::error::{SimError, SimResult};
use crate::types::{FirmId, FirmRow, ProductId, ProductRow};
use rusqlite::params;

impl SimStore {
    pub fn insert_firm(&self, name: &str, initial_capital: f64) -> SimResult<FirmId> {
        self.conn().execute(
            "INSERT INTO firm (name, initial_capital, capital) VALUES (?1, ?2, ?2)",
            params![name, initial_capital],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// Active firms in ascending id order, which is the pipeline's firm order.
    pub fn active_firms(&self) -> SimResult<Vec<FirmRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT firm_id, name, initial_capital, capital, active
             FROM firm WHERE active = 1 ORDER BY firm_id",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(FirmRow {
                    firm_id: r.get(0)?,
                    name: r.get(1)?,
                    initial_capital: r.get(2)?,
                    capital: r.get(3)?,
                    active: r.get::<_, i64>(4)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_firm(&self, firm_id: FirmId) -> SimResult<FirmRow> {
        self.conn()
            .query_row(
                "SELECT firm_id, name, initial_capital, capital, active
                 FROM firm WHERE firm_id = ?1",
                params![firm_id],
                |r| {
                    Ok(FirmRow {
                        firm_id: r.get(0)?,
                        name: r.get(1)?,
                        initial_capital: r.get(2)?,
                        capital: r.get(3)?,
                        active: r.get::<_, i64>(4)? != 0,
                    })
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => SimError::UnknownFirm(firm_id),
                other => other.into(),
            })
    }

    pub fn update_firm_capital(&self, firm_id: FirmId, capital: f64) -> SimResult<()> {
        self.conn().execute(
            "UPDATE firm SET capital = ?1 WHERE firm_id = ?2",
            params![capital, firm_id],
        )?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_product(
        &self,
        code: &str,
        name: &str,
        base_price: f64,
        unit_cost: f64,
        mean_demand: f64,
        demand_stddev: f64,
        price_elasticity: f64,
        lead_time_days: i64,
    ) -> SimResult<ProductId> {
        self.conn().execute(
            "INSERT INTO product (code, name, base_price, current_price, unit_cost,
                                  mean_demand, demand_stddev, price_elasticity, lead_time_days)
             VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                code,
                name,
                base_price,
                unit_cost,
                mean_demand,
                demand_stddev,
                price_elasticity,
                lead_time_days
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// Active catalog in ascending id order, which is the pipeline's product order.
    pub fn active_products(&self) -> SimResult<Vec<ProductRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT product_id, code, name, base_price, current_price, unit_cost,
                    mean_demand, demand_stddev, price_elasticity, lead_time_days, active
             FROM product WHERE active = 1 ORDER BY product_id",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(ProductRow {
                    product_id: r.get(0)?,
                    code: r.get(1)?,
                    name: r.get(2)?,
                    base_price: r.get(3)?,
                    current_price: r.get(4)?,
                    unit_cost: r.get(5)?,
                    mean_demand: r.get(6)?,
                    demand_stddev: r.get(7)?,
                    price_elasticity: r.get(8)?,
                    lead_time_days: r.get(9)?,
                    active: r.get::<_, i64>(10)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_product(&self, product_id: ProductId) -> SimResult<ProductRow> {
        self.conn()
            .query_row(
                "SELECT product_id, code, name, base_price, current_price, unit_cost,
                        mean_demand, demand_stddev, price_elasticity, lead_time_days, active
                 FROM product WHERE product_id = ?1",
                params![product_id],
                |r| {
                    Ok(ProductRow {
                        product_id: r.get(0)?,
                        code: r.get(1)?,
                        name: r.get(2)?,
                        base_price: r.get(3)?,
                        current_price: r.get(4)?,
                        unit_cost: r.get(5)?,
                        mean_demand: r.get(6)?,
                        demand_stddev: r.get(7)?,
                        price_elasticity: r.get(8)?,
                        lead_time_days: r.get(9)?,
                        active: r.get::<_, i64>(10)? != 0,
                    })
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => SimError::UnknownProduct(product_id),
                other => other.into(),
            })
    }

    pub fn update_product_price(&self, product_id: ProductId, price: f64) -> SimResult<()> {
        let changed = self.conn().execute(
            "UPDATE product SET current_price = ?1 WHERE product_id = ?2",
            params![price, product_id],
        )?;
        if changed == 0 {
            return Err(SimError::UnknownProduct(product_id));
        }
        Ok(())
    }
}
