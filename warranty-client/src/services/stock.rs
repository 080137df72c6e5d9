//! Regional stock service

use tracing::info;

use shared::models::{
    RegionStock, Stock, apply_delta, checked_quantity, region_totals, synthetic_id,
    validate_stock_key,
};
use shared::schema::RecordFilter;
use shared::util::now;

use super::repository::Repository;
use crate::ClientResult;

#[derive(Clone)]
pub struct StockService {
    repo: Repository<Stock>,
}

impl StockService {
    pub fn new(repo: Repository<Stock>) -> Self {
        Self { repo }
    }

    /// Stock rows, optionally for one region
    pub async fn list(&self, region: Option<&str>) -> Vec<Stock> {
        self.repo
            .list(&RecordFilter::new().eq_opt("region", region))
            .await
    }

    pub async fn get(&self, region: &str, model_name: &str) -> Option<Stock> {
        let filter = RecordFilter::new()
            .eq("region", region)
            .eq("modelName", model_name);
        self.repo.find_by(&filter).await
    }

    /// Set the quantity for (region, model). Repeated calls keep one row.
    pub async fn update_stock(
        &self,
        region: &str,
        model_name: &str,
        quantity: i64,
    ) -> ClientResult<Stock> {
        validate_stock_key(region, model_name)?;
        let quantity = checked_quantity(quantity)?;
        let stock = self
            .repo
            .upsert(Stock::new(region.trim(), model_name.trim(), quantity, now()))
            .await?;
        info!(id = %stock.id, quantity, "Stock updated");
        Ok(stock)
    }

    /// Add `delta` (may be negative) to the current quantity, clamping at 0
    pub async fn adjust_stock(
        &self,
        region: &str,
        model_name: &str,
        delta: i64,
    ) -> ClientResult<Stock> {
        validate_stock_key(region, model_name)?;
        let (region, model_name) = (region.trim(), model_name.trim());
        let filter = RecordFilter::new()
            .eq("region", region)
            .eq("modelName", model_name);
        // A failed read must not be mistaken for an empty row
        let current = self
            .repo
            .fetch_by(&filter)
            .await?
            .map(|s| s.quantity)
            .unwrap_or(0);
        let quantity = apply_delta(current, delta);
        let stock = self
            .repo
            .upsert(Stock::new(region, model_name, quantity, now()))
            .await?;
        info!(
            id = %synthetic_id(region, model_name),
            from = current,
            to = quantity,
            "Stock adjusted"
        );
        Ok(stock)
    }

    /// Totals per region
    pub async fn region_totals(&self) -> Vec<RegionStock> {
        region_totals(&self.list(None).await)
    }
}
