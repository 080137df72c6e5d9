//! Sales / warranty service

use std::sync::Arc;
use tracing::info;

use shared::ids::{CodePrefix, display_code, new_record_id};
use shared::models::{
    DEFAULT_WARRANTY_MONTHS, RegionSales, Sale, SaleCreate, SaleStats, SaleStatus,
    StatusTransition, group_by_region,
};
use shared::schema::RecordFilter;
use shared::util::{non_empty, now, today};
use shared::validation::validate_image_refs;

use super::repository::Repository;
use crate::ClientResult;
use crate::upload::{AttachmentKind, ImageUploadPipeline, ProgressFn};

/// List filter for sales
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub branch_id: Option<String>,
    pub region: Option<String>,
    pub status: Option<SaleStatus>,
}

impl SaleFilter {
    pub fn branch(branch_id: impl Into<String>) -> Self {
        Self {
            branch_id: Some(branch_id.into()),
            ..Self::default()
        }
    }

    pub fn region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Self::default()
        }
    }

    fn to_record_filter(&self) -> RecordFilter {
        RecordFilter::new()
            .eq_opt("branchId", self.branch_id.clone())
            .eq_opt("region", self.region.clone())
            .eq_opt("status", self.status.map(StatusTransition::label))
    }
}

#[derive(Clone)]
pub struct SalesService {
    repo: Repository<Sale>,
    pipeline: Arc<ImageUploadPipeline>,
}

impl SalesService {
    pub fn new(repo: Repository<Sale>, pipeline: Arc<ImageUploadPipeline>) -> Self {
        Self { repo, pipeline }
    }

    /// Sales matching `filter`, newest first. Never fails.
    pub async fn list(&self, filter: &SaleFilter) -> Vec<Sale> {
        self.repo.list(&filter.to_record_filter()).await
    }

    /// Look up by id or warranty code
    pub async fn get(&self, id_or_code: &str) -> Option<Sale> {
        self.repo.find(id_or_code).await
    }

    /// Register a sale. Images are uploaded first; the sale is created
    /// approved with its warranty running from the sale date.
    pub async fn create(
        &self,
        input: SaleCreate,
        images: &[String],
        progress: Option<&ProgressFn>,
    ) -> ClientResult<Sale> {
        input.validate()?;
        validate_image_refs(images)?;

        let id = new_record_id();
        let image_urls = self
            .pipeline
            .upload_all(AttachmentKind::Sale, &id, images, progress)
            .await;

        let sale = Sale {
            warranty_id: display_code(CodePrefix::Warranty),
            customer_name: input.customer_name.trim().to_string(),
            customer_phone: input.customer_phone.trim().to_string(),
            customer_email: non_empty(input.customer_email),
            customer_address: non_empty(input.customer_address),
            customer_city: non_empty(input.customer_city),
            product_model: input.product_model.trim().to_string(),
            serial_number: input.serial_number.trim().to_string(),
            status: SaleStatus::Approved,
            branch_id: non_empty(input.branch_id),
            region: non_empty(input.region),
            image_urls,
            sale_date: input.sale_date.unwrap_or_else(today),
            warranty_months: input.warranty_months.unwrap_or(DEFAULT_WARRANTY_MONTHS),
            created_by: input.created_by,
            created_at: now(),
            id,
        };

        let sale = self.repo.insert(sale).await?;
        info!(id = %sale.id, warranty_id = %sale.warranty_id, "Sale created");
        Ok(sale)
    }

    /// Change status along the sale transition table
    pub async fn update_status(&self, id: &str, status: SaleStatus) -> ClientResult<Sale> {
        let sale = self
            .repo
            .update(id, |sale| {
                sale.status.check_transition(status)?;
                sale.status = status;
                Ok(())
            })
            .await?;
        info!(id, status = status.label(), "Sale status updated");
        Ok(sale)
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.repo.delete(id).await?;
        info!(id, "Sale deleted");
        Ok(())
    }

    /// Sales grouped by region with counts
    pub async fn list_by_region(&self, filter: &SaleFilter) -> Vec<RegionSales> {
        group_by_region(&self.list(filter).await)
    }

    /// Approved sales whose warranty ends within `days` of today
    pub async fn expiring_within(&self, filter: &SaleFilter, days: i64) -> Vec<Sale> {
        let today = today();
        self.list(filter)
            .await
            .into_iter()
            .filter(|s| {
                s.is_warranty_active(today) && s.warranty_days_remaining(today) <= days
            })
            .collect()
    }

    pub async fn stats(&self, filter: &SaleFilter) -> SaleStats {
        SaleStats::compute(&self.list(filter).await, today())
    }
}
