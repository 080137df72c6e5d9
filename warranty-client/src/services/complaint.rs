//! Complaint service

use std::sync::Arc;
use tracing::info;

use shared::ids::{CodePrefix, display_code, new_record_id};
use shared::models::{
    Complaint, ComplaintCategory, ComplaintCreate, ComplaintStats, ComplaintStatus,
    StatusTransition,
};
use shared::schema::RecordFilter;
use shared::util::{non_empty, now};
use shared::validation::validate_image_refs;

use super::repository::Repository;
use crate::ClientResult;
use crate::upload::{AttachmentKind, ImageUploadPipeline, ProgressFn};

#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub branch_id: Option<String>,
    pub region: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub category: Option<ComplaintCategory>,
}

impl ComplaintFilter {
    fn to_record_filter(&self) -> RecordFilter {
        RecordFilter::new()
            .eq_opt("branchId", self.branch_id.clone())
            .eq_opt("region", self.region.clone())
            .eq_opt("status", self.status.map(StatusTransition::label))
            .eq_opt(
                "category",
                self.category.and_then(|c| serde_json::to_value(c).ok()),
            )
    }
}

#[derive(Clone)]
pub struct ComplaintService {
    repo: Repository<Complaint>,
    pipeline: Arc<ImageUploadPipeline>,
}

impl ComplaintService {
    pub fn new(repo: Repository<Complaint>, pipeline: Arc<ImageUploadPipeline>) -> Self {
        Self { repo, pipeline }
    }

    pub async fn list(&self, filter: &ComplaintFilter) -> Vec<Complaint> {
        self.repo.list(&filter.to_record_filter()).await
    }

    /// Look up by id or complaint code
    pub async fn get(&self, id_or_code: &str) -> Option<Complaint> {
        self.repo.find(id_or_code).await
    }

    /// Complaints filed against an invoice / warranty code
    pub async fn find_by_invoice(&self, invoice_number: &str) -> Vec<Complaint> {
        let filter = RecordFilter::new().eq("invoiceNumber", invoice_number.trim());
        self.repo.list(&filter).await
    }

    /// File a complaint (status `Open`)
    pub async fn create(
        &self,
        input: ComplaintCreate,
        images: &[String],
        progress: Option<&ProgressFn>,
    ) -> ClientResult<Complaint> {
        input.validate()?;
        validate_image_refs(images)?;

        let id = new_record_id();
        let image_urls = self
            .pipeline
            .upload_all(AttachmentKind::Complaint, &id, images, progress)
            .await;

        let complaint = Complaint {
            complaint_id: display_code(CodePrefix::Complaint),
            invoice_number: non_empty(input.invoice_number),
            customer_name: input.customer_name.trim().to_string(),
            customer_phone: input.customer_phone.trim().to_string(),
            customer_email: non_empty(input.customer_email),
            product_model: non_empty(input.product_model),
            category: input.category,
            description: input.description.trim().to_string(),
            status: ComplaintStatus::Open,
            resolution: None,
            resolved_at: None,
            branch_id: non_empty(input.branch_id),
            region: non_empty(input.region),
            image_urls,
            created_by: input.created_by,
            created_at: now(),
            id,
        };

        let complaint = self.repo.insert(complaint).await?;
        info!(id = %complaint.id, complaint_id = %complaint.complaint_id, "Complaint created");
        Ok(complaint)
    }

    /// Change status along the complaint transition table
    ///
    /// Moving back to an active status clears the resolution.
    pub async fn update_status(&self, id: &str, status: ComplaintStatus) -> ClientResult<Complaint> {
        let complaint = self
            .repo
            .update(id, |complaint| Ok(complaint.set_status(status)?))
            .await?;
        info!(id, status = status.label(), "Complaint status updated");
        Ok(complaint)
    }

    /// Mark resolved with a resolution note
    pub async fn resolve(&self, id: &str, resolution: &str) -> ClientResult<Complaint> {
        let complaint = self
            .repo
            .update(id, |complaint| Ok(complaint.resolve(resolution, now())?))
            .await?;
        info!(id, "Complaint resolved");
        Ok(complaint)
    }

    pub async fn stats(&self, filter: &ComplaintFilter) -> ComplaintStats {
        ComplaintStats::compute(&self.list(filter).await)
    }
}
