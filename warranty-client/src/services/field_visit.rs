//! Field visit service

use std::sync::Arc;
use tracing::info;

use shared::ids::{CodePrefix, display_code, new_record_id};
use shared::models::{
    FieldVisit, FieldVisitCreate, FieldVisitDetails, FieldVisitStatus, StatusTransition,
};
use shared::schema::RecordFilter;
use shared::util::{non_empty, now, today};
use shared::validation::validate_image_refs;

use super::repository::Repository;
use crate::ClientResult;
use crate::upload::{AttachmentKind, ImageUploadPipeline, ProgressFn};

#[derive(Debug, Clone, Default)]
pub struct FieldVisitFilter {
    pub branch_id: Option<String>,
    pub region: Option<String>,
    pub status: Option<FieldVisitStatus>,
}

impl FieldVisitFilter {
    fn to_record_filter(&self) -> RecordFilter {
        RecordFilter::new()
            .eq_opt("branchId", self.branch_id.clone())
            .eq_opt("region", self.region.clone())
            .eq_opt("status", self.status.map(StatusTransition::label))
    }
}

#[derive(Clone)]
pub struct FieldVisitService {
    repo: Repository<FieldVisit>,
    pipeline: Arc<ImageUploadPipeline>,
}

impl FieldVisitService {
    pub fn new(repo: Repository<FieldVisit>, pipeline: Arc<ImageUploadPipeline>) -> Self {
        Self { repo, pipeline }
    }

    pub async fn list(&self, filter: &FieldVisitFilter) -> Vec<FieldVisit> {
        self.repo.list(&filter.to_record_filter()).await
    }

    /// Look up by id or visit code
    pub async fn get(&self, id_or_code: &str) -> Option<FieldVisit> {
        self.repo.find(id_or_code).await
    }

    /// Record a visit (status `pending`)
    pub async fn create(
        &self,
        input: FieldVisitCreate,
        images: &[String],
        progress: Option<&ProgressFn>,
    ) -> ClientResult<FieldVisit> {
        input.validate()?;
        validate_image_refs(images)?;

        let id = new_record_id();
        let image_urls = self
            .pipeline
            .upload_all(AttachmentKind::FieldVisit, &id, images, progress)
            .await;

        let visit = FieldVisit {
            visit_id: display_code(CodePrefix::FieldVisit),
            customer_name: input.customer_name.trim().to_string(),
            customer_phone: non_empty(input.customer_phone),
            branch_id: non_empty(input.branch_id),
            region: non_empty(input.region),
            status: FieldVisitStatus::Pending,
            details: input.details,
            image_urls,
            created_by: input.created_by,
            created_at: now(),
            updated_at: None,
            id,
        };

        let visit = self.repo.insert(visit).await?;
        info!(id = %visit.id, visit_id = %visit.visit_id, "Field visit created");
        Ok(visit)
    }

    pub async fn update_status(&self, id: &str, status: FieldVisitStatus) -> ClientResult<FieldVisit> {
        let visit = self
            .repo
            .update(id, |visit| {
                visit.status.check_transition(status)?;
                visit.status = status;
                visit.updated_at = Some(now());
                Ok(())
            })
            .await?;
        info!(id, status = status.label(), "Field visit status updated");
        Ok(visit)
    }

    /// Replace the survey / recommendation / follow-up body
    pub async fn update_details(
        &self,
        id: &str,
        details: FieldVisitDetails,
    ) -> ClientResult<FieldVisit> {
        details.validate()?;
        let visit = self
            .repo
            .update(id, move |visit| {
                visit.details = details;
                visit.updated_at = Some(now());
                Ok(())
            })
            .await?;
        info!(id, "Field visit details updated");
        Ok(visit)
    }

    /// Non-cancelled visits whose follow-up date has arrived
    pub async fn follow_ups_due(&self, filter: &FieldVisitFilter) -> Vec<FieldVisit> {
        let today = today();
        self.list(filter)
            .await
            .into_iter()
            .filter(|v| v.status != FieldVisitStatus::Cancelled && v.details.follow_up_due(today))
            .collect()
    }
}
