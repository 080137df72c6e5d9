//! Field Visit Model
//!
//! A field visit row is wide and flat. Two overlapping survey sets live on
//! it: the original water survey and the newer industrial/residential
//! survey. Both are kept; the app decides which one to render from
//! `customerType`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::status::StatusTransition;
use crate::error::{AppError, ErrorCode};
use crate::schema::{Entity, local_keys, tables};
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_email,
    validate_optional_text, validate_required_text,
};

/// Field visit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldVisitStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl StatusTransition for FieldVisitStatus {
    const TRANSITION_ERROR: ErrorCode = ErrorCode::FieldVisitStatusTransition;

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Completed, Self::Cancelled],
            Self::Completed => &[],
            Self::Cancelled => &[Self::Pending],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Survey, recommendation and follow-up fields of a visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldVisitDetails {
    // ── Site ─────────────────────────────────────────────────────────
    pub site_name: Option<String>,
    pub site_address: Option<String>,
    pub site_city: Option<String>,
    pub landmark: Option<String>,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub visit_time: Option<String>,
    pub visit_purpose: Option<String>,
    pub technician_name: Option<String>,
    /// `industrial` or `residential`
    pub customer_type: Option<String>,
    pub property_type: Option<String>,

    // ── Water survey (original form) ─────────────────────────────────
    pub water_source: Option<String>,
    pub water_quality: Option<String>,
    pub water_taste: Option<String>,
    pub water_odor: Option<String>,
    pub water_color: Option<String>,
    pub tds_level: Option<String>,
    pub ph_level: Option<String>,
    pub hardness_level: Option<String>,
    pub chlorine_level: Option<String>,
    pub iron_level: Option<String>,
    pub existing_system: Option<String>,
    pub existing_system_age: Option<String>,
    pub water_usage: Option<String>,
    pub family_members: Option<String>,
    pub daily_consumption: Option<String>,
    pub issues_reported: Option<String>,

    // ── Industrial / residential survey ──────────────────────────────
    pub industry_type: Option<String>,
    pub water_application: Option<String>,
    pub required_capacity: Option<String>,
    pub operating_hours: Option<String>,
    pub current_treatment: Option<String>,
    pub raw_water_tds: Option<String>,
    pub raw_water_hardness: Option<String>,
    pub raw_water_ph: Option<String>,
    pub raw_water_iron: Option<String>,
    pub raw_water_turbidity: Option<String>,
    pub storage_tank_capacity: Option<String>,
    pub plumbing_condition: Option<String>,
    pub power_availability: Option<String>,
    pub space_available: Option<String>,
    pub drain_available: Option<String>,
    pub budget_range: Option<String>,
    pub decision_maker: Option<String>,
    pub purchase_timeline: Option<String>,
    pub competitor_products: Option<String>,

    // ── Recommendations ──────────────────────────────────────────────
    pub recommended_product: Option<String>,
    pub recommended_model: Option<String>,
    pub recommended_accessories: Option<String>,
    pub estimated_cost: Option<String>,
    pub installation_requirements: Option<String>,
    pub recommendation_notes: Option<String>,

    // ── Follow-up plan ───────────────────────────────────────────────
    pub follow_up_required: Option<bool>,
    pub follow_up_date: Option<NaiveDate>,
    pub follow_up_action: Option<String>,
    pub follow_up_notes: Option<String>,
    pub next_visit_date: Option<NaiveDate>,
    pub customer_feedback: Option<String>,
    pub customer_interest_level: Option<String>,
    pub remarks: Option<String>,
}

impl FieldVisitDetails {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_optional_email(&self.contact_email, "contactEmail")?;
        for (value, field) in [
            (&self.site_name, "siteName"),
            (&self.contact_person, "contactPerson"),
            (&self.technician_name, "technicianName"),
        ] {
            validate_optional_text(value, field, MAX_NAME_LEN)?;
        }
        for (value, field) in [
            (&self.issues_reported, "issuesReported"),
            (&self.recommendation_notes, "recommendationNotes"),
            (&self.follow_up_notes, "followUpNotes"),
            (&self.customer_feedback, "customerFeedback"),
            (&self.remarks, "remarks"),
        ] {
            validate_optional_text(value, field, MAX_NOTE_LEN)?;
        }
        Ok(())
    }

    /// A follow-up is planned and dated on or before `today`
    pub fn follow_up_due(&self, today: NaiveDate) -> bool {
        self.follow_up_required.unwrap_or(false)
            && self.follow_up_date.is_some_and(|d| d <= today)
    }
}

/// Field visit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldVisit {
    pub id: String,
    /// Display code `FV-######`
    pub visit_id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub branch_id: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub status: FieldVisitStatus,
    #[serde(flatten)]
    pub details: FieldVisitDetails,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for FieldVisit {
    const TABLE: &'static str = tables::FIELD_VISITS;
    const LOCAL_KEY: &'static str = local_keys::FIELD_VISITS;
    const COLUMN_OVERRIDES: &'static [(&'static str, &'static str)] =
        &[("visitId", "visit_code"), ("imageUrls", "photos")];
    const CODE_FIELD: Option<&'static str> = Some("visitId");
    const NOT_FOUND: ErrorCode = ErrorCode::FieldVisitNotFound;

    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Create field visit payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldVisitCreate {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub branch_id: Option<String>,
    pub region: Option<String>,
    #[serde(flatten)]
    pub details: FieldVisitDetails,
    pub created_by: Option<String>,
}

impl FieldVisitCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_required_text(&self.customer_name, "customerName", MAX_NAME_LEN)?;
        validate_optional_text(&self.customer_phone, "customerPhone", MAX_SHORT_TEXT_LEN)?;
        self.details.validate()
    }
}
