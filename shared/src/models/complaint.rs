//! Complaint Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::StatusTransition;
use crate::error::{AppError, ErrorCode};
use crate::schema::{Entity, local_keys, tables};
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_email,
    validate_optional_text, validate_required_text,
};

/// Complaint status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComplaintStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl StatusTransition for ComplaintStatus {
    const TRANSITION_ERROR: ErrorCode = ErrorCode::ComplaintStatusTransition;

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::InProgress, Self::Resolved, Self::Closed],
            Self::InProgress => &[Self::Open, Self::Resolved, Self::Closed],
            Self::Resolved => &[Self::InProgress, Self::Closed],
            Self::Closed => &[],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }
}

impl ComplaintStatus {
    /// Still needs attention
    pub fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

/// Complaint category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComplaintCategory {
    #[serde(rename = "Product Quality")]
    ProductQuality,
    Installation,
    Service,
    Billing,
    Delivery,
    #[default]
    Other,
}

/// Complaint record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    /// Display code `CMP-######`
    pub complaint_id: String,
    /// Invoice or warranty code the complaint refers to
    pub invoice_number: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub product_model: Option<String>,
    #[serde(default)]
    pub category: ComplaintCategory,
    pub description: String,
    #[serde(default)]
    pub status: ComplaintStatus,
    pub resolution: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub branch_id: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Complaint {
    const TABLE: &'static str = tables::COMPLAINTS;
    const LOCAL_KEY: &'static str = local_keys::COMPLAINTS;
    const COLUMN_OVERRIDES: &'static [(&'static str, &'static str)] = &[
        ("invoiceNumber", "invoice_no"),
        ("imageUrls", "images"),
        ("productModel", "model"),
    ];
    const CODE_FIELD: Option<&'static str> = Some("complaintId");
    const NOT_FOUND: ErrorCode = ErrorCode::ComplaintNotFound;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Complaint {
    /// Apply a resolution. Fails if the current status cannot move to
    /// `Resolved`.
    pub fn resolve(&mut self, resolution: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        validate_required_text(resolution, "resolution", MAX_NOTE_LEN)?;
        self.status.check_transition(ComplaintStatus::Resolved)?;
        self.status = ComplaintStatus::Resolved;
        self.resolution = Some(resolution.trim().to_string());
        self.resolved_at = Some(at);
        Ok(())
    }

    /// Change status, clearing resolution data when reopened
    pub fn set_status(&mut self, next: ComplaintStatus) -> Result<(), AppError> {
        self.status.check_transition(next)?;
        if next.is_active() {
            self.resolution = None;
            self.resolved_at = None;
        }
        self.status = next;
        Ok(())
    }
}

/// Create complaint payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintCreate {
    pub invoice_number: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub product_model: Option<String>,
    pub category: ComplaintCategory,
    pub description: String,
    pub branch_id: Option<String>,
    pub region: Option<String>,
    pub created_by: Option<String>,
}

impl ComplaintCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_required_text(&self.customer_name, "customerName", MAX_NAME_LEN)?;
        validate_required_text(&self.customer_phone, "customerPhone", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&self.description, "description", MAX_NOTE_LEN)?;
        validate_optional_email(&self.customer_email, "customerEmail")?;
        validate_optional_text(&self.invoice_number, "invoiceNumber", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&self.product_model, "productModel", MAX_NAME_LEN)?;
        Ok(())
    }
}

/// Complaint counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl ComplaintStats {
    pub fn compute(complaints: &[Complaint]) -> Self {
        complaints.iter().fold(
            Self {
                total: complaints.len(),
                ..Self::default()
            },
            |mut stats, c| {
                match c.status {
                    ComplaintStatus::Open => stats.open += 1,
                    ComplaintStatus::InProgress => stats.in_progress += 1,
                    ComplaintStatus::Resolved => stats.resolved += 1,
                    ComplaintStatus::Closed => stats.closed += 1,
                }
                stats
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{from_row, to_row};

    fn complaint(status: ComplaintStatus) -> Complaint {
        Complaint {
            id: "c1".into(),
            complaint_id: "CMP-000042".into(),
            invoice_number: Some("WAR-123456".into()),
            customer_name: "Bilal".into(),
            customer_phone: "0321".into(),
            customer_email: None,
            product_model: Some("RO-500".into()),
            category: ComplaintCategory::ProductQuality,
            description: "Leaking filter housing".into(),
            status,
            resolution: None,
            resolved_at: None,
            branch_id: None,
            region: Some("Sindh".into()),
            image_urls: vec![],
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_wire_labels() {
        assert_eq!(
            serde_json::to_string(&ComplaintStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        let s: ComplaintStatus = serde_json::from_str("\"Closed\"").unwrap();
        assert_eq!(s, ComplaintStatus::Closed);
        let c: ComplaintCategory = serde_json::from_str("\"Product Quality\"").unwrap();
        assert_eq!(c, ComplaintCategory::ProductQuality);
        for s in [
            ComplaintStatus::Open,
            ComplaintStatus::InProgress,
            ComplaintStatus::Resolved,
            ComplaintStatus::Closed,
        ] {
            assert_eq!(
                serde_json::to_value(s).unwrap(),
                serde_json::Value::from(s.label())
            );
        }
    }

    #[test]
    fn test_status_transitions() {
        assert!(ComplaintStatus::Open.can_transition_to(ComplaintStatus::Resolved));
        assert!(ComplaintStatus::Resolved.can_transition_to(ComplaintStatus::InProgress));
        assert!(!ComplaintStatus::Resolved.can_transition_to(ComplaintStatus::Open));
        assert!(ComplaintStatus::Closed.is_terminal());
        assert!(ComplaintStatus::Closed.can_transition_to(ComplaintStatus::Closed));
    }

    #[test]
    fn test_resolve() {
        let mut c = complaint(ComplaintStatus::InProgress);
        let at = Utc::now();
        c.resolve("  Replaced housing  ", at).unwrap();
        assert_eq!(c.status, ComplaintStatus::Resolved);
        assert_eq!(c.resolution.as_deref(), Some("Replaced housing"));
        assert_eq!(c.resolved_at, Some(at));

        let mut closed = complaint(ComplaintStatus::Closed);
        let err = closed.resolve("late", at).unwrap_err();
        assert_eq!(err.code, ErrorCode::ComplaintStatusTransition);
        assert_eq!(closed.status, ComplaintStatus::Closed);

        let mut open = complaint(ComplaintStatus::Open);
        assert_eq!(
            open.resolve(" ", at).unwrap_err().code,
            ErrorCode::RequiredField
        );
    }

    #[test]
    fn test_reopen_clears_resolution() {
        let mut c = complaint(ComplaintStatus::Open);
        c.resolve("done", Utc::now()).unwrap();
        c.set_status(ComplaintStatus::InProgress).unwrap();
        assert!(c.resolution.is_none());
        assert!(c.resolved_at.is_none());
    }

    #[test]
    fn test_row_mapping() {
        let c = complaint(ComplaintStatus::InProgress);
        let row = to_row(&c).unwrap();
        assert_eq!(row["invoice_no"], "WAR-123456");
        assert_eq!(row["complaint_id"], "CMP-000042");
        assert_eq!(row["status"], "In Progress");
        assert_eq!(row["category"], "Product Quality");
        assert_eq!(from_row::<Complaint>(row).unwrap(), c);
    }

    #[test]
    fn test_stats() {
        let list = vec![
            complaint(ComplaintStatus::Open),
            complaint(ComplaintStatus::Open),
            complaint(ComplaintStatus::InProgress),
            complaint(ComplaintStatus::Closed),
        ];
        let stats = ComplaintStats::compute(&list);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.open, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.resolved, 0);
        assert_eq!(stats.closed, 1);
    }

    #[test]
    fn test_create_validation() {
        let input = ComplaintCreate {
            customer_name: "Bilal".into(),
            customer_phone: "0321".into(),
            description: "".into(),
            ..Default::default()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(err.message.contains("description"));
    }
}
