//! Sale / Warranty Model

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::status::StatusTransition;
use crate::error::{AppError, ErrorCode};
use crate::schema::{Entity, local_keys, tables};
use crate::util::days_between;
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_email,
    validate_optional_text, validate_required_text,
};

/// Default warranty length
pub const DEFAULT_WARRANTY_MONTHS: u32 = 12;

/// Warranties expiring within this many days count as "expiring soon"
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Region label for sales without one
pub const UNASSIGNED_REGION: &str = "Unassigned";

/// Sale status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl StatusTransition for SaleStatus {
    const TRANSITION_ERROR: ErrorCode = ErrorCode::SaleStatusTransition;

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Rejected],
            Self::Rejected => &[Self::Pending],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Sale record; carries the warranty once approved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Display code `WAR-######`
    pub warranty_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub customer_city: Option<String>,
    pub product_model: String,
    pub serial_number: String,
    #[serde(default)]
    pub status: SaleStatus,
    pub branch_id: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub sale_date: NaiveDate,
    #[serde(default = "default_warranty_months")]
    pub warranty_months: u32,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_warranty_months() -> u32 {
    DEFAULT_WARRANTY_MONTHS
}

impl Entity for Sale {
    const TABLE: &'static str = tables::SALES;
    const LOCAL_KEY: &'static str = local_keys::SALES;
    const COLUMN_OVERRIDES: &'static [(&'static str, &'static str)] =
        &[("imageUrls", "images"), ("productModel", "model")];
    const CODE_FIELD: Option<&'static str> = Some("warrantyId");
    const NOT_FOUND: ErrorCode = ErrorCode::SaleNotFound;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Sale {
    /// Last day covered by the warranty
    pub fn warranty_expires_on(&self) -> NaiveDate {
        self.sale_date
            .checked_add_months(Months::new(self.warranty_months))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Days left on the warranty as of `today` (negative once expired)
    pub fn warranty_days_remaining(&self, today: NaiveDate) -> i64 {
        days_between(today, self.warranty_expires_on())
    }

    /// Approved and not yet expired
    pub fn is_warranty_active(&self, today: NaiveDate) -> bool {
        self.status == SaleStatus::Approved && self.warranty_days_remaining(today) >= 0
    }

    /// Region used for grouping
    pub fn region_label(&self) -> &str {
        self.region
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(UNASSIGNED_REGION)
    }
}

/// Create sale payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreate {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub customer_city: Option<String>,
    pub product_model: String,
    pub serial_number: String,
    pub branch_id: Option<String>,
    pub region: Option<String>,
    /// Defaults to today
    pub sale_date: Option<NaiveDate>,
    /// Defaults to [`DEFAULT_WARRANTY_MONTHS`]
    pub warranty_months: Option<u32>,
    pub created_by: Option<String>,
}

impl SaleCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_required_text(&self.customer_name, "customerName", MAX_NAME_LEN)?;
        validate_required_text(&self.customer_phone, "customerPhone", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&self.product_model, "productModel", MAX_NAME_LEN)?;
        validate_required_text(&self.serial_number, "serialNumber", MAX_SHORT_TEXT_LEN)?;
        validate_optional_email(&self.customer_email, "customerEmail")?;
        validate_optional_text(&self.customer_address, "customerAddress", MAX_ADDRESS_LEN)?;
        validate_optional_text(&self.customer_city, "customerCity", MAX_NAME_LEN)?;
        if self.warranty_months == Some(0) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "warrantyMonths must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Sales grouped under one region
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSales {
    pub region: String,
    pub count: usize,
    pub sales: Vec<Sale>,
}

/// Group sales by region, regions in alphabetical order, input order kept
/// inside each group
pub fn group_by_region(sales: &[Sale]) -> Vec<RegionSales> {
    let mut groups: BTreeMap<String, Vec<Sale>> = BTreeMap::new();
    for sale in sales {
        groups
            .entry(sale.region_label().to_string())
            .or_default()
            .push(sale.clone());
    }
    groups
        .into_iter()
        .map(|(region, sales)| RegionSales {
            region,
            count: sales.len(),
            sales,
        })
        .collect()
}

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub active_warranties: usize,
    pub expiring_soon: usize,
    pub expired: usize,
}

impl SaleStats {
    pub fn compute(sales: &[Sale], today: NaiveDate) -> Self {
        let mut stats = Self {
            total: sales.len(),
            ..Self::default()
        };
        for sale in sales {
            match sale.status {
                SaleStatus::Pending => stats.pending += 1,
                SaleStatus::Approved => stats.approved += 1,
                SaleStatus::Rejected => stats.rejected += 1,
            }
            if sale.status != SaleStatus::Approved {
                continue;
            }
            let remaining = sale.warranty_days_remaining(today);
            if remaining < 0 {
                stats.expired += 1;
            } else {
                stats.active_warranties += 1;
                if remaining <= EXPIRING_SOON_DAYS {
                    stats.expiring_soon += 1;
                }
            }
        }
        stats
    }
}
