//! Regional Stock Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AppError, ErrorCode};
use crate::schema::{Entity, local_keys, tables};
use crate::validation::{MAX_NAME_LEN, validate_required_text};

/// Stock level of one product model in one region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    /// `<region>::<model>`
    pub id: String,
    pub region: String,
    pub model_name: String,
    pub quantity: u32,
    pub last_updated: DateTime<Utc>,
}

impl Entity for Stock {
    const TABLE: &'static str = tables::STOCK;
    const LOCAL_KEY: &'static str = local_keys::STOCK;
    const COLUMN_OVERRIDES: &'static [(&'static str, &'static str)] = &[("modelName", "model")];
    const ORDER_FIELD: Option<&'static str> = Some("lastUpdated");
    const UPSERT_FIELDS: &'static [&'static str] = &["region", "modelName"];
    const NOT_FOUND: ErrorCode = ErrorCode::StockNotFound;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Stock {
    pub fn new(region: &str, model_name: &str, quantity: u32, at: DateTime<Utc>) -> Self {
        Self {
            id: synthetic_id(region, model_name),
            region: region.to_string(),
            model_name: model_name.to_string(),
            quantity,
            last_updated: at,
        }
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}

/// Identity of a stock row
pub fn synthetic_id(region: &str, model_name: &str) -> String {
    format!("{region}::{model_name}")
}

/// Validate a (region, model) pair
pub fn validate_stock_key(region: &str, model_name: &str) -> Result<(), AppError> {
    validate_required_text(region, "region", MAX_NAME_LEN)?;
    validate_required_text(model_name, "modelName", MAX_NAME_LEN)
}

/// Convert a signed quantity into a stored one
pub fn checked_quantity(quantity: i64) -> Result<u32, AppError> {
    if quantity < 0 {
        return Err(AppError::with_message(
            ErrorCode::StockNegativeQuantity,
            format!("Stock quantity cannot be negative: {quantity}"),
        ));
    }
    u32::try_from(quantity).map_err(|_| {
        AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Stock quantity too large: {quantity}"),
        )
    })
}

/// Apply a delta, clamping at zero
pub fn apply_delta(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta);
    next.clamp(0, i64::from(u32::MAX)) as u32
}

/// Per-region stock summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStock {
    pub region: String,
    pub models: usize,
    pub total_quantity: u64,
    pub out_of_stock: usize,
}

/// Totals per region, regions in alphabetical order
pub fn region_totals(stock: &[Stock]) -> Vec<RegionStock> {
    let mut totals: BTreeMap<&str, RegionStock> = BTreeMap::new();
    for item in stock {
        let entry = totals
            .entry(item.region.as_str())
            .or_insert_with(|| RegionStock {
                region: item.region.clone(),
                models: 0,
                total_quantity: 0,
                out_of_stock: 0,
            });
        entry.models += 1;
        entry.total_quantity += u64::from(item.quantity);
        if item.is_out_of_stock() {
            entry.out_of_stock += 1;
        }
    }
    totals.into_values().collect()
}
