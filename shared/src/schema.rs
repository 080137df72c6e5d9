//! Declarative record schema
//!
//! Every domain record is serialized camelCase (local store, presentation
//! layer) and stored remotely as a snake_case row. Instead of a hand-written
//! mapper per entity, each model implements [`Entity`] and the conversion is
//! derived from its serde representation plus an optional table of column
//! overrides for the few columns whose names do not follow the convention.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ErrorCode;

/// Local record store keys
pub mod local_keys {
    pub const SALES: &str = "WARRANTY_PRO_SALES";
    pub const FIELD_VISITS: &str = "WARRANTY_PRO_FIELD_VISITS";
    pub const COMPLAINTS: &str = "WARRANTY_PRO_COMPLAINTS";
    pub const STOCK: &str = "WARRANTY_PRO_STOCK";
    pub const USERS: &str = "WARRANTY_PRO_USERS";
    pub const AUTH_TOKEN: &str = "WARRANTY_PRO_AUTH_TOKEN";
    pub const AUTH_USER: &str = "WARRANTY_PRO_AUTH_USER";

    /// Keys routed to the OS secure store instead of plain files
    pub const SECURE: &[&str] = &[AUTH_TOKEN, AUTH_USER];

    pub fn is_secure(key: &str) -> bool {
        SECURE.contains(&key)
    }
}

/// Remote table names
pub mod tables {
    pub const SALES: &str = "sales";
    pub const FIELD_VISITS: &str = "field_visits";
    pub const COMPLAINTS: &str = "complaints";
    pub const STOCK: &str = "stock";
    pub const USERS: &str = "users";
}

/// A record type persisted by the data layer.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Remote table name
    const TABLE: &'static str;
    /// Local record store key holding the whole collection
    const LOCAL_KEY: &'static str;
    /// `(field, column)` pairs that do not follow camelCase ⇄ snake_case
    const COLUMN_OVERRIDES: &'static [(&'static str, &'static str)] = &[];
    /// Field used for newest-first ordering of remote queries
    const ORDER_FIELD: Option<&'static str> = Some("createdAt");
    /// Field holding the human-readable display code, if any
    const CODE_FIELD: Option<&'static str> = None;
    /// Fields identifying a record for upserts
    const UPSERT_FIELDS: &'static [&'static str] = &["id"];
    /// Error code used when a lookup misses
    const NOT_FOUND: ErrorCode = ErrorCode::NotFound;

    /// Primary key
    fn record_id(&self) -> &str;
}

/// Convert a camelCase field name to snake_case
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a snake_case column name to camelCase
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Remote column for a record field
pub fn column_name<E: Entity>(field: &str) -> String {
    E::COLUMN_OVERRIDES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, c)| c.to_string())
        .unwrap_or_else(|| camel_to_snake(field))
}

/// Record field for a remote column
pub fn field_name<E: Entity>(column: &str) -> String {
    E::COLUMN_OVERRIDES
        .iter()
        .find(|(_, c)| *c == column)
        .map(|(f, _)| f.to_string())
        .unwrap_or_else(|| snake_to_camel(column))
}

/// Serialize a record into a remote row
pub fn to_row<E: Entity>(record: &E) -> Result<Value, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (column_name::<E>(&k), v))
                .collect(),
        )),
        other => Ok(other),
    }
}

/// Deserialize a remote row into a record
///
/// `null` columns are dropped so that serde defaults apply to them.
pub fn from_row<E: Entity>(row: Value) -> Result<E, serde_json::Error> {
    let value = match row {
        Value::Object(columns) => Value::Object(
            columns
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (field_name::<E>(&k), v))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    };
    serde_json::from_value(value)
}

/// Equality filter over record fields (camelCase names)
///
/// Applied client-side against the local snapshot and translated into
/// column filters for the remote store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    conditions: Vec<(String, Value)>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// Require `field == value` when a value is given
    pub fn eq_opt<V: Into<Value>>(self, field: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Check a record against every condition
    pub fn matches<T: Serialize>(&self, record: &T) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        let Ok(Value::Object(fields)) = serde_json::to_value(record) else {
            return false;
        };
        self.conditions
            .iter()
            .all(|(field, expected)| match fields.get(field) {
                Some(actual) => actual == expected,
                None => expected.is_null(),
            })
    }
}
