//! Remote Record Store
//!
//! Table-scoped select/insert/update/delete/upsert over the project's REST
//! surface. Rows are plain JSON objects with snake_case columns; mapping to
//! domain records happens in the repository.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use shared::schema::{Entity, RecordFilter, column_name};

use super::http::RestClient;
use crate::{ClientError, ClientResult};

const PREFER: &str = "Prefer";

/// Column filters and ordering for a table request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, Option<String>)>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value`
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), Some(value.into())));
        self
    }

    /// `column IS NULL`
    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.filters.push((column.into(), None));
        self
    }

    /// Order by `column`, newest first when `descending`
    pub fn order(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some((column.into(), descending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Translate a record filter into column filters for `E`
    pub fn for_entity<E: Entity>(filter: &RecordFilter) -> Self {
        let mut query = Self::new();
        for (field, value) in filter.conditions() {
            let column = column_name::<E>(field);
            query = match filter_value(value) {
                Some(v) => query.eq(column, v),
                None => query.is_null(column),
            };
        }
        if let Some(field) = E::ORDER_FIELD {
            query = query.order(column_name::<E>(field), true);
        }
        query
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Query-string pairs (`col=eq.value`, `order=col.desc`, `limit=n`)
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(column, value)| match value {
                Some(v) => (column.clone(), format!("eq.{v}")),
                None => (column.clone(), "is.null".to_string()),
            })
            .collect();
        if let Some((column, descending)) = &self.order {
            let dir = if *descending { "desc" } else { "asc" };
            params.push(("order".into(), format!("{column}.{dir}")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".into(), limit.to_string()));
        }
        params
    }
}

fn filter_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Table-scoped row store
#[async_trait]
pub trait RemoteRecordStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> ClientResult<Vec<Value>>;
    async fn insert(&self, table: &str, row: &Value) -> ClientResult<Value>;
    async fn update(&self, table: &str, query: &Query, patch: &Value) -> ClientResult<Vec<Value>>;
    /// Returns the removed rows
    async fn delete(&self, table: &str, query: &Query) -> ClientResult<Vec<Value>>;
    async fn upsert(&self, table: &str, row: &Value, on_conflict: &[String]) -> ClientResult<Value>;
}

/// PostgREST-style table client
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    rest: RestClient,
}

impl PostgrestStore {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    fn url(&self, table: &str) -> String {
        self.rest.remote().rest_url(table)
    }

    fn require_filters(table: &str, query: &Query, op: &str) -> ClientResult<()> {
        if query.has_filters() {
            Ok(())
        } else {
            Err(ClientError::Validation(format!(
                "refusing unfiltered {op} on table {table}"
            )))
        }
    }
}

fn first_row(table: &str, rows: Vec<Value>) -> ClientResult<Value> {
    rows.into_iter()
        .next()
        .ok_or_else(|| ClientError::InvalidResponse(format!("{table}: write returned no row")))
}

#[async_trait]
impl RemoteRecordStore for PostgrestStore {
    async fn select(&self, table: &str, query: &Query) -> ClientResult<Vec<Value>> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(query.params());
        let request = self
            .rest
            .request(Method::GET, &self.url(table))
            .query(&params);
        self.rest.send_json(request).await
    }

    async fn insert(&self, table: &str, row: &Value) -> ClientResult<Value> {
        let request = self
            .rest
            .request(Method::POST, &self.url(table))
            .header(PREFER, "return=representation")
            .json(row);
        let rows: Vec<Value> = self.rest.send_json(request).await?;
        first_row(table, rows)
    }

    async fn update(&self, table: &str, query: &Query, patch: &Value) -> ClientResult<Vec<Value>> {
        Self::require_filters(table, query, "update")?;
        let request = self
            .rest
            .request(Method::PATCH, &self.url(table))
            .query(&query.params())
            .header(PREFER, "return=representation")
            .json(patch);
        self.rest.send_json(request).await
    }

    async fn delete(&self, table: &str, query: &Query) -> ClientResult<Vec<Value>> {
        Self::require_filters(table, query, "delete")?;
        let request = self
            .rest
            .request(Method::DELETE, &self.url(table))
            .query(&query.params())
            .header(PREFER, "return=representation");
        self.rest.send_json(request).await
    }

    async fn upsert(&self, table: &str, row: &Value, on_conflict: &[String]) -> ClientResult<Value> {
        let request = self
            .rest
            .request(Method::POST, &self.url(table))
            .query(&[("on_conflict", on_conflict.join(","))])
            .header(PREFER, "resolution=merge-duplicates,return=representation")
            .json(row);
        let rows: Vec<Value> = self.rest.send_json(request).await?;
        first_row(table, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Complaint, Stock};

    #[test]
    fn test_query_params() {
        let q = Query::new()
            .eq("branch_id", "b1")
            .is_null("resolved_at")
            .order("created_at", true)
            .limit(10);
        assert_eq!(
            q.params(),
            vec![
                ("branch_id".to_string(), "eq.b1".to_string()),
                ("resolved_at".to_string(), "is.null".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_for_entity_maps_columns() {
        let filter = RecordFilter::new()
            .eq("invoiceNumber", "WAR-000001")
            .eq("status", "In Progress");
        let q = Query::for_entity::<Complaint>(&filter);
        let params = q.params();
        assert_eq!(params[0], ("invoice_no".into(), "eq.WAR-000001".into()));
        assert_eq!(params[1], ("status".into(), "eq.In Progress".into()));
        assert_eq!(params[2], ("order".into(), "created_at.desc".into()));

        let q = Query::for_entity::<Stock>(&RecordFilter::new().eq("modelName", "RO-500"));
        assert_eq!(
            q.params(),
            vec![
                ("model".to_string(), "eq.RO-500".to_string()),
                ("order".to_string(), "last_updated.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_string_filter_values() {
        assert_eq!(filter_value(&Value::from(3)).as_deref(), Some("3"));
        assert_eq!(filter_value(&Value::Bool(true)).as_deref(), Some("true"));
        assert_eq!(filter_value(&Value::Null), None);
    }
}
