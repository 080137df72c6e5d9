//! Test support: an in-process fake of the remote project (tables, object
//! storage, health endpoint) and client builders.

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::task::JoinHandle;

use shared::models::{ComplaintCategory, ComplaintCreate, FieldVisitCreate, SaleCreate};
use warranty_client::storage::{FileKeyValueStore, LocalStorage, MemorySecureStore};
use warranty_client::{Backend, ClientConfig, WarrantyClient};

pub const ANON_KEY: &str = "anon-key";

const RESERVED_PARAMS: &[&str] = &["select", "order", "limit", "on_conflict"];

#[derive(Default)]
pub struct FakeState {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    last_authorization: Mutex<Option<String>>,
    pub reject_writes: AtomicBool,
    pub reject_uploads: AtomicBool,
    pub fail_selects: AtomicBool,
    pub insert_failures: AtomicU32,
}

/// Fake remote project served on an ephemeral local port
pub struct FakeBackend {
    pub url: String,
    pub state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route(
                "/rest/v1/{table}",
                get(select_rows)
                    .post(insert_rows)
                    .patch(update_rows)
                    .delete(delete_rows),
            )
            .route(
                "/storage/v1/object/public/{bucket}/{*path}",
                get(download_object),
            )
            .route(
                "/storage/v1/object/{bucket}/{*path}",
                axum::routing::post(upload_object),
            )
            .route("/auth/v1/health", get(|| async { "ok" }))
            .route("/files/{name}", get(serve_file))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .tables
            .lock()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Overwrite one column of the row at `index` (insertion order)
    pub fn set_column(&self, table: &str, index: usize, column: &str, value: Value) {
        if let Some(row) = self
            .state
            .tables
            .lock()
            .get_mut(table)
            .and_then(|rows| rows.get_mut(index))
        {
            row[column] = value;
        }
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.state.objects.lock().get(key).cloned()
    }

    pub fn object_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.state.objects.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Serve `bytes` at `/files/{name}`, returning the URL
    pub fn put_file(&self, name: &str, bytes: &[u8]) -> String {
        self.state
            .files
            .lock()
            .insert(name.to_string(), bytes.to_vec());
        format!("{}/files/{}", self.url, name)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().clone()
    }

    pub fn set(&self, flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ========== Handlers ==========

fn check_auth(state: &FakeState, headers: &HeaderMap) -> Option<Response> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_authorization.lock() = authorization.clone();
    let has_key = headers
        .get("apikey")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == ANON_KEY);
    if has_key && authorization.is_some_and(|a| a.starts_with("Bearer ")) {
        None
    } else {
        Some(
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "No API key found in request" })),
            )
                .into_response(),
        )
    }
}

fn rejected() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "code": "42501",
            "message": "new row violates row-level security policy",
        })),
    )
        .into_response()
}

fn row_matches(row: &Value, params: &[(String, String)]) -> bool {
    params
        .iter()
        .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_str()))
        .all(|(column, condition)| {
            let actual = row.get(column);
            if condition == "is.null" {
                return actual.is_none_or(Value::is_null);
            }
            let Some(expected) = condition.strip_prefix("eq.") else {
                return false;
            };
            match actual {
                Some(Value::String(s)) => s == expected,
                Some(Value::Null) | None => false,
                Some(other) => other.to_string() == expected,
            }
        })
}

fn merge_into(target: &mut Value, patch: &Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

async fn select_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    if let Some(denied) = check_auth(&state, &headers) {
        return denied;
    }
    if state.fail_selects.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response();
    }
    let rows = state.tables.lock().get(&table).cloned().unwrap_or_default();
    let mut rows: Vec<Value> = rows
        .into_iter()
        .filter(|r| row_matches(r, &params))
        .collect();
    // rows are kept in insertion order
    if param(&params, "order").is_some_and(|o| o.ends_with(".desc")) {
        rows.reverse();
    }
    if let Some(limit) = param(&params, "limit").and_then(|l| l.parse::<usize>().ok()) {
        rows.truncate(limit);
    }
    Json(rows).into_response()
}

async fn insert_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(denied) = check_auth(&state, &headers) {
        return denied;
    }
    if state.reject_writes.load(Ordering::SeqCst) {
        return rejected();
    }
    let pending_failures = state.insert_failures.load(Ordering::SeqCst);
    if pending_failures > 0 {
        state
            .insert_failures
            .store(pending_failures - 1, Ordering::SeqCst);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "temporary failure" })),
        )
            .into_response();
    }

    let merge = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|p| p.contains("resolution=merge-duplicates"));
    let on_conflict: Option<Vec<String>> = param(&params, "on_conflict")
        .map(|cols| cols.split(',').map(str::to_string).collect());

    let incoming = match body {
        Value::Array(rows) => rows,
        row => vec![row],
    };

    let mut tables = state.tables.lock();
    let rows = tables.entry(table).or_default();
    let mut out = Vec::new();
    for row in incoming {
        if merge
            && let Some(cols) = &on_conflict
            && let Some(existing) = rows
                .iter_mut()
                .find(|r| cols.iter().all(|c| r.get(c) == row.get(c)))
        {
            merge_into(existing, &row);
            out.push(existing.clone());
            continue;
        }
        rows.push(row.clone());
        out.push(row);
    }
    (StatusCode::CREATED, Json(out)).into_response()
}

async fn update_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    if let Some(denied) = check_auth(&state, &headers) {
        return denied;
    }
    if state.reject_writes.load(Ordering::SeqCst) {
        return rejected();
    }
    let mut tables = state.tables.lock();
    let rows = tables.entry(table).or_default();
    let mut out = Vec::new();
    for row in rows.iter_mut().filter(|r| row_matches(r, &params)) {
        merge_into(row, &patch);
        out.push(row.clone());
    }
    Json(out).into_response()
}

async fn delete_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    if let Some(denied) = check_auth(&state, &headers) {
        return denied;
    }
    if state.reject_writes.load(Ordering::SeqCst) {
        return rejected();
    }
    let mut removed = Vec::new();
    if let Some(rows) = state.tables.lock().get_mut(&table) {
        rows.retain(|r| {
            let hit = row_matches(r, &params);
            if hit {
                removed.push(r.clone());
            }
            !hit
        });
    }
    Json(removed).into_response()
}

async fn upload_object(
    State(state): State<Arc<FakeState>>,
    Path((bucket, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(denied) = check_auth(&state, &headers) {
        return denied;
    }
    if state.reject_uploads.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "statusCode": "400",
                "error": "InvalidRequest",
                "message": "upload rejected",
            })),
        )
            .into_response();
    }
    let key = format!("{bucket}/{path}");
    state.objects.lock().insert(key.clone(), body.to_vec());
    Json(json!({ "Key": key })).into_response()
}

async fn download_object(
    State(state): State<Arc<FakeState>>,
    Path((bucket, path)): Path<(String, String)>,
) -> Response {
    match state.objects.lock().get(&format!("{bucket}/{path}")) {
        Some(bytes) => bytes.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve_file(State(state): State<Arc<FakeState>>, Path(name): Path<String>) -> Response {
    match state.files.lock().get(&name) {
        Some(bytes) => bytes.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ========== Client builders ==========

/// URL of a port nothing listens on
pub fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn local_storage(dir: &std::path::Path) -> Arc<LocalStorage> {
    Arc::new(LocalStorage::new(
        Arc::new(FileKeyValueStore::new(dir)),
        Arc::new(MemorySecureStore::new()),
    ))
}

pub fn remote_config(dir: &std::path::Path, url: &str) -> ClientConfig {
    ClientConfig::new(dir)
        .with_remote(url, ANON_KEY)
        .with_timeout(5)
        .with_reachability_timeout_ms(500)
        .with_profile_retry(3, 10)
}

/// Local-only client over a file store in `dir`
pub fn local_client(dir: &std::path::Path) -> WarrantyClient {
    WarrantyClient::with_parts(ClientConfig::new(dir), Backend::LocalOnly, local_storage(dir))
        .unwrap()
}

/// Remote client against `url`, local fallback in `dir`
pub fn remote_client(dir: &std::path::Path, url: &str) -> WarrantyClient {
    let config = remote_config(dir, url);
    let backend = Backend::from_config(&config).unwrap();
    WarrantyClient::with_parts(config, backend, local_storage(dir)).unwrap()
}

/// Write an image file and return its `file://` reference
pub fn write_image(dir: &std::path::Path, name: &str, bytes: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    format!("file://{}", path.display())
}

// ========== Inputs ==========

pub fn sale_input(region: Option<&str>) -> SaleCreate {
    SaleCreate {
        customer_name: "Ayesha Khan".into(),
        customer_phone: "0300-1234567".into(),
        customer_city: Some("Lahore".into()),
        product_model: "RO-500".into(),
        serial_number: "SN-0001".into(),
        branch_id: Some("branch-1".into()),
        region: region.map(Into::into),
        ..Default::default()
    }
}

pub fn complaint_input(invoice: Option<&str>) -> ComplaintCreate {
    ComplaintCreate {
        invoice_number: invoice.map(Into::into),
        customer_name: "Bilal Ahmed".into(),
        customer_phone: "0321-7654321".into(),
        category: ComplaintCategory::Installation,
        description: "Drain pipe leaking after installation".into(),
        branch_id: Some("branch-1".into()),
        ..Default::default()
    }
}

pub fn visit_input() -> FieldVisitCreate {
    FieldVisitCreate {
        customer_name: "Crescent Textiles".into(),
        customer_phone: Some("042-111222".into()),
        branch_id: Some("branch-1".into()),
        region: Some("Punjab".into()),
        ..Default::default()
    }
}
