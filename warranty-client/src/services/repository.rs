//! Generic record repository
//!
//! Remote-primary / local-fallback access to one entity collection:
//!
//! - reads go to the remote store when configured and fall back to the local
//!   snapshot (filtered client-side) on any error; they never fail
//! - writes go to the authoritative store: remote when configured, otherwise
//!   local. Remote write errors are returned to the caller
//! - successful remote writes and unfiltered remote reads are mirrored into
//!   the local snapshot so the fallback has something to show

use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use shared::error::AppError;
use shared::schema::{Entity, RecordFilter, column_name, from_row, to_row};

use crate::backend::{Backend, RemoteBackend};
use crate::remote::Query;
use crate::storage::LocalStorage;
use crate::{ClientError, ClientResult};

pub struct Repository<E: Entity> {
    backend: Backend,
    local: Arc<LocalStorage>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            local: self.local.clone(),
            _entity: PhantomData,
        }
    }
}

/// Drop the record with the same id and put the new version first
fn upsert_in_place<E: Entity>(items: &mut Vec<E>, record: E) {
    items.retain(|r| r.record_id() != record.record_id());
    items.insert(0, record);
}

impl<E: Entity> Repository<E> {
    pub fn new(backend: Backend, local: Arc<LocalStorage>) -> Self {
        Self {
            backend,
            local,
            _entity: PhantomData,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    // ========== Reads ==========

    /// Records matching `filter`, newest first
    pub async fn list(&self, filter: &RecordFilter) -> Vec<E> {
        if let Backend::Remote(remote) = &self.backend {
            match self.remote_select(remote, &Query::for_entity::<E>(filter)).await {
                Ok(items) => {
                    if filter.is_empty() {
                        self.mirror_snapshot(&items).await;
                    }
                    return items;
                }
                Err(e) => {
                    warn!(table = E::TABLE, error = %e, "Remote list failed, falling back to local store");
                }
            }
        }
        self.local_list(filter).await
    }

    /// Look a record up by primary key or display code
    pub async fn find(&self, key: &str) -> Option<E> {
        if let Backend::Remote(remote) = &self.backend {
            match self.remote_find(remote, key).await {
                Ok(found) => return found,
                Err(e) => {
                    warn!(table = E::TABLE, key, error = %e, "Remote lookup failed, falling back to local store");
                }
            }
        }
        self.local_list(&RecordFilter::new())
            .await
            .into_iter()
            .find(|r| self.matches_key(r, key))
    }

    /// First record matching `filter`
    pub async fn find_by(&self, filter: &RecordFilter) -> Option<E> {
        self.list(filter).await.into_iter().next()
    }

    /// Look a record up by primary key or display code in the authoritative
    /// store only. Errors are returned, not replaced by the local snapshot.
    pub async fn fetch(&self, key: &str) -> ClientResult<Option<E>> {
        match &self.backend {
            Backend::Remote(remote) => self.remote_find(remote, key).await,
            Backend::LocalOnly => Ok(self
                .local
                .load_collection::<E>()
                .await?
                .into_iter()
                .find(|r| self.matches_key(r, key))),
        }
    }

    /// First record matching `filter` in the authoritative store only
    pub async fn fetch_by(&self, filter: &RecordFilter) -> ClientResult<Option<E>> {
        match &self.backend {
            Backend::Remote(remote) => {
                let query = Query::for_entity::<E>(filter).limit(1);
                Ok(self.remote_select(remote, &query).await?.into_iter().next())
            }
            Backend::LocalOnly => Ok(self
                .local
                .load_collection::<E>()
                .await?
                .into_iter()
                .find(|r| filter.matches(r))),
        }
    }

    // ========== Writes ==========

    /// Store a new record (prepended locally)
    pub async fn insert(&self, record: E) -> ClientResult<E> {
        match &self.backend {
            Backend::Remote(remote) => {
                let row = to_row(&record)?;
                let stored: E = from_row(remote.records.insert(E::TABLE, &row).await?)?;
                debug!(table = E::TABLE, id = stored.record_id(), "Record inserted remotely");
                self.mirror_upsert(&stored).await;
                Ok(stored)
            }
            Backend::LocalOnly => {
                self.local
                    .update_collection::<E, _, _>(|items| {
                        items.insert(0, record.clone());
                        Ok(())
                    })
                    .await?;
                debug!(table = E::TABLE, id = record.record_id(), "Record inserted locally");
                Ok(record)
            }
        }
    }

    /// Read-modify-write one record by primary key or display code
    pub async fn update<F>(&self, key: &str, apply: F) -> ClientResult<E>
    where
        F: FnOnce(&mut E) -> ClientResult<()> + Send,
    {
        match &self.backend {
            Backend::Remote(remote) => {
                let mut record = self
                    .remote_find(remote, key)
                    .await?
                    .ok_or_else(|| AppError::not_found(E::NOT_FOUND, key))?;
                apply(&mut record)?;
                let query = Query::new().eq("id", record.record_id());
                let rows = remote
                    .records
                    .update(E::TABLE, &query, &to_row(&record)?)
                    .await?;
                let stored: E = match rows.into_iter().next() {
                    Some(row) => from_row(row)?,
                    None => return Err(AppError::not_found(E::NOT_FOUND, key).into()),
                };
                self.mirror_upsert(&stored).await;
                Ok(stored)
            }
            Backend::LocalOnly => {
                self.local
                    .update_collection::<E, _, _>(|items| {
                        let record = items
                            .iter_mut()
                            .find(|r| self.matches_key(r, key))
                            .ok_or_else(|| AppError::not_found(E::NOT_FOUND, key))?;
                        apply(record)?;
                        Ok(record.clone())
                    })
                    .await
            }
        }
    }

    /// Insert or replace by the entity's upsert key
    pub async fn upsert(&self, record: E) -> ClientResult<E> {
        match &self.backend {
            Backend::Remote(remote) => {
                let on_conflict: Vec<String> =
                    E::UPSERT_FIELDS.iter().map(|f| column_name::<E>(f)).collect();
                let row = to_row(&record)?;
                let stored: E =
                    from_row(remote.records.upsert(E::TABLE, &row, &on_conflict).await?)?;
                self.mirror_upsert(&stored).await;
                Ok(stored)
            }
            Backend::LocalOnly => {
                self.local
                    .update_collection::<E, _, _>(|items| {
                        upsert_in_place(items, record.clone());
                        Ok(())
                    })
                    .await?;
                Ok(record)
            }
        }
    }

    /// Remove one record by primary key or display code
    pub async fn delete(&self, key: &str) -> ClientResult<()> {
        match &self.backend {
            Backend::Remote(remote) => {
                let record = self
                    .remote_find(remote, key)
                    .await?
                    .ok_or_else(|| AppError::not_found(E::NOT_FOUND, key))?;
                let id = record.record_id();
                let removed = remote
                    .records
                    .delete(E::TABLE, &Query::new().eq("id", id))
                    .await?;
                if removed.is_empty() {
                    return Err(AppError::not_found(E::NOT_FOUND, key).into());
                }
                let mirrored = self
                    .local
                    .update_collection::<E, _, _>(|items| {
                        items.retain(|r| r.record_id() != id);
                        Ok(())
                    })
                    .await;
                if let Err(e) = mirrored {
                    warn!(table = E::TABLE, id, error = %e, "Failed to mirror delete locally");
                }
                Ok(())
            }
            Backend::LocalOnly => {
                self.local
                    .update_collection::<E, _, _>(|items| {
                        let index = items
                            .iter()
                            .position(|r| self.matches_key(r, key))
                            .ok_or_else(|| AppError::not_found(E::NOT_FOUND, key))?;
                        items.remove(index);
                        Ok(())
                    })
                    .await
            }
        }
    }

    // ========== Helpers ==========

    async fn remote_select(&self, remote: &RemoteBackend, query: &Query) -> ClientResult<Vec<E>> {
        remote
            .records
            .select(E::TABLE, query)
            .await?
            .into_iter()
            .map(|row| from_row(row).map_err(ClientError::from))
            .collect()
    }

    async fn remote_find(&self, remote: &RemoteBackend, key: &str) -> ClientResult<Option<E>> {
        // Display codes are not valid primary keys; query them by their own column
        let column = match E::CODE_FIELD {
            Some(field) if uuid::Uuid::parse_str(key).is_err() => column_name::<E>(field),
            _ => "id".to_string(),
        };
        let mut query = Query::new().eq(column, key).limit(1);
        if let Some(field) = E::ORDER_FIELD {
            query = query.order(column_name::<E>(field), true);
        }
        Ok(self.remote_select(remote, &query).await?.into_iter().next())
    }

    /// Primary key or display code match
    fn matches_key(&self, record: &E, key: &str) -> bool {
        record.record_id() == key || self.code_of(record).as_deref() == Some(key)
    }

    async fn local_list(&self, filter: &RecordFilter) -> Vec<E> {
        match self.local.load_collection::<E>().await {
            Ok(items) => items.into_iter().filter(|r| filter.matches(r)).collect(),
            Err(e) => {
                warn!(key = E::LOCAL_KEY, error = %e, "Local list failed, returning empty list");
                Vec::new()
            }
        }
    }

    fn code_of(&self, record: &E) -> Option<String> {
        let field = E::CODE_FIELD?;
        serde_json::to_value(record)
            .ok()?
            .get(field)?
            .as_str()
            .map(str::to_string)
    }

    async fn mirror_upsert(&self, record: &E) {
        let record = record.clone();
        let result = self
            .local
            .update_collection::<E, _, _>(|items| {
                upsert_in_place(items, record);
                Ok(())
            })
            .await;
        if let Err(e) = result {
            warn!(table = E::TABLE, error = %e, "Failed to mirror record locally");
        }
    }

    async fn mirror_snapshot(&self, items: &[E]) {
        if let Err(e) = self.local.save_collection(items).await {
            warn!(table = E::TABLE, error = %e, "Failed to refresh local snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::error::ErrorCode;
    use shared::models::{Complaint, ComplaintCategory, ComplaintStatus, Stock};

    fn repo<E: Entity>() -> Repository<E> {
        Repository::new(Backend::LocalOnly, Arc::new(LocalStorage::in_memory()))
    }

    fn complaint(id: &str, code: &str) -> Complaint {
        Complaint {
            id: id.into(),
            complaint_id: code.into(),
            invoice_number: None,
            customer_name: "Bilal".into(),
            customer_phone: "0321".into(),
            customer_email: None,
            product_model: None,
            category: ComplaintCategory::Service,
            description: "No water flow".into(),
            status: ComplaintStatus::Open,
            resolution: None,
            resolved_at: None,
            branch_id: Some("b1".into()),
            region: None,
            image_urls: vec![],
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_prepends_and_find_by_code() {
        let repo = repo::<Complaint>();
        repo.insert(complaint("a", "CMP-000001")).await.unwrap();
        repo.insert(complaint("b", "CMP-000002")).await.unwrap();

        let all = repo.list(&RecordFilter::new()).await;
        let ids: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        assert_eq!(repo.find("a").await.unwrap().complaint_id, "CMP-000001");
        assert_eq!(repo.find("CMP-000002").await.unwrap().id, "b");
        assert!(repo.find("CMP-999999").await.is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let repo = repo::<Complaint>();
        repo.insert(complaint("a", "CMP-000001")).await.unwrap();

        let updated = repo
            .update("a", |c| {
                c.status = ComplaintStatus::InProgress;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(updated.status, ComplaintStatus::InProgress);

        let err = repo.update("zzz", |_| Ok(())).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ComplaintNotFound);

        let err = repo.delete("zzz").await.unwrap_err();
        assert!(err.is_not_found());
        repo.delete("a").await.unwrap();
        assert!(repo.list(&RecordFilter::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_local_upsert_replaces_by_id() {
        let repo = repo::<Stock>();
        repo.upsert(Stock::new("Punjab", "RO-500", 1, Utc::now()))
            .await
            .unwrap();
        repo.upsert(Stock::new("Punjab", "RO-500", 9, Utc::now()))
            .await
            .unwrap();
        let all = repo.list(&RecordFilter::new()).await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].quantity, 9);
    }

    #[tokio::test]
    async fn test_local_upsert_moves_record_to_front() {
        let repo = repo::<Stock>();
        repo.upsert(Stock::new("Punjab", "RO-500", 1, Utc::now()))
            .await
            .unwrap();
        repo.upsert(Stock::new("Sindh", "RO-500", 2, Utc::now()))
            .await
            .unwrap();
        repo.upsert(Stock::new("Punjab", "RO-500", 3, Utc::now()))
            .await
            .unwrap();

        let all = repo.list(&RecordFilter::new()).await;
        let order: Vec<(&str, u32)> = all.iter().map(|s| (s.region.as_str(), s.quantity)).collect();
        assert_eq!(order, vec![("Punjab", 3), ("Sindh", 2)]);
    }

    #[tokio::test]
    async fn test_update_and_delete_by_code() {
        let repo = repo::<Complaint>();
        repo.insert(complaint("a", "CMP-000001")).await.unwrap();
        repo.insert(complaint("b", "CMP-000002")).await.unwrap();

        let updated = repo
            .update("CMP-000001", |c| {
                c.status = ComplaintStatus::Closed;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(updated.id, "a");
        assert_eq!(repo.find("a").await.unwrap().status, ComplaintStatus::Closed);

        repo.delete("CMP-000002").await.unwrap();
        let ids: Vec<String> = repo
            .list(&RecordFilter::new())
            .await
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["a"]);
        assert!(repo.delete("CMP-000002").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_propagates_corruption() {
        let local = Arc::new(LocalStorage::in_memory());
        local
            .set_item(Complaint::LOCAL_KEY, "{not json")
            .await
            .unwrap();
        let repo = Repository::<Complaint>::new(Backend::LocalOnly, local);

        assert!(repo.find("a").await.is_none());
        let err = repo.fetch("a").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::LocalStorageCorrupted);
        let err = repo.fetch_by(&RecordFilter::new()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::LocalStorageCorrupted);
    }

    #[tokio::test]
    async fn test_list_filters_locally() {
        let repo = repo::<Complaint>();
        let mut other = complaint("b", "CMP-000002");
        other.branch_id = Some("b2".into());
        repo.insert(complaint("a", "CMP-000001")).await.unwrap();
        repo.insert(other).await.unwrap();

        let b1 = repo.list(&RecordFilter::new().eq("branchId", "b1")).await;
        assert_eq!(b1.len(), 1);
        assert_eq!(b1[0].id, "a");
    }
}
