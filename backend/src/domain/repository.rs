//! Generic persistence gateway dispatching lifecycle observers.
//!
//! The repository is the only component that decides which operations fire
//! observers. Instance paths (create, update-by-id, delete-by-id and their
//! by-model variants) load the record and dispatch; bulk predicate paths
//! mutate in the store directly and dispatch nothing.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::instrument;

use crate::domain::attributes::AttributeMap;
use crate::domain::context::RequestContext;
use crate::domain::error::Error;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{RecordObserver, RecordStore, RecordStoreError};
use crate::domain::record::Record;

/// Persistence gateway for one record type.
pub struct Repository<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    observers: Vec<Arc<dyn RecordObserver<R>>>,
}

impl<R: Record> Repository<R> {
    /// Gateway over `store` with no observers registered.
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self {
            store,
            observers: Vec::new(),
        }
    }

    /// Register an observer for instance-level lifecycle events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RecordObserver<R>>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Insert a new record and dispatch `created` observers.
    ///
    /// # Errors
    /// `invalid_request` for malformed attributes, `conflict` for uniqueness
    /// violations, plus any observer failure.
    #[instrument(skip_all, fields(kind = R::KIND))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        attributes: &AttributeMap,
    ) -> Result<R, Error> {
        let record = self
            .store
            .insert(attributes)
            .await
            .map_err(map_store_error)?;
        for observer in &self.observers {
            observer.created(ctx, &record).await?;
        }
        Ok(record)
    }

    /// Fetch a record by identifier; absence yields `Ok(None)`.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn find(&self, id: &str) -> Result<Option<R>, Error> {
        self.store.get(id).await.map_err(map_store_error)
    }

    /// First record matching all equality predicates.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn find_by(&self, predicates: &AttributeMap) -> Result<Option<R>, Error> {
        self.store
            .find_first(predicates)
            .await
            .map_err(map_store_error)
    }

    /// Load the record by identifier, apply `attributes`, save, and dispatch
    /// `updated` observers. Returns `Ok(false)` when no record matches.
    ///
    /// # Errors
    /// `invalid_request` when a change violates entity invariants, `conflict`
    /// on uniqueness violations, plus any observer failure.
    #[instrument(skip_all, fields(kind = R::KIND, id = %id))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        attributes: &AttributeMap,
    ) -> Result<bool, Error> {
        let Some(record) = self.store.get(id).await.map_err(map_store_error)? else {
            return Ok(false);
        };
        self.update_instance(ctx, record, attributes).await?;
        Ok(true)
    }

    /// Bulk update of every record matching `predicates`, without observer
    /// dispatch. Returns the affected count; zero matches is not an error.
    ///
    /// # Errors
    /// Store failures only.
    #[instrument(skip_all, fields(kind = R::KIND))]
    pub async fn update_by(
        &self,
        predicates: &AttributeMap,
        changes: &AttributeMap,
    ) -> Result<u64, Error> {
        self.store
            .update_where(predicates, changes)
            .await
            .map_err(map_store_error)
    }

    /// Resolve the first record matching `predicates` and run an instance
    /// update on it, dispatching observers. Returns `Ok(false)` when nothing
    /// matches.
    ///
    /// # Errors
    /// As for [`Repository::update`].
    pub async fn update_by_model(
        &self,
        ctx: &RequestContext,
        predicates: &AttributeMap,
        attributes: &AttributeMap,
    ) -> Result<bool, Error> {
        let Some(record) = self.find_by(predicates).await? else {
            return Ok(false);
        };
        self.update_instance(ctx, record, attributes).await?;
        Ok(true)
    }

    /// Soft-delete the record by identifier and dispatch `deleted` observers.
    /// Returns `Ok(false)` when no record matches.
    ///
    /// # Errors
    /// Store failures plus any observer failure.
    #[instrument(skip_all, fields(kind = R::KIND, id = %id))]
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<bool, Error> {
        let Some(record) = self.store.get(id).await.map_err(map_store_error)? else {
            return Ok(false);
        };
        self.delete_instance(ctx, record).await?;
        Ok(true)
    }

    /// Bulk soft-delete of every record matching `predicates`, without
    /// observer dispatch. Returns the affected count.
    ///
    /// # Errors
    /// Store failures only.
    #[instrument(skip_all, fields(kind = R::KIND))]
    pub async fn delete_by(&self, predicates: &AttributeMap) -> Result<u64, Error> {
        self.store
            .soft_delete_where(predicates)
            .await
            .map_err(map_store_error)
    }

    /// Resolve the first record matching `predicates` and soft-delete it,
    /// dispatching observers. Returns `Ok(false)` when nothing matches.
    ///
    /// # Errors
    /// As for [`Repository::delete`].
    pub async fn delete_by_model(
        &self,
        ctx: &RequestContext,
        predicates: &AttributeMap,
    ) -> Result<bool, Error> {
        let Some(record) = self.find_by(predicates).await? else {
            return Ok(false);
        };
        self.delete_instance(ctx, record).await?;
        Ok(true)
    }

    /// One page of live records, newest update first.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn list(&self, page: PageRequest) -> Result<Page<R>, Error> {
        self.store
            .list(page, None)
            .await
            .map_err(map_store_error)
    }

    /// One page of live records with a single identifier filtered out.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn list_excluding(
        &self,
        page: PageRequest,
        exclude_id: &str,
    ) -> Result<Page<R>, Error> {
        self.store
            .list(page, Some(exclude_id))
            .await
            .map_err(map_store_error)
    }

    async fn update_instance(
        &self,
        ctx: &RequestContext,
        record: R,
        attributes: &AttributeMap,
    ) -> Result<(), Error> {
        let before = record.clone();
        let mut after = record;
        after.apply(attributes).map_err(map_store_error)?;
        after.touch(Utc::now());
        self.store.save(&after).await.map_err(map_store_error)?;
        for observer in &self.observers {
            observer.updated(ctx, &before, &after).await?;
        }
        Ok(())
    }

    async fn delete_instance(&self, ctx: &RequestContext, record: R) -> Result<(), Error> {
        let mut deleted = record;
        deleted.mark_deleted(Utc::now());
        self.store
            .soft_delete(&deleted)
            .await
            .map_err(map_store_error)?;
        for observer in &self.observers {
            observer.deleted(ctx, &deleted).await?;
        }
        Ok(())
    }
}

/// Translate adapter failures into the domain error vocabulary.
fn map_store_error(error: RecordStoreError) -> Error {
    match error {
        RecordStoreError::Validation { message } => Error::invalid_request(message),
        RecordStoreError::Conflict { field } => {
            Error::conflict(format!("value already in use for `{field}`"))
                .with_details(json!({ "field": field }))
        }
        RecordStoreError::Connection { message } => Error::service_unavailable(message),
        RecordStoreError::Query { message } => Error::internal(message),
    }
}

#[cfg(test)]
mod tests;
