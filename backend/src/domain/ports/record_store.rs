//! Port abstraction over the external record store.

use async_trait::async_trait;

use crate::domain::attributes::AttributeMap;
use crate::domain::page::{Page, PageRequest};
use crate::domain::record::Record;

/// Errors raised by record store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordStoreError {
    /// Store connection could not be established.
    #[error("record store connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("record store query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Required attributes were missing or failed entity invariants.
    #[error("invalid attributes: {message}")]
    Validation {
        /// Description of the rejected attribute.
        message: String,
    },
    /// A store-level uniqueness constraint was violated.
    #[error("unique constraint violated on `{field}`")]
    Conflict {
        /// Name of the conflicting field.
        field: String,
    },
}

impl RecordStoreError {
    /// Build a [`RecordStoreError::Connection`].
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`RecordStoreError::Query`].
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Build a [`RecordStoreError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build a [`RecordStoreError::Conflict`].
    pub fn conflict(field: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
        }
    }
}

/// CRUD surface the persistence gateway requires from the backing store.
///
/// The store itself is oblivious to lifecycle observers; the gateway decides
/// which paths dispatch them. Soft-deleted records are excluded from every
/// read unless stated otherwise.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Insert a new record built from `attributes`.
    ///
    /// # Errors
    /// `Validation` when required attributes are missing or malformed,
    /// `Conflict` when a uniqueness constraint is violated.
    async fn insert(&self, attributes: &AttributeMap) -> Result<R, RecordStoreError>;

    /// Fetch a record by primary identifier; absence is not an error.
    async fn get(&self, id: &str) -> Result<Option<R>, RecordStoreError>;

    /// First record matching all equality predicates, in store order.
    async fn find_first(&self, predicates: &AttributeMap) -> Result<Option<R>, RecordStoreError>;

    /// Persist the current state of a loaded instance.
    async fn save(&self, record: &R) -> Result<(), RecordStoreError>;

    /// Bulk update of every record matching `predicates`; returns the
    /// affected count.
    async fn update_where(
        &self,
        predicates: &AttributeMap,
        changes: &AttributeMap,
    ) -> Result<u64, RecordStoreError>;

    /// Soft-delete a loaded instance.
    async fn soft_delete(&self, record: &R) -> Result<(), RecordStoreError>;

    /// Bulk soft-delete of every record matching `predicates`; returns the
    /// affected count.
    async fn soft_delete_where(&self, predicates: &AttributeMap) -> Result<u64, RecordStoreError>;

    /// One page of live records ordered by last update, newest first,
    /// optionally excluding a single identifier.
    async fn list(
        &self,
        page: PageRequest,
        exclude_id: Option<&str>,
    ) -> Result<Page<R>, RecordStoreError>;
}
