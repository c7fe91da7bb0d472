//! Record abstraction bridging domain entities and the record store.

use chrono::{DateTime, Utc};

use crate::domain::attributes::AttributeMap;
use crate::domain::ports::RecordStoreError;

/// Entity persisted through the record store.
///
/// Implementors expose attribute snapshots so the generic repository,
/// equality predicates, and the activity recorder can treat entities
/// uniformly. Secrets must never appear in [`Record::attributes`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Stable entity kind recorded as the audit subject type.
    const KIND: &'static str;

    /// Primary identifier, assigned exactly once before first persistence.
    fn id(&self) -> &str;

    /// Snapshot of loggable attributes keyed by field name.
    fn attributes(&self) -> AttributeMap;

    /// Build a fresh record from creation attributes.
    ///
    /// # Errors
    /// Returns [`RecordStoreError::Validation`] when required attributes are
    /// missing or malformed.
    fn from_attributes(attributes: &AttributeMap, now: DateTime<Utc>)
    -> Result<Self, RecordStoreError>;

    /// Apply assignable attribute changes to a loaded instance.
    ///
    /// # Errors
    /// Returns [`RecordStoreError::Validation`] when a supplied value fails
    /// the entity's invariants.
    fn apply(&mut self, attributes: &AttributeMap) -> Result<(), RecordStoreError>;

    /// True when every equality predicate matches this record.
    fn matches(&self, predicates: &AttributeMap) -> bool {
        let attributes = self.attributes();
        predicates
            .iter()
            .all(|(name, value)| attributes.get(name) == Some(value))
    }

    /// Field names participating in store-level uniqueness constraints.
    fn unique_fields() -> &'static [&'static str];

    /// Soft-delete marker; deleted records are excluded from queries by default.
    fn is_deleted(&self) -> bool;

    /// Mark the record soft-deleted. The row is never removed.
    fn mark_deleted(&mut self, at: DateTime<Utc>);

    /// Last-modified timestamp used for listing order.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Refresh the last-modified timestamp.
    fn touch(&mut self, at: DateTime<Utc>);
}
