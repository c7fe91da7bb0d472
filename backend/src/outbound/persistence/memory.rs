//! In-memory adapters for the record store and audit sink.
//!
//! These back the default server wiring and the test suites. Records live in
//! a mutex-guarded map keyed by identifier; soft-deleted rows stay in the map
//! and are filtered from reads.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::activity::ActivityLogEntry;
use crate::domain::attributes::AttributeMap;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{ActivityLogError, ActivityLogStore, RecordStore, RecordStoreError};
use crate::domain::record::Record;

/// Mutex-backed record store.
pub struct InMemoryStore<R: Record> {
    records: Mutex<BTreeMap<String, R>>,
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<R: Record> InMemoryStore<R> {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, BTreeMap<String, R>>, RecordStoreError> {
        self.records
            .lock()
            .map_err(|_| RecordStoreError::query("record store mutex poisoned"))
    }
}

/// First unique field of `candidate` already taken by another live record.
fn unique_conflict<R: Record>(records: &BTreeMap<String, R>, candidate: &R) -> Option<String> {
    let snapshot = candidate.attributes();
    for field in R::unique_fields() {
        let Some(value) = snapshot.get(field) else {
            continue;
        };
        let taken = records.values().any(|existing| {
            existing.id() != candidate.id()
                && !existing.is_deleted()
                && existing.attributes().get(field) == Some(value)
        });
        if taken {
            return Some((*field).to_owned());
        }
    }
    None
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    async fn insert(&self, attributes: &AttributeMap) -> Result<R, RecordStoreError> {
        let record = R::from_attributes(attributes, Utc::now())?;
        let mut records = self.guard()?;
        if let Some(field) = unique_conflict(&records, &record) {
            return Err(RecordStoreError::conflict(field));
        }
        records.insert(record.id().to_owned(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<R>, RecordStoreError> {
        let records = self.guard()?;
        Ok(records
            .get(id)
            .filter(|record| !record.is_deleted())
            .cloned())
    }

    async fn find_first(&self, predicates: &AttributeMap) -> Result<Option<R>, RecordStoreError> {
        let records = self.guard()?;
        Ok(records
            .values()
            .find(|record| !record.is_deleted() && record.matches(predicates))
            .cloned())
    }

    async fn save(&self, record: &R) -> Result<(), RecordStoreError> {
        let mut records = self.guard()?;
        if let Some(field) = unique_conflict(&records, record) {
            return Err(RecordStoreError::conflict(field));
        }
        records.insert(record.id().to_owned(), record.clone());
        Ok(())
    }

    async fn update_where(
        &self,
        predicates: &AttributeMap,
        changes: &AttributeMap,
    ) -> Result<u64, RecordStoreError> {
        let mut records = self.guard()?;
        let matching: Vec<String> = records
            .values()
            .filter(|record| !record.is_deleted() && record.matches(predicates))
            .map(|record| record.id().to_owned())
            .collect();

        let now = Utc::now();
        let mut affected = 0;
        for id in matching {
            let Some(record) = records.get(&id) else {
                continue;
            };
            let mut changed = record.clone();
            changed.apply(changes)?;
            changed.touch(now);
            if let Some(field) = unique_conflict(&records, &changed) {
                return Err(RecordStoreError::conflict(field));
            }
            records.insert(id, changed);
            affected += 1;
        }
        Ok(affected)
    }

    async fn soft_delete(&self, record: &R) -> Result<(), RecordStoreError> {
        let mut copy = record.clone();
        if !copy.is_deleted() {
            copy.mark_deleted(Utc::now());
        }
        let mut records = self.guard()?;
        records.insert(copy.id().to_owned(), copy);
        Ok(())
    }

    async fn soft_delete_where(&self, predicates: &AttributeMap) -> Result<u64, RecordStoreError> {
        let mut records = self.guard()?;
        let now = Utc::now();
        let mut affected = 0;
        for record in records.values_mut() {
            if !record.is_deleted() && record.matches(predicates) {
                record.mark_deleted(now);
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn list(
        &self,
        page: PageRequest,
        exclude_id: Option<&str>,
    ) -> Result<Page<R>, RecordStoreError> {
        let records = self.guard()?;
        let mut live: Vec<R> = records
            .values()
            .filter(|record| !record.is_deleted() && Some(record.id()) != exclude_id)
            .cloned()
            .collect();
        live.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(Page::paginate(live, page))
    }
}

/// Mutex-backed append-only audit sink.
#[derive(Default)]
pub struct InMemoryActivityLog {
    entries: Mutex<Vec<ActivityLogEntry>>,
}

impl InMemoryActivityLog {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry appended so far, in append order.
    ///
    /// # Errors
    /// `Query` when the sink mutex is poisoned.
    pub fn entries(&self) -> Result<Vec<ActivityLogEntry>, ActivityLogError> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|_| ActivityLogError::query("activity log mutex poisoned"))
    }
}

#[async_trait]
impl ActivityLogStore for InMemoryActivityLog {
    async fn append(&self, entry: ActivityLogEntry) -> Result<(), ActivityLogError> {
        self.entries
            .lock()
            .map_err(|_| ActivityLogError::query("activity log mutex poisoned"))?
            .push(entry);
        Ok(())
    }
}
