//! Observer seam for instance-level record mutations.

use async_trait::async_trait;

use crate::domain::context::RequestContext;
use crate::domain::error::Error;
use crate::domain::record::Record;

/// Callback invoked by the repository on instance-level lifecycle events.
///
/// Observers are registered explicitly against the gateway rather than wired
/// implicitly into the store. Bulk predicate paths (`update_by`, `delete_by`)
/// bypass observers; only load-then-mutate paths dispatch them. Observers run
/// synchronously within the triggering operation but are not transactionally
/// atomic with it.
#[async_trait]
pub trait RecordObserver<R: Record>: Send + Sync {
    /// A record was inserted.
    async fn created(&self, ctx: &RequestContext, record: &R) -> Result<(), Error>;

    /// A loaded record was mutated and saved.
    async fn updated(&self, ctx: &RequestContext, before: &R, after: &R) -> Result<(), Error>;

    /// A loaded record was soft-deleted.
    async fn deleted(&self, ctx: &RequestContext, record: &R) -> Result<(), Error>;
}
