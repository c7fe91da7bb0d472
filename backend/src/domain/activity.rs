//! Audit trail entries and the recording policy.
//!
//! The [`ActivityRecorder`] observes instance-level record mutations and
//! decides, per configured policy, whether an audit entry is emitted. Skipped
//! emissions are intentional no-ops, not failures.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::domain::context::RequestContext;
use crate::domain::error::Error;
use crate::domain::ports::{ActivityLogError, ActivityLogStore, RecordObserver};
use crate::domain::record::Record;
use crate::domain::user::User;

/// Lifecycle event kinds eligible for audit capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityEvent {
    /// A record was inserted.
    Created,
    /// A loaded record was mutated and saved.
    Updated,
    /// A loaded record was soft-deleted.
    Deleted,
}

impl ActivityEvent {
    /// Default description string for the event kind.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

/// Old/new value pair for one captured field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    /// Value before the mutation; absent on creation.
    pub old: Option<Value>,
    /// Value after the mutation; absent on deletion.
    pub new: Option<Value>,
}

/// One audit trail entry.
///
/// Entries weakly reference their subject by kind and identifier; deleting
/// the subject never cascades into the trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityLogEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// Log channel the entry belongs to.
    pub log_name: String,
    /// Human-readable event description.
    pub description: String,
    /// Subject entity kind.
    pub subject_kind: &'static str,
    /// Subject entity identifier.
    pub subject_id: String,
    /// Event kind that produced the entry.
    pub event: ActivityEvent,
    /// Captured field changes keyed by field name.
    pub changes: BTreeMap<String, FieldChange>,
    /// Identifier of the acting user, when authenticated.
    pub actor_id: Option<String>,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Per-entity audit capture policy.
#[derive(Debug, Clone)]
pub struct ActivityPolicy {
    log_name: String,
    tracked_fields: Vec<String>,
    log_only_dirty: bool,
    submit_empty_logs: bool,
    recorded_events: Vec<ActivityEvent>,
    descriptions: BTreeMap<ActivityEvent, String>,
}

impl ActivityPolicy {
    /// Policy for the given log channel tracking the named fields.
    ///
    /// Defaults: all event kinds recorded, full tracked set captured,
    /// empty entries discarded.
    #[must_use]
    pub fn new(log_name: impl Into<String>, tracked_fields: &[&str]) -> Self {
        Self {
            log_name: log_name.into(),
            tracked_fields: tracked_fields.iter().map(|f| (*f).to_owned()).collect(),
            log_only_dirty: false,
            submit_empty_logs: false,
            recorded_events: vec![
                ActivityEvent::Created,
                ActivityEvent::Updated,
                ActivityEvent::Deleted,
            ],
            descriptions: BTreeMap::new(),
        }
    }

    /// Capture only fields whose value changed in the triggering mutation.
    #[must_use]
    pub fn log_only_dirty(mut self, enabled: bool) -> Self {
        self.log_only_dirty = enabled;
        self
    }

    /// Emit entries even when no tracked field was captured.
    #[must_use]
    pub fn submit_empty_logs(mut self, enabled: bool) -> Self {
        self.submit_empty_logs = enabled;
        self
    }

    /// Restrict recording to the given event kinds.
    #[must_use]
    pub fn recorded_events(mut self, events: &[ActivityEvent]) -> Self {
        self.recorded_events = events.to_vec();
        self
    }

    /// Override the description emitted for an event kind.
    ///
    /// An empty override disables emission for that kind.
    #[must_use]
    pub fn describe(mut self, event: ActivityEvent, description: impl Into<String>) -> Self {
        self.descriptions.insert(event, description.into());
        self
    }

    /// True when the policy records the event kind.
    #[must_use]
    pub fn records(&self, event: ActivityEvent) -> bool {
        self.recorded_events.contains(&event)
    }

    /// Description string used for the event kind.
    #[must_use]
    pub fn description_for(&self, event: ActivityEvent) -> String {
        self.descriptions
            .get(&event)
            .cloned()
            .unwrap_or_else(|| event.description().to_owned())
    }
}

/// Observer that turns record mutations into audit entries.
pub struct ActivityRecorder {
    policy: ActivityPolicy,
    log: Arc<dyn ActivityLogStore>,
}

impl ActivityRecorder {
    /// Bind a policy to an audit sink.
    pub fn new(policy: ActivityPolicy, log: Arc<dyn ActivityLogStore>) -> Self {
        Self { policy, log }
    }

    fn collect_changes<R: Record>(
        &self,
        event: ActivityEvent,
        before: Option<&R>,
        after: Option<&R>,
    ) -> BTreeMap<String, FieldChange> {
        let before_attributes = before.map(Record::attributes);
        let after_attributes = after.map(Record::attributes);
        let mut changes = BTreeMap::new();

        for field in &self.policy.tracked_fields {
            let old = before_attributes
                .as_ref()
                .and_then(|a| a.get(field))
                .cloned();
            let new = after_attributes
                .as_ref()
                .and_then(|a| a.get(field))
                .cloned();
            match event {
                ActivityEvent::Created => {
                    if new.is_some() {
                        changes.insert(field.clone(), FieldChange { old: None, new });
                    }
                }
                ActivityEvent::Deleted => {
                    if old.is_some() {
                        changes.insert(field.clone(), FieldChange { old, new: None });
                    }
                }
                ActivityEvent::Updated => {
                    if self.policy.log_only_dirty && old == new {
                        continue;
                    }
                    changes.insert(field.clone(), FieldChange { old, new });
                }
            }
        }
        changes
    }

    async fn record<R: Record>(
        &self,
        ctx: &RequestContext,
        event: ActivityEvent,
        before: Option<&R>,
        after: Option<&R>,
    ) -> Result<(), Error> {
        if !self.policy.records(event) {
            debug!(kind = R::KIND, ?event, "event kind not recorded by policy");
            return Ok(());
        }
        let description = self.policy.description_for(event);
        if description.is_empty() {
            return Ok(());
        }
        let Some(subject) = after.or(before) else {
            return Ok(());
        };

        let changes = self.collect_changes(event, before, after);
        if changes.is_empty() && !self.policy.submit_empty_logs {
            debug!(
                kind = R::KIND,
                subject = subject.id(),
                ?event,
                "no tracked attributes captured; entry discarded"
            );
            return Ok(());
        }

        let entry = ActivityLogEntry {
            id: Uuid::new_v4(),
            log_name: self.policy.log_name.clone(),
            description: description.clone(),
            subject_kind: R::KIND,
            subject_id: subject.id().to_owned(),
            event,
            changes,
            actor_id: ctx.actor().map(ToString::to_string),
            recorded_at: Utc::now(),
        };

        // The logout flow saves incidental user state; those writes are
        // noise in the trail, so emission is suppressed while a logout
        // request is in flight unless this is a non-update event on the
        // user entity itself.
        if ctx.is_logout_request() && (description == "updated" || R::KIND != User::KIND) {
            debug!(
                kind = R::KIND,
                subject = subject.id(),
                path = ctx.request_path().unwrap_or_default(),
                ?event,
                "entry suppressed during logout request"
            );
            return Ok(());
        }

        self.log.append(entry).await.map_err(map_log_error)
    }
}

fn map_log_error(error: ActivityLogError) -> Error {
    match error {
        ActivityLogError::Connection { message } => Error::service_unavailable(message),
        ActivityLogError::Query { message } => Error::internal(message),
    }
}

#[async_trait]
impl<R: Record> RecordObserver<R> for ActivityRecorder {
    async fn created(&self, ctx: &RequestContext, record: &R) -> Result<(), Error> {
        self.record(ctx, ActivityEvent::Created, None, Some(record))
            .await
    }

    async fn updated(&self, ctx: &RequestContext, before: &R, after: &R) -> Result<(), Error> {
        self.record(ctx, ActivityEvent::Updated, Some(before), Some(after))
            .await
    }

    async fn deleted(&self, ctx: &RequestContext, record: &R) -> Result<(), Error> {
        self.record(ctx, ActivityEvent::Deleted, Some(record), None)
            .await
    }
}
