//! End-to-end audit trail coverage through the user service.

use std::sync::Arc;

use serde_json::json;

use backend::domain::activity::{ActivityEvent, ActivityRecorder};
use backend::domain::attributes::AttributeMap;
use backend::domain::context::RequestContext;
use backend::domain::user::User;
use backend::domain::user_repository::UserRepository;
use backend::domain::users_service::UserService;
use backend::outbound::notification::{SetPasswordNotifier, TracingTransport};
use backend::outbound::persistence::{InMemoryActivityLog, InMemoryStore};

fn service_with_audit() -> (UserService, Arc<InMemoryActivityLog>) {
    let audit = Arc::new(InMemoryActivityLog::new());
    let recorder = Arc::new(ActivityRecorder::new(
        User::activity_policy(),
        audit.clone(),
    ));
    let repository =
        UserRepository::new(Arc::new(InMemoryStore::new())).with_observer(recorder);
    let notifier = Arc::new(SetPasswordNotifier::new(
        Arc::new(TracingTransport),
        "http://localhost:8080",
    ));
    (UserService::new(repository, notifier, 15), audit)
}

fn attributes(email: &str) -> AttributeMap {
    AttributeMap::new()
        .with("first_name", "Ada")
        .with("last_name", "Lovelace")
        .with("email", email)
}

#[tokio::test]
async fn lifecycle_produces_one_entry_per_instance_mutation() {
    let (service, audit) = service_with_audit();
    let ctx = RequestContext::anonymous().with_path("/api/v1/users");

    let user = service
        .create(&ctx, attributes("ada@example.com"))
        .await
        .expect("created");
    service
        .update(
            &ctx,
            user.id().as_str(),
            AttributeMap::new().with("first_name", "Grace"),
        )
        .await
        .expect("updated");
    service
        .delete(&ctx, user.id().as_str())
        .await
        .expect("deleted");

    let entries = audit.entries().expect("audit entries");
    let events: Vec<ActivityEvent> = entries.iter().map(|entry| entry.event).collect();
    assert_eq!(
        events,
        vec![
            ActivityEvent::Created,
            ActivityEvent::Updated,
            ActivityEvent::Deleted,
        ]
    );
    assert!(entries
        .iter()
        .all(|entry| entry.subject_id == user.id().as_str()));
    assert!(entries.iter().all(|entry| entry.log_name == "user"));
}

#[tokio::test]
async fn update_entries_capture_only_dirty_tracked_fields() {
    let (service, audit) = service_with_audit();
    let ctx = RequestContext::anonymous();
    let user = service
        .create(&ctx, attributes("ada@example.com"))
        .await
        .expect("created");

    service
        .update(
            &ctx,
            user.id().as_str(),
            AttributeMap::new()
                .with("first_name", "Grace")
                .with("last_name", "Lovelace"),
        )
        .await
        .expect("updated");

    let entries = audit.entries().expect("audit entries");
    let update = entries
        .iter()
        .find(|entry| entry.event == ActivityEvent::Updated)
        .expect("update entry");
    assert_eq!(update.changes.len(), 1);
    let change = update.changes.get("first_name").expect("dirty field");
    assert_eq!(change.old, Some(json!("Ada")));
    assert_eq!(change.new, Some(json!("Grace")));
}

#[tokio::test]
async fn entries_record_the_acting_user() {
    let (service, audit) = service_with_audit();
    let anonymous = RequestContext::anonymous();
    let admin = service
        .create(&anonymous, attributes("root@example.com"))
        .await
        .expect("created");

    let ctx = RequestContext::for_actor(admin.id().clone()).with_path("/api/v1/users");
    service
        .create(&ctx, attributes("ada@example.com"))
        .await
        .expect("created");

    let entries = audit.entries().expect("audit entries");
    let last = entries.last().expect("an entry");
    assert_eq!(last.actor_id.as_deref(), Some(admin.id().as_str()));
}

#[tokio::test]
async fn no_op_updates_leave_no_trace() {
    let (service, audit) = service_with_audit();
    let ctx = RequestContext::anonymous();
    let user = service
        .create(&ctx, attributes("ada@example.com"))
        .await
        .expect("created");

    service
        .update(
            &ctx,
            user.id().as_str(),
            AttributeMap::new().with("first_name", "Ada"),
        )
        .await
        .expect("updated");

    let entries = audit.entries().expect("audit entries");
    assert!(entries
        .iter()
        .all(|entry| entry.event != ActivityEvent::Updated));
}

#[tokio::test]
async fn logout_requests_suppress_update_entries_but_not_deletions() {
    let (service, audit) = service_with_audit();
    let ctx = RequestContext::anonymous();
    let user = service
        .create(&ctx, attributes("ada@example.com"))
        .await
        .expect("created");

    let logout_ctx = RequestContext::anonymous().with_path("/api/v1/logout");
    service
        .update(
            &logout_ctx,
            user.id().as_str(),
            AttributeMap::new().with("first_name", "Grace"),
        )
        .await
        .expect("updated");
    service
        .delete(&logout_ctx, user.id().as_str())
        .await
        .expect("deleted");

    let entries = audit.entries().expect("audit entries");
    let events: Vec<ActivityEvent> = entries.iter().map(|entry| entry.event).collect();
    assert_eq!(events, vec![ActivityEvent::Created, ActivityEvent::Deleted]);
}

#[tokio::test]
async fn bulk_mutations_bypass_the_trail() {
    let audit = Arc::new(InMemoryActivityLog::new());
    let recorder = Arc::new(ActivityRecorder::new(
        User::activity_policy(),
        audit.clone(),
    ));
    let repository =
        UserRepository::new(Arc::new(InMemoryStore::new())).with_observer(recorder);
    let ctx = RequestContext::anonymous();

    repository
        .create(
            &ctx,
            &attributes("ada@example.com").with("password", "hashed-secret"),
        )
        .await
        .expect("created");
    let affected = repository
        .update_by(
            &AttributeMap::new().with("role", "member"),
            &AttributeMap::new().with("role", "admin"),
        )
        .await
        .expect("bulk update");
    assert_eq!(affected, 1);
    let removed = repository
        .delete_by(&AttributeMap::new().with("role", "admin"))
        .await
        .expect("bulk delete");
    assert_eq!(removed, 1);

    let entries = audit.entries().expect("audit entries");
    assert_eq!(entries.len(), 1, "only the create is recorded");
}
