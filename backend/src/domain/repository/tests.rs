//! Gateway behaviour: observer dispatch rules and error translation.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use super::*;
use crate::domain::error::ErrorCode;
use crate::domain::user::User;
use crate::outbound::persistence::InMemoryStore;

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<String> {
        self.events.lock().expect("observer mutex poisoned").clone()
    }

    fn push(&self, event: String) {
        self.events.lock().expect("observer mutex poisoned").push(event);
    }
}

#[async_trait]
impl RecordObserver<User> for RecordingObserver {
    async fn created(&self, _ctx: &RequestContext, record: &User) -> Result<(), Error> {
        self.push(format!("created:{}", record.id()));
        Ok(())
    }

    async fn updated(&self, _ctx: &RequestContext, _before: &User, after: &User) -> Result<(), Error> {
        self.push(format!("updated:{}", after.id()));
        Ok(())
    }

    async fn deleted(&self, _ctx: &RequestContext, record: &User) -> Result<(), Error> {
        self.push(format!("deleted:{}", record.id()));
        Ok(())
    }
}

fn attributes(email: &str) -> AttributeMap {
    AttributeMap::new()
        .with("first_name", "Ada")
        .with("last_name", "Lovelace")
        .with("email", email)
        .with("password", "hashed-secret")
}

fn repository() -> (Repository<User>, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let repository =
        Repository::new(Arc::new(InMemoryStore::new())).with_observer(observer.clone());
    (repository, observer)
}

#[tokio::test]
async fn create_dispatches_created_once() {
    let (repository, observer) = repository();
    let ctx = RequestContext::anonymous();

    let user = repository
        .create(&ctx, &attributes("ada@example.com"))
        .await
        .expect("created");

    assert_eq!(observer.events(), vec![format!("created:{}", user.id())]);
}

#[tokio::test]
async fn create_conflict_names_the_field_and_skips_observers() {
    let (repository, observer) = repository();
    let ctx = RequestContext::anonymous();
    repository
        .create(&ctx, &attributes("ada@example.com"))
        .await
        .expect("created");

    let error = repository
        .create(&ctx, &attributes("ada@example.com"))
        .await
        .expect_err("duplicate email");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.details(), Some(&json!({ "field": "email" })));
    assert_eq!(observer.events().len(), 1);
}

#[tokio::test]
async fn update_loads_saves_and_dispatches() {
    let (repository, observer) = repository();
    let ctx = RequestContext::anonymous();
    let user = repository
        .create(&ctx, &attributes("ada@example.com"))
        .await
        .expect("created");

    let changed = repository
        .update(&ctx, user.id().as_str(), &AttributeMap::new().with("first_name", "Grace"))
        .await
        .expect("updated");
    assert!(changed);

    let stored = repository
        .find(user.id().as_str())
        .await
        .expect("found")
        .expect("still present");
    assert_eq!(stored.first_name().as_str(), "Grace");
    assert_eq!(
        observer.events(),
        vec![
            format!("created:{}", user.id()),
            format!("updated:{}", user.id()),
        ]
    );
}

#[tokio::test]
async fn update_of_missing_record_reports_no_match() {
    let (repository, observer) = repository();
    let changed = repository
        .update(
            &RequestContext::anonymous(),
            "4f4f4f4f-0000-0000-0000-000000000000",
            &AttributeMap::new().with("first_name", "Grace"),
        )
        .await
        .expect("no-match is not an error");

    assert!(!changed);
    assert!(observer.events().is_empty());
}

#[tokio::test]
async fn update_rejecting_invalid_change_is_an_invalid_request() {
    let (repository, _observer) = repository();
    let ctx = RequestContext::anonymous();
    let user = repository
        .create(&ctx, &attributes("ada@example.com"))
        .await
        .expect("created");

    let error = repository
        .update(&ctx, user.id().as_str(), &AttributeMap::new().with("email", "broken"))
        .await
        .expect_err("invalid email");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn bulk_update_bypasses_observers() {
    let (repository, observer) = repository();
    let ctx = RequestContext::anonymous();
    repository
        .create(&ctx, &attributes("ada@example.com"))
        .await
        .expect("created");
    repository
        .create(&ctx, &attributes("grace@example.com"))
        .await
        .expect("created");

    let affected = repository
        .update_by(
            &AttributeMap::new().with("role", "member"),
            &AttributeMap::new().with("role", "admin"),
        )
        .await
        .expect("bulk update");

    assert_eq!(affected, 2);
    assert_eq!(observer.events().len(), 2, "only the create events");
}

#[tokio::test]
async fn update_by_model_resolves_predicates_then_dispatches() {
    let (repository, observer) = repository();
    let ctx = RequestContext::anonymous();
    let user = repository
        .create(&ctx, &attributes("ada@example.com"))
        .await
        .expect("created");

    let changed = repository
        .update_by_model(
            &ctx,
            &AttributeMap::new().with("email", "ada@example.com"),
            &AttributeMap::new().with("last_name", "King"),
        )
        .await
        .expect("updated");
    assert!(changed);
    assert!(observer
        .events()
        .contains(&format!("updated:{}", user.id())));

    let missed = repository
        .update_by_model(
            &ctx,
            &AttributeMap::new().with("email", "nobody@example.com"),
            &AttributeMap::new().with("last_name", "King"),
        )
        .await
        .expect("no-match is not an error");
    assert!(!missed);
}

#[tokio::test]
async fn delete_soft_deletes_and_dispatches() {
    let (repository, observer) = repository();
    let ctx = RequestContext::anonymous();
    let user = repository
        .create(&ctx, &attributes("ada@example.com"))
        .await
        .expect("created");

    let deleted = repository
        .delete(&ctx, user.id().as_str())
        .await
        .expect("deleted");
    assert!(deleted);
    assert!(repository
        .find(user.id().as_str())
        .await
        .expect("lookup")
        .is_none());
    assert!(observer
        .events()
        .contains(&format!("deleted:{}", user.id())));

    let again = repository
        .delete(&ctx, user.id().as_str())
        .await
        .expect("no-match is not an error");
    assert!(!again);
}

#[tokio::test]
async fn bulk_delete_bypasses_observers() {
    let (repository, observer) = repository();
    let ctx = RequestContext::anonymous();
    repository
        .create(&ctx, &attributes("ada@example.com"))
        .await
        .expect("created");
    repository
        .create(&ctx, &attributes("grace@example.com"))
        .await
        .expect("created");

    let affected = repository
        .delete_by(&AttributeMap::new().with("role", "member"))
        .await
        .expect("bulk delete");

    assert_eq!(affected, 2);
    assert_eq!(observer.events().len(), 2, "only the create events");
}

#[tokio::test]
async fn delete_by_model_resolves_predicates_then_dispatches() {
    let (repository, observer) = repository();
    let ctx = RequestContext::anonymous();
    let user = repository
        .create(&ctx, &attributes("ada@example.com"))
        .await
        .expect("created");

    let deleted = repository
        .delete_by_model(&ctx, &AttributeMap::new().with("email", "ada@example.com"))
        .await
        .expect("deleted");
    assert!(deleted);
    assert!(observer
        .events()
        .contains(&format!("deleted:{}", user.id())));
}

#[tokio::test]
async fn list_pages_newest_first() {
    let (repository, _observer) = repository();
    let ctx = RequestContext::anonymous();
    let first = repository
        .create(&ctx, &attributes("first@example.com"))
        .await
        .expect("created");
    let second = repository
        .create(&ctx, &attributes("second@example.com"))
        .await
        .expect("created");
    repository
        .update(&ctx, first.id().as_str(), &AttributeMap::new().with("first_name", "Grace"))
        .await
        .expect("updated");

    let page = repository.list(PageRequest::new(1, 10)).await.expect("list");
    let ids: Vec<&str> = page.items().iter().map(Record::id).collect();
    assert_eq!(ids, vec![first.id().as_str(), second.id().as_str()]);

    let excluded = repository
        .list_excluding(PageRequest::new(1, 10), first.id().as_str())
        .await
        .expect("list");
    assert_eq!(excluded.total_items(), 1);
}
