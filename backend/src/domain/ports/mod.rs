//! Domain ports for external collaborators.

mod activity_log;
mod notifier;
mod record_observer;
mod record_store;

#[cfg(test)]
pub use activity_log::MockActivityLogStore;
pub use activity_log::{ActivityLogError, ActivityLogStore};
#[cfg(test)]
pub use notifier::MockUserNotifier;
pub use notifier::{NotificationError, UserNotifier};
pub use record_observer::RecordObserver;
pub use record_store::{RecordStore, RecordStoreError};
