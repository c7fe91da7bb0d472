//! Domain model, ports, and orchestration for administered users.

pub mod activity;
pub mod attributes;
pub mod context;
pub mod error;
pub mod page;
pub mod ports;
pub mod record;
pub mod repository;
pub mod user;
pub mod user_repository;
pub mod users_service;

pub use activity::{ActivityEvent, ActivityLogEntry, ActivityPolicy, ActivityRecorder};
pub use attributes::AttributeMap;
pub use context::RequestContext;
pub use error::{Error, ErrorCode};
pub use page::{Page, PageRequest};
pub use record::Record;
pub use repository::Repository;
pub use user::{User, UserId, UserRole, UserStatus};
pub use user_repository::UserRepository;
pub use users_service::UserService;
