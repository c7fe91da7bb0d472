//! Port for the append-only audit sink.

use async_trait::async_trait;

use crate::domain::activity::ActivityLogEntry;

/// Errors raised by activity log adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivityLogError {
    /// Sink connection could not be established.
    #[error("activity log connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Append failed during execution.
    #[error("activity log write failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl ActivityLogError {
    /// Build an [`ActivityLogError::Connection`].
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build an [`ActivityLogError::Query`].
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Append-only sink for audit entries.
///
/// Entries are written synchronously within the mutation that produced them
/// and are never updated or deleted by this subsystem.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityLogStore: Send + Sync {
    /// Persist one audit entry.
    async fn append(&self, entry: ActivityLogEntry) -> Result<(), ActivityLogError>;
}
