//! Error types shared across the crate.

use crate::task::TaskId;

/// Failures of the local key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected controller operations. The collection is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("task not found: {0}")]
    NotFound(TaskId),
}

/// Form validation failures, shown inline in the dialog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Invalid due date `{0}` (use YYYY-MM-DD or YYYY-MM-DD HH:MM)")]
    InvalidDueDate(String),
}
