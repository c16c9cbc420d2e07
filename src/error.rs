//! Error types for enforcement and notification delivery.
//!
//! Neither error ever reaches the host: enforcement failures are logged and
//! leave the subject unenforced, delivery failures stay inside the notifier
//! task. Configuration errors live in [`crate::config`].

use thiserror::Error;

use crate::subject::SlotId;

// ============================================================================
// Enforcement Errors
// ============================================================================

/// Failures while proposing or committing a forced rename.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnforceError {
    #[error("replacement name is empty")]
    EmptyReplacement,

    #[error("host rejected rename for slot {slot}: {reason}")]
    Rejected { slot: SlotId, reason: String },
}

impl EnforceError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyReplacement => "empty_replacement",
            Self::Rejected { .. } => "rejected",
        }
    }
}

// ============================================================================
// Notification Errors
// ============================================================================

/// Failures delivering a violation record to an external sink.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned status {0}")]
    Status(u16),

    #[error("webhook url is not configured")]
    MissingUrl,

    #[error("notification queue is full")]
    QueueFull,

    #[error("notification queue is closed")]
    QueueClosed,
}

impl NotifyError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_error",
            Self::Status(_) => "bad_status",
            Self::MissingUrl => "missing_url",
            Self::QueueFull => "queue_full",
            Self::QueueClosed => "queue_closed",
        }
    }
}
