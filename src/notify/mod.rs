//! Violation records and background delivery.
//!
//! The guard hands records to a [`Notifier`], which pushes them onto a
//! bounded queue without blocking. A [`NotifierWorker`] drains the queue on
//! its own task and delivers each record to a [`ViolationSink`]. Delivery
//! failures are logged there and never reach the guard.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod webhook;

pub use webhook::WebhookSink;

use crate::error::NotifyError;
use crate::filter::{FilterResult, ViolationType};
use crate::metrics;
use crate::services::ViolationChannel;
use crate::subject::Subject;

/// Ready-state tags some game modes prepend to display names.
const READY_TAGS: [&str; 4] = ["[Ready]", "[No Ready]", "[READY]", "[NOT READY]"];

/// Strip ready-state tags and surrounding whitespace from a display name.
pub fn clean_subject_name(name: &str) -> String {
    READY_TAGS
        .iter()
        .fold(name.to_string(), |acc, tag| acc.replace(tag, ""))
        .trim()
        .to_string()
}

/// One recorded violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationRecord {
    pub id: Uuid,
    pub subject_name: String,
    /// SteamID64, or `"Unknown"` for unauthenticated subjects.
    pub stable_identity: String,
    pub violation_type: ViolationType,
    pub channel: ViolationChannel,
    pub reason: String,
    pub detected_content: String,
    pub server_label: String,
    pub timestamp: DateTime<Utc>,
}

impl ViolationRecord {
    pub fn new(
        subject: &Subject,
        result: &FilterResult,
        channel: ViolationChannel,
        server_label: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_name: clean_subject_name(&subject.name),
            stable_identity: subject.stable_identity(),
            violation_type: result.violation_type,
            channel,
            reason: result.reason.clone(),
            detected_content: result.detected_content.clone(),
            server_label: server_label.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Destination for violation records.
#[async_trait]
pub trait ViolationSink: Send + Sync {
    /// Deliver one record.
    async fn deliver(&self, record: &ViolationRecord) -> Result<(), NotifyError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Sink that only logs. Used when no webhook is configured.
pub struct LogSink;

#[async_trait]
impl ViolationSink for LogSink {
    async fn deliver(&self, record: &ViolationRecord) -> Result<(), NotifyError> {
        debug!(id = %record.id, violation = %record.violation_type, "Violation recorded");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Non-blocking handle onto the delivery queue.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<ViolationRecord>,
}

/// Receiving half of the delivery queue.
pub struct NotifierWorker {
    rx: mpsc::Receiver<ViolationRecord>,
}

impl Notifier {
    /// Create a queue holding at most `capacity` pending records.
    pub fn new(capacity: usize) -> (Self, NotifierWorker) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, NotifierWorker { rx })
    }

    /// Create the queue and spawn its worker on the current runtime.
    pub fn spawn(capacity: usize, sink: Arc<dyn ViolationSink>) -> (Self, tokio::task::JoinHandle<()>) {
        let (notifier, worker) = Self::new(capacity);
        let handle = tokio::spawn(worker.run(sink));
        (notifier, handle)
    }

    /// Queue a record. Never blocks; a full or closed queue drops the record.
    pub fn submit(&self, record: ViolationRecord) -> Result<(), NotifyError> {
        match self.tx.try_send(record) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(record)) => {
                warn!(id = %record.id, "Notification queue full; dropping violation record");
                metrics::record_notification(NotifyError::QueueFull.error_code());
                Err(NotifyError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                metrics::record_notification(NotifyError::QueueClosed.error_code());
                Err(NotifyError::QueueClosed)
            }
        }
    }
}

impl NotifierWorker {
    /// Drain the queue until every [`Notifier`] handle is dropped.
    pub async fn run(mut self, sink: Arc<dyn ViolationSink>) {
        info!(sink = sink.name(), "Violation notifier started");
        while let Some(record) = self.rx.recv().await {
            match sink.deliver(&record).await {
                Ok(()) => metrics::record_notification("delivered"),
                Err(e) => {
                    warn!(sink = sink.name(), id = %record.id, error = %e, "Failed to deliver violation record");
                    metrics::record_notification(e.error_code());
                }
            }
        }
        info!(sink = sink.name(), "Violation notifier stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::SlotId;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        delivered: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ViolationSink for Recording {
        async fn deliver(&self, record: &ViolationRecord) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Status(500));
            }
            self.delivered.lock().unwrap().push(record.detected_content.clone());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn record(content: &str) -> ViolationRecord {
        let subject = Subject::new(SlotId(1), "[Ready] bob").with_steam_id(42);
        let result = FilterResult::blocked(ViolationType::BlockedUrl, "domain in blacklist", content);
        ViolationRecord::new(&subject, &result, ViolationChannel::Chat, "Test")
    }

    #[test]
    fn test_clean_subject_name() {
        assert_eq!(clean_subject_name("[Ready] bob"), "bob");
        assert_eq!(clean_subject_name("[NOT READY]alice "), "alice");
        assert_eq!(clean_subject_name("carol"), "carol");
    }

    #[test]
    fn test_record_fields() {
        let r = record("kick.com");
        assert_eq!(r.subject_name, "bob");
        assert_eq!(r.stable_identity, "42");
        assert_eq!(r.server_label, "Test");
        assert_eq!(r.channel, ViolationChannel::Chat);
    }

    #[tokio::test]
    async fn test_worker_delivers_in_order() {
        let sink = Arc::new(Recording::default());
        let (notifier, worker) = Notifier::new(8);
        notifier.submit(record("a")).unwrap();
        notifier.submit(record("b")).unwrap();
        drop(notifier);

        worker.run(sink.clone()).await;
        assert_eq!(*sink.delivered.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_full_queue_drops() {
        let (notifier, _worker) = Notifier::new(1);
        notifier.submit(record("a")).unwrap();
        let err = notifier.submit(record("b")).unwrap_err();
        assert!(matches!(err, NotifyError::QueueFull));
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let (notifier, worker) = Notifier::new(1);
        drop(worker);
        assert!(matches!(notifier.submit(record("a")), Err(NotifyError::QueueClosed)));
    }

    #[tokio::test]
    async fn test_delivery_failure_contained() {
        let sink = Arc::new(Recording {
            fail: true,
            ..Recording::default()
        });
        let (notifier, worker) = Notifier::new(4);
        notifier.submit(record("a")).unwrap();
        drop(notifier);
        worker.run(sink.clone()).await;
        assert!(sink.delivered.lock().unwrap().is_empty());
    }
}
