//! Violation records flowing from the guard to a sink.

mod common;
use common::{Harness, player};

use async_trait::async_trait;
use spamguard::config::Config;
use spamguard::error::NotifyError;
use spamguard::notify::{Notifier, ViolationRecord, ViolationSink};
use spamguard::services::GuardService;
use spamguard::ViolationType;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Collect(Mutex<Vec<ViolationType>>);

#[async_trait]
impl ViolationSink for Collect {
    async fn deliver(&self, record: &ViolationRecord) -> Result<(), NotifyError> {
        self.0.lock().unwrap().push(record.violation_type);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}

#[tokio::test]
async fn test_records_reach_sink_filtered_by_type() {
    let mut config = Config::default();
    config.webhook.log_word_violations = false;

    let (notifier, worker) = Notifier::new(16);
    let guard = GuardService::new(Arc::new(config)).with_notifier(notifier);
    let mut h = Harness::with_guard(guard);

    h.connect(player(1, 5, "bob"));
    h.chat(1, "spam", false);
    h.chat(1, "see 8.8.8.8", true);
    h.connect(player(2, 6, "admin"));
    h.run_scheduled();

    // Both record effects still reach the host.
    assert_eq!(h.host.records().len(), 3);

    drop(h);
    let sink = Arc::new(Collect::default());
    worker.run(sink.clone()).await;

    let delivered = sink.0.lock().unwrap().clone();
    assert_eq!(delivered, vec![ViolationType::BlockedIp, ViolationType::BlacklistedName]);
}
