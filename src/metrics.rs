//! Prometheus metrics collection for spamguard.
//!
//! - `spamguard_violations_total{type,channel}` - Blocked content by category
//! - `spamguard_cooldown_suppressed_total{channel}` - Repeats swallowed by the cooldown
//! - `spamguard_sanctions_total{action}` - Dispatched chat sanctions
//! - `spamguard_renames_total{phase}` - Forced renames (proposed, reapplied, rejected)
//! - `spamguard_notifications_total{result}` - Violation sink deliveries
//! - `spamguard_enforced_subjects` - Size of the enforcement set
//!
//! Every recorder is a no-op until [`init`] has run.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Blocked content by violation type and channel.
pub static VIOLATIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Blocked messages that fell inside the cooldown window.
pub static COOLDOWN_SUPPRESSED: OnceLock<IntCounterVec> = OnceLock::new();

/// Sanctions dispatched by action.
pub static SANCTIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Forced renames by phase.
pub static RENAMES: OnceLock<IntCounterVec> = OnceLock::new();

/// Violation sink deliveries by result.
pub static NOTIFICATIONS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Subjects currently under an enforced replacement name.
pub static ENFORCED_SUBJECTS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup. Later calls leave the existing metrics in place.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                let m = $init.expect(concat!(stringify!($metric), " creation failed"));
                if let Err(e) = r.register(Box::new(m.clone())) {
                    tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                }
                let _ = $metric.set(m);
            }
        };
    }

    register!(VIOLATIONS, IntCounterVec::new(Opts::new("spamguard_violations_total", "Blocked content by violation type and channel"), &["type", "channel"]));
    register!(COOLDOWN_SUPPRESSED, IntCounterVec::new(Opts::new("spamguard_cooldown_suppressed_total", "Violations suppressed by the cooldown window"), &["channel"]));
    register!(SANCTIONS, IntCounterVec::new(Opts::new("spamguard_sanctions_total", "Chat sanctions dispatched by action"), &["action"]));
    register!(RENAMES, IntCounterVec::new(Opts::new("spamguard_renames_total", "Forced renames by phase"), &["phase"]));
    register!(NOTIFICATIONS, IntCounterVec::new(Opts::new("spamguard_notifications_total", "Violation sink deliveries by result"), &["result"]));
    register!(ENFORCED_SUBJECTS, IntGauge::new("spamguard_enforced_subjects", "Subjects with an enforced replacement name"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recorders
// ============================================================================

fn inc(metric: &OnceLock<IntCounterVec>, labels: &[&str]) {
    if let Some(c) = metric.get() {
        c.with_label_values(labels).inc();
    }
}

#[inline]
pub fn record_violation(violation_type: &str, channel: &str) {
    inc(&VIOLATIONS, &[violation_type, channel]);
}

#[inline]
pub fn record_cooldown_suppressed(channel: &str) {
    inc(&COOLDOWN_SUPPRESSED, &[channel]);
}

#[inline]
pub fn record_sanction(action: &str) {
    inc(&SANCTIONS, &[action]);
}

#[inline]
pub fn record_rename(phase: &str) {
    inc(&RENAMES, &[phase]);
}

#[inline]
pub fn record_notification(result: &str) {
    inc(&NOTIFICATIONS, &[result]);
}

/// Update the enforced-subject gauge.
#[inline]
pub fn set_enforced_subjects(count: usize) {
    if let Some(g) = ENFORCED_SUBJECTS.get() {
        g.set(count as i64);
    }
}
