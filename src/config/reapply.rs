//! Name re-application schedule.
//!
//! The host can reset display names at round boundaries, spawns and deaths.
//! Each trigger schedules one or more re-application passes; all delays are
//! in seconds.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{
    default_name_check_delay, default_name_notice_delay, default_reapply_death,
    default_reapply_on_connect, default_reapply_round_end, default_reapply_round_start,
    default_reapply_spawn,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ReapplyConfig {
    /// Passes after a subject finishes connecting (default: [0.0]).
    #[serde(default = "default_reapply_on_connect")]
    pub on_connect: Vec<f64>,
    /// Delay before a new subject's name is checked (default: 2.0).
    #[serde(default = "default_name_check_delay")]
    pub name_check_delay: f64,
    /// Passes after round start (default: [1.0, 3.0, 5.0]).
    #[serde(default = "default_reapply_round_start")]
    pub round_start: Vec<f64>,
    /// Passes after round end (default: [1.0, 3.0]).
    #[serde(default = "default_reapply_round_end")]
    pub round_end: Vec<f64>,
    #[serde(default = "default_reapply_spawn")]
    pub spawn: Vec<f64>,
    #[serde(default = "default_reapply_death")]
    pub death: Vec<f64>,
    /// Delay before the renamed subject is told about it (default: 0.5).
    #[serde(default = "default_name_notice_delay")]
    pub name_notice_delay: f64,
}

/// Convert configured seconds to durations, dropping negative or non-finite values.
pub fn delays(secs: &[f64]) -> Vec<Duration> {
    secs.iter().filter_map(|&s| seconds(s)).collect()
}

/// Convert one configured delay. Negative and non-finite values yield `None`.
pub fn seconds(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

impl Default for ReapplyConfig {
    fn default() -> Self {
        Self {
            on_connect: default_reapply_on_connect(),
            name_check_delay: default_name_check_delay(),
            round_start: default_reapply_round_start(),
            round_end: default_reapply_round_end(),
            spawn: default_reapply_spawn(),
            death: default_reapply_death(),
            name_notice_delay: default_name_notice_delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_skip_invalid() {
        let out = delays(&[1.0, -2.0, f64::NAN, 0.5]);
        assert_eq!(out, vec![Duration::from_secs(1), Duration::from_millis(500)]);
    }
}
