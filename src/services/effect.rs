//! Effects emitted by the guard.
//!
//! The guard never touches the host directly. Every operation returns a list
//! of effects; the host adapter applies them (renames on its next tick,
//! commands through its console, scheduled tasks through its timers).

use std::time::Duration;

use crate::config::FilterAction;
use crate::notify::ViolationRecord;
use crate::subject::{Epoch, SlotId};

/// Side effect for the host to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEffect {
    /// Second phase of a forced rename. Dropped by the host once the slot's
    /// epoch has moved on.
    CommitRename {
        slot: SlotId,
        epoch: Epoch,
        new_name: String,
    },

    /// Run a server console command (kick/ban/custom sanction).
    ExecuteCommand { command: String },

    /// Chat notice to a single subject.
    NotifyPlayer { slot: SlotId, message: String },

    /// Chat notice to every subject holding `permission`.
    NotifyAdmins { permission: String, message: String },

    /// Fire `task` back into the guard after `delay`.
    Schedule { delay: Duration, task: ScheduledTask },

    /// A violation was recorded; also handed to the notifier queue.
    RecordViolation(ViolationRecord),
}

/// Deferred work. Tasks carrying a slot re-resolve the subject before acting
/// and do nothing when the slot is empty or its epoch no longer matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Check a new subject's display name.
    CheckName { slot: SlotId, epoch: Epoch },

    /// Re-apply every enforced replacement name.
    Reapply,

    /// Run the command for a chat sanction.
    Sanction {
        slot: SlotId,
        epoch: Epoch,
        action: FilterAction,
    },

    /// Deliver a delayed notice.
    NotifyPlayer {
        slot: SlotId,
        epoch: Epoch,
        message: String,
    },
}

impl ScheduledTask {
    /// Static label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CheckName { .. } => "check_name",
            Self::Reapply => "reapply",
            Self::Sanction { .. } => "sanction",
            Self::NotifyPlayer { .. } => "notify_player",
        }
    }
}

/// Schedule `Reapply` once per delay.
pub fn reapply_passes(delays: &[Duration]) -> Vec<HostEffect> {
    delays
        .iter()
        .map(|&delay| HostEffect::Schedule {
            delay,
            task: ScheduledTask::Reapply,
        })
        .collect()
}
