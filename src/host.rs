//! In-memory session host.
//!
//! Stands in for the game server: it owns the subjects, applies the guard's
//! effects, and commits renames on its next tick. It counts slot epochs the
//! same way the guard does (one step per disconnect), so a rename bound to a
//! departed session is never committed to the slot's next occupant. The replay binary and the
//! integration tests both drive the guard through it.

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::notify::ViolationRecord;
use crate::services::{HostEffect, ScheduledTask};
use crate::subject::{Epoch, SessionEpochs, SlotId, Subject, SubjectDirectory};

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRename {
    slot: SlotId,
    epoch: Epoch,
    new_name: String,
}

/// Subjects plus everything the guard asked the host to do.
#[derive(Debug, Default)]
pub struct SessionHost {
    subjects: BTreeMap<SlotId, Subject>,
    epochs: SessionEpochs,
    pending: Vec<PendingRename>,
    refuse_renames: bool,
    commands: Vec<String>,
    notices: Vec<(SlotId, String)>,
    records: Vec<ViolationRecord>,
    renames_applied: usize,
}

impl SessionHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, subject: Subject) {
        debug!(slot = %subject.slot, name = %subject.name, "Subject connected");
        self.subjects.insert(subject.slot, subject);
    }

    pub fn disconnect(&mut self, slot: SlotId) -> Option<Subject> {
        self.pending.retain(|p| p.slot != slot);
        self.epochs.end_session(slot);
        self.subjects.remove(&slot)
    }

    /// Host-side name change (player edit or engine reset).
    pub fn set_name(&mut self, slot: SlotId, name: impl Into<String>) {
        if let Some(subject) = self.subjects.get_mut(&slot) {
            subject.name = name.into();
        }
    }

    /// Make the next ticks refuse every rename.
    pub fn refuse_renames(&mut self, refuse: bool) {
        self.refuse_renames = refuse;
    }

    /// Apply effects; returns the tasks to schedule.
    pub fn apply(&mut self, effects: Vec<HostEffect>) -> Vec<(Duration, ScheduledTask)> {
        let mut scheduled = Vec::new();
        for effect in effects {
            match effect {
                HostEffect::CommitRename {
                    slot,
                    epoch,
                    new_name,
                } => self.pending.push(PendingRename {
                    slot,
                    epoch,
                    new_name,
                }),
                HostEffect::ExecuteCommand { command } => {
                    info!(command = %command, "Executing server command");
                    self.commands.push(command);
                }
                HostEffect::NotifyPlayer { slot, message } => {
                    if self.subjects.contains_key(&slot) {
                        self.notices.push((slot, message));
                    }
                }
                HostEffect::NotifyAdmins { permission, message } => {
                    let admins: Vec<SlotId> = self
                        .subjects
                        .values()
                        .filter(|s| s.is_valid() && s.has_permission(&permission))
                        .map(|s| s.slot)
                        .collect();
                    for slot in admins {
                        self.notices.push((slot, message.clone()));
                    }
                }
                HostEffect::Schedule { delay, task } => scheduled.push((delay, task)),
                HostEffect::RecordViolation(record) => self.records.push(record),
            }
        }
        scheduled
    }

    /// Commit queued renames.
    ///
    /// Renames for subjects that left or whose slot now holds another session
    /// are dropped. Refused renames are returned as `(slot, reason)`.
    pub fn next_tick(&mut self) -> Vec<(SlotId, String)> {
        let mut rejected = Vec::new();
        for rename in std::mem::take(&mut self.pending) {
            if !self.epochs.is_current(rename.slot, rename.epoch) {
                debug!(slot = %rename.slot, epoch = rename.epoch, "Dropping rename for a departed session");
                continue;
            }
            let Some(subject) = self.subjects.get_mut(&rename.slot) else {
                continue;
            };
            if self.refuse_renames {
                rejected.push((rename.slot, "host refused rename".to_string()));
                continue;
            }
            debug!(slot = %rename.slot, old = %subject.name, new = %rename.new_name, "Rename committed");
            subject.name = rename.new_name;
            self.renames_applied += 1;
        }
        rejected
    }

    pub fn name_of(&self, slot: SlotId) -> Option<&str> {
        self.subjects.get(&slot).map(|s| s.name.as_str())
    }

    pub fn pending_renames(&self) -> usize {
        self.pending.len()
    }

    pub fn renames_applied(&self) -> usize {
        self.renames_applied
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn notices_for(&self, slot: SlotId) -> Vec<&str> {
        self.notices
            .iter()
            .filter(|(s, _)| *s == slot)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn records(&self) -> &[ViolationRecord] {
        &self.records
    }
}

impl SubjectDirectory for SessionHost {
    fn subject(&self, slot: SlotId) -> Option<Subject> {
        self.subjects.get(&slot).cloned()
    }

    fn subjects(&self) -> Vec<Subject> {
        self.subjects.values().cloned().collect()
    }
}
