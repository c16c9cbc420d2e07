//! Integration test common infrastructure.
//!
//! Drives a `GuardService` against an in-memory `SessionHost`, firing
//! scheduled tasks on demand instead of on real timers.

#![allow(dead_code)]

use spamguard::config::Config;
use spamguard::host::SessionHost;
use spamguard::services::{ChatOutcome, GuardService, HostEffect, ScheduledTask};
use spamguard::subject::{SlotId, Subject, SubjectDirectory};
use std::sync::Arc;
use std::time::Duration;

pub struct Harness {
    pub guard: GuardService,
    pub host: SessionHost,
    pub queue: Vec<(Duration, ScheduledTask)>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_guard(GuardService::new(Arc::new(config)))
    }

    pub fn with_guard(guard: GuardService) -> Self {
        Self {
            guard,
            host: SessionHost::new(),
            queue: Vec::new(),
        }
    }

    /// Apply effects, then run one host tick.
    pub fn apply(&mut self, effects: Vec<HostEffect>) {
        let scheduled = self.host.apply(effects);
        for (slot, reason) in self.host.next_tick() {
            self.guard.rename_rejected(slot, &reason);
        }
        self.queue.extend(scheduled);
    }

    pub fn connect(&mut self, subject: Subject) {
        self.host.connect(subject.clone());
        let effects = self.guard.on_connect_full(&subject);
        self.apply(effects);
    }

    pub fn disconnect(&mut self, slot: u32) {
        self.guard.on_disconnect(SlotId(slot));
        self.host.disconnect(SlotId(slot));
    }

    pub fn chat(&mut self, slot: u32, message: &str, team: bool) -> ChatOutcome {
        let subject = self.subject(slot);
        let decision = self.guard.on_chat(&subject, message, team);
        let outcome = decision.outcome;
        self.apply(decision.effects);
        outcome
    }

    pub fn round_start(&mut self) {
        let effects = self.guard.on_round_start();
        self.apply(effects);
    }

    /// Fire queued tasks in delay order until none remain.
    pub fn run_scheduled(&mut self) {
        for _ in 0..100 {
            if self.queue.is_empty() {
                return;
            }
            let mut due = std::mem::take(&mut self.queue);
            due.sort_by_key(|(delay, _)| *delay);
            for (_, task) in due {
                let effects = self.guard.fire(task, &self.host);
                self.apply(effects);
            }
        }
        panic!("scheduled tasks never settled");
    }

    /// Run one reapply pass right away.
    pub fn reapply_now(&mut self) {
        let effects = self.guard.fire(ScheduledTask::Reapply, &self.host);
        self.apply(effects);
    }

    pub fn subject(&self, slot: u32) -> Subject {
        self.host
            .subject(SlotId(slot))
            .unwrap_or_else(|| panic!("no subject in slot {slot}"))
    }

    pub fn name(&self, slot: u32) -> String {
        self.subject(slot).name
    }
}

pub fn player(slot: u32, user_id: u32, name: &str) -> Subject {
    Subject::new(SlotId(slot), name)
        .with_user_id(user_id)
        .with_steam_id(76561198000000000 + u64::from(user_id))
}
