//! JSON-lines host event replay.
//!
//! Each input line is one host event, e.g.
//! `{"event":"chat","slot":1,"message":"hello","team":false}`. The
//! [`Replay`] drives a [`GuardService`] against a [`SessionHost`] and hands
//! back the tasks the caller must fire later.

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::host::SessionHost;
use crate::services::{GuardService, HostEffect, ScheduledTask};
use crate::subject::{SlotId, Subject, SubjectDirectory};

/// One host event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    Connect {
        slot: u32,
        name: String,
        #[serde(default)]
        user_id: Option<u32>,
        #[serde(default)]
        steam_id: Option<u64>,
        #[serde(default)]
        is_bot: bool,
        #[serde(default)]
        permissions: Vec<String>,
    },
    Disconnect {
        slot: u32,
    },
    Chat {
        slot: u32,
        message: String,
        #[serde(default)]
        team: bool,
    },
    /// Host-side name change.
    Rename {
        slot: u32,
        name: String,
    },
    RoundStart,
    RoundEnd,
    Spawn {
        slot: u32,
    },
    Death {
        slot: u32,
    },
    /// Reload the config file (or `path` when given).
    Reload {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// Stop reading input for `ms` while timers keep firing.
    Wait {
        ms: u64,
    },
}

impl ReplayEvent {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

pub type Scheduled = Vec<(Duration, ScheduledTask)>;

/// Guard plus host, stepped one event at a time.
pub struct Replay {
    guard: GuardService,
    host: SessionHost,
    config_path: Option<PathBuf>,
}

impl Replay {
    pub fn new(guard: GuardService, host: SessionHost) -> Self {
        Self {
            guard,
            host,
            config_path: None,
        }
    }

    /// Default path for `reload` events.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn guard(&self) -> &GuardService {
        &self.guard
    }

    pub fn host(&self) -> &SessionHost {
        &self.host
    }

    pub fn handle(&mut self, event: ReplayEvent) -> Scheduled {
        let effects = match event {
            ReplayEvent::Connect {
                slot,
                name,
                user_id,
                steam_id,
                is_bot,
                permissions,
            } => {
                let subject = Subject {
                    slot: SlotId(slot),
                    user_id,
                    steam_id,
                    name,
                    is_bot,
                    permissions,
                };
                self.host.connect(subject.clone());
                self.guard.on_connect_full(&subject)
            }
            ReplayEvent::Disconnect { slot } => {
                self.guard.on_disconnect(SlotId(slot));
                self.host.disconnect(SlotId(slot));
                Vec::new()
            }
            ReplayEvent::Chat {
                slot,
                message,
                team,
            } => match self.host.subject(SlotId(slot)) {
                Some(subject) => {
                    let decision = self.guard.on_chat(&subject, &message, team);
                    debug!(slot, outcome = ?decision.outcome, "Chat decision");
                    decision.effects
                }
                None => {
                    warn!(slot, "Chat from unknown slot");
                    Vec::new()
                }
            },
            ReplayEvent::Rename { slot, name } => {
                self.host.set_name(SlotId(slot), name);
                Vec::new()
            }
            ReplayEvent::RoundStart => self.guard.on_round_start(),
            ReplayEvent::RoundEnd => self.guard.on_round_end(),
            ReplayEvent::Spawn { slot } => self.with_subject(slot, GuardService::on_spawn),
            ReplayEvent::Death { slot } => self.with_subject(slot, GuardService::on_death),
            ReplayEvent::Reload { path } => self.reload(path),
            ReplayEvent::Wait { .. } => Vec::new(),
        };
        self.settle(effects)
    }

    /// Fire a due task.
    pub fn fire(&mut self, task: ScheduledTask) -> Scheduled {
        let effects = self.guard.fire(task, &self.host);
        self.settle(effects)
    }

    pub fn shutdown(&mut self) {
        self.guard.shutdown();
    }

    fn with_subject(
        &mut self,
        slot: u32,
        trigger: fn(&mut GuardService, &Subject) -> Vec<HostEffect>,
    ) -> Vec<HostEffect> {
        match self.host.subject(SlotId(slot)) {
            Some(subject) => trigger(&mut self.guard, &subject),
            None => Vec::new(),
        }
    }

    fn reload(&mut self, path: Option<PathBuf>) -> Vec<HostEffect> {
        let Some(path) = path.or_else(|| self.config_path.clone()) else {
            warn!("Reload requested without a config path");
            return Vec::new();
        };
        match Config::load(&path) {
            Ok(config) => self.guard.reload(Arc::new(config), &self.host),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Reload failed; keeping previous configuration");
                Vec::new()
            }
        }
    }

    /// Apply effects and run one host tick.
    fn settle(&mut self, effects: Vec<HostEffect>) -> Scheduled {
        let scheduled = self.host.apply(effects);
        for (slot, reason) in self.host.next_tick() {
            self.guard.rename_rejected(slot, &reason);
        }
        scheduled
    }
}
