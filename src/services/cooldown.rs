//! Per-subject, per-channel violation cooldowns.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::subject::SlotId;

/// Where a violation happened. Channels never suppress each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationChannel {
    Chat,
    TeamChat,
    Name,
}

impl ViolationChannel {
    pub fn for_chat(team: bool) -> Self {
        if team { Self::TeamChat } else { Self::Chat }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::TeamChat => "team_chat",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for ViolationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last-sanction timestamps keyed by `(slot, channel)`.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    entries: HashMap<(SlotId, ViolationChannel), Instant>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the subject is still inside `window` for `channel`.
    ///
    /// Outside the window the entry is refreshed to `now`, so only the first
    /// violation of each window counts. Expired entries are pruned first.
    pub fn check_at(
        &mut self,
        slot: SlotId,
        channel: ViolationChannel,
        now: Instant,
        window: Duration,
    ) -> bool {
        self.entries
            .retain(|_, last| now.saturating_duration_since(*last) < window);

        if self.entries.contains_key(&(slot, channel)) {
            return true;
        }

        if !window.is_zero() {
            self.entries.insert((slot, channel), now);
        }
        false
    }

    /// Forget every channel for a slot.
    pub fn purge(&mut self, slot: SlotId) {
        self.entries.retain(|(s, _), _| *s != slot);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
