//! Session participants as seen by the guard.
//!
//! The host owns the real player objects; the guard works on snapshots
//! resolved through [`SubjectDirectory`] at the moment it needs them.

use std::collections::HashMap;
use std::fmt;

/// Permission that implies every other permission.
pub const ROOT_PERMISSION: &str = "@css/root";

/// Transient per-connection slot. Reused by the host across subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A connected participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub slot: SlotId,
    /// Numeric user id for commands and replacement names, when the host assigned one.
    pub user_id: Option<u32>,
    /// Persistent network identity (SteamID64). Absent until authenticated.
    pub steam_id: Option<u64>,
    /// Current display name.
    pub name: String,
    /// Bots and relay/spectator proxies are never filtered or enforced.
    pub is_bot: bool,
    /// Admin flags, e.g. `@css/chat`.
    pub permissions: Vec<String>,
}

impl Subject {
    pub fn new(slot: SlotId, name: impl Into<String>) -> Self {
        Self {
            slot,
            user_id: None,
            steam_id: None,
            name: name.into(),
            is_bot: false,
            permissions: Vec::new(),
        }
    }

    pub fn with_user_id(mut self, user_id: u32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_steam_id(mut self, steam_id: u64) -> Self {
        self.steam_id = Some(steam_id);
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    /// A real, human participant.
    pub fn is_valid(&self) -> bool {
        !self.is_bot
    }

    /// Check an admin flag. `@css/root` grants everything.
    pub fn has_permission(&self, permission: &str) -> bool {
        !permission.is_empty()
            && self
                .permissions
                .iter()
                .any(|p| p == permission || p == ROOT_PERMISSION)
    }

    /// Persistent identity for logs and records.
    pub fn stable_identity(&self) -> String {
        self.steam_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Connection generation of a slot.
pub type Epoch = u64;

/// Per-slot connection counter.
///
/// A slot's epoch advances each time its occupant disconnects. Work captured
/// under one epoch is dropped once the slot has moved on, whether or not the
/// departed subject ever had a user id.
#[derive(Debug, Clone, Default)]
pub struct SessionEpochs {
    epochs: HashMap<SlotId, Epoch>,
}

impl SessionEpochs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Epoch of the slot's current (or next) occupant.
    pub fn current(&self, slot: SlotId) -> Epoch {
        self.epochs.get(&slot).copied().unwrap_or(0)
    }

    /// Close the slot's current session; returns the new epoch.
    pub fn end_session(&mut self, slot: SlotId) -> Epoch {
        let epoch = self.epochs.entry(slot).or_insert(0);
        *epoch += 1;
        *epoch
    }

    pub fn is_current(&self, slot: SlotId, epoch: Epoch) -> bool {
        self.current(slot) == epoch
    }
}

/// Host lookup for live subjects.
pub trait SubjectDirectory {
    /// Resolve the subject currently occupying `slot`.
    fn subject(&self, slot: SlotId) -> Option<Subject>;

    /// All connected subjects.
    fn subjects(&self) -> Vec<Subject>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_implies_all() {
        let admin = Subject::new(SlotId(1), "root").with_permission(ROOT_PERMISSION);
        assert!(admin.has_permission("@css/chat"));

        let chat = Subject::new(SlotId(2), "mod").with_permission("@css/chat");
        assert!(chat.has_permission("@css/chat"));
        assert!(!chat.has_permission("@css/ban"));
        assert!(!chat.has_permission(""));
    }

    #[test]
    fn test_epoch_advances_per_slot() {
        let mut epochs = SessionEpochs::new();
        assert_eq!(epochs.current(SlotId(3)), 0);

        assert_eq!(epochs.end_session(SlotId(3)), 1);
        assert!(epochs.is_current(SlotId(3), 1));
        assert!(!epochs.is_current(SlotId(3), 0));
        assert_eq!(epochs.current(SlotId(4)), 0);
    }
}
