//! spamguard - chat and display-name content guard for game servers.
//!
//! Classifies untrusted chat messages and display names, sanctions chat
//! violations with per-channel cooldowns, and keeps replacement names in
//! place against offenders whose names the host keeps resetting.

pub mod config;
pub mod error;
pub mod filter;
pub mod host;
pub mod http;
pub mod metrics;
pub mod notify;
pub mod replay;
pub mod services;
pub mod subject;

pub use config::Config;
pub use filter::{FilterResult, TextClassifier, ViolationType};
pub use services::{ChatDecision, ChatOutcome, GuardService, HostEffect, ScheduledTask};
pub use subject::{SlotId, Subject, SubjectDirectory};
