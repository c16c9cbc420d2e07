//! Content filtering.
//!
//! - [`address`]: IP, domain and URL validation helpers
//! - [`patterns`]: Compiled candidate regexes
//! - [`classifier`]: Staged chat and name classifier
//! - [`names`]: Display-name blacklist stage

pub mod address;
mod classifier;
mod names;
pub mod patterns;

pub use classifier::{FilterResult, TextClassifier, ViolationType};
pub use names::check_name_blacklist;
