//! Display-name blacklist stage.

use tracing::debug;

use super::classifier::{FilterResult, ViolationType};
use crate::config::NameBlacklistConfig;

/// Check a display name against length bounds and reserved-name rules.
///
/// Length is counted in characters of the raw name; rules see the trimmed name.
pub fn check_name_blacklist(name: &str, rules: &NameBlacklistConfig) -> FilterResult {
    let length = name.chars().count();
    if length < rules.min_name_length {
        debug!(length, min = rules.min_name_length, "Name too short");
        return FilterResult::blocked(ViolationType::BlacklistedName, "name too short", name);
    }
    if length > rules.max_name_length {
        debug!(length, max = rules.max_name_length, "Name too long");
        return FilterResult::blocked(ViolationType::BlacklistedName, "name too long", name);
    }

    let trimmed = name.trim();
    let candidate = fold(trimmed, rules.case_sensitive);

    for entry in &rules.blacklisted_names {
        let entry_trimmed = entry.trim();
        if entry_trimmed.is_empty() {
            continue;
        }
        let needle = fold(entry_trimmed, rules.case_sensitive);

        if matches_rule(&candidate, &needle, rules) {
            debug!(entry = %entry_trimmed, "Blacklisted name detected");
            return FilterResult::blocked(
                ViolationType::BlacklistedName,
                "blacklisted name detected",
                entry_trimmed,
            );
        }
    }

    FilterResult::allowed()
}

fn fold(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        s.to_string()
    } else {
        s.to_lowercase()
    }
}

fn matches_rule(name: &str, entry: &str, rules: &NameBlacklistConfig) -> bool {
    if rules.whole_name_only || !rules.block_partial_matches {
        return name == entry;
    }

    if !name.contains(entry) {
        return false;
    }

    !(rules.allow_numbers_suffix && is_numeric_suffix_of(name, entry))
}

/// `name` is `entry` followed by one or more digits.
fn is_numeric_suffix_of(name: &str, entry: &str) -> bool {
    name != entry && name.trim_end_matches(|c: char| c.is_ascii_digit()) == entry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> NameBlacklistConfig {
        NameBlacklistConfig {
            blacklisted_names: vec!["admin".to_string(), "owner".to_string()],
            ..NameBlacklistConfig::default()
        }
    }

    #[test]
    fn test_length_boundary() {
        let rules = NameBlacklistConfig {
            min_name_length: 3,
            max_name_length: 5,
            ..rules()
        };
        assert!(!check_name_blacklist("abc", &rules).blocked);
        assert!(!check_name_blacklist("abcde", &rules).blocked);

        let short = check_name_blacklist("ab", &rules);
        assert!(short.blocked);
        assert_eq!(short.reason, "name too short");

        let long = check_name_blacklist("abcdef", &rules);
        assert_eq!(long.reason, "name too long");
    }

    #[test]
    fn test_length_counts_characters() {
        let rules = NameBlacklistConfig {
            min_name_length: 2,
            max_name_length: 3,
            ..rules()
        };
        assert!(!check_name_blacklist("äöü", &rules).blocked);
    }

    #[test]
    fn test_length_checked_before_rules() {
        let rules = NameBlacklistConfig {
            max_name_length: 4,
            ..rules()
        };
        assert_eq!(check_name_blacklist("admin", &rules).reason, "name too long");
    }

    #[test]
    fn test_exact_match_default() {
        let rules = rules();
        assert!(check_name_blacklist("Admin", &rules).blocked);
        assert!(check_name_blacklist("  admin ", &rules).blocked);
        assert!(!check_name_blacklist("admin2", &rules).blocked);
    }

    #[test]
    fn test_case_sensitive() {
        let rules = NameBlacklistConfig {
            case_sensitive: true,
            ..rules()
        };
        assert!(!check_name_blacklist("Admin", &rules).blocked);
        assert!(check_name_blacklist("admin", &rules).blocked);
    }

    #[test]
    fn test_partial_matches() {
        let rules = NameBlacklistConfig {
            block_partial_matches: true,
            ..rules()
        };
        let result = check_name_blacklist("xXAdminXx", &rules);
        assert!(result.blocked);
        assert_eq!(result.detected_content, "admin");
        assert!(check_name_blacklist("admin123", &rules).blocked);
    }

    #[test]
    fn test_whole_name_overrides_partial() {
        let rules = NameBlacklistConfig {
            whole_name_only: true,
            block_partial_matches: true,
            ..rules()
        };
        assert!(!check_name_blacklist("xadmin", &rules).blocked);
        assert!(check_name_blacklist("admin", &rules).blocked);
    }

    #[test]
    fn test_numeric_suffix_exemption() {
        let rules = NameBlacklistConfig {
            block_partial_matches: true,
            allow_numbers_suffix: true,
            ..rules()
        };
        assert!(!check_name_blacklist("admin123", &rules).blocked);
        assert!(check_name_blacklist("xadmin", &rules).blocked);
        assert!(check_name_blacklist("xadmin1", &rules).blocked);
        assert!(check_name_blacklist("admin", &rules).blocked);
    }

    #[test]
    fn test_first_entry_wins() {
        let rules = NameBlacklistConfig {
            block_partial_matches: true,
            ..rules()
        };
        let result = check_name_blacklist("owner_admin", &rules);
        assert_eq!(result.detected_content, "admin");
    }
}
