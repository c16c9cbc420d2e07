//! Text classifier.
//!
//! Runs the word, address and URL stages over untrusted text in a fixed
//! order and reports the first blocking match. Classification is a pure
//! function of the text, the policy snapshot and the subject's bypass status.

use aho_corasick::AhoCorasick;
use regex::{RegexSet, RegexSetBuilder};
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, warn};

use super::address::{
    extract_domain, is_allowed_protocol, is_in_domain_list, is_not_real_url,
    is_valid_domain_format, is_valid_ip_address,
};
use super::names;
use super::patterns::{IP_PORT_REGEX, IP_REGEX, URL_REGEX};
use crate::config::{Config, UrlFilterMode, WordFilterConfig};
use crate::subject::Subject;

/// Category of a blocked match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum ViolationType {
    #[default]
    None,
    BlacklistedWord,
    BlacklistedName,
    BlockedUrl,
    BlockedIp,
}

impl ViolationType {
    /// Static label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BlacklistedWord => "blacklisted_word",
            Self::BlacklistedName => "blacklisted_name",
            Self::BlockedUrl => "blocked_url",
            Self::BlockedIp => "blocked_ip",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a classification. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterResult {
    pub blocked: bool,
    pub reason: String,
    /// The offending word, token or URL.
    pub detected_content: String,
    pub violation_type: ViolationType,
}

impl FilterResult {
    pub fn allowed() -> Self {
        Self::default()
    }

    pub fn blocked(
        violation_type: ViolationType,
        reason: impl Into<String>,
        detected_content: impl Into<String>,
    ) -> Self {
        Self {
            blocked: true,
            reason: reason.into(),
            detected_content: detected_content.into(),
            violation_type,
        }
    }
}

/// Precompiled word blacklist.
///
/// Blank entries are dropped; the remaining entries keep their list order so
/// the lowest matching index is the first configured word that matches.
enum WordMatcher {
    Disabled,
    WholeWord { set: RegexSet, words: Vec<String> },
    Substring { automaton: AhoCorasick, words: Vec<String>, case_sensitive: bool },
}

impl WordMatcher {
    fn build(config: &WordFilterConfig) -> Self {
        if !config.enabled {
            return Self::Disabled;
        }

        let words: Vec<String> = config
            .blacklisted_words
            .iter()
            .filter(|w| !w.trim().is_empty())
            .cloned()
            .collect();
        if words.is_empty() {
            return Self::Disabled;
        }

        if config.whole_word_only {
            let patterns = words
                .iter()
                .map(|w| format!(r"\b{}\b", regex::escape(w)));
            match RegexSetBuilder::new(patterns)
                .case_insensitive(!config.case_sensitive)
                .build()
            {
                Ok(set) => Self::WholeWord { set, words },
                Err(err) => {
                    warn!(error = %err, "Failed to build word blacklist matcher; word stage disabled");
                    Self::Disabled
                }
            }
        } else {
            let case_sensitive = config.case_sensitive;
            let patterns: Vec<String> = if case_sensitive {
                words.clone()
            } else {
                words.iter().map(|w| w.to_lowercase()).collect()
            };
            match AhoCorasick::new(&patterns) {
                Ok(automaton) => Self::Substring {
                    automaton,
                    words,
                    case_sensitive,
                },
                Err(err) => {
                    warn!(error = %err, "Failed to build word blacklist automaton; word stage disabled");
                    Self::Disabled
                }
            }
        }
    }

    /// First configured word (in list order) present in `text`.
    fn first_match(&self, text: &str) -> Option<&str> {
        match self {
            Self::Disabled => None,
            Self::WholeWord { set, words } => set
                .matches(text)
                .iter()
                .next()
                .map(|idx| words[idx].as_str()),
            Self::Substring {
                automaton,
                words,
                case_sensitive,
            } => {
                let lowered;
                let haystack = if *case_sensitive {
                    text
                } else {
                    lowered = text.to_lowercase();
                    lowered.as_str()
                };
                automaton
                    .find_overlapping_iter(haystack)
                    .map(|m| m.pattern().as_usize())
                    .min()
                    .map(|idx| words[idx].as_str())
            }
        }
    }
}

/// Multi-stage content classifier bound to one policy snapshot.
pub struct TextClassifier {
    config: Arc<Config>,
    words: WordMatcher,
}

impl TextClassifier {
    /// Compile the policy. Rebuild on every config reload.
    pub fn new(config: Arc<Config>) -> Self {
        let words = WordMatcher::build(&config.word_filter);
        Self { config, words }
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Bypass requires both the feature switch and the permission.
    pub fn should_bypass(&self, subject: &Subject) -> bool {
        let settings = &self.config.settings;
        if !settings.admin_bypass {
            return false;
        }
        let bypass = subject.has_permission(&settings.admin_bypass_permission);
        debug!(slot = %subject.slot, bypass, "Admin bypass check");
        bypass
    }

    /// Classify chat text.
    pub fn classify(&self, text: &str, subject: &Subject) -> FilterResult {
        if text.trim().is_empty() {
            return FilterResult::allowed();
        }

        if self.should_bypass(subject) {
            debug!(slot = %subject.slot, "Subject bypassed content filter");
            return FilterResult::allowed();
        }

        self.check_content(text)
    }

    /// Classify a display name: name blacklist first, then the content stages.
    pub fn check_player_name(&self, name: &str, subject: &Subject) -> FilterResult {
        if name.trim().is_empty() {
            return FilterResult::allowed();
        }

        if self.should_bypass(subject) {
            debug!(slot = %subject.slot, "Subject bypassed name filter");
            return FilterResult::allowed();
        }

        let rules = &self.config.name_protection.name_blacklist;
        if rules.enabled {
            let result = names::check_name_blacklist(name, rules);
            if result.blocked {
                return result;
            }
        }

        self.check_content(name)
    }

    fn check_content(&self, text: &str) -> FilterResult {
        let result = self.check_words(text);
        if result.blocked {
            return result;
        }

        let result = self.check_addresses(text);
        if result.blocked {
            return result;
        }

        let result = self.check_urls(text);
        if result.blocked {
            return result;
        }

        debug!("Content passed all filter stages");
        FilterResult::allowed()
    }

    fn check_words(&self, text: &str) -> FilterResult {
        match self.words.first_match(text) {
            Some(word) => {
                debug!(word = %word, "Blacklisted word detected");
                FilterResult::blocked(
                    ViolationType::BlacklistedWord,
                    "blacklisted word detected",
                    word,
                )
            }
            None => FilterResult::allowed(),
        }
    }

    fn check_addresses(&self, text: &str) -> FilterResult {
        let ip_filter = &self.config.ip_filter;
        if !ip_filter.enabled {
            return FilterResult::allowed();
        }

        let ip_ports: Vec<(Range<usize>, &str)> = IP_PORT_REGEX
            .find_iter(text)
            .map(|m| (m.range(), m.as_str()))
            .collect();

        for (_, ip_port) in &ip_ports {
            let Some((ip, _port)) = ip_port.split_once(':') else {
                continue;
            };
            if !is_valid_ip_address(ip) {
                continue;
            }
            if !in_whitelist(&ip_filter.whitelist_ip_ports, ip_port) {
                debug!(token = %ip_port, "IP:port not in whitelist");
                return FilterResult::blocked(
                    ViolationType::BlockedIp,
                    "ip:port not in whitelist",
                    *ip_port,
                );
            }
        }

        for m in IP_REGEX.find_iter(text) {
            let span = m.range();
            let covered = ip_ports
                .iter()
                .any(|(r, _)| r.start <= span.start && span.end <= r.end);
            if covered {
                debug!(ip = %m.as_str(), "IP is part of an IP:port token; skipping");
                continue;
            }

            let ip = m.as_str();
            if is_valid_ip_address(ip) && !in_whitelist(&ip_filter.whitelist_ips, ip) {
                debug!(ip = %ip, "IP address not in whitelist");
                return FilterResult::blocked(
                    ViolationType::BlockedIp,
                    "ip address not in whitelist",
                    ip,
                );
            }
        }

        FilterResult::allowed()
    }

    fn check_urls(&self, text: &str) -> FilterResult {
        let url_filter = &self.config.url_filter;
        if !url_filter.enabled {
            return FilterResult::allowed();
        }

        for m in URL_REGEX.find_iter(text) {
            let url = m.as_str();
            if is_not_real_url(url) {
                continue;
            }

            let domain = extract_domain(url);
            if domain.is_empty() || is_valid_ip_address(&domain) || !is_valid_domain_format(&domain)
            {
                debug!(url = %url, "No usable domain; skipping");
                continue;
            }

            if !is_allowed_protocol(url, &url_filter.allowed_protocols) {
                debug!(url = %url, "Protocol not allowed");
                return FilterResult::blocked(ViolationType::BlockedUrl, "protocol not allowed", url);
            }

            match url_filter.filter_mode {
                UrlFilterMode::Whitelist => {
                    if !is_in_domain_list(&domain, &url_filter.whitelist) {
                        debug!(domain = %domain, "Domain not in whitelist");
                        return FilterResult::blocked(
                            ViolationType::BlockedUrl,
                            "domain not in whitelist",
                            url,
                        );
                    }
                }
                UrlFilterMode::Blacklist => {
                    if is_in_domain_list(&domain, &url_filter.blacklist) {
                        debug!(domain = %domain, "Domain in blacklist");
                        return FilterResult::blocked(
                            ViolationType::BlockedUrl,
                            "domain in blacklist",
                            url,
                        );
                    }
                }
            }
        }

        FilterResult::allowed()
    }
}

fn in_whitelist(entries: &[String], token: &str) -> bool {
    let token = token.trim();
    entries.iter().any(|e| e.trim().eq_ignore_ascii_case(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::SlotId;

    fn player() -> Subject {
        Subject::new(SlotId(1), "player").with_user_id(42)
    }

    fn classifier_with(edit: impl FnOnce(&mut Config)) -> TextClassifier {
        let mut config = Config::default();
        edit(&mut config);
        TextClassifier::new(Arc::new(config))
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_clean_message() {
        let classifier = classifier_with(|_| {});
        let result = classifier.classify("gg everyone, nice round", &player());
        assert!(!result.blocked);
        assert_eq!(result.violation_type, ViolationType::None);
    }

    #[test]
    fn test_blank_text_allowed() {
        let classifier = classifier_with(|_| {});
        assert!(!classifier.classify("   ", &player()).blocked);
        assert!(!classifier.check_player_name("", &player()).blocked);
    }

    #[test]
    fn test_whole_word_mode() {
        let whole = classifier_with(|c| c.word_filter.blacklisted_words = words(&["spam"]));
        assert!(!whole.classify("spammer", &player()).blocked);
        assert!(whole.classify("no spam please", &player()).blocked);

        let partial = classifier_with(|c| {
            c.word_filter.blacklisted_words = words(&["spam"]);
            c.word_filter.whole_word_only = false;
        });
        let result = partial.classify("spammer", &player());
        assert!(result.blocked);
        assert_eq!(result.detected_content, "spam");
        assert_eq!(result.violation_type, ViolationType::BlacklistedWord);
    }

    #[test]
    fn test_word_case_sensitivity() {
        let insensitive = classifier_with(|c| c.word_filter.blacklisted_words = words(&["cheat"]));
        assert!(insensitive.classify("who is CHEATING? CHEAT!", &player()).blocked);

        let sensitive = classifier_with(|c| {
            c.word_filter.blacklisted_words = words(&["cheat"]);
            c.word_filter.case_sensitive = true;
        });
        assert!(!sensitive.classify("CHEAT", &player()).blocked);
        assert!(sensitive.classify("cheat", &player()).blocked);
    }

    #[test]
    fn test_first_word_in_list_order_wins() {
        for whole_word in [true, false] {
            let classifier = classifier_with(|c| {
                c.word_filter.blacklisted_words = words(&["", "zeta", "alpha"]);
                c.word_filter.whole_word_only = whole_word;
            });
            let result = classifier.classify("alpha then zeta", &player());
            assert_eq!(result.detected_content, "zeta");
        }
    }

    #[test]
    fn test_word_with_regex_metacharacters() {
        let classifier = classifier_with(|c| {
            c.word_filter.blacklisted_words = words(&["c++"]);
            c.word_filter.whole_word_only = false;
        });
        assert!(classifier.classify("I love C++", &player()).blocked);
        assert!(!classifier.classify("I love C", &player()).blocked);
    }

    #[test]
    fn test_ip_port_evaluated_as_own_token() {
        let classifier = classifier_with(|c| {
            c.ip_filter.whitelist_ips = words(&["192.168.1.1"]);
            c.ip_filter.whitelist_ip_ports = Vec::new();
        });
        let result = classifier.classify("connect to 192.168.1.1:27015 now", &player());
        assert!(result.blocked);
        assert_eq!(result.detected_content, "192.168.1.1:27015");
        assert_eq!(result.reason, "ip:port not in whitelist");
    }

    #[test]
    fn test_whitelisted_ip_port_allowed() {
        let classifier = classifier_with(|c| {
            c.ip_filter.whitelist_ip_ports = words(&[" 127.0.0.1:27015 "]);
            c.ip_filter.whitelist_ips = Vec::new();
        });
        // The bare IP inside the whitelisted token is not reported separately.
        assert!(!classifier.classify("play on 127.0.0.1:27015", &player()).blocked);
    }

    #[test]
    fn test_bare_ip_blocked_unless_whitelisted() {
        let classifier = classifier_with(|c| c.ip_filter.whitelist_ips = words(&["8.8.8.8"]));
        assert!(!classifier.classify("dns 8.8.8.8", &player()).blocked);

        let result = classifier.classify("dns 8.8.8.8 or 1.1.1.1", &player());
        assert!(result.blocked);
        assert_eq!(result.detected_content, "1.1.1.1");
        assert_eq!(result.violation_type, ViolationType::BlockedIp);
    }

    #[test]
    fn test_ip_port_checked_before_bare_ip() {
        let classifier = classifier_with(|c| {
            c.ip_filter.whitelist_ips = Vec::new();
            c.ip_filter.whitelist_ip_ports = Vec::new();
        });
        let result = classifier.classify("1.1.1.1 and 2.2.2.2:80", &player());
        assert_eq!(result.detected_content, "2.2.2.2:80");
    }

    #[test]
    fn test_padded_ip_ignored() {
        let classifier = classifier_with(|c| c.ip_filter.whitelist_ips = Vec::new());
        assert!(!classifier.classify("192.168.01.1", &player()).blocked);
    }

    #[test]
    fn test_url_blacklist_mode() {
        let classifier = classifier_with(|_| {});
        let result = classifier.classify("watch me at https://www.kick.com/streamer", &player());
        assert!(result.blocked);
        assert_eq!(result.reason, "domain in blacklist");
        assert_eq!(result.detected_content, "https://www.kick.com/streamer");

        assert!(classifier.classify("clips.twitch.tv/abc", &player()).blocked);
        assert!(!classifier.classify("notkick.com", &player()).blocked);
        assert!(!classifier.classify("github.com/rust-lang", &player()).blocked);
    }

    #[test]
    fn test_url_whitelist_mode() {
        let classifier = classifier_with(|c| c.url_filter.filter_mode = UrlFilterMode::Whitelist);
        assert!(!classifier.classify("steamcommunity.com/id/foo", &player()).blocked);
        let result = classifier.classify("go to evil.example.org", &player());
        assert!(result.blocked);
        assert_eq!(result.reason, "domain not in whitelist");
    }

    #[test]
    fn test_disallowed_protocol() {
        let classifier = classifier_with(|_| {});
        let result = classifier.classify("ftp://files.example.com/x", &player());
        assert!(result.blocked);
        assert_eq!(result.reason, "protocol not allowed");
    }

    #[test]
    fn test_version_numbers_not_urls() {
        let classifier = classifier_with(|c| c.url_filter.filter_mode = UrlFilterMode::Whitelist);
        assert!(!classifier.classify("patch 1.5 is out, v2.10.3 next", &player()).blocked);
    }

    #[test]
    fn test_stages_toggle_independently() {
        let classifier = classifier_with(|c| {
            c.word_filter.enabled = false;
            c.ip_filter.enabled = false;
            c.url_filter.enabled = false;
        });
        assert!(!classifier.classify("spam 1.2.3.4 kick.com", &player()).blocked);
    }

    #[test]
    fn test_word_stage_runs_first() {
        let classifier = classifier_with(|_| {});
        let result = classifier.classify("spam at 1.2.3.4 and kick.com", &player());
        assert_eq!(result.violation_type, ViolationType::BlacklistedWord);
    }

    #[test]
    fn test_bypass_requires_switch_and_permission() {
        let admin = player().with_permission("@css/root");

        let off = classifier_with(|_| {});
        assert!(off.classify("spam", &admin).blocked);

        let on = classifier_with(|c| c.settings.admin_bypass = true);
        assert!(!on.classify("spam", &admin).blocked);
        assert!(on.classify("spam", &player()).blocked);
    }

    #[test]
    fn test_name_falls_through_to_content() {
        let classifier = classifier_with(|_| {});
        let result = classifier.check_player_name("kick.com/streamer", &player());
        assert_eq!(result.violation_type, ViolationType::BlockedUrl);
    }

    #[test]
    fn test_classify_is_deterministic_and_total() {
        let classifier = classifier_with(|c| c.word_filter.whole_word_only = false);
        let inputs = [
            "http://",
            "://",
            "....",
            "1.2.3.4:99999",
            "\u{202e}moc.kcik",
            "ａｄｍｉｎ.com",
            "a.b.c.d.e.f.g.h",
            "[::1]:80",
            "https://%zz.com",
        ];
        for input in inputs {
            let first = classifier.classify(input, &player());
            let second = classifier.classify(input, &player());
            assert_eq!(first, second, "non-deterministic result for {input:?}");
        }
    }
}
