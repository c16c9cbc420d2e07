//! Compiled candidate patterns for the address and URL stages.

use regex::Regex;
use std::sync::LazyLock;

/// One IPv4 octet, 0-255, no zero padding.
const OCTET: &str = r"(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])";

/// Bare dotted-quad address.
pub static IP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{OCTET}\.){{3}}{OCTET}\b")).expect("static IP regex is valid")
});

/// Dotted-quad address followed by a port.
pub static IP_PORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:{OCTET}\.){{3}}{OCTET}:(?:[1-9][0-9]{{0,4}}|[1-5][0-9]{{4}}|6[0-4][0-9]{{3}}|65[0-4][0-9]{{2}}|655[0-2][0-9]|6553[0-5])\b"
    ))
    .expect("static IP:port regex is valid")
});

/// URL-shaped substrings: optional scheme, dotted labels, alphabetic TLD, optional path.
pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:(?:https?|ftp|steam)://)?(?:www\.)?(?:[a-z0-9](?:[a-z0-9\-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b[-a-z0-9()@:%_+.~#?&=/]*",
    )
    .expect("static URL regex is valid")
});
