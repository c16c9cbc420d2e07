//! Address validation helpers.
//!
//! Pure functions used by the address and URL stages. Malformed input is
//! never an error: it is simply "not an address" / "no domain".

use url::Url;

/// Strict dotted-quad IPv4 check.
///
/// Unlike `std::net::Ipv4Addr`'s parser this rejects zero-padded octets
/// (`192.168.01.1`) so padded obfuscation is not silently normalized.
pub fn is_valid_ip_address(ip: &str) -> bool {
    if ip.trim().is_empty() {
        return false;
    }

    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() != 4 {
        return false;
    }

    parts.iter().all(|part| {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if part.len() > 1 && part.starts_with('0') {
            return false;
        }
        part.parse::<u8>().is_ok()
    })
}

/// Check that a host looks like a registrable domain name.
pub fn is_valid_domain_format(domain: &str) -> bool {
    if domain.trim().is_empty() || !domain.contains('.') {
        return false;
    }

    if !domain.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    if domain.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }

    match domain.rsplit('.').next() {
        Some(tld) => tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()),
        None => false,
    }
}

/// Low-confidence candidates that should never be treated as URLs:
/// version numbers, partial IPs, very short tokens and letter-free strings.
pub fn is_not_real_url(candidate: &str) -> bool {
    if candidate.trim().is_empty() {
        return true;
    }

    if is_dotted_digits(candidate, 2) || is_dotted_digits(candidate, 3) {
        return true;
    }

    if candidate.chars().count() < 4 {
        return true;
    }

    !candidate.chars().any(|c| c.is_ascii_alphabetic())
}

/// `digits(.digits){groups-1}` with nothing else.
fn is_dotted_digits(s: &str, groups: usize) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == groups
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Does the candidate carry an explicit `scheme://` prefix?
fn has_scheme(url: &str) -> bool {
    match url.find("://") {
        Some(idx) if idx > 0 => {
            let scheme = &url[..idx];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Extract the lower-cased host of a URL-shaped candidate.
///
/// Returns an empty string when the candidate is not a real URL, cannot be
/// parsed, has an IP host, or the host fails [`is_valid_domain_format`].
pub fn extract_domain(url: &str) -> String {
    if is_not_real_url(url) {
        return String::new();
    }

    let parsed = if has_scheme(url) {
        Url::parse(url)
    } else {
        Url::parse(&format!("http://{url}"))
    };

    let Ok(parsed) = parsed else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    let domain = host.to_ascii_lowercase();
    if is_valid_ip_address(&domain) || !is_valid_domain_format(&domain) {
        return String::new();
    }
    domain
}

/// Scheme gate. Bare domains (no `://`) are never protocol-gated.
pub fn is_allowed_protocol(url: &str, allowed_protocols: &[String]) -> bool {
    let allowed = allowed_protocols.iter().any(|protocol| {
        let prefix = format!("{protocol}://");
        url.len() >= prefix.len()
            && url.is_char_boundary(prefix.len())
            && url[..prefix.len()].eq_ignore_ascii_case(&prefix)
    });

    allowed || !url.contains("://")
}

/// Exact or subdomain match against a domain list.
///
/// `sub.example.com` matches `example.com`; `notexample.com` does not.
/// List entries are lower-cased and a leading `www.` is ignored.
pub fn is_in_domain_list(domain: &str, list: &[String]) -> bool {
    let domain = domain.to_ascii_lowercase();
    list.iter().any(|entry| {
        let entry = entry.trim();
        if entry.is_empty() {
            return false;
        }
        let entry = entry.to_ascii_lowercase();
        let entry = entry.strip_prefix("www.").unwrap_or(&entry);
        domain == entry || domain.ends_with(&format!(".{entry}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_ip_addresses() {
        assert!(is_valid_ip_address("192.168.1.1"));
        assert!(is_valid_ip_address("0.0.0.0"));
        assert!(is_valid_ip_address("255.255.255.255"));
    }

    #[test]
    fn test_invalid_ip_addresses() {
        assert!(!is_valid_ip_address(""));
        assert!(!is_valid_ip_address("192.168.01.1"));
        assert!(!is_valid_ip_address("256.1.1.1"));
        assert!(!is_valid_ip_address("1.2.3"));
        assert!(!is_valid_ip_address("1.2.3.4.5"));
        assert!(!is_valid_ip_address("1.2.3.+4"));
        assert!(!is_valid_ip_address("a.b.c.d"));
        assert!(!is_valid_ip_address("1..2.3"));
    }

    #[test]
    fn test_domain_format() {
        assert!(is_valid_domain_format("example.com"));
        assert!(is_valid_domain_format("sub.example.co"));
        assert!(!is_valid_domain_format("localhost"));
        assert!(!is_valid_domain_format("1.2.3.4"));
        assert!(!is_valid_domain_format("example.c"));
        assert!(!is_valid_domain_format("example.c0m"));
        assert!(!is_valid_domain_format("   "));
    }

    #[test]
    fn test_not_real_url() {
        assert!(is_not_real_url("1.5"));
        assert!(is_not_real_url("1.5.10"));
        assert!(is_not_real_url("a.b"));
        assert!(is_not_real_url("123.456.789.0"));
        assert!(is_not_real_url(""));
        assert!(!is_not_real_url("example.com"));
        assert!(!is_not_real_url("v1.5.com"));
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("example.com"), "example.com");
        assert_eq!(extract_domain("https://Sub.Example.COM/path?q=1"), "sub.example.com");
        assert_eq!(extract_domain("steam://connect.example.net/join"), "connect.example.net");
        assert_eq!(extract_domain("www.kick.com/stream"), "www.kick.com");
    }

    #[test]
    fn test_extract_domain_rejects() {
        assert_eq!(extract_domain("1.5"), "");
        assert_eq!(extract_domain("http://192.168.1.1/admin"), "");
        assert_eq!(extract_domain("http://[::1]/"), "");
        assert_eq!(extract_domain("localhost:8080"), "");
        assert_eq!(extract_domain("http://exa mple.com"), "");
    }

    #[test]
    fn test_allowed_protocol() {
        let allowed = list(&["http", "https"]);
        assert!(is_allowed_protocol("HTTPS://example.com", &allowed));
        assert!(is_allowed_protocol("example.com", &allowed));
        assert!(!is_allowed_protocol("ftp://example.com", &allowed));
        assert!(is_allowed_protocol("example.com", &[]));
    }

    #[test]
    fn test_domain_list_suffix_match() {
        let blocked = list(&["kick.com"]);
        assert!(is_in_domain_list("chat.kick.com", &blocked));
        assert!(is_in_domain_list("kick.com", &blocked));
        assert!(!is_in_domain_list("notkick.com", &blocked));
    }

    #[test]
    fn test_domain_list_strips_www_and_case() {
        let entries = list(&["WWW.Twitch.TV", "", "  "]);
        assert!(is_in_domain_list("twitch.tv", &entries));
        assert!(is_in_domain_list("clips.twitch.tv", &entries));
        assert!(!is_in_domain_list("example.com", &entries));
    }
}
