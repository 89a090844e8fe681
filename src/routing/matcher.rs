//! Route matching logic.
//!
//! # Responsibilities
//! - Match the Host header against virtual host domains (case-insensitive)
//! - Match path prefix (case-sensitive) and expose the remaining suffix
//!
//! # Design Decisions
//! - Host matching is case-insensitive (per HTTP spec); the port is ignored
//! - Path matching is case-sensitive
//! - `*` matches any host; `*.suffix` and `prefix.*` are single-sided wildcards
//! - No regex to guarantee O(n) matching

/// Matches a request host against one virtual host domain.
#[derive(Debug, Clone)]
pub struct DomainMatcher {
    pattern: String,
}

impl DomainMatcher {
    /// Create a new domain matcher.
    /// The pattern is normalized to lowercase for case-insensitive matching.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        let host = strip_port(host).to_lowercase();
        let pattern = self.pattern.as_str();

        if pattern == "*" {
            return true;
        }
        if let Some(suffix) = pattern.strip_prefix('*') {
            return host.len() > suffix.len() && host.ends_with(suffix);
        }
        if let Some(prefix) = pattern.strip_suffix('*') {
            return host.len() > prefix.len() && host.starts_with(prefix);
        }
        strip_port(pattern) == host
    }
}

/// Drop a trailing `:port` from a host, leaving bracketed IPv6 literals intact.
pub fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher<'a> {
    prefix: &'a str,
}

impl<'a> PathPrefixMatcher<'a> {
    /// Create a new path prefix matcher.
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    /// Returns the part of `path` after the prefix, or `None` if it doesn't match.
    pub fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_prefix(self.prefix)
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(self.prefix)
    }
}
