//! Host string parsing.

/// Components of a `[user@]host[:port]` host string.
///
/// The port is kept as written; numeric conversion happens when
/// [`crate::ssh::types::ConnectionParams`] is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSpec {
    pub host: String,
    pub user: Option<String>,
    pub port: Option<String>,
}

impl HostSpec {
    /// Parse a host string of the form `[user@]host[:port]`.
    ///
    /// A user is taken only when exactly one `@` is present; otherwise the text
    /// before the first `@` is the host part. That part is split on `:` and the
    /// port is taken only when exactly one `:` is present, so bracketless IPv6
    /// literals do not produce a bogus port. Never fails.
    pub fn parse(input: &str) -> Self {
        let mut at_parts = input.split('@');
        let first = at_parts.next().unwrap_or_default();
        let (user, rest) = match (at_parts.next(), at_parts.next()) {
            (Some(rest), None) => (Some(first.to_string()), rest),
            _ => (None, first),
        };

        let mut parts = rest.split(':');
        let host = parts.next().unwrap_or_default().to_string();
        let port = match (parts.next(), parts.next()) {
            (Some(port), None) => Some(port.to_string()),
            _ => None,
        };

        Self { host, user, port }
    }
}
