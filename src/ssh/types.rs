//! Caller-facing option and parameter types.
//!
//! [`AuthOptions`] and [`AuthTarget`] implement `Deserialize` so a target can be
//! given as a JSON host string or a JSON options object.

use std::fmt;
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use tracing::{Level, warn};

use super::auth::{AuthAttempt, HostSpec};
use super::config::{
    DEFAULT_HOST, DEFAULT_PORT, Environment, resolve_compression, resolve_connect_timeout,
};
use super::{AUTH_TARGET, TRANSPORT_TARGET};

/// User-supplied authentication options.
///
/// `host` accepts the `[user@]host[:port]` form. Explicit `user` and `port`
/// take priority over values parsed from it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOptions {
    #[serde(default, alias = "hostname")]
    pub host: String,
    #[serde(default, alias = "username")]
    pub user: Option<String>,
    /// Accepts a number or a numeric string
    #[serde(default, deserialize_with = "port_number_or_string")]
    pub port: Option<u16>,
    #[serde(default)]
    pub password: Option<String>,
    /// Identity files tried after the password, in the given order
    #[serde(default, alias = "privateKey", deserialize_with = "one_or_many")]
    pub private_key_paths: Vec<String>,
    /// Also try `~/.ssh/id_dsa`, `~/.ssh/id_ecdsa` and `~/.ssh/id_rsa`
    #[serde(default = "default_true", alias = "tryDefaultPrivateKeys")]
    pub try_default_keys: bool,
    /// Per-attempt timeout in seconds (env: SSH_ATTEMPT_TIMEOUT)
    #[serde(default)]
    pub attempt_timeout_secs: Option<u64>,
    /// Connect timeout in seconds (default: 30, env: SSH_CONNECT_TIMEOUT)
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Enable zlib compression (default: true, env: SSH_COMPRESSION)
    #[serde(default)]
    pub compress: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(path)) => vec![path],
        Some(OneOrMany::Many(paths)) => paths,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

fn port_number_or_string<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<PortValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortValue::Number(port)) => Ok(Some(port)),
        Some(PortValue::Text(raw)) if raw.is_empty() => Ok(None),
        Some(PortValue::Text(raw)) => raw
            .parse::<u16>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid port '{}'", raw))),
    }
}

impl AuthOptions {
    /// Options for `host` with default-key fallback enabled and nothing else set.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: None,
            port: None,
            password: None,
            private_key_paths: Vec::new(),
            try_default_keys: true,
            attempt_timeout_secs: None,
            connect_timeout_secs: None,
            compress: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Append an identity file to try before the defaults.
    pub fn with_key(mut self, path: impl Into<String>) -> Self {
        self.private_key_paths.push(path.into());
        self
    }

    pub fn without_default_keys(mut self) -> Self {
        self.try_default_keys = false;
        self
    }

    pub fn with_attempt_timeout_secs(mut self, secs: u64) -> Self {
        self.attempt_timeout_secs = Some(secs);
        self
    }
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOptions")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("private_key_paths", &self.private_key_paths)
            .field("try_default_keys", &self.try_default_keys)
            .field("attempt_timeout_secs", &self.attempt_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("compress", &self.compress)
            .finish()
    }
}

/// Either a bare host string or a full options object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AuthTarget {
    Host(String),
    Options(AuthOptions),
}

impl AuthTarget {
    pub fn into_options(self) -> AuthOptions {
        match self {
            AuthTarget::Host(host) => AuthOptions::new(host),
            AuthTarget::Options(options) => options,
        }
    }
}

impl From<&str> for AuthTarget {
    fn from(host: &str) -> Self {
        AuthTarget::Host(host.to_string())
    }
}

impl From<String> for AuthTarget {
    fn from(host: String) -> Self {
        AuthTarget::Host(host)
    }
}

impl From<AuthOptions> for AuthTarget {
    fn from(options: AuthOptions) -> Self {
        AuthTarget::Options(options)
    }
}

/// Connection parameters shared by every attempt of one run.
///
/// Only the credential varies between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    /// May be empty when no user could be resolved
    pub user: String,
    /// Whether the connector should emit transport-level tracing
    pub transport_debug: bool,
    pub connect_timeout: Duration,
    pub compress: bool,
}

impl ConnectionParams {
    /// Resolve host, port and user from options, the parsed host string and the environment.
    ///
    /// - host: parsed host, or `localhost` when empty
    /// - port: explicit option -> numeric parsed port -> 22
    /// - user: explicit option -> parsed user -> environment user -> empty, skipping empty values
    pub fn resolve(options: &AuthOptions, spec: &HostSpec, env: &Environment) -> Self {
        let host = if spec.host.is_empty() {
            DEFAULT_HOST.to_string()
        } else {
            spec.host.clone()
        };

        let parsed_port = spec.port.as_deref().and_then(|raw| match raw.parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => {
                warn!(target: AUTH_TARGET, "ignoring invalid port '{}' in host string", raw);
                None
            }
        });
        let port = options.port.or(parsed_port).unwrap_or(DEFAULT_PORT);

        let user = options
            .user
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| spec.user.clone().filter(|u| !u.is_empty()))
            .or_else(|| env.user.clone().filter(|u| !u.is_empty()))
            .unwrap_or_default();
        if user.is_empty() {
            warn!(target: AUTH_TARGET, "no username resolved for {}:{}", host, port);
        }

        Self {
            host,
            port,
            user,
            transport_debug: tracing::enabled!(target: TRANSPORT_TARGET, Level::DEBUG),
            connect_timeout: resolve_connect_timeout(options.connect_timeout_secs),
            compress: resolve_compression(options.compress),
        }
    }
}

impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Successful outcome of a credential plan.
#[derive(Debug)]
pub struct Authenticated<C> {
    /// Live connection, owned by the caller
    pub connection: C,
    /// The attempt that succeeded
    pub attempt: AuthAttempt,
    /// Number of attempts resolved, including the successful one
    pub attempts_made: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_user(user: &str) -> Environment {
        Environment {
            user: Some(user.to_string()),
            home: None,
            cwd: None,
        }
    }

    mod deserialize {
        use super::*;

        #[test]
        fn test_bare_string_is_host() {
            let target: AuthTarget = serde_json::from_str(r#""alice@example.com""#).unwrap();
            assert_eq!(target, AuthTarget::Host("alice@example.com".to_string()));
        }

        #[test]
        fn test_object_defaults() {
            let target: AuthTarget = serde_json::from_str(r#"{"host": "example.com"}"#).unwrap();
            let options = target.into_options();
            assert_eq!(options, AuthOptions::new("example.com"));
            assert!(options.try_default_keys);
        }

        #[test]
        fn test_single_private_key_string() {
            let options: AuthOptions =
                serde_json::from_str(r#"{"host": "h", "privateKey": "~/.ssh/deploy"}"#).unwrap();
            assert_eq!(options.private_key_paths, vec!["~/.ssh/deploy".to_string()]);
        }

        #[test]
        fn test_private_key_list() {
            let options: AuthOptions =
                serde_json::from_str(r#"{"host": "h", "privateKeyPaths": ["a", "b"]}"#).unwrap();
            assert_eq!(options.private_key_paths, vec!["a".to_string(), "b".to_string()]);
        }

        #[test]
        fn test_null_private_key() {
            let options: AuthOptions =
                serde_json::from_str(r#"{"host": "h", "privateKey": null}"#).unwrap();
            assert!(options.private_key_paths.is_empty());
        }

        #[test]
        fn test_port_as_string() {
            let options: AuthOptions =
                serde_json::from_str(r#"{"host": "h", "port": "2222"}"#).unwrap();
            assert_eq!(options.port, Some(2222));
        }

        #[test]
        fn test_port_as_number() {
            let options: AuthOptions = serde_json::from_str(r#"{"host": "h", "port": 2022}"#).unwrap();
            assert_eq!(options.port, Some(2022));
        }

        #[test]
        fn test_non_numeric_port_string_is_error() {
            let result = serde_json::from_str::<AuthOptions>(r#"{"host": "h", "port": "ssh"}"#);
            assert!(result.is_err());
        }

        #[test]
        fn test_aliases() {
            let options: AuthOptions = serde_json::from_str(
                r#"{"hostname": "h", "username": "u", "tryDefaultPrivateKeys": false}"#,
            )
            .unwrap();
            assert_eq!(options.host, "h");
            assert_eq!(options.user.as_deref(), Some("u"));
            assert!(!options.try_default_keys);
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn test_user_and_port_from_host_string() {
            let options = AuthOptions::new("db@10.0.0.5:2022")
                .with_password("secret")
                .without_default_keys();
            let spec = HostSpec::parse(&options.host);
            let params = ConnectionParams::resolve(&options, &spec, &env_with_user("bob"));
            assert_eq!(params.host, "10.0.0.5");
            assert_eq!(params.user, "db");
            assert_eq!(params.port, 2022);
        }

        #[test]
        fn test_explicit_options_win() {
            let options = AuthOptions::new("db@10.0.0.5:2022")
                .with_user("admin")
                .with_port(2200);
            let spec = HostSpec::parse(&options.host);
            let params = ConnectionParams::resolve(&options, &spec, &env_with_user("bob"));
            assert_eq!(params.user, "admin");
            assert_eq!(params.port, 2200);
        }

        #[test]
        fn test_environment_user_and_default_port() {
            let options = AuthOptions::new("example.com");
            let spec = HostSpec::parse(&options.host);
            let params = ConnectionParams::resolve(&options, &spec, &env_with_user("bob"));
            assert_eq!(params.user, "bob");
            assert_eq!(params.port, DEFAULT_PORT);
            assert_eq!(params.to_string(), "bob@example.com:22");
        }

        #[test]
        fn test_empty_parsed_user_falls_back_to_environment() {
            let options = AuthOptions::new("@example.com");
            let spec = HostSpec::parse(&options.host);
            let params = ConnectionParams::resolve(&options, &spec, &env_with_user("bob"));
            assert_eq!(params.user, "bob");
        }

        #[test]
        fn test_empty_explicit_user_falls_back() {
            let options = AuthOptions::new("db@example.com").with_user("");
            let spec = HostSpec::parse(&options.host);
            let params = ConnectionParams::resolve(&options, &spec, &env_with_user("bob"));
            assert_eq!(params.user, "db");

            let options = AuthOptions::new("example.com").with_user("");
            let spec = HostSpec::parse(&options.host);
            let params = ConnectionParams::resolve(&options, &spec, &env_with_user("bob"));
            assert_eq!(params.user, "bob");
        }

        #[test]
        fn test_missing_user_is_empty() {
            let options = AuthOptions::new("example.com");
            let spec = HostSpec::parse(&options.host);
            let params = ConnectionParams::resolve(&options, &spec, &Environment::default());
            assert_eq!(params.user, "");
        }

        #[test]
        fn test_empty_host_falls_back_to_localhost() {
            let options = AuthOptions::default();
            let spec = HostSpec::parse(&options.host);
            let params = ConnectionParams::resolve(&options, &spec, &Environment::default());
            assert_eq!(params.host, DEFAULT_HOST);
        }

        #[test]
        fn test_invalid_parsed_port_uses_default() {
            let options = AuthOptions::new("host:notaport");
            let spec = HostSpec::parse(&options.host);
            let params = ConnectionParams::resolve(&options, &spec, &Environment::default());
            assert_eq!(params.port, DEFAULT_PORT);
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let options = AuthOptions::new("h").with_password("hunter2");
        let debug = format!("{:?}", options);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(AuthTarget::from("h"), AuthTarget::Host("h".to_string()));
        assert_eq!(
            AuthTarget::from(AuthOptions::new("h")).into_options(),
            AuthOptions::new("h")
        );
    }
}
