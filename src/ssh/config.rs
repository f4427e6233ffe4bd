//! Configuration resolution and process environment capture.
//!
//! Transport settings use a three-tier priority system:
//!
//! 1. **Parameter** - Explicitly provided option (highest priority)
//! 2. **Environment Variable** - Value from environment variable
//! 3. **Default** - Built-in default value (lowest priority)
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SSH_CONNECT_TIMEOUT` | 30s | TCP connect and handshake timeout in seconds |
//! | `SSH_ATTEMPT_TIMEOUT` | unset | Per-attempt timeout in seconds |
//! | `SSH_COMPRESSION` | true | Enable zlib compression |
//!
//! The current user, home directory and working directory are read once into an
//! [`Environment`] and passed explicitly to the plan builder and key loader.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Host used when the host string yields an empty host
pub const DEFAULT_HOST: &str = "localhost";

/// Default identity files relative to the home directory, in trial order
pub const DEFAULT_KEY_PATHS: [&str; 3] = ["~/.ssh/id_dsa", "~/.ssh/id_ecdsa", "~/.ssh/id_rsa"];

/// Default connect timeout in seconds
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Environment variable name for connect timeout
pub(crate) const CONNECT_TIMEOUT_ENV_VAR: &str = "SSH_CONNECT_TIMEOUT";

/// Environment variable name for per-attempt timeout
pub(crate) const ATTEMPT_TIMEOUT_ENV_VAR: &str = "SSH_ATTEMPT_TIMEOUT";

/// Environment variable name for SSH compression
pub(crate) const COMPRESSION_ENV_VAR: &str = "SSH_COMPRESSION";

/// Environment variable holding the invoking user's name
pub(crate) const USER_ENV_VAR: &str = "USER";

/// Values read from the invoking process.
///
/// Any field may be absent. A missing user resolves to an empty username; a
/// missing home directory leaves `~/` paths unexpanded so they fail to load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub user: Option<String>,
    pub home: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
}

impl Environment {
    /// Capture the current user, home directory and working directory.
    pub fn from_process() -> Self {
        Self {
            user: env::var(USER_ENV_VAR).ok().filter(|u| !u.is_empty()),
            home: dirs::home_dir(),
            cwd: env::current_dir().ok(),
        }
    }
}

/// Resolve the connect timeout with priority: parameter -> env var -> default
pub(crate) fn resolve_connect_timeout(timeout_param: Option<u64>) -> Duration {
    if let Some(timeout) = timeout_param {
        return Duration::from_secs(timeout);
    }

    if let Ok(env_timeout) = env::var(CONNECT_TIMEOUT_ENV_VAR)
        && let Ok(timeout) = env_timeout.parse::<u64>()
    {
        return Duration::from_secs(timeout);
    }

    Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
}

/// Resolve the per-attempt timeout with priority: parameter -> env var -> none.
///
/// A value of zero disables the timeout.
pub(crate) fn resolve_attempt_timeout(timeout_param: Option<u64>) -> Option<Duration> {
    let secs = match timeout_param {
        Some(timeout) => Some(timeout),
        None => env::var(ATTEMPT_TIMEOUT_ENV_VAR)
            .ok()
            .and_then(|t| t.parse::<u64>().ok()),
    };

    secs.filter(|s| *s > 0).map(Duration::from_secs)
}

/// Resolve the compression setting with priority: parameter -> env var -> default (true)
pub(crate) fn resolve_compression(compress_param: Option<bool>) -> bool {
    if let Some(compress) = compress_param {
        return compress;
    }

    if let Ok(env_compress) = env::var(COMPRESSION_ENV_VAR) {
        return env_compress.eq_ignore_ascii_case("true") || env_compress == "1";
    }

    true
}
