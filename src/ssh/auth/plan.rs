//! Credential plan construction.

use std::collections::VecDeque;
use std::fmt;

use crate::ssh::config::DEFAULT_KEY_PATHS;
use crate::ssh::types::AuthOptions;

/// A single credential trial.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthAttempt {
    Password { secret: String },
    PublicKey { path: String },
}

impl AuthAttempt {
    /// Name of the authentication method, used for logging.
    pub fn method(&self) -> &'static str {
        match self {
            AuthAttempt::Password { .. } => "password",
            AuthAttempt::PublicKey { .. } => "publickey",
        }
    }
}

impl fmt::Debug for AuthAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthAttempt::Password { .. } => f
                .debug_struct("Password")
                .field("secret", &"<redacted>")
                .finish(),
            AuthAttempt::PublicKey { path } => {
                f.debug_struct("PublicKey").field("path", path).finish()
            }
        }
    }
}

/// Ordered queue of authentication attempts.
///
/// Order: password (if any), explicit identity files in the given order, then
/// the default identities when enabled. Entries are never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPlan {
    attempts: Vec<AuthAttempt>,
}

impl CredentialPlan {
    /// Build the plan for the given options. Cannot fail.
    pub fn build(options: &AuthOptions) -> Self {
        let mut attempts = Vec::new();

        if let Some(password) = options.password.as_deref().filter(|p| !p.is_empty()) {
            attempts.push(AuthAttempt::Password {
                secret: password.to_string(),
            });
        }

        let defaults: &[&str] = if options.try_default_keys {
            &DEFAULT_KEY_PATHS
        } else {
            &[]
        };

        attempts.extend(
            options
                .private_key_paths
                .iter()
                .map(String::as_str)
                .chain(defaults.iter().copied())
                .map(|path| AuthAttempt::PublicKey {
                    path: path.to_string(),
                }),
        );

        Self { attempts }
    }

    pub fn attempts(&self) -> &[AuthAttempt] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

impl From<CredentialPlan> for VecDeque<AuthAttempt> {
    fn from(plan: CredentialPlan) -> Self {
        plan.attempts.into()
    }
}
