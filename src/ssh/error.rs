//! Error types for credential fallback.
//!
//! Errors fall into two groups:
//!
//! 1. **Per-attempt failures**: [`AuthError::KeyUnavailable`], [`AuthError::AuthRejected`],
//!    [`AuthError::Transport`] and [`AuthError::AttemptTimedOut`]. The sequencer logs these
//!    and moves on to the next candidate. They never reach the caller.
//!
//! 2. **Exhaustion**: [`AuthError::AllMethodsFailed`] is the only error returned by
//!    [`crate::ssh::auth::AuthChain::run`]. It carries no per-attempt detail.
//!
//! Connectors report their own failures with [`ConnectorError`], which is folded into
//! [`AuthError`] per attempt.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Error surfaced by the authentication layer.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A candidate private key file could not be read
    #[error("private key '{}' is unavailable: {source}", path.display())]
    KeyUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server refused the credential, or the key could not be used
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// Network or protocol failure while attempting a credential
    #[error("transport error: {0}")]
    Transport(String),

    /// The connector did not settle within the per-attempt timeout
    #[error("attempt timed out after {0:?}")]
    AttemptTimedOut(Duration),

    /// Every candidate in the credential plan failed
    #[error("all configured authentication methods failed")]
    AllMethodsFailed,
}

impl AuthError {
    /// Short label used in attempt logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::KeyUnavailable { .. } => "key unavailable",
            AuthError::AuthRejected(_) => "rejected",
            AuthError::Transport(_) => "transport",
            AuthError::AttemptTimedOut(_) => "timed out",
            AuthError::AllMethodsFailed => "exhausted",
        }
    }
}

/// Failure reported by a [`crate::ssh::auth::Connector`] for one credential.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// TCP connect, handshake or protocol failure
    #[error("{0}")]
    Transport(String),

    /// The server did not accept the credential
    #[error("{0}")]
    Rejected(String),

    /// Key bytes could not be decoded into a usable private key
    #[error("invalid private key: {0}")]
    InvalidKey(String),
}

impl ConnectorError {
    /// Create a transport error from a string
    pub fn transport(msg: impl Into<String>) -> Self {
        ConnectorError::Transport(msg.into())
    }

    /// Create a rejection error from a string
    pub fn rejected(msg: impl Into<String>) -> Self {
        ConnectorError::Rejected(msg.into())
    }
}

impl From<ConnectorError> for AuthError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Transport(msg) => AuthError::Transport(msg),
            ConnectorError::Rejected(msg) => AuthError::AuthRejected(msg),
            invalid @ ConnectorError::InvalidKey(_) => AuthError::AuthRejected(invalid.to_string()),
        }
    }
}

impl From<russh::Error> for ConnectorError {
    fn from(err: russh::Error) -> Self {
        ConnectorError::Transport(err.to_string())
    }
}
