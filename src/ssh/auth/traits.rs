//! Connector trait definition.
//!
//! A connector performs the protocol-level handshake and authentication for one
//! credential. The sequencer in [`super::chain`] drives it once per attempt.

use std::fmt;

use async_trait::async_trait;

use crate::ssh::error::ConnectorError;
use crate::ssh::types::ConnectionParams;

/// Credential material handed to a connector for a single attempt.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Password(String),
    /// Raw private key file contents
    PrivateKey(Vec<u8>),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Password(_) => f.write_str("Password(<redacted>)"),
            Credential::PrivateKey(bytes) => write!(f, "PrivateKey({} bytes)", bytes.len()),
        }
    }
}

/// Capability that establishes an authenticated connection.
///
/// Implementations must be thread-safe (`Send + Sync`) for use across async tasks.
///
/// # Contract
///
/// * Each call settles exactly once, with either a live connection or an error
/// * Implementations do not retry internally
/// * A returned connection is owned by the caller
#[async_trait]
pub trait Connector: Send + Sync {
    /// Live connection handle returned on success.
    type Connection: Send;

    /// Connect to `params` and authenticate with `credential`.
    async fn connect(
        &self,
        params: &ConnectionParams,
        credential: Credential,
    ) -> Result<Self::Connection, ConnectorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_hides_material() {
        let password = format!("{:?}", Credential::Password("hunter2".to_string()));
        assert_eq!(password, "Password(<redacted>)");

        let key = format!("{:?}", Credential::PrivateKey(vec![0u8; 16]));
        assert_eq!(key, "PrivateKey(16 bytes)");
    }
}
