//! SSH client handler.
//!
//! `SshClientHandler` is the russh client handler used by
//! [`crate::ssh::client::RusshConnector`]. It accepts all host keys (similar to
//! `StrictHostKeyChecking=no` in OpenSSH) and reports them on the transport
//! tracing target when enabled.

use russh::{client, keys};
use tracing::debug;

use crate::ssh::TRANSPORT_TARGET;

/// Client handler for russh that accepts all host keys.
///
/// # Security Note
///
/// Server keys are not verified against known_hosts.
pub struct SshClientHandler {
    trace: bool,
}

impl SshClientHandler {
    pub fn new(trace: bool) -> Self {
        Self { trace }
    }
}

impl client::Handler for SshClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        if self.trace {
            debug!(
                target: TRANSPORT_TARGET,
                "accepting server host key {:?}",
                server_public_key.algorithm()
            );
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<SshClientHandler>();
    }
}
