//! russh-backed connector and command execution.
//!
//! ## Connection Lifecycle
//!
//! Every attempt of a credential plan gets its own connection:
//!
//! 1. **Client Configuration**: Build the russh client configuration with timeout,
//!    keepalive, and compression settings.
//!
//! 2. **Connection Establishment**: Establish the TCP connection and SSH handshake
//!    within the connect timeout.
//!
//! 3. **Authentication**: Offer exactly one credential, either a password or a
//!    private key decoded from the loaded key bytes.
//!
//! A rejected credential closes its connection before the next attempt starts.
//! The connector never retries; fallback is the sequencer's job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::keys::{self, PrivateKeyWithHashAlg};
use russh::{ChannelMsg, Disconnect, client};
use tracing::debug;

use crate::ssh::TRANSPORT_TARGET;
use crate::ssh::auth::{Connector, Credential, authenticate};
use crate::ssh::config::Environment;
use crate::ssh::error::{AuthError, ConnectorError};
use crate::ssh::session::SshClientHandler;
use crate::ssh::types::{AuthTarget, ConnectionParams};

/// Build russh client configuration with the specified settings.
///
/// Creates an `Arc<client::Config>` with:
/// - Inactivity timeout set to the provided `timeout`
/// - Keepalive interval of 30 seconds with max 3 keepalives
/// - Compression preference based on `compress` flag (ZLIB if enabled, NONE if disabled)
pub(crate) fn build_client_config(timeout: Duration, compress: bool) -> Arc<client::Config> {
    let compression = if compress {
        (&[russh::compression::ZLIB, russh::compression::NONE][..]).into()
    } else {
        (&[russh::compression::NONE][..]).into()
    };

    let preferred = russh::Preferred {
        compression,
        ..Default::default()
    };

    Arc::new(client::Config {
        inactivity_timeout: Some(timeout),
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        preferred,
        ..Default::default()
    })
}

/// Decode private key file contents. Passphrase-protected keys are not supported.
fn decode_private_key(bytes: &[u8]) -> Result<keys::PrivateKey, ConnectorError> {
    let pem = std::str::from_utf8(bytes).map_err(|e| ConnectorError::InvalidKey(e.to_string()))?;
    keys::decode_secret_key(pem, None).map_err(|e| ConnectorError::InvalidKey(e.to_string()))
}

/// Credential ready to be offered to the server.
enum Prepared {
    Password(String),
    Key(keys::PrivateKey),
}

impl Prepared {
    fn method(&self) -> &'static str {
        match self {
            Prepared::Password(_) => "password",
            Prepared::Key(_) => "publickey",
        }
    }
}

/// Production [`Connector`] that opens a russh session per attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct RusshConnector;

#[async_trait]
impl Connector for RusshConnector {
    type Connection = client::Handle<SshClientHandler>;

    async fn connect(
        &self,
        params: &ConnectionParams,
        credential: Credential,
    ) -> Result<Self::Connection, ConnectorError> {
        // Decode before touching the network so a bad key file costs no round-trip
        let prepared = match credential {
            Credential::Password(password) => Prepared::Password(password),
            Credential::PrivateKey(bytes) => Prepared::Key(decode_private_key(&bytes)?),
        };

        let config = build_client_config(params.connect_timeout, params.compress);
        let handler = SshClientHandler::new(params.transport_debug);

        if params.transport_debug {
            debug!(
                target: TRANSPORT_TARGET,
                "opening connection to {}:{} (timeout {:?}, compression {})",
                params.host,
                params.port,
                params.connect_timeout,
                params.compress
            );
        }

        let connect_future = client::connect(config, (params.host.as_str(), params.port), handler);

        let mut handle = tokio::time::timeout(params.connect_timeout, connect_future)
            .await
            .map_err(|_| {
                ConnectorError::transport(format!(
                    "Connection timed out after {:?}",
                    params.connect_timeout
                ))
            })?
            .map_err(|e| ConnectorError::transport(format!("Failed to connect: {}", e)))?;

        let method = prepared.method();

        let result = match prepared {
            Prepared::Password(password) => {
                handle
                    .authenticate_password(params.user.as_str(), password)
                    .await?
            }
            Prepared::Key(key) => {
                // For RSA keys, use the best supported hash algorithm
                let hash_alg = handle
                    .best_supported_rsa_hash()
                    .await
                    .ok()
                    .flatten()
                    .flatten();
                if params.transport_debug {
                    debug!(target: TRANSPORT_TARGET, "using RSA hash algorithm: {:?}", hash_alg);
                }

                let key_with_hash = PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg);
                handle
                    .authenticate_publickey(params.user.as_str(), key_with_hash)
                    .await?
            }
        };

        if !result.success() {
            if let Err(e) = handle
                .disconnect(Disconnect::ByApplication, "authentication rejected", "en")
                .await
                && params.transport_debug
            {
                debug!(target: TRANSPORT_TARGET, "disconnect after rejection failed: {}", e);
            }
            return Err(ConnectorError::rejected(format!(
                "{} authentication rejected for {}",
                method, params
            )));
        }

        Ok(handle)
    }
}

/// Connect to `target`, trying password, explicit keys and default keys in order.
///
/// Reads the current user, home and working directories from the process.
pub async fn connect(
    target: impl Into<AuthTarget>,
) -> Result<client::Handle<SshClientHandler>, AuthError> {
    let env = Environment::from_process();
    authenticate(target, &RusshConnector, &env)
        .await
        .map(|authenticated| authenticated.connection)
}

/// Output of a remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// -1 when the server sent no exit status
    pub exit_code: i32,
}

/// Execute a command on an authenticated session and collect its output.
pub async fn execute_command(
    handle: &client::Handle<SshClientHandler>,
    command: &str,
) -> Result<CommandOutput, ConnectorError> {
    let mut channel = handle
        .channel_open_session()
        .await
        .map_err(|e| ConnectorError::transport(format!("Failed to open channel: {}", e)))?;

    channel
        .exec(true, command)
        .await
        .map_err(|e| ConnectorError::transport(format!("Failed to execute command: {}", e)))?;

    let mut stdout = Vec::with_capacity(4096);
    let mut stderr = Vec::with_capacity(1024);
    let mut exit_code: Option<u32> = None;

    loop {
        match channel.wait().await {
            Some(ChannelMsg::Data { data }) => {
                stdout.extend_from_slice(&data);
            }
            Some(ChannelMsg::ExtendedData { data, ext }) => {
                // ext == 1 is stderr in SSH protocol
                if ext == 1 {
                    stderr.extend_from_slice(&data);
                }
            }
            Some(ChannelMsg::ExitStatus { exit_status }) => {
                exit_code = Some(exit_status);
            }
            Some(ChannelMsg::Eof) => {
                if exit_code.is_some() {
                    break;
                }
            }
            Some(ChannelMsg::Close) | None => break,
            Some(_) => {}
        }
    }

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code: exit_code.map_or(-1, |code| code as i32),
    })
}
