//! SSH authentication with ordered credential fallback.
//!
//! This module is organized into the following submodules:
//!
//! - `auth`: Host parsing, credential plan, key loading and the fallback sequencer
//! - `types`: Caller-facing option and parameter types (serde-compatible)
//! - `config`: Process environment capture and env var resolution
//! - `error`: Per-attempt and surfaced error types
//! - `session`: russh client handler
//! - `client`: russh-backed connector, `connect` entry point and command execution

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod types;

/// Tracing target for authentication-attempt diagnostics.
pub const AUTH_TARGET: &str = "ssh_fallback::auth";

/// Tracing target for transport-level diagnostics emitted by the connector.
pub const TRANSPORT_TARGET: &str = "ssh_fallback::transport";

pub use auth::{
    AuthAttempt, AuthChain, Connector, Credential, CredentialPlan, HostSpec, authenticate,
};
pub use client::{RusshConnector, connect};
pub use config::Environment;
pub use error::{AuthError, ConnectorError};
pub use types::{AuthOptions, AuthTarget, Authenticated, ConnectionParams};
