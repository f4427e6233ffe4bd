//! Credential fallback for SSH connections.
//!
//! A run takes user options, builds an ordered [`CredentialPlan`] and hands each
//! attempt to a [`Connector`], stopping at the first success.
//!
//! # Components
//!
//! - [`HostSpec`]: `[user@]host[:port]` parsing
//! - [`CredentialPlan`]: password, explicit identity files, default identities
//! - [`KeyLoader`]: `~/` and relative path expansion, key file reads
//! - [`Connector`]: one protocol-level authentication per call
//! - [`AuthChain`]: the sequential fallback loop
//!
//! # Example
//!
//! ```ignore
//! use ssh_fallback::ssh::auth::authenticate;
//!
//! let env = Environment::from_process();
//! let authenticated = authenticate("deploy@example.com:2222", &RusshConnector, &env).await?;
//! ```

mod chain;
mod host;
mod key;
mod plan;
mod traits;

pub use chain::AuthChain;
pub use host::HostSpec;
pub use key::KeyLoader;
pub use plan::{AuthAttempt, CredentialPlan};
pub use traits::{Connector, Credential};

use crate::ssh::config::Environment;
use crate::ssh::error::AuthError;
use crate::ssh::types::{AuthTarget, Authenticated};

/// Authenticate against `target` using `connector`, falling back through the plan.
pub async fn authenticate<C: Connector>(
    target: impl Into<AuthTarget>,
    connector: &C,
    env: &Environment,
) -> Result<Authenticated<C::Connection>, AuthError> {
    let options = target.into().into_options();
    AuthChain::from_options(&options, env).run(connector).await
}
