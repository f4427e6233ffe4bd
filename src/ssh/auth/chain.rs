//! Fallback sequencer that works through a credential plan.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, info};

use crate::ssh::AUTH_TARGET;
use crate::ssh::config::{Environment, resolve_attempt_timeout};
use crate::ssh::error::AuthError;
use crate::ssh::types::{AuthOptions, Authenticated, ConnectionParams};

use super::host::HostSpec;
use super::key::KeyLoader;
use super::plan::{AuthAttempt, CredentialPlan};
use super::traits::{Connector, Credential};

/// Authentication chain that tries each attempt of a plan in order.
///
/// Attempts run strictly one after another. The first success stops the chain.
/// Per-attempt failures are logged on the `ssh_fallback::auth` target and
/// discarded; only exhaustion is reported, as [`AuthError::AllMethodsFailed`].
///
/// # Example
///
/// ```ignore
/// let options = AuthOptions::new("deploy@example.com").with_password("secret");
/// let chain = AuthChain::from_options(&options, &Environment::from_process());
/// let authenticated = chain.run(&RusshConnector).await?;
/// ```
#[derive(Debug)]
pub struct AuthChain {
    plan: CredentialPlan,
    params: ConnectionParams,
    keys: KeyLoader,
    attempt_timeout: Option<Duration>,
}

impl AuthChain {
    pub fn new(plan: CredentialPlan, params: ConnectionParams, keys: KeyLoader) -> Self {
        Self {
            plan,
            params,
            keys,
            attempt_timeout: None,
        }
    }

    /// Parse the host string, resolve connection parameters and build the plan.
    pub fn from_options(options: &AuthOptions, env: &Environment) -> Self {
        let spec = HostSpec::parse(&options.host);
        let params = ConnectionParams::resolve(options, &spec, env);
        let plan = CredentialPlan::build(options);

        debug!(
            target: AUTH_TARGET,
            "credential plan for {}: {} attempt(s)",
            params,
            plan.len()
        );

        Self::new(plan, params, KeyLoader::new(env))
            .with_attempt_timeout(resolve_attempt_timeout(options.attempt_timeout_secs))
    }

    /// Bound each connector call. An expired attempt counts as a failure.
    pub fn with_attempt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn plan(&self) -> &CredentialPlan {
        &self.plan
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plan.len()
    }

    /// Try every attempt until one yields a connection.
    ///
    /// An empty plan fails immediately without calling the connector.
    pub async fn run<C: Connector>(
        self,
        connector: &C,
    ) -> Result<Authenticated<C::Connection>, AuthError> {
        let Self {
            plan,
            params,
            keys,
            attempt_timeout,
        } = self;

        let mut queue: VecDeque<AuthAttempt> = plan.into();
        let mut attempts_made = 0;

        while let Some(attempt) = queue.pop_front() {
            attempts_made += 1;

            match try_attempt(connector, &params, &keys, &attempt, attempt_timeout).await {
                Ok(connection) => {
                    info!(
                        target: AUTH_TARGET,
                        "authenticated to {} with {} (attempt {})",
                        params,
                        attempt.method(),
                        attempts_made
                    );
                    return Ok(Authenticated {
                        connection,
                        attempt,
                        attempts_made,
                    });
                }
                Err(e) => {
                    debug!(
                        target: AUTH_TARGET,
                        "{} attempt {} against {} failed ({}): {}",
                        attempt.method(),
                        attempts_made,
                        params,
                        e.kind(),
                        e
                    );
                }
            }
        }

        let err = AuthError::AllMethodsFailed;
        debug!(target: AUTH_TARGET, "{}: {} after {} attempt(s)", params, err, attempts_made);
        Err(err)
    }
}

/// Resolve one attempt: load key material if needed, then call the connector.
async fn try_attempt<C: Connector>(
    connector: &C,
    params: &ConnectionParams,
    keys: &KeyLoader,
    attempt: &AuthAttempt,
    attempt_timeout: Option<Duration>,
) -> Result<C::Connection, AuthError> {
    let credential = match attempt {
        AuthAttempt::Password { secret } => {
            debug!(target: AUTH_TARGET, "connecting to {} using password ...", params);
            Credential::Password(secret.clone())
        }
        AuthAttempt::PublicKey { path } => {
            debug!(
                target: AUTH_TARGET,
                "connecting to {} using public key '{}'...",
                params,
                keys.resolve(path).display()
            );
            Credential::PrivateKey(keys.load(path)?)
        }
    };

    let connect = connector.connect(params, credential);

    match attempt_timeout {
        Some(limit) => tokio::time::timeout(limit, connect)
            .await
            .map_err(|_| AuthError::AttemptTimedOut(limit))?
            .map_err(AuthError::from),
        None => connect.await.map_err(AuthError::from),
    }
}
