#![deny(clippy::unwrap_used)]

use dotenv::dotenv;
use ssh_fallback::ssh::auth::authenticate;
use ssh_fallback::ssh::client::execute_command;
use ssh_fallback::ssh::{AuthTarget, Environment, RusshConnector};
use tracing::info;

const USAGE: &str = "usage: ssh-fallback <[user@]host[:port] | JSON options> [command...]";

/// A leading `{` or `"` selects JSON options; anything else is a host string.
fn parse_target(arg: &str) -> Result<AuthTarget, serde_json::Error> {
    if arg.starts_with('{') || arg.starts_with('"') {
        serde_json::from_str(arg)
    } else {
        Ok(AuthTarget::from(arg))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Initialize logging with proper tracing default
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().expect("valid directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(target_arg) = args.next() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    let target = parse_target(&target_arg)?;
    let command = args.collect::<Vec<_>>().join(" ");

    let env = Environment::from_process();
    let authenticated = authenticate(target, &RusshConnector, &env).await?;
    info!(
        "Connected using {} after {} attempt(s)",
        authenticated.attempt.method(),
        authenticated.attempts_made
    );

    if command.is_empty() {
        return Ok(());
    }

    let output = execute_command(&authenticated.connection, &command).await?;
    print!("{}", output.stdout);
    eprint!("{}", output.stderr);
    std::process::exit(output.exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssh_fallback::ssh::AuthOptions;

    #[test]
    fn test_plain_host_argument() {
        let target = parse_target("alice@example.com:2222").unwrap();
        assert_eq!(target, AuthTarget::Host("alice@example.com:2222".to_string()));
    }

    #[test]
    fn test_json_options_argument() {
        let target =
            parse_target(r#"{"host": "db@10.0.0.5:2022", "password": "secret", "tryDefaultKeys": false}"#)
                .unwrap();
        assert_eq!(
            target.into_options(),
            AuthOptions::new("db@10.0.0.5:2022")
                .with_password("secret")
                .without_default_keys()
        );
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(parse_target("{not json").is_err());
    }
}
