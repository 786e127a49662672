//! Issue or inspect bearer tokens with the deployment's signing settings.
//!
//! Reads the same environment as the service (`AUTH_TOKEN_SECRET_FILE`,
//! `AUTH_TOKEN_TTL_SECS`, `AUTH_ALLOW_EPHEMERAL_SECRET`), so operators can
//! mint a token for smoke tests or check why a client's token is rejected.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mockable::{DefaultClock, DefaultEnv};
use sns_backend::config::{BuildMode, token_settings_from_env};
use sns_backend::domain::{TokenService, Username};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `sns-token` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sns-token",
    about = "Issue or inspect bearer tokens signed with the configured secret",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Sign a token asserting the given username.
    Issue {
        /// Username to place in the token subject.
        #[arg(long, value_name = "username")]
        subject: String,
    },
    /// Validate a token and print its subject.
    Inspect {
        /// Compact token string.
        #[arg(value_name = "token")]
        token: String,
    },
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|error| io::Error::other(format!("load token settings: {error}")))?;
    let tokens = TokenService::new(&settings, Arc::new(DefaultClock));

    for line in run(args.command, &tokens)? {
        println!("{line}");
    }
    Ok(())
}

fn run(command: Command, tokens: &TokenService) -> io::Result<Vec<String>> {
    match command {
        Command::Issue { subject } => {
            let subject = Username::new(&subject).map_err(|error| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid subject '{subject}': {error}"),
                )
            })?;
            let token = tokens
                .issue(&subject)
                .map_err(|error| io::Error::other(format!("issue token: {error}")))?;
            Ok(vec![
                format!("subject={}", token.subject()),
                format!("issued_at={}", token.issued_at().to_rfc3339()),
                format!("expires_at={}", token.expires_at().to_rfc3339()),
                format!("token={}", token.as_str()),
            ])
        }
        Command::Inspect { token } => {
            let subject = tokens.validate(token.trim()).map_err(|error| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("token rejected ({}): {error}", error.reason()),
                )
            })?;
            Ok(vec![format!("subject={subject}")])
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing and command dispatch.

    use std::time::Duration;

    use rstest::{fixture, rstest};
    use sns_backend::domain::{TokenSecret, TokenSettings};

    use super::*;

    #[fixture]
    fn tokens() -> TokenService {
        let secret = TokenSecret::new(vec![b'x'; 32]).expect("secret");
        let settings = TokenSettings::new(secret, Duration::from_secs(300)).expect("settings");
        TokenService::new(&settings, Arc::new(DefaultClock))
    }

    fn value_of<'a>(lines: &'a [String], key: &str) -> &'a str {
        let prefix = format!("{key}=");
        lines
            .iter()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
            .unwrap_or_else(|| panic!("missing {key} in {lines:?}"))
    }

    #[rstest]
    fn parses_issue_subcommand() {
        let args = CliArgs::try_parse_from(["sns-token", "issue", "--subject", "alice"])
            .expect("arguments parse");
        assert!(matches!(args.command, Command::Issue { subject } if subject == "alice"));
    }

    #[rstest]
    fn rejects_missing_subcommand() {
        assert!(CliArgs::try_parse_from(["sns-token"]).is_err());
    }

    #[rstest]
    fn issued_token_can_be_inspected(tokens: TokenService) {
        let issued = run(
            Command::Issue {
                subject: "alice".to_owned(),
            },
            &tokens,
        )
        .expect("issue succeeds");
        assert_eq!(value_of(&issued, "subject"), "alice");

        let token = value_of(&issued, "token").to_owned();
        let inspected = run(Command::Inspect { token }, &tokens).expect("inspect succeeds");
        assert_eq!(inspected, vec!["subject=alice".to_owned()]);
    }

    #[rstest]
    fn invalid_subject_is_rejected(tokens: TokenService) {
        let error = run(
            Command::Issue {
                subject: "no spaces allowed".to_owned(),
            },
            &tokens,
        )
        .expect_err("invalid subject");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }

    #[rstest]
    fn garbage_token_reports_reason(tokens: TokenService) {
        let error = run(
            Command::Inspect {
                token: "garbage".to_owned(),
            },
            &tokens,
        )
        .expect_err("garbage token");
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
        assert!(error.to_string().contains("malformed"));
    }
}
