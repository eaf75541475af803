//! Map parsed CLI arguments to the action the binary runs.

use crate::cli::{
    actions::Action,
    commands::{auth, ARG_DSN, ARG_PORT},
    globals::GlobalArgs,
};
use anyhow::Result;

/// Map validated CLI matches to a server action plus the global settings.
///
/// # Errors
/// Returns an error if required arguments are missing or blank.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let auth_opts = auth::Options::parse(matches)?;

    let mut globals = GlobalArgs::new(auth_opts.jwt_secret);
    globals.set_token_ttl(auth_opts.token_ttl_seconds);

    let action = Action::Server {
        port: matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080),
        dsn: matches
            .get_one::<String>(ARG_DSN)
            .filter(|dsn| !dsn.trim().is_empty())
            .cloned(),
    };

    Ok((action, globals))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action_from_env() {
        temp_env::with_vars(
            [
                ("DEVCONNECT_PORT", Some("9090")),
                ("DEVCONNECT_DSN", Some("postgres://localhost:5432/devconnect")),
                ("DEVCONNECT_JWT_SECRET", Some("s3cr3t")),
                ("DEVCONNECT_TOKEN_TTL", Some("120")),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["devconnect"]);
                let (action, globals) = handler(&matches).unwrap();

                let Action::Server { port, dsn } = action;
                assert_eq!(port, 9090);
                assert_eq!(dsn.as_deref(), Some("postgres://localhost:5432/devconnect"));
                assert_eq!(globals.jwt_secret.expose_secret(), "s3cr3t");
                assert_eq!(globals.token_ttl_seconds, 120);
            },
        );
    }

    #[test]
    fn blank_dsn_means_in_memory() {
        temp_env::with_vars(
            [
                ("DEVCONNECT_PORT", None),
                ("DEVCONNECT_DSN", Some(" ")),
                ("DEVCONNECT_JWT_SECRET", Some("s3cr3t")),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["devconnect"]);
                let (Action::Server { port, dsn }, _) = handler(&matches).unwrap();
                assert_eq!(port, 8080);
                assert!(dsn.is_none());
            },
        );
    }
}
