use crate::cli::{
    actions::Action,
    commands::{
        ARG_API_KEY, ARG_CERTS_URL, ARG_ENDPOINT, ARG_TIMEOUT, CMD_LOOKUP, CMD_SIGN_IN,
        CMD_SIGN_IN_CUSTOM, CMD_SIGN_UP,
    },
    globals::GlobalArgs,
};
use crate::identity::{Credentials, DEFAULT_ENDPOINT};
use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use secrecy::SecretString;
use std::time::Duration;

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

fn globals(matches: &clap::ArgMatches) -> GlobalArgs {
    let endpoint = matches
        .get_one::<String>(ARG_ENDPOINT)
        .cloned()
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let mut globals = GlobalArgs::new(endpoint);

    if let Some(api_key) = matches.get_one::<String>(ARG_API_KEY) {
        globals.set_api_key(SecretString::from(api_key.clone()));
    }

    if let Some(certs_url) = matches.get_one::<String>(ARG_CERTS_URL) {
        globals.certs_url.clone_from(certs_url);
    }

    globals.timeout = matches
        .get_one::<u64>(ARG_TIMEOUT)
        .copied()
        .map(Duration::from_secs);

    globals
}

fn credentials(matches: &clap::ArgMatches) -> Result<Option<Credentials>> {
    let email = matches.get_one::<String>("email");
    let password = matches.get_one::<String>("password");

    match (email, password) {
        (Some(email), Some(password)) => {
            if !valid_email(email) {
                bail!("invalid email address: {email}");
            }
            Ok(Some(Credentials::new(email.clone(), password.clone())))
        }
        _ => Ok(None),
    }
}

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let (name, sub_m) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("missing subcommand"))?;

    // global args are propagated to the subcommand
    let globals = globals(sub_m);

    match name {
        CMD_LOOKUP => Ok(Action::Lookup {
            globals,
            id_token: sub_m
                .get_one::<String>("id-token")
                .cloned()
                .context("missing required argument: --id-token")?,
        }),
        CMD_SIGN_IN => Ok(Action::SignIn {
            globals,
            credentials: credentials(sub_m)?
                .context("missing required arguments: --email and --password")?,
        }),
        CMD_SIGN_UP => Ok(Action::SignUp {
            globals,
            credentials: credentials(sub_m)?.unwrap_or_else(Credentials::anonymous),
        }),
        CMD_SIGN_IN_CUSTOM => Ok(Action::SignInCustom {
            globals,
            token: sub_m
                .get_one::<String>("token")
                .cloned()
                .context("missing required argument: --token")?,
        }),
        _ => Err(anyhow!("unknown subcommand: {name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    fn parse(args: &[&str]) -> Result<Action> {
        let mut argv = vec!["identity-gateway"];
        argv.extend_from_slice(args);
        handler(&commands::new().try_get_matches_from(argv)?)
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("alice@example.com"));
        assert!(!valid_email("alice"));
        assert!(!valid_email("alice@example"));
        assert!(!valid_email("al ice@example.com"));
    }

    #[test]
    fn test_lookup_action() {
        temp_env::with_vars_unset(
            [crate::identity::API_KEY_ENV, "IDENTITY_GATEWAY_TIMEOUT"],
            || {
                let action = parse(&["lookup", "--id-token", "tok"]).unwrap();
                let Action::Lookup { globals, id_token } = action else {
                    panic!("expected lookup action");
                };
                assert_eq!(id_token, "tok");
                assert!(globals.api_key.is_none());
                assert!(globals.timeout.is_none());
            },
        );
    }

    #[test]
    fn test_globals_after_subcommand() {
        let action = parse(&[
            "sign-in-custom",
            "--token",
            "custom",
            "--api-key",
            "cli-key",
            "--endpoint",
            "http://localhost:9099/v1",
            "--timeout",
            "7",
        ])
        .unwrap();
        let Action::SignInCustom { globals, token } = action else {
            panic!("expected custom token action");
        };
        assert_eq!(token, "custom");
        assert_eq!(globals.endpoint, "http://localhost:9099/v1");
        assert_eq!(globals.timeout, Some(Duration::from_secs(7)));
        assert_eq!(
            globals.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("cli-key".to_string())
        );
    }

    #[test]
    fn test_sign_in_rejects_invalid_email() {
        let result = parse(&["sign-in", "--email", "nope", "--password", "pw"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sign_up_anonymous() {
        temp_env::with_var_unset("IDENTITY_GATEWAY_PASSWORD", || {
            let action = parse(&["sign-up"]).unwrap();
            let Action::SignUp { credentials, .. } = action else {
                panic!("expected sign-up action");
            };
            assert!(credentials.is_anonymous());
        });
    }

    #[test]
    fn test_sign_up_with_credentials() {
        let action = parse(&["sign-up", "-e", "bob@example.com", "-p", "secret"]).unwrap();
        let Action::SignUp { credentials, .. } = action else {
            panic!("expected sign-up action");
        };
        assert_eq!(credentials.email, "bob@example.com");
        assert_eq!(credentials.password.expose_secret(), "secret");
        assert!(!credentials.is_anonymous());
    }
}
