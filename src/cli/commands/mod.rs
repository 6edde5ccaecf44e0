pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_API_KEY: &str = "api-key";
pub const ARG_ENDPOINT: &str = "endpoint";
pub const ARG_CERTS_URL: &str = "certs-url";
pub const ARG_TIMEOUT: &str = "timeout";

pub const CMD_LOOKUP: &str = "lookup";
pub const CMD_SIGN_IN: &str = "sign-in";
pub const CMD_SIGN_UP: &str = "sign-up";
pub const CMD_SIGN_IN_CUSTOM: &str = "sign-in-custom";

fn email_arg() -> Arg {
    Arg::new("email").short('e').long("email").help("Account email")
}

fn password_arg() -> Arg {
    Arg::new("password")
        .short('p')
        .long("password")
        .help("Account password")
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("identity-gateway")
        .about("Identity Platform sign-up, sign-in and token lookup")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_KEY)
                .long("api-key")
                .help("Identity Platform API key")
                .env(crate::identity::API_KEY_ENV)
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_ENDPOINT)
                .long("endpoint")
                .help("Identity Platform base URL")
                .env("IDENTITY_GATEWAY_ENDPOINT")
                .default_value(crate::identity::DEFAULT_ENDPOINT)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CERTS_URL)
                .long("certs-url")
                .help("URL of the x509 certificates used to sign ID tokens")
                .env("IDENTITY_GATEWAY_CERTS_URL")
                .default_value(crate::identity::GOOGLE_CERTS_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long("timeout")
                .help("Request timeout in seconds (default: none)")
                .env("IDENTITY_GATEWAY_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .subcommand(
            Command::new(CMD_LOOKUP)
                .about("Validate an ID token and print the account data")
                .arg(
                    Arg::new("id-token")
                        .long("id-token")
                        .help("ID token to validate")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new(CMD_SIGN_IN)
                .about("Sign in with email and password")
                .arg(email_arg().required(true))
                .arg(
                    password_arg()
                        .env("IDENTITY_GATEWAY_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new(CMD_SIGN_UP)
                .about("Create an account; without email and password the account is anonymous")
                .arg(email_arg().requires("password"))
                .arg(password_arg().requires("email")),
        )
        .subcommand(
            Command::new(CMD_SIGN_IN_CUSTOM)
                .about("Exchange a custom token for a session")
                .arg(
                    Arg::new("token")
                        .short('t')
                        .long("token")
                        .help("Custom token")
                        .required(true),
                ),
        );

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "identity-gateway");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Identity Platform sign-up, sign-in and token lookup"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_command_debug_assert() {
        new().debug_assert();
    }

    #[test]
    fn test_sign_in_args() {
        temp_env::with_vars_unset(
            [crate::identity::API_KEY_ENV, "IDENTITY_GATEWAY_ENDPOINT"],
            || {
                let matches = new().get_matches_from(vec![
                    "identity-gateway",
                    "sign-in",
                    "--email",
                    "alice@example.com",
                    "--password",
                    "hunter2",
                ]);

                assert_eq!(matches.get_one::<String>(ARG_API_KEY), None);
                assert_eq!(
                    matches.get_one::<String>(ARG_ENDPOINT).map(String::as_str),
                    Some(crate::identity::DEFAULT_ENDPOINT)
                );

                let (name, sub_m) = matches.subcommand().unwrap();
                assert_eq!(name, CMD_SIGN_IN);
                assert_eq!(
                    sub_m.get_one::<String>("email").map(String::as_str),
                    Some("alice@example.com")
                );
                assert_eq!(
                    sub_m.get_one::<String>("password").map(String::as_str),
                    Some("hunter2")
                );
            },
        );
    }

    #[test]
    fn test_sign_up_requires_both_or_neither() {
        assert!(new()
            .try_get_matches_from(vec!["identity-gateway", "sign-up"])
            .is_ok());
        assert!(new()
            .try_get_matches_from(vec!["identity-gateway", "sign-up", "--email", "a@b.co"])
            .is_err());
    }

    #[test]
    fn test_password_env_only_for_sign_in() {
        temp_env::with_var("IDENTITY_GATEWAY_PASSWORD", Some("from-env"), || {
            let matches = new()
                .try_get_matches_from(vec!["identity-gateway", "sign-up"])
                .unwrap();
            let (_, sub_m) = matches.subcommand().unwrap();
            assert_eq!(sub_m.get_one::<String>("password"), None);

            let matches = new().get_matches_from(vec![
                "identity-gateway",
                "sign-in",
                "--email",
                "alice@example.com",
            ]);
            let (_, sub_m) = matches.subcommand().unwrap();
            assert_eq!(
                sub_m.get_one::<String>("password").map(String::as_str),
                Some("from-env")
            );
        });
    }

    #[test]
    fn test_subcommand_required() {
        assert!(new()
            .try_get_matches_from(vec!["identity-gateway"])
            .is_err());
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                (crate::identity::API_KEY_ENV, Some("env-key")),
                ("IDENTITY_GATEWAY_ENDPOINT", Some("http://localhost:9099/v1")),
                ("IDENTITY_GATEWAY_TIMEOUT", Some("5")),
                ("IDENTITY_GATEWAY_LOG_LEVEL", Some("info")),
                ("IDENTITY_GATEWAY_LOG_FORMAT", Some("json")),
            ],
            || {
                let matches =
                    new().get_matches_from(vec!["identity-gateway", "lookup", "--id-token", "t"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_KEY).map(String::as_str),
                    Some("env-key")
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_ENDPOINT).map(String::as_str),
                    Some("http://localhost:9099/v1")
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT).copied(), Some(5));
                assert_eq!(
                    matches
                        .get_one::<u8>(logging::ARG_VERBOSITY)
                        .copied(),
                    Some(2)
                );
                assert_eq!(
                    logging::log_format(&matches),
                    crate::cli::telemetry::LogFormat::Json
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("IDENTITY_GATEWAY_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec![
                    "identity-gateway",
                    "sign-in-custom",
                    "--token",
                    "custom",
                ]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5 {
            temp_env::with_vars([("IDENTITY_GATEWAY_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "identity-gateway".to_string(),
                    "lookup".to_string(),
                    "--id-token".to_string(),
                    "t".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(index as u8)
                );
            });
        }
    }
}
