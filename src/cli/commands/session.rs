use crate::auth::types::Role;
use clap::{builder::ValueParser, Arg, Command};

pub const LOGIN: &str = "login";
pub const REGISTER: &str = "register";
pub const LOGOUT: &str = "logout";
pub const WHOAMI: &str = "whoami";
pub const SET_ROLE: &str = "set-role";

fn email() -> Arg {
    Arg::new("email")
        .short('e')
        .long("email")
        .help("Account email")
        .env("SAFIRI_EMAIL")
        .required(true)
}

fn password() -> Arg {
    Arg::new("password")
        .short('p')
        .long("password")
        .help("Account password")
        .env("SAFIRI_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

/// Parses a role name, accepting only the roles in `allowed`.
#[must_use]
pub fn validator_role(allowed: &'static [Role]) -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<Role, String> {
        let role = value.parse::<Role>()?;
        if allowed.contains(&role) {
            Ok(role)
        } else {
            Err(format!("role not allowed here: {role}"))
        }
    })
}

#[must_use]
pub fn subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(LOGIN)
                .about("Sign in and store the session")
                .arg(email())
                .arg(password()),
        )
        .subcommand(
            Command::new(REGISTER)
                .about("Create a traveler or guide account")
                .arg(Arg::new("first-name").long("first-name").required(true))
                .arg(Arg::new("last-name").long("last-name").required(true))
                .arg(email())
                .arg(password())
                .arg(
                    Arg::new("role")
                        .long("role")
                        .help("traveler or guide")
                        .default_value("traveler")
                        .value_parser(validator_role(&[Role::Traveler, Role::Guide])),
                )
                .arg(Arg::new("phone").long("phone").help("Required for guides"))
                .arg(Arg::new("location").long("location").help("Required for guides"))
                .arg(Arg::new("bio").long("bio").help("Required for guides")),
        )
        .subcommand(Command::new(LOGOUT).about("Forget the stored session"))
        .subcommand(Command::new(WHOAMI).about("Show the signed-in user"))
        .subcommand(
            Command::new(SET_ROLE)
                .about("Request a different role for the signed-in user")
                .arg(
                    Arg::new("role")
                        .help("traveler, guide or admin")
                        .required(true)
                        .value_parser(validator_role(&[Role::Traveler, Role::Guide, Role::Admin])),
                ),
        )
}
