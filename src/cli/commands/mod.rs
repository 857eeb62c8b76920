pub mod browse;
pub mod session;

use crate::config::DEFAULT_API_BASE_URL;
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_VERBOSITY: &str = "verbosity";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accepts a level name or its position in [`LOG_LEVELS`].
fn parse_verbosity(value: &str) -> Result<u8, String> {
    let value = value.trim().to_ascii_lowercase();
    LOG_LEVELS
        .iter()
        .position(|level| *level == value)
        .and_then(|index| u8::try_from(index).ok())
        .or_else(|| value.parse::<u8>().ok().filter(|&n| usize::from(n) < LOG_LEVELS.len()))
        .ok_or_else(|| format!("invalid log level {value}, expected one of {}", LOG_LEVELS.join(", ")))
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("safiri")
        .about("Kenya travel marketplace client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Marketplace API base URL")
                .default_value(DEFAULT_API_BASE_URL)
                .env("SAFIRI_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("state-dir")
                .long("state-dir")
                .help("Directory holding the stored session (default: $HOME/.safiri)")
                .env("SAFIRI_STATE_DIR")
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Request timeout in seconds")
                .default_value("10")
                .env("SAFIRI_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        );

    let command = session::subcommands(command);
    let command = browse::subcommands(command);

    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("SAFIRI_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_verbosity)),
    )
}
