use crate::features::bookings::BookingStatus;
use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const OPEN: &str = "open";
pub const EXPERIENCES: &str = "experiences";
pub const BOOKINGS: &str = "bookings";

#[must_use]
pub fn subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(OPEN)
                .about("Check whether a page would render for the current session")
                .arg(Arg::new("path").required(true).help("Page path, e.g. /admin")),
        )
        .subcommand(
            Command::new(EXPERIENCES)
                .about("List or search experiences")
                .arg(
                    Arg::new("id")
                        .help("Show a single experience")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("location").long("location"))
                .arg(
                    Arg::new("min-price")
                        .long("min-price")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("max-price")
                        .long("max-price")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("mine")
                        .long("mine")
                        .help("Only listings owned by the signed-in guide")
                        .action(ArgAction::SetTrue)
                        .conflicts_with_all(["id", "category", "location", "min-price", "max-price"]),
                ),
        )
        .subcommand(
            Command::new(BOOKINGS)
                .about("List bookings of the signed-in user")
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Every booking on the platform (admin)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("guide")
                        .long("guide")
                        .help("Bookings on the signed-in guide's experiences")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("all"),
                )
                .arg(
                    Arg::new("cancel")
                        .long("cancel")
                        .help("Delete the booking with this id")
                        .value_parser(clap::value_parser!(u64))
                        .conflicts_with_all(["all", "guide", "update"]),
                )
                .arg(
                    Arg::new("update")
                        .long("update")
                        .help("Change the status of the booking with this id")
                        .value_parser(clap::value_parser!(u64))
                        .requires("status")
                        .conflicts_with_all(["all", "guide"]),
                )
                .arg(
                    Arg::new("status")
                        .long("status")
                        .help("pending, confirmed, completed or cancelled")
                        .requires("update")
                        .value_parser(ValueParser::from(|value: &str| {
                            value.parse::<BookingStatus>()
                        })),
                ),
        )
}
