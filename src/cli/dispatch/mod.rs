use crate::{
    auth::types::{RegistrationForm, Role},
    cli::{
        actions::{
            browse::{BookingsArgs, ExperiencesArgs},
            session::{LoginArgs, RegisterArgs},
            Action,
        },
        commands::{browse, session},
        globals::GlobalArgs,
    },
    features::{bookings::BookingStatus, experiences::ExperienceFilters},
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(name)
        .with_context(|| format!("missing required argument: --{name}"))
}

fn optional(matches: &clap::ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let mut globals = GlobalArgs::new(required(matches, "api-url")?.clone());
    globals.state_dir = matches.get_one::<PathBuf>("state-dir").cloned();
    if let Some(&secs) = matches.get_one::<u64>("timeout") {
        globals.timeout = Duration::from_secs(secs);
    }

    let action = match matches.subcommand() {
        Some((session::LOGIN, sub_m)) => Action::Login(LoginArgs {
            email: required(sub_m, "email")?.clone(),
            password: SecretString::from(required(sub_m, "password")?.clone()),
        }),
        Some((session::REGISTER, sub_m)) => {
            let role = sub_m.get_one::<Role>("role").copied().unwrap_or_default();
            let mut form = RegistrationForm::new(
                required(sub_m, "first-name")?,
                required(sub_m, "last-name")?,
                required(sub_m, "email")?,
                required(sub_m, "password")?,
                role,
            );
            if role == Role::Guide {
                form = form.with_guide_profile(
                    &optional(sub_m, "phone").unwrap_or_default(),
                    &optional(sub_m, "location").unwrap_or_default(),
                    &optional(sub_m, "bio").unwrap_or_default(),
                );
            }
            Action::Register(RegisterArgs { form })
        }
        Some((session::LOGOUT, _)) => Action::Logout,
        Some((session::WHOAMI, _)) => Action::Whoami,
        Some((session::SET_ROLE, sub_m)) => Action::SetRole(
            sub_m
                .get_one::<Role>("role")
                .copied()
                .context("missing required argument: role")?,
        ),
        Some((browse::OPEN, sub_m)) => Action::Open {
            path: required(sub_m, "path")?.clone(),
        },
        Some((browse::EXPERIENCES, sub_m)) => Action::Experiences(ExperiencesArgs {
            id: sub_m.get_one::<u64>("id").copied(),
            mine: sub_m.get_flag("mine"),
            filters: ExperienceFilters {
                category: optional(sub_m, "category"),
                location: optional(sub_m, "location"),
                min_price: sub_m.get_one::<f64>("min-price").copied(),
                max_price: sub_m.get_one::<f64>("max-price").copied(),
                ..ExperienceFilters::default()
            },
        }),
        Some((browse::BOOKINGS, sub_m)) => Action::Bookings(BookingsArgs {
            all: sub_m.get_flag("all"),
            guide: sub_m.get_flag("guide"),
            cancel: sub_m.get_one::<u64>("cancel").copied(),
            update: sub_m
                .get_one::<u64>("update")
                .copied()
                .zip(sub_m.get_one::<BookingStatus>("status").copied()),
        }),
        Some((other, _)) => return Err(anyhow!("unknown command: {other}")),
        None => return Err(anyhow!("no command given")),
    };

    Ok((action, globals))
}
