use crate::{
    auth::state::SessionHandle,
    features::{
        bookings::{Booking, BookingStatus, BookingsClient},
        experiences::{Experience, ExperienceFilters, ExperiencesClient},
    },
    routes::{Navigation, Navigator},
};
use anyhow::{anyhow, Result};
use std::fmt::Write;

#[derive(Debug, Default)]
pub struct ExperiencesArgs {
    pub id: Option<u64>,
    pub mine: bool,
    pub filters: ExperienceFilters,
}

#[derive(Debug, Default)]
pub struct BookingsArgs {
    pub all: bool,
    /// Bookings on the signed-in guide's experiences.
    pub guide: bool,
    pub cancel: Option<u64>,
    pub update: Option<(u64, BookingStatus)>,
}

/// Runs a navigation to `path` once the session is known.
pub async fn open(session: &SessionHandle, path: &str) -> String {
    let mut navigator = Navigator::new(session.clone());
    describe(&navigator.navigate_when_ready(path).await)
}

#[must_use]
pub fn describe(navigation: &Navigation) -> String {
    match navigation {
        Navigation::Render(matched) => {
            let mut line = format!("render {} ({})", matched.route.name, matched.route.pattern);
            for (name, value) in &matched.params {
                let _ = write!(line, " {name}={value}");
            }
            line
        }
        Navigation::Loading { path } => format!("loading {path}"),
        Navigation::Redirected { from, to, reason } => {
            format!("redirect {from} -> {to} ({reason:?})")
        }
        Navigation::NotFound { path } => format!("not found: {path}"),
    }
}

/// # Errors
/// Returns the API failure.
pub async fn experiences(client: &ExperiencesClient, args: &ExperiencesArgs) -> Result<String> {
    if let Some(id) = args.id {
        let experience = client.get(id).await?;
        return Ok(experience_details(&experience));
    }

    let experiences = if args.mine {
        client.mine().await?
    } else if args.filters == ExperienceFilters::default() {
        client.list().await?
    } else {
        client.search(&args.filters).await?
    };

    if experiences.is_empty() {
        return Ok("No experiences found".to_string());
    }
    Ok(experiences
        .iter()
        .map(experience_row)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// `user_id` is the signed-in user, needed for the guide listing.
///
/// # Errors
/// Returns the API failure.
pub async fn bookings(
    client: &BookingsClient,
    args: &BookingsArgs,
    user_id: Option<u64>,
) -> Result<String> {
    if let Some(id) = args.cancel {
        client.delete(id).await?;
        return Ok(format!("Booking {id} cancelled"));
    }
    if let Some((id, status)) = args.update {
        let change = client.update_status(id, status).await?;
        return Ok(format!("Booking {} is now {}", change.id, change.status));
    }

    let bookings = if args.all {
        client.all().await?
    } else if args.guide {
        let guide_id = user_id.ok_or_else(|| anyhow!("Sign in as a guide to list these bookings"))?;
        client.for_guide(guide_id).await?
    } else {
        client.mine().await?
    };

    if bookings.is_empty() {
        return Ok("No bookings yet".to_string());
    }
    Ok(bookings
        .iter()
        .map(booking_row)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn experience_row(experience: &Experience) -> String {
    format!(
        "{:>5}  {}  {}  USD {:.2}",
        experience.id, experience.title, experience.location, experience.price
    )
}

fn experience_details(experience: &Experience) -> String {
    let mut out = format!(
        "{}\n{} | {} | USD {:.2}",
        experience.title, experience.location, experience.category, experience.price
    );
    if let Some(duration) = &experience.duration {
        let _ = write!(out, " | {duration}");
    }
    if let Some(max) = experience.max_people {
        let _ = write!(out, " | up to {max} people");
    }
    if !experience.description.is_empty() {
        let _ = write!(out, "\n\n{}", experience.description);
    }
    out
}

fn booking_row(booking: &Booking) -> String {
    format!(
        "{:>5}  {}  {}  {} guest(s)  USD {:.2}  {}",
        booking.id,
        booking.tour_date,
        booking
            .experience_title
            .as_deref()
            .or(booking.traveler_name.as_deref())
            .unwrap_or("-"),
        booking.guest_count,
        booking.total_amount,
        booking.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{
            state::{tests::FakeBackend, SessionManager},
            storage::MemoryStore,
        },
        features::bookings::BookingStatus,
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn test_open_waits_for_restore() {
        let manager = Arc::new(SessionManager::new(
            SessionHandle::new(Arc::new(MemoryStore::new())),
            Arc::new(FakeBackend::with_demo_accounts()),
        ));
        let restore = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.restore_session().await })
        };

        let output = open(manager.handle(), "/my-bookings").await;
        restore.await.unwrap();
        assert_eq!(output, "redirect /my-bookings -> /login (Unauthenticated)");
    }

    #[test]
    fn test_describe_render_with_params() {
        let matched = crate::routes::resolve("/experiences/12").unwrap();
        assert_eq!(
            describe(&Navigation::Render(matched)),
            "render experience (/experiences/:id) id=12"
        );
        assert_eq!(
            describe(&Navigation::NotFound {
                path: "/nope".to_string()
            }),
            "not found: /nope"
        );
    }

    #[test]
    fn test_booking_row() {
        let booking = Booking {
            id: 4,
            experience_id: Some(1),
            experience_title: Some("Diani Snorkelling".to_string()),
            guide_name: None,
            traveler_name: None,
            tour_date: "2025-10-02".to_string(),
            guest_count: 3,
            total_amount: 135.0,
            status: BookingStatus::Pending,
            location: None,
        };
        assert_eq!(
            booking_row(&booking),
            "    4  2025-10-02  Diani Snorkelling  3 guest(s)  USD 135.00  pending"
        );
    }
}
