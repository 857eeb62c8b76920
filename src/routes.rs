//! Marketplace route table and navigation. Every navigation re-reads the
//! session and runs it through [`authorize`]; session events re-run the
//! decision for the current location so a forced logout or a finished
//! restoration takes effect without user action.

use crate::auth::{
    guards::{authorize, Access, Decision, RedirectReason},
    state::{SessionEvent, SessionHandle},
    types::Role,
};
use tracing::{debug, info};

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub pattern: &'static str,
    pub access: Access,
}

const fn route(name: &'static str, pattern: &'static str, access: Access) -> Route {
    Route {
        name,
        pattern,
        access,
    }
}

pub static ROUTES: &[Route] = &[
    route("home", HOME, Access::Public),
    route("login", LOGIN, Access::Public),
    route("register", "/register", Access::Public),
    route("experiences", "/experiences", Access::Public),
    route("experience", "/experiences/:id", Access::Public),
    route("calculator", "/calculator", Access::Public),
    route("booking", "/experiences/:id/book", Access::Authenticated),
    route("my_bookings", "/my-bookings", Access::Authenticated),
    route("guide_dashboard", "/guide/dashboard", Access::Role(Role::Guide)),
    route("create_experience", "/guide/create", Access::Role(Role::Guide)),
    route("admin", "/admin", Access::Role(Role::Admin)),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static Route,
    pub params: Vec<(&'static str, String)>,
}

impl RouteMatch {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Matches a path (query and fragment ignored) against the route table.
#[must_use]
pub fn resolve(path: &str) -> Option<RouteMatch> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    ROUTES.iter().find_map(|route| {
        let pattern: Vec<&str> = route.pattern.split('/').filter(|s| !s.is_empty()).collect();
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (&expected, &actual) in pattern.iter().zip(segments.iter()) {
            if let Some(name) = expected.strip_prefix(':') {
                params.push((name, actual.to_string()));
            } else if expected != actual {
                return None;
            }
        }

        Some(RouteMatch { route, params })
    })
}

/// Where a user lands after signing in.
#[must_use]
pub fn landing_for(role: Role) -> &'static str {
    match role {
        Role::Guide => "/guide/dashboard",
        Role::Admin => "/admin",
        Role::Traveler => "/experiences",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(RouteMatch),
    Loading {
        path: String,
    },
    Redirected {
        from: String,
        to: &'static str,
        reason: RedirectReason,
    },
    NotFound {
        path: String,
    },
}

/// Tracks the current location for one view tree.
pub struct Navigator {
    session: SessionHandle,
    location: String,
    redirects: usize,
}

impl Navigator {
    #[must_use]
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            location: HOME.to_string(),
            redirects: 0,
        }
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Number of redirects performed so far.
    #[must_use]
    pub fn redirects(&self) -> usize {
        self.redirects
    }

    /// Navigates to `path` using the session as it is right now.
    pub fn navigate(&mut self, path: &str) -> Navigation {
        self.location = path.to_string();

        let Some(matched) = resolve(path) else {
            return Navigation::NotFound {
                path: path.to_string(),
            };
        };

        match authorize(&self.session.state(), matched.route.access) {
            Decision::Render => Navigation::Render(matched),
            Decision::Loading => Navigation::Loading {
                path: path.to_string(),
            },
            Decision::Redirect { to, reason } => self.redirect(to, reason),
        }
    }

    /// Waits for restoration before the first decision, so a returning
    /// session is never treated as logged out.
    pub async fn navigate_when_ready(&mut self, path: &str) -> Navigation {
        self.session.wait_ready().await;
        self.navigate(path)
    }

    /// Applies a session event to the current location.
    pub fn handle_event(&mut self, event: &SessionEvent) -> Option<Navigation> {
        match event {
            SessionEvent::Expired { redirect_to } => {
                info!("session expired, leaving {}", self.location);
                Some(self.redirect(*redirect_to, RedirectReason::Unauthenticated))
            }
            SessionEvent::LoggedOut => {
                let gated = resolve(&self.location)
                    .is_some_and(|matched| matched.route.access != Access::Public);
                gated.then(|| self.redirect(HOME, RedirectReason::Unauthenticated))
            }
            _ => {
                let current = self.location.clone();
                Some(self.navigate(&current))
            }
        }
    }

    fn redirect(&mut self, to: &'static str, reason: RedirectReason) -> Navigation {
        let from = std::mem::replace(&mut self.location, to.to_string());
        self.redirects += 1;
        debug!("redirect {from} -> {to} ({reason:?})");

        Navigation::Redirected { from, to, reason }
    }
}
