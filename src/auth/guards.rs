use crate::{
    auth::{state::SessionState, types::Role},
    routes::{HOME, LOGIN},
};

/// What a route demands of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(Role),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectReason {
    Unauthenticated,
    WrongRole,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Restoration is pending; show a loading state and do not redirect.
    Loading,
    Render,
    Redirect {
        to: &'static str,
        reason: RedirectReason,
    },
}

/// Decides whether a view may render for the given session.
///
/// UX-only guard; real access control must live on the API. A wrong role
/// lands on the home page rather than a "forbidden" view so the gated
/// structure is not advertised.
#[must_use]
pub fn authorize(state: &SessionState, access: Access) -> Decision {
    if access == Access::Public {
        return Decision::Render;
    }

    match state {
        SessionState::Unknown => Decision::Loading,
        SessionState::Unauthenticated => Decision::Redirect {
            to: LOGIN,
            reason: RedirectReason::Unauthenticated,
        },
        SessionState::Authenticated(session) => match access {
            Access::Role(required) if session.role() != required => Decision::Redirect {
                to: HOME,
                reason: RedirectReason::WrongRole,
            },
            _ => Decision::Render,
        },
    }
}
