//! Session and role authorization client for the Digital Guides marketplace.
//!
//! ## Core Flows
//!
//! ### Login & Registration
//!
//! 1. **Submit:** A form calls [`auth::SessionManager::login`] or
//!    [`auth::SessionManager::register`].
//! 2. **Exchange:** The backend answers `POST /auth/login` (or `/auth/register`)
//!    with `{token, user}`.
//! 3. **Commit:** The token and user record are written to durable storage and
//!    published to every subscriber in one step.
//!
//! ### Restoration
//!
//! At startup [`auth::SessionManager::restore_session`] reads the stored token
//! and asks `GET /auth/profile` who it belongs to. Until it resolves the session
//! is *unknown* and [`auth::guards::authorize`] answers `Loading` for gated
//! routes instead of redirecting.
//!
//! ### Forced Logout
//!
//! When an authenticated call comes back `401`, [`api::ApiClient`] clears the
//! session and emits [`auth::SessionEvent::Expired`] exactly once per session,
//! no matter how many requests were in flight.
//!
//! The authorization gate is a UX convenience. The backend must re-check the
//! role on every privileged operation.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod features;
pub mod routes;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub(crate) mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
