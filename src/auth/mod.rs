//! Auth feature module covering login, registration, session restoration and
//! role gating. It keeps session logic out of callers and must stay aligned
//! with the backend's `/auth/*` contract. This module touches security
//! boundaries and must avoid logging passwords or token material.
//!
//! Flow Overview: Login and registration post credentials anonymously and
//! commit the returned `{token, user}`. Restoration replays the stored token
//! against `/auth/profile` once at startup. Any `401` on a later bearer call
//! expires the session.

pub mod backend;
mod errors;
pub mod guards;
pub mod state;
pub mod storage;
pub mod types;

pub use backend::{AuthBackend, HttpAuthBackend};
pub use errors::AuthError;
pub use guards::{authorize, Access, Decision, RedirectReason};
pub use state::{Lifecycle, SessionEvent, SessionHandle, SessionManager, SessionState};
pub use storage::{FileStore, MemoryStore, SessionStore};
pub use types::{Credentials, RegistrationForm, Role, Session, UserSummary};

use crate::{
    api::{ApiClient, ApiError},
    config::AppConfig,
};
use std::sync::Arc;

/// Wires file storage, the API client and the HTTP backend into a manager.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn connect(config: AppConfig) -> Result<(SessionManager, ApiClient), ApiError> {
    let store: Arc<dyn SessionStore> = Arc::new(FileStore::new(config.state_dir.clone()));
    connect_with_store(config, store)
}

/// Same as [`connect`] with a caller-provided store.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn connect_with_store(
    config: AppConfig,
    store: Arc<dyn SessionStore>,
) -> Result<(SessionManager, ApiClient), ApiError> {
    let handle = SessionHandle::new(store);
    let api = ApiClient::new(config, handle.clone())?;
    let backend = Arc::new(HttpAuthBackend::new(api.clone()));

    Ok((SessionManager::new(handle, backend), api))
}
