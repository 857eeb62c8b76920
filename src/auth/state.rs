//! Session state and the session manager. The manager is the single writer of
//! the session: it restores it once at startup, commits login and
//! registration results, and clears it on logout. The API client holds a
//! [`SessionHandle`] too, but can only force a logout when the backend rejects
//! the token. State changes are published on a watch channel and announced on
//! a broadcast channel of [`SessionEvent`]s.

use crate::{
    auth::{
        backend::AuthBackend,
        errors::AuthError,
        storage::{SessionStore, StorageError},
        types::{Credentials, RegistrationForm, Role, Session, UserSummary},
    },
    routes::HOME,
};
use secrecy::SecretString;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::{broadcast, watch, Mutex, OnceCell};
use tracing::{debug, error, info, instrument, warn};

const EVENT_CAPACITY: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    /// Restoration has not finished; gated views must wait.
    Unknown,
    Unauthenticated,
    Authenticated(Session),
}

impl SessionState {
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserSummary> {
        self.session().map(|session| &session.user)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    #[must_use]
    pub fn is_guide(&self) -> bool {
        self.role() == Some(Role::Guide)
    }

    #[must_use]
    pub fn is_traveler(&self) -> bool {
        self.role() == Some(Role::Traveler)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Init,
    Ready,
    Disposed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Restored { authenticated: bool },
    LoggedIn(UserSummary),
    Registered(UserSummary),
    RoleChanged {
        role: Role,
        pending_role: Option<Role>,
    },
    LoggedOut,
    /// The backend rejected the token; the session is gone.
    Expired { redirect_to: &'static str },
}

struct Shared {
    store: Arc<dyn SessionStore>,
    state: watch::Sender<SessionState>,
    lifecycle: watch::Sender<Lifecycle>,
    events: broadcast::Sender<SessionEvent>,
    /// Bumped on every state change.
    generation: AtomicU64,
    /// Serializes storage + state writes.
    writes: Mutex<()>,
}

/// Shared view of the session, cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        let (lifecycle, _) = watch::channel(Lifecycle::Init);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                store,
                state,
                lifecycle,
                events,
                generation: AtomicU64::new(0),
                writes: Mutex::new(()),
            }),
        }
    }

    /// Current state. Always re-read this; never cache it across an await.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        *self.shared.lifecycle.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Reads the persisted bearer token.
    ///
    /// # Errors
    /// Returns an error if storage cannot be read.
    pub fn stored_token(&self) -> Result<Option<SecretString>, StorageError> {
        self.shared.store.load_token()
    }

    /// Reads the persisted user record.
    ///
    /// # Errors
    /// Returns an error if storage cannot be read or the record is corrupt.
    pub fn stored_user(&self) -> Result<Option<UserSummary>, StorageError> {
        self.shared.store.load_user()
    }

    /// Waits until restoration has finished (or the manager was disposed).
    pub async fn wait_ready(&self) {
        let mut lifecycle = self.shared.lifecycle.subscribe();
        let _ = lifecycle.wait_for(|phase| *phase != Lifecycle::Init).await;
    }

    /// Forced logout after the backend rejected a token that was read at
    /// `observed` generation. Only the first rejection of a given session
    /// clears it; later ones from concurrent requests are ignored.
    pub async fn expire(&self, observed: u64) -> bool {
        let _guard = self.shared.writes.lock().await;

        if self.generation() != observed || !self.shared.state.borrow().is_authenticated() {
            debug!("ignoring stale token rejection");
            return false;
        }

        if let Err(err) = self.shared.store.clear() {
            error!("Failed to clear expired session: {err}");
        }
        self.advance(SessionState::Unauthenticated);
        self.emit(SessionEvent::Expired { redirect_to: HOME });
        warn!("session expired");

        true
    }

    /// Persists and publishes an authenticated session. With `expected` set,
    /// the write is dropped if another write happened since that generation.
    pub(crate) async fn commit(
        &self,
        expected: Option<u64>,
        session: Session,
        event: Option<SessionEvent>,
    ) -> Result<bool, StorageError> {
        let _guard = self.shared.writes.lock().await;

        if expected.is_some_and(|generation| generation != self.generation()) {
            debug!("session write superseded");
            return Ok(false);
        }

        self.shared.store.save(&session.token, &session.user)?;
        self.advance(SessionState::Authenticated(session));
        if let Some(event) = event {
            self.emit(event);
        }

        Ok(true)
    }

    /// Moves to unauthenticated, optionally clearing storage. Returns whether
    /// the in-memory state changed. Storage failures are logged, not returned.
    pub(crate) async fn reset(
        &self,
        expected: Option<u64>,
        clear_store: bool,
        event: Option<SessionEvent>,
    ) -> bool {
        let _guard = self.shared.writes.lock().await;

        if expected.is_some_and(|generation| generation != self.generation()) {
            debug!("session reset superseded");
            return false;
        }

        if clear_store {
            if let Err(err) = self.shared.store.clear() {
                error!("Failed to clear stored session: {err}");
            }
        }

        let changed = *self.shared.state.borrow() != SessionState::Unauthenticated;
        if changed {
            self.advance(SessionState::Unauthenticated);
            if let Some(event) = event {
                self.emit(event);
            }
        }

        changed
    }

    fn set_lifecycle(&self, phase: Lifecycle) {
        self.shared.lifecycle.send_replace(phase);
    }

    fn advance(&self, state: SessionState) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.state.send_replace(state);
    }

    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.shared.events.send(event);
    }
}

pub struct SessionManager {
    handle: SessionHandle,
    backend: Arc<dyn AuthBackend>,
    restored: OnceCell<()>,
}

impl SessionManager {
    #[must_use]
    pub fn new(handle: SessionHandle, backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            handle,
            backend,
            restored: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.handle.state()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.handle.state().is_authenticated()
    }

    /// Signs in with email and password. On failure the existing session,
    /// in memory and on disk, is left untouched.
    ///
    /// # Errors
    /// Returns a user-displayable [`AuthError`].
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.ensure_active()?;

        let credentials = Credentials::new(email, password);
        credentials.validate().map_err(AuthError::Validation)?;

        let session = self.backend.login(&credentials).await?;
        self.handle
            .commit(
                None,
                session.clone(),
                Some(SessionEvent::LoggedIn(session.user.clone())),
            )
            .await?;

        info!("signed in as {}", session.user.role);
        Ok(session)
    }

    /// Creates an account and signs in with it. Same guarantees as [`Self::login`].
    ///
    /// # Errors
    /// Returns a user-displayable [`AuthError`].
    #[instrument(skip_all, fields(role = %form.role))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<Session, AuthError> {
        self.ensure_active()?;
        form.validate().map_err(AuthError::Validation)?;

        let session = self.backend.register(form).await?;
        self.handle
            .commit(
                None,
                session.clone(),
                Some(SessionEvent::Registered(session.user.clone())),
            )
            .await?;

        info!("registered as {}", session.user.role);
        Ok(session)
    }

    /// Clears the session from memory and storage. Calling it again is a no-op.
    pub async fn logout(&self) {
        if self
            .handle
            .reset(None, true, Some(SessionEvent::LoggedOut))
            .await
        {
            info!("signed out");
        }
    }

    /// Restores a persisted session once per manager. Concurrent and repeated
    /// calls wait for the same run and then return the current state. Never
    /// fails: an unusable token just leaves the session unauthenticated.
    pub async fn restore_session(&self) -> SessionState {
        if self.handle.lifecycle() == Lifecycle::Disposed {
            return self.handle.state();
        }

        self.restored.get_or_init(|| self.run_restore()).await;
        self.handle.state()
    }

    /// Asks the backend for a different role. The local user is updated once
    /// the backend accepts; a pending approval is recorded as `pending_role`.
    ///
    /// # Errors
    /// Returns [`AuthError::NotAuthenticated`] without a session, or the
    /// translated backend failure. The role is untouched on failure.
    #[instrument(skip(self))]
    pub async fn request_role_change(&self, role: Role) -> Result<UserSummary, AuthError> {
        self.ensure_active()?;

        let generation = self.handle.generation();
        let SessionState::Authenticated(session) = self.handle.state() else {
            return Err(AuthError::NotAuthenticated);
        };

        let response = self.backend.set_role(&session.token, role).await?;

        let mut user = session.user.clone();
        if response.pending {
            user.pending_role = Some(role);
        } else {
            user.role = response.role;
            user.pending_role = None;
        }

        let event = SessionEvent::RoleChanged {
            role: user.role,
            pending_role: user.pending_role,
        };
        let committed = self
            .handle
            .commit(
                Some(generation),
                Session::new(session.token.clone(), user.clone()),
                Some(event),
            )
            .await?;

        if !committed {
            return Err(AuthError::SessionExpired);
        }

        info!("role is now {}", user.role);
        Ok(user)
    }

    /// Ends the manager's lifecycle. The in-memory session is dropped but the
    /// stored one is kept for the next start.
    pub async fn dispose(&self) {
        self.handle.set_lifecycle(Lifecycle::Disposed);
        self.handle.reset(None, false, None).await;
    }

    fn ensure_active(&self) -> Result<(), AuthError> {
        if self.handle.lifecycle() == Lifecycle::Disposed {
            Err(AuthError::Disposed)
        } else {
            Ok(())
        }
    }

    #[instrument(skip(self))]
    async fn run_restore(&self) {
        let generation = self.handle.generation();

        let token = match self.handle.stored_token() {
            Ok(token) => token,
            Err(err) => {
                warn!("Stored session is unreadable: {err}");
                None
            }
        };

        match token {
            None => {
                // drop any user record left without a token
                self.handle.reset(Some(generation), true, None).await;
            }
            Some(token) => match self.backend.profile(&token).await {
                Ok(profile) => {
                    let user = match self.handle.stored_user() {
                        Ok(Some(stored)) => profile.merged_with(&stored),
                        Ok(None) => profile,
                        Err(err) => {
                            warn!("Stored user record is unreadable: {err}");
                            profile
                        }
                    };
                    let session = Session::new(token, user);
                    if let Err(err) = self.handle.commit(Some(generation), session, None).await {
                        error!("Failed to persist restored session: {err}");
                        self.handle.reset(Some(generation), false, None).await;
                    }
                }
                Err(err) if err.is_rejection() => {
                    info!("Stored session rejected: {err}");
                    self.handle.reset(Some(generation), true, None).await;
                }
                Err(err) => {
                    // the token was not judged; keep it so the next start can retry
                    warn!("Could not verify stored session: {err}");
                    self.handle.reset(Some(generation), false, None).await;
                }
            },
        }

        self.handle.set_lifecycle(Lifecycle::Ready);
        let authenticated = self.handle.state().is_authenticated();
        self.handle
            .emit(SessionEvent::Restored { authenticated });
        debug!("restoration finished, authenticated: {authenticated}");
    }
}
