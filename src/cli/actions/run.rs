use crate::{
    auth::{self, AuthError, SessionEvent},
    cli::{
        actions::{browse, session, Action},
        globals::GlobalArgs,
    },
    features::{bookings::BookingsClient, experiences::ExperiencesClient},
};
use anyhow::Result;
use tracing::{debug, warn};

/// Execute the provided action against a freshly restored session.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    let (manager, api) = auth::connect(globals.config()?)?;
    let restored = manager.restore_session().await;
    debug!("restored session, authenticated: {}", restored.is_authenticated());
    let mut events = manager.handle().events();

    let output = match action {
        Action::Login(args) => session::login(&manager, &args).await,
        Action::Register(args) => session::register(&manager, &args).await,
        Action::Logout => Ok(session::logout(&manager).await),
        Action::Whoami => Ok(session::whoami(&manager.state())),
        Action::SetRole(role) => session::set_role(&manager, role).await,
        Action::Open { path } => Ok(browse::open(manager.handle(), &path).await),
        Action::Experiences(args) => {
            browse::experiences(&ExperiencesClient::new(api), &args).await
        }
        Action::Bookings(args) => {
            let user_id = manager.state().user().map(|user| user.id);
            browse::bookings(&BookingsClient::new(api), &args, user_id).await
        }
    };

    let expired = std::iter::from_fn(|| events.try_recv().ok())
        .any(|event| matches!(event, SessionEvent::Expired { .. }));
    manager.dispose().await;

    println!("{}", finish(output, expired)?);
    Ok(())
}

/// Puts the session-expired notice in front of whatever the action reported
/// when the backend rejected the stored token along the way.
fn finish(output: Result<String>, expired: bool) -> Result<String> {
    if !expired {
        return output;
    }
    match output {
        Ok(text) => {
            warn!("{}", AuthError::SessionExpired);
            Ok(format!("{text}\n{}", AuthError::SessionExpired))
        }
        Err(err) => Err(err.context(AuthError::SessionExpired)),
    }
}
