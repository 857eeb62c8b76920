use crate::{
    auth::{
        state::{SessionManager, SessionState},
        types::{RegistrationForm, Role},
    },
    routes::landing_for,
};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct LoginArgs {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub form: RegistrationForm,
}

/// # Errors
/// Returns the sign-in failure as shown to the user.
pub async fn login(manager: &SessionManager, args: &LoginArgs) -> Result<String> {
    let session = manager
        .login(&args.email, args.password.expose_secret())
        .await?;

    Ok(format!(
        "Welcome back, {}! Continue at {}",
        session.user.display_name(),
        landing_for(session.role())
    ))
}

/// # Errors
/// Returns the validation or backend failure as shown to the user.
pub async fn register(manager: &SessionManager, args: &RegisterArgs) -> Result<String> {
    let session = manager.register(&args.form).await?;

    Ok(format!(
        "Account created for {} ({}). Continue at {}",
        session.user.display_name(),
        session.role(),
        landing_for(session.role())
    ))
}

pub async fn logout(manager: &SessionManager) -> String {
    manager.logout().await;
    "Signed out".to_string()
}

#[must_use]
pub fn whoami(state: &SessionState) -> String {
    let Some(user) = state.user() else {
        return "Not signed in".to_string();
    };

    let mut line = format!("{} <{}> role: {}", user.display_name(), user.email, user.role);
    if let Some(pending) = user.pending_role {
        line.push_str(&format!(" (pending: {pending})"));
    }
    line
}

/// # Errors
/// Returns an error when signed out or when the backend refuses the change.
pub async fn set_role(manager: &SessionManager, role: Role) -> Result<String> {
    let user = manager.request_role_change(role).await?;

    Ok(match user.pending_role {
        Some(pending) => format!("Request to become {pending} is awaiting approval"),
        None => format!("Role is now {}", user.role),
    })
}
