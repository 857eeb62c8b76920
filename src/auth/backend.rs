//! The login mechanism behind the session manager. The shipped implementation
//! posts email and password to the marketplace API; an identity-provider
//! flow can implement the same trait without touching the manager.

use crate::{
    api::ApiClient,
    auth::{
        errors::AuthError,
        types::{
            AuthResponse, Credentials, LoginRequest, RegistrationForm, Role, Session,
            SetRoleRequest, SetRoleResponse, UserSummary,
        },
    },
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const PROFILE_PATH: &str = "/auth/profile";
pub const SET_ROLE_PATH: &str = "/auth/set-role";

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchanges credentials for a token and user record.
    async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// Creates an account and returns its first session.
    async fn register(&self, form: &RegistrationForm) -> Result<Session, AuthError>;

    /// Resolves the user a token belongs to.
    async fn profile(&self, token: &SecretString) -> Result<UserSummary, AuthError>;

    /// Requests a role change for the token's user.
    async fn set_role(&self, token: &SecretString, role: Role)
        -> Result<SetRoleResponse, AuthError>;
}

/// `/auth/profile` answers with the bare user; some deployments wrap it.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileResponse {
    Wrapped { user: UserSummary },
    Bare(UserSummary),
}

impl From<ProfileResponse> for UserSummary {
    fn from(response: ProfileResponse) -> Self {
        match response {
            ProfileResponse::Wrapped { user } | ProfileResponse::Bare(user) => user,
        }
    }
}

pub struct HttpAuthBackend {
    api: ApiClient,
}

impl HttpAuthBackend {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn into_session(response: AuthResponse) -> Result<Session, AuthError> {
    if response.token.trim().is_empty() {
        return Err(AuthError::Server("No token received".to_string()));
    }
    Ok(Session::new(
        SecretString::from(response.token),
        response.user,
    ))
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    #[instrument(skip_all)]
    async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let request = LoginRequest {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };
        let response: AuthResponse = self
            .api
            .post_json_anonymous(LOGIN_PATH, &request)
            .await
            .map_err(AuthError::from_credentials_call)?;

        into_session(response)
    }

    #[instrument(skip_all)]
    async fn register(&self, form: &RegistrationForm) -> Result<Session, AuthError> {
        let response: AuthResponse = self
            .api
            .post_json_anonymous(REGISTER_PATH, &form.to_request())
            .await
            .map_err(AuthError::from_credentials_call)?;

        into_session(response)
    }

    #[instrument(skip_all)]
    async fn profile(&self, token: &SecretString) -> Result<UserSummary, AuthError> {
        let response: ProfileResponse = self
            .api
            .get_json_with_token(PROFILE_PATH, token)
            .await
            .map_err(AuthError::from_session_call)?;

        Ok(response.into())
    }

    #[instrument(skip(self, token))]
    async fn set_role(
        &self,
        token: &SecretString,
        role: Role,
    ) -> Result<SetRoleResponse, AuthError> {
        self.api
            .post_json_with_token(SET_ROLE_PATH, &SetRoleRequest { role }, token)
            .await
            .map_err(AuthError::from_session_call)
    }
}
