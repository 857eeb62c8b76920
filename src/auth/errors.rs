use crate::{api::ApiError, auth::storage::StorageError};
use thiserror::Error;

/// Errors returned to forms. Every message is safe to show to the user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("Unable to reach the server. Check your connection and try again. ({0})")]
    NetworkUnavailable(String),
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,
    #[error("You need to sign in first.")]
    NotAuthenticated,
    #[error("{0}")]
    Validation(String),
    #[error("The server could not complete the request: {0}")]
    Server(String),
    #[error("Could not access saved session: {0}")]
    Storage(String),
    #[error("The session manager has been shut down.")]
    Disposed,
}

impl AuthError {
    /// Translates failures of anonymous calls (login, register). Any 4xx is a
    /// rejection of what the user typed.
    #[must_use]
    pub fn from_credentials_call(err: ApiError) -> Self {
        match err {
            ApiError::Http { status, message } if (400..500).contains(&status) => {
                Self::InvalidCredentials(message)
            }
            other => Self::from_common(other),
        }
    }

    /// Translates failures of bearer calls. A 401 means the token is no longer
    /// accepted.
    #[must_use]
    pub fn from_session_call(err: ApiError) -> Self {
        match err {
            ApiError::Http { status: 401, .. } => Self::SessionExpired,
            ApiError::Http { status, message } if (400..500).contains(&status) => {
                Self::Validation(message)
            }
            other => Self::from_common(other),
        }
    }

    /// True when the backend judged the token or request and refused it (a
    /// 4xx), as opposed to failing to answer.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired | Self::InvalidCredentials(_) | Self::Validation(_)
        )
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_))
    }

    fn from_common(err: ApiError) -> Self {
        match err {
            ApiError::Network(message) | ApiError::Timeout(message) => {
                Self::NetworkUnavailable(message)
            }
            ApiError::Storage(message) => Self::Storage(message),
            ApiError::Invalid(message) => Self::Validation(message),
            ApiError::Http { message, .. } => Self::Server(message),
            other @ (ApiError::Config(_) | ApiError::Parse(_) | ApiError::Serialization(_)) => {
                Self::Server(other.to_string())
            }
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
