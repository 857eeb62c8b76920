//! HTTP client for the marketplace API with consistent timeouts, bearer
//! attachment and error translation. Feature clients go through these helpers
//! so every authenticated request carries the stored token and every `401`
//! reaches the session as a forced logout. Tokens are attached as headers and
//! never logged.

mod errors;

pub use errors::ApiError;

use crate::{auth::SessionHandle, config::AppConfig, APP_USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

/// Which token, if any, goes into the `Authorization` header.
enum Bearer<'a> {
    /// Whatever the session store currently holds.
    Stored,
    /// A token the caller already holds, e.g. during restoration.
    Explicit(&'a SecretString),
    /// Nothing, for login and registration.
    Anonymous,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: AppConfig,
    session: SessionHandle,
}

impl ApiClient {
    /// Builds the client with the configured timeout and user agent.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: AppConfig, session: SessionHandle) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            config,
            session,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Fetches JSON with the stored bearer token.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.build_url(path)?;
        let response = self.send(Method::GET, url, None::<&()>, Bearer::Stored).await?;
        handle_json_response(response).await
    }

    /// Fetches JSON with query parameters and the stored bearer token.
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut url = self.build_url(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        let response = self.send(Method::GET, url, None::<&()>, Bearer::Stored).await?;
        handle_json_response(response).await
    }

    /// Fetches JSON with a caller-supplied token instead of the stored one.
    pub async fn get_json_with_token<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path)?;
        let response = self
            .send(Method::GET, url, None::<&()>, Bearer::Explicit(token))
            .await?;
        handle_json_response(response).await
    }

    /// Posts JSON with the stored bearer token and parses a JSON response.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path)?;
        let response = self.send(Method::POST, url, Some(body), Bearer::Stored).await?;
        handle_json_response(response).await
    }

    /// Puts JSON with the stored bearer token and parses a JSON response.
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path)?;
        let response = self.send(Method::PUT, url, Some(body), Bearer::Stored).await?;
        handle_json_response(response).await
    }

    /// Posts JSON with a caller-supplied token and parses a JSON response.
    pub async fn post_json_with_token<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: &SecretString,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path)?;
        let response = self
            .send(Method::POST, url, Some(body), Bearer::Explicit(token))
            .await?;
        handle_json_response(response).await
    }

    /// Posts JSON without any bearer token. Used for login and registration so
    /// a rejected attempt cannot be mistaken for an expired session.
    pub async fn post_json_anonymous<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path)?;
        let response = self
            .send(Method::POST, url, Some(body), Bearer::Anonymous)
            .await?;
        handle_json_response(response).await
    }

    /// Sends a DELETE with the stored bearer token and ignores the body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.build_url(path)?;
        let response = self
            .send(Method::DELETE, url, None::<&()>, Bearer::Stored)
            .await?;
        handle_empty_response(response).await
    }

    fn build_url(&self, path: &str) -> Result<Url, ApiError> {
        self.config
            .endpoint_url(path)
            .map_err(|err| ApiError::Config(err.to_string()))
    }

    /// Sends a request, attaching the bearer token and reporting `401`s on
    /// bearer requests to the session.
    #[instrument(skip(self, url, body, bearer), fields(url = %url))]
    async fn send<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        bearer: Bearer<'_>,
    ) -> Result<Response, ApiError> {
        // read before the token so a session replaced mid-flight is not expired
        let generation = self.session.generation();

        let token = match bearer {
            Bearer::Stored => self
                .session
                .stored_token()
                .map_err(|err| ApiError::Storage(err.to_string()))?,
            Bearer::Explicit(token) => Some(token.clone()),
            Bearer::Anonymous => None,
        };

        let mut builder: RequestBuilder = self.http.request(method, url);
        if let Some(token) = &token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))?;
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let response = builder.send().await.map_err(map_request_error)?;
        debug!("response status: {}", response.status());

        if response.status() == StatusCode::UNAUTHORIZED && token.is_some() {
            warn!("Bearer token rejected by the API");
            self.session.expire(generation).await;
        }

        Ok(response)
    }
}

/// Maps transport errors into user-facing `ApiError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Config(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(error_from_response(response).await)
    }
}

/// Handles responses whose body is not needed.
async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ApiError::Http {
        status,
        message: error_message(&body),
    }
}

/// Prefers the `message` or `error` field of a JSON error body, falling back
/// to the trimmed and truncated raw body.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "error"]
            .iter()
            .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    sanitize_body(from_json.as_deref().unwrap_or(body))
}

fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
