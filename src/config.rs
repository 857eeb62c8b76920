//! Client configuration for the marketplace API and local session state.
//! Values come from CLI arguments or their `SAFIRI_*` environment fallbacks.
//! Configuration is public; do not store secrets here.

use anyhow::{anyhow, Result};
use std::{env, path::PathBuf, time::Duration};
use url::Url;

/// Default API base, including the `/api` prefix the backend mounts its routes under.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
/// Default request timeout (seconds) applied to every API call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Directory name used under `$HOME` for persisted session state.
const STATE_DIR_NAME: &str = ".safiri";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub state_dir: PathBuf,
    pub timeout: Duration,
}

impl AppConfig {
    /// Builds a config from an API base URL, validating the scheme.
    ///
    /// # Errors
    /// Returns an error if the URL cannot be parsed or is not http(s).
    pub fn new(api_base_url: &str) -> Result<Self> {
        let api_base_url = parse_base_url(api_base_url)?;

        Ok(Self {
            api_base_url,
            state_dir: default_state_dir(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    #[must_use]
    pub fn with_state_dir(mut self, state_dir: PathBuf) -> Self {
        self.state_dir = state_dir;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Joins an endpoint path onto the base URL without doubling slashes.
    ///
    /// # Errors
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        let base = self.api_base_url.as_str().trim_end_matches('/');
        let path = path.trim().trim_start_matches('/');

        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };

        Url::parse(&joined).map_err(|e| anyhow!("Error parsing URL {joined}: {e}"))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| anyhow!("Error parsing URL {raw}: {e}"))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(anyhow!("Error parsing URL: unsupported scheme {}", scheme)),
    }

    if url.host().is_none() {
        return Err(anyhow!("Error parsing URL: no host specified"));
    }

    Ok(url)
}

fn default_state_dir() -> PathBuf {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map_or_else(|| PathBuf::from(STATE_DIR_NAME), |home| PathBuf::from(home).join(STATE_DIR_NAME))
}
