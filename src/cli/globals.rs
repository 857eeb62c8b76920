use crate::config::AppConfig;
use anyhow::Result;
use std::{path::PathBuf, time::Duration};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub state_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            state_dir: None,
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// # Errors
    /// Returns an error if the API URL is invalid.
    pub fn config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::new(&self.api_url)?.with_timeout(self.timeout);
        if let Some(dir) = &self.state_dir {
            config = config.with_state_dir(dir.clone());
        }
        Ok(config)
    }
}
