use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.flickr.com/services/feeds/photos_public.gne";
pub const DEFAULT_USER_AGENT: &str = "SearchFlickr/0.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for the HTTP feed client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FeedConfig {
    /// Builds a config from the defaults, overridden by
    /// SEARCHFLICKR_FEED_URL, SEARCHFLICKR_USER_AGENT and SEARCHFLICKR_TIMEOUT_SECS
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("SEARCHFLICKR_FEED_URL").filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(agent) = lookup("SEARCHFLICKR_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            config.user_agent = agent.trim().to_string();
        }
        if let Some(secs) = lookup("SEARCHFLICKR_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid SEARCHFLICKR_TIMEOUT_SECS value: {}", secs))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
