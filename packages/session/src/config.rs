//! Session configuration, populated from environment variables.

use std::time::Duration;

use biolink::{default_themes, Theme};

use crate::store::{CookieAttributes, SameSite};

/// Errors from [`SessionConfig::try_from_env`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BIOLINK_THEMES is not a valid theme list: {0}")]
    Themes(#[from] serde_json::Error),
}

/// Runtime configuration for a session manager.
///
/// All fields are populated from environment variables with sensible
/// defaults, so a manager can be started with zero configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `BIOLINK_HUB_ENDPOINT` | `https://hub.rss3.io` | Hub base URL |
/// | `BIOLINK_ROOT_DOMAIN` | `rss3.bio` | Cookie scope (`.` + domain) |
/// | `BIOLINK_COOKIE_EXPIRES_DAYS` | `365` | Lifetime of the persisted session |
/// | `BIOLINK_ACTIVITY_ENDPOINT` | `https://poap-activity.rss3.bio` | Claim service base URL |
/// | `BIOLINK_STORE` | (absent = in-memory) | Path to the SQLite session store |
/// | `BIOLINK_HTTP_TIMEOUT_SECS` | `30` | Per-request HTTP timeout |
/// | `BIOLINK_THEMES` | Loot theme | JSON array of `{name, class, nftIdPrefix}` |
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Hub base URL, without a trailing slash.
    pub hub_endpoint: String,

    /// Root domain the session cookies are scoped to.
    pub root_domain: String,

    /// How long a persisted session stays valid.
    pub cookie_expires_days: i64,

    /// Base URL of the activity (claim) service.
    pub activity_endpoint: String,

    /// Path to the SQLite session store.
    /// `None` means the record lives in memory and is lost on exit.
    pub store_path: Option<String>,

    pub http_timeout: Duration,

    /// Themes in display-priority order.
    pub themes: Vec<Theme>,
}

impl SessionConfig {
    /// Build a config for `hub_endpoint` with every other field defaulted.
    pub fn new(hub_endpoint: impl Into<String>, root_domain: impl Into<String>) -> Self {
        Self {
            hub_endpoint: hub_endpoint.into().trim_end_matches('/').to_string(),
            root_domain: root_domain.into(),
            cookie_expires_days: 365,
            activity_endpoint: "https://poap-activity.rss3.bio".into(),
            store_path: None,
            http_timeout: Duration::from_secs(30),
            themes: default_themes(),
        }
    }

    /// Populate config from environment variables, applying defaults where
    /// absent. A malformed `BIOLINK_THEMES` falls back to the default themes.
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|e| {
            tracing::warn!("config: {e}; using default themes");
            let mut config = Self::base_from_env();
            config.themes = default_themes();
            config
        })
    }

    /// Like [`from_env`](Self::from_env) but reports a malformed theme list.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let mut config = Self::base_from_env();
        if let Ok(raw) = std::env::var("BIOLINK_THEMES") {
            config.themes = serde_json::from_str(&raw)?;
        }
        Ok(config)
    }

    fn base_from_env() -> Self {
        let mut config = Self::new(
            std::env::var("BIOLINK_HUB_ENDPOINT").unwrap_or_else(|_| "https://hub.rss3.io".into()),
            std::env::var("BIOLINK_ROOT_DOMAIN").unwrap_or_else(|_| "rss3.bio".into()),
        );

        config.cookie_expires_days = std::env::var("BIOLINK_COOKIE_EXPIRES_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(365);

        if let Ok(activity) = std::env::var("BIOLINK_ACTIVITY_ENDPOINT") {
            config.activity_endpoint = activity;
        }

        config.store_path = std::env::var("BIOLINK_STORE").ok();

        config.http_timeout = Duration::from_secs(
            std::env::var("BIOLINK_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        );

        config
    }

    /// Attributes for the persisted session cookies.
    pub fn cookie_attributes(&self) -> CookieAttributes {
        CookieAttributes {
            domain: format!(".{}", self.root_domain),
            secure: true,
            same_site: SameSite::Strict,
            expires_in: chrono::Duration::try_days(self.cookie_expires_days)
                .unwrap_or_else(|| chrono::Duration::days(365)),
        }
    }

    /// A `reqwest::Client` honouring [`http_timeout`](Self::http_timeout).
    pub fn http_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("config: falling back to default HTTP client: {e}");
                reqwest::Client::new()
            })
    }
}
