//! Client configuration (defaults, environment overlay).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Which credential scheme the deployment issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScheme {
    /// Short-lived access token plus refresh token.
    #[default]
    Dual,
    /// One long-lived token; no refresh step, any 401 ends the session.
    Single,
}

impl FromStr for TokenScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dual" => Ok(TokenScheme::Dual),
            "single" => Ok(TokenScheme::Single),
            other => Err(format!("unknown token scheme '{other}' (expected dual or single)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API, without the `/api/v1` prefix.
    pub api_url: String,
    /// Where the route guard sends unauthenticated users.
    pub login_path: String,
    /// Where the route guard sends authenticated users lacking a role.
    pub access_denied_path: String,
    pub token_scheme: TokenScheme,
    pub request_timeout_secs: u64,
    /// Refresh this many seconds before the declared expiry.
    pub expiry_skew_secs: i64,
    /// Location of the durable credential file; platform default when unset.
    pub credential_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            login_path: "/login".to_string(),
            access_denied_path: "/unauthorized".to_string(),
            token_scheme: TokenScheme::Dual,
            request_timeout_secs: 30,
            expiry_skew_secs: 30,
            credential_path: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    pub fn with_token_scheme(mut self, scheme: TokenScheme) -> Self {
        self.token_scheme = scheme;
        self
    }

    /// Defaults overlaid with `SESSIONGATE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable lookup.
    ///
    /// Invalid values are reported and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SESSIONGATE_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("SESSIONGATE_TOKEN_SCHEME") {
            match raw.parse() {
                Ok(scheme) => config.token_scheme = scheme,
                Err(err) => tracing::warn!("SESSIONGATE_TOKEN_SCHEME ignored: {err}"),
            }
        }

        if let Some(raw) = lookup("SESSIONGATE_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "SESSIONGATE_TIMEOUT_SECS ignored: expected a positive integer"),
            }
        }

        if let Some(path) = lookup("SESSIONGATE_CREDENTIAL_PATH").filter(|v| !v.trim().is_empty()) {
            config.credential_path = Some(PathBuf::from(path));
        }

        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn expiry_skew(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.expiry_skew_secs.max(0))
    }
}
