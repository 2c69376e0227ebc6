use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The client-held access/refresh credential pair.
///
/// A present access token means "authenticated" from the client's point of
/// view; only a request round-trip can prove otherwise.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    /// Absent under the single-token scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: Some(refresh_token.into()),
            expires_at: None,
        }
    }

    /// A single long-lived token with no refresh capability.
    pub fn access_only(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// True once `now + skew` reaches the declared expiry. Unknown expiry is
    /// never considered expired.
    pub fn is_expired(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => now + skew >= expires_at,
            None => false,
        }
    }
}

// Tokens never appear in logs.
impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
