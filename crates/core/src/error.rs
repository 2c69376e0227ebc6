//! Session/authorization error model.

use thiserror::Error;

/// Result type used across the session layer.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failure taxonomy shared by the lifecycle manager, the route guard and the
/// admin client.
///
/// `Unauthenticated` and `SessionExpired` are terminal for the current
/// session: callers must send the user back through login instead of
/// retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login was rejected (bad username/password or disabled account).
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The server rejected the request payload.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Duplicate username/email, role name, etc.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No credential is held, or the server rejected it outright.
    #[error("not authenticated")]
    Unauthenticated,

    /// The access token expired and could not be renewed.
    #[error("session expired; sign in again")]
    SessionExpired,

    /// Valid session, insufficient role or permission.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Transport failure (DNS, connect, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// Any other non-2xx response, with the server's `error` message.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The credential store could not be read or written.
    #[error("credential storage failed: {0}")]
    Storage(String),
}

impl AuthError {
    pub fn invalid_credentials(msg: impl Into<String>) -> Self {
        Self::InvalidCredentials(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Map a non-2xx HTTP status and its `{error}` message onto the taxonomy.
    ///
    /// Operation-specific overrides (e.g. 401 on login meaning
    /// `InvalidCredentials`) are applied by the caller.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => Self::Validation(message),
            401 => Self::Unauthenticated,
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Server { status, message },
        }
    }

    /// True when the only way forward is a fresh login.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::SessionExpired)
    }

    /// True for failures that say something about the session itself
    /// (as opposed to the request).
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials(_) | Self::Unauthenticated | Self::SessionExpired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(AuthError::from_status(400, "bad"), AuthError::validation("bad"));
        assert_eq!(AuthError::from_status(401, "expired"), AuthError::Unauthenticated);
        assert_eq!(AuthError::from_status(403, "nope"), AuthError::forbidden("nope"));
        assert_eq!(AuthError::from_status(404, "gone"), AuthError::not_found("gone"));
        assert_eq!(AuthError::from_status(409, "dup"), AuthError::conflict("dup"));
        assert_eq!(
            AuthError::from_status(502, "upstream"),
            AuthError::Server { status: 502, message: "upstream".to_string() }
        );
    }

    #[test]
    fn only_session_failures_require_login() {
        assert!(AuthError::SessionExpired.requires_login());
        assert!(AuthError::Unauthenticated.requires_login());
        assert!(!AuthError::forbidden("admin").requires_login());
        assert!(!AuthError::network("reset").requires_login());
        assert!(!AuthError::validation("email").is_auth_failure());
    }
}
