//! HTTP transport seam.
//!
//! The lifecycle manager talks to the API through [`Transport`] so the
//! attach-and-retry protocol can be exercised without a network. The
//! production implementation is [`ReqwestTransport`].

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use sessiongate_core::AuthError;

use crate::ClientConfig;

/// `Send + Sync` on native targets; no bound in the browser, where
/// everything runs on the single UI thread.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A request relative to the API base URL.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, TransportError> {
        let value = serde_json::to_value(body)
            .map_err(|e| TransportError::InvalidRequest(format!("failed to encode body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

impl core::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("has_body", &self.body.is_some())
            .field("authenticated", &self.bearer.is_some())
            .finish()
    }
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json_value(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AuthError> {
        serde_json::from_slice(&self.body).map_err(|e| AuthError::decode(e.to_string()))
    }

    /// The server's `{error}` message, or a generic one when the body has none.
    pub fn error_message(&self) -> String {
        serde_json::from_slice::<ErrorBody>(&self.body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("request failed with status {}", self.status))
    }

    /// Convert a non-2xx response into the error taxonomy.
    pub fn into_error(self) -> AuthError {
        AuthError::from_status(self.status, self.error_message())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<TransportError> for AuthError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::InvalidRequest(msg) => AuthError::validation(msg),
            other => AuthError::network(other.to_string()),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Transport: MaybeSendSync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// `reqwest`-backed transport against `ClientConfig::api_url`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout());

        let client = builder
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut req = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(map_reqwest_error)?;

        tracing::debug!(path = %request.path, status, "api response");
        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_prefers_server_text() {
        let resp = ApiResponse::json_value(409, &json!({ "error": "Username or email already exists" }));
        assert_eq!(resp.error_message(), "Username or email already exists");
        assert_eq!(
            resp.into_error(),
            AuthError::conflict("Username or email already exists")
        );

        let bare = ApiResponse::new(502, "<html>bad gateway</html>");
        assert_eq!(bare.error_message(), "request failed with status 502");
    }

    #[test]
    fn request_debug_hides_bearer() {
        let req = ApiRequest::get("/api/v1/auth/me").bearer("very-secret");
        assert!(!format!("{req:?}").contains("very-secret"));
    }

    #[test]
    fn transport_errors_map_to_network() {
        assert_eq!(
            AuthError::from(TransportError::Timeout),
            AuthError::network("request timed out")
        );
    }
}
