//! Token lifecycle manager.
//!
//! `SessionManager` is the explicit session context: create one at startup,
//! share it (`Arc`) with everything that needs authenticated calls, and let
//! `logout` tear the session down. It is the only writer of the credential
//! store.
//!
//! ## Authenticated-request protocol
//!
//! Every authenticated call carries `Authorization: Bearer <access>`. On a
//! 401 the manager refreshes exactly once and, if that succeeds, retries the
//! original request exactly once. A failed refresh or a second 401 clears
//! the credential and yields `SessionExpired`. The refresh always completes
//! before the retry is issued; the protocol never loops.
//!
//! Refreshes are serialised behind `refresh_gate`. A caller that queued
//! behind another refresh and then finds a different access token in the
//! store reuses it instead of spending the refresh token again.

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use sessiongate_auth::{Credential, User};
use sessiongate_core::{AuthError, AuthResult};

use crate::ClientConfig;
use crate::TokenScheme;
use crate::dto::{
    self, AuthResponse, LoginRequest, LogoutRequest, RefreshRequest, RefreshResponse,
    Registration, UserEnvelope,
};
use crate::store::CredentialStore;
use crate::transport::{ApiRequest, ApiResponse, Transport};

pub struct SessionManager {
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    refresh_gate: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            store,
            transport,
            refresh_gate: Mutex::new(()),
        }
    }

    /// File-backed store and `reqwest` transport, as configured.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_config(config: ClientConfig) -> AuthResult<Self> {
        let path = match &config.credential_path {
            Some(path) => path.clone(),
            None => crate::store::FileCredentialStore::default_location()?,
        };
        let store = Arc::new(crate::store::FileCredentialStore::new(path));
        let transport = Arc::new(crate::transport::ReqwestTransport::new(&config)?);
        Ok(Self::new(config, store, transport))
    }

    /// `localStorage` store and `fetch`-backed `reqwest` transport.
    #[cfg(target_arch = "wasm32")]
    pub fn from_config(config: ClientConfig) -> AuthResult<Self> {
        let store = Arc::new(crate::store::LocalStorageCredentialStore);
        let transport = Arc::new(crate::transport::ReqwestTransport::new(&config)?);
        Ok(Self::new(config, store, transport))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The stored credential, if any.
    pub fn credential(&self) -> AuthResult<Option<Credential>> {
        Ok(self.store.get()?.filter(Credential::is_authenticated))
    }

    /// Client-side belief only: a stored access token exists.
    pub fn is_authenticated(&self) -> bool {
        match self.credential() {
            Ok(credential) => credential.is_some(),
            Err(err) => {
                tracing::warn!("credential store unreadable; treating as signed out: {err}");
                false
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle operations
    // ─────────────────────────────────────────────────────────────────────

    /// Exchange username/password for a credential pair.
    ///
    /// The store is only written on success.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<User> {
        let request = ApiRequest::post(dto::LOGIN_PATH).json(&LoginRequest { username, password })?;
        let resp = self.transport.send(request).await?;

        if !resp.is_success() {
            let err = match resp.status {
                401 => AuthError::invalid_credentials(resp.error_message()),
                _ => resp.into_error(),
            };
            tracing::info!(username, "login rejected: {err}");
            return Err(err);
        }

        self.accept_auth_response(&resp)
    }

    pub async fn register(&self, profile: &Registration) -> AuthResult<User> {
        profile.validate()?;

        let request = ApiRequest::post(dto::REGISTER_PATH).json(profile)?;
        let resp = self.transport.send(request).await?;

        if !resp.is_success() {
            let err = resp.into_error();
            tracing::info!(username = %profile.username, "registration rejected: {err}");
            return Err(err);
        }

        self.accept_auth_response(&resp)
    }

    fn accept_auth_response(&self, resp: &ApiResponse) -> AuthResult<User> {
        let (credential, user) = resp
            .json::<AuthResponse>()?
            .into_parts(self.config.token_scheme)?;
        self.store.set(&credential)?;
        tracing::info!(user_id = %user.id, username = %user.username, "session established");
        Ok(user)
    }

    /// Fresh snapshot of the signed-in user. Never served from a cache:
    /// roles may have changed server-side.
    pub async fn current_user(&self) -> AuthResult<User> {
        let envelope: UserEnvelope = self.request_json(ApiRequest::get(dto::ME_PATH)).await?;
        Ok(envelope.user)
    }

    /// Best-effort server notification; local credentials are cleared no
    /// matter what the server (or the network) does.
    pub async fn logout(&self) {
        match self.store.get() {
            Ok(Some(credential)) => {
                let body = LogoutRequest {
                    refresh_token: credential.refresh_token.as_deref(),
                };
                let outcome = match ApiRequest::post(dto::LOGOUT_PATH)
                    .bearer(credential.access_token.clone())
                    .json(&body)
                {
                    Ok(request) => self.transport.send(request).await.map_err(AuthError::from),
                    Err(err) => Err(err.into()),
                };
                report_best_effort("logout", outcome);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!("credential store unreadable during logout: {err}"),
        }

        self.clear_credentials();
        tracing::info!("logged out");
    }

    /// Revoke every session of this user server-side, then clear locally.
    pub async fn logout_all(&self) {
        let outcome = self.send_authenticated(ApiRequest::post(dto::LOGOUT_ALL_PATH)).await;
        report_best_effort("logout-all", outcome);

        self.clear_credentials();
        tracing::info!("logged out of all sessions");
    }

    /// Trade the stored refresh token for a new pair.
    ///
    /// Any failure clears the credential and returns `false`; there is no
    /// partially refreshed state.
    pub async fn refresh_access_token(&self) -> bool {
        self.refresh_after(None).await
    }

    /// Drop the local credential. Idempotent.
    pub fn clear_credentials(&self) {
        if let Err(err) = self.store.clear() {
            tracing::error!("failed to clear stored credentials: {err}");
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authenticated-request protocol
    // ─────────────────────────────────────────────────────────────────────

    /// Send `request` with the stored bearer token, refreshing and retrying
    /// at most once.
    ///
    /// Non-401 responses (including other errors) are returned as-is.
    pub async fn send_authenticated(&self, request: ApiRequest) -> AuthResult<ApiResponse> {
        let credential = self.credential()?.ok_or(AuthError::Unauthenticated)?;
        let refreshable = self.config.token_scheme == TokenScheme::Dual;
        let path = request.path.clone();

        let mut token = credential.access_token.clone();
        let mut refreshed = false;

        if refreshable && credential.is_expired(Utc::now(), self.config.expiry_skew()) {
            tracing::debug!(%path, "access token past expiry; refreshing before send");
            token = self.renew(&token, &path).await?;
            refreshed = true;
        }

        let resp = self.transport.send(request.clone().bearer(token.clone())).await?;
        if !resp.is_unauthorized() {
            return Ok(resp);
        }

        if !refreshable || refreshed {
            return Err(self.expire_session(&path));
        }

        tracing::debug!(%path, "access token rejected; refreshing once");
        let token = self.renew(&token, &path).await?;

        let retry = self.transport.send(request.bearer(token)).await?;
        if retry.is_unauthorized() {
            return Err(self.expire_session(&path));
        }
        Ok(retry)
    }

    /// Authenticated call that expects a 2xx JSON body.
    pub async fn request_json<T: DeserializeOwned>(&self, request: ApiRequest) -> AuthResult<T> {
        let resp = self.send_authenticated(request).await?;
        if !resp.is_success() {
            return Err(resp.into_error());
        }
        resp.json()
    }

    async fn renew(&self, stale: &str, path: &str) -> AuthResult<String> {
        if !self.refresh_after(Some(stale)).await {
            return Err(self.expire_session(path));
        }
        self.credential()?
            .map(|c| c.access_token)
            .ok_or(AuthError::SessionExpired)
    }

    fn expire_session(&self, path: &str) -> AuthError {
        tracing::warn!(path, "session expired; credentials cleared");
        self.clear_credentials();
        AuthError::SessionExpired
    }

    /// Refresh unless the stored token already moved on from `stale`.
    async fn refresh_after(&self, stale: Option<&str>) -> bool {
        let _gate = self.refresh_gate.lock().await;

        let current = match self.credential() {
            Ok(Some(current)) => current,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!("cannot read credential for refresh: {err}");
                self.clear_credentials();
                return false;
            }
        };

        if stale.is_some_and(|stale| stale != current.access_token) {
            tracing::debug!("access token already renewed by a concurrent refresh");
            return true;
        }

        if self.config.token_scheme == TokenScheme::Single {
            tracing::debug!("single-token scheme has no refresh step");
            self.clear_credentials();
            return false;
        }

        let Some(refresh_token) = current.refresh_token.filter(|t| !t.is_empty()) else {
            tracing::warn!("no refresh token stored; cannot renew session");
            self.clear_credentials();
            return false;
        };

        let renewed = match self.exchange_refresh_token(&refresh_token).await {
            Ok(next) => self.store.set(&next).map_err(AuthError::from),
            Err(err) => Err(err),
        };

        match renewed {
            Ok(()) => {
                tracing::info!("access token refreshed");
                true
            }
            Err(err) => {
                tracing::warn!("token refresh failed: {err}");
                self.clear_credentials();
                false
            }
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> AuthResult<Credential> {
        let request = ApiRequest::post(dto::REFRESH_PATH).json(&RefreshRequest { refresh_token })?;
        let resp = self.transport.send(request).await?;
        if !resp.is_success() {
            return Err(resp.into_error());
        }

        let body: RefreshResponse = resp.json()?;
        // Servers that do not rotate refresh tokens omit the field.
        let refresh = body.refresh_token.or_else(|| Some(refresh_token.to_string()));
        dto::credential_from(body.access_token, refresh, body.expires_at, TokenScheme::Dual)
    }
}

fn report_best_effort(operation: &str, outcome: AuthResult<ApiResponse>) {
    match outcome {
        Ok(resp) if resp.is_success() => tracing::debug!(operation, "server acknowledged"),
        Ok(resp) => tracing::warn!(
            operation,
            status = resp.status,
            "server rejected request: {}",
            resp.error_message()
        ),
        Err(err) => tracing::warn!(operation, "server unreachable: {err}"),
    }
}
