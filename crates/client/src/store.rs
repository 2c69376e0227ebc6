//! Credential store backends.
//!
//! The store is the only durable client state. It is written exclusively by
//! the session manager; every write is a whole-value replace or a clear.

#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

use sessiongate_auth::Credential;
use sessiongate_core::AuthError;

use crate::transport::MaybeSendSync;

/// Fixed storage keys (also the JSON field names of the credential file).
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const EXPIRES_AT_KEY: &str = "expires_at";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored credential is unreadable: {0}")]
    Corrupt(String),
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        AuthError::storage(value.to_string())
    }
}

pub trait CredentialStore: MaybeSendSync {
    fn get(&self) -> Result<Option<Credential>, StoreError>;

    /// Atomically replace the stored credential.
    fn set(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Remove any stored credential. Idempotent.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            inner: RwLock::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<Credential>, StoreError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        *guard = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// JSON file in the platform data directory, readable only by the owner.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/sessiongate/credentials.json`.
    pub fn default_location() -> Result<PathBuf, StoreError> {
        let base = dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut h| {
                    h.push(".local");
                    h.push("share");
                    h
                })
            })
            .ok_or_else(|| {
                StoreError::Unavailable(
                    "failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share"
                        .to_string(),
                )
            })?;

        Ok(base.join("sessiongate").join("credentials.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        use std::io::Write;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<Credential>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let credential: Credential =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(credential.is_authenticated().then_some(credential))
    }

    fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let bytes =
            serde_json::to_vec(credential).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        // Write beside the target, then rename over it.
        let tmp = self.path.with_extension("json.tmp");
        Self::write_private(&tmp, &bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Browser `localStorage`, scoped to the page origin.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageCredentialStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageCredentialStore {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        let window = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("localStorage denied: {e:?}")))?
            .ok_or_else(|| StoreError::Unavailable("localStorage missing".to_string()))
    }

    fn js_err(e: wasm_bindgen::JsValue) -> StoreError {
        StoreError::Unavailable(format!("{e:?}"))
    }
}

#[cfg(target_arch = "wasm32")]
impl CredentialStore for LocalStorageCredentialStore {
    fn get(&self) -> Result<Option<Credential>, StoreError> {
        let storage = Self::storage()?;
        let access = storage.get_item(ACCESS_TOKEN_KEY).map_err(Self::js_err)?;
        let Some(access) = access.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let refresh = storage
            .get_item(REFRESH_TOKEN_KEY)
            .map_err(Self::js_err)?
            .filter(|t| !t.is_empty());
        let expires_at = storage
            .get_item(EXPIRES_AT_KEY)
            .map_err(Self::js_err)?
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0));

        Ok(Some(Credential {
            access_token: access,
            refresh_token: refresh,
            expires_at,
        }))
    }

    fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        storage
            .set_item(ACCESS_TOKEN_KEY, &credential.access_token)
            .map_err(Self::js_err)?;
        match &credential.refresh_token {
            Some(token) => storage.set_item(REFRESH_TOKEN_KEY, token),
            None => storage.remove_item(REFRESH_TOKEN_KEY),
        }
        .map_err(Self::js_err)?;
        match credential.expires_at {
            Some(at) => storage.set_item(EXPIRES_AT_KEY, &at.timestamp().to_string()),
            None => storage.remove_item(EXPIRES_AT_KEY),
        }
        .map_err(Self::js_err)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, EXPIRES_AT_KEY] {
            storage.remove_item(key).map_err(Self::js_err)?;
        }
        Ok(())
    }
}
