//! `sessiongate-client` — the session layer a browser (or CLI) front end
//! talks through.
//!
//! - [`store`]: durable credential storage
//! - [`session`]: login/logout and the refresh-and-retry request protocol
//! - [`guard`]: per-navigation route gating
//! - [`menu`]: server-declared navigation and feature flags
//! - [`admin`]: user, role and permission administration
//!
//! Native builds use a JSON file in the platform data directory and
//! `reqwest` over `tokio`; `wasm32` builds use `localStorage` and
//! `reqwest`'s `fetch` backend.

pub mod admin;
pub mod config;
pub mod dto;
pub mod guard;
pub mod menu;
pub mod session;
pub mod store;
pub mod transport;

#[cfg(test)]
mod testing;

pub use admin::{AdminClient, PermissionSelection, RoleSelection, Selection};
pub use config::{ClientConfig, DEFAULT_API_URL, TokenScheme};
pub use dto::{Registration, UserPage, UserQuery, UserUpdate};
pub use guard::{GuardOutcome, GuardState, Navigator, Redirect, RouteGuard, RouteRequirement};
pub use menu::{CatalogDrift, MenuResolver, catalog_drift};
pub use session::SessionManager;
pub use store::{CredentialStore, MemoryCredentialStore, StoreError};
pub use transport::{
    ApiRequest, ApiResponse, Method, ReqwestTransport, Transport, TransportError,
};

#[cfg(not(target_arch = "wasm32"))]
pub use store::FileCredentialStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageCredentialStore;
