//! Route guard: the single place that turns session state into a
//! navigation decision.
//!
//! Each `check` is one pass of the state machine
//! `Checking -> {Unauthenticated, Forbidden, Authorized}`. A check that is
//! superseded (a newer `check`, or `cancel` on unmount) resolves
//! [`GuardOutcome::Abandoned`] and leaves credentials and navigation alone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use url::form_urlencoded;

use sessiongate_auth::{User, has_role};

use crate::ClientConfig;
use crate::session::SessionManager;
use crate::transport::MaybeSendSync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Unauthenticated,
    Forbidden,
    Authorized,
}

/// Where the guard sends the user when access is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// No usable session; carries the path to come back to after login.
    Login { return_to: String },
    /// Valid session, insufficient role.
    AccessDenied { required_role: String },
}

impl Redirect {
    pub fn location(&self, config: &ClientConfig) -> String {
        match self {
            Redirect::Login { return_to } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("redirect", return_to)
                    .finish();
                format!("{}?{}", config.login_path, query)
            }
            Redirect::AccessDenied { .. } => config.access_denied_path.clone(),
        }
    }
}

/// Performs the redirect side effect (router push, `window.location`, or a
/// printed hint on the command line).
pub trait Navigator: MaybeSendSync {
    fn navigate(&self, redirect: &Redirect, location: &str);
}

/// What a route demands before its content may render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequirement {
    pub path: String,
    pub required_role: Option<String>,
}

impl RouteRequirement {
    pub fn authenticated(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required_role: None,
        }
    }

    pub fn role(path: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required_role: Some(role.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the route. Carries the freshly fetched user when a role check
    /// required one.
    Authorized(Option<User>),
    Unauthenticated(Redirect),
    Forbidden(Redirect),
    /// Superseded while checking; nothing was changed.
    Abandoned,
}

impl GuardOutcome {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GuardOutcome::Authorized(_))
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            GuardOutcome::Unauthenticated(r) | GuardOutcome::Forbidden(r) => Some(r),
            _ => None,
        }
    }
}

pub struct RouteGuard {
    session: Arc<SessionManager>,
    navigator: Arc<dyn Navigator>,
    epoch: AtomicU64,
    state: Mutex<GuardState>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionManager>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            navigator,
            epoch: AtomicU64::new(0),
            state: Mutex::new(GuardState::Checking),
        }
    }

    pub fn state(&self) -> GuardState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invalidate any in-flight check (navigation away, unmount).
    pub fn cancel(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Run the guard for one navigation. Never caches a previous
    /// `Authorized`: every call re-reads the session.
    pub async fn check(&self, route: &RouteRequirement) -> GuardOutcome {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.enter(epoch, GuardState::Checking);

        let signed_in = match self.session.credential() {
            Ok(credential) => credential.is_some(),
            Err(err) => {
                tracing::warn!(path = %route.path, "credential store unreadable: {err}");
                false
            }
        };
        if !signed_in {
            return self.refuse_login(epoch, route);
        }

        let Some(required_role) = &route.required_role else {
            return self.settle(epoch, GuardState::Authorized, GuardOutcome::Authorized(None));
        };

        let fetched = self.session.current_user().await;
        if !self.is_current(epoch) {
            tracing::debug!(path = %route.path, "guard check abandoned");
            return GuardOutcome::Abandoned;
        }

        match fetched {
            Ok(user) if has_role(required_role, Some(&user)) => self.settle(
                epoch,
                GuardState::Authorized,
                GuardOutcome::Authorized(Some(user)),
            ),
            Ok(user) => {
                tracing::info!(
                    path = %route.path,
                    username = %user.username,
                    required_role = %required_role,
                    "access denied"
                );
                let redirect = Redirect::AccessDenied {
                    required_role: required_role.clone(),
                };
                self.settle(epoch, GuardState::Forbidden, GuardOutcome::Forbidden(redirect))
            }
            Err(err) => {
                tracing::warn!(path = %route.path, "user check failed; signing out: {err}");
                self.session.clear_credentials();
                self.refuse_login(epoch, route)
            }
        }
    }

    fn refuse_login(&self, epoch: u64, route: &RouteRequirement) -> GuardOutcome {
        let redirect = Redirect::Login {
            return_to: route.path.clone(),
        };
        self.settle(
            epoch,
            GuardState::Unauthenticated,
            GuardOutcome::Unauthenticated(redirect),
        )
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    fn enter(&self, epoch: u64, next: GuardState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_current(epoch) {
            return false;
        }
        *state = next;
        true
    }

    /// Commit the outcome (state + redirect) only if this check is still
    /// the latest one.
    fn settle(&self, epoch: u64, next: GuardState, outcome: GuardOutcome) -> GuardOutcome {
        if !self.enter(epoch, next) {
            return GuardOutcome::Abandoned;
        }
        if let Some(redirect) = outcome.redirect() {
            let location = redirect.location(self.session.config());
            self.navigator.navigate(redirect, &location);
        }
        outcome
    }
}
