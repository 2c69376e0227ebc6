//! Scripted transport and fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Notify;

use sessiongate_auth::{Action, Permission, Role, User};

use crate::transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

type Responder = Box<dyn FnOnce(&ApiRequest) -> Result<ApiResponse, TransportError> + Send>;

struct Step {
    method: Method,
    path: String,
    respond: Responder,
    gate: Option<Arc<Notify>>,
}

/// Serves an exact, ordered script of exchanges; any request beyond the
/// script (or out of order) fails the test.
#[derive(Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn expect(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.expect_with(method, path, move |_| Ok(ApiResponse::json_value(status, &body)))
    }

    pub fn expect_error(&self, method: Method, path: &str, err: TransportError) -> &Self {
        self.expect_with(method, path, move |_| Err(err))
    }

    pub fn expect_with<F>(&self, method: Method, path: &str, respond: F) -> &Self
    where
        F: FnOnce(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + 'static,
    {
        self.push(method, path, Box::new(respond), None)
    }

    /// Like `expect`, but the response is held until `gate` is notified.
    pub fn expect_gated(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: Value,
        gate: Arc<Notify>,
    ) -> &Self {
        let respond: Responder = Box::new(move |_| Ok(ApiResponse::json_value(status, &body)));
        self.push(method, path, respond, Some(gate))
    }

    fn push(&self, method: Method, path: &str, respond: Responder, gate: Option<Arc<Notify>>) -> &Self {
        self.steps.lock().unwrap().push_back(Step {
            method,
            path: path.to_string(),
            respond,
            gate,
        });
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.requests().into_iter().map(|r| r.bearer).collect()
    }

    pub fn remaining(&self) -> usize {
        self.steps.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let step = {
            let mut steps = self.steps.lock().unwrap();
            steps.pop_front().unwrap_or_else(|| {
                panic!("unscripted request {:?} {}", request.method, request.path)
            })
        };
        assert_eq!(
            (step.method, step.path.as_str()),
            (request.method, request.path.as_str()),
            "request out of script order"
        );
        self.seen.lock().unwrap().push(request.clone());

        if let Some(gate) = step.gate {
            gate.notified().await;
        }
        (step.respond)(&request)
    }
}

pub fn user_with_roles(username: &str, roles: &[&str]) -> User {
    User::new(username, format!("{username}@example.com")).with_roles(roles.iter().map(|name| {
        Role::new(*name).with_permissions([Permission::new(
            format!("{name}.read"),
            *name,
            Action::Read,
        )])
    }))
}

pub fn user_body(user: &User) -> Value {
    json!({ "user": user })
}

pub fn auth_body(access: &str, refresh: &str, user: &User) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_at": chrono::Utc::now().timestamp() + 900,
        "user": user,
    })
}

pub fn refresh_body(access: &str, refresh: &str) -> Value {
    json!({ "access_token": access, "refresh_token": refresh })
}

pub fn error_body(message: &str) -> Value {
    json!({ "error": message })
}
