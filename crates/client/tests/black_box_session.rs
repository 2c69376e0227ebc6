//! End-to-end tests against an in-process mock of the auth API, exercising
//! the real `reqwest` transport and the file-backed credential store.

use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use sessiongate_auth::{Action, Credential, Permission, Role, User};
use sessiongate_client::{
    AdminClient, ClientConfig, CredentialStore, FileCredentialStore, GuardOutcome, MenuResolver,
    Navigator, Redirect, ReqwestTransport, RouteGuard, RouteRequirement, SessionManager, UserQuery,
};
use sessiongate_core::AuthError;

const PASSWORD: &str = "correct-horse";

#[derive(Default)]
struct Tokens {
    generation: u32,
    access: String,
    refresh: String,
    refreshes: u32,
    logouts: Vec<Value>,
    last_query: Vec<(String, String)>,
}

struct MockApi {
    user: User,
    tokens: Mutex<Tokens>,
}

impl MockApi {
    fn new(user: User) -> Arc<Self> {
        Arc::new(Self {
            user,
            tokens: Mutex::new(Tokens::default()),
        })
    }

    fn issue(&self) -> (String, String) {
        let mut t = self.tokens.lock().unwrap();
        t.generation += 1;
        t.access = format!("access-{}", t.generation);
        t.refresh = format!("refresh-{}", t.generation);
        (t.access.clone(), t.refresh.clone())
    }

    /// Simulate the access token timing out server-side.
    fn expire_access(&self) {
        self.tokens.lock().unwrap().access = "expired".to_string();
    }

    fn revoke_refresh(&self) {
        self.tokens.lock().unwrap().refresh = "revoked".to_string();
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.tokens.lock().unwrap().access);
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }
}

type Reply = (StatusCode, Json<Value>);

fn unauthorized() -> Reply {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid or expired token" })))
}

async fn login(State(api): State<Arc<MockApi>>, Json(body): Json<Value>) -> Reply {
    if body["username"] != api.user.username.as_str() || body["password"] != PASSWORD {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid credentials" })));
    }
    let (access, refresh) = api.issue();
    (
        StatusCode::OK,
        Json(json!({
            "access_token": access,
            "refresh_token": refresh,
            "expires_at": chrono::Utc::now().timestamp() + 900,
            "user": api.user,
        })),
    )
}

async fn refresh(State(api): State<Arc<MockApi>>, Json(body): Json<Value>) -> Reply {
    let current = api.tokens.lock().unwrap().refresh.clone();
    if body["refresh_token"] != current.as_str() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid refresh token" })));
    }
    api.tokens.lock().unwrap().refreshes += 1;
    let (access, refresh) = api.issue();
    (
        StatusCode::OK,
        Json(json!({ "access_token": access, "refresh_token": refresh })),
    )
}

async fn me(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> Reply {
    if !api.authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, Json(json!({ "user": api.user })))
}

async fn menu_access(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> Reply {
    if !api.authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "menus": [
                { "name": "dashboard", "label": "Dashboard", "icon": "dashboard",
                  "path": "/dashboard", "permission": "menu.dashboard", "accessible": true },
                { "name": "reports", "label": "Reports", "icon": "assessment",
                  "path": "/reports", "permission": "menu.reports", "accessible": false }
            ],
            "features": { "export": true, "import": false, "backup": false, "maintenance": false }
        })),
    )
}

async fn users(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Reply {
    if !api.authorized(&headers) {
        return unauthorized();
    }
    api.tokens.lock().unwrap().last_query = query;
    (
        StatusCode::OK,
        Json(json!({ "users": [api.user], "pagination": { "page": 1, "limit": 20, "total": 1 } })),
    )
}

async fn logout(State(api): State<Arc<MockApi>>, Json(body): Json<Value>) -> Reply {
    api.tokens.lock().unwrap().logouts.push(body);
    (StatusCode::OK, Json(json!({ "message": "Logged out successfully" })))
}

struct TestServer {
    base_url: String,
    api: Arc<MockApi>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(user: User) -> Self {
        let api = MockApi::new(user);
        let app = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/refresh", post(refresh))
            .route("/api/v1/auth/me", get(me))
            .route("/api/v1/auth/menu-access", get(menu_access))
            .route("/api/v1/auth/logout", post(logout))
            .route("/api/v1/users", get(users))
            .with_state(api.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            api,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Client {
    session: Arc<SessionManager>,
    store: Arc<FileCredentialStore>,
    _dir: tempfile::TempDir,
}

fn client(base_url: &str) -> Client {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCredentialStore::new(dir.path().join("credentials.json")));
    let config = ClientConfig::new(base_url);
    let transport = Arc::new(ReqwestTransport::new(&config).unwrap());
    let session = Arc::new(SessionManager::new(config, store.clone(), transport));
    Client {
        session,
        store,
        _dir: dir,
    }
}

fn viewer() -> User {
    User::new("vera", "vera@example.com").with_roles([Role::new("viewer")
        .with_permissions([Permission::new("reports.read", "reports", Action::Read)])])
}

#[derive(Default)]
struct RecordingNavigator(Mutex<Vec<String>>);

impl Navigator for RecordingNavigator {
    fn navigate(&self, _redirect: &Redirect, location: &str) {
        self.0.lock().unwrap().push(location.to_string());
    }
}

#[tokio::test]
async fn login_persists_credentials_and_refreshes_transparently() {
    let server = TestServer::spawn(viewer()).await;
    let c = client(&server.base_url);

    let user = c.session.login("vera", PASSWORD).await.unwrap();
    assert_eq!(user.username, "vera");
    assert_eq!(c.store.get().unwrap().unwrap().access_token, "access-1");

    server.api.expire_access();
    let fetched = c.session.current_user().await.unwrap();

    assert_eq!(fetched.id, user.id);
    assert_eq!(server.api.tokens.lock().unwrap().refreshes, 1);
    let stored = c.store.get().unwrap().unwrap();
    assert_eq!(stored.access_token, "access-2");
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn wrong_password_writes_nothing() {
    let server = TestServer::spawn(viewer()).await;
    let c = client(&server.base_url);

    let err = c.session.login("vera", "hunter2").await.unwrap_err();

    assert_eq!(err, AuthError::invalid_credentials("Invalid credentials"));
    assert!(c.store.get().unwrap().is_none());
    assert!(!c.store.path().exists());
}

#[tokio::test]
async fn revoked_refresh_token_ends_the_session() {
    let server = TestServer::spawn(viewer()).await;
    let c = client(&server.base_url);
    c.session.login("vera", PASSWORD).await.unwrap();

    server.api.expire_access();
    server.api.revoke_refresh();
    let err = c.session.current_user().await.unwrap_err();

    assert_eq!(err, AuthError::SessionExpired);
    assert!(c.store.get().unwrap().is_none());
    assert_eq!(server.api.tokens.lock().unwrap().refreshes, 0);
}

#[tokio::test]
async fn logout_notifies_server_and_clears_file() {
    let server = TestServer::spawn(viewer()).await;
    let c = client(&server.base_url);
    c.session.login("vera", PASSWORD).await.unwrap();

    c.session.logout().await;

    assert!(!c.store.path().exists());
    assert_eq!(
        server.api.tokens.lock().unwrap().logouts,
        vec![json!({ "refresh_token": "refresh-1" })]
    );
}

#[tokio::test]
async fn logout_clears_when_server_is_gone() {
    let base_url = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let c = client(&base_url);
    c.store.set(&Credential::new("a1", "r1")).unwrap();

    c.session.logout().await;

    assert!(c.store.get().unwrap().is_none());
}

#[tokio::test]
async fn guard_distinguishes_login_from_access_denied() {
    let server = TestServer::spawn(viewer()).await;
    let c = client(&server.base_url);
    let navigator = Arc::new(RecordingNavigator::default());
    let guard = RouteGuard::new(c.session.clone(), navigator.clone());
    let admin_route = RouteRequirement::role("/admin", "admin");

    let outcome = guard.check(&admin_route).await;
    assert!(matches!(outcome, GuardOutcome::Unauthenticated(_)));

    c.session.login("vera", PASSWORD).await.unwrap();
    let outcome = guard.check(&admin_route).await;
    assert!(matches!(outcome, GuardOutcome::Forbidden(_)));

    let outcome = guard.check(&RouteRequirement::role("/reports", "viewer")).await;
    assert!(outcome.is_authorized());

    assert_eq!(
        *navigator.0.lock().unwrap(),
        vec!["/login?redirect=%2Fadmin".to_string(), "/unauthorized".to_string()]
    );
}

#[tokio::test]
async fn menus_and_admin_queries_use_the_session() {
    let server = TestServer::spawn(viewer()).await;
    let c = client(&server.base_url);
    c.session.login("vera", PASSWORD).await.unwrap();

    let menus = MenuResolver::new(c.session.clone()).visible_menus().await.unwrap();
    assert_eq!(menus.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(), vec!["dashboard"]);

    let page = AdminClient::new(c.session.clone())
        .list_users(&UserQuery {
            search: Some("ve".into()),
            active: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.users.len(), 1);
    assert_eq!(
        server.api.tokens.lock().unwrap().last_query,
        vec![
            ("search".to_string(), "ve".to_string()),
            ("active".to_string(), "true".to_string()),
        ]
    );
}
