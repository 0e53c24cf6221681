#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use socialfeed::mailer::{LogMailer, Mailer};
use socialfeed::router::init_router;
use socialfeed::state::{AppConfig, AppState};
use socialfeed::store::Storage;
use socialfeed::store::memory::MemoryStore;
use socialfeed_config::{BasicAuthConfig, JwtConfig, RateLimitConfig, ServerConfig};
use socialfeed_core::AppError;
use socialfeed_core::password::hash_password;
use socialfeed_models::{NewUser, User, role_names};
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";
pub const BASIC_USER: &str = "operator";
pub const BASIC_PASSWORD: &str = "op-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            env: "test".to_string(),
            bcrypt_cost: 4,
            ..ServerConfig::default()
        },
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            expiry_seconds: 3600,
            issuer: "socialfeed".to_string(),
            audience: "socialfeed".to_string(),
        },
        basic_auth: BasicAuthConfig {
            username: BASIC_USER.to_string(),
            password: BASIC_PASSWORD.to_string(),
        },
        rate_limit: RateLimitConfig::disabled(),
        ..AppConfig::default()
    }
}

pub fn rate_limited_config(requests: u32, window: Duration) -> AppConfig {
    AppConfig {
        rate_limit: RateLimitConfig {
            enabled: true,
            requests_per_window: requests,
            window,
            trust_proxy_headers: true,
        },
        ..test_config()
    }
}

/// Mailer whose every send fails.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send_welcome(&self, _: &str, _: &str, _: &str) -> Result<(), AppError> {
        Err(AppError::internal_error("smtp unreachable".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config(), Arc::new(LogMailer))
}

pub fn spawn_app_with(config: AppConfig, mailer: Arc<dyn Mailer>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(Storage::from_memory(store.clone()), mailer, config);
    TestApp {
        router: init_router(state.clone()),
        store,
        state,
    }
}

pub struct TestRequest {
    builder: axum::http::request::Builder,
    body: Body,
}

impl TestRequest {
    pub fn new(method: &str, uri: &str) -> Self {
        Self {
            builder: Request::builder().method(method).uri(uri),
            body: Body::empty(),
        }
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.builder = self
            .builder
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.builder = self
            .builder
            .header(header::CONTENT_TYPE, "application/json");
        self.body = Body::from(body.to_string());
        self
    }
}

impl TestApp {
    pub async fn send(&self, request: TestRequest) -> Response {
        let request = request.builder.body(request.body).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Sends the request and decodes the JSON body (`Null` when empty).
    pub async fn call(&self, request: TestRequest) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    /// Inserts an active user with the given role and returns it with a
    /// session token.
    pub async fn user_with_role(&self, username: &str, role: &str) -> (User, String) {
        let user = self
            .store
            .insert_user(
                NewUser {
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    password_hash: hash_password(PASSWORD, 4).unwrap(),
                    role_name: role.to_string(),
                },
                true,
            )
            .await
            .unwrap();
        let token = self.state.authenticator.issue_for(user.id.get()).unwrap();
        (user, token)
    }

    pub async fn user(&self, username: &str) -> (User, String) {
        self.user_with_role(username, role_names::USER).await
    }

    /// Creates a post through the API and returns its JSON.
    pub async fn create_post(&self, token: &str, title: &str, tags: &[&str]) -> Value {
        let (status, body) = self
            .call(
                TestRequest::new("POST", "/v1/posts")
                    .bearer(token)
                    .json(serde_json::json!({
                        "title": title,
                        "content": format!("{title} content"),
                        "tags": tags,
                    })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create post failed: {body}");
        body["data"].clone()
    }
}
