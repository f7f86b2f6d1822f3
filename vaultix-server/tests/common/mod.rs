use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use vaultix_core::config as core_config;
use vaultix_server::{
    build_router,
    config::{AuthConfig, Environment, SecurityConfig, ServerConfig, StoreConfig},
    services::{FlatFileStore, InMemorySessionStore, ManualClock, MockDelivery},
    AppState,
};

/// Fully wired application over a temp-file store, a manual clock, and a
/// capturing OTP channel.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub delivery: Arc<MockDelivery>,
    _dir: tempfile::TempDir,
}

pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_file = dir
        .path()
        .join("store.json")
        .to_string_lossy()
        .into_owned();

    let config = ServerConfig {
        common: core_config::Config { port: 0 },
        environment: Environment::Dev,
        service_name: "vaultix-server".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        auth: AuthConfig {
            signing_secret: "test-secret".to_string(),
            access_token_expiry_minutes: 60,
            otp_session_ttl_minutes: 10,
            expose_demo_otp: false,
        },
        store: StoreConfig { data_file },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
    };

    let store = Arc::new(
        FlatFileStore::open(&config.store.data_file)
            .await
            .expect("store open"),
    );
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
    ));
    let sessions = Arc::new(InMemorySessionStore::new(clock.clone()));
    let delivery = Arc::new(MockDelivery::default());

    let state = AppState::new(config, store, sessions, delivery.clone(), clock.clone());

    TestApp {
        router: build_router(state),
        clock,
        delivery,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collect")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str, role: &str) {
        let (status, _) = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": password,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    /// Most recently issued code, whoever it went to.
    pub fn last_code(&self) -> String {
        self.delivery
            .sent
            .lock()
            .expect("delivery log")
            .last()
            .map(|(_, code)| code.clone())
            .expect("no code delivered")
    }

    /// Run the whole handshake and return the bearer token.
    pub async fn login_and_verify(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let pre_token = body["token"].as_str().expect("login token").to_string();
        let code = self.last_code();

        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/verify-otp",
                None,
                Some(json!({ "token": pre_token, "otp": code })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("bearer token").to_string()
    }
}
