mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn register_then_full_handshake_reaches_protected_routes() {
    let app = spawn_app().await;
    app.register("Owner", "owner@example.com", "Pw1!", "data_owner")
        .await;

    let bearer = app.login_and_verify("owner@example.com", "Pw1!").await;

    let (status, body) = app
        .request(Method::GET, "/api/profile", Some(&bearer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "owner@example.com");
    assert_eq!(body["role"], "data_owner");
    assert_eq!(body["organization"], "Independent");
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts_regardless_of_case() {
    let app = spawn_app().await;
    app.register("Owner", "owner@example.com", "Pw1!", "data_owner")
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Impostor",
                "email": "OWNER@Example.COM",
                "password": "other",
                "role": "data_user",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn unknown_role_is_rejected_at_registration() {
    let app = spawn_app().await;
    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "X",
                "email": "x@example.com",
                "password": "Pw1!",
                "role": "superadmin",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_gets_uniform_401_and_no_code() {
    let app = spawn_app().await;
    app.register("Owner", "owner@example.com", "Pw1!", "data_owner")
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "owner@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication failed");
    assert_eq!(app.delivery.delivery_count(), 0);
}

#[tokio::test]
async fn unknown_email_matches_wrong_password_response() {
    let app = spawn_app().await;
    app.register("Owner", "owner@example.com", "Pw1!", "data_owner")
        .await;

    let (status_unknown, body_unknown) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "Pw1!" })),
        )
        .await;
    let (status_wrong, body_wrong) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "owner@example.com", "password": "bad" })),
        )
        .await;
    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(status_unknown, status_wrong);
    assert_eq!(body_unknown, body_wrong);
}

#[tokio::test]
async fn login_response_never_carries_the_code_when_echo_is_off() {
    let app = spawn_app().await;
    app.register("Owner", "owner@example.com", "Pw1!", "data_owner")
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "owner@example.com", "password": "Pw1!" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["otpRequired"], true);
    assert!(body.get("demoOtp").is_none());
    assert_eq!(app.delivery.delivery_count(), 1);
}

#[tokio::test]
async fn wrong_code_leaves_session_usable_for_retry() {
    let app = spawn_app().await;
    app.register("Owner", "owner@example.com", "Pw1!", "data_owner")
        .await;

    let (_, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "owner@example.com", "password": "Pw1!" })),
        )
        .await;
    let pre_token = body["token"].as_str().unwrap().to_string();
    let code = app.last_code();
    let wrong = if code == "000000" { "000001" } else { "000000" };

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/verify-otp",
            None,
            Some(json!({ "token": pre_token, "otp": wrong })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication failed");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/verify-otp",
            None,
            Some(json!({ "token": pre_token, "otp": code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn successful_verification_consumes_the_session() {
    let app = spawn_app().await;
    app.register("Owner", "owner@example.com", "Pw1!", "data_owner")
        .await;

    let (_, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "owner@example.com", "password": "Pw1!" })),
        )
        .await;
    let pre_token = body["token"].as_str().unwrap().to_string();
    let code = app.last_code();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/verify-otp",
            None,
            Some(json!({ "token": pre_token, "otp": code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/verify-otp",
            None,
            Some(json!({ "token": pre_token, "otp": code })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_expires_after_ttl() {
    let app = spawn_app().await;
    app.register("Owner", "owner@example.com", "Pw1!", "data_owner")
        .await;

    let (_, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "owner@example.com", "password": "Pw1!" })),
        )
        .await;
    let pre_token = body["token"].as_str().unwrap().to_string();
    let code = app.last_code();

    app.clock.advance(chrono::Duration::minutes(11));

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/verify-otp",
            None,
            Some(json!({ "token": pre_token, "otp": code })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication failed");
}

#[tokio::test]
async fn health_endpoint_reports_status() {
    let app = spawn_app().await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
