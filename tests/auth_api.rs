//! Authentication API integration tests
//!
//! Registration, login and the guard behaviour of `/api/users/me`,
//! exercised through the full router with the local identity backend.

#[macro_use]
mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_hello() {
    let app = TestApp::local();
    let (status, body) = app.get("/api/hello", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Hello World from ActivityHub API!", "status": "success" })
    );
}

#[tokio::test]
async fn test_register_parent() {
    let app = TestApp::local();
    let (status, body) = app
        .post(
            "/api/register",
            json!({
                "email": "Parent@Example.com",
                "name": "Pat",
                "password": "password123",
                "role": "parent"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "parent@example.com");
    assert_eq!(body["user"]["role"], "parent");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("parent_id").is_none());
}

#[tokio::test]
async fn test_register_validation_messages() {
    let app = TestApp::local();

    let cases = [
        (json!({}), "Invalid JSON data"),
        (json!({ "name": "A", "password": "password123" }), "Missing required field: email"),
        (json!({ "email": "a@b.com", "password": "password123" }), "Missing required field: name"),
        (json!({ "email": "a@b.com", "name": "A" }), "Missing required field: password"),
        (
            json!({ "email": "nope", "name": "A", "password": "password123" }),
            "Invalid email format",
        ),
        (
            json!({ "email": "a@b.com", "name": "A", "password": "short", "role": "parent" }),
            "Password must be at least 8 characters long",
        ),
        (
            json!({ "email": "a@b.com", "name": "A", "password": "password123" }),
            "Parent ID is required for child users",
        ),
    ];
    for (body, message) in cases {
        let response = app.post("/api/register", body).await;
        assert_error(&response, StatusCode::BAD_REQUEST, message);
    }

    let (status, body) = app
        .post(
            "/api/register",
            json!({ "email": "a@b.com", "name": "A", "password": "password123", "role": "owner" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_contains!(body["message"].as_str().unwrap(), "Invalid role");
}

#[tokio::test]
async fn test_malformed_json() {
    let app = TestApp::local();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let response = app.send(request).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Invalid JSON data");
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::local();
    register(&app, "parent@example.com", "parent", None).await;

    let response = app
        .post(
            "/api/register",
            json!({
                "email": "PARENT@example.com",
                "name": "Again",
                "password": "password123",
                "role": "parent"
            }),
        )
        .await;
    assert_error(
        &response,
        StatusCode::BAD_REQUEST,
        "User with this email already exists",
    );
}

#[tokio::test]
async fn test_child_registration_links_parent() {
    let app = TestApp::local();
    let parent = create_test_user(&app, "parent@example.com", "parent", None).await;

    let child = register(&app, "kid@example.com", "child", Some(&parent.id)).await;
    assert_eq!(child["parent_id"], parent.id.as_str());

    let response = app
        .post(
            "/api/register",
            json!({
                "email": "orphan@example.com",
                "name": "Orphan",
                "password": "password123",
                "parent_id": "does-not-exist"
            }),
        )
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Parent user not found");
}

#[tokio::test]
async fn test_login_success_and_failures() {
    let app = TestApp::local();
    register(&app, "parent@example.com", "parent", None).await;

    let (status, body) = app
        .post(
            "/api/login",
            json!({ "email": "parent@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], "parent@example.com");
    assert!(body["token"].as_str().is_some_and(|token| !token.is_empty()));
    assert!(body.get("tokens").is_none());

    let wrong_password = app
        .post(
            "/api/login",
            json!({ "email": "parent@example.com", "password": "not-the-password" }),
        )
        .await;
    let unknown_user = app
        .post(
            "/api/login",
            json!({ "email": "ghost@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_error(&wrong_password, StatusCode::UNAUTHORIZED, "Invalid email or password");
    assert_error(&unknown_user, StatusCode::UNAUTHORIZED, "Invalid email or password");

    let missing = app.post("/api/login", json!({ "email": "parent@example.com" })).await;
    assert_error(&missing, StatusCode::BAD_REQUEST, "Missing required field: password");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::local();
    let parent = create_test_user(&app, "parent@example.com", "parent", None).await;

    let response = app.get("/api/users/me", None).await;
    assert_error(
        &response,
        StatusCode::UNAUTHORIZED,
        "Missing authentication token",
    );

    let request = Request::builder()
        .uri("/api/users/me")
        .header(header::AUTHORIZATION, format!("Token {}", parent.token))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_error(
        &response,
        StatusCode::UNAUTHORIZED,
        "Missing authentication token",
    );

    let response = app.get("/api/users/me", Some("garbage.token.value")).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "Invalid or expired token");

    let (status, body) = app.get("/api/users/me", Some(&parent.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["user_id"], parent.id.as_str());
}

#[tokio::test]
async fn test_refresh_is_unsupported_locally() {
    let app = TestApp::local();
    let response = app
        .post("/api/token/refresh", json!({ "refresh_token": "anything" }))
        .await;
    assert_error(
        &response,
        StatusCode::BAD_REQUEST,
        "Token refresh is not supported by the local identity backend",
    );
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let app = TestApp::local();
    let response = app.get("/api/nothing-here", None).await;
    assert_error(&response, StatusCode::NOT_FOUND, "Resource not found");
}

#[tokio::test]
async fn test_unsupported_method_is_json_405() {
    let app = TestApp::local();
    let expected = "Method not allowed for this resource";

    let response = app.post("/api/users/some-user-id", json!({"name": "x"})).await;
    assert_error(&response, StatusCode::METHOD_NOT_ALLOWED, expected);

    let response = app.get("/api/register", None).await;
    assert_error(&response, StatusCode::METHOD_NOT_ALLOWED, expected);
}
