//! Authentication test helpers
//!
//! Register users through the public API and log them in, so tests hold
//! real bearer tokens.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::test_app::TestApp;

pub const TEST_PASSWORD: &str = "password123";

/// A registered, logged-in user
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub token: String,
}

/// Register through `POST /api/register` and return the `user` object
pub async fn register(app: &TestApp, email: &str, role: &str, parent_id: Option<&str>) -> Value {
    let mut body = json!({
        "email": email,
        "name": email.split('@').next().unwrap_or(email),
        "password": TEST_PASSWORD,
        "role": role,
    });
    if let Some(parent_id) = parent_id {
        body["parent_id"] = json!(parent_id);
    }
    let (status, response) = app.post("/api/register", body).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {response}");
    response["user"].clone()
}

/// Log in through `POST /api/login` and return the bearer token
pub async fn login(app: &TestApp, email: &str) -> String {
    let (status, response) = app
        .post("/api/login", json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::OK, "login failed: {response}");
    response["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

/// Register and log in
pub async fn create_test_user(
    app: &TestApp,
    email: &str,
    role: &str,
    parent_id: Option<&str>,
) -> TestUser {
    let user = register(app, email, role, parent_id).await;
    let token = login(app, email).await;
    TestUser {
        id: user["user_id"].as_str().expect("user_id").to_string(),
        email: email.to_string(),
        role: role.to_string(),
        token,
    }
}

/// One parent with one child, an unrelated parent, and an admin
pub struct Family {
    pub parent: TestUser,
    pub child: TestUser,
    pub other_parent: TestUser,
    pub admin: TestUser,
}

pub async fn create_family(app: &TestApp) -> Family {
    let parent = create_test_user(app, "parent@example.com", "parent", None).await;
    let child = create_test_user(app, "child@example.com", "child", Some(&parent.id)).await;
    let other_parent = create_test_user(app, "other@example.com", "parent", None).await;
    let admin = create_test_user(app, "admin@example.com", "admin", None).await;
    Family {
        parent,
        child,
        other_parent,
        admin,
    }
}
