//! User profile API integration tests
//!
//! Per-user access (self, admin, parent-of), the parent-level children
//! listing and the admin-level delete.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_get_user_access_rules() {
    let app = TestApp::local();
    let family = create_family(&app).await;
    let child_uri = format!("/api/users/{}", family.child.id);

    for caller in [&family.child, &family.parent, &family.admin] {
        let (status, body) = app.get(&child_uri, Some(&caller.token)).await;
        assert_eq!(status, StatusCode::OK, "{} should read the child", caller.role);
        assert_eq!(body["user"]["user_id"], family.child.id.as_str());
    }

    let response = app.get(&child_uri, Some(&family.other_parent.token)).await;
    assert_error(
        &response,
        StatusCode::FORBIDDEN,
        "You do not have permission to access this user's profile",
    );

    // A child cannot read its parent
    let parent_uri = format!("/api/users/{}", family.parent.id);
    let response = app.get(&parent_uri, Some(&family.child.token)).await;
    assert_eq!(response.0, StatusCode::FORBIDDEN);

    let response = app.get(&child_uri, None).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "Missing authentication token");
}

#[tokio::test]
async fn test_get_unknown_user() {
    let app = TestApp::local();
    let admin = create_test_user(&app, "admin@example.com", "admin", None).await;
    let response = app.get("/api/users/no-such-user", Some(&admin.token)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "User not found");
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::local();
    let family = create_family(&app).await;
    let child_uri = format!("/api/users/{}", family.child.id);

    let (status, body) = app
        .put(
            &child_uri,
            Some(&family.parent.token),
            json!({ "name": "Renamed", "role": "admin", "email": "x@y.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User profile updated successfully");
    assert_eq!(body["user"]["name"], "Renamed");
    assert_eq!(body["user"]["role"], "child");
    assert_eq!(body["user"]["email"], "child@example.com");

    let response = app
        .put(&child_uri, Some(&family.other_parent.token), json!({ "name": "Nope" }))
        .await;
    assert_error(
        &response,
        StatusCode::FORBIDDEN,
        "You do not have permission to update this user's profile",
    );

    let response = app.put(&child_uri, Some(&family.child.token), json!({})).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "No data provided for update");

    let response = app
        .put(&child_uri, Some(&family.child.token), json!({ "nickname": "ignored" }))
        .await;
    assert_error(
        &response,
        StatusCode::NOT_FOUND,
        "User not found or no valid updates provided",
    );

    let response = app
        .put("/api/users/ghost", Some(&family.admin.token), json!({ "name": "Ghost" }))
        .await;
    assert_error(
        &response,
        StatusCode::NOT_FOUND,
        "User not found or no valid updates provided",
    );
}

#[tokio::test]
async fn test_update_checks_access_before_body() {
    let app = TestApp::local();
    let family = create_family(&app).await;
    let child_uri = format!("/api/users/{}", family.child.id);
    let garbled = |token: &str| {
        Request::builder()
            .method(Method::PUT)
            .uri(&child_uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap()
    };

    let response = app.send(garbled(&family.other_parent.token)).await;
    assert_error(
        &response,
        StatusCode::FORBIDDEN,
        "You do not have permission to update this user's profile",
    );

    let response = app.send(garbled(&family.parent.token)).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Invalid JSON data");
}

#[tokio::test]
async fn test_children_listing_by_role() {
    let app = TestApp::local();
    let family = create_family(&app).await;
    let second_child =
        create_test_user(&app, "second@example.com", "child", Some(&family.parent.id)).await;
    create_test_user(
        &app,
        "not-mine@example.com",
        "child",
        Some(&family.other_parent.id),
    )
    .await;

    let response = app.get("/api/users/children", Some(&family.child.token)).await;
    assert_error(&response, StatusCode::FORBIDDEN, "Parent privileges required");

    let (status, body) = app.get("/api/users/children", Some(&family.parent.token)).await;
    assert_eq!(status, StatusCode::OK);
    let mut ids: Vec<&str> = body["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|child| child["user_id"].as_str().unwrap())
        .collect();
    ids.sort_unstable();
    let mut expected = vec![family.child.id.as_str(), second_child.id.as_str()];
    expected.sort_unstable();
    assert_eq!(ids, expected);

    let (status, body) = app.get("/api/users/children", Some(&family.admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["children"], json!([]));
}

#[tokio::test]
async fn test_delete_is_admin_only() {
    let app = TestApp::local();
    let family = create_family(&app).await;
    let child_uri = format!("/api/users/{}", family.child.id);

    let response = app.delete(&child_uri, Some(&family.parent.token)).await;
    assert_error(&response, StatusCode::FORBIDDEN, "Admin privileges required");

    let (status, body) = app.delete(&child_uri, Some(&family.admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let response = app.delete(&child_uri, Some(&family.admin.token)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "User not found");

    // The relationship edge is left behind but the listing skips it
    let (status, body) = app.get("/api/users/children", Some(&family.parent.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["children"], json!([]));
}
