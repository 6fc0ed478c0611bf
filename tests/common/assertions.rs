//! Custom assertion macros and utilities

use axum::http::StatusCode;
use serde_json::Value;

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}

/// Assert an error response: status, category code and message
#[track_caller]
pub fn assert_error(response: &(StatusCode, Value), status: StatusCode, message: &str) {
    let (actual, body) = response;
    assert_eq!(*actual, status, "unexpected status, body: {body}");
    assert_eq!(body["statusCode"], status.as_u16(), "body: {body}");
    assert_eq!(body["message"], message, "body: {body}");
    let code = match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
        StatusCode::FORBIDDEN => "FORBIDDEN",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        _ => "SERVER_ERROR",
    };
    assert_eq!(body["error"], code, "body: {body}");
}
