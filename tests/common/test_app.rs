//! In-process application harness
//!
//! Builds the router over an in-memory store and drives it with
//! `tower::ServiceExt::oneshot`, so no port is bound.

use activityhub::backend::routes::create_router;
use activityhub::backend::server::{build_state, AppState};
use activityhub::backend::store::MemoryStore;
use activityhub::shared::{AppConfig, SystemClock};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// A router plus the state behind it
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Local identity backend over a fresh in-memory store
    pub fn local() -> Self {
        let config = AppConfig::builder()
            .jwt_secret(TEST_SECRET)
            .build()
            .expect("valid test config");
        Self::with_config(&config)
    }

    pub fn with_config(config: &AppConfig) -> Self {
        let state = build_state(config, Arc::new(MemoryStore::new()), Arc::new(SystemClock))
            .expect("failed to build test state");
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    /// Send one request; returns the status and the parsed JSON body
    /// (`Value::Null` for an empty body).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        self.send(request).await
    }

    /// Send a prebuilt request
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, None, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }
}
