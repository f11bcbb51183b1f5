//! Shared test utilities for route tests.
//!
//! [`TestHarness`] builds the full router around a fresh store and a model
//! stub that always answers with the same text.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use taskchat_core::{LanguageModel, LlmError};
use tower::ServiceExt; // for oneshot()

use crate::config::Config;
use crate::routes;
use crate::state::AppState;

/// Model stub returning a fixed reply.
pub struct FixedReply(pub String);

#[async_trait]
impl LanguageModel for FixedReply {
    async fn generate(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        Ok(self.0.clone())
    }
}

pub struct TestHarness {
    pub state: Arc<AppState>,
    app: Router,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::replying(r#"{"action":"list"}"#)
    }

    /// Harness whose model always answers `reply`.
    pub fn replying(reply: &str) -> Self {
        let config = Config {
            enable_swagger: false,
            ..Config::default()
        };
        let state = Arc::new(AppState::new(config, Arc::new(FixedReply(reply.to_owned()))));
        let app = routes::build(Arc::clone(&state));
        Self { state, app }
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        self.app.clone().oneshot(req).await.unwrap()
    }
}

// ---------- Request builders ----------

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json<T: serde::Serialize>(uri: &str, body: &T) -> Request<Body> {
    json_request(Method::POST, uri, body)
}

pub fn put_json<T: serde::Serialize>(uri: &str, body: &T) -> Request<Body> {
    json_request(Method::PUT, uri, body)
}

fn json_request<T: serde::Serialize>(method: Method, uri: &str, body: &T) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

// ---------- Response readers ----------

pub async fn body_json<T: DeserializeOwned>(resp: Response) -> T {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
