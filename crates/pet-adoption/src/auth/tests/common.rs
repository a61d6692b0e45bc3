use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::Duration;
use serde_json::Value;

use crate::auth::{Argon2Hasher, AuthService, Credentials, Registration};
use crate::store::MemoryStore;

pub(super) type MemoryAuthService = AuthService<MemoryStore, MemoryStore>;

pub(super) fn build_service_with_ttl(ttl: Duration) -> (MemoryAuthService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let hasher = Arc::new(Argon2Hasher::with_params(1024, 1, 1).expect("valid params"));
    let service = AuthService::new(store.clone(), store.clone(), hasher, ttl);
    (service, store)
}

pub(super) fn build_service() -> (MemoryAuthService, Arc<MemoryStore>) {
    build_service_with_ttl(Duration::hours(24))
}

pub(super) fn registration(username: &str, email: &str) -> Registration {
    Registration {
        username: username.to_string(),
        email: email.to_string(),
        password: "secret123".to_string(),
    }
}

pub(super) fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub(super) fn json_request(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).expect("json encodes")))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
