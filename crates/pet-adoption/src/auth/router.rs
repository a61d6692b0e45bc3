use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde_json::json;

use super::domain::{Credentials, Registration};
use super::repository::{SessionRepository, UserRepository};
use super::service::{AuthService, AuthSession};
use super::session::BearerToken;
use crate::blocking::offload;
use crate::error::ApiError;
use crate::extract::JsonBody;

/// Router builder exposing registration, login, and logout.
pub fn auth_router<U, S>(service: Arc<AuthService<U, S>>) -> Router
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    Router::new()
        .route("/api/auth/register", post(register_handler::<U, S>))
        .route("/api/auth/login", post(login_handler::<U, S>))
        .route("/api/auth/logout", post(logout_handler::<U, S>))
        .with_state(service)
}

pub(crate) async fn register_handler<U, S>(
    State(service): State<Arc<AuthService<U, S>>>,
    JsonBody(registration): JsonBody<Registration>,
) -> Result<impl IntoResponse, ApiError>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    let session = offload(move || service.register(registration)).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub(crate) async fn login_handler<U, S>(
    State(service): State<Arc<AuthService<U, S>>>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<AuthSession>, ApiError>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    Ok(Json(offload(move || service.login(credentials)).await?))
}

pub(crate) async fn logout_handler<U, S>(
    State(service): State<Arc<AuthService<U, S>>>,
    BearerToken(token): BearerToken,
) -> Result<Json<serde_json::Value>, ApiError>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    offload(move || service.logout(&token)).await?;
    Ok(Json(json!({ "message": "Logged out" })))
}
