use std::fmt;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::domain::{Role, UserId};
use super::service::AuthError;
use crate::blocking::offload;
use crate::error::ApiError;

const TOKEN_BYTES: usize = 32;

/// Bearer token handed to the client. Only its fingerprint is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn fingerprint(&self) -> TokenFingerprint {
        let digest = Sha256::digest(self.0.as_bytes());
        TokenFingerprint(hex::encode(digest))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

impl Serialize for SessionToken {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// SHA-256 of a session token, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenFingerprint(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: UserId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Identity attached to a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Caller known to hold the admin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCaller(pub Caller);

/// Turns a bearer token into the caller it was issued to.
pub trait SessionResolver: Send + Sync {
    fn resolve(&self, token: &SessionToken) -> Result<Caller, AuthError>;
}

/// Request extension carrying the resolver used by [`Caller`] and [`AdminCaller`].
pub type SharedSessionResolver = Arc<dyn SessionResolver>;

pub fn bearer_token(parts: &Parts) -> Result<SessionToken, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let (scheme, token) = header.trim().split_once(' ').ok_or(AuthError::MissingToken)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(SessionToken::from_raw(token))
}

/// Raw bearer token, for endpoints that act on the session itself.
#[derive(Debug, Clone)]
pub struct BearerToken(pub SessionToken);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_token(parts)?))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resolver = parts
            .extensions
            .get::<SharedSessionResolver>()
            .cloned()
            .ok_or_else(|| ApiError::Internal("session resolver extension missing".to_string()))?;
        let token = bearer_token(parts)?;
        offload(move || resolver.resolve(&token)).await
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        if !caller.is_admin() {
            return Err(AuthError::Forbidden.into());
        }
        Ok(Self(caller))
    }
}
