//! User accounts and request sessions.
//!
//! Sessions are server-side: the client holds an opaque bearer token and every
//! request resolves it into a [`Caller`] through the [`SessionResolver`] extension.

pub mod domain;
pub mod password;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use domain::{
    AuthValidationError, Credentials, Registration, Role, User, UserId, UserSummary, UserView,
};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use repository::{SessionRepository, UserRepository};
pub use router::auth_router;
pub use service::{AuthError, AuthService, AuthSession};
pub use session::{
    AdminCaller, BearerToken, Caller, Session, SessionResolver, SessionToken,
    SharedSessionResolver, TokenFingerprint,
};
