use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{AuthValidationError, Credentials, Registration, Role, User, UserId, UserView};
use super::password::{PasswordError, PasswordHasher};
use super::repository::{SessionRepository, UserRepository};
use super::session::{Caller, Session, SessionResolver, SessionToken};
use crate::config::AdminBootstrap;
use crate::store::RepositoryError;

/// Token plus account returned after registration or login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: SessionToken,
    pub user: UserView,
}

/// Account registration, login, and per-request session resolution.
pub struct AuthService<U, S> {
    users: Arc<U>,
    sessions: Arc<S>,
    hasher: Arc<dyn PasswordHasher>,
    session_ttl: Duration,
}

impl<U, S> AuthService<U, S>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    pub fn new(
        users: Arc<U>,
        sessions: Arc<S>,
        hasher: Arc<dyn PasswordHasher>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            session_ttl,
        }
    }

    /// Create a regular account and sign it in.
    pub fn register(&self, registration: Registration) -> Result<AuthSession, AuthError> {
        let (username, email) = registration.normalized()?;
        let user = self.create_user(username, email, &registration.password, Role::User)?;
        info!(user_id = %user.id, "account registered");
        self.issue(&user)
    }

    pub fn login(&self, credentials: Credentials) -> Result<AuthSession, AuthError> {
        let email = credentials.normalized_email()?;
        let Some(user) = self.users.user_by_email(&email)? else {
            warn!("login attempt for unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&credentials.password, &user.password_hash)? {
            warn!(user_id = %user.id, "login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue(&user)
    }

    pub fn logout(&self, token: &SessionToken) -> Result<(), AuthError> {
        self.sessions.remove_session(&token.fingerprint())?;
        Ok(())
    }

    /// Create the configured administrator, or promote the account that already owns the email.
    pub fn ensure_admin(&self, bootstrap: &AdminBootstrap) -> Result<UserView, AuthError> {
        let registration = Registration {
            username: bootstrap.username.clone(),
            email: bootstrap.email.clone(),
            password: bootstrap.password.clone(),
        };
        let (username, email) = registration.normalized()?;

        if let Some(mut existing) = self.users.user_by_email(&email)? {
            if existing.role != Role::Admin {
                existing.role = Role::Admin;
                existing = self.users.replace_user(existing)?;
                info!(user_id = %existing.id, "existing account promoted to admin");
            }
            return Ok(existing.view());
        }

        let admin = self.create_user(username, email, &bootstrap.password, Role::Admin)?;
        info!(user_id = %admin.id, "admin account created");
        Ok(admin.view())
    }

    pub fn user(&self, id: &UserId) -> Result<Option<UserView>, AuthError> {
        Ok(self.users.user(id)?.map(|user| user.view()))
    }

    fn create_user(
        &self,
        username: String,
        email: String,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        if self.users.user_by_email(&email)?.is_some() {
            return Err(AuthError::DuplicateUser);
        }

        let user = User {
            id: UserId::generate(),
            username,
            email,
            password_hash: self.hasher.hash(password)?,
            role,
            created_at: Utc::now(),
        };

        match self.users.insert_user(user) {
            Ok(user) => Ok(user),
            Err(RepositoryError::Duplicate) => Err(AuthError::DuplicateUser),
            Err(err) => Err(err.into()),
        }
    }

    fn issue(&self, user: &User) -> Result<AuthSession, AuthError> {
        let token = SessionToken::generate();
        let issued_at = Utc::now();
        self.sessions.insert_session(
            token.fingerprint(),
            Session {
                user: user.id,
                issued_at,
                expires_at: issued_at + self.session_ttl,
            },
        )?;

        Ok(AuthSession {
            token,
            user: user.view(),
        })
    }
}

impl<U, S> SessionResolver for AuthService<U, S>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    fn resolve(&self, token: &SessionToken) -> Result<Caller, AuthError> {
        let fingerprint = token.fingerprint();
        let session = self
            .sessions
            .session(&fingerprint)?
            .ok_or(AuthError::InvalidSession)?;

        if session.is_expired(Utc::now()) {
            self.sessions.remove_session(&fingerprint)?;
            return Err(AuthError::InvalidSession);
        }

        // Role is read from the account so promotions apply to live sessions.
        let user = self
            .users
            .user(&session.user)?
            .ok_or(AuthError::InvalidSession)?;

        Ok(Caller {
            user_id: user.id,
            role: user.role,
        })
    }
}

/// Error raised by the auth service and session extractors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] AuthValidationError),
    #[error("User already exists")]
    DuplicateUser,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Authentication required")]
    MissingToken,
    #[error("Session is invalid or has expired")]
    InvalidSession,
    #[error("Admin access required")]
    Forbidden,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
