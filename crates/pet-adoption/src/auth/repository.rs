use super::domain::{User, UserId};
use super::session::{Session, TokenFingerprint};
use crate::store::RepositoryError;

/// Storage abstraction for accounts. Email and username are unique.
pub trait UserRepository: Send + Sync {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    fn replace_user(&self, user: User) -> Result<User, RepositoryError>;
}

/// Storage abstraction for issued sessions, keyed by token fingerprint.
pub trait SessionRepository: Send + Sync {
    fn insert_session(
        &self,
        fingerprint: TokenFingerprint,
        session: Session,
    ) -> Result<(), RepositoryError>;
    fn session(&self, fingerprint: &TokenFingerprint) -> Result<Option<Session>, RepositoryError>;
    fn remove_session(&self, fingerprint: &TokenFingerprint) -> Result<(), RepositoryError>;
}
