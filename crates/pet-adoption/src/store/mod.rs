//! Document storage shared by every repository trait.

pub mod memory;

pub use memory::MemoryStore;

/// Error returned by repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Duplicate,
    #[error("record not found")]
    NotFound,
    #[error("record changed since it was read")]
    Stale,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
