//! Pet catalogue: listings, the search/pagination query builder, and admin edits.

pub mod domain;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{NewPet, Pet, PetId, PetStatus, PetSummary, PetUpdate, PetValidationError};
pub use query::{PetFilter, PetListParams, PetQuery, QueryError};
pub use repository::PetRepository;
pub use router::catalog_router;
pub use service::{CatalogError, CatalogService};
