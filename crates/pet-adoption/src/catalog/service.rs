use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{NewPet, Pet, PetId, PetUpdate, PetValidationError};
use super::query::{PetQuery, QueryError};
use super::repository::PetRepository;
use crate::pagination::Page;
use crate::store::RepositoryError;

/// Catalogue operations: public browsing and admin listing management.
pub struct CatalogService<R> {
    repository: Arc<R>,
}

impl<R> CatalogService<R>
where
    R: PetRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn list(&self, query: &PetQuery) -> Result<Page<Pet>, CatalogError> {
        Ok(self.repository.search_pets(&query.filter, query.page)?)
    }

    pub fn get(&self, id: &PetId) -> Result<Pet, CatalogError> {
        self.repository.pet(id)?.ok_or(CatalogError::NotFound)
    }

    pub fn create(&self, payload: NewPet) -> Result<Pet, CatalogError> {
        let pet = payload.into_pet(Utc::now())?;
        let stored = self.repository.insert_pet(pet)?;
        info!(pet_id = %stored.id, name = %stored.name, "pet listed");
        Ok(stored)
    }

    /// Partial edit. A status override is refused while the adoption workflow owns the pet.
    pub fn update(&self, id: &PetId, update: PetUpdate) -> Result<Pet, CatalogError> {
        let update = update.validated()?;
        let current = self.get(id)?;

        if let Some(requested) = update.status.filter(|status| *status != current.status) {
            let open = self.repository.open_application_count(id)?;
            if open > 0 {
                return Err(CatalogError::StatusLocked {
                    pet: *id,
                    open_applications: open,
                });
            }
            info!(pet_id = %id, from = %current.status, to = %requested, "pet status overridden");
        }

        let expected = current.status;
        let updated = current.updated(update, Utc::now());
        match self.repository.replace_pet(updated, expected) {
            Ok(pet) => Ok(pet),
            Err(RepositoryError::NotFound) => Err(CatalogError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    pub fn delete(&self, id: &PetId) -> Result<(), CatalogError> {
        match self.repository.delete_pet(id) {
            Ok(()) => {
                info!(pet_id = %id, "pet deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(CatalogError::NotFound),
            Err(err) => Err(err.into()),
        }
    }
}

/// Error raised by the catalogue service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] PetValidationError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("pet not found")]
    NotFound,
    #[error("pet {pet} has {open_applications} open application(s); decide them before changing its status")]
    StatusLocked { pet: PetId, open_applications: usize },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
