use super::domain::{Pet, PetId, PetStatus};
use super::query::PetFilter;
use crate::pagination::{Page, PageRequest};
use crate::store::RepositoryError;

/// Storage abstraction for pet documents.
pub trait PetRepository: Send + Sync {
    fn insert_pet(&self, pet: Pet) -> Result<Pet, RepositoryError>;
    fn pet(&self, id: &PetId) -> Result<Option<Pet>, RepositoryError>;
    /// Overwrite a pet, failing with `Stale` if its status is no longer `expected`.
    fn replace_pet(&self, pet: Pet, expected: PetStatus) -> Result<Pet, RepositoryError>;
    fn delete_pet(&self, id: &PetId) -> Result<(), RepositoryError>;
    /// Filtered listing, newest first.
    fn search_pets(&self, filter: &PetFilter, page: PageRequest)
        -> Result<Page<Pet>, RepositoryError>;
    fn pet_count(&self) -> Result<usize, RepositoryError>;
    /// Applications on this pet that are still `pending` or already `approved`.
    fn open_application_count(&self, id: &PetId) -> Result<usize, RepositoryError>;
}
