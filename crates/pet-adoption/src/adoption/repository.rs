use super::domain::{Application, ApplicationId, ApplicationStatus};
use crate::auth::UserId;
use crate::catalog::{PetId, PetRepository, PetStatus};
use crate::pagination::{Page, PageRequest};
use crate::store::RepositoryError;

/// One guarded write. `expected` values are compared against the stored document at commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Fails with `Duplicate` if the (user, pet) pair already has an application.
    InsertApplication(Application),
    SetPetStatus {
        pet: PetId,
        expected: PetStatus,
        next: PetStatus,
    },
    SetApplicationStatus {
        application: ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    },
    /// Read guard only: the application must still hold `expected`.
    ExpectApplicationStatus {
        application: ApplicationId,
        expected: ApplicationStatus,
    },
}

/// Writes applied all-or-nothing by [`AdoptionRepository::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Application storage. Pet reads come from the [`PetRepository`] supertrait so
/// both collections are reachable through one store for atomic commits.
pub trait AdoptionRepository: PetRepository {
    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn application_by(
        &self,
        user: &UserId,
        pet: &PetId,
    ) -> Result<Option<Application>, RepositoryError>;
    /// Newest first.
    fn applications_for_pet(&self, pet: &PetId) -> Result<Vec<Application>, RepositoryError>;
    /// Newest first.
    fn applications_for_user(&self, user: &UserId) -> Result<Vec<Application>, RepositoryError>;
    /// Newest first, optionally restricted to one status.
    fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError>;
    /// Apply every op or none. A failed guard yields `Stale`, a uniqueness clash `Duplicate`.
    fn commit(&self, batch: WriteBatch) -> Result<(), RepositoryError>;
}
