use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    Application, ApplicationId, ApplicationRequest, ApplicationStatus, ApplicationView, Decision,
};
use super::engine::{plan_decision, plan_submission, TransitionError};
use super::repository::AdoptionRepository;
use crate::auth::{UserId, UserRepository};
use crate::catalog::{PetId, PetStatus};
use crate::pagination::{Page, PageRequest};
use crate::store::RepositoryError;

/// Service driving applications through the status engine and into the store.
pub struct AdoptionService<R, U> {
    repository: Arc<R>,
    users: Arc<U>,
}

impl<R, U> AdoptionService<R, U>
where
    R: AdoptionRepository + 'static,
    U: UserRepository + 'static,
{
    pub fn new(repository: Arc<R>, users: Arc<U>) -> Self {
        Self { repository, users }
    }

    /// Apply for a pet on behalf of `applicant`. The pet moves to `pending` in the same write.
    pub fn submit(
        &self,
        applicant: &UserId,
        request: ApplicationRequest,
    ) -> Result<ApplicationView, AdoptionServiceError> {
        let pet_id: PetId = request
            .pet_id
            .parse()
            .map_err(|_| AdoptionServiceError::InvalidPetId(request.pet_id.clone()))?;

        let pet = self
            .repository
            .pet(&pet_id)?
            .ok_or(AdoptionServiceError::PetNotFound)?;
        let existing = self.repository.application_by(applicant, &pet_id)?;
        let draft = Application::draft(*applicant, pet_id, request.message, Utc::now());
        let application_id = draft.id;

        let batch = plan_submission(&pet, existing.as_ref(), draft)?;
        match self.repository.commit(batch) {
            Ok(()) => {}
            Err(RepositoryError::Duplicate) => {
                return Err(TransitionError::DuplicateApplication.into())
            }
            Err(RepositoryError::NotFound) => return Err(AdoptionServiceError::PetNotFound),
            Err(RepositoryError::Stale) => return Err(self.explain_stale_pet(&pet_id)),
            Err(err) => return Err(err.into()),
        }

        info!(
            application_id = %application_id,
            pet_id = %pet_id,
            user_id = %applicant,
            "application submitted"
        );
        self.view(self.stored(&application_id)?, false)
    }

    /// Approve or reject a pending application, updating the pet and rival applications.
    pub fn decide(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationView, AdoptionServiceError> {
        let decision =
            Decision::try_from(status).map_err(|_| AdoptionServiceError::UndecidedStatus)?;
        let application = self.stored(id)?;
        let pet = self.repository.pet(&application.pet)?;
        let siblings = self.repository.applications_for_pet(&application.pet)?;

        let batch = plan_decision(&application, decision, pet.as_ref(), &siblings)?;
        match self.repository.commit(batch) {
            Ok(()) => {}
            Err(RepositoryError::Stale) => return Err(self.explain_stale_application(id)),
            Err(err) => return Err(err.into()),
        }

        info!(
            application_id = %id,
            pet_id = %application.pet,
            status = %decision.outcome(),
            "application decided"
        );
        self.view(self.stored(id)?, true)
    }

    /// The caller's own applications with their pets, newest first.
    pub fn mine(&self, applicant: &UserId) -> Result<Vec<ApplicationView>, AdoptionServiceError> {
        self.repository
            .applications_for_user(applicant)?
            .into_iter()
            .map(|application| self.view(application, false))
            .collect()
    }

    /// Admin listing across all pets, optionally narrowed to one status.
    pub fn list(
        &self,
        status: Option<ApplicationStatus>,
        page: PageRequest,
    ) -> Result<Page<ApplicationView>, AdoptionServiceError> {
        let page = self.repository.list_applications(status, page)?;
        let Page {
            data,
            total,
            page,
            limit,
            total_pages,
        } = page;
        let data = data
            .into_iter()
            .map(|application| self.view(application, true))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            data,
            total,
            page,
            limit,
            total_pages,
        })
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationView, AdoptionServiceError> {
        self.view(self.stored(id)?, true)
    }

    /// Every application on one pet with applicant details.
    pub fn for_pet(&self, pet: &PetId) -> Result<Vec<ApplicationView>, AdoptionServiceError> {
        if self.repository.pet(pet)?.is_none() {
            return Err(AdoptionServiceError::PetNotFound);
        }
        self.repository
            .applications_for_pet(pet)?
            .into_iter()
            .map(|application| self.view(application, true))
            .collect()
    }

    fn stored(&self, id: &ApplicationId) -> Result<Application, AdoptionServiceError> {
        self.repository
            .application(id)?
            .ok_or(AdoptionServiceError::ApplicationNotFound)
    }

    fn view(
        &self,
        application: Application,
        with_applicant: bool,
    ) -> Result<ApplicationView, AdoptionServiceError> {
        let pet = self.repository.pet(&application.pet)?.map(|pet| pet.summary());
        let applicant = if with_applicant {
            self.users.user(&application.user)?.map(|user| user.summary())
        } else {
            None
        };
        Ok(ApplicationView::new(application, pet, applicant))
    }

    fn explain_stale_pet(&self, pet_id: &PetId) -> AdoptionServiceError {
        match self.repository.pet(pet_id) {
            Ok(Some(pet)) if pet.status != PetStatus::Available => {
                warn!(pet_id = %pet_id, status = %pet.status, "pet claimed by a concurrent request");
                TransitionError::PetUnavailable {
                    pet: pet.id,
                    status: pet.status,
                }
                .into()
            }
            Ok(None) => AdoptionServiceError::PetNotFound,
            Ok(Some(_)) => RepositoryError::Stale.into(),
            Err(err) => err.into(),
        }
    }

    fn explain_stale_application(&self, id: &ApplicationId) -> AdoptionServiceError {
        match self.repository.application(id) {
            Ok(Some(application)) if application.status.is_decided() => {
                warn!(application_id = %id, status = %application.status, "application decided by a concurrent request");
                TransitionError::AlreadyDecided {
                    application: application.id,
                    status: application.status,
                }
                .into()
            }
            Ok(None) => AdoptionServiceError::ApplicationNotFound,
            Ok(Some(_)) => RepositoryError::Stale.into(),
            Err(err) => err.into(),
        }
    }
}

/// Error raised by the adoption service.
#[derive(Debug, thiserror::Error)]
pub enum AdoptionServiceError {
    #[error("invalid pet id '{0}'")]
    InvalidPetId(String),
    #[error("Status must be approved or rejected")]
    UndecidedStatus,
    #[error("pet not found")]
    PetNotFound,
    #[error("application not found")]
    ApplicationNotFound,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
