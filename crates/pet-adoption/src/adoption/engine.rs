//! Status engine for the adoption workflow.
//!
//! Every function here is pure: it inspects the documents the caller read and
//! returns the [`WriteBatch`] that moves them to their next state. Guards in the
//! batch pin the statuses the plan was computed from, so the store rejects the
//! whole batch if another request got there first.
//!
//! Application: `pending -> approved` and `pending -> rejected`, both terminal.
//! Pet: `available -> pending` on submit, then `adopted` on approval, or back to
//! `available` once its last pending application is rejected.

use super::domain::{Application, ApplicationId, ApplicationStatus, Decision};
use super::repository::{WriteBatch, WriteOp};
use crate::catalog::{Pet, PetId, PetStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("pet {pet} is {status}, not available for adoption")]
    PetUnavailable { pet: PetId, status: PetStatus },
    #[error("an application for this pet already exists for the applicant")]
    DuplicateApplication,
    #[error("application {application} was already {status}")]
    AlreadyDecided {
        application: ApplicationId,
        status: ApplicationStatus,
    },
}

/// Plan a new application: insert it pending and put the pet on hold.
pub fn plan_submission(
    pet: &Pet,
    existing: Option<&Application>,
    draft: Application,
) -> Result<WriteBatch, TransitionError> {
    if pet.status != PetStatus::Available {
        return Err(TransitionError::PetUnavailable {
            pet: pet.id,
            status: pet.status,
        });
    }
    if existing.is_some() {
        return Err(TransitionError::DuplicateApplication);
    }

    let mut batch = WriteBatch::new();
    batch
        .push(WriteOp::InsertApplication(draft))
        .push(WriteOp::SetPetStatus {
            pet: pet.id,
            expected: PetStatus::Available,
            next: PetStatus::Pending,
        });
    Ok(batch)
}

/// Plan an admin decision on `application`.
///
/// `pet` is `None` when the listing was deleted; only the application moves then.
/// `siblings` are the applications on the same pet and may include `application` itself.
pub fn plan_decision(
    application: &Application,
    decision: Decision,
    pet: Option<&Pet>,
    siblings: &[Application],
) -> Result<WriteBatch, TransitionError> {
    if application.status.is_decided() {
        return Err(TransitionError::AlreadyDecided {
            application: application.id,
            status: application.status,
        });
    }

    let mut batch = WriteBatch::new();
    batch.push(WriteOp::SetApplicationStatus {
        application: application.id,
        expected: ApplicationStatus::Pending,
        next: decision.outcome(),
    });

    let Some(pet) = pet else {
        return Ok(batch);
    };

    let rivals = siblings
        .iter()
        .filter(|other| other.id != application.id && other.status == ApplicationStatus::Pending);

    match decision {
        Decision::Approve => {
            for rival in rivals {
                batch.push(WriteOp::SetApplicationStatus {
                    application: rival.id,
                    expected: ApplicationStatus::Pending,
                    next: ApplicationStatus::Rejected,
                });
            }
            batch.push(WriteOp::SetPetStatus {
                pet: pet.id,
                expected: pet.status,
                next: PetStatus::Adopted,
            });
        }
        Decision::Reject => {
            let mut still_pending = false;
            for rival in rivals {
                still_pending = true;
                // Pin each survivor so a concurrent rejection cannot leave the pet stranded.
                batch.push(WriteOp::ExpectApplicationStatus {
                    application: rival.id,
                    expected: ApplicationStatus::Pending,
                });
            }
            if !still_pending && pet.status == PetStatus::Pending {
                batch.push(WriteOp::SetPetStatus {
                    pet: pet.id,
                    expected: PetStatus::Pending,
                    next: PetStatus::Available,
                });
            }
        }
    }

    Ok(batch)
}

/// Pet status implied by its applications, or `None` when no application
/// constrains it (the pet is then whatever an admin last set).
pub fn derived_pet_status(applications: &[Application]) -> Option<PetStatus> {
    if applications
        .iter()
        .any(|application| application.status == ApplicationStatus::Approved)
    {
        Some(PetStatus::Adopted)
    } else if applications
        .iter()
        .any(|application| application.status == ApplicationStatus::Pending)
    {
        Some(PetStatus::Pending)
    } else {
        None
    }
}
