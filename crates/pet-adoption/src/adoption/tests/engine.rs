use chrono::Utc;

use super::common::new_pet;
use crate::adoption::engine::{derived_pet_status, plan_decision, plan_submission, TransitionError};
use crate::adoption::repository::WriteOp;
use crate::adoption::{Application, ApplicationStatus, Decision};
use crate::auth::UserId;
use crate::catalog::{Pet, PetStatus};

fn pet_with(status: PetStatus) -> Pet {
    let mut pet = new_pet("Charlie").into_pet(Utc::now()).expect("valid pet");
    pet.status = status;
    pet
}

fn pending_for(pet: &Pet) -> Application {
    Application::draft(UserId::generate(), pet.id, None, Utc::now())
}

fn decided(mut application: Application, status: ApplicationStatus) -> Application {
    application.status = status;
    application
}

#[test]
fn submission_inserts_and_holds_the_pet() {
    let pet = pet_with(PetStatus::Available);
    let draft = pending_for(&pet);

    let batch = plan_submission(&pet, None, draft.clone()).expect("pet is available");

    assert_eq!(
        batch.ops(),
        &[
            WriteOp::InsertApplication(draft),
            WriteOp::SetPetStatus {
                pet: pet.id,
                expected: PetStatus::Available,
                next: PetStatus::Pending,
            },
        ]
    );
}

#[test]
fn submission_requires_an_available_pet() {
    for status in [PetStatus::Pending, PetStatus::Adopted] {
        let pet = pet_with(status);
        let err = plan_submission(&pet, None, pending_for(&pet)).expect_err("not available");
        assert_eq!(
            err,
            TransitionError::PetUnavailable {
                pet: pet.id,
                status
            }
        );
    }
}

#[test]
fn submission_rejects_a_repeat_applicant() {
    let pet = pet_with(PetStatus::Available);
    let earlier = decided(pending_for(&pet), ApplicationStatus::Rejected);

    let err = plan_submission(&pet, Some(&earlier), pending_for(&pet)).expect_err("duplicate");
    assert_eq!(err, TransitionError::DuplicateApplication);
}

#[test]
fn approval_adopts_the_pet_and_rejects_rivals() {
    let pet = pet_with(PetStatus::Pending);
    let chosen = pending_for(&pet);
    let rival = pending_for(&pet);
    let already_rejected = decided(pending_for(&pet), ApplicationStatus::Rejected);
    let siblings = vec![chosen.clone(), rival.clone(), already_rejected];

    let batch =
        plan_decision(&chosen, Decision::Approve, Some(&pet), &siblings).expect("pending");

    assert_eq!(
        batch.ops(),
        &[
            WriteOp::SetApplicationStatus {
                application: chosen.id,
                expected: ApplicationStatus::Pending,
                next: ApplicationStatus::Approved,
            },
            WriteOp::SetApplicationStatus {
                application: rival.id,
                expected: ApplicationStatus::Pending,
                next: ApplicationStatus::Rejected,
            },
            WriteOp::SetPetStatus {
                pet: pet.id,
                expected: PetStatus::Pending,
                next: PetStatus::Adopted,
            },
        ]
    );
}

#[test]
fn rejecting_the_last_pending_application_frees_the_pet() {
    let pet = pet_with(PetStatus::Pending);
    let only = pending_for(&pet);

    let batch = plan_decision(&only, Decision::Reject, Some(&pet), std::slice::from_ref(&only))
        .expect("pending");

    assert_eq!(
        batch.ops(),
        &[
            WriteOp::SetApplicationStatus {
                application: only.id,
                expected: ApplicationStatus::Pending,
                next: ApplicationStatus::Rejected,
            },
            WriteOp::SetPetStatus {
                pet: pet.id,
                expected: PetStatus::Pending,
                next: PetStatus::Available,
            },
        ]
    );
}

#[test]
fn rejecting_one_of_several_keeps_the_pet_on_hold() {
    let pet = pet_with(PetStatus::Pending);
    let first = pending_for(&pet);
    let second = pending_for(&pet);
    let siblings = vec![first.clone(), second.clone()];

    let batch = plan_decision(&first, Decision::Reject, Some(&pet), &siblings).expect("pending");

    assert_eq!(
        batch.ops(),
        &[
            WriteOp::SetApplicationStatus {
                application: first.id,
                expected: ApplicationStatus::Pending,
                next: ApplicationStatus::Rejected,
            },
            WriteOp::ExpectApplicationStatus {
                application: second.id,
                expected: ApplicationStatus::Pending,
            },
        ]
    );
}

#[test]
fn rejection_leaves_an_admin_set_status_alone() {
    let pet = pet_with(PetStatus::Adopted);
    let only = pending_for(&pet);

    let batch = plan_decision(&only, Decision::Reject, Some(&pet), std::slice::from_ref(&only))
        .expect("pending");

    assert_eq!(batch.ops().len(), 1);
}

#[test]
fn decided_applications_are_final() {
    let pet = pet_with(PetStatus::Adopted);
    let approved = decided(pending_for(&pet), ApplicationStatus::Approved);

    for decision in [Decision::Approve, Decision::Reject] {
        let err = plan_decision(&approved, decision, Some(&pet), std::slice::from_ref(&approved))
            .expect_err("already decided");
        assert_eq!(
            err,
            TransitionError::AlreadyDecided {
                application: approved.id,
                status: ApplicationStatus::Approved,
            }
        );
    }
}

#[test]
fn deleted_pet_only_moves_the_application() {
    let pet = pet_with(PetStatus::Pending);
    let application = pending_for(&pet);

    let batch = plan_decision(&application, Decision::Approve, None, &[]).expect("pending");

    assert_eq!(
        batch.ops(),
        &[WriteOp::SetApplicationStatus {
            application: application.id,
            expected: ApplicationStatus::Pending,
            next: ApplicationStatus::Approved,
        }]
    );
}

#[test]
fn derived_status_follows_the_strongest_application() {
    let pet = pet_with(PetStatus::Available);
    let pending = pending_for(&pet);
    let approved = decided(pending_for(&pet), ApplicationStatus::Approved);
    let rejected = decided(pending_for(&pet), ApplicationStatus::Rejected);

    assert_eq!(derived_pet_status(&[]), None);
    assert_eq!(derived_pet_status(std::slice::from_ref(&rejected)), None);
    assert_eq!(
        derived_pet_status(&[rejected.clone(), pending.clone()]),
        Some(PetStatus::Pending)
    );
    assert_eq!(
        derived_pet_status(&[pending, approved, rejected]),
        Some(PetStatus::Adopted)
    );
}
