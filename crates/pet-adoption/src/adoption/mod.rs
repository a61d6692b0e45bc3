//! Adoption applications and the status engine that keeps pets in step with them.
//!
//! Handlers read through [`AdoptionRepository`], ask the [`engine`] for the
//! next state, and commit the resulting [`WriteBatch`] in one step.

pub mod domain;
pub mod engine;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationRequest, ApplicationStatus, ApplicationView, Decision,
    StatusChangeRequest, UnknownApplicationStatus,
};
pub use engine::{derived_pet_status, plan_decision, plan_submission, TransitionError};
pub use repository::{AdoptionRepository, WriteBatch, WriteOp};
pub use router::{adoption_router, ApplicationListParams};
pub use service::{AdoptionService, AdoptionServiceError};
