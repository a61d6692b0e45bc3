use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{UserId, UserSummary};
use crate::catalog::{PetId, PetSummary};

/// Identifier wrapper for adoption applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub Uuid);

impl ApplicationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for ApplicationId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status must be pending, approved, or rejected (got '{0}')")]
pub struct UnknownApplicationStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownApplicationStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(UnknownApplicationStatus(raw.to_string())),
        }
    }
}

/// Admin verdict on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub const fn outcome(self) -> ApplicationStatus {
        match self {
            Self::Approve => ApplicationStatus::Approved,
            Self::Reject => ApplicationStatus::Rejected,
        }
    }
}

impl TryFrom<ApplicationStatus> for Decision {
    type Error = ApplicationStatus;

    fn try_from(status: ApplicationStatus) -> Result<Self, Self::Error> {
        match status {
            ApplicationStatus::Approved => Ok(Self::Approve),
            ApplicationStatus::Rejected => Ok(Self::Reject),
            ApplicationStatus::Pending => Err(status),
        }
    }
}

/// One user's request to adopt one pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub user: UserId,
    pub pet: PetId,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Fresh pending application. Blank messages are dropped.
    pub fn draft(
        user: UserId,
        pet: PetId,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let message = message
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        Self {
            id: ApplicationId::generate(),
            user,
            pet,
            status: ApplicationStatus::Pending,
            message,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `POST /api/applications`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub pet_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `PATCH /api/applications/:id/status`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusChangeRequest {
    pub status: ApplicationStatus,
}

/// Application with its pet and applicant populated for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub pet_id: PetId,
    pub user_id: UserId,
    /// Absent when the pet listing was deleted after the application was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet: Option<PetSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationView {
    pub fn new(
        application: Application,
        pet: Option<PetSummary>,
        applicant: Option<UserSummary>,
    ) -> Self {
        Self {
            id: application.id,
            status: application.status,
            message: application.message,
            pet_id: application.pet,
            user_id: application.user,
            pet,
            applicant,
            created_at: application.created_at,
            updated_at: application.updated_at,
        }
    }
}
