//! Translation of listing query parameters into a pet filter and page window.

use serde::Deserialize;

use super::domain::{Pet, PetStatus, UnknownPetStatus};
use crate::pagination::{PageRequest, PageRequestError};

/// Raw query-string parameters for `GET /api/pets`. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetListParams {
    pub search: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub min_age: Option<String>,
    pub max_age: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Compiled listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetQuery {
    pub filter: PetFilter,
    pub page: PageRequest,
}

impl TryFrom<PetListParams> for PetQuery {
    type Error = QueryError;

    fn try_from(params: PetListParams) -> Result<Self, Self::Error> {
        let page = PageRequest::from_raw(params.page.as_deref(), params.limit.as_deref())?;

        let filter = PetFilter {
            search: present(params.search),
            species: present(params.species),
            breed: present(params.breed),
            min_age: age_bound("minAge", params.min_age)?,
            max_age: age_bound("maxAge", params.max_age)?,
            status: present(params.status)
                .map(|raw| raw.parse::<PetStatus>())
                .transpose()?,
        };

        Ok(Self { filter, page })
    }
}

/// Predicate over pets. Text criteria are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFilter {
    search: Option<String>,
    species: Option<String>,
    breed: Option<String>,
    min_age: Option<u32>,
    max_age: Option<u32>,
    status: Option<PetStatus>,
}

impl PetFilter {
    pub fn search(mut self, text: &str) -> Self {
        self.search = present(Some(text.to_string()));
        self
    }

    pub fn species(mut self, text: &str) -> Self {
        self.species = present(Some(text.to_string()));
        self
    }

    pub fn breed(mut self, text: &str) -> Self {
        self.breed = present(Some(text.to_string()));
        self
    }

    pub fn age_between(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_age = min;
        self.max_age = max;
        self
    }

    pub fn status(mut self, status: PetStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, pet: &Pet) -> bool {
        if let Some(needle) = &self.search {
            if !contains_folded(&pet.name, needle) && !contains_folded(&pet.breed, needle) {
                return false;
            }
        } else if let Some(needle) = &self.breed {
            // Free-text search already covers breed; the dedicated filter only applies without it.
            if !contains_folded(&pet.breed, needle) {
                return false;
            }
        }

        if let Some(needle) = &self.species {
            if !contains_folded(&pet.species, needle) {
                return false;
            }
        }

        if self.min_age.is_some_and(|min| pet.age < min) {
            return false;
        }
        if self.max_age.is_some_and(|max| pet.age > max) {
            return false;
        }

        self.status.map_or(true, |status| pet.status == status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Page(#[from] PageRequestError),
    #[error("{field} must be a non-negative integer")]
    InvalidAge { field: &'static str },
    #[error(transparent)]
    Status(#[from] UnknownPetStatus),
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_lowercase())
        .filter(|raw| !raw.is_empty())
}

fn age_bound(field: &'static str, raw: Option<String>) -> Result<Option<u32>, QueryError> {
    match raw.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| QueryError::InvalidAge { field }),
        None => Ok(None),
    }
}

fn contains_folded(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}
