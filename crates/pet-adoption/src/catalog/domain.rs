use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;
use uuid::Uuid;

/// Identifier wrapper for pet documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetId(pub Uuid);

impl PetId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for PetId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Availability of a pet. Workflow transitions are owned by the adoption engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Adopted,
}

impl PetStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Adopted => "adopted",
        }
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status must be available, adopted, or pending (got '{0}')")]
pub struct UnknownPetStatus(pub String);

impl FromStr for PetStatus {
    type Err = UnknownPetStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "pending" => Ok(Self::Pending),
            "adopted" => Ok(Self::Adopted),
            _ => Err(UnknownPetStatus(raw.to_string())),
        }
    }
}

/// Adoptable animal listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: PetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    pub fn summary(&self) -> PetSummary {
        PetSummary {
            id: self.id,
            name: self.name.clone(),
            species: self.species.clone(),
            breed: self.breed.clone(),
            age: self.age,
            image_url: self.image_url.clone(),
            status: self.status,
        }
    }

    fn apply(&mut self, update: PetUpdate) {
        let PetUpdate {
            name,
            species,
            breed,
            age,
            description,
            image_url,
            status,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(species) = species {
            self.species = species;
        }
        if let Some(breed) = breed {
            self.breed = breed;
        }
        if let Some(age) = age {
            self.age = age;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(image_url) = image_url {
            self.image_url = image_url;
        }
        if let Some(status) = status {
            self.status = status;
        }
    }

    /// Apply a validated partial update, stamping `updated_at`.
    pub fn updated(mut self, update: PetUpdate, now: DateTime<Utc>) -> Self {
        self.apply(update);
        self.updated_at = now;
        self
    }
}

/// Pet fields embedded in application listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSummary {
    pub id: PetId,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: PetStatus,
}

/// Admin payload for a new listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: u32,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewPet {
    /// Trim and check every field, producing an `available` pet.
    pub fn into_pet(self, now: DateTime<Utc>) -> Result<Pet, PetValidationError> {
        Ok(Pet {
            id: PetId::generate(),
            name: required("name", self.name)?,
            species: required("species", self.species)?,
            breed: required("breed", self.breed)?,
            age: self.age,
            description: required("description", self.description)?,
            image_url: self.image_url.map(image_url).transpose()?,
            status: PetStatus::Available,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Admin payload for a partial edit. Absent fields are left untouched;
/// `imageUrl: null` or an empty string removes the image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<PetStatus>,
}

impl PetUpdate {
    pub fn validated(self) -> Result<Self, PetValidationError> {
        Ok(Self {
            name: self.name.map(|v| required("name", v)).transpose()?,
            species: self.species.map(|v| required("species", v)).transpose()?,
            breed: self.breed.map(|v| required("breed", v)).transpose()?,
            age: self.age,
            description: self
                .description
                .map(|v| required("description", v))
                .transpose()?,
            image_url: match self.image_url {
                Some(Some(raw)) if raw.trim().is_empty() => Some(None),
                Some(Some(raw)) => Some(Some(image_url(raw)?)),
                other => other,
            },
            status: self.status,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PetValidationError {
    #[error("{field} cannot be empty")]
    Blank { field: &'static str },
    #[error("Image URL must be a valid URL")]
    InvalidImageUrl,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn required(field: &'static str, value: String) -> Result<String, PetValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PetValidationError::Blank { field });
    }
    Ok(trimmed.to_string())
}

fn image_url(raw: String) -> Result<String, PetValidationError> {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {
            Ok(trimmed.to_string())
        }
        _ => Err(PetValidationError::InvalidImageUrl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_pet() -> NewPet {
        NewPet {
            name: "  Max ".to_string(),
            species: "Dog".to_string(),
            breed: "Golden Retriever".to_string(),
            age: 3,
            description: "Loves to play fetch.".to_string(),
            image_url: Some("https://images.example.com/max.jpg".to_string()),
        }
    }

    #[test]
    fn new_pets_start_available_with_trimmed_fields() {
        let pet = new_pet().into_pet(Utc::now()).expect("valid pet");
        assert_eq!(pet.name, "Max");
        assert_eq!(pet.status, PetStatus::Available);
        assert_eq!(pet.created_at, pet.updated_at);
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut payload = new_pet();
        payload.breed = "   ".to_string();
        assert_eq!(
            payload.into_pet(Utc::now()),
            Err(PetValidationError::Blank { field: "breed" })
        );
    }

    #[test]
    fn image_url_must_be_absolute_http() {
        let mut payload = new_pet();
        payload.image_url = Some("not a url".to_string());
        assert_eq!(
            payload.into_pet(Utc::now()),
            Err(PetValidationError::InvalidImageUrl)
        );

        let update = PetUpdate {
            image_url: Some(Some("ftp://files.example.com/max.jpg".to_string())),
            ..PetUpdate::default()
        };
        assert_eq!(update.validated(), Err(PetValidationError::InvalidImageUrl));
    }

    #[test]
    fn updates_only_touch_present_fields() {
        let pet = new_pet().into_pet(Utc::now()).expect("valid pet");
        let later = pet.updated_at + chrono::Duration::minutes(5);
        let update = PetUpdate {
            age: Some(4),
            description: Some(" Calmer now. ".to_string()),
            ..PetUpdate::default()
        }
        .validated()
        .expect("valid update");

        let updated = pet.clone().updated(update, later);
        assert_eq!(updated.age, 4);
        assert_eq!(updated.description, "Calmer now.");
        assert_eq!(updated.name, pet.name);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.created_at, pet.created_at);
    }

    #[test]
    fn image_can_be_replaced_or_removed() {
        let pet = new_pet().into_pet(Utc::now()).expect("valid pet");

        let untouched: PetUpdate = serde_json::from_str(r#"{"age": 4}"#).expect("json");
        assert_eq!(untouched.image_url, None);
        let kept = pet.clone().updated(untouched.validated().expect("valid"), Utc::now());
        assert_eq!(kept.image_url, pet.image_url);

        let cleared: PetUpdate = serde_json::from_str(r#"{"imageUrl": null}"#).expect("json");
        assert_eq!(cleared.image_url, Some(None));
        let removed = pet.clone().updated(cleared.validated().expect("valid"), Utc::now());
        assert_eq!(removed.image_url, None);

        let blank: PetUpdate = serde_json::from_str(r#"{"imageUrl": "  "}"#).expect("json");
        assert_eq!(blank.validated().expect("valid").image_url, Some(None));

        let replaced: PetUpdate =
            serde_json::from_str(r#"{"imageUrl": "https://images.example.com/new.jpg"}"#)
                .expect("json");
        let updated = pet.updated(replaced.validated().expect("valid"), Utc::now());
        assert_eq!(
            updated.image_url.as_deref(),
            Some("https://images.example.com/new.jpg")
        );
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Adopted".parse::<PetStatus>(), Ok(PetStatus::Adopted));
        assert!("sold".parse::<PetStatus>().is_err());
    }
}
