//! Demo catalogue loaded into an empty store at startup.

use chrono::Utc;
use tracing::info;

use crate::catalog::{NewPet, PetRepository, PetStatus, PetValidationError};
use crate::store::RepositoryError;

struct SeedPet {
    name: &'static str,
    species: &'static str,
    breed: &'static str,
    age: u32,
    description: &'static str,
    status: PetStatus,
    image_url: &'static str,
}

const DEMO_PETS: &[SeedPet] = &[
    SeedPet {
        name: "Max",
        species: "Dog",
        breed: "Golden Retriever",
        age: 3,
        description: "Friendly and energetic golden retriever who loves to play fetch and swim. Great with kids and other pets.",
        status: PetStatus::Available,
        image_url: "https://images.unsplash.com/photo-1633722715463-d30f4f325e24?w=500",
    },
    SeedPet {
        name: "Luna",
        species: "Cat",
        breed: "Persian",
        age: 2,
        description: "Beautiful and calm Persian cat. Loves to cuddle and enjoys quiet environments.",
        status: PetStatus::Available,
        image_url: "https://images.unsplash.com/photo-1495360010541-f48722b34f7d?w=500",
    },
    SeedPet {
        name: "Charlie",
        species: "Dog",
        breed: "Labrador",
        age: 4,
        description: "Loyal and playful Labrador. Well-trained and perfect for active families.",
        status: PetStatus::Available,
        image_url: "https://images.unsplash.com/photo-1558788353-f76d92427f16?w=500",
    },
    SeedPet {
        name: "Bella",
        species: "Cat",
        breed: "Siamese",
        age: 1,
        description: "Young and curious Siamese cat. Very vocal and loves attention.",
        status: PetStatus::Available,
        image_url: "https://images.unsplash.com/photo-1513360371669-4adf3dd7dff8?w=500",
    },
    SeedPet {
        name: "Rocky",
        species: "Dog",
        breed: "German Shepherd",
        age: 5,
        description: "Protective and intelligent. Excellent guard dog and family companion.",
        status: PetStatus::Pending,
        image_url: "https://images.unsplash.com/photo-1568572933382-74d440642117?w=500",
    },
    SeedPet {
        name: "Whiskers",
        species: "Cat",
        breed: "Maine Coon",
        age: 3,
        description: "Large and gentle Maine Coon. Very friendly and loves to play.",
        status: PetStatus::Available,
        image_url: "https://images.unsplash.com/photo-1574158622682-e40e69881006?w=500",
    },
    SeedPet {
        name: "Buddy",
        species: "Dog",
        breed: "Beagle",
        age: 2,
        description: "Energetic beagle with a great nose. Loves outdoor adventures and treats.",
        status: PetStatus::Available,
        image_url: "https://images.unsplash.com/photo-1505628346881-b72b27e84530?w=500",
    },
    SeedPet {
        name: "Mittens",
        species: "Cat",
        breed: "British Shorthair",
        age: 4,
        description: "Calm and independent. Perfect for apartment living.",
        status: PetStatus::Available,
        image_url: "https://images.unsplash.com/photo-1596854407944-bf87f6fdd49e?w=500",
    },
    SeedPet {
        name: "Duke",
        species: "Dog",
        breed: "Bulldog",
        age: 6,
        description: "Calm and loving bulldog. Great with children and enjoys lounging around.",
        status: PetStatus::Available,
        image_url: "https://images.unsplash.com/photo-1583511655857-d19b40a7a54e?w=500",
    },
    SeedPet {
        name: "Shadow",
        species: "Cat",
        breed: "Ragdoll",
        age: 2,
        description: "Gentle and affectionate Ragdoll. Follows you everywhere like a shadow.",
        status: PetStatus::Available,
        image_url: "https://images.unsplash.com/photo-1581456495146-65a71b2c8e52?w=500",
    },
];

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed pet '{name}' is invalid: {source}")]
    Invalid {
        name: &'static str,
        source: PetValidationError,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Insert the demo catalogue when the store holds no pets. Returns how many were added.
pub fn seed_pets_if_empty<R>(repository: &R) -> Result<usize, SeedError>
where
    R: PetRepository + ?Sized,
{
    if repository.pet_count()? > 0 {
        info!("pet catalogue already populated; skipping seed");
        return Ok(0);
    }

    let now = Utc::now();
    for seed in DEMO_PETS {
        let mut pet = NewPet {
            name: seed.name.to_string(),
            species: seed.species.to_string(),
            breed: seed.breed.to_string(),
            age: seed.age,
            description: seed.description.to_string(),
            image_url: Some(seed.image_url.to_string()),
        }
        .into_pet(now)
        .map_err(|source| SeedError::Invalid {
            name: seed.name,
            source,
        })?;
        pet.status = seed.status;
        repository.insert_pet(pet)?;
    }

    info!(count = DEMO_PETS.len(), "demo pets seeded");
    Ok(DEMO_PETS.len())
}
