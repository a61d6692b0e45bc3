use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::{Extension, Router};
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::adoption::repository::{AdoptionRepository, WriteBatch, WriteOp};
use crate::adoption::{adoption_router, AdoptionService, Application, ApplicationId, ApplicationStatus};
use crate::auth::{
    Argon2Hasher, AuthService, Registration, Role, SharedSessionResolver, User, UserId,
    UserRepository,
};
use crate::catalog::{NewPet, Pet, PetFilter, PetId, PetRepository, PetStatus};
use crate::config::AdminBootstrap;
use crate::pagination::{Page, PageRequest};
use crate::store::{MemoryStore, RepositoryError};

pub(super) type MemoryAdoptionService = AdoptionService<MemoryStore, MemoryStore>;

pub(super) fn new_pet(name: &str) -> NewPet {
    NewPet {
        name: name.to_string(),
        species: "Dog".to_string(),
        breed: "Labrador".to_string(),
        age: 4,
        description: "Loyal and playful".to_string(),
        image_url: Some("https://images.example.com/dog.jpg".to_string()),
    }
}

pub(super) fn list_pet(store: &MemoryStore, name: &str) -> Pet {
    let pet = new_pet(name).into_pet(Utc::now()).expect("valid pet");
    store.insert_pet(pet).expect("pet stored")
}

pub(super) fn add_user(store: &MemoryStore, username: &str) -> UserId {
    let user = User {
        id: UserId::generate(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$unused".to_string(),
        role: Role::User,
        created_at: Utc::now(),
    };
    store.insert_user(user).expect("user stored").id
}

/// Put a pending application straight into the store, bypassing the engine,
/// so tests can build states with several pending applications on one pet.
pub(super) fn force_pending(store: &MemoryStore, user: UserId, pet: PetId) -> Application {
    let application = Application::draft(user, pet, None, Utc::now());
    let mut batch = WriteBatch::new();
    batch.push(WriteOp::InsertApplication(application.clone()));
    store.commit(batch).expect("application stored");
    application
}

pub(super) fn pet_status(store: &MemoryStore, pet: &PetId) -> PetStatus {
    store.pet(pet).expect("read").expect("pet exists").status
}

pub(super) fn application_status(store: &MemoryStore, id: &ApplicationId) -> ApplicationStatus {
    store
        .application(id)
        .expect("read")
        .expect("application exists")
        .status
}

pub(super) fn build_service() -> (MemoryAdoptionService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = AdoptionService::new(store.clone(), store.clone());
    (service, store)
}

/// Full adoption surface with real sessions, for routing tests.
pub(super) struct Harness {
    pub(super) store: Arc<MemoryStore>,
    pub(super) auth: Arc<AuthService<MemoryStore, MemoryStore>>,
    pub(super) service: Arc<MemoryAdoptionService>,
}

impl Harness {
    pub(super) fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let hasher = Arc::new(Argon2Hasher::with_params(1024, 1, 1).expect("valid params"));
        let auth = Arc::new(AuthService::new(
            store.clone(),
            store.clone(),
            hasher,
            Duration::hours(1),
        ));
        let service = Arc::new(AdoptionService::new(store.clone(), store.clone()));
        Self {
            store,
            auth,
            service,
        }
    }

    pub(super) fn router(&self) -> Router {
        let resolver: SharedSessionResolver = self.auth.clone();
        adoption_router(self.service.clone()).layer(Extension(resolver))
    }

    /// Register a regular account and return its id and bearer token.
    pub(super) fn sign_up(&self, username: &str) -> (UserId, String) {
        let session = self
            .auth
            .register(Registration {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "secret123".to_string(),
            })
            .expect("registration succeeds");
        (session.user.id, session.token.as_str().to_string())
    }

    pub(super) fn admin_token(&self) -> String {
        self.auth
            .ensure_admin(&AdminBootstrap {
                username: "adminuser".to_string(),
                email: "admin@example.com".to_string(),
                password: "admin123".to_string(),
            })
            .expect("admin created");
        self.auth
            .login(crate::auth::Credentials {
                email: "admin@example.com".to_string(),
                password: "admin123".to_string(),
            })
            .expect("admin login")
            .token
            .as_str()
            .to_string()
    }
}

pub(super) fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).expect("json encodes")))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Reads through to a real store but loses every commit race.
pub(super) struct StaleRepository {
    pub(super) inner: MemoryStore,
}

impl PetRepository for StaleRepository {
    fn insert_pet(&self, pet: Pet) -> Result<Pet, RepositoryError> {
        self.inner.insert_pet(pet)
    }

    fn pet(&self, id: &PetId) -> Result<Option<Pet>, RepositoryError> {
        self.inner.pet(id)
    }

    fn replace_pet(&self, pet: Pet, expected: PetStatus) -> Result<Pet, RepositoryError> {
        self.inner.replace_pet(pet, expected)
    }

    fn delete_pet(&self, id: &PetId) -> Result<(), RepositoryError> {
        self.inner.delete_pet(id)
    }

    fn search_pets(
        &self,
        filter: &PetFilter,
        page: PageRequest,
    ) -> Result<Page<Pet>, RepositoryError> {
        self.inner.search_pets(filter, page)
    }

    fn pet_count(&self) -> Result<usize, RepositoryError> {
        self.inner.pet_count()
    }

    fn open_application_count(&self, id: &PetId) -> Result<usize, RepositoryError> {
        self.inner.open_application_count(id)
    }
}

impl AdoptionRepository for StaleRepository {
    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.application(id)
    }

    fn application_by(
        &self,
        user: &UserId,
        pet: &PetId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.inner.application_by(user, pet)
    }

    fn applications_for_pet(&self, pet: &PetId) -> Result<Vec<Application>, RepositoryError> {
        self.inner.applications_for_pet(pet)
    }

    fn applications_for_user(&self, user: &UserId) -> Result<Vec<Application>, RepositoryError> {
        self.inner.applications_for_user(user)
    }

    fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        self.inner.list_applications(status, page)
    }

    fn commit(&self, _batch: WriteBatch) -> Result<(), RepositoryError> {
        Err(RepositoryError::Stale)
    }
}

pub(super) struct UnavailableRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl PetRepository for UnavailableRepository {
    fn insert_pet(&self, _pet: Pet) -> Result<Pet, RepositoryError> {
        offline()
    }

    fn pet(&self, _id: &PetId) -> Result<Option<Pet>, RepositoryError> {
        offline()
    }

    fn replace_pet(&self, _pet: Pet, _expected: PetStatus) -> Result<Pet, RepositoryError> {
        offline()
    }

    fn delete_pet(&self, _id: &PetId) -> Result<(), RepositoryError> {
        offline()
    }

    fn search_pets(
        &self,
        _filter: &PetFilter,
        _page: PageRequest,
    ) -> Result<Page<Pet>, RepositoryError> {
        offline()
    }

    fn pet_count(&self) -> Result<usize, RepositoryError> {
        offline()
    }

    fn open_application_count(&self, _id: &PetId) -> Result<usize, RepositoryError> {
        offline()
    }
}

impl AdoptionRepository for UnavailableRepository {
    fn application(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn application_by(
        &self,
        _user: &UserId,
        _pet: &PetId,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn applications_for_pet(&self, _pet: &PetId) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }

    fn applications_for_user(&self, _user: &UserId) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }

    fn list_applications(
        &self,
        _status: Option<ApplicationStatus>,
        _page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        offline()
    }

    fn commit(&self, _batch: WriteBatch) -> Result<(), RepositoryError> {
        offline()
    }
}
