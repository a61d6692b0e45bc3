use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::{Extension, Router};
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::adoption::{AdoptionRepository, Application, WriteBatch, WriteOp};
use crate::auth::{
    Argon2Hasher, AuthService, Credentials, Registration, SharedSessionResolver, UserId,
};
use crate::catalog::{catalog_router, CatalogService, NewPet, Pet, PetId, PetRepository};
use crate::config::AdminBootstrap;
use crate::store::MemoryStore;

pub(super) fn new_pet(name: &str, species: &str, breed: &str, age: u32) -> NewPet {
    NewPet {
        name: name.to_string(),
        species: species.to_string(),
        breed: breed.to_string(),
        age,
        description: format!("{name} is looking for a home."),
        image_url: None,
    }
}

pub(super) fn list_pet(store: &MemoryStore, payload: NewPet) -> Pet {
    let pet = payload.into_pet(Utc::now()).expect("valid pet");
    store.insert_pet(pet).expect("pet stored")
}

pub(super) fn open_application(store: &MemoryStore, pet: PetId) {
    let mut batch = WriteBatch::new();
    batch.push(WriteOp::InsertApplication(Application::draft(
        UserId::generate(),
        pet,
        None,
        Utc::now(),
    )));
    store.commit(batch).expect("application stored");
}

pub(super) fn build_service() -> (CatalogService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (CatalogService::new(store.clone()), store)
}

pub(super) struct Harness {
    pub(super) store: Arc<MemoryStore>,
    auth: Arc<AuthService<MemoryStore, MemoryStore>>,
    service: Arc<CatalogService<MemoryStore>>,
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
        let service = Arc::new(CatalogService::new(store.clone()));
        Self {
            store,
            auth,
            service,
        }
    }

    pub(super) fn router(&self) -> Router {
        let resolver: SharedSessionResolver = self.auth.clone();
        catalog_router(self.service.clone()).layer(Extension(resolver))
    }

    pub(super) fn user_token(&self) -> String {
        self.auth
            .register(Registration {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .expect("registration succeeds")
            .token
            .as_str()
            .to_string()
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
            .login(Credentials {
                email: "admin@example.com".to_string(),
                password: "admin123".to_string(),
            })
            .expect("admin login")
            .token
            .as_str()
            .to_string()
    }
}

pub(super) fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
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
