use chrono::Duration;
use metrics_exporter_prometheus::PrometheusHandle;
use pet_adoption::adoption::AdoptionService;
use pet_adoption::auth::{AuthService, PasswordHasher};
use pet_adoption::catalog::CatalogService;
use pet_adoption::store::MemoryStore;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Auth = AuthService<MemoryStore, MemoryStore>;
pub(crate) type Catalog = CatalogService<MemoryStore>;
pub(crate) type Adoption = AdoptionService<MemoryStore, MemoryStore>;

/// The three services sharing one document store.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) auth: Arc<Auth>,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) adoption: Arc<Adoption>,
}

impl Services {
    pub(crate) fn over(
        store: Arc<MemoryStore>,
        hasher: Arc<dyn PasswordHasher>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(
                store.clone(),
                store.clone(),
                hasher,
                session_ttl,
            )),
            catalog: Arc::new(CatalogService::new(store.clone())),
            adoption: Arc::new(AdoptionService::new(store.clone(), store)),
        }
    }
}
