use crate::cli::ServeArgs;
use crate::infra::{AppState, Services};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pet_adoption::auth::Argon2Hasher;
use pet_adoption::config::AppConfig;
use pet_adoption::error::AppError;
use pet_adoption::seed::seed_pets_if_empty;
use pet_adoption::store::MemoryStore;
use pet_adoption::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = match &config.storage.data_file {
        Some(path) => {
            info!(path = %path.display(), "opening document snapshot");
            Arc::new(MemoryStore::open(path)?)
        }
        None => Arc::new(MemoryStore::new()),
    };
    if config.storage.seed_pets {
        let inserted = seed_pets_if_empty(store.as_ref())?;
        info!(inserted, "demo catalogue checked");
    }

    let services = Services::over(
        store,
        Arc::new(Argon2Hasher::default()),
        config.auth.session_ttl(),
    );
    if let Some(bootstrap) = &config.auth.bootstrap_admin {
        let admin = services.auth.ensure_admin(bootstrap)?;
        info!(user_id = %admin.id, "administrator account ensured");
    }

    let app = with_application_routes(&services, &config.cors)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pet adoption api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
