use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationRequest, ApplicationStatus, StatusChangeRequest};
use super::repository::AdoptionRepository;
use super::service::AdoptionService;
use crate::auth::{AdminCaller, Caller, UserRepository};
use crate::blocking::offload;
use crate::catalog::PetId;
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::pagination::PageRequest;

/// Router builder exposing application submission and the admin review queue.
pub fn adoption_router<R, U>(service: Arc<AdoptionService<R, U>>) -> Router
where
    R: AdoptionRepository + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .route(
            "/api/applications",
            get(list_handler::<R, U>).post(submit_handler::<R, U>),
        )
        .route("/api/applications/my", get(mine_handler::<R, U>))
        .route("/api/applications/pet/:pet_id", get(for_pet_handler::<R, U>))
        .route("/api/applications/:application_id", get(get_handler::<R, U>))
        .route(
            "/api/applications/:application_id/status",
            patch(decide_handler::<R, U>),
        )
        .with_state(service)
}

/// Query string of the admin listing.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListParams {
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ApplicationListParams {
    fn parse(&self) -> Result<(Option<ApplicationStatus>, PageRequest), ApiError> {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(str::parse::<ApplicationStatus>)
            .transpose()
            .map_err(|err| ApiError::Validation(err.to_string()))?;
        let page = PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref())
            .map_err(|err| ApiError::Validation(err.to_string()))?;
        Ok((status, page))
    }
}

fn path_application_id(raw: &str) -> Result<ApplicationId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("Application not found".to_string()))
}

pub(crate) async fn submit_handler<R, U>(
    State(service): State<Arc<AdoptionService<R, U>>>,
    caller: Caller,
    JsonBody(request): JsonBody<ApplicationRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: AdoptionRepository + 'static,
    U: UserRepository + 'static,
{
    let application = offload(move || service.submit(&caller.user_id, request)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Application submitted successfully",
            "application": application,
        })),
    ))
}

pub(crate) async fn mine_handler<R, U>(
    State(service): State<Arc<AdoptionService<R, U>>>,
    caller: Caller,
) -> Result<Json<serde_json::Value>, ApiError>
where
    R: AdoptionRepository + 'static,
    U: UserRepository + 'static,
{
    let applications = offload(move || service.mine(&caller.user_id)).await?;
    Ok(Json(json!({ "applications": applications })))
}

pub(crate) async fn list_handler<R, U>(
    State(service): State<Arc<AdoptionService<R, U>>>,
    _admin: AdminCaller,
    QueryParams(params): QueryParams<ApplicationListParams>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    R: AdoptionRepository + 'static,
    U: UserRepository + 'static,
{
    let (status, page) = params.parse()?;
    let page = offload(move || service.list(status, page)).await?;
    Ok(Json(json!({
        "applications": page.data,
        "pagination": {
            "page": page.page,
            "limit": page.limit,
            "total": page.total,
            "pages": page.total_pages,
        },
    })))
}

pub(crate) async fn for_pet_handler<R, U>(
    State(service): State<Arc<AdoptionService<R, U>>>,
    _admin: AdminCaller,
    Path(pet_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    R: AdoptionRepository + 'static,
    U: UserRepository + 'static,
{
    let pet_id: PetId = pet_id
        .parse()
        .map_err(|_| ApiError::NotFound("Pet not found".to_string()))?;
    let applications = offload(move || service.for_pet(&pet_id)).await?;
    Ok(Json(json!({ "applications": applications })))
}

pub(crate) async fn get_handler<R, U>(
    State(service): State<Arc<AdoptionService<R, U>>>,
    _admin: AdminCaller,
    Path(application_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    R: AdoptionRepository + 'static,
    U: UserRepository + 'static,
{
    let id = path_application_id(&application_id)?;
    let application = offload(move || service.get(&id)).await?;
    Ok(Json(json!({ "application": application })))
}

pub(crate) async fn decide_handler<R, U>(
    State(service): State<Arc<AdoptionService<R, U>>>,
    _admin: AdminCaller,
    Path(application_id): Path<String>,
    JsonBody(change): JsonBody<StatusChangeRequest>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    R: AdoptionRepository + 'static,
    U: UserRepository + 'static,
{
    let id = path_application_id(&application_id)?;
    let application = offload(move || service.decide(&id, change.status)).await?;
    Ok(Json(json!({
        "message": "Application status updated successfully",
        "application": application,
    })))
}
