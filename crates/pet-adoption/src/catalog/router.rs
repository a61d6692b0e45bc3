use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::domain::{NewPet, Pet, PetId, PetUpdate};
use super::query::{PetListParams, PetQuery};
use super::repository::PetRepository;
use super::service::{CatalogError, CatalogService};
use crate::auth::AdminCaller;
use crate::blocking::offload;
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::pagination::Page;

/// Router builder exposing public browsing and admin listing management.
pub fn catalog_router<R>(service: Arc<CatalogService<R>>) -> Router
where
    R: PetRepository + 'static,
{
    Router::new()
        .route(
            "/api/pets",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/api/pets/:pet_id",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .with_state(service)
}

fn path_pet_id(raw: &str) -> Result<PetId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("Pet not found".to_string()))
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    QueryParams(params): QueryParams<PetListParams>,
) -> Result<Json<Page<Pet>>, ApiError>
where
    R: PetRepository + 'static,
{
    let query = PetQuery::try_from(params).map_err(CatalogError::from)?;
    Ok(Json(offload(move || service.list(&query)).await?))
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(pet_id): Path<String>,
) -> Result<Json<Pet>, ApiError>
where
    R: PetRepository + 'static,
{
    let id = path_pet_id(&pet_id)?;
    Ok(Json(offload(move || service.get(&id)).await?))
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    _admin: AdminCaller,
    JsonBody(payload): JsonBody<NewPet>,
) -> Result<impl IntoResponse, ApiError>
where
    R: PetRepository + 'static,
{
    let pet = offload(move || service.create(payload)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Pet created successfully", "pet": pet })),
    ))
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    _admin: AdminCaller,
    Path(pet_id): Path<String>,
    JsonBody(update): JsonBody<PetUpdate>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    R: PetRepository + 'static,
{
    let id = path_pet_id(&pet_id)?;
    let pet = offload(move || service.update(&id, update)).await?;
    Ok(Json(
        json!({ "message": "Pet updated successfully", "pet": pet }),
    ))
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    _admin: AdminCaller,
    Path(pet_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    R: PetRepository + 'static,
{
    let id = path_pet_id(&pet_id)?;
    offload(move || service.delete(&id)).await?;
    Ok(Json(json!({ "message": "Pet deleted successfully" })))
}
