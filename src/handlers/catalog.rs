// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::catalog::{
        CreateItemPayload, CreateLocationPayload, Item, Location, UpdateItemPayload,
        UpdateLocationPayload,
    },
};

// ---
// Itens
// ---

#[utoipa::path(
    post,
    path = "/api/items",
    tag = "Catalog",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item criado", body = Item),
        (status = 409, description = "SKU_ALREADY_EXISTS")
    )
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .catalog_service
        .create_item(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/items",
    tag = "Catalog",
    responses((status = 200, description = "Itens ativos", body = Vec<Item>))
)]
pub async fn list_items(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let items = app_state.catalog_service.list_items(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/items/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item", body = Item),
        (status = 404, description = "ITEM_NOT_FOUND")
    )
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state
        .catalog_service
        .get_item(&app_state.db_pool, item_id)
        .await?;
    Ok((StatusCode::OK, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateItemPayload,
    responses(
        (status = 200, description = "Item atualizado", body = Item),
        (status = 404, description = "ITEM_NOT_FOUND")
    )
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .catalog_service
        .update_item(&app_state.db_pool, item_id, &payload)
        .await?;
    Ok((StatusCode::OK, Json(item)))
}

#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item removido"),
        (status = 404, description = "ITEM_NOT_FOUND"),
        (status = 409, description = "ITEM_IN_USE")
    )
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .catalog_service
        .delete_item(&app_state.db_pool, item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Locais
// ---

#[utoipa::path(
    post,
    path = "/api/locations",
    tag = "Catalog",
    request_body = CreateLocationPayload,
    responses(
        (status = 201, description = "Local criado", body = Location),
        (status = 409, description = "WAREHOUSE_CODE_EXISTS")
    )
)]
pub async fn create_location(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateLocationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let location = app_state
        .catalog_service
        .create_location(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(location)))
}

#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "Catalog",
    responses((status = 200, description = "Locais ativos", body = Vec<Location>))
)]
pub async fn list_locations(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let locations = app_state
        .catalog_service
        .list_locations(&app_state.db_pool)
        .await?;
    Ok((StatusCode::OK, Json(locations)))
}

#[utoipa::path(
    get,
    path = "/api/locations/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do local")),
    responses(
        (status = 200, description = "Local", body = Location),
        (status = 404, description = "WAREHOUSE_NOT_FOUND")
    )
)]
pub async fn get_location(
    State(app_state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let location = app_state
        .catalog_service
        .get_location(&app_state.db_pool, location_id)
        .await?;
    Ok((StatusCode::OK, Json(location)))
}

#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do local")),
    request_body = UpdateLocationPayload,
    responses(
        (status = 200, description = "Local atualizado", body = Location),
        (status = 404, description = "WAREHOUSE_NOT_FOUND")
    )
)]
pub async fn update_location(
    State(app_state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Json(payload): Json<UpdateLocationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let location = app_state
        .catalog_service
        .update_location(&app_state.db_pool, location_id, &payload)
        .await?;
    Ok((StatusCode::OK, Json(location)))
}

#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do local")),
    responses(
        (status = 204, description = "Local removido"),
        (status = 404, description = "WAREHOUSE_NOT_FOUND"),
        (status = 409, description = "WAREHOUSE_IN_USE")
    )
)]
pub async fn delete_location(
    State(app_state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .catalog_service
        .delete_location(&app_state.db_pool, location_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
