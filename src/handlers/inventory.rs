// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::operator::Operator,
    models::inventory::{
        InboundPayload, LimitQuery, Movement, MovementFilter, OutboundPayload,
        ReservationPayload, StockLevel, StockLevelFilter, StockLevelView, TransferOrder,
        TransferOrderDetail,
    },
};

// POST /api/inventory/inbound
#[utoipa::path(
    post,
    path = "/api/inventory/inbound",
    tag = "Inventory",
    request_body = InboundPayload,
    responses(
        (status = 201, description = "Entrada registrada", body = Movement),
        (status = 404, description = "ITEM_NOT_FOUND / WAREHOUSE_NOT_FOUND")
    ),
    params(("x-operator-id" = Uuid, Header, description = "Operador"))
)]
pub async fn create_inbound(
    State(app_state): State<AppState>,
    operator: Operator,
    Json(payload): Json<InboundPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = app_state
        .inventory_service
        .create_inbound(&app_state.db_pool, &payload, operator.0)
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// POST /api/inventory/outbound
#[utoipa::path(
    post,
    path = "/api/inventory/outbound",
    tag = "Inventory",
    request_body = OutboundPayload,
    responses(
        (status = 201, description = "Saída registrada (perna de saída, no caso de transferência)", body = Movement),
        (status = 400, description = "TRANSFER_TARGET_REQUIRED / TRANSFER_SAME_WAREHOUSE"),
        (status = 404, description = "ITEM_NOT_FOUND / WAREHOUSE_NOT_FOUND / TRANSFER_TARGET_NOT_FOUND"),
        (status = 422, description = "INSUFFICIENT_STOCK")
    ),
    params(("x-operator-id" = Uuid, Header, description = "Operador"))
)]
pub async fn create_outbound(
    State(app_state): State<AppState>,
    operator: Operator,
    Json(payload): Json<OutboundPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = app_state
        .inventory_service
        .create_outbound(&app_state.db_pool, &payload, operator.0)
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// POST /api/inventory/reserve
#[utoipa::path(
    post,
    path = "/api/inventory/reserve",
    tag = "Inventory",
    request_body = ReservationPayload,
    responses(
        (status = 200, description = "Saldo após a reserva", body = StockLevel),
        (status = 422, description = "RESERVE_INSUFFICIENT")
    )
)]
pub async fn reserve(
    State(app_state): State<AppState>,
    Json(payload): Json<ReservationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let level = app_state
        .inventory_service
        .reserve(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::OK, Json(level)))
}

// POST /api/inventory/release
#[utoipa::path(
    post,
    path = "/api/inventory/release",
    tag = "Inventory",
    request_body = ReservationPayload,
    responses(
        (status = 200, description = "Saldo após a liberação", body = StockLevel),
        (status = 422, description = "RESERVE_EXCEEDS")
    )
)]
pub async fn release(
    State(app_state): State<AppState>,
    Json(payload): Json<ReservationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let level = app_state
        .inventory_service
        .release(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::OK, Json(level)))
}

// GET /api/inventory/levels
#[utoipa::path(
    get,
    path = "/api/inventory/levels",
    tag = "Inventory",
    params(StockLevelFilter),
    responses((status = 200, description = "Saldos por item/local", body = Vec<StockLevelView>))
)]
pub async fn list_stock_levels(
    State(app_state): State<AppState>,
    Query(filter): Query<StockLevelFilter>,
) -> Result<impl IntoResponse, AppError> {
    let levels = app_state
        .inventory_service
        .list_stock_levels(&app_state.db_pool, &filter)
        .await?;

    Ok((StatusCode::OK, Json(levels)))
}

// GET /api/inventory/movements
#[utoipa::path(
    get,
    path = "/api/inventory/movements",
    tag = "Inventory",
    params(MovementFilter),
    responses((status = 200, description = "Movimentações mais recentes", body = Vec<Movement>))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state
        .inventory_service
        .list_movements(&app_state.db_pool, &filter)
        .await?;

    Ok((StatusCode::OK, Json(movements)))
}

// DELETE /api/inventory/movements/{id}
#[utoipa::path(
    delete,
    path = "/api/inventory/movements/{id}",
    tag = "Inventory",
    params(
        ("id" = Uuid, Path, description = "ID da movimentação"),
        ("x-operator-id" = Uuid, Header, description = "Operador")
    ),
    responses(
        (status = 200, description = "Movimentações estornadas", body = Vec<Movement>),
        (status = 404, description = "MOVEMENT_NOT_FOUND"),
        (status = 422, description = "INSUFFICIENT_STOCK")
    )
)]
pub async fn revert_movement(
    State(app_state): State<AppState>,
    operator: Operator,
    Path(movement_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let reverted = app_state
        .inventory_service
        .revert_movement(&app_state.db_pool, movement_id, operator.0)
        .await?;

    Ok((StatusCode::OK, Json(reverted)))
}

// GET /api/inventory/transfers
#[utoipa::path(
    get,
    path = "/api/inventory/transfers",
    tag = "Inventory",
    params(LimitQuery),
    responses((status = 200, description = "Transferências mais recentes", body = Vec<TransferOrder>))
)]
pub async fn list_transfer_orders(
    State(app_state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state
        .inventory_service
        .list_transfer_orders(&app_state.db_pool, query.limit)
        .await?;

    Ok((StatusCode::OK, Json(orders)))
}

// GET /api/inventory/transfers/{correlation_id}
#[utoipa::path(
    get,
    path = "/api/inventory/transfers/{correlation_id}",
    tag = "Inventory",
    params(("correlation_id" = String, Path, description = "Referência da transferência")),
    responses(
        (status = 200, description = "Cabeçalho e as duas pernas", body = TransferOrderDetail),
        (status = 404, description = "TRANSFER_NOT_FOUND")
    )
)]
pub async fn get_transfer_order(
    State(app_state): State<AppState>,
    Path(correlation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .inventory_service
        .get_transfer_order(&app_state.db_pool, &correlation_id)
        .await?;

    Ok((StatusCode::OK, Json(detail)))
}
