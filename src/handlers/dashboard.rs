// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, models::dashboard::InventoryStats};

// GET /api/inventory/stats
#[utoipa::path(
    get,
    path = "/api/inventory/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo do estoque: totais, estoque baixo e movimento do dia", body = InventoryStats)
    )
)]
pub async fn get_stats(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = app_state
        .dashboard_service
        .get_stats(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(stats)))
}
