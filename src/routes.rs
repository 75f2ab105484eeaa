// src/routes.rs

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

pub fn build_router(app_state: AppState) -> Router {
    let catalog_routes = Router::new()
        .route("/items"
               ,post(handlers::catalog::create_item)
               .get(handlers::catalog::list_items)
        )
        .route("/items/{id}"
               ,get(handlers::catalog::get_item)
               .put(handlers::catalog::update_item)
               .delete(handlers::catalog::delete_item)
        )
        .route("/locations"
               ,post(handlers::catalog::create_location)
               .get(handlers::catalog::list_locations)
        )
        .route("/locations/{id}"
               ,get(handlers::catalog::get_location)
               .put(handlers::catalog::update_location)
               .delete(handlers::catalog::delete_location)
        );

    let inventory_routes = Router::new()
        .route("/inbound", post(handlers::inventory::create_inbound))
        .route("/outbound", post(handlers::inventory::create_outbound))
        .route("/reserve", post(handlers::inventory::reserve))
        .route("/release", post(handlers::inventory::release))
        .route("/levels", get(handlers::inventory::list_stock_levels))
        .route("/movements", get(handlers::inventory::list_movements))
        .route("/movements/{id}"
               ,delete(handlers::inventory::revert_movement)
        )
        .route("/transfers", get(handlers::inventory::list_transfer_orders))
        .route("/transfers/{correlation_id}", get(handlers::inventory::get_transfer_order))
        .route("/stats", get(handlers::dashboard::get_stats));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", catalog_routes)
        .nest("/api/inventory", inventory_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
