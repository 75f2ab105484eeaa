// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Catalog ---
        handlers::catalog::create_item,
        handlers::catalog::list_items,
        handlers::catalog::get_item,
        handlers::catalog::update_item,
        handlers::catalog::delete_item,
        handlers::catalog::create_location,
        handlers::catalog::list_locations,
        handlers::catalog::get_location,
        handlers::catalog::update_location,
        handlers::catalog::delete_location,

        // --- INVENTORY ---
        handlers::inventory::create_inbound,
        handlers::inventory::create_outbound,
        handlers::inventory::reserve,
        handlers::inventory::release,
        handlers::inventory::list_stock_levels,
        handlers::inventory::list_movements,
        handlers::inventory::revert_movement,
        handlers::inventory::list_transfer_orders,
        handlers::inventory::get_transfer_order,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
    ),
    components(
        schemas(
            // --- Catalog ---
            models::catalog::LocationKind,
            models::catalog::Item,
            models::catalog::Location,
            models::catalog::CreateItemPayload,
            models::catalog::UpdateItemPayload,
            models::catalog::CreateLocationPayload,
            models::catalog::UpdateLocationPayload,

            // --- Inventory ---
            models::inventory::MovementDirection,
            models::inventory::MovementType,
            models::inventory::StockLevel,
            models::inventory::StockLevelView,
            models::inventory::Movement,
            models::inventory::TransferOrder,
            models::inventory::TransferOrderDetail,
            models::inventory::InboundPayload,
            models::inventory::OutboundPayload,
            models::inventory::ReservationPayload,

            // --- DASHBOARD ---
            models::dashboard::InventoryStats,
            models::dashboard::LowStockEntry,
        )
    ),
    tags(
        (name = "Catalog", description = "Itens e Locais (com remoção lógica)"),
        (name = "Inventory", description = "Saldos, Reservas, Movimentações e Transferências"),
        (name = "Dashboard", description = "Indicadores de Estoque")
    )
)]
pub struct ApiDoc;
