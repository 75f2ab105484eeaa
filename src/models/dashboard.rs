// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Quantos itens entram, no máximo, na lista de estoque baixo.
pub const LOW_STOCK_LIMIT: i64 = 20;

// 1. Item abaixo do estoque de segurança
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockEntry {
    pub item_id: Uuid,
    pub sku: String,
    pub name: String,
    pub safety_stock: Decimal,
    pub available: Decimal,   // Somado em todos os locais ativos
    pub deficit: Decimal,     // safety_stock - available
}

// 2. Resumo do estoque (os cards do painel)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_items: i64,
    pub total_locations: i64,
    pub total_available: Decimal,
    pub low_stock: Vec<LowStockEntry>,
    pub today_inbound: Decimal,
    pub today_outbound: Decimal,
}
