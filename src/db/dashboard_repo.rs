// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};

use crate::{
    common::error::AppError,
    models::dashboard::{InventoryStats, LowStockEntry, LOW_STOCK_LIMIT},
};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    /// Resumo do estoque. Roda fora de transação: cada consulta vê o seu próprio
    /// instante, o que basta para um painel (não serve para fechamento).
    pub async fn get_stats<'e, E>(&self, executor: E) -> Result<InventoryStats, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        // A. Itens e locais ativos
        let total_items =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items WHERE NOT is_deleted")
                .fetch_one(&mut *conn)
                .await?;

        let total_locations =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM locations WHERE NOT is_deleted")
                .fetch_one(&mut *conn)
                .await?;

        // B. Disponível total (somente locais ativos)
        let total_available = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(s.quantity - s.reserved), 0)
            FROM stock_levels s
            JOIN locations l ON l.id = s.location_id
            WHERE NOT l.is_deleted
            "#,
        )
            .fetch_one(&mut *conn)
            .await?;

        // C. Estoque baixo: disponível agregado < estoque de segurança, maior déficit primeiro
        let low_stock = sqlx::query_as::<_, LowStockEntry>(
            r#"
            SELECT
                i.id AS item_id,
                i.sku,
                i.name,
                i.safety_stock,
                COALESCE(a.available, 0) AS available,
                i.safety_stock - COALESCE(a.available, 0) AS deficit
            FROM items i
            LEFT JOIN (
                SELECT s.item_id, SUM(s.quantity - s.reserved) AS available
                FROM stock_levels s
                JOIN locations l ON l.id = s.location_id
                WHERE NOT l.is_deleted
                GROUP BY s.item_id
            ) a ON a.item_id = i.id
            WHERE NOT i.is_deleted
              AND COALESCE(a.available, 0) < i.safety_stock
            ORDER BY deficit DESC, i.name ASC
            LIMIT $1
            "#,
        )
            .bind(LOW_STOCK_LIMIT)
            .fetch_all(&mut *conn)
            .await?;

        // D. Entradas e saídas de hoje (data do servidor)
        let (today_inbound, today_outbound) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE(SUM(quantity) FILTER (WHERE direction = 'inbound'), 0),
                COALESCE(SUM(quantity) FILTER (WHERE direction = 'outbound'), 0)
            FROM stock_movements
            WHERE occurred_at::date = CURRENT_DATE
            "#,
        )
            .fetch_one(&mut *conn)
            .await?;

        Ok(InventoryStats {
            total_items,
            total_locations,
            total_available,
            low_stock,
            today_inbound,
            today_outbound,
        })
    }
}
