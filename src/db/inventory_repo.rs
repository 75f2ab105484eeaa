// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::is_unique_violation, error::AppError},
    models::inventory::{
        clamp_limit, Movement, MovementFilter, NewMovement, StockLevel, StockLevelFilter,
        TransferOrder,
    },
};

// Cabeçalho de transferência: a perna de saída casada com a de entrada
// pelo mesmo correlation_id.
const TRANSFER_HEADER_SELECT: &str = r#"
    SELECT
        o.correlation_id AS correlation_id,
        o.item_id,
        it.name AS item_name,
        o.quantity,
        o.unit_cost,
        o.amount,
        o.location_id AS source_location_id,
        src.name AS source_location_name,
        i.location_id AS target_location_id,
        dst.name AS target_location_name,
        o.operator_id,
        LEAST(o.occurred_at, i.occurred_at) AS occurred_at,
        COALESCE(o.notes, i.notes) AS notes
    FROM stock_movements o
    JOIN stock_movements i
      ON i.correlation_id = o.correlation_id
     AND i.movement_type = 'transfer'
     AND i.direction = 'inbound'
    JOIN items it ON it.id = o.item_id
    JOIN locations src ON src.id = o.location_id
    JOIN locations dst ON dst.id = i.location_id
    WHERE o.movement_type = 'transfer'
      AND o.direction = 'outbound'
"#;

#[derive(Clone, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Saldos (Snapshot)
    // ---

    pub async fn get_stock_level<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<StockLevel>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let level = sqlx::query_as::<_, StockLevel>(
            "SELECT * FROM stock_levels WHERE item_id = $1 AND location_id = $2",
        )
            .bind(item_id)
            .bind(location_id)
            .fetch_optional(executor)
            .await?;
        Ok(level)
    }

    pub async fn list_stock_levels<'e, E>(
        &self,
        executor: E,
        filter: &StockLevelFilter,
    ) -> Result<Vec<StockLevel>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM stock_levels WHERE TRUE");
        if let Some(item_id) = filter.item_id {
            qb.push(" AND item_id = ").push_bind(item_id);
        }
        if let Some(location_id) = filter.location_id {
            qb.push(" AND location_id = ").push_bind(location_id);
        }
        qb.push(" ORDER BY item_id, location_id");

        let levels = qb.build_query_as::<StockLevel>().fetch_all(executor).await?;
        Ok(levels)
    }

    /// "UPSERT" do saldo: soma `quantity` (cria a linha com reserved = 0 se não existir).
    pub async fn increment_quantity<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        location_id: Uuid,
        quantity: Decimal,
    ) -> Result<StockLevel, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let level = sqlx::query_as::<_, StockLevel>(
            r#"
            INSERT INTO stock_levels (item_id, location_id, quantity, reserved)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT (item_id, location_id)
            DO UPDATE SET
                quantity = stock_levels.quantity + EXCLUDED.quantity,
                updated_at = now()
            RETURNING *
            "#,
        )
            .bind(item_id)
            .bind(location_id)
            .bind(quantity)
            .fetch_one(executor)
            .await?;
        Ok(level)
    }

    /// Baixa condicional (compare-and-swap na linha): só subtrai se o disponível
    /// cobrir a quantidade. Retorna o número de linhas afetadas (0 ou 1).
    pub async fn decrement_quantity<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        location_id: Uuid,
        quantity: Decimal,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE stock_levels
            SET quantity = quantity - $3, updated_at = now()
            WHERE item_id = $1 AND location_id = $2
              AND quantity >= $3
              AND quantity - reserved >= $3
            "#,
        )
            .bind(item_id)
            .bind(location_id)
            .bind(quantity)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Reserva condicional: `reserved += qty` somente se `available >= qty`.
    pub async fn reserve<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        location_id: Uuid,
        quantity: Decimal,
    ) -> Result<Option<StockLevel>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let level = sqlx::query_as::<_, StockLevel>(
            r#"
            UPDATE stock_levels
            SET reserved = reserved + $3, updated_at = now()
            WHERE item_id = $1 AND location_id = $2
              AND quantity - reserved >= $3
            RETURNING *
            "#,
        )
            .bind(item_id)
            .bind(location_id)
            .bind(quantity)
            .fetch_optional(executor)
            .await?;
        Ok(level)
    }

    /// Liberação condicional: `reserved -= qty` somente se `reserved >= qty`.
    pub async fn release<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        location_id: Uuid,
        quantity: Decimal,
    ) -> Result<Option<StockLevel>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let level = sqlx::query_as::<_, StockLevel>(
            r#"
            UPDATE stock_levels
            SET reserved = reserved - $3, updated_at = now()
            WHERE item_id = $1 AND location_id = $2
              AND reserved >= $3
            RETURNING *
            "#,
        )
            .bind(item_id)
            .bind(location_id)
            .bind(quantity)
            .fetch_optional(executor)
            .await?;
        Ok(level)
    }

    // ---
    // Livro-razão (Movimentações)
    // ---

    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        movement: &NewMovement,
    ) -> Result<Movement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO stock_movements (
                id, direction, movement_type, item_id, location_id, correlation_id,
                quantity, unit_cost, amount, operator_id, occurred_at,
                counterpart, notes, attributes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(movement.direction)
            .bind(movement.movement_type)
            .bind(movement.item_id)
            .bind(movement.location_id)
            .bind(movement.correlation_id.as_deref())
            .bind(movement.quantity)
            .bind(movement.unit_cost)
            .bind(movement.amount)
            .bind(movement.operator_id)
            .bind(movement.occurred_at)
            .bind(movement.counterpart.clone().map(Json))
            .bind(movement.notes.as_deref())
            .bind(Json(movement.attributes.clone()))
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, "stock_movements_transfer_leg_key") {
                    return AppError::TransferReferenceExists(
                        movement.correlation_id.clone().unwrap_or_default(),
                    );
                }
                e.into()
            })
    }

    /// Lê a movimentação travando a linha (para o estorno).
    pub async fn find_movement_for_update<'e, E>(
        &self,
        executor: E,
        movement_id: Uuid,
    ) -> Result<Option<Movement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, Movement>(
            "SELECT * FROM stock_movements WHERE id = $1 FOR UPDATE",
        )
            .bind(movement_id)
            .fetch_optional(executor)
            .await?;
        Ok(movement)
    }

    /// As duas pernas de uma transferência: mais antiga primeiro, saída antes
    /// da entrada em caso de empate.
    pub async fn find_transfer_legs<'e, E>(
        &self,
        executor: E,
        correlation_id: &str,
        for_update: bool,
    ) -> Result<Vec<Movement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT * FROM stock_movements
            WHERE correlation_id = $1 AND movement_type = 'transfer'
            ORDER BY occurred_at ASC, CASE direction WHEN 'outbound' THEN 0 ELSE 1 END ASC
            {}
            "#,
            if for_update { "FOR UPDATE" } else { "" }
        );
        let legs = sqlx::query_as::<_, Movement>(&sql)
            .bind(correlation_id)
            .fetch_all(executor)
            .await?;
        Ok(legs)
    }

    pub async fn delete_movement<'e, E>(&self, executor: E, movement_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM stock_movements WHERE id = $1")
            .bind(movement_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        filter: &MovementFilter,
    ) -> Result<Vec<Movement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM stock_movements WHERE TRUE");
        if let Some(item_id) = filter.item_id {
            qb.push(" AND item_id = ").push_bind(item_id);
        }
        if let Some(location_id) = filter.location_id {
            qb.push(" AND location_id = ").push_bind(location_id);
        }
        if let Some(movement_type) = filter.movement_type {
            qb.push(" AND movement_type = ").push_bind(movement_type);
        }
        qb.push(" ORDER BY occurred_at DESC, created_at DESC LIMIT ")
            .push_bind(clamp_limit(filter.limit));

        let movements = qb.build_query_as::<Movement>().fetch_all(executor).await?;
        Ok(movements)
    }

    // ---
    // Transferências (leitura agregada)
    // ---

    pub async fn list_transfer_orders<'e, E>(
        &self,
        executor: E,
        limit: i64,
    ) -> Result<Vec<TransferOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{TRANSFER_HEADER_SELECT} ORDER BY occurred_at DESC LIMIT $1");
        let orders = sqlx::query_as::<_, TransferOrder>(&sql)
            .bind(limit)
            .fetch_all(executor)
            .await?;
        Ok(orders)
    }

    pub async fn find_transfer_order<'e, E>(
        &self,
        executor: E,
        correlation_id: &str,
    ) -> Result<Option<TransferOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{TRANSFER_HEADER_SELECT} AND o.correlation_id = $1");
        let order = sqlx::query_as::<_, TransferOrder>(&sql)
            .bind(correlation_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }
}
