// src/db/catalog_repo.rs

use sqlx::{types::Json, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::is_unique_violation, error::AppError},
    models::catalog::{
        CreateItemPayload, CreateLocationPayload, Item, Location, UpdateItemPayload,
        UpdateLocationPayload,
    },
};

/// Trava de linha usada ao ler um registro do catálogo dentro de uma transação.
///
/// Movimentações leem o item/local com `Share`; a compra, que reescreve o custo
/// do item, já lê com `NoKeyUpdate`; a remoção lógica usa `Update`. Assim uma
/// remoção nunca passa no meio de uma movimentação sobre o mesmo registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLock {
    None,
    Share,
    NoKeyUpdate,
    Update,
}

impl RowLock {
    fn clause(self) -> &'static str {
        match self {
            RowLock::None => "",
            RowLock::Share => " FOR SHARE",
            RowLock::NoKeyUpdate => " FOR NO KEY UPDATE",
            RowLock::Update => " FOR UPDATE",
        }
    }
}

#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        payload: &CreateItemPayload,
    ) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (id, sku, name, unit, base_cost, sale_price, category, safety_stock, barcode, spec)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(&payload.sku)
            .bind(&payload.name)
            .bind(&payload.unit)
            .bind(payload.base_cost)
            .bind(payload.sale_price)
            .bind(payload.category.as_deref())
            .bind(payload.safety_stock)
            .bind(payload.barcode.as_deref())
            .bind(Json(payload.spec.clone().unwrap_or_default()))
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, "items_sku_active_key") {
                    return AppError::SkuAlreadyExists(payload.sku.clone());
                }
                e.into()
            })
    }

    /// Busca um item ativo (não removido).
    pub async fn find_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        lock: RowLock,
    ) -> Result<Option<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT * FROM items WHERE id = $1 AND NOT is_deleted{}",
            lock.clause()
        );
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(item_id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn list_items<'e, E>(&self, executor: E) -> Result<Vec<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE NOT is_deleted ORDER BY name ASC",
        )
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        payload: &UpdateItemPayload,
    ) -> Result<Option<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // COALESCE: campo ausente no payload mantém o valor atual
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET
                name = COALESCE($2, name),
                unit = COALESCE($3, unit),
                base_cost = COALESCE($4, base_cost),
                sale_price = COALESCE($5, sale_price),
                category = COALESCE($6, category),
                safety_stock = COALESCE($7, safety_stock),
                barcode = COALESCE($8, barcode),
                spec = COALESCE($9, spec),
                updated_at = now()
            WHERE id = $1 AND NOT is_deleted
            RETURNING *
            "#,
        )
            .bind(item_id)
            .bind(payload.name.as_deref())
            .bind(payload.unit.as_deref())
            .bind(payload.base_cost)
            .bind(payload.sale_price)
            .bind(payload.category.as_deref())
            .bind(payload.safety_stock)
            .bind(payload.barcode.as_deref())
            .bind(payload.spec.clone().map(Json))
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    /// Política de "último custo": a compra sobrescreve o custo registrado.
    pub async fn update_item_base_cost<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        base_cost: rust_decimal::Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE items SET base_cost = $2, updated_at = now() WHERE id = $1")
            .bind(item_id)
            .bind(base_cost)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Item em uso = algum saldo não zerado OU qualquer movimentação referenciando-o.
    pub async fn item_in_use<'e, E>(&self, executor: E, item_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM stock_levels
                WHERE item_id = $1 AND (quantity <> 0 OR reserved <> 0)
            ) OR EXISTS (
                SELECT 1 FROM stock_movements WHERE item_id = $1
            )
            "#,
        )
            .bind(item_id)
            .fetch_one(executor)
            .await?;
        Ok(in_use)
    }

    pub async fn soft_delete_item<'e, E>(&self, executor: E, item_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE items SET is_deleted = TRUE, deleted_at = now(), updated_at = now() WHERE id = $1",
        )
            .bind(item_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  LOCAIS
    // =========================================================================

    pub async fn create_location<'e, E>(
        &self,
        executor: E,
        payload: &CreateLocationPayload,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (id, name, code, kind, address, capacity, manager, attributes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(&payload.name)
            .bind(&payload.code)
            .bind(payload.kind)
            .bind(payload.address.as_deref())
            .bind(payload.capacity)
            .bind(payload.manager.as_deref())
            .bind(Json(payload.attributes.clone().unwrap_or_default()))
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, "locations_code_active_key") {
                    return AppError::WarehouseCodeAlreadyExists(payload.code.clone());
                }
                e.into()
            })
    }

    pub async fn find_location<'e, E>(
        &self,
        executor: E,
        location_id: Uuid,
        lock: RowLock,
    ) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT * FROM locations WHERE id = $1 AND NOT is_deleted{}",
            lock.clause()
        );
        let location = sqlx::query_as::<_, Location>(&sql)
            .bind(location_id)
            .fetch_optional(executor)
            .await?;
        Ok(location)
    }

    pub async fn list_locations<'e, E>(&self, executor: E) -> Result<Vec<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE NOT is_deleted ORDER BY name ASC",
        )
            .fetch_all(executor)
            .await?;
        Ok(locations)
    }

    pub async fn update_location<'e, E>(
        &self,
        executor: E,
        location_id: Uuid,
        payload: &UpdateLocationPayload,
    ) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations SET
                name = COALESCE($2, name),
                kind = COALESCE($3, kind),
                address = COALESCE($4, address),
                capacity = COALESCE($5, capacity),
                manager = COALESCE($6, manager),
                attributes = COALESCE($7, attributes),
                updated_at = now()
            WHERE id = $1 AND NOT is_deleted
            RETURNING *
            "#,
        )
            .bind(location_id)
            .bind(payload.name.as_deref())
            .bind(payload.kind)
            .bind(payload.address.as_deref())
            .bind(payload.capacity)
            .bind(payload.manager.as_deref())
            .bind(payload.attributes.clone().map(Json))
            .fetch_optional(executor)
            .await?;
        Ok(location)
    }

    pub async fn location_in_use<'e, E>(
        &self,
        executor: E,
        location_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM stock_levels
                WHERE location_id = $1 AND (quantity <> 0 OR reserved <> 0)
            ) OR EXISTS (
                SELECT 1 FROM stock_movements WHERE location_id = $1
            )
            "#,
        )
            .bind(location_id)
            .fetch_one(executor)
            .await?;
        Ok(in_use)
    }

    pub async fn soft_delete_location<'e, E>(
        &self,
        executor: E,
        location_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE locations SET is_deleted = TRUE, deleted_at = now(), updated_at = now() WHERE id = $1",
        )
            .bind(location_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
