// src/services/catalog_service.rs

use sqlx::{Acquire, Executor, PgConnection, Postgres};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    common::{db_utils::finish_transaction, error::AppError},
    db::{CatalogRepository, RowLock},
    models::catalog::{
        CreateItemPayload, CreateLocationPayload, Item, Location, UpdateItemPayload,
        UpdateLocationPayload,
    },
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    #[instrument(skip(self, executor, payload), fields(sku = %payload.sku))]
    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        payload: &CreateItemPayload,
    ) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = self.repo.create_item(executor, payload).await?;
        info!(item_id = %item.id, "Item criado");
        Ok(item)
    }

    pub async fn get_item<'e, E>(&self, executor: E, item_id: Uuid) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_item(executor, item_id, RowLock::None)
            .await?
            .ok_or(AppError::ItemNotFound)
    }

    pub async fn list_items<'e, E>(&self, executor: E) -> Result<Vec<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_items(executor).await
    }

    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        payload: &UpdateItemPayload,
    ) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_item(executor, item_id, payload)
            .await?
            .ok_or(AppError::ItemNotFound)
    }

    /// Remoção lógica, recusada enquanto houver saldo ou histórico.
    #[instrument(skip(self, executor))]
    pub async fn delete_item<'e, E>(&self, executor: E, item_id: Uuid) -> Result<(), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let result = self.delete_item_in_tx(&mut tx, item_id).await;
        finish_transaction(tx, "delete_item", result).await?;

        info!("Item removido");
        Ok(())
    }

    async fn delete_item_in_tx(&self, conn: &mut PgConnection, item_id: Uuid) -> Result<(), AppError> {
        // FOR UPDATE: espera movimentações em andamento sobre o item terminarem
        self.repo
            .find_item(&mut *conn, item_id, RowLock::Update)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        if self.repo.item_in_use(&mut *conn, item_id).await? {
            return Err(AppError::ItemInUse);
        }

        self.repo.soft_delete_item(&mut *conn, item_id).await
    }

    // =========================================================================
    //  LOCAIS
    // =========================================================================

    #[instrument(skip(self, executor, payload), fields(code = %payload.code))]
    pub async fn create_location<'e, E>(
        &self,
        executor: E,
        payload: &CreateLocationPayload,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = self.repo.create_location(executor, payload).await?;
        info!(location_id = %location.id, "Local criado");
        Ok(location)
    }

    pub async fn get_location<'e, E>(&self, executor: E, location_id: Uuid) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_location(executor, location_id, RowLock::None)
            .await?
            .ok_or(AppError::WarehouseNotFound)
    }

    pub async fn list_locations<'e, E>(&self, executor: E) -> Result<Vec<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_locations(executor).await
    }

    pub async fn update_location<'e, E>(
        &self,
        executor: E,
        location_id: Uuid,
        payload: &UpdateLocationPayload,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_location(executor, location_id, payload)
            .await?
            .ok_or(AppError::WarehouseNotFound)
    }

    #[instrument(skip(self, executor))]
    pub async fn delete_location<'e, E>(&self, executor: E, location_id: Uuid) -> Result<(), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let result = self.delete_location_in_tx(&mut tx, location_id).await;
        finish_transaction(tx, "delete_location", result).await?;

        info!("Local removido");
        Ok(())
    }

    async fn delete_location_in_tx(
        &self,
        conn: &mut PgConnection,
        location_id: Uuid,
    ) -> Result<(), AppError> {
        self.repo
            .find_location(&mut *conn, location_id, RowLock::Update)
            .await?
            .ok_or(AppError::WarehouseNotFound)?;

        if self.repo.location_in_use(&mut *conn, location_id).await? {
            return Err(AppError::WarehouseInUse);
        }

        self.repo.soft_delete_location(&mut *conn, location_id).await
    }
}
