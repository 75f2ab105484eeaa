// src/services/inventory_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::finish_transaction, error::AppError},
    db::{CatalogRepository, InventoryRepository, RowLock},
    models::exceeds_scale,
    models::inventory::{
        clamp_limit, compute_amount, InboundPayload, Movement, MovementAttributes,
        MovementDirection, MovementFilter, MovementType, NewMovement, OutboundPayload,
        ReservationPayload, StockLevel, StockLevelFilter, StockLevelView, TransferOrder,
        TransferOrderDetail,
    },
};

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    catalog_repo: CatalogRepository,
}

// ---
// Regras puras (sem banco)
// ---

/// Quantidade > 0 e representável em NUMERIC(18, 4): o banco arredondaria
/// o livro-razão e o saldo separadamente.
fn ensure_positive(quantity: Decimal) -> Result<(), AppError> {
    if quantity <= Decimal::ZERO || exceeds_scale(quantity) {
        return Err(AppError::InvalidQuantity);
    }
    Ok(())
}

fn ensure_allowed(movement_type: MovementType, direction: MovementDirection) -> Result<(), AppError> {
    if !movement_type.allowed_for(direction) {
        return Err(AppError::InvalidMovementType { direction, movement_type });
    }
    Ok(())
}

/// Custo unitário de uma saída.
/// - transferência: sempre o custo registrado (valoração interna);
/// - venda: preço de venda, senão o custo; sem valor se nenhum for positivo;
/// - demais: o custo, se positivo.
pub(crate) fn outbound_unit_cost(
    movement_type: MovementType,
    base_cost: Decimal,
    sale_price: Decimal,
) -> Option<Decimal> {
    match movement_type {
        MovementType::Transfer => Some(base_cost),
        MovementType::Sale if sale_price > Decimal::ZERO => Some(sale_price),
        _ if base_cost > Decimal::ZERO => Some(base_cost),
        _ => None,
    }
}

fn new_transfer_reference() -> String {
    format!("TRF-{}", Uuid::new_v4().simple())
}

/// Referência da transferência: a do chamador (se não vazia) ou uma nova.
fn transfer_reference(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(reference) if !reference.is_empty() => reference.to_string(),
        _ => new_transfer_reference(),
    }
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository, catalog_repo: CatalogRepository) -> Self {
        Self { inventory_repo, catalog_repo }
    }

    // =========================================================================
    //  ENTRADA
    // =========================================================================

    #[instrument(
        skip(self, executor, payload),
        fields(item_id = %payload.item_id, location_id = %payload.location_id, quantity = %payload.quantity)
    )]
    pub async fn create_inbound<'e, E>(
        &self,
        executor: E,
        payload: &InboundPayload,
        operator_id: Uuid,
    ) -> Result<Movement, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        ensure_positive(payload.quantity)?;
        ensure_allowed(payload.movement_type, MovementDirection::Inbound)?;
        payload.validate()?;

        let mut tx = executor.begin().await?;
        let result = self.inbound_in_tx(&mut tx, payload, operator_id).await;
        let movement = finish_transaction(tx, "inbound", result).await?;

        info!(movement_id = %movement.id, movement_type = %movement.movement_type, "Entrada registrada");
        Ok(movement)
    }

    async fn inbound_in_tx(
        &self,
        conn: &mut PgConnection,
        payload: &InboundPayload,
        operator_id: Uuid,
    ) -> Result<Movement, AppError> {
        let is_purchase = payload.movement_type == MovementType::Purchase;

        // A compra reescreve o custo do item: trava já no modo de escrita
        let item_lock = if is_purchase { RowLock::NoKeyUpdate } else { RowLock::Share };
        let item = self.catalog_repo
            .find_item(&mut *conn, payload.item_id, item_lock)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        self.catalog_repo
            .find_location(&mut *conn, payload.location_id, RowLock::Share)
            .await?
            .ok_or(AppError::WarehouseNotFound)?;

        let unit_cost = payload.unit_cost.unwrap_or(item.base_cost);

        // 1. Grava Histórico
        let movement = self.inventory_repo
            .record_movement(&mut *conn, &NewMovement {
                direction: MovementDirection::Inbound,
                movement_type: payload.movement_type,
                item_id: payload.item_id,
                location_id: payload.location_id,
                correlation_id: payload.correlation_id.clone(),
                quantity: payload.quantity,
                unit_cost: Some(unit_cost),
                amount: compute_amount(Some(unit_cost), payload.quantity),
                operator_id,
                occurred_at: payload.occurred_at.unwrap_or_else(Utc::now),
                counterpart: None,
                notes: payload.notes.clone(),
                attributes: payload.attributes.clone().unwrap_or_default(),
            })
            .await?;

        // 2. Atualiza Saldo (upsert; reserved intocado)
        self.inventory_repo
            .increment_quantity(&mut *conn, payload.item_id, payload.location_id, payload.quantity)
            .await?;

        // 3. "Último custo"
        if is_purchase {
            self.catalog_repo
                .update_item_base_cost(&mut *conn, payload.item_id, unit_cost)
                .await?;
        }

        Ok(movement)
    }

    // =========================================================================
    //  SAÍDA (e Transferência)
    // =========================================================================

    #[instrument(
        skip(self, executor, payload),
        fields(item_id = %payload.item_id, location_id = %payload.location_id, quantity = %payload.quantity)
    )]
    pub async fn create_outbound<'e, E>(
        &self,
        executor: E,
        payload: &OutboundPayload,
        operator_id: Uuid,
    ) -> Result<Movement, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        ensure_positive(payload.quantity)?;
        ensure_allowed(payload.movement_type, MovementDirection::Outbound)?;
        payload.validate()?;

        let mut tx = executor.begin().await?;
        let result = self.outbound_in_tx(&mut tx, payload, operator_id).await;
        let movement = finish_transaction(tx, "outbound", result).await?;

        info!(
            movement_id = %movement.id,
            movement_type = %movement.movement_type,
            correlation_id = movement.correlation_id.as_deref().unwrap_or(""),
            "Saída registrada"
        );
        Ok(movement)
    }

    async fn outbound_in_tx(
        &self,
        conn: &mut PgConnection,
        payload: &OutboundPayload,
        operator_id: Uuid,
    ) -> Result<Movement, AppError> {
        let item = self.catalog_repo
            .find_item(&mut *conn, payload.item_id, RowLock::Share)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        self.catalog_repo
            .find_location(&mut *conn, payload.location_id, RowLock::Share)
            .await?
            .ok_or(AppError::WarehouseNotFound)?;

        // Validação do destino (somente transferência)
        let target_location_id = if payload.movement_type == MovementType::Transfer {
            let target_id = payload
                .target_location_id
                .ok_or(AppError::TransferTargetRequired)?;
            self.catalog_repo
                .find_location(&mut *conn, target_id, RowLock::Share)
                .await?
                .ok_or(AppError::TransferTargetNotFound)?;
            if target_id == payload.location_id {
                return Err(AppError::TransferSameWarehouse);
            }
            Some(target_id)
        } else {
            None
        };

        // 1. Valida Saldo Disponível
        let available = self.inventory_repo
            .get_stock_level(&mut *conn, payload.item_id, payload.location_id)
            .await?
            .map(|level| level.available())
            .unwrap_or(Decimal::ZERO);
        if available < payload.quantity {
            return Err(AppError::InsufficientStock);
        }

        // 2. Baixa condicional. 0 linhas = outra transação levou o saldo desde a leitura.
        let affected = self.inventory_repo
            .decrement_quantity(&mut *conn, payload.item_id, payload.location_id, payload.quantity)
            .await?;
        if affected == 0 {
            return Err(AppError::InsufficientStock);
        }

        // 3. Valoração
        let unit_cost = outbound_unit_cost(payload.movement_type, item.base_cost, item.sale_price);
        let amount = compute_amount(unit_cost, payload.quantity);
        let occurred_at = payload.occurred_at.unwrap_or_else(Utc::now);
        let attributes: MovementAttributes = payload.attributes.clone().unwrap_or_default();

        let correlation_id = match target_location_id {
            Some(_) => Some(transfer_reference(payload.correlation_id.as_deref())),
            None => payload.correlation_id.clone(),
        };

        // 4. Grava a perna de saída
        let outbound = self.inventory_repo
            .record_movement(&mut *conn, &NewMovement {
                direction: MovementDirection::Outbound,
                movement_type: payload.movement_type,
                item_id: payload.item_id,
                location_id: payload.location_id,
                correlation_id: correlation_id.clone(),
                quantity: payload.quantity,
                unit_cost,
                amount,
                operator_id,
                occurred_at,
                counterpart: payload.counterpart.clone(),
                notes: payload.notes.clone(),
                attributes: attributes.clone(),
            })
            .await?;

        // 5. Transferência: perna de entrada casada + saldo do destino
        if let Some(target_id) = target_location_id {
            self.inventory_repo
                .record_movement(&mut *conn, &NewMovement {
                    direction: MovementDirection::Inbound,
                    movement_type: MovementType::Transfer,
                    item_id: payload.item_id,
                    location_id: target_id,
                    correlation_id,
                    quantity: payload.quantity,
                    unit_cost,
                    amount,
                    operator_id,
                    occurred_at,
                    counterpart: None,
                    notes: payload.notes.clone(),
                    attributes,
                })
                .await?;

            self.inventory_repo
                .increment_quantity(&mut *conn, payload.item_id, target_id, payload.quantity)
                .await?;
        }

        Ok(outbound)
    }

    // =========================================================================
    //  RESERVAS
    // =========================================================================

    #[instrument(skip(self, executor, payload), fields(item_id = %payload.item_id, location_id = %payload.location_id, quantity = %payload.quantity))]
    pub async fn reserve<'e, E>(
        &self,
        executor: E,
        payload: &ReservationPayload,
    ) -> Result<StockLevel, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        ensure_positive(payload.quantity)?;

        let mut tx = executor.begin().await?;
        let result: Result<StockLevel, AppError> = async {
            self.ensure_pair_exists(&mut tx, payload.item_id, payload.location_id).await?;
            self.inventory_repo
                .reserve(&mut *tx, payload.item_id, payload.location_id, payload.quantity)
                .await?
                .ok_or(AppError::ReserveInsufficient)
        }
        .await;
        let level = finish_transaction(tx, "reserve", result).await?;

        info!(reserved = %level.reserved, "Reserva registrada");
        Ok(level)
    }

    #[instrument(skip(self, executor, payload), fields(item_id = %payload.item_id, location_id = %payload.location_id, quantity = %payload.quantity))]
    pub async fn release<'e, E>(
        &self,
        executor: E,
        payload: &ReservationPayload,
    ) -> Result<StockLevel, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        ensure_positive(payload.quantity)?;

        let mut tx = executor.begin().await?;
        let result: Result<StockLevel, AppError> = async {
            self.ensure_pair_exists(&mut tx, payload.item_id, payload.location_id).await?;
            self.inventory_repo
                .release(&mut *tx, payload.item_id, payload.location_id, payload.quantity)
                .await?
                .ok_or(AppError::ReserveExceeds)
        }
        .await;
        let level = finish_transaction(tx, "release", result).await?;

        info!(reserved = %level.reserved, "Reserva liberada");
        Ok(level)
    }

    async fn ensure_pair_exists(
        &self,
        conn: &mut PgConnection,
        item_id: Uuid,
        location_id: Uuid,
    ) -> Result<(), AppError> {
        self.catalog_repo
            .find_item(&mut *conn, item_id, RowLock::Share)
            .await?
            .ok_or(AppError::ItemNotFound)?;
        self.catalog_repo
            .find_location(&mut *conn, location_id, RowLock::Share)
            .await?
            .ok_or(AppError::WarehouseNotFound)?;
        Ok(())
    }

    // =========================================================================
    //  ESTORNO (operação compensatória)
    // =========================================================================

    /// Apaga a movimentação e desfaz o seu efeito no saldo. Estornar qualquer
    /// perna de uma transferência estorna as duas. Retorna as linhas removidas.
    #[instrument(skip(self, executor))]
    pub async fn revert_movement<'e, E>(
        &self,
        executor: E,
        movement_id: Uuid,
        operator_id: Uuid,
    ) -> Result<Vec<Movement>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let result = self.revert_in_tx(&mut tx, movement_id).await;
        let reverted = finish_transaction(tx, "revert", result).await?;

        info!(legs = reverted.len(), %operator_id, "Movimentação estornada");
        Ok(reverted)
    }

    async fn revert_in_tx(
        &self,
        conn: &mut PgConnection,
        movement_id: Uuid,
    ) -> Result<Vec<Movement>, AppError> {
        let movement = self.inventory_repo
            .find_movement_for_update(&mut *conn, movement_id)
            .await?
            .ok_or(AppError::MovementNotFound)?;

        let reference = match movement.movement_type {
            MovementType::Transfer => movement.correlation_id.clone(),
            _ => None,
        };
        let legs = match reference {
            Some(reference) => {
                self.inventory_repo
                    .find_transfer_legs(&mut *conn, &reference, true)
                    .await?
            }
            None => vec![movement],
        };

        for leg in &legs {
            match leg.direction {
                // Desfazer uma entrada é uma baixa: mesma guarda da saída
                MovementDirection::Inbound => {
                    let affected = self.inventory_repo
                        .decrement_quantity(&mut *conn, leg.item_id, leg.location_id, leg.quantity)
                        .await?;
                    if affected == 0 {
                        return Err(AppError::InsufficientStock);
                    }
                }
                MovementDirection::Outbound => {
                    self.inventory_repo
                        .increment_quantity(&mut *conn, leg.item_id, leg.location_id, leg.quantity)
                        .await?;
                }
            }
            self.inventory_repo.delete_movement(&mut *conn, leg.id).await?;
        }

        Ok(legs)
    }

    // =========================================================================
    //  LEITURAS
    // =========================================================================

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        filter: &MovementFilter,
    ) -> Result<Vec<Movement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo.list_movements(executor, filter).await
    }

    pub async fn list_stock_levels<'e, E>(
        &self,
        executor: E,
        filter: &StockLevelFilter,
    ) -> Result<Vec<StockLevelView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let levels = self.inventory_repo.list_stock_levels(executor, filter).await?;
        Ok(levels.into_iter().map(StockLevelView::from).collect())
    }

    pub async fn list_transfer_orders<'e, E>(
        &self,
        executor: E,
        limit: Option<i64>,
    ) -> Result<Vec<TransferOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo
            .list_transfer_orders(executor, clamp_limit(limit))
            .await
    }

    pub async fn get_transfer_order<'e, E>(
        &self,
        executor: E,
        correlation_id: &str,
    ) -> Result<TransferOrderDetail, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let header = self.inventory_repo
            .find_transfer_order(&mut *conn, correlation_id)
            .await?
            .ok_or(AppError::TransferNotFound)?;
        let legs = self.inventory_repo
            .find_transfer_legs(&mut *conn, correlation_id, false)
            .await?;

        Ok(TransferOrderDetail { header, legs })
    }
}
