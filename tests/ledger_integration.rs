//! Testes de integração do livro-razão contra um PostgreSQL real.
//!
//! ```bash
//! cargo test --test ledger_integration -- --test-threads=1
//! ```

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serial_test::serial;
use uuid::Uuid;

use stock_ledger::{
    db::InventoryRepository,
    models::{
        catalog::UpdateItemPayload,
        inventory::{
            Counterpart, InboundPayload, MovementDirection, MovementFilter, MovementType,
            OutboundPayload, ReservationPayload, StockLevel,
        },
    },
    AppError, AppState,
};

use common::{create_item, create_location, item_payload, operator, test_state};

fn inbound(item_id: Uuid, location_id: Uuid, quantity: Decimal, movement_type: MovementType) -> InboundPayload {
    InboundPayload {
        item_id,
        location_id,
        quantity,
        movement_type,
        unit_cost: None,
        occurred_at: None,
        correlation_id: None,
        notes: None,
        attributes: None,
    }
}

fn outbound(item_id: Uuid, location_id: Uuid, quantity: Decimal, movement_type: MovementType) -> OutboundPayload {
    OutboundPayload {
        item_id,
        location_id,
        quantity,
        movement_type,
        target_location_id: None,
        correlation_id: None,
        counterpart: None,
        occurred_at: None,
        notes: None,
        attributes: None,
    }
}

fn transfer(item_id: Uuid, from: Uuid, to: Uuid, quantity: Decimal) -> OutboundPayload {
    OutboundPayload {
        target_location_id: Some(to),
        ..outbound(item_id, from, quantity, MovementType::Transfer)
    }
}

fn reservation(item_id: Uuid, location_id: Uuid, quantity: Decimal) -> ReservationPayload {
    ReservationPayload { item_id, location_id, quantity }
}

async fn level(state: &AppState, item_id: Uuid, location_id: Uuid) -> Option<StockLevel> {
    InventoryRepository::new()
        .get_stock_level(&state.db_pool, item_id, location_id)
        .await
        .expect("leitura do saldo")
}

async fn movement_count(state: &AppState) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stock_movements")
        .fetch_one(&state.db_pool)
        .await
        .expect("contagem de movimentações")
}

/// Item X com 10 unidades em W (compra), mais um segundo local W2 vazio.
async fn seeded(state: &AppState) -> (Uuid, Uuid, Uuid) {
    let item = create_item(state, "X", dec!(2.50), dec!(4.00)).await;
    let w = create_location(state, "W").await;
    let w2 = create_location(state, "W2").await;

    state
        .inventory_service
        .create_inbound(&state.db_pool, &inbound(item.id, w.id, dec!(10), MovementType::Purchase), operator())
        .await
        .expect("entrada inicial");

    (item.id, w.id, w2.id)
}

// ---
// Cenários base
// ---

#[tokio::test]
#[serial]
async fn inbound_creates_snapshot_and_single_movement() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let snapshot = level(&state, item, w).await.expect("saldo criado");
    assert_eq!(snapshot.quantity, dec!(10));
    assert_eq!(snapshot.reserved, dec!(0));

    let movements = state
        .inventory_service
        .list_movements(&state.db_pool, &MovementFilter::default())
        .await
        .unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].direction, MovementDirection::Inbound);
    assert_eq!(movements[0].quantity, dec!(10));
    assert_eq!(movements[0].unit_cost, Some(dec!(2.50)));
    assert_eq!(movements[0].amount, Some(dec!(25.00)));
}

#[tokio::test]
#[serial]
async fn outbound_beyond_stock_is_rejected_and_leaves_snapshot_untouched() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let err = state
        .inventory_service
        .create_outbound(&state.db_pool, &outbound(item, w, dec!(15), MovementType::Sale), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock));

    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(10));
    assert_eq!(movement_count(&state).await, 1);
}

#[tokio::test]
#[serial]
async fn transfer_moves_stock_and_pairs_both_legs() {
    let Some(state) = test_state().await else { return };
    let (item, w, w2) = seeded(&state).await;

    let out_leg = state
        .inventory_service
        .create_outbound(&state.db_pool, &transfer(item, w, w2, dec!(4)), operator())
        .await
        .unwrap();

    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(6));
    assert_eq!(level(&state, item, w2).await.unwrap().quantity, dec!(4));

    let reference = out_leg.correlation_id.clone().expect("referência gerada");
    assert!(reference.starts_with("TRF-"));

    let detail = state
        .inventory_service
        .get_transfer_order(&state.db_pool, &reference)
        .await
        .unwrap();
    assert_eq!(detail.header.source_location_id, w);
    assert_eq!(detail.header.target_location_id, w2);
    assert_eq!(detail.header.quantity, dec!(4));
    // Transferência é valorada pelo custo, não pelo preço de venda
    assert_eq!(detail.header.unit_cost, Some(dec!(2.50)));
    assert_eq!(detail.legs.len(), 2);
    assert_eq!(detail.legs[0].direction, MovementDirection::Outbound);
    assert_eq!(detail.legs[1].direction, MovementDirection::Inbound);
    assert!(detail.legs.iter().all(|leg| leg.correlation_id.as_deref() == Some(reference.as_str())));

    let orders = state
        .inventory_service
        .list_transfer_orders(&state.db_pool, None)
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].correlation_id, reference);
}

#[tokio::test]
#[serial]
async fn reserved_quantity_blocks_outbound() {
    let Some(state) = test_state().await else { return };
    let (item, w, w2) = seeded(&state).await;
    state
        .inventory_service
        .create_outbound(&state.db_pool, &transfer(item, w, w2, dec!(4)), operator())
        .await
        .unwrap();

    let after_reserve = state
        .inventory_service
        .reserve(&state.db_pool, &reservation(item, w, dec!(5)))
        .await
        .unwrap();
    assert_eq!(after_reserve.reserved, dec!(5));
    assert_eq!(after_reserve.available(), dec!(1));

    let err = state
        .inventory_service
        .create_outbound(&state.db_pool, &outbound(item, w, dec!(2), MovementType::Sale), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock));

    let snapshot = level(&state, item, w).await.unwrap();
    assert_eq!(snapshot.quantity, dec!(6));
    assert_eq!(snapshot.reserved, dec!(5));
}

#[tokio::test]
#[serial]
async fn item_with_stock_cannot_be_deleted() {
    let Some(state) = test_state().await else { return };
    let (item, w, w2) = seeded(&state).await;
    state
        .inventory_service
        .create_outbound(&state.db_pool, &transfer(item, w, w2, dec!(4)), operator())
        .await
        .unwrap();

    let err = state
        .catalog_service
        .delete_item(&state.db_pool, item)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ItemInUse));

    let err = state
        .catalog_service
        .delete_location(&state.db_pool, w)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::WarehouseInUse));
}

// ---
// Concorrência
// ---

#[tokio::test]
#[serial]
async fn concurrent_outbounds_never_oversell() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let first = outbound(item, w, dec!(7), MovementType::Sale);
    let second = outbound(item, w, dec!(7), MovementType::Sale);

    let (a, b) = tokio::join!(
        state.inventory_service.create_outbound(&state.db_pool, &first, operator()),
        state.inventory_service.create_outbound(&state.db_pool, &second, operator()),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exatamente uma saída deve vencer");
    for result in [a, b] {
        if let Err(err) = result {
            assert!(matches!(err, AppError::InsufficientStock));
        }
    }

    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(3));
    assert_eq!(movement_count(&state).await, 2);
}

#[tokio::test]
#[serial]
async fn concurrent_reservations_respect_available() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let payload = reservation(item, w, dec!(6));
    let (a, b) = tokio::join!(
        state.inventory_service.reserve(&state.db_pool, &payload),
        state.inventory_service.reserve(&state.db_pool, &payload),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(level(&state, item, w).await.unwrap().reserved, dec!(6));
}

// ---
// Reservas
// ---

#[tokio::test]
#[serial]
async fn release_cannot_exceed_reserved() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    state
        .inventory_service
        .reserve(&state.db_pool, &reservation(item, w, dec!(3)))
        .await
        .unwrap();

    let err = state
        .inventory_service
        .release(&state.db_pool, &reservation(item, w, dec!(4)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReserveExceeds));

    let after = state
        .inventory_service
        .release(&state.db_pool, &reservation(item, w, dec!(3)))
        .await
        .unwrap();
    assert_eq!(after.reserved, dec!(0));
    assert_eq!(after.quantity, dec!(10));
}

#[tokio::test]
#[serial]
async fn reserve_without_snapshot_is_insufficient() {
    let Some(state) = test_state().await else { return };
    let (item, _, w2) = seeded(&state).await;

    let err = state
        .inventory_service
        .reserve(&state.db_pool, &reservation(item, w2, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReserveInsufficient));
    assert!(level(&state, item, w2).await.is_none());
}

// ---
// Valoração
// ---

#[tokio::test]
#[serial]
async fn purchase_updates_last_cost_but_adjustment_does_not() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let mut purchase = inbound(item, w, dec!(2), MovementType::Purchase);
    purchase.unit_cost = Some(dec!(3.10));
    state
        .inventory_service
        .create_inbound(&state.db_pool, &purchase, operator())
        .await
        .unwrap();

    let mut adjustment = inbound(item, w, dec!(1), MovementType::Adjustment);
    adjustment.unit_cost = Some(dec!(9.99));
    state
        .inventory_service
        .create_inbound(&state.db_pool, &adjustment, operator())
        .await
        .unwrap();

    let refreshed = state.catalog_service.get_item(&state.db_pool, item).await.unwrap();
    assert_eq!(refreshed.base_cost, dec!(3.10));
    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(13));
}

#[tokio::test]
#[serial]
async fn sale_is_valued_at_sale_price_and_keeps_counterpart() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let mut sale = outbound(item, w, dec!(3), MovementType::Sale);
    sale.correlation_id = Some("PED-42".to_string());
    sale.counterpart = Some(Counterpart {
        name: Some("Mercado Central".to_string()),
        document: Some("12.345.678/0001-90".to_string()),
        contact: None,
    });

    let movement = state
        .inventory_service
        .create_outbound(&state.db_pool, &sale, operator())
        .await
        .unwrap();

    assert_eq!(movement.unit_cost, Some(dec!(4.00)));
    assert_eq!(movement.amount, Some(dec!(12.00)));
    assert_eq!(movement.correlation_id.as_deref(), Some("PED-42"));
    let counterpart = movement.counterpart.expect("contraparte gravada");
    assert_eq!(counterpart.0.name.as_deref(), Some("Mercado Central"));
}

// ---
// Validações de transferência e de tipo
// ---

#[tokio::test]
#[serial]
async fn transfer_validation_errors() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let no_target = outbound(item, w, dec!(1), MovementType::Transfer);
    let err = state
        .inventory_service
        .create_outbound(&state.db_pool, &no_target, operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransferTargetRequired));

    let err = state
        .inventory_service
        .create_outbound(&state.db_pool, &transfer(item, w, w, dec!(1)), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransferSameWarehouse));

    let err = state
        .inventory_service
        .create_outbound(&state.db_pool, &transfer(item, w, Uuid::new_v4(), dec!(1)), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransferTargetNotFound));

    let err = state
        .inventory_service
        .create_inbound(&state.db_pool, &inbound(item, w, dec!(1), MovementType::Transfer), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidMovementType { .. }));

    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(10));
    assert_eq!(movement_count(&state).await, 1);
}

#[tokio::test]
#[serial]
async fn duplicate_transfer_reference_rolls_back_everything() {
    let Some(state) = test_state().await else { return };
    let (item, w, w2) = seeded(&state).await;

    let mut first = transfer(item, w, w2, dec!(2));
    first.correlation_id = Some("TR-2024-001".to_string());
    state
        .inventory_service
        .create_outbound(&state.db_pool, &first, operator())
        .await
        .unwrap();

    let err = state
        .inventory_service
        .create_outbound(&state.db_pool, &first, operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransferReferenceExists(ref r) if r == "TR-2024-001"));

    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(8));
    assert_eq!(level(&state, item, w2).await.unwrap().quantity, dec!(2));
    assert_eq!(movement_count(&state).await, 3);
}

#[tokio::test]
#[serial]
async fn unknown_item_or_location_is_not_found() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let err = state
        .inventory_service
        .create_inbound(&state.db_pool, &inbound(Uuid::new_v4(), w, dec!(1), MovementType::Return), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ItemNotFound));

    let err = state
        .inventory_service
        .create_outbound(&state.db_pool, &outbound(item, Uuid::new_v4(), dec!(1), MovementType::Sale), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::WarehouseNotFound));
}

// ---
// Estorno
// ---

#[tokio::test]
#[serial]
async fn reverting_a_sale_restores_stock() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let sale = state
        .inventory_service
        .create_outbound(&state.db_pool, &outbound(item, w, dec!(4), MovementType::Sale), operator())
        .await
        .unwrap();
    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(6));

    let reverted = state
        .inventory_service
        .revert_movement(&state.db_pool, sale.id, operator())
        .await
        .unwrap();
    assert_eq!(reverted.len(), 1);
    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(10));
    assert_eq!(movement_count(&state).await, 1);

    let err = state
        .inventory_service
        .revert_movement(&state.db_pool, sale.id, operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MovementNotFound));
}

#[tokio::test]
#[serial]
async fn reverting_either_transfer_leg_reverts_both() {
    let Some(state) = test_state().await else { return };
    let (item, w, w2) = seeded(&state).await;

    let out_leg = state
        .inventory_service
        .create_outbound(&state.db_pool, &transfer(item, w, w2, dec!(4)), operator())
        .await
        .unwrap();
    let reference = out_leg.correlation_id.clone().unwrap();
    let detail = state
        .inventory_service
        .get_transfer_order(&state.db_pool, &reference)
        .await
        .unwrap();
    let in_leg = &detail.legs[1];

    let reverted = state
        .inventory_service
        .revert_movement(&state.db_pool, in_leg.id, operator())
        .await
        .unwrap();
    assert_eq!(reverted.len(), 2);

    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(10));
    assert_eq!(level(&state, item, w2).await.unwrap().quantity, dec!(0));

    let err = state
        .inventory_service
        .get_transfer_order(&state.db_pool, &reference)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransferNotFound));
}

#[tokio::test]
#[serial]
async fn reverting_a_consumed_inbound_is_refused() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let initial = state
        .inventory_service
        .list_movements(&state.db_pool, &MovementFilter::default())
        .await
        .unwrap()
        .remove(0);
    state
        .inventory_service
        .reserve(&state.db_pool, &reservation(item, w, dec!(1)))
        .await
        .unwrap();

    let err = state
        .inventory_service
        .revert_movement(&state.db_pool, initial.id, operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock));
    assert_eq!(movement_count(&state).await, 1);
    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(10));
}

// ---
// Consultas
// ---

#[tokio::test]
#[serial]
async fn movement_filters_and_limit() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;
    let other = create_item(&state, "Y", dec!(1), dec!(0)).await;

    state
        .inventory_service
        .create_inbound(&state.db_pool, &inbound(other.id, w, dec!(5), MovementType::InitialStock), operator())
        .await
        .unwrap();
    state
        .inventory_service
        .create_outbound(&state.db_pool, &outbound(item, w, dec!(1), MovementType::Spoilage), operator())
        .await
        .unwrap();

    let by_item = state
        .inventory_service
        .list_movements(&state.db_pool, &MovementFilter { item_id: Some(item), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(by_item.len(), 2);
    assert!(by_item.iter().all(|m| m.item_id == item));

    let by_type = state
        .inventory_service
        .list_movements(
            &state.db_pool,
            &MovementFilter { movement_type: Some(MovementType::Spoilage), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(by_type.len(), 1);

    let limited = state
        .inventory_service
        .list_movements(&state.db_pool, &MovementFilter { limit: Some(0), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
#[serial]
async fn stats_report_low_stock_and_today_totals() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    state
        .catalog_service
        .update_item(
            &state.db_pool,
            item,
            &UpdateItemPayload { safety_stock: Some(dec!(20)), ..Default::default() },
        )
        .await
        .unwrap();
    state
        .inventory_service
        .create_outbound(&state.db_pool, &outbound(item, w, dec!(3), MovementType::Sale), operator())
        .await
        .unwrap();
    state
        .inventory_service
        .reserve(&state.db_pool, &reservation(item, w, dec!(2)))
        .await
        .unwrap();

    let stats = state.dashboard_service.get_stats(&state.db_pool).await.unwrap();
    assert_eq!(stats.total_items, 1);
    assert_eq!(stats.total_locations, 2);
    assert_eq!(stats.total_available, dec!(5));
    assert_eq!(stats.today_inbound, dec!(10));
    assert_eq!(stats.today_outbound, dec!(3));
    assert_eq!(stats.low_stock.len(), 1);
    assert_eq!(stats.low_stock[0].item_id, item);
    assert_eq!(stats.low_stock[0].deficit, dec!(15));
}

// ---
// Catálogo
// ---

#[tokio::test]
#[serial]
async fn unused_item_and_location_are_soft_deleted() {
    let Some(state) = test_state().await else { return };
    let item = create_item(&state, "Z", dec!(0), dec!(0)).await;
    let location = create_location(&state, "TMP").await;

    state.catalog_service.delete_item(&state.db_pool, item.id).await.unwrap();
    state.catalog_service.delete_location(&state.db_pool, location.id).await.unwrap();

    let err = state.catalog_service.get_item(&state.db_pool, item.id).await.unwrap_err();
    assert!(matches!(err, AppError::ItemNotFound));
    assert!(state.catalog_service.list_locations(&state.db_pool).await.unwrap().is_empty());

    // SKU liberado após a remoção lógica
    create_item(&state, "Z", dec!(1), dec!(0)).await;
}

#[tokio::test]
#[serial]
async fn duplicate_active_sku_is_rejected() {
    let Some(state) = test_state().await else { return };
    create_item(&state, "DUP", dec!(1), dec!(2)).await;

    let err = state
        .catalog_service
        .create_item(&state.db_pool, &item_payload("DUP", dec!(1), dec!(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SkuAlreadyExists(ref sku) if sku == "DUP"));
}

#[tokio::test]
#[serial]
async fn movements_on_deleted_location_are_rejected() {
    let Some(state) = test_state().await else { return };
    let item = create_item(&state, "Q", dec!(1), dec!(0)).await;
    let location = create_location(&state, "OLD").await;
    state.catalog_service.delete_location(&state.db_pool, location.id).await.unwrap();

    let err = state
        .inventory_service
        .create_inbound(&state.db_pool, &inbound(item.id, location.id, dec!(1), MovementType::Purchase), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::WarehouseNotFound));
}

#[tokio::test]
#[serial]
async fn item_with_history_but_zero_stock_cannot_be_deleted() {
    let Some(state) = test_state().await else { return };
    let item = create_item(&state, "H", dec!(1), dec!(2)).await;
    let location = create_location(&state, "HIST").await;

    state
        .inventory_service
        .create_inbound(&state.db_pool, &inbound(item.id, location.id, dec!(5), MovementType::Purchase), operator())
        .await
        .unwrap();
    state
        .inventory_service
        .create_outbound(&state.db_pool, &outbound(item.id, location.id, dec!(5), MovementType::Sale), operator())
        .await
        .unwrap();
    assert_eq!(level(&state, item.id, location.id).await.unwrap().quantity, dec!(0));

    let err = state
        .catalog_service
        .delete_item(&state.db_pool, item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ItemInUse));

    let err = state
        .catalog_service
        .delete_location(&state.db_pool, location.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::WarehouseInUse));
}

// ---
// Escala decimal (NUMERIC(18, 4))
// ---

#[tokio::test]
#[serial]
async fn quantities_beyond_four_decimals_are_rejected_without_side_effects() {
    let Some(state) = test_state().await else { return };
    let (item, w, w2) = seeded(&state).await;

    let err = state
        .inventory_service
        .create_outbound(&state.db_pool, &outbound(item, w, dec!(0.00005), MovementType::Sale), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidQuantity));

    let err = state
        .inventory_service
        .create_outbound(&state.db_pool, &transfer(item, w, w2, dec!(1.00001)), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidQuantity));

    let err = state
        .inventory_service
        .create_inbound(&state.db_pool, &inbound(item, w, dec!(0.00001), MovementType::Adjustment), operator())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidQuantity));

    let err = state
        .inventory_service
        .reserve(&state.db_pool, &reservation(item, w, dec!(0.00005)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidQuantity));

    let err = state
        .inventory_service
        .release(&state.db_pool, &reservation(item, w, dec!(0.00005)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidQuantity));

    let snapshot = level(&state, item, w).await.unwrap();
    assert_eq!(snapshot.quantity, dec!(10));
    assert_eq!(snapshot.reserved, dec!(0));
    assert!(level(&state, item, w2).await.is_none());
    assert_eq!(movement_count(&state).await, 1);
}

#[tokio::test]
#[serial]
async fn unit_cost_beyond_four_decimals_is_a_validation_error() {
    let Some(state) = test_state().await else { return };
    let (item, w, _) = seeded(&state).await;

    let mut purchase = inbound(item, w, dec!(1), MovementType::Purchase);
    purchase.unit_cost = Some(dec!(1.23456));
    let err = state
        .inventory_service
        .create_inbound(&state.db_pool, &purchase, operator())
        .await
        .unwrap_err();
    match err {
        AppError::ValidationError(errors) => assert!(errors.field_errors().contains_key("unit_cost")),
        other => panic!("esperava VALIDATION_ERROR, veio {}", other.code()),
    }

    // Quatro casas passam, e o livro-razão bate com o saldo
    purchase.unit_cost = Some(dec!(1.2345));
    purchase.quantity = dec!(0.0001);
    let movement = state
        .inventory_service
        .create_inbound(&state.db_pool, &purchase, operator())
        .await
        .unwrap();
    assert_eq!(movement.quantity, dec!(0.0001));
    assert_eq!(level(&state, item, w).await.unwrap().quantity, dec!(10.0001));
    assert_eq!(
        state.catalog_service.get_item(&state.db_pool, item).await.unwrap().base_cost,
        dec!(1.2345)
    );
}

// ---
// Painel: estoque baixo
// ---

#[tokio::test]
#[serial]
async fn low_stock_is_ordered_by_deficit_and_capped_at_twenty() {
    let Some(state) = test_state().await else { return };

    // 25 itens sem saldo, estoque de segurança 1..=25 (déficit = estoque de segurança)
    for n in 1..=25_i64 {
        let mut payload = item_payload(&format!("LOW-{n:02}"), dec!(1), dec!(0));
        payload.safety_stock = Decimal::from(n);
        state
            .catalog_service
            .create_item(&state.db_pool, &payload)
            .await
            .unwrap();
    }

    let stats = state.dashboard_service.get_stats(&state.db_pool).await.unwrap();
    assert_eq!(stats.total_items, 25);
    assert_eq!(stats.low_stock.len(), 20);
    assert!(stats.low_stock.windows(2).all(|pair| pair[0].deficit >= pair[1].deficit));
    assert_eq!(stats.low_stock[0].deficit, dec!(25));
    assert_eq!(stats.low_stock[0].sku, "LOW-25");
    assert_eq!(stats.low_stock[19].deficit, dec!(6));
}
