// tests/common/mod.rs
//
// Container PostgreSQL compartilhado entre os testes do arquivo. Rode com:
//
//   cargo test --test ledger_integration -- --test-threads=1
//
// Sem Docker disponível, `test_state` devolve `None` e o teste é pulado.

#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use stock_ledger::{
    db,
    models::catalog::{CreateItemPayload, CreateLocationPayload, Item, Location, LocationKind},
    AppState,
};

struct ContainerInfo {
    #[allow(dead_code)] // o container precisa viver até o fim dos testes
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Option<Arc<ContainerInfo>>> = OnceCell::const_new();

async fn start_container() -> Option<Arc<ContainerInfo>> {
    let container = match Postgres::default().with_tag("16-alpine").start().await {
        Ok(container) => container,
        Err(err) => {
            eprintln!("PostgreSQL indisponível, pulando testes de integração: {err}");
            return None;
        }
    };

    let host = container.get_host().await.ok()?;
    let port = container.get_host_port_ipv4(5432).await.ok()?;
    let connection_string = format!("postgres://postgres:postgres@{host}:{port}/postgres");

    let pool = PgPool::connect(&connection_string).await.ok()?;
    db::run_migrations(&pool).await.expect("migrações");
    pool.close().await;

    Some(Arc::new(ContainerInfo { container, connection_string }))
}

/// Estado novo, com pool próprio e tabelas vazias.
pub async fn test_state() -> Option<AppState> {
    let info = CONTAINER.get_or_init(start_container).await.clone()?;

    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&info.connection_string)
        .await
        .expect("conexão com o banco de testes");

    sqlx::query("TRUNCATE TABLE stock_movements, stock_levels, items, locations")
        .execute(&pool)
        .await
        .expect("limpeza das tabelas");

    Some(AppState::from_pool(pool))
}

pub fn operator() -> Uuid {
    Uuid::new_v4()
}

pub fn item_payload(sku: &str, base_cost: Decimal, sale_price: Decimal) -> CreateItemPayload {
    CreateItemPayload {
        sku: sku.to_string(),
        name: format!("Item {sku}"),
        unit: "un".to_string(),
        base_cost,
        sale_price,
        category: None,
        safety_stock: Decimal::ZERO,
        barcode: None,
        spec: None,
    }
}

pub async fn create_item(state: &AppState, sku: &str, base_cost: Decimal, sale_price: Decimal) -> Item {
    state
        .catalog_service
        .create_item(&state.db_pool, &item_payload(sku, base_cost, sale_price))
        .await
        .expect("criação do item")
}

pub async fn create_location(state: &AppState, code: &str) -> Location {
    let payload = CreateLocationPayload {
        name: format!("Depósito {code}"),
        code: code.to_string(),
        kind: LocationKind::default(),
        address: None,
        capacity: None,
        manager: None,
        attributes: None,
    };
    state
        .catalog_service
        .create_location(&state.db_pool, &payload)
        .await
        .expect("criação do local")
}
