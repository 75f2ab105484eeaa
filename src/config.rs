// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{CatalogRepository, DashboardRepository, InventoryRepository},
    services::{CatalogService, DashboardService, InventoryService},
};

// Configuração lida do ambiente (.env é opcional)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v.parse().context("DB_MAX_CONNECTIONS deve ser um número inteiro")?,
            Err(_) => 5,
        };
        let db_acquire_timeout = match env::var("DB_ACQUIRE_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(
                v.parse().context("DB_ACQUIRE_TIMEOUT_SECS deve ser um número inteiro")?,
            ),
            Err(_) => Duration::from_secs(3),
        };

        Ok(Self {
            database_url,
            server_addr,
            db_max_connections,
            db_acquire_timeout,
        })
    }
}

// O estado compartilhado, injetado nos handlers. Nada de pool global:
// os testes montam o seu próprio com `from_pool`.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub catalog_service: CatalogService,
    pub inventory_service: InventoryService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool))
    }

    /// Monta o gráfico de dependências sobre um pool já existente.
    pub fn from_pool(db_pool: PgPool) -> Self {
        let catalog_repo = CatalogRepository::new();
        let inventory_repo = InventoryRepository::new();

        Self {
            catalog_service: CatalogService::new(catalog_repo.clone()),
            inventory_service: InventoryService::new(inventory_repo, catalog_repo),
            dashboard_service: DashboardService::new(DashboardRepository::new()),
            db_pool,
        }
    }
}
