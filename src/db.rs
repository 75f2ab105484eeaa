pub mod catalog_repo;
pub use catalog_repo::{CatalogRepository, RowLock};
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;

use sqlx::PgPool;

/// Aplica as migrações de `migrations/` (embutidas no binário).
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
