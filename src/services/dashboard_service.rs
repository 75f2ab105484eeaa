// src/services/dashboard_service.rs

use sqlx::{Acquire, Postgres};

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::InventoryStats,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_stats<'e, E>(&self, executor: E) -> Result<InventoryStats, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        self.repo.get_stats(executor).await
    }
}
