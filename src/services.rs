pub mod catalog_service;
pub use catalog_service::CatalogService;
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
