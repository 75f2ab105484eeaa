//! Livro-razão de estoque e motor de reservas.
//!
//! Saldos por (item, local), reservas e o histórico imutável de movimentações,
//! com garantia de saldo não negativo sob escritores concorrentes usando apenas
//! transações e updates condicionais do PostgreSQL.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use common::error::AppError;
pub use config::{AppState, Config};
