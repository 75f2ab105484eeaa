// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::inventory::{MovementDirection, MovementType};

// Nosso tipo de erro. Cada variante de negócio tem um código simbólico estável
// (ver `code()`), que é o que os consumidores devem comparar.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("A quantidade deve ser maior que zero.")]
    InvalidQuantity,

    #[error("O tipo '{movement_type}' não é permitido em movimentações de {direction}.")]
    InvalidMovementType {
        direction: MovementDirection,
        movement_type: MovementType,
    },

    #[error("O cabeçalho X-Operator-Id é obrigatório e deve ser um UUID.")]
    OperatorRequired,

    // --- Não encontrado ---
    #[error("Item não encontrado.")]
    ItemNotFound,

    #[error("Local de estoque não encontrado.")]
    WarehouseNotFound,

    #[error("Movimentação não encontrada.")]
    MovementNotFound,

    #[error("Transferência não encontrada.")]
    TransferNotFound,

    // --- Saldo / Conflito ---
    #[error("Estoque disponível insuficiente.")]
    InsufficientStock,

    #[error("Saldo disponível insuficiente para reservar.")]
    ReserveInsufficient,

    #[error("A quantidade liberada excede a quantidade reservada.")]
    ReserveExceeds,

    // --- Em uso ---
    #[error("O item possui saldo ou movimentações e não pode ser removido.")]
    ItemInUse,

    #[error("O local possui saldo ou movimentações e não pode ser removido.")]
    WarehouseInUse,

    // --- Transferência ---
    #[error("Transferências exigem um local de destino.")]
    TransferTargetRequired,

    #[error("Local de destino da transferência não encontrado.")]
    TransferTargetNotFound,

    #[error("O local de destino deve ser diferente do local de origem.")]
    TransferSameWarehouse,

    #[error("A referência de transferência '{0}' já está em uso.")]
    TransferReferenceExists(String),

    // --- Catálogo ---
    #[error("O SKU '{0}' já existe.")]
    SkuAlreadyExists(String),

    #[error("O código de local '{0}' já existe.")]
    WarehouseCodeAlreadyExists(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Código simbólico estável do erro.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InvalidQuantity => "INVALID_QUANTITY",
            AppError::InvalidMovementType { .. } => "INVALID_MOVEMENT_TYPE",
            AppError::OperatorRequired => "OPERATOR_REQUIRED",
            AppError::ItemNotFound => "ITEM_NOT_FOUND",
            AppError::WarehouseNotFound => "WAREHOUSE_NOT_FOUND",
            AppError::MovementNotFound => "MOVEMENT_NOT_FOUND",
            AppError::TransferNotFound => "TRANSFER_NOT_FOUND",
            AppError::InsufficientStock => "INSUFFICIENT_STOCK",
            AppError::ReserveInsufficient => "RESERVE_INSUFFICIENT",
            AppError::ReserveExceeds => "RESERVE_EXCEEDS",
            AppError::ItemInUse => "ITEM_IN_USE",
            AppError::WarehouseInUse => "WAREHOUSE_IN_USE",
            AppError::TransferTargetRequired => "TRANSFER_TARGET_REQUIRED",
            AppError::TransferTargetNotFound => "TRANSFER_TARGET_NOT_FOUND",
            AppError::TransferSameWarehouse => "TRANSFER_SAME_WAREHOUSE",
            AppError::TransferReferenceExists(_) => "TRANSFER_REFERENCE_EXISTS",
            AppError::SkuAlreadyExists(_) => "SKU_ALREADY_EXISTS",
            AppError::WarehouseCodeAlreadyExists(_) => "WAREHOUSE_CODE_EXISTS",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ItemNotFound
            | AppError::WarehouseNotFound
            | AppError::MovementNotFound
            | AppError::TransferNotFound
            | AppError::TransferTargetNotFound => StatusCode::NOT_FOUND,

            AppError::InsufficientStock
            | AppError::ReserveInsufficient
            | AppError::ReserveExceeds => StatusCode::UNPROCESSABLE_ENTITY,

            AppError::ItemInUse
            | AppError::WarehouseInUse
            | AppError::TransferReferenceExists(_)
            | AppError::SkuAlreadyExists(_)
            | AppError::WarehouseCodeAlreadyExists(_) => StatusCode::CONFLICT,

            AppError::ValidationError(_)
            | AppError::InvalidQuantity
            | AppError::InvalidMovementType { .. }
            | AppError::OperatorRequired
            | AppError::TransferTargetRequired
            | AppError::TransferSameWarehouse => StatusCode::BAD_REQUEST,

            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Erros de infraestrutura (banco, inesperados), por oposição às regras de negócio.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, AppError::DatabaseError(_) | AppError::InternalServerError(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": code,
                    "message": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            e if e.is_infrastructure() => {
                // O detalhe fica no log, nunca na resposta.
                tracing::error!(code, "Erro Interno do Servidor: {:?}", e);
                json!({ "error": code, "message": "Ocorreu um erro inesperado." })
            }
            e => json!({ "error": code, "message": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_keep_stable_codes() {
        assert_eq!(AppError::InsufficientStock.code(), "INSUFFICIENT_STOCK");
        assert_eq!(AppError::ReserveExceeds.code(), "RESERVE_EXCEEDS");
        assert_eq!(AppError::TransferSameWarehouse.code(), "TRANSFER_SAME_WAREHOUSE");
        assert_eq!(AppError::WarehouseInUse.code(), "WAREHOUSE_IN_USE");
    }

    #[test]
    fn status_follows_error_family() {
        assert_eq!(AppError::ItemNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::TransferTargetNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::ReserveInsufficient.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::ItemInUse.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::TransferTargetRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn only_database_and_internal_errors_are_infrastructure() {
        assert!(AppError::DatabaseError(sqlx::Error::PoolTimedOut).is_infrastructure());
        assert!(!AppError::InsufficientStock.is_infrastructure());
    }
}
