// src/common/db_utils.rs

use sqlx::{Postgres, Transaction};

use crate::common::error::AppError;

// ---
// Helper de Transação: o "fecho" de toda operação de escrita
// ---
/// Faz commit se o corpo da operação deu certo; caso contrário faz rollback
/// explícito antes de devolver o erro original. Nenhum estado parcial sobrevive.
pub(crate) async fn finish_transaction<T>(
    tx: Transaction<'_, Postgres>,
    operation: &'static str,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(operation, "Falha no rollback: {:?}", rollback_err);
            }
            if err.is_infrastructure() {
                tracing::error!(operation, code = err.code(), "Operação revertida: {}", err);
            } else {
                tracing::warn!(operation, code = err.code(), "Operação recusada: {}", err);
            }
            Err(err)
        }
    }
}

/// `true` se o erro for violação de unicidade no índice/constraint indicado.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
