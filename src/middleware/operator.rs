// src/middleware/operator.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::AppError;

// O nome do nosso cabeçalho HTTP customizado
pub const OPERATOR_ID_HEADER: &str = "x-operator-id";

// Quem está lançando a movimentação. A autenticação fica fora deste serviço:
// o gateway na frente dele é quem preenche o cabeçalho.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator(pub Uuid);

impl<S> FromRequestParts<S> for Operator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OPERATOR_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(Operator)
            .ok_or(AppError::OperatorRequired)
    }
}
