// src/models/inventory.rs

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{validate_not_negative, validate_positive};

// --- 1. Direção e Tipo da movimentação ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_direction", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    Inbound,
    Outbound,
}

impl fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementDirection::Inbound => f.write_str("inbound"),
            MovementDirection::Outbound => f.write_str("outbound"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Purchase,
    Sale,
    Transfer,
    Return,
    Adjustment,
    Spoilage,
    InitialStock,
}

impl MovementType {
    /// Quais tipos podem ser lançados diretamente em cada direção.
    /// A perna de entrada de uma transferência é criada pela saída, nunca pelo chamador.
    pub fn allowed_for(self, direction: MovementDirection) -> bool {
        match direction {
            MovementDirection::Inbound => matches!(
                self,
                MovementType::Purchase
                    | MovementType::Return
                    | MovementType::Adjustment
                    | MovementType::InitialStock
            ),
            MovementDirection::Outbound => matches!(
                self,
                MovementType::Sale
                    | MovementType::Transfer
                    | MovementType::Return
                    | MovementType::Adjustment
                    | MovementType::Spoilage
            ),
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MovementType::Purchase => "purchase",
            MovementType::Sale => "sale",
            MovementType::Transfer => "transfer",
            MovementType::Return => "return",
            MovementType::Adjustment => "adjustment",
            MovementType::Spoilage => "spoilage",
            MovementType::InitialStock => "initial_stock",
        };
        f.write_str(s)
    }
}

// --- 2. Saldo (Snapshot) por item/local ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub item_id: Uuid,
    pub location_id: Uuid,
    /// Quantidade FÍSICA total
    pub quantity: Decimal,
    pub reserved: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl StockLevel {
    pub fn available(&self) -> Decimal {
        self.quantity - self.reserved
    }
}

/// Saldo com o disponível já calculado, para leitura.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelView {
    #[serde(flatten)]
    pub level: StockLevel,
    pub available: Decimal,
}

impl From<StockLevel> for StockLevelView {
    fn from(level: StockLevel) -> Self {
        let available = level.available();
        Self { level, available }
    }
}

// --- 3. Blobs estruturados ---
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Cliente / contraparte de uma venda.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counterpart {
    pub name: Option<String>,
    pub document: Option<String>,
    pub contact: Option<String>,
}

// --- 4. Movimentação (livro-razão, imutável) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: Uuid,
    pub direction: MovementDirection,
    pub movement_type: MovementType,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub correlation_id: Option<String>,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub operator_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    #[schema(value_type = Option<Object>)]
    pub counterpart: Option<Json<Counterpart>>,
    pub notes: Option<String>,
    #[schema(value_type = Object)]
    pub attributes: Json<MovementAttributes>,
    pub created_at: DateTime<Utc>,
}

/// Linha nova a ser gravada no livro-razão.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub direction: MovementDirection,
    pub movement_type: MovementType,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub correlation_id: Option<String>,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub operator_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub counterpart: Option<Counterpart>,
    pub notes: Option<String>,
    pub attributes: MovementAttributes,
}

/// `unit_cost × quantity` arredondado em 2 casas (meio para longe do zero).
pub fn compute_amount(unit_cost: Option<Decimal>, quantity: Decimal) -> Option<Decimal> {
    unit_cost.map(|cost| {
        (cost * quantity).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    })
}

// ---
// Payloads
// ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InboundPayload {
    pub item_id: Uuid,
    pub location_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    pub movement_type: MovementType,

    /// Se omitido, usa o custo registrado no item.
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Option<Decimal>,

    pub occurred_at: Option<DateTime<Utc>>,
    pub correlation_id: Option<String>,
    pub notes: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub attributes: Option<MovementAttributes>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutboundPayload {
    pub item_id: Uuid,
    pub location_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    pub movement_type: MovementType,

    /// Obrigatório quando `movementType = transfer`.
    pub target_location_id: Option<Uuid>,

    /// Referência do pedido / transferência. Gerada automaticamente em transferências.
    pub correlation_id: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub counterpart: Option<Counterpart>,

    pub occurred_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub attributes: Option<MovementAttributes>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPayload {
    pub item_id: Uuid,
    pub location_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,
}

// ---
// Consultas
// ---
pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 500;

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MovementFilter {
    pub limit: Option<i64>,
    pub item_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StockLevelFilter {
    pub item_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

// --- 5. Ordem de Transferência (derivada, não armazenada) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferOrder {
    pub correlation_id: String,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub source_location_id: Uuid,
    pub source_location_name: String,
    pub target_location_id: Uuid,
    pub target_location_name: String,
    pub operator_id: Uuid,
    /// O mais antigo entre as duas pernas.
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferOrderDetail {
    #[serde(flatten)]
    pub header: TransferOrder,
    /// Saída e entrada, da mais antiga para a mais nova.
    pub legs: Vec<Movement>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn available_discounts_reserved() {
        let level = StockLevel {
            item_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            quantity: dec!(6),
            reserved: dec!(5),
            updated_at: Utc::now(),
        };
        assert_eq!(level.available(), dec!(1));
        assert_eq!(StockLevelView::from(level).available, dec!(1));
    }

    #[test]
    fn amount_rounds_half_away_from_zero() {
        assert_eq!(compute_amount(Some(dec!(0.125)), dec!(1)), Some(dec!(0.13)));
        assert_eq!(compute_amount(Some(dec!(3.333)), dec!(3)), Some(dec!(10.00)));
        assert_eq!(compute_amount(None, dec!(3)), None);
    }

    #[test]
    fn transfer_is_outbound_only() {
        assert!(MovementType::Transfer.allowed_for(MovementDirection::Outbound));
        assert!(!MovementType::Transfer.allowed_for(MovementDirection::Inbound));
        assert!(MovementType::Purchase.allowed_for(MovementDirection::Inbound));
        assert!(!MovementType::Purchase.allowed_for(MovementDirection::Outbound));
        assert!(!MovementType::Sale.allowed_for(MovementDirection::Inbound));
        assert!(MovementType::Return.allowed_for(MovementDirection::Inbound));
        assert!(MovementType::Return.allowed_for(MovementDirection::Outbound));
    }

    #[test]
    fn payloads_reject_more_than_four_decimal_places() {
        let outbound = OutboundPayload {
            item_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            quantity: dec!(0.00005),
            movement_type: MovementType::Sale,
            target_location_id: None,
            correlation_id: None,
            counterpart: None,
            occurred_at: None,
            notes: None,
            attributes: None,
        };
        assert!(outbound.validate().unwrap_err().field_errors().contains_key("quantity"));

        let inbound = InboundPayload {
            item_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            quantity: dec!(1),
            movement_type: MovementType::Purchase,
            unit_cost: Some(dec!(0.12345)),
            occurred_at: None,
            correlation_id: None,
            notes: None,
            attributes: None,
        };
        assert!(inbound.validate().unwrap_err().field_errors().contains_key("unit_cost"));
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_LIST_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIST_LIMIT);
        assert_eq!(clamp_limit(Some(20)), 20);
    }

    #[test]
    fn movement_type_uses_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_value(MovementType::InitialStock).unwrap(),
            serde_json::json!("initial_stock")
        );
        assert_eq!(MovementType::InitialStock.to_string(), "initial_stock");
        let parsed: MovementType = serde_json::from_str("\"transfer\"").unwrap();
        assert_eq!(parsed, MovementType::Transfer);
    }
}
