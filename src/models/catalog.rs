// src/models/catalog.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{validate_not_negative, validate_positive};

// --- 1. Especificação de variante do item ---
// Campos conhecidos tipados + pares chave/valor livres específicos do item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// --- 2. Itens / Produtos ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    #[schema(example = "CAM-AZ-M")]
    pub sku: String,
    pub name: String,
    #[schema(example = "un")]
    pub unit: String,
    /// Custo unitário registrado ("último custo" das compras).
    pub base_cost: Decimal,
    pub sale_price: Decimal,
    pub category: Option<String>,
    /// Estoque de segurança: abaixo disso o item aparece como estoque baixo.
    pub safety_stock: Decimal,
    pub barcode: Option<String>,
    #[schema(value_type = Object)]
    pub spec: Json<ItemSpec>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 3. Locais (Depósitos) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "location_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    #[default]
    Primary,
    Satellite,
    Virtual,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    #[schema(example = "CD-01")]
    pub code: String,
    pub kind: LocationKind,
    pub address: Option<String>,
    pub capacity: Option<Decimal>,
    pub manager: Option<String>,
    #[schema(value_type = Object)]
    pub attributes: Json<BTreeMap<String, Value>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payloads
// ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A unidade de medida é obrigatória."))]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub base_cost: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub sale_price: Decimal,

    pub category: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub safety_stock: Decimal,

    pub barcode: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub spec: Option<ItemSpec>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "A unidade de medida não pode ser vazia."))]
    pub unit: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub base_cost: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub sale_price: Option<Decimal>,
    pub category: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub safety_stock: Option<Decimal>,
    pub barcode: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub spec: Option<ItemSpec>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O código é obrigatório."))]
    pub code: String,

    #[serde(default)]
    pub kind: LocationKind,

    pub address: Option<String>,

    #[validate(custom(function = "validate_positive"))]
    pub capacity: Option<Decimal>,

    pub manager: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub attributes: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub kind: Option<LocationKind>,
    pub address: Option<String>,
    #[validate(custom(function = "validate_positive"))]
    pub capacity: Option<Decimal>,
    pub manager: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub attributes: Option<BTreeMap<String, Value>>,
}
