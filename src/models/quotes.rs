// src/models/quotes.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quote_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,    // Rascunho
    Sent,     // Enviado ao cliente
    Approved, // Aprovado
    Rejected, // Rejeitado
    Expired,  // Expirado
}

impl QuoteStatus {
    /// Rótulo em pt-BR usado nas notificações de aprovação/rejeição.
    pub fn label(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "rascunho",
            QuoteStatus::Sent => "enviado",
            QuoteStatus::Approved => "aprovado",
            QuoteStatus::Rejected => "rejeitado",
            QuoteStatus::Expired => "expirado",
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    pub user_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,

    #[schema(example = 42)]
    pub display_id: i32,

    // Snapshot do cliente, capturado na criação
    #[schema(example = "Construtora Horizonte LTDA")]
    pub customer_name: String,
    pub customer_document: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,

    pub status: QuoteStatus,
    pub date: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,

    // Valores em centavos
    #[schema(example = 130000)]
    pub subtotal: i64,
    #[schema(example = 0)]
    pub discount: i64,
    #[schema(example = 130000)]
    pub total: i64,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub id: Uuid,
    pub quote_id: Uuid,
    // Ordem de inserção dentro do orçamento
    pub position: i32,
    pub product_id: Option<Uuid>,

    // Snapshot do produto no momento do orçamento
    #[schema(example = "Concreto Usinado FCK 30")]
    pub product_name: String,
    pub description: Option<String>,
    #[schema(example = "m3")]
    pub unit: Option<String>,

    #[schema(example = "2.0")]
    pub quantity: Decimal,
    #[schema(example = 35000)]
    pub unit_price: i64,
    #[schema(example = 70000)]
    pub total_price: i64,

    // Campos específicos de concreto
    pub fck: Option<i32>,
    pub slump: Option<i32>,
    pub stone_size: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteWithItems {
    #[serde(flatten)]
    pub quote: Quote,
    pub items: Vec<QuoteItem>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItemInput {
    pub product_id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Concreto Usinado FCK 30")]
    pub product_name: String,
    pub description: Option<String>,
    pub unit: Option<String>,

    #[validate(custom(function = "crate::models::validate_positive_quantity"))]
    #[schema(example = "2.0")]
    pub quantity: Decimal,

    #[validate(range(min = 0, message = "Price must be non-negative"))]
    #[schema(example = 35000)]
    pub unit_price: i64, // Centavos

    pub fck: Option<i32>,
    pub slump: Option<i32>,
    pub stone_size: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCreate {
    pub seller_id: Option<Uuid>,

    #[validate(length(min = 3, message = "Customer Name is required"))]
    #[schema(example = "Construtora Horizonte LTDA")]
    pub customer_name: String,
    pub customer_document: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,

    pub status: Option<QuoteStatus>,
    pub valid_until: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Discount must be non-negative"))]
    pub discount: i64,

    pub notes: Option<String>,

    #[validate(nested)]
    pub items: Vec<QuoteItemInput>,
}

/// Atualização parcial. `None` = campo não enviado; `Some(None)` = campo
/// explicitamente limpo (null no JSON).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteUpdate {
    #[serde(default)]
    pub seller_id: Option<Option<Uuid>>,

    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_document: Option<Option<String>>,
    #[serde(default)]
    pub customer_phone: Option<Option<String>>,
    #[serde(default)]
    pub customer_address: Option<Option<String>>,

    pub status: Option<QuoteStatus>,
    #[serde(default)]
    pub valid_until: Option<Option<DateTime<Utc>>>,

    #[validate(range(min = 0, message = "Discount must be non-negative"))]
    pub discount: Option<i64>,

    #[serde(default)]
    pub notes: Option<Option<String>>,

    #[validate(nested)]
    pub items: Option<Vec<QuoteItemInput>>,
}
