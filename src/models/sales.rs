// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,    // Aguardando confirmação
    Confirmed,  // Confirmada
    InProgress, // Em andamento
    Completed,  // Concluída (travada)
    Cancelled,  // Cancelada
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    pub user_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    // Vínculo opcional com o orçamento de origem (referência "solta")
    pub quote_id: Option<Uuid>,

    #[schema(example = 17)]
    pub display_id: i32,

    #[schema(example = "Construtora Horizonte LTDA")]
    pub customer_name: String,
    pub customer_document: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,

    pub status: SaleStatus,
    pub date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,

    // Valores em centavos; total nunca fica negativo
    #[schema(example = 50000)]
    pub subtotal: i64,
    #[schema(example = 0)]
    pub discount: i64,
    #[schema(example = 50000)]
    pub total: i64,

    #[schema(example = "Pix")]
    pub payment_method: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    // Ordem de inserção dentro da venda
    pub position: i32,
    pub product_id: Option<Uuid>,

    #[schema(example = "Concreto Usinado FCK 30")]
    pub product_name: String,
    pub description: Option<String>,
    pub unit: Option<String>,

    #[schema(example = "2.0")]
    pub quantity: Decimal,
    #[schema(example = 35000)]
    pub unit_price: i64,
    #[schema(example = 70000)]
    pub total_price: i64,

    pub fck: Option<i32>,
    pub slump: Option<i32>,
    pub stone_size: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemInput {
    pub product_id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    pub product_name: String,
    pub description: Option<String>,
    pub unit: Option<String>,

    #[validate(custom(function = "crate::models::validate_positive_quantity"))]
    pub quantity: Decimal,

    #[validate(range(min = 0, message = "Price must be non-negative"))]
    pub unit_price: i64, // Centavos

    pub fck: Option<i32>,
    pub slump: Option<i32>,
    pub stone_size: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreate {
    pub seller_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,

    #[validate(length(min = 3, message = "Customer Name is required"))]
    pub customer_name: String,
    pub customer_document: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,

    pub status: Option<SaleStatus>,
    pub date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Discount must be non-negative"))]
    pub discount: i64,

    pub payment_method: Option<String>,
    pub notes: Option<String>,

    #[validate(nested)]
    pub items: Vec<SaleItemInput>,
}

/// Atualização parcial. `None` = campo não enviado; `Some(None)` = campo
/// explicitamente limpo (null no JSON).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleUpdate {
    #[serde(default)]
    pub seller_id: Option<Option<Uuid>>,

    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_document: Option<Option<String>>,
    #[serde(default)]
    pub customer_phone: Option<Option<String>>,
    #[serde(default)]
    pub customer_address: Option<Option<String>>,

    pub status: Option<SaleStatus>,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivery_date: Option<Option<DateTime<Utc>>>,

    #[validate(range(min = 0, message = "Discount must be non-negative"))]
    pub discount: Option<i64>,

    #[serde(default)]
    pub payment_method: Option<Option<String>>,
    #[serde(default)]
    pub notes: Option<Option<String>>,

    #[validate(nested)]
    pub items: Option<Vec<SaleItemInput>>,
}

impl SaleUpdate {
    /// Verdadeiro quando o payload contém exatamente `{status: ...}` e nada
    /// mais. É o único formato aceito para vendas concluídas: qualquer outro
    /// campo presente é rejeitado, nunca ignorado em silêncio.
    pub fn is_status_only(&self) -> bool {
        self.status.is_some()
            && self.seller_id.is_none()
            && self.customer_name.is_none()
            && self.customer_document.is_none()
            && self.customer_phone.is_none()
            && self.customer_address.is_none()
            && self.date.is_none()
            && self.delivery_date.is_none()
            && self.discount.is_none()
            && self.payment_method.is_none()
            && self.notes.is_none()
            && self.items.is_none()
    }
}
