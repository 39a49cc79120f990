// src/models/finance.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,  // Receita
    Expense, // Despesa
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Paid,
    Cancelled,
}

// --- Structs ---

/// Lançamento do livro financeiro. Quando `sale_id` está preenchido, é o
/// registro de faturamento da venda — no máximo um por venda.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    pub user_id: Option<Uuid>,
    pub sale_id: Option<Uuid>,

    #[schema(example = "Faturamento Venda #0017 — Construtora Horizonte LTDA")]
    pub description: String,

    // Centavos, sempre positivo; o sinal vem do type
    #[schema(example = 50000)]
    pub amount: i64,
    pub r#type: TransactionType,
    #[schema(example = "Vendas")]
    pub category: Option<String>,

    pub status: TransactionStatus,
    pub date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,

    #[schema(example = "Pix")]
    pub payment_method: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Payloads ---

/// Lançamento manual (não vinculado a venda).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCreate {
    #[validate(length(min = 1, message = "required"))]
    pub description: String,

    #[validate(range(min = 0, message = "Amount must be non-negative"))]
    pub amount: i64, // Centavos

    pub r#type: TransactionType,
    pub category: Option<String>,

    pub status: Option<TransactionStatus>,
    pub date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,

    pub payment_method: Option<String>,
}
