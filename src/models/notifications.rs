// src/models/notifications.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Sale,
    Quote,
    QuoteUpdated,
    Transaction,
    User,
    Product,
    Schedule,
}

/// Evento in-app persistido pelo dispatcher. A leitura/marcação é
/// independente do núcleo de preços e estados.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    pub r#type: NotificationType,

    #[schema(example = "Orçamento aprovado")]
    pub title: String,
    pub body: Option<String>,
    #[schema(example = "/orcamentos")]
    pub link: Option<String>,
    #[schema(example = "i-heroicons-check-circle")]
    pub icon: Option<String>,

    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
