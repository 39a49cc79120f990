// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Configuração de WhatsApp de uma empresa, como está gravada no banco.
/// O registro marcado como `is_global` serve de fallback de conexão para as
/// empresas que não têm conexão própria (ver `services::whatsapp::resolve_config`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhatsappSettings {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    #[schema(example = "http://localhost:3025")]
    pub api_url: String,
    pub api_key: Option<String>,
    // "+5511999999999" — número remetente (nome da instância na API)
    pub phone_number: Option<String>,
    pub is_connected: bool,

    pub alerts_enabled: bool,
    #[schema(value_type = Vec<String>)]
    pub alert_recipients: Json<Vec<String>>,

    pub schedules_reminder_enabled: bool,
    #[schema(value_type = Vec<String>)]
    pub schedules_reminder_recipients: Json<Vec<String>>,

    pub quote_pdf_to_seller: bool,
    pub quote_pdf_to_customer: bool,

    pub is_global: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload de upsert das configurações da empresa.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhatsappSettingsUpdate {
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<Option<String>>,
    #[serde(default)]
    pub phone_number: Option<Option<String>>,
    pub is_connected: Option<bool>,

    pub alerts_enabled: Option<bool>,
    pub alert_recipients: Option<Vec<String>>,

    pub schedules_reminder_enabled: Option<bool>,
    pub schedules_reminder_recipients: Option<Vec<String>>,

    pub quote_pdf_to_seller: Option<bool>,
    pub quote_pdf_to_customer: Option<bool>,
}

/// Dados da empresa usados no cabeçalho do PDF.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub document: String, // CNPJ
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Vendedor vinculado a orçamentos/vendas; o telefone é usado no envio de PDF.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    pub name: String,
    pub phone: Option<String>,
}
