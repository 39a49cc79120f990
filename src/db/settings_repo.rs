// src/db/settings_repo.rs

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::settings::{Company, Seller, WhatsappSettings, WhatsappSettingsUpdate},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_whatsapp(
        &self,
        company_id: Uuid,
    ) -> Result<Option<WhatsappSettings>, AppError> {
        let settings = sqlx::query_as::<_, WhatsappSettings>(
            "SELECT * FROM whatsapp_settings WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// O registro marcado como global serve de fallback de conexão para as
    /// empresas sem conexão própria.
    pub async fn get_whatsapp_global(&self) -> Result<Option<WhatsappSettings>, AppError> {
        let settings = sqlx::query_as::<_, WhatsappSettings>(
            "SELECT * FROM whatsapp_settings WHERE is_global = TRUE LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    pub async fn upsert_whatsapp(
        &self,
        company_id: Uuid,
        current: Option<&WhatsappSettings>,
        update: &WhatsappSettingsUpdate,
    ) -> Result<WhatsappSettings, AppError> {
        // Mescla o payload com o registro atual (ou com os defaults)
        let api_url = update
            .api_url
            .clone()
            .or_else(|| current.map(|c| c.api_url.clone()))
            .unwrap_or_else(|| "http://localhost:3025".to_string());
        let api_key = match &update.api_key {
            Some(value) => value.clone(),
            None => current.and_then(|c| c.api_key.clone()),
        };
        let phone_number = match &update.phone_number {
            Some(value) => value.clone(),
            None => current.and_then(|c| c.phone_number.clone()),
        };
        let is_connected = update
            .is_connected
            .unwrap_or_else(|| current.is_some_and(|c| c.is_connected));
        let alerts_enabled = update
            .alerts_enabled
            .unwrap_or_else(|| current.is_some_and(|c| c.alerts_enabled));
        let alert_recipients = update
            .alert_recipients
            .clone()
            .or_else(|| current.map(|c| c.alert_recipients.0.clone()))
            .unwrap_or_default();
        let schedules_reminder_enabled = update
            .schedules_reminder_enabled
            .unwrap_or_else(|| current.is_some_and(|c| c.schedules_reminder_enabled));
        let schedules_reminder_recipients = update
            .schedules_reminder_recipients
            .clone()
            .or_else(|| current.map(|c| c.schedules_reminder_recipients.0.clone()))
            .unwrap_or_default();
        let quote_pdf_to_seller = update
            .quote_pdf_to_seller
            .unwrap_or_else(|| current.is_some_and(|c| c.quote_pdf_to_seller));
        let quote_pdf_to_customer = update
            .quote_pdf_to_customer
            .unwrap_or_else(|| current.is_some_and(|c| c.quote_pdf_to_customer));

        let settings = sqlx::query_as::<_, WhatsappSettings>(
            r#"
            INSERT INTO whatsapp_settings (
                company_id, api_url, api_key, phone_number, is_connected,
                alerts_enabled, alert_recipients,
                schedules_reminder_enabled, schedules_reminder_recipients,
                quote_pdf_to_seller, quote_pdf_to_customer
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (company_id) DO UPDATE SET
                api_url = EXCLUDED.api_url,
                api_key = EXCLUDED.api_key,
                phone_number = EXCLUDED.phone_number,
                is_connected = EXCLUDED.is_connected,
                alerts_enabled = EXCLUDED.alerts_enabled,
                alert_recipients = EXCLUDED.alert_recipients,
                schedules_reminder_enabled = EXCLUDED.schedules_reminder_enabled,
                schedules_reminder_recipients = EXCLUDED.schedules_reminder_recipients,
                quote_pdf_to_seller = EXCLUDED.quote_pdf_to_seller,
                quote_pdf_to_customer = EXCLUDED.quote_pdf_to_customer,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(api_url)
        .bind(api_key)
        .bind(phone_number)
        .bind(is_connected)
        .bind(alerts_enabled)
        .bind(Json(alert_recipients))
        .bind(schedules_reminder_enabled)
        .bind(Json(schedules_reminder_recipients))
        .bind(quote_pdf_to_seller)
        .bind(quote_pdf_to_customer)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }

    pub async fn get_company(&self, company_id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, document, email, phone, address, city, state FROM companies WHERE id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    pub async fn get_seller(
        &self,
        company_id: Uuid,
        seller_id: Uuid,
    ) -> Result<Option<Seller>, AppError> {
        let seller = sqlx::query_as::<_, Seller>(
            "SELECT id, company_id, name, phone FROM sellers WHERE id = $1 AND company_id = $2",
        )
        .bind(seller_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(seller)
    }
}
