// src/handlers/settings.rs

use axum::{extract::State, response::IntoResponse, Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::settings::{WhatsappSettings, WhatsappSettingsUpdate},
};

// GET /api/settings/whatsapp
#[utoipa::path(
    get,
    path = "/api/settings/whatsapp",
    tag = "Settings",
    params(
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 200, description = "Configuração de WhatsApp da empresa", body = WhatsappSettings),
        (status = 404, description = "Empresa ainda sem configuração")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_whatsapp_settings(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    user.0.require_company_access(tenant.0)?;

    let settings = app_state
        .settings_repo
        .get_whatsapp(tenant.0)
        .await?
        .ok_or(AppError::NotFound("Configuração"))?;

    Ok(Json(settings))
}

// PUT /api/settings/whatsapp
#[utoipa::path(
    put,
    path = "/api/settings/whatsapp",
    tag = "Settings",
    request_body = WhatsappSettingsUpdate,
    params(
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 200, description = "Configuração criada/atualizada", body = WhatsappSettings)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_whatsapp_settings(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<WhatsappSettingsUpdate>,
) -> Result<impl IntoResponse, AppError> {
    user.0.require_company_access(tenant.0)?;

    // Upsert parcial: campos ausentes preservam o valor atual
    let current = app_state.settings_repo.get_whatsapp(tenant.0).await?;
    let settings = app_state
        .settings_repo
        .upsert_whatsapp(tenant.0, current.as_ref(), &payload)
        .await?;

    Ok(Json(settings))
}
