// src/handlers/notifications.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::notifications::Notification,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListNotificationsQuery {
    /// Quando true, retorna apenas as não lidas
    #[serde(default)]
    pub unread: bool,
}

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    params(
        ListNotificationsQuery,
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 200, description = "Notificações mais recentes", body = Vec<Notification>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    user.0.require_company_access(tenant.0)?;

    let notifications = app_state
        .notification_repo
        .list(tenant.0, query.unread)
        .await?;

    Ok(Json(notifications))
}

// PUT /api/notifications/{id}/read
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    params(
        ("id" = Uuid, Path, description = "ID da notificação"),
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 200, description = "Notificação marcada como lida", body = Notification),
        (status = 404, description = "Notificação não encontrada ou já lida")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    user.0.require_company_access(tenant.0)?;

    let notification = app_state
        .notification_repo
        .mark_read(tenant.0, id)
        .await?
        .ok_or(AppError::NotFound("Notificação"))?;

    Ok(Json(notification))
}

// PUT /api/notifications/read-all
#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    tag = "Notifications",
    params(
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 200, description = "Quantidade de notificações marcadas")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_all_notifications_read(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    user.0.require_company_access(tenant.0)?;

    let updated = app_state.notification_repo.mark_all_read(tenant.0).await?;

    Ok(Json(json!({ "updated": updated })))
}
