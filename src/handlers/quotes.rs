// src/handlers/quotes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::quotes::{Quote, QuoteCreate, QuoteStatus, QuoteUpdate, QuoteWithItems},
    services::dispatcher::{DocumentSource, NotificationEvent},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListQuotesQuery {
    pub status: Option<QuoteStatus>,
}

// GET /api/quotes
#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Quotes",
    params(
        ListQuotesQuery,
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 200, description = "Orçamentos da empresa", body = Vec<Quote>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<ListQuotesQuery>,
) -> Result<impl IntoResponse, AppError> {
    user.0.require_company_access(tenant.0)?;

    let quotes = app_state.quote_service.list(tenant.0, query.status).await?;

    Ok(Json(quotes))
}

// POST /api/quotes
#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Quotes",
    request_body = QuoteCreate,
    params(
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 201, description = "Orçamento criado", body = QuoteWithItems)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<QuoteCreate>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    user.0.require_company_access(tenant.0)?;

    let created = app_state
        .quote_service
        .create(&app_state.db_pool, tenant.0, Some(user.0.user_id), &payload)
        .await?;

    // Efeitos colaterais fora do caminho da resposta: PDF primeiro, alerta
    // depois. Falhas aqui nunca desfazem a criação.
    let dispatcher = app_state.dispatcher.clone();
    let event = NotificationEvent::quote_created(&created);
    let source = DocumentSource::Quote(created.clone());
    tokio::spawn(async move {
        dispatcher.push_pdf(source).await;
        dispatcher.dispatch(event).await;
    });

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/quotes/{id}
#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento com itens", body = QuoteWithItems),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state
        .quote_service
        .get(&app_state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound("Orçamento"))?;

    // 404 para inexistente, 403 para empresa alheia
    user.0.require_company_access(quote.quote.company_id)?;

    Ok(Json(quote))
}

// PUT /api/quotes/{id}
#[utoipa::path(
    put,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    request_body = QuoteUpdate,
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento atualizado", body = QuoteWithItems),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuoteUpdate>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let existing = app_state
        .quote_service
        .get(&app_state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound("Orçamento"))?;
    user.0.require_company_access(existing.quote.company_id)?;

    let (updated, approval) = app_state
        .quote_service
        .update(&app_state.db_pool, existing.quote, &payload)
        .await?;

    // Só transições que ENTRAM em aprovado/rejeitado notificam
    if let Some(status) = approval {
        let dispatcher = app_state.dispatcher.clone();
        let event = NotificationEvent::quote_status_changed(&updated, status);
        tokio::spawn(async move { dispatcher.dispatch(event).await });
    }

    Ok(Json(updated))
}

// DELETE /api/quotes/{id}
#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 204, description = "Orçamento excluído"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state
        .quote_service
        .get(&app_state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound("Orçamento"))?;
    user.0.require_company_access(existing.quote.company_id)?;

    app_state
        .quote_service
        .delete(&app_state.db_pool, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/quotes/{id}/send-pdf
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/send-pdf",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Relatório do envio por destinatário"),
        (status = 400, description = "Integração não configurada ou envio desativado"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_quote_pdf(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state
        .quote_service
        .get(&app_state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound("Orçamento"))?;
    user.0.require_company_access(existing.quote.company_id)?;

    let report = app_state
        .dispatcher
        .send_pdf_now(&DocumentSource::Quote(existing))
        .await?;

    Ok(Json(json!({
        "success": !report.sent.is_empty(),
        "sent": report.sent,
        "failed": report.failed,
    })))
}
