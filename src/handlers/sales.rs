// src/handlers/sales.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::{
        finance::TransactionStatus,
        sales::{Sale, SaleCreate, SaleStatus, SaleUpdate, SaleWithItems},
    },
    services::dispatcher::{DocumentSource, NotificationEvent},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListSalesQuery {
    pub status: Option<SaleStatus>,
}

// GET /api/sales
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    params(
        ListSalesQuery,
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 200, description = "Vendas da empresa", body = Vec<Sale>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<ListSalesQuery>,
) -> Result<impl IntoResponse, AppError> {
    user.0.require_company_access(tenant.0)?;

    let sales = app_state.sale_service.list(tenant.0, query.status).await?;

    Ok(Json(sales))
}

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = SaleCreate,
    params(
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 201, description = "Venda criada", body = SaleWithItems),
        (status = 404, description = "Orçamento vinculado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<SaleCreate>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    user.0.require_company_access(tenant.0)?;

    let created = app_state
        .sale_service
        .create(&app_state.db_pool, tenant.0, Some(user.0.user_id), &payload)
        .await?;

    let dispatcher = app_state.dispatcher.clone();
    let event = NotificationEvent::sale_created(&created);
    let source = DocumentSource::Sale(created.clone());
    tokio::spawn(async move {
        dispatcher.push_pdf(source).await;
        dispatcher.dispatch(event).await;
    });

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/sales/{id}
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda com itens", body = SaleWithItems),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state
        .sale_service
        .get(&app_state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound("Venda"))?;
    user.0.require_company_access(sale.sale.company_id)?;

    Ok(Json(sale))
}

// PUT /api/sales/{id}
#[utoipa::path(
    put,
    path = "/api/sales/{id}",
    tag = "Sales",
    request_body = SaleUpdate,
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda atualizada", body = SaleWithItems),
        (status = 404, description = "Venda não encontrada"),
        (status = 409, description = "Venda concluída só aceita alteração de status")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sale(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaleUpdate>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let existing = app_state
        .sale_service
        .get(&app_state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound("Venda"))?;
    user.0.require_company_access(existing.sale.company_id)?;

    let updated = app_state
        .sale_service
        .update(&app_state.db_pool, existing.sale, &payload)
        .await?;

    Ok(Json(updated))
}

// DELETE /api/sales/{id}
#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 204, description = "Venda excluída"),
        (status = 404, description = "Venda não encontrada"),
        (status = 409, description = "Venda concluída ou faturada não pode ser excluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state
        .sale_service
        .get(&app_state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound("Venda"))?;
    user.0.require_company_access(existing.sale.company_id)?;

    app_state
        .sale_service
        .delete(&app_state.db_pool, &existing.sale)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillSalePayload {
    /// Sobrescreve o meio de pagamento gravado na venda
    #[schema(example = "Pix")]
    pub payment_method: Option<String>,
    /// Status do lançamento gerado (padrão: paid)
    pub status: Option<TransactionStatus>,
}

// POST /api/sales/{id}/bill
#[utoipa::path(
    post,
    path = "/api/sales/{id}/bill",
    tag = "Sales",
    request_body = BillSalePayload,
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda faturada: lançamento criado e status escalado"),
        (status = 404, description = "Venda não encontrada"),
        (status = 409, description = "Venda cancelada ou já faturada")
    ),
    security(("api_jwt" = []))
)]
pub async fn bill_sale(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BillSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state
        .sale_service
        .get(&app_state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound("Venda"))?;
    user.0.require_company_access(existing.sale.company_id)?;

    let (transaction, next_status) = app_state
        .billing_service
        .bill_sale(
            &app_state.db_pool,
            &existing.sale,
            Some(user.0.user_id),
            payload.payment_method.as_deref(),
            payload.status,
        )
        .await?;

    let dispatcher = app_state.dispatcher.clone();
    let event = NotificationEvent::sale_billed(&existing.sale);
    tokio::spawn(async move { dispatcher.dispatch(event).await });

    Ok(Json(json!({
        "transaction": transaction,
        "nextStatus": next_status,
    })))
}

// POST /api/sales/{id}/send-pdf
#[utoipa::path(
    post,
    path = "/api/sales/{id}/send-pdf",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Relatório do envio por destinatário"),
        (status = 400, description = "Integração não configurada ou envio desativado"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_sale_pdf(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state
        .sale_service
        .get(&app_state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound("Venda"))?;
    user.0.require_company_access(existing.sale.company_id)?;

    let report = app_state
        .dispatcher
        .send_pdf_now(&DocumentSource::Sale(existing))
        .await?;

    Ok(Json(json!({
        "success": !report.sent.is_empty(),
        "sent": report.sent,
        "failed": report.failed,
    })))
}
