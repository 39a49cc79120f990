// src/handlers/transactions.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::finance::{Transaction, TransactionCreate, TransactionStatus},
};

// GET /api/transactions
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    params(
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 200, description = "Lançamentos da empresa", body = Vec<Transaction>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    user.0.require_company_access(tenant.0)?;

    let transactions = app_state.finance_repo.list(tenant.0).await?;

    Ok(Json(transactions))
}

// POST /api/transactions
#[utoipa::path(
    post,
    path = "/api/transactions",
    tag = "Transactions",
    request_body = TransactionCreate,
    params(
        ("x-company-id" = Uuid, Header, description = "ID da Empresa")
    ),
    responses(
        (status = 201, description = "Lançamento manual criado", body = Transaction)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transaction(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<TransactionCreate>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    user.0.require_company_access(tenant.0)?;

    // Lançamento manual: nunca vinculado a venda (sale_id fica nulo), logo
    // não disputa o índice único do faturamento.
    let transaction = app_state
        .finance_repo
        .create(
            &app_state.db_pool,
            tenant.0,
            Some(user.0.user_id),
            None,
            &payload.description,
            payload.amount,
            payload.r#type,
            payload.category.as_deref(),
            payload.status.unwrap_or(TransactionStatus::Pending),
            payload.date,
            payload.due_date,
            payload.payment_method.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

// DELETE /api/transactions/{id}
#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    tag = "Transactions",
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 204, description = "Lançamento excluído"),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_transaction(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state
        .finance_repo
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Lançamento"))?;
    user.0.require_company_access(existing.company_id)?;

    app_state.finance_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
