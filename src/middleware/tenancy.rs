// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::AppError;

// O nome do nosso cabeçalho HTTP customizado
const COMPANY_ID_HEADER: &str = "x-company-id";

// Extrator da empresa alvo da requisição. Usado nas rotas de listagem e
// criação, onde não há um recurso existente de onde tirar o company_id.
// A autorização (o usuário pode acessar ESTA empresa?) fica a cargo do
// handler, via CurrentUser::require_company_access.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(COMPANY_ID_HEADER)
            .ok_or(AppError::MissingCompanyHeader)?;

        let value_str = value_to_str(header_value)?;
        let company_id = Uuid::parse_str(value_str).map_err(|_| AppError::MissingCompanyHeader)?;

        Ok(TenantContext(company_id))
    }
}

fn value_to_str(value: &axum::http::HeaderValue) -> Result<&str, AppError> {
    value.to_str().map_err(|_| AppError::MissingCompanyHeader)
}
