// src/middleware/auth.rs

// Autenticação por JWT (Bearer). A emissão do token é responsabilidade do
// serviço de identidade; aqui apenas validamos a assinatura e extraímos as
// claims de usuário e empresas.

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Id do usuário autenticado
    pub sub: Uuid,
    /// Empresas às quais o usuário tem acesso
    #[serde(default)]
    pub companies: Vec<Uuid>,
    pub exp: usize,
}

/// Usuário autenticado, inserido nas extensions pelo middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub companies: Vec<Uuid>,
}

impl CurrentUser {
    /// Guarda de tenant: toda operação compara a empresa do recurso com as
    /// empresas do token.
    pub fn require_company_access(&self, company_id: Uuid) -> Result<(), AppError> {
        if self.companies.contains(&company_id) {
            Ok(())
        } else {
            Err(AppError::CompanyAccessDenied)
        }
    }
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

// O middleware em si
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let claims = decode_claims(token, &app_state.jwt_secret)?;

            // Insere o usuário nos "extensions" da requisição
            request.extensions_mut().insert(CurrentUser {
                user_id: claims.sub,
                companies: claims.companies,
            });
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::InvalidToken)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(companies: Vec<Uuid>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            companies,
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        }
    }

    #[test]
    fn round_trips_valid_token() {
        let company = Uuid::new_v4();
        let original = claims(vec![company]);
        let decoded = decode_claims(&token(&original, "segredo"), "segredo").unwrap();

        assert_eq!(decoded.sub, original.sub);
        assert_eq!(decoded.companies, vec![company]);
    }

    #[test]
    fn rejects_wrong_secret() {
        let err = decode_claims(&token(&claims(vec![]), "segredo"), "outro").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn rejects_expired_token() {
        let mut expired = claims(vec![]);
        expired.exp = 1_000; // 1970
        let err = decode_claims(&token(&expired, "segredo"), "segredo").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn company_access_guard() {
        let company = Uuid::new_v4();
        let user = CurrentUser {
            user_id: Uuid::new_v4(),
            companies: vec![company],
        };

        assert!(user.require_company_access(company).is_ok());
        assert!(matches!(
            user.require_company_access(Uuid::new_v4()),
            Err(AppError::CompanyAccessDenied)
        ));
    }
}
