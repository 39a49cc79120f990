// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// A taxonomia: validação (400), não encontrado (404), acesso negado (401/403),
// conflito de regra de negócio (409) e erro interno (500).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado a esta empresa")]
    CompanyAccessDenied,

    #[error("O cabeçalho X-Company-Id é obrigatório e deve ser um UUID.")]
    MissingCompanyHeader,

    // O `&'static str` é o nome da entidade: "Orçamento", "Venda", etc.
    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    // --- Guardas do ciclo de vida de Vendas / Faturamento ---
    #[error("Não é possível faturar uma venda cancelada.")]
    CannotBillCancelledSale,

    #[error("Esta venda já foi faturada. Não é possível faturar novamente.")]
    SaleAlreadyBilled,

    #[error("Vendas concluídas não podem ser editadas. Apenas a alteração de status é permitida.")]
    CompletedSaleLocked,

    #[error("Vendas concluídas não podem ser excluídas.")]
    CannotDeleteCompletedSale,

    #[error("Esta venda já possui transações financeiras e não pode ser excluída.")]
    SaleHasBilling,

    // --- Envio explícito de PDF por WhatsApp ---
    #[error("Automação de WhatsApp não configurada (nenhuma instância ativa encontrada).")]
    WhatsappNotConfigured,

    #[error("Envio de PDF desativado nas configurações de integração (Vendedor/Cliente).")]
    PdfPushDisabled,

    // Fontes do PDF ausentes no diretório ./fonts
    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Verdadeiro para os erros que são resultado esperado de uma regra de
    /// negócio (o cliente consegue agir sobre eles).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AppError::CannotBillCancelledSale
                | AppError::SaleAlreadyBilled
                | AppError::CompletedSaleLocked
                | AppError::CannotDeleteCompletedSale
                | AppError::SaleHasBilling
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::CompanyAccessDenied => (
                StatusCode::FORBIDDEN,
                "Você não tem acesso a esta empresa.".to_string(),
            ),
            AppError::NotFound(entity) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado(a).", entity))
            }

            // Pré-condições de requisição malformada ou integração ausente
            e @ (AppError::MissingCompanyHeader
            | AppError::WhatsappNotConfigured
            | AppError::PdfPushDisabled) => (StatusCode::BAD_REQUEST, e.to_string()),

            // Guardas de negócio: a mensagem diz exatamente qual regra barrou.
            e if e.is_conflict() => (StatusCode::CONFLICT, e.to_string()),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe algo genérico.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
