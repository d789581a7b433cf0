// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("{0}")]
    UniqueConstraintViolation(String),

    // Permissão pai inexistente ou que criaria um ciclo na árvore
    #[error("{0}")]
    InvalidParentPermission(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Converte violação de unicidade do sqlx em um erro amigável,
    /// mantendo os demais erros como `DatabaseError`.
    pub fn from_unique_violation(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::UniqueConstraintViolation(message.into());
            }
        }
        e.into()
    }
}

// Todas as respostas de erro saem como `{"detail": ...}`. O middleware de
// envelope depois transforma isso em `{code, msg, data}`, copiando o status
// HTTP para `code` e o `detail` para `msg`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
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
                    "detail": "Um ou mais campos são inválidos.",
                    "errors": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(entity) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado.", entity))
            }
            AppError::UniqueConstraintViolation(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidParentPermission(msg) => (StatusCode::BAD_REQUEST, msg),

            // Todos os outros erros (DatabaseError, BcryptError, etc.) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "detail": detail }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_vira_404() {
        let resp = AppError::NotFound("Usuário").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn violacao_de_unicidade_vira_409() {
        let resp =
            AppError::UniqueConstraintViolation("Já existe um cargo com esse nome.".into())
                .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn pai_invalido_vira_400() {
        let resp = AppError::InvalidParentPermission(
            "A permissão pai criaria um ciclo na árvore.".into(),
        )
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
