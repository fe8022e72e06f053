// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

use crate::models::leave::LeaveType;

// Nosso tipo de erro, agora com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Funcionário não encontrado")]
    EmployeeNotFound,

    #[error("{0} não encontrado(a)")]
    ResourceNotFound(&'static str),

    // --- Ponto ---
    #[error("Saída sem entrada registrada em {0}")]
    NoCheckIn(NaiveDate),

    // --- Folgas ---
    #[error("Cota mensal de folga '{leave_type}' esgotada ({limit} por mês) em {year}-{month:02}")]
    QuotaExceeded {
        leave_type: LeaveType,
        limit: i64,
        year: i32,
        month: u32,
    },

    #[error("Já existe registro de ponto em {0}")]
    LeaveConflictsWithAttendance(NaiveDate),

    // --- Folha ---
    #[error("Período inválido: {start} > {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    // --- Multas ---
    #[error("Multa já foi perdoada")]
    PenaltyAlreadyWaived,

    #[error("Multa não está perdoada")]
    PenaltyNotWaived,

    #[error("Multa já foi justificada")]
    PenaltyAlreadyExcused,

    #[error("Multa não está justificada")]
    PenaltyNotExcused,

    #[error("Apenas lançamentos manuais podem ser removidos")]
    OnlyManualDeletable,

    // Conflito de escrita concorrente no mesmo registro (já tentamos de novo)
    #[error("Conflito de escrita concorrente")]
    ConcurrentModification,

    // Variante para erros de banco de dados (exemplo com sqlx)
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Mapeia violações de unicidade, falhas de serialização e deadlocks
    /// para `ConcurrentModification`. Outros erros passam intactos.
    pub fn from_write_conflict(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if matches!(db_err.code().as_deref(), Some("23505" | "40001" | "40P01")) {
                return AppError::ConcurrentModification;
            }
        }
        AppError::DatabaseError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidToken | AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::EmployeeNotFound => (StatusCode::NOT_FOUND, "Funcionário não encontrado.".to_string()),
            AppError::ResourceNotFound(what) => (StatusCode::NOT_FOUND, format!("{} não encontrado(a).", what)),

            e @ AppError::NoCheckIn(_) => (StatusCode::CONFLICT, e.to_string()),
            e @ AppError::QuotaExceeded { .. } => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            e @ AppError::LeaveConflictsWithAttendance(_) => (StatusCode::CONFLICT, e.to_string()),
            e @ AppError::InvalidRange { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
            e @ (AppError::PenaltyAlreadyWaived
            | AppError::PenaltyNotWaived
            | AppError::PenaltyAlreadyExcused
            | AppError::PenaltyNotExcused) => (StatusCode::CONFLICT, e.to_string()),
            e @ AppError::OnlyManualDeletable => (StatusCode::FORBIDDEN, e.to_string()),
            e @ AppError::ConcurrentModification => (StatusCode::CONFLICT, e.to_string()),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
