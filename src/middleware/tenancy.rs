// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{common::error::AppError, middleware::auth::Claims};

/// Contexto explícito da requisição: quem está operando e em qual empresa.
/// É passado como parâmetro para os serviços (nada de estado global).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyContext {
    pub company_id: Uuid,
    pub user_id: Uuid,
}

impl From<&Claims> for CompanyContext {
    fn from(claims: &Claims) -> Self {
        Self {
            company_id: claims.company_id,
            user_id: claims.sub,
        }
    }
}

impl<S> FromRequestParts<S> for CompanyContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Os claims foram colocados lá pelo `auth_guard`
        parts
            .extensions
            .get::<Claims>()
            .map(CompanyContext::from)
            .ok_or(AppError::InvalidToken)
    }
}
