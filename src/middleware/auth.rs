// src/middleware/auth.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

/// Claims emitidos pelo serviço de identidade. Aqui só validamos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,        // ID do usuário (admin)
    pub company_id: Uuid, // Empresa em que o usuário está operando
    pub exp: usize,
    pub iat: usize,
}

/// Valida assinatura (HS256) e expiração.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;
    let claims = decode_token(bearer.token(), &app_state.jwt_secret)?;

    // Insere os claims nos "extensions" da requisição
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn make_token(secret: &str, exp_offset: i64) -> (String, Claims) {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            exp: (now + exp_offset) as usize,
            iat: now as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap();
        (token, claims)
    }

    #[test]
    fn valid_token_yields_company_and_user() {
        let (token, claims) = make_token("segredo", 3600);
        let decoded = decode_token(&token, "segredo").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.company_id, claims.company_id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = make_token("segredo", 3600);
        assert!(matches!(decode_token(&token, "outro"), Err(AppError::JwtError(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let (token, _) = make_token("segredo", -3600);
        assert!(decode_token(&token, "segredo").is_err());
    }
}
