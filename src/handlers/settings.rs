// src/handlers/settings.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono_tz::Tz;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::CompanyContext,
    models::settings::{CompanySettings, UpdateSettingsRequest},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Configurações",
    responses(
        (status = 200, description = "Configuração da empresa", body = CompanySettings),
        (status = 404, description = "Empresa ainda sem configuração")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state
        .settings_repo
        .get(ctx.company_id)
        .await?
        .ok_or(AppError::ResourceNotFound("Configuração"))?;

    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Configurações",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Configuração gravada", body = CompanySettings),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if let Some(name) = &payload.timezone {
        name.parse::<Tz>()
            .map_err(|_| AppError::BadRequest(format!("Fuso horário desconhecido: '{}'", name)))?;
    }

    let updated = app_state
        .settings_repo
        .upsert(&app_state.db_pool, ctx.company_id, &payload)
        .await?;

    tracing::info!("Configuração da empresa {} atualizada por {}", ctx.company_id, ctx.user_id);
    Ok((StatusCode::OK, Json(updated)))
}
