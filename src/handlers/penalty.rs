// src/handlers/penalty.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    db::penalty_repo::PenaltyFilter,
    handlers::OptionalRangeQuery,
    middleware::tenancy::CompanyContext,
    models::{
        penalty::{BulkItemOutcome, Penalty, PenaltySummary, PenaltyType},
        validate_non_negative,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePenaltyPayload {
    pub employee_id: Uuid,
    #[serde(default = "default_penalty_type")]
    pub penalty_type: PenaltyType,
    #[validate(custom(function = "validate_non_negative"))]
    #[schema(example = 50000.0)]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[validate(length(max = 500, message = "Motivo muito longo."))]
    pub reason: Option<String>,
}

fn default_penalty_type() -> PenaltyType {
    PenaltyType::Manual
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PenaltyListQuery {
    pub employee_id: Option<Uuid>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Só multas que ainda descontam (nem perdoadas nem justificadas)
    #[serde(default)]
    pub only_active: bool,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WaivePayload {
    #[validate(length(max = 500, message = "Motivo muito longo."))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExcusePayload {
    #[validate(length(min = 1, max = 500, message = "Justificativa é obrigatória."))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkWaivePayload {
    #[validate(length(min = 1, message = "Informe ao menos uma multa."))]
    pub ids: Vec<Uuid>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkExcusePayload {
    #[validate(length(min = 1, message = "Informe ao menos uma multa."))]
    pub ids: Vec<Uuid>,
    #[validate(length(min = 1, max = 500, message = "Justificativa é obrigatória."))]
    pub reason: String,
}

#[utoipa::path(
    post,
    path = "/api/penalties",
    tag = "Multas",
    request_body = CreatePenaltyPayload,
    responses(
        (status = 201, description = "Multa lançada", body = Penalty),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_penalty(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Json(payload): Json<CreatePenaltyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let penalty = app_state
        .penalty_service
        .create_manual(&ctx, payload.employee_id, payload.penalty_type, payload.amount, payload.date, payload.reason)
        .await?;

    Ok((StatusCode::CREATED, Json(penalty)))
}

#[utoipa::path(
    get,
    path = "/api/penalties",
    tag = "Multas",
    params(PenaltyListQuery),
    responses(
        (status = 200, description = "Multas filtradas", body = Vec<Penalty>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_penalties(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(query): Query<PenaltyListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = PenaltyFilter {
        employee_id: query.employee_id,
        start: query.start,
        end: query.end,
        only_active: query.only_active,
    };

    let penalties = app_state.penalty_service.list(&ctx, &filter).await?;
    Ok((StatusCode::OK, Json(penalties)))
}

#[utoipa::path(
    post,
    path = "/api/penalties/{id}/waive",
    tag = "Multas",
    request_body = WaivePayload,
    params(("id" = Uuid, Path, description = "ID da multa")),
    responses(
        (status = 200, description = "Multa perdoada", body = Penalty),
        (status = 409, description = "Multa já perdoada")
    ),
    security(("api_jwt" = []))
)]
pub async fn waive_penalty(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<WaivePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let penalty = app_state.penalty_service.waive(&ctx, id, payload.reason.as_deref()).await?;
    Ok((StatusCode::OK, Json(penalty)))
}

#[utoipa::path(
    post,
    path = "/api/penalties/{id}/restore",
    tag = "Multas",
    params(("id" = Uuid, Path, description = "ID da multa")),
    responses(
        (status = 200, description = "Perdão desfeito", body = Penalty),
        (status = 409, description = "Multa não estava perdoada")
    ),
    security(("api_jwt" = []))
)]
pub async fn restore_penalty(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let penalty = app_state.penalty_service.restore(&ctx, id).await?;
    Ok((StatusCode::OK, Json(penalty)))
}

#[utoipa::path(
    post,
    path = "/api/penalties/{id}/excuse",
    tag = "Multas",
    request_body = ExcusePayload,
    params(("id" = Uuid, Path, description = "ID da multa")),
    responses(
        (status = 200, description = "Multa justificada", body = Penalty),
        (status = 409, description = "Multa já justificada")
    ),
    security(("api_jwt" = []))
)]
pub async fn excuse_penalty(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExcusePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let penalty = app_state.penalty_service.excuse(&ctx, id, &payload.reason).await?;
    Ok((StatusCode::OK, Json(penalty)))
}

#[utoipa::path(
    post,
    path = "/api/penalties/{id}/unexcuse",
    tag = "Multas",
    params(("id" = Uuid, Path, description = "ID da multa")),
    responses(
        (status = 200, description = "Justificativa desfeita", body = Penalty),
        (status = 409, description = "Multa não estava justificada")
    ),
    security(("api_jwt" = []))
)]
pub async fn unexcuse_penalty(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let penalty = app_state.penalty_service.unexcuse(&ctx, id).await?;
    Ok((StatusCode::OK, Json(penalty)))
}

#[utoipa::path(
    post,
    path = "/api/penalties/bulk-waive",
    tag = "Multas",
    request_body = BulkWaivePayload,
    responses(
        (status = 200, description = "Resultado por multa", body = Vec<BulkItemOutcome>)
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_waive(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Json(payload): Json<BulkWaivePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcomes = app_state
        .penalty_service
        .bulk_waive(&ctx, &payload.ids, payload.reason.as_deref())
        .await;
    Ok((StatusCode::OK, Json(outcomes)))
}

#[utoipa::path(
    post,
    path = "/api/penalties/bulk-excuse",
    tag = "Multas",
    request_body = BulkExcusePayload,
    responses(
        (status = 200, description = "Resultado por multa", body = Vec<BulkItemOutcome>)
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_excuse(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Json(payload): Json<BulkExcusePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcomes = app_state.penalty_service.bulk_excuse(&ctx, &payload.ids, &payload.reason).await;
    Ok((StatusCode::OK, Json(outcomes)))
}

#[utoipa::path(
    get,
    path = "/api/penalties/summary/{employee_id}",
    tag = "Multas",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário"), OptionalRangeQuery),
    responses(
        (status = 200, description = "Totais por estado", body = PenaltySummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn employee_summary(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
    Query(range): Query<OptionalRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .penalty_service
        .employee_summary(&ctx, employee_id, range.start, range.end)
        .await?;
    Ok((StatusCode::OK, Json(summary)))
}

#[utoipa::path(
    delete,
    path = "/api/penalties/{id}",
    tag = "Multas",
    params(("id" = Uuid, Path, description = "ID da multa")),
    responses(
        (status = 204, description = "Multa apagada"),
        (status = 403, description = "Multas automáticas não podem ser apagadas")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_penalty(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.penalty_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
