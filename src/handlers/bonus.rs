// src/handlers/bonus.rs

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
    middleware::tenancy::CompanyContext,
    models::{
        bonus::{AutoBonusOutcome, Bonus, BonusLeaderboardEntry, BonusSummary, BonusType},
        validate_non_negative,
    },
    services::bonus_service::AutoBonusRequest,
};

fn default_bonus_type() -> BonusType {
    BonusType::Manual
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBonusPayload {
    pub employee_id: Uuid,
    #[serde(default = "default_bonus_type")]
    pub bonus_type: BonusType,
    #[validate(custom(function = "validate_non_negative"))]
    #[schema(example = 200000.0)]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[validate(length(max = 500, message = "Motivo muito longo."))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkBonusPayload {
    #[validate(length(min = 1, message = "Informe ao menos um funcionário."))]
    pub employee_ids: Vec<Uuid>,
    #[serde(default = "default_bonus_type")]
    pub bonus_type: BonusType,
    #[validate(custom(function = "validate_non_negative"))]
    #[schema(example = 100000.0)]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[validate(length(max = 500, message = "Motivo muito longo."))]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BonusListQuery {
    pub employee_id: Option<Uuid>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub branch_id: Option<Uuid>,
    /// Padrão 10
    pub limit: Option<usize>,
}

/// Parâmetros dos bônus automáticos do mês.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoBonusPayload {
    #[schema(example = 2025)]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "Mês deve estar entre 1 e 12."))]
    #[schema(example = 2)]
    pub month: u32,
    #[validate(custom(function = "validate_non_negative"))]
    #[schema(example = 300000.0)]
    pub amount: Decimal,
    pub employee_ids: Option<Vec<Uuid>>,
    /// Só chegada antecipada (padrão 15)
    #[validate(range(min = 1, max = 240))]
    pub threshold_minutes: Option<i64>,
    /// Só chegada antecipada (padrão 10)
    #[validate(range(min = 1, max = 31))]
    pub min_days: Option<u32>,
}

impl From<AutoBonusPayload> for AutoBonusRequest {
    fn from(p: AutoBonusPayload) -> Self {
        Self {
            year: p.year,
            month: p.month,
            amount: p.amount,
            employee_ids: p.employee_ids,
            threshold_minutes: p.threshold_minutes,
            min_days: p.min_days,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/bonuses",
    tag = "Bônus",
    request_body = CreateBonusPayload,
    responses(
        (status = 201, description = "Bônus lançado", body = Bonus),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bonus(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Json(payload): Json<CreateBonusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let bonus = app_state
        .bonus_service
        .create(&ctx, payload.employee_id, payload.bonus_type, payload.amount, payload.date, payload.reason)
        .await?;

    Ok((StatusCode::CREATED, Json(bonus)))
}

#[utoipa::path(
    post,
    path = "/api/bonuses/bulk",
    tag = "Bônus",
    request_body = BulkBonusPayload,
    responses(
        (status = 201, description = "Bônus lançados (tudo ou nada)", body = Vec<Bonus>)
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_create_bonus(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Json(payload): Json<BulkBonusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let bonuses = app_state
        .bonus_service
        .bulk_create(&ctx, &payload.employee_ids, payload.bonus_type, payload.amount, payload.date, payload.reason)
        .await?;

    Ok((StatusCode::CREATED, Json(bonuses)))
}

#[utoipa::path(
    get,
    path = "/api/bonuses",
    tag = "Bônus",
    params(BonusListQuery),
    responses(
        (status = 200, description = "Bônus filtrados", body = Vec<Bonus>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_bonuses(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(query): Query<BonusListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let bonuses = app_state
        .bonus_service
        .list(&ctx, query.employee_id, query.start, query.end)
        .await?;
    Ok((StatusCode::OK, Json(bonuses)))
}

#[utoipa::path(
    get,
    path = "/api/bonuses/summary",
    tag = "Bônus",
    params(BonusListQuery),
    responses(
        (status = 200, description = "Totais por tipo", body = BonusSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn bonus_summary(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(query): Query<BonusListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .bonus_service
        .summary(&ctx, query.employee_id, query.start, query.end)
        .await?;
    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/bonuses/leaderboard?start=..&end=..&branchId=..&limit=..
#[utoipa::path(
    get,
    path = "/api/bonuses/leaderboard",
    tag = "Bônus",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Quem mais recebeu bônus no período", body = Vec<BonusLeaderboardEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn bonus_leaderboard(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT).clamp(1, 100);
    let board = app_state
        .bonus_service
        .leaderboard(&ctx, query.start, query.end, query.branch_id, limit)
        .await?;
    Ok((StatusCode::OK, Json(board)))
}

#[utoipa::path(
    delete,
    path = "/api/bonuses/{id}",
    tag = "Bônus",
    params(("id" = Uuid, Path, description = "ID do bônus")),
    responses(
        (status = 204, description = "Bônus apagado"),
        (status = 404, description = "Bônus não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bonus(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.bonus_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/bonuses/auto/perfect-attendance",
    tag = "Bônus",
    request_body = AutoBonusPayload,
    responses(
        (status = 200, description = "Resultado por funcionário", body = Vec<AutoBonusOutcome>)
    ),
    security(("api_jwt" = []))
)]
pub async fn auto_perfect_attendance(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Json(payload): Json<AutoBonusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcomes = app_state
        .bonus_service
        .auto_perfect_attendance(&ctx, &payload.into())
        .await?;
    Ok((StatusCode::OK, Json(outcomes)))
}

#[utoipa::path(
    post,
    path = "/api/bonuses/auto/early-arrival",
    tag = "Bônus",
    request_body = AutoBonusPayload,
    responses(
        (status = 200, description = "Resultado por funcionário", body = Vec<AutoBonusOutcome>)
    ),
    security(("api_jwt" = []))
)]
pub async fn auto_early_arrival(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Json(payload): Json<AutoBonusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcomes = app_state
        .bonus_service
        .auto_early_arrival(&ctx, &payload.into())
        .await?;
    Ok((StatusCode::OK, Json(outcomes)))
}
