// src/handlers/payroll.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{DateRangeQuery, MonthQuery},
    middleware::tenancy::CompanyContext,
    models::payroll::{BulkPayrollResult, LateRankingEntry, PayrollGroupedSummary, SalaryResult},
    services::payroll_service::PayrollFilter,
};

const DEFAULT_RANKING_LIMIT: usize = 10;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkPayrollPayload {
    #[schema(example = "2025-02-01")]
    pub start_date: NaiveDate,
    #[schema(example = "2025-02-28")]
    pub end_date: NaiveDate,
    pub branch_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Lista de funcionários vazia."))]
    pub employee_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LateRankingQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Padrão 10
    pub limit: Option<usize>,
}

// GET /api/payroll/employees/{employee_id}?start=..&end=..
#[utoipa::path(
    get,
    path = "/api/payroll/employees/{employee_id}",
    tag = "Folha",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário"), DateRangeQuery),
    responses(
        (status = 200, description = "Cálculo completo com memória de cálculo", body = SalaryResult),
        (status = 400, description = "Período inválido"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn calculate_for_employee(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state
        .payroll_service
        .calculate_for_employee(&ctx, employee_id, range.start, range.end)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

// POST /api/payroll/bulk
#[utoipa::path(
    post,
    path = "/api/payroll/bulk",
    tag = "Folha",
    request_body = BulkPayrollPayload,
    responses(
        (status = 200, description = "Folha por funcionário + totais", body = BulkPayrollResult),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_calculate(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Json(payload): Json<BulkPayrollPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let filter = PayrollFilter {
        branch_id: payload.branch_id,
        employee_ids: payload.employee_ids,
    };
    let result = app_state
        .payroll_service
        .bulk_calculate(&ctx, payload.start_date, payload.end_date, &filter)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/payroll/monthly?year=..&month=..
#[utoipa::path(
    get,
    path = "/api/payroll/monthly",
    tag = "Folha",
    params(MonthQuery),
    responses(
        (status = 200, description = "Folha do mês calendário", body = BulkPayrollResult)
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_report(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(month): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state
        .payroll_service
        .monthly_report(&ctx, month.year, month.month)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/payroll/summary?start=..&end=..
#[utoipa::path(
    get,
    path = "/api/payroll/summary",
    tag = "Folha",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Totais por filial e departamento", body = PayrollGroupedSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn payroll_summary(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .payroll_service
        .payroll_summary(&ctx, range.start, range.end)
        .await?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/payroll/late-ranking?start=..&end=..&limit=..
#[utoipa::path(
    get,
    path = "/api/payroll/late-ranking",
    tag = "Folha",
    params(LateRankingQuery),
    responses(
        (status = 200, description = "Funcionários com mais minutos de atraso", body = Vec<LateRankingEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn late_ranking(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(query): Query<LateRankingQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_RANKING_LIMIT).clamp(1, 100);
    let ranking = app_state
        .payroll_service
        .late_ranking(&ctx, query.start, query.end, limit)
        .await?;

    Ok((StatusCode::OK, Json(ranking)))
}
