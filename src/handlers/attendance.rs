// src/handlers/attendance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        time::{company_timezone, today_in},
    },
    config::AppState,
    handlers::DateRangeQuery,
    middleware::tenancy::CompanyContext,
    models::attendance::{
        AttendanceCalendar, AttendanceEventResult, AttendanceRanking, AttendanceRecord, DailyAbsences,
        DailyLateness, DailyStatistics, DeviceInfo,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DailySheetQuery {
    /// Padrão: hoje no fuso da empresa
    pub date: Option<NaiveDate>,
}

const DEFAULT_RANKING_LIMIT: usize = 20;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceRankingQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub branch_id: Option<Uuid>,
    /// Padrão 20
    pub limit: Option<usize>,
}

fn manual_device() -> DeviceInfo {
    DeviceInfo {
        device_name: Some("manual".to_string()),
        ..DeviceInfo::default()
    }
}

// POST /api/attendance/{employee_id}/check-in
#[utoipa::path(
    post,
    path = "/api/attendance/{employee_id}/check-in",
    tag = "Ponto",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Entrada registrada (ou duplicada, ignorada)", body = AttendanceEventResult),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_in(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    // Sempre o relógio do servidor
    let result = app_state
        .attendance_service
        .check_in(ctx.company_id, employee_id, Utc::now(), &manual_device())
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

// POST /api/attendance/{employee_id}/check-out
#[utoipa::path(
    post,
    path = "/api/attendance/{employee_id}/check-out",
    tag = "Ponto",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Saída registrada", body = AttendanceRecord),
        (status = 409, description = "Sem entrada no dia")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_out(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state
        .attendance_service
        .check_out(ctx.company_id, employee_id, Utc::now())
        .await?;

    Ok((StatusCode::OK, Json(record)))
}

// GET /api/attendance/{employee_id}?start=..&end=..
#[utoipa::path(
    get,
    path = "/api/attendance/{employee_id}",
    tag = "Ponto",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário"), DateRangeQuery),
    responses(
        (status = 200, description = "Registros do período", body = Vec<AttendanceRecord>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_for_employee(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state
        .attendance_service
        .list_for_employee(ctx.company_id, employee_id, range.start, range.end)
        .await?;

    Ok((StatusCode::OK, Json(records)))
}

// GET /api/attendance/daily?date=..
#[utoipa::path(
    get,
    path = "/api/attendance/daily",
    tag = "Ponto",
    params(DailySheetQuery),
    responses(
        (status = 200, description = "Folha de ponto do dia", body = Vec<AttendanceRecord>)
    ),
    security(("api_jwt" = []))
)]
pub async fn daily_sheet(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(query): Query<DailySheetQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = match query.date {
        Some(date) => date,
        None => {
            let settings = app_state.settings_repo.get(ctx.company_id).await?;
            today_in(company_timezone(settings.as_ref(), app_state.default_tz))
        }
    };

    let records = app_state.attendance_service.daily_sheet(ctx.company_id, date).await?;
    Ok((StatusCode::OK, Json(records)))
}

async fn report_date(app_state: &AppState, ctx: &CompanyContext, date: Option<NaiveDate>) -> Result<NaiveDate, AppError> {
    match date {
        Some(date) => Ok(date),
        None => app_state.report_service.today(ctx.company_id).await,
    }
}

// GET /api/attendance/statistics?date=..
#[utoipa::path(
    get,
    path = "/api/attendance/statistics",
    tag = "Ponto",
    params(DailySheetQuery),
    responses(
        (status = 200, description = "Presentes, atrasados, faltas e licenças do dia", body = DailyStatistics)
    ),
    security(("api_jwt" = []))
)]
pub async fn daily_statistics(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(query): Query<DailySheetQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = report_date(&app_state, &ctx, query.date).await?;
    let stats = app_state.report_service.daily_statistics(&ctx, date).await?;
    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/attendance/absent?date=..
#[utoipa::path(
    get,
    path = "/api/attendance/absent",
    tag = "Ponto",
    params(DailySheetQuery),
    responses(
        (status = 200, description = "Funcionários que faltaram no dia", body = DailyAbsences)
    ),
    security(("api_jwt" = []))
)]
pub async fn absent_employees(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(query): Query<DailySheetQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = report_date(&app_state, &ctx, query.date).await?;
    let absences = app_state.report_service.absent_employees(&ctx, date).await?;
    Ok((StatusCode::OK, Json(absences)))
}

// GET /api/attendance/late?date=..
#[utoipa::path(
    get,
    path = "/api/attendance/late",
    tag = "Ponto",
    params(DailySheetQuery),
    responses(
        (status = 200, description = "Funcionários atrasados no dia", body = DailyLateness)
    ),
    security(("api_jwt" = []))
)]
pub async fn late_employees(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(query): Query<DailySheetQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = report_date(&app_state, &ctx, query.date).await?;
    let lateness = app_state.report_service.late_employees(&ctx, date).await?;
    Ok((StatusCode::OK, Json(lateness)))
}

// GET /api/attendance/{employee_id}/calendar?start=..&end=..
#[utoipa::path(
    get,
    path = "/api/attendance/{employee_id}/calendar",
    tag = "Ponto",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário"), DateRangeQuery),
    responses(
        (status = 200, description = "Situação de cada dia do período", body = AttendanceCalendar),
        (status = 400, description = "Período inválido"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn employee_calendar(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let calendar = app_state
        .report_service
        .employee_calendar(&ctx, employee_id, range.start, range.end)
        .await?;

    Ok((StatusCode::OK, Json(calendar)))
}

// GET /api/attendance/ranking?start=..&end=..&branchId=..&limit=..
#[utoipa::path(
    get,
    path = "/api/attendance/ranking",
    tag = "Ponto",
    params(AttendanceRankingQuery),
    responses(
        (status = 200, description = "Ranking por percentual de dias sem atraso", body = AttendanceRanking)
    ),
    security(("api_jwt" = []))
)]
pub async fn attendance_ranking(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Query(query): Query<AttendanceRankingQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_RANKING_LIMIT).clamp(1, 100);
    let ranking = app_state
        .report_service
        .attendance_ranking(&ctx, query.start, query.end, query.branch_id, limit)
        .await?;

    Ok((StatusCode::OK, Json(ranking)))
}
