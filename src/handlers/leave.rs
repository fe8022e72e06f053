// src/handlers/leave.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{DateRangeQuery, MonthQuery},
    middleware::tenancy::CompanyContext,
    models::leave::{LeaveRecord, LeaveType, MonthlyLeaves},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetLeavePayload {
    #[schema(example = "2025-02-10")]
    pub date: NaiveDate,
    pub leave_type: LeaveType,
    #[validate(length(max = 500, message = "Motivo muito longo."))]
    pub reason: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/leaves/{employee_id}",
    tag = "Folgas",
    request_body = SetLeavePayload,
    params(("employee_id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Folga gravada", body = LeaveRecord),
        (status = 409, description = "Já existe ponto na data"),
        (status = 422, description = "Cota mensal esgotada")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_leave(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<SetLeavePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let record = app_state
        .leave_service
        .set_leave(&ctx, employee_id, payload.date, payload.leave_type, payload.reason.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(record)))
}

#[utoipa::path(
    delete,
    path = "/api/leaves/{employee_id}/{date}",
    tag = "Folgas",
    params(
        ("employee_id" = Uuid, Path, description = "ID do funcionário"),
        ("date" = NaiveDate, Path, description = "Data da folga")
    ),
    responses(
        (status = 204, description = "Folga removida"),
        (status = 404, description = "Folga não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_leave(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path((employee_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.leave_service.delete_leave(&ctx, employee_id, date).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/leaves/{employee_id}/month",
    tag = "Folgas",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário"), MonthQuery),
    responses(
        (status = 200, description = "Folgas do mês com contagem e limites", body = MonthlyLeaves)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_month(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
    Query(month): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let leaves = app_state
        .leave_service
        .get_leaves_for_month(&ctx, employee_id, month.year, month.month)
        .await?;

    Ok((StatusCode::OK, Json(leaves)))
}

#[utoipa::path(
    get,
    path = "/api/leaves/{employee_id}",
    tag = "Folgas",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário"), DateRangeQuery),
    responses(
        (status = 200, description = "Folgas do período", body = Vec<LeaveRecord>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_in_range(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state
        .leave_service
        .list_in_range(&ctx, employee_id, range.start, range.end)
        .await?;

    Ok((StatusCode::OK, Json(records)))
}
