// src/handlers/schedule.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::CompanyContext,
    models::schedule::{ScheduleDayInput, ScheduleEntry, WeekDayView},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetWeekPayload {
    #[validate(length(min = 1, max = 7, message = "Informe de 1 a 7 dias."))]
    pub days: Vec<ScheduleDayInput>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CopySchedulePayload {
    #[validate(length(min = 1, message = "Informe ao menos um funcionário de destino."))]
    pub target_employee_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CopyScheduleResponse {
    pub copied: usize,
}

#[utoipa::path(
    get,
    path = "/api/schedules/{employee_id}",
    tag = "Escalas",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Semana resolvida (linhas próprias + padrão)", body = Vec<WeekDayView>),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_week(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let week = app_state.schedule_service.get_week(&ctx, employee_id).await?;
    Ok((StatusCode::OK, Json(week)))
}

#[utoipa::path(
    put,
    path = "/api/schedules/{employee_id}",
    tag = "Escalas",
    request_body = SetWeekPayload,
    params(("employee_id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Escala substituída", body = Vec<WeekDayView>),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_week(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<SetWeekPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let week = app_state.schedule_service.set_week(&ctx, employee_id, &payload.days).await?;
    Ok((StatusCode::OK, Json(week)))
}

#[utoipa::path(
    put,
    path = "/api/schedules/{employee_id}/days",
    tag = "Escalas",
    request_body = ScheduleDayInput,
    params(("employee_id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Dia gravado", body = ScheduleEntry),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_day(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<ScheduleDayInput>,
) -> Result<impl IntoResponse, AppError> {
    let entry = app_state.schedule_service.set_day(&ctx, employee_id, &payload).await?;
    Ok((StatusCode::OK, Json(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/schedules/{employee_id}/days/{day_of_week}",
    tag = "Escalas",
    params(
        ("employee_id" = Uuid, Path, description = "ID do funcionário"),
        ("day_of_week" = i16, Path, description = "1 = segunda .. 7 = domingo")
    ),
    responses(
        (status = 204, description = "Dia volta ao padrão"),
        (status = 404, description = "Sem linha para o dia")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_day(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path((employee_id, day_of_week)): Path<(Uuid, i16)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.schedule_service.delete_day(&ctx, employee_id, day_of_week).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/schedules/{employee_id}/copy",
    tag = "Escalas",
    request_body = CopySchedulePayload,
    params(("employee_id" = Uuid, Path, description = "Funcionário de origem")),
    responses(
        (status = 200, description = "Escala copiada", body = CopyScheduleResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn copy_schedule(
    State(app_state): State<AppState>,
    ctx: CompanyContext,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<CopySchedulePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let copied = app_state
        .schedule_service
        .copy_from(&ctx, employee_id, &payload.target_employee_ids)
        .await?;
    Ok((StatusCode::OK, Json(CopyScheduleResponse { copied })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day(day_of_week: i16) -> ScheduleDayInput {
        ScheduleDayInput {
            day_of_week,
            work_start_time: NaiveTime::from_hms_opt(9, 0, 0),
            work_end_time: NaiveTime::from_hms_opt(18, 0, 0),
            is_day_off: false,
        }
    }

    #[test]
    fn week_payload_needs_one_to_seven_days() {
        let empty = SetWeekPayload { days: Vec::new() };
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("days"));

        let eight = SetWeekPayload { days: (1..=8).map(day).collect() };
        assert!(eight.validate().is_err());

        let week = SetWeekPayload { days: (1..=7).map(day).collect() };
        assert!(week.validate().is_ok());
    }
}
