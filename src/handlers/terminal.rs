// src/handlers/terminal.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::attendance::{AttendanceEventResult, DeviceInfo},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// Evento cru do terminal biométrico.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TerminalEventPayload {
    #[validate(length(min = 1, message = "O campo 'employeeNo' é obrigatório."))]
    #[schema(example = "1024")]
    pub employee_no: String,
    pub direction: Direction,
    pub device_name: Option<String>,
    pub ip_address: Option<String>,
    pub verify_mode: Option<String>,
    /// Relógio do aparelho. Aceito, mas nunca usado.
    #[schema(example = "2025-02-03T09:12:00+05:00")]
    pub date_time: Option<String>,
}

impl TerminalEventPayload {
    /// Metadados gravados no registro do dia.
    pub fn device_info(&self, branch_id: Option<Uuid>) -> DeviceInfo {
        DeviceInfo {
            device_name: self.device_name.clone(),
            ip_address: self.ip_address.clone(),
            verify_mode: self.verify_mode.clone(),
            branch_id,
        }
    }
}

async fn process_event(
    app_state: &AppState,
    company_id: Uuid,
    branch_id: Option<Uuid>,
    payload: TerminalEventPayload,
) -> Result<AttendanceEventResult, AppError> {
    payload.validate()?;

    // Carimbo do servidor; o horário do aparelho é descartado
    let received_at = Utc::now();
    if let Some(device_time) = &payload.date_time {
        tracing::debug!("Horário do terminal ignorado: {}", device_time);
    }

    app_state
        .attendance_service
        .record_terminal_event(
            company_id,
            payload.employee_no.trim(),
            payload.direction == Direction::In,
            received_at,
            &payload.device_info(branch_id),
        )
        .await
}

// POST /api/terminal/{company_id}/events
#[utoipa::path(
    post,
    path = "/api/terminal/{company_id}/events",
    tag = "Terminal",
    request_body = TerminalEventPayload,
    params(("company_id" = Uuid, Path, description = "Empresa dona do terminal")),
    responses(
        (status = 200, description = "Evento processado", body = AttendanceEventResult),
        (status = 404, description = "Matrícula desconhecida"),
        (status = 409, description = "Saída sem entrada no dia")
    )
)]
pub async fn receive_event(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<TerminalEventPayload>,
) -> Result<impl IntoResponse, AppError> {
    let result = process_event(&app_state, company_id, None, payload).await?;
    Ok((StatusCode::OK, Json(result)))
}

// POST /api/terminal/{company_id}/{branch_id}/events
#[utoipa::path(
    post,
    path = "/api/terminal/{company_id}/{branch_id}/events",
    tag = "Terminal",
    request_body = TerminalEventPayload,
    params(
        ("company_id" = Uuid, Path, description = "Empresa dona do terminal"),
        ("branch_id" = Uuid, Path, description = "Filial onde o terminal está instalado")
    ),
    responses(
        (status = 200, description = "Evento processado e atribuído à filial", body = AttendanceEventResult),
        (status = 404, description = "Matrícula ou filial desconhecida"),
        (status = 409, description = "Saída sem entrada no dia")
    )
)]
pub async fn receive_branch_event(
    State(app_state): State<AppState>,
    Path((company_id, branch_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TerminalEventPayload>,
) -> Result<impl IntoResponse, AppError> {
    let result = process_event(&app_state, company_id, Some(branch_id), payload).await?;
    Ok((StatusCode::OK, Json(result)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_from_the_route_goes_into_the_device_info() {
        let payload: TerminalEventPayload = serde_json::from_value(serde_json::json!({
            "employeeNo": "1024",
            "direction": "in",
            "deviceName": "Portaria",
            "dateTime": "2025-02-03T09:12:00+05:00"
        }))
        .unwrap();
        let branch = Uuid::new_v4();

        let device = payload.device_info(Some(branch));
        assert_eq!(device.branch_id, Some(branch));
        assert_eq!(device.device_name.as_deref(), Some("Portaria"));
        assert_eq!(payload.direction, Direction::In);
        assert_eq!(payload.device_info(None).branch_id, None);
    }
}
