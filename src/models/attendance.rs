// src/models/attendance.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Registro diário de ponto. Um por (funcionário, data).
/// Os campos de minutos são sempre derivados, nunca vêm do cliente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub employee_id: Uuid,
    /// Filial do terminal que registrou a entrada
    pub branch_id: Option<Uuid>,
    pub date: NaiveDate,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub late_minutes: i32,
    pub early_leave_minutes: i32,
    pub total_work_minutes: i32,
    pub overtime_minutes: i32,
    pub device_name: Option<String>,
    pub ip_address: Option<String>,
    pub verify_mode: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Metadados do terminal que originou o evento.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[schema(example = "Entrada Principal")]
    pub device_name: Option<String>,
    #[schema(example = "192.168.1.64")]
    pub ip_address: Option<String>,
    #[schema(example = "face")]
    pub verify_mode: Option<String>,
    pub branch_id: Option<Uuid>,
}

/// Resultado de um evento de ponto. `duplicate` indica uma entrada repetida
/// ignorada (o registro devolvido é o existente, intacto).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEventResult {
    pub record: AttendanceRecord,
    pub duplicate: bool,
}

// =============================================================================
//  RELATÓRIOS DE PONTO
// =============================================================================

/// Situação de um funcionário num dia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    OnTime,
    Late,
    Absent,
    Rest,
    Sick,
    DayOff,
    BeforeHire,
    /// Dia ainda não chegou
    Pending,
}

impl DayStatus {
    pub fn is_present(self) -> bool {
        matches!(self, DayStatus::OnTime | DayStatus::Late)
    }

    pub fn is_leave(self) -> bool {
        matches!(self, DayStatus::Rest | DayStatus::Sick)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// 1 = segunda .. 7 = domingo
    pub day_of_week: u32,
    pub status: DayStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub late_minutes: i32,
    #[schema(example = 8.5)]
    pub work_hours: Decimal,
    pub overtime_minutes: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSummary {
    pub present_days: u32,
    pub on_time_days: u32,
    pub late_days: u32,
    pub absent_days: u32,
    pub leave_days: u32,
    pub off_days: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCalendar {
    pub employee_id: Uuid,
    pub full_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: u32,
    pub summary: CalendarSummary,
    pub days: Vec<CalendarDay>,
}

/// Números do dia para a empresa (funcionários ativos).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatistics {
    pub date: NaiveDate,
    pub total_employees: u32,
    pub present: u32,
    pub on_time: u32,
    pub late: u32,
    pub absent: u32,
    pub on_leave: u32,
    /// Folga da escala, antes da admissão ou dia futuro
    pub off_duty: u32,
    #[schema(example = 150000.0)]
    pub total_penalties: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbsentEmployee {
    pub employee_id: Uuid,
    pub employee_no: String,
    pub full_name: String,
    pub department_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyAbsences {
    pub date: NaiveDate,
    pub total_absent: u32,
    pub employees: Vec<AbsentEmployee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LateEmployee {
    pub employee_id: Uuid,
    pub employee_no: String,
    pub full_name: String,
    pub department_name: Option<String>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub late_minutes: i32,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub scheduled_start: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyLateness {
    pub date: NaiveDate,
    pub total_late: u32,
    pub employees: Vec<LateEmployee>,
}

/// Posição no ranking de pontualidade.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRankingEntry {
    pub rank: u32,
    pub employee_id: Uuid,
    pub employee_no: String,
    pub full_name: String,
    pub branch_id: Option<Uuid>,
    pub total_days: u32,
    pub on_time_days: u32,
    pub late_days: u32,
    pub total_late_minutes: i64,
    /// Percentual de dias sem atraso (0..100)
    #[schema(example = 95.45)]
    pub attendance_rate: Decimal,
    pub bonus_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRanking {
    pub ranking: Vec<AttendanceRankingEntry>,
    /// Funcionários com ao menos um registro no período
    pub total_count: u32,
}
