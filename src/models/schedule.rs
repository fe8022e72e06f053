// src/models/schedule.rs

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Linha da escala semanal. `day_of_week` vai de 1 (segunda) a 7 (domingo).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: Uuid,
    pub employee_id: Uuid,

    #[schema(example = 1)]
    pub day_of_week: i16,

    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub work_start_time: Option<NaiveTime>,

    #[schema(value_type = Option<String>, example = "18:00:00")]
    pub work_end_time: Option<NaiveTime>,

    pub is_day_off: bool,
    pub updated_at: DateTime<Utc>,
}

/// Escala efetiva de um dia, já resolvida (linha explícita ou política padrão).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    #[schema(value_type = Option<String>)]
    pub work_start: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub work_end: Option<NaiveTime>,
    pub is_day_off: bool,
}

impl DaySchedule {
    pub const OFF: DaySchedule = DaySchedule {
        work_start: None,
        work_end: None,
        is_day_off: true,
    };
}

/// Visão semanal devolvida pela API: sete dias, marcando os que vieram do padrão.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeekDayView {
    pub day_of_week: i16,
    #[schema(example = "Monday")]
    pub day_name: String,
    #[schema(value_type = Option<String>)]
    pub work_start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub work_end_time: Option<NaiveTime>,
    pub is_day_off: bool,
    pub is_default: bool,
}

/// Dados de um dia a gravar (usado no upsert individual e no lote).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDayInput {
    pub day_of_week: i16,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub work_start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "18:00:00")]
    pub work_end_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_day_off: bool,
}
