// src/models/leave.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "leave_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Rest, // Folga
    Sick, // Atestado
}

impl LeaveType {
    /// Limite de dias por mês calendário.
    pub fn monthly_quota(self) -> i64 {
        match self {
            LeaveType::Rest => 2,
            LeaveType::Sick => 20,
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveType::Rest => write!(f, "rest"),
            LeaveType::Sick => write!(f, "sick"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRecord {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub leave_type: LeaveType,
    #[schema(example = "Consulta médica")]
    pub reason: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyLeaves {
    pub year: i32,
    pub month: u32,
    pub records: Vec<LeaveRecord>,
    pub rest_count: i64,
    pub sick_count: i64,
    pub rest_limit: i64,
    pub sick_limit: i64,
}
