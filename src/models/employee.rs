// src/models/employee.rs

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "salary_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    Monthly, // Salário mensal, rateado por dia útil do mês
    Daily,   // Diária fixa por dia trabalhado
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "employee_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Suspended,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub department_id: Option<Uuid>,

    #[schema(example = "1024")]
    pub employee_no: String,

    #[schema(example = "Aziz Karimov")]
    pub full_name: String,

    #[schema(example = "3000000.00")]
    pub base_salary: Option<Decimal>,
    pub salary_type: SalaryType,

    // Horário padrão, só vale para dias úteis sem linha na escala semanal
    pub work_start_time: Option<NaiveTime>,
    pub work_end_time: Option<NaiveTime>,

    #[schema(example = 60)]
    pub lunch_break_minutes: i32,
    pub hire_date: Option<NaiveDate>,
    pub status: EmployeeStatus,

    // Preenchidos via JOIN nos relatórios
    #[sqlx(default)]
    pub branch_name: Option<String>,
    #[sqlx(default)]
    pub department_name: Option<String>,
}
