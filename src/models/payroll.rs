// src/models/payroll.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{employee::SalaryType, leave::LeaveType};

// =============================================================================
//  RESULTADO DO CÁLCULO (um funcionário, um período)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Diária = salário / dias úteis do mês cheio da data inicial
    FullMonthBased,
    /// Diária = salário base
    Daily,
}

/// Motivo pelo qual um atraso ou falta não foi descontado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExcuseReason {
    OffDay,
    BeforeHireDate,
    Rest,
    Sick,
}

impl From<LeaveType> for ExcuseReason {
    fn from(leave_type: LeaveType) -> Self {
        match leave_type {
            LeaveType::Rest => ExcuseReason::Rest,
            LeaveType::Sick => ExcuseReason::Sick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExcusedKind {
    Late,
    Absence,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LateDetail {
    pub date: NaiveDate,
    pub late_minutes: i32,
    pub check_in_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExcusedDay {
    pub date: NaiveDate,
    pub kind: ExcusedKind,
    pub reason: ExcuseReason,
    /// Minutos de atraso perdoados (0 para faltas)
    pub late_minutes: i32,
    /// Quanto teria sido descontado
    pub penalty_saved: Decimal,
}

/// Base da diária: sempre o mês calendário inteiro da data inicial.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyRateBasis {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub total_days: u32,
    pub full_month_work_days: u32,
    pub off_days: u32,
    pub daily_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodFacts {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub effective_start: NaiveDate,
    pub effective_end: NaiveDate,
    pub period_expected_days: u32,
    pub worked_days: u32,
    pub absence_days: u32,
    pub total_work_minutes: i64,
    pub total_work_hours: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDaysSummary {
    pub total: u32,
    pub rest: u32,
    pub sick: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatenessSummary {
    pub total_late_minutes: i64,
    pub late_days: u32,
    pub late_penalty_per_minute: Decimal,
    pub auto_penalty_enabled: bool,
    pub details: Vec<LateDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deductions {
    pub manual_penalty_amount: Decimal,
    pub manual_penalty_count: u32,
    pub auto_late_penalty: Decimal,
    pub absence_penalty_per_day: Decimal,
    pub absence_penalty: Decimal,
    pub total_penalty_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Credits {
    pub bonus_count: u32,
    pub total_bonus_amount: Decimal,
}

/// Um passo da memória de cálculo, legível para o RH.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownStep {
    pub step: u8,
    #[schema(example = "Diária")]
    pub title: String,
    #[schema(example = "3000000 / 20 = 150000")]
    pub formula: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryResult {
    pub employee_id: Uuid,
    pub salary_type: SalaryType,
    pub calculation_method: CalculationMethod,
    pub base_salary: Decimal,
    pub currency: String,

    pub rate_basis: DailyRateBasis,
    pub period: PeriodFacts,
    pub leave_days: LeaveDaysSummary,
    pub lateness: LatenessSummary,
    pub excused_days: Vec<ExcusedDay>,
    pub deductions: Deductions,
    pub credits: Credits,

    pub calculated_salary: Decimal,
    pub final_salary: Decimal,

    pub breakdown: Vec<BreakdownStep>,
}

// =============================================================================
//  FOLHA EM LOTE E RELATÓRIOS
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayroll {
    pub employee_id: Uuid,
    pub employee_no: String,
    pub full_name: String,
    pub branch_id: Option<Uuid>,
    pub branch_name: Option<String>,
    pub department_id: Option<Uuid>,
    pub department_name: Option<String>,
    pub result: Option<SalaryResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrollTotals {
    pub total_employees: u32,
    pub total_salaries: Decimal,
    pub total_penalties: Decimal,
    pub total_bonuses: Decimal,
    pub net_payroll: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkPayrollResult {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub employees: Vec<EmployeePayroll>,
    pub failed: u32,
    pub summary: PayrollTotals,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrollGroup {
    pub id: Option<Uuid>,
    #[schema(example = "Sem filial")]
    pub name: String,
    pub totals: PayrollTotals,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrollGroupedSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub overall: PayrollTotals,
    pub by_branch: Vec<PayrollGroup>,
    pub by_department: Vec<PayrollGroup>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LateRankingEntry {
    pub rank: u32,
    pub employee_id: Uuid,
    pub employee_no: String,
    pub full_name: String,
    pub total_late_minutes: i64,
    pub late_days: u32,
    pub auto_late_penalty: Decimal,
}
