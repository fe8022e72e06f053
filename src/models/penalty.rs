// src/models/penalty.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "penalty_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PenaltyType {
    Late,
    EarlyLeave,
    Absence,
    Manual,
}

/// Multa. `is_waived` (perdoada) e `is_excused` (justificada) são ciclos
/// independentes; qualquer um dos dois tira a multa da soma de descontos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Penalty {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub attendance_id: Option<Uuid>,
    pub penalty_type: PenaltyType,

    #[schema(example = "15000.00")]
    pub amount: Decimal,
    pub late_minutes: Option<i32>,
    pub reason: Option<String>,
    pub date: NaiveDate,
    pub is_auto: bool,
    pub created_by: Option<Uuid>,

    pub is_waived: bool,
    pub waived_by: Option<Uuid>,
    pub waived_at: Option<DateTime<Utc>>,
    pub waive_reason: Option<String>,

    pub is_excused: bool,
    pub excused_by: Option<Uuid>,
    pub excused_at: Option<DateTime<Utc>>,
    pub excuse_reason: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Penalty {
    /// Entra no desconto da folha?
    pub fn is_active(&self) -> bool {
        !self.is_waived && !self.is_excused
    }
}

/// Dados de uma nova multa (manual ou gerada pelo ponto).
#[derive(Debug, Clone)]
pub struct NewPenalty {
    pub employee_id: Uuid,
    pub attendance_id: Option<Uuid>,
    pub penalty_type: PenaltyType,
    pub amount: Decimal,
    pub late_minutes: Option<i32>,
    pub reason: Option<String>,
    pub date: NaiveDate,
    pub is_auto: bool,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PenaltySummary {
    pub total_count: i64,
    pub total_amount: Decimal,
    pub active_count: i64,
    pub active_amount: Decimal,
    pub waived_count: i64,
    pub waived_amount: Decimal,
    pub excused_count: i64,
    pub excused_amount: Decimal,
}

/// Resultado item a item das operações em lote.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemOutcome {
    pub id: Uuid,
    pub success: bool,
    pub error: Option<String>,
}
