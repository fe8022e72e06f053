// src/models/bonus.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "bonus_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BonusType {
    PerfectAttendance,
    EarlyArrival,
    Overtime,
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bonus {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub bonus_type: BonusType,

    #[schema(example = "200000.00")]
    pub amount: Decimal,
    pub reason: Option<String>,
    pub date: NaiveDate,
    pub given_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBonus {
    pub employee_id: Uuid,
    pub bonus_type: BonusType,
    pub amount: Decimal,
    pub reason: Option<String>,
    pub date: NaiveDate,
    pub given_by: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BonusTypeTotal {
    pub bonus_type: BonusType,
    pub count: i64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BonusSummary {
    pub total_count: i64,
    pub total_amount: Decimal,
    pub by_type: Vec<BonusTypeTotal>,
}

/// Resultado de um cálculo automático de bônus para um funcionário.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoBonusOutcome {
    pub employee_id: Uuid,
    pub full_name: String,
    pub awarded: bool,
    #[schema(example = "ja_existe")]
    pub detail: String,
    pub bonus: Option<Bonus>,
}

/// Quem mais recebeu bônus no período.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BonusLeaderboardEntry {
    pub rank: u32,
    pub employee_id: Uuid,
    pub employee_no: String,
    pub full_name: String,
    pub branch_id: Option<Uuid>,
    pub bonus_count: u32,
    pub total_amount: Decimal,
}
