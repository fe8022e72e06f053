// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Tolerância usada quando a empresa ainda não tem configuração gravada.
pub const DEFAULT_GRACE_MINUTES: i32 = 15;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    #[schema(ignore)] // O contexto (token) já define a empresa
    pub company_id: Uuid,

    // Tolerância efetiva para atraso
    #[schema(example = 10)]
    pub late_threshold_minutes: i32,

    #[schema(example = 15)]
    pub grace_period_minutes: i32,

    pub auto_penalty_enabled: bool,

    #[schema(example = "1000.00")]
    pub late_penalty_per_minute: Decimal,

    #[schema(example = "50000.00")]
    pub absence_penalty_amount: Decimal,

    // Taxa da multa de atraso lançada no livro no momento da entrada.
    // Só é usada quando o desconto automático da folha está desligado.
    #[schema(example = "0.00")]
    pub penalty_per_minute: Decimal,

    #[schema(example = "UZS")]
    pub currency: String,

    #[schema(example = "Asia/Tashkent")]
    pub timezone: String,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(range(min = 0, max = 240, message = "Tolerância deve estar entre 0 e 240 minutos."))]
    #[schema(example = 10)]
    pub late_threshold_minutes: Option<i32>,

    #[validate(range(min = 0, max = 240))]
    pub grace_period_minutes: Option<i32>,

    pub auto_penalty_enabled: Option<bool>,

    #[validate(custom(function = "crate::models::validate_non_negative"))]
    pub late_penalty_per_minute: Option<Decimal>,

    #[validate(custom(function = "crate::models::validate_non_negative"))]
    pub absence_penalty_amount: Option<Decimal>,

    #[validate(custom(function = "crate::models::validate_non_negative"))]
    pub penalty_per_minute: Option<Decimal>,

    #[validate(length(equal = 3, message = "Moeda deve ter 3 letras (ISO 4217)."))]
    pub currency: Option<String>,

    #[schema(example = "Asia/Tashkent")]
    pub timezone: Option<String>,
}
