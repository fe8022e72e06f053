// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::settings::{CompanySettings, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Configuração da empresa. `None` quando nunca foi gravada:
    /// quem chama decide os padrões (a folha zera os valores dependentes).
    pub async fn find<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Option<CompanySettings>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, CompanySettings>(
            "SELECT * FROM company_settings WHERE company_id = $1",
        )
            .bind(company_id)
            .fetch_optional(executor)
            .await?;

        Ok(settings)
    }

    /// Atalho fora de transação.
    pub async fn get(&self, company_id: Uuid) -> Result<Option<CompanySettings>, AppError> {
        self.find(&self.pool, company_id).await
    }

    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: &UpdateSettingsRequest,
    ) -> Result<CompanySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update). Campos ausentes mantêm o valor atual (ou o DEFAULT da tabela).
        let settings = sqlx::query_as::<_, CompanySettings>(
            r#"
            INSERT INTO company_settings (
                company_id, late_threshold_minutes, grace_period_minutes, auto_penalty_enabled,
                late_penalty_per_minute, absence_penalty_amount, penalty_per_minute, currency, timezone
            )
            VALUES (
                $1,
                COALESCE($2, 10),
                COALESCE($3, 15),
                COALESCE($4, FALSE),
                COALESCE($5, 1000),
                COALESCE($6, 50000),
                COALESCE($7, 0),
                COALESCE($8, 'UZS'),
                COALESCE($9, 'Asia/Tashkent')
            )
            ON CONFLICT (company_id)
            DO UPDATE SET
                late_threshold_minutes = COALESCE($2, company_settings.late_threshold_minutes),
                grace_period_minutes = COALESCE($3, company_settings.grace_period_minutes),
                auto_penalty_enabled = COALESCE($4, company_settings.auto_penalty_enabled),
                late_penalty_per_minute = COALESCE($5, company_settings.late_penalty_per_minute),
                absence_penalty_amount = COALESCE($6, company_settings.absence_penalty_amount),
                penalty_per_minute = COALESCE($7, company_settings.penalty_per_minute),
                currency = COALESCE($8, company_settings.currency),
                timezone = COALESCE($9, company_settings.timezone),
                updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(company_id)
            .bind(input.late_threshold_minutes)
            .bind(input.grace_period_minutes)
            .bind(input.auto_penalty_enabled)
            .bind(input.late_penalty_per_minute)
            .bind(input.absence_penalty_amount)
            .bind(input.penalty_per_minute)
            .bind(&input.currency)
            .bind(&input.timezone)
            .fetch_one(executor)
            .await?;

        Ok(settings)
    }
}
