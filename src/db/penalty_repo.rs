// src/db/penalty_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::penalty::{NewPenalty, Penalty},
};

/// Filtros da listagem de multas.
#[derive(Debug, Clone, Default)]
pub struct PenaltyFilter {
    pub employee_id: Option<Uuid>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub only_active: bool,
}

#[derive(Clone)]
pub struct PenaltyRepository {
    pool: PgPool,
}

impl PenaltyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        new: &NewPenalty,
    ) -> Result<Penalty, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let penalty = sqlx::query_as::<_, Penalty>(
            r#"
            INSERT INTO penalties
                (id, company_id, employee_id, attendance_id, penalty_type, amount,
                 late_minutes, reason, date, is_auto, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(new.employee_id)
            .bind(new.attendance_id)
            .bind(new.penalty_type)
            .bind(new.amount)
            .bind(new.late_minutes)
            .bind(&new.reason)
            .bind(new.date)
            .bind(new.is_auto)
            .bind(new.created_by)
            .fetch_one(executor)
            .await?;

        Ok(penalty)
    }

    pub async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> Result<Option<Penalty>, AppError> {
        let penalty = sqlx::query_as::<_, Penalty>("SELECT * FROM penalties WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(penalty)
    }

    pub async fn list(&self, company_id: Uuid, filter: &PenaltyFilter) -> Result<Vec<Penalty>, AppError> {
        let penalties = sqlx::query_as::<_, Penalty>(
            r#"
            SELECT * FROM penalties
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR employee_id = $2)
              AND ($3::date IS NULL OR date >= $3)
              AND ($4::date IS NULL OR date <= $4)
              AND (NOT $5 OR (is_waived = FALSE AND is_excused = FALSE))
            ORDER BY date DESC, created_at DESC
            "#,
        )
            .bind(company_id)
            .bind(filter.employee_id)
            .bind(filter.start)
            .bind(filter.end)
            .bind(filter.only_active)
            .fetch_all(&self.pool)
            .await?;

        Ok(penalties)
    }

    /// Todas as multas do funcionário no período (inclusive perdoadas/justificadas).
    pub async fn list_for_employee<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Penalty>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let penalties = sqlx::query_as::<_, Penalty>(
            "SELECT * FROM penalties WHERE employee_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date",
        )
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(executor)
            .await?;

        Ok(penalties)
    }

    // --- Ciclo de perdão/justificativa ---
    // Cada UPDATE só acontece se o estado atual permitir; `None` = nada mudou.

    pub async fn set_waived(
        &self,
        company_id: Uuid,
        id: Uuid,
        waived_by: Uuid,
        reason: Option<&str>,
    ) -> Result<Option<Penalty>, AppError> {
        let penalty = sqlx::query_as::<_, Penalty>(
            r#"
            UPDATE penalties
            SET is_waived = TRUE, waived_by = $3, waived_at = NOW(), waive_reason = $4
            WHERE company_id = $1 AND id = $2 AND is_waived = FALSE
            RETURNING *
            "#,
        )
            .bind(company_id)
            .bind(id)
            .bind(waived_by)
            .bind(reason)
            .fetch_optional(&self.pool)
            .await?;

        Ok(penalty)
    }

    pub async fn clear_waived(&self, company_id: Uuid, id: Uuid) -> Result<Option<Penalty>, AppError> {
        let penalty = sqlx::query_as::<_, Penalty>(
            r#"
            UPDATE penalties
            SET is_waived = FALSE, waived_by = NULL, waived_at = NULL, waive_reason = NULL
            WHERE company_id = $1 AND id = $2 AND is_waived = TRUE
            RETURNING *
            "#,
        )
            .bind(company_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(penalty)
    }

    pub async fn set_excused(
        &self,
        company_id: Uuid,
        id: Uuid,
        excused_by: Uuid,
        reason: &str,
    ) -> Result<Option<Penalty>, AppError> {
        let penalty = sqlx::query_as::<_, Penalty>(
            r#"
            UPDATE penalties
            SET is_excused = TRUE, excused_by = $3, excused_at = NOW(), excuse_reason = $4
            WHERE company_id = $1 AND id = $2 AND is_excused = FALSE
            RETURNING *
            "#,
        )
            .bind(company_id)
            .bind(id)
            .bind(excused_by)
            .bind(reason)
            .fetch_optional(&self.pool)
            .await?;

        Ok(penalty)
    }

    pub async fn clear_excused(&self, company_id: Uuid, id: Uuid) -> Result<Option<Penalty>, AppError> {
        let penalty = sqlx::query_as::<_, Penalty>(
            r#"
            UPDATE penalties
            SET is_excused = FALSE, excused_by = NULL, excused_at = NULL, excuse_reason = NULL
            WHERE company_id = $1 AND id = $2 AND is_excused = TRUE
            RETURNING *
            "#,
        )
            .bind(company_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(penalty)
    }

    /// Remove apenas lançamentos manuais.
    pub async fn delete_manual(&self, company_id: Uuid, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM penalties WHERE company_id = $1 AND id = $2 AND is_auto = FALSE")
            .bind(company_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
