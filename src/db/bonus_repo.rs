// src/db/bonus_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::bonus::{Bonus, BonusType, NewBonus},
};

#[derive(Clone)]
pub struct BonusRepository {
    pool: PgPool,
}

impl BonusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        new: &NewBonus,
    ) -> Result<Bonus, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bonus = sqlx::query_as::<_, Bonus>(
            r#"
            INSERT INTO bonuses (id, company_id, employee_id, bonus_type, amount, reason, date, given_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(new.employee_id)
            .bind(new.bonus_type)
            .bind(new.amount)
            .bind(&new.reason)
            .bind(new.date)
            .bind(new.given_by)
            .fetch_one(executor)
            .await?;

        Ok(bonus)
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        employee_id: Option<Uuid>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bonus>, AppError> {
        let bonuses = sqlx::query_as::<_, Bonus>(
            r#"
            SELECT * FROM bonuses
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR employee_id = $2)
              AND ($3::date IS NULL OR date >= $3)
              AND ($4::date IS NULL OR date <= $4)
            ORDER BY date DESC, created_at DESC
            "#,
        )
            .bind(company_id)
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(bonuses)
    }

    pub async fn list_for_employee<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bonus>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bonuses = sqlx::query_as::<_, Bonus>(
            "SELECT * FROM bonuses WHERE employee_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date",
        )
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(executor)
            .await?;

        Ok(bonuses)
    }

    pub async fn exists_of_type<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        bonus_type: BonusType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bonuses
                WHERE employee_id = $1 AND bonus_type = $2 AND date BETWEEN $3 AND $4
            )
            "#,
        )
            .bind(employee_id)
            .bind(bonus_type)
            .bind(start)
            .bind(end)
            .fetch_one(executor)
            .await?;

        Ok(exists)
    }

    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM bonuses WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
