// src/db/schedule_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::schedule::{ScheduleDayInput, ScheduleEntry},
};

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_employee<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
    ) -> Result<Vec<ScheduleEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ScheduleEntry>(
            "SELECT * FROM employee_schedules WHERE employee_id = $1 ORDER BY day_of_week",
        )
            .bind(employee_id)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    /// Carrega as escalas de vários funcionários numa única consulta.
    pub async fn list_for_employees(
        &self,
        employee_ids: &[Uuid],
    ) -> Result<Vec<ScheduleEntry>, AppError> {
        let rows = sqlx::query_as::<_, ScheduleEntry>(
            "SELECT * FROM employee_schedules WHERE employee_id = ANY($1) ORDER BY employee_id, day_of_week",
        )
            .bind(employee_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn upsert_day<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        input: &ScheduleDayInput,
    ) -> Result<ScheduleEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ScheduleEntry>(
            r#"
            INSERT INTO employee_schedules (id, employee_id, day_of_week, work_start_time, work_end_time, is_day_off)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (employee_id, day_of_week)
            DO UPDATE SET
                work_start_time = EXCLUDED.work_start_time,
                work_end_time = EXCLUDED.work_end_time,
                is_day_off = EXCLUDED.is_day_off,
                updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(employee_id)
            .bind(input.day_of_week)
            .bind(input.work_start_time)
            .bind(input.work_end_time)
            .bind(input.is_day_off)
            .fetch_one(executor)
            .await?;

        Ok(row)
    }

    pub async fn delete_day<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        day_of_week: i16,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM employee_schedules WHERE employee_id = $1 AND day_of_week = $2")
            .bind(employee_id)
            .bind(day_of_week)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_all<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM employee_schedules WHERE employee_id = $1")
            .bind(employee_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
