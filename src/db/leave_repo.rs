// src/db/leave_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::leave::{LeaveRecord, LeaveType},
};

#[derive(Clone)]
pub struct LeaveRepository {
    pool: PgPool,
}

impl LeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_employee<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, LeaveRecord>(
            "SELECT * FROM employee_leaves WHERE employee_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date",
        )
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(executor)
            .await?;

        Ok(records)
    }

    pub async fn exists_on<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM employee_leaves WHERE employee_id = $1 AND date = $2)",
        )
            .bind(employee_id)
            .bind(date)
            .fetch_one(executor)
            .await?;

        Ok(exists)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        employee_id: Uuid,
        date: NaiveDate,
        leave_type: LeaveType,
        reason: Option<&str>,
        created_by: Uuid,
    ) -> Result<LeaveRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, LeaveRecord>(
            r#"
            INSERT INTO employee_leaves (id, company_id, employee_id, date, leave_type, reason, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(employee_id)
            .bind(date)
            .bind(leave_type)
            .bind(reason)
            .bind(created_by)
            .fetch_one(executor)
            .await?;

        Ok(record)
    }

    pub async fn update_type<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        leave_type: LeaveType,
        reason: Option<&str>,
    ) -> Result<LeaveRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, LeaveRecord>(
            r#"
            UPDATE employee_leaves
            SET leave_type = $2, reason = COALESCE($3, reason)
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(leave_type)
            .bind(reason)
            .fetch_one(executor)
            .await?;

        Ok(record)
    }

    pub async fn delete(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM employee_leaves WHERE company_id = $1 AND employee_id = $2 AND date = $3",
        )
            .bind(company_id)
            .bind(employee_id)
            .bind(date)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_for_company_day(
        &self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, AppError> {
        let records = sqlx::query_as::<_, LeaveRecord>(
            "SELECT * FROM employee_leaves WHERE company_id = $1 AND date = $2",
        )
            .bind(company_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}
