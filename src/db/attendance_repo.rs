// src/db/attendance_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::attendance::{AttendanceRecord, DeviceInfo},
};

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lê o registro do dia travando a linha (seção crítica entrada/saída).
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_logs WHERE employee_id = $1 AND date = $2 FOR UPDATE",
        )
            .bind(employee_id)
            .bind(date)
            .fetch_optional(executor)
            .await
            .map_err(AppError::from_write_conflict)?;

        Ok(record)
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
            "SELECT EXISTS (SELECT 1 FROM attendance_logs WHERE employee_id = $1 AND date = $2)",
        )
            .bind(employee_id)
            .bind(date)
            .fetch_one(executor)
            .await?;

        Ok(exists)
    }

    /// Cria o registro do dia com a entrada.
    /// Devolve `None` se outra transação criou a linha antes (a unicidade venceu).
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_check_in<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        employee_id: Uuid,
        date: NaiveDate,
        check_in: DateTime<Utc>,
        late_minutes: i32,
        device: &DeviceInfo,
    ) -> Result<Option<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance_logs
                (id, company_id, employee_id, date, check_in_time, late_minutes,
                 device_name, ip_address, verify_mode, branch_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (employee_id, date) DO NOTHING
            RETURNING *
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(employee_id)
            .bind(date)
            .bind(check_in)
            .bind(late_minutes)
            .bind(&device.device_name)
            .bind(&device.ip_address)
            .bind(&device.verify_mode)
            .bind(device.branch_id)
            .fetch_optional(executor)
            .await
            .map_err(AppError::from_write_conflict)?;

        Ok(record)
    }

    /// Preenche a entrada de um registro que existia sem ela.
    pub async fn fill_check_in<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        check_in: DateTime<Utc>,
        late_minutes: i32,
        device: &DeviceInfo,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance_logs
            SET check_in_time = $2,
                late_minutes = $3,
                device_name = COALESCE($4, device_name),
                ip_address = COALESCE($5, ip_address),
                verify_mode = COALESCE($6, verify_mode),
                branch_id = COALESCE($7, branch_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(check_in)
            .bind(late_minutes)
            .bind(&device.device_name)
            .bind(&device.ip_address)
            .bind(&device.verify_mode)
            .bind(device.branch_id)
            .fetch_one(executor)
            .await
            .map_err(AppError::from_write_conflict)?;

        Ok(record)
    }

    /// Grava a saída e as métricas derivadas já calculadas.
    pub async fn save_check_out<'e, E>(
        &self,
        executor: E,
        record: &AttendanceRecord,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saved = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance_logs
            SET check_out_time = $2,
                total_work_minutes = $3,
                early_leave_minutes = $4,
                overtime_minutes = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(record.id)
            .bind(record.check_out_time)
            .bind(record.total_work_minutes)
            .bind(record.early_leave_minutes)
            .bind(record.overtime_minutes)
            .fetch_one(executor)
            .await
            .map_err(AppError::from_write_conflict)?;

        Ok(saved)
    }

    pub async fn list_for_employee<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_logs WHERE employee_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date",
        )
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(executor)
            .await?;

        Ok(records)
    }

    /// Folha de ponto do dia para a empresa inteira.
    pub async fn list_for_company_day(
        &self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_logs WHERE company_id = $1 AND date = $2 ORDER BY check_in_time",
        )
            .bind(company_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Todos os registros da empresa no período (relatórios).
    pub async fn list_for_company_range(
        &self,
        company_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_logs WHERE company_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date",
        )
            .bind(company_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}
