// src/services/leave_service.rs

use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AttendanceRepository, EmployeeRepository, LeaveRepository},
    middleware::tenancy::CompanyContext,
    models::leave::{LeaveRecord, LeaveType, MonthlyLeaves},
    services::{payroll_engine::validate_range, schedule_resolver::month_bounds},
};

/// Resultado da checagem de cota para gravar uma folga.
#[derive(Debug, Clone, PartialEq)]
pub enum LeavePlan {
    /// Mesma data e mesmo tipo: nada a fazer
    Unchanged(LeaveRecord),
    /// Mesma data, tipo diferente: troca o tipo
    Update { id: Uuid },
    Insert,
}

/// Decide a gravação de uma folga contra os registros do mesmo mês calendário da data.
/// O registro que está sendo alterado não conta na cota do novo tipo.
/// Dia que já tem ponto não aceita folga nova nem troca de tipo.
pub fn plan_leave_write(
    month_records: &[LeaveRecord],
    date: NaiveDate,
    leave_type: LeaveType,
    has_attendance: bool,
) -> Result<LeavePlan, AppError> {
    let existing = month_records.iter().find(|r| r.date == date);

    if let Some(record) = existing {
        if record.leave_type == leave_type {
            return Ok(LeavePlan::Unchanged(record.clone()));
        }
    }
    if has_attendance {
        return Err(AppError::LeaveConflictsWithAttendance(date));
    }

    let used = month_records
        .iter()
        .filter(|r| r.leave_type == leave_type)
        .filter(|r| existing.is_none_or(|e| e.id != r.id))
        .count() as i64;

    let limit = leave_type.monthly_quota();
    if used >= limit {
        return Err(AppError::QuotaExceeded {
            leave_type,
            limit,
            year: date.year(),
            month: date.month(),
        });
    }

    Ok(match existing {
        Some(record) => LeavePlan::Update { id: record.id },
        None => LeavePlan::Insert,
    })
}

pub fn count_by_type(records: &[LeaveRecord], leave_type: LeaveType) -> i64 {
    records.iter().filter(|r| r.leave_type == leave_type).count() as i64
}

#[derive(Clone)]
pub struct LeaveService {
    pool: PgPool,
    leave_repo: LeaveRepository,
    employee_repo: EmployeeRepository,
    attendance_repo: AttendanceRepository,
}

impl LeaveService {
    pub fn new(
        pool: PgPool,
        leave_repo: LeaveRepository,
        employee_repo: EmployeeRepository,
        attendance_repo: AttendanceRepository,
    ) -> Self {
        Self { pool, leave_repo, employee_repo, attendance_repo }
    }

    /// Grava (ou troca o tipo de) uma folga, respeitando a cota mensal.
    pub async fn set_leave(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        date: NaiveDate,
        leave_type: LeaveType,
        reason: Option<&str>,
    ) -> Result<LeaveRecord, AppError> {
        // 1. Transação + trava do funcionário: contagem e escrita ficam atômicas
        let mut tx = self.pool.begin().await?;
        if !self.employee_repo.lock(&mut *tx, ctx.company_id, employee_id).await? {
            return Err(AppError::EmployeeNotFound);
        }

        // 2. Folgas do mês calendário da própria data
        let (month_start, month_end) = month_bounds(date);
        let month_records = self.leave_repo
            .list_for_employee(&mut *tx, employee_id, month_start, month_end)
            .await?;

        // 3. Cota e conflito com o ponto do dia
        let has_attendance = self.attendance_repo.exists_on(&mut *tx, employee_id, date).await?;
        let plan = plan_leave_write(&month_records, date, leave_type, has_attendance)?;

        // 4. Grava
        let record = match plan {
            LeavePlan::Unchanged(record) => {
                tx.commit().await?;
                return Ok(record);
            }
            LeavePlan::Update { id } => self.leave_repo.update_type(&mut *tx, id, leave_type, reason).await?,
            LeavePlan::Insert => {
                self.leave_repo
                    .insert(&mut *tx, ctx.company_id, employee_id, date, leave_type, reason, ctx.user_id)
                    .await?
            }
        };

        tx.commit().await?;
        tracing::info!("Folga '{}' gravada: funcionário {} em {}", leave_type, employee_id, date);
        Ok(record)
    }

    pub async fn delete_leave(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<(), AppError> {
        let deleted = self.leave_repo.delete(ctx.company_id, employee_id, date).await?;
        if deleted == 0 {
            return Err(AppError::ResourceNotFound("Folga"));
        }
        Ok(())
    }

    pub async fn get_leaves_for_month(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<MonthlyLeaves, AppError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::BadRequest(format!("Mês inválido: {}-{}", year, month)))?;
        let (month_start, month_end) = month_bounds(first);

        let employee = self.employee_repo
            .find_by_id(&self.pool, ctx.company_id, employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;

        let records = self.leave_repo
            .list_for_employee(&self.pool, employee.id, month_start, month_end)
            .await?;

        Ok(MonthlyLeaves {
            year,
            month,
            rest_count: count_by_type(&records, LeaveType::Rest),
            sick_count: count_by_type(&records, LeaveType::Sick),
            rest_limit: LeaveType::Rest.monthly_quota(),
            sick_limit: LeaveType::Sick.monthly_quota(),
            records,
        })
    }

    pub async fn list_in_range(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, AppError> {
        validate_range(start, end)?;
        let employee = self.employee_repo
            .find_by_id(&self.pool, ctx.company_id, employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;

        self.leave_repo.list_for_employee(&self.pool, employee.id, start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn leave(date: NaiveDate, leave_type: LeaveType) -> LeaveRecord {
        LeaveRecord {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: Uuid::nil(),
            date,
            leave_type,
            reason: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn second_rest_is_allowed_third_is_rejected() {
        let mut month = vec![leave(d(3), LeaveType::Rest)];
        assert_eq!(plan_leave_write(&month, d(10), LeaveType::Rest, false).unwrap(), LeavePlan::Insert);

        month.push(leave(d(10), LeaveType::Rest));
        let err = plan_leave_write(&month, d(17), LeaveType::Rest, false).unwrap_err();
        assert!(matches!(
            err,
            AppError::QuotaExceeded { leave_type: LeaveType::Rest, limit: 2, year: 2025, month: 3 }
        ));
    }

    #[test]
    fn twentieth_sick_is_allowed_twenty_first_is_rejected() {
        let mut month: Vec<_> = (1..=19).map(|day| leave(d(day), LeaveType::Sick)).collect();
        assert_eq!(plan_leave_write(&month, d(20), LeaveType::Sick, false).unwrap(), LeavePlan::Insert);

        month.push(leave(d(20), LeaveType::Sick));
        assert!(matches!(
            plan_leave_write(&month, d(21), LeaveType::Sick, false),
            Err(AppError::QuotaExceeded { leave_type: LeaveType::Sick, .. })
        ));
    }

    #[test]
    fn same_type_on_same_date_is_a_no_op() {
        let existing = leave(d(5), LeaveType::Rest);
        let month = vec![existing.clone(), leave(d(6), LeaveType::Rest)];
        // cota cheia, mas a mesma folga não conta como nova
        assert_eq!(
            plan_leave_write(&month, d(5), LeaveType::Rest, false).unwrap(),
            LeavePlan::Unchanged(existing)
        );
    }

    #[test]
    fn changing_type_checks_quota_of_the_new_type() {
        let sick = leave(d(5), LeaveType::Sick);
        let month = vec![sick.clone(), leave(d(6), LeaveType::Rest)];
        assert_eq!(
            plan_leave_write(&month, d(5), LeaveType::Rest, false).unwrap(),
            LeavePlan::Update { id: sick.id }
        );

        let full = vec![sick, leave(d(6), LeaveType::Rest), leave(d(7), LeaveType::Rest)];
        assert!(matches!(
            plan_leave_write(&full, d(5), LeaveType::Rest, false),
            Err(AppError::QuotaExceeded { .. })
        ));
    }

    #[test]
    fn day_with_attendance_rejects_new_or_changed_leave() {
        let rest = leave(d(5), LeaveType::Rest);
        let month = vec![rest.clone()];

        assert!(matches!(
            plan_leave_write(&month, d(12), LeaveType::Sick, true),
            Err(AppError::LeaveConflictsWithAttendance(date)) if date == d(12)
        ));
        assert!(matches!(
            plan_leave_write(&month, d(5), LeaveType::Sick, true),
            Err(AppError::LeaveConflictsWithAttendance(_))
        ));
        // regravar a mesma folga continua valendo
        assert_eq!(
            plan_leave_write(&month, d(5), LeaveType::Rest, true).unwrap(),
            LeavePlan::Unchanged(rest)
        );
    }

    #[test]
    fn rest_and_sick_quotas_are_independent() {
        let month = vec![leave(d(3), LeaveType::Rest), leave(d(4), LeaveType::Rest)];
        assert_eq!(plan_leave_write(&month, d(5), LeaveType::Sick, false).unwrap(), LeavePlan::Insert);
        assert_eq!(count_by_type(&month, LeaveType::Rest), 2);
        assert_eq!(count_by_type(&month, LeaveType::Sick), 0);
    }
}
