// src/services/schedule_service.rs

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EmployeeRepository, ScheduleRepository},
    middleware::tenancy::CompanyContext,
    models::schedule::{ScheduleDayInput, ScheduleEntry, WeekDayView},
    services::schedule_resolver::{ScheduleResolver, WEEKDAY_NAMES},
};

/// Regras de um dia de escala: dia 1..7; dia de trabalho exige início < fim.
pub fn validate_day_input(input: &ScheduleDayInput) -> Result<(), AppError> {
    if !(1..=7).contains(&input.day_of_week) {
        return Err(AppError::BadRequest(format!(
            "Dia da semana inválido: {} (use 1 = segunda .. 7 = domingo)",
            input.day_of_week
        )));
    }
    if input.is_day_off {
        return Ok(());
    }
    match (input.work_start_time, input.work_end_time) {
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(_), Some(_)) => Err(AppError::BadRequest(
            "Início do expediente deve ser antes do fim.".to_string(),
        )),
        _ => Err(AppError::BadRequest(
            "Dia de trabalho precisa de horário de início e fim.".to_string(),
        )),
    }
}

/// Valida a semana inteira (sem dias repetidos).
pub fn validate_week_input(days: &[ScheduleDayInput]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for day in days {
        validate_day_input(day)?;
        if !seen.insert(day.day_of_week) {
            return Err(AppError::BadRequest(format!("Dia da semana repetido: {}", day.day_of_week)));
        }
    }
    Ok(())
}

/// Os sete dias já resolvidos, marcando os que vieram do padrão.
pub fn week_view(resolver: &ScheduleResolver) -> Vec<WeekDayView> {
    (1..=7u32)
        .map(|dow| {
            let (day, is_default) = resolver.resolve_weekday(dow);
            WeekDayView {
                day_of_week: dow as i16,
                day_name: WEEKDAY_NAMES[dow as usize - 1].to_string(),
                work_start_time: day.work_start,
                work_end_time: day.work_end,
                is_day_off: day.is_day_off,
                is_default,
            }
        })
        .collect()
}

fn entry_to_input(entry: &ScheduleEntry) -> ScheduleDayInput {
    ScheduleDayInput {
        day_of_week: entry.day_of_week,
        work_start_time: entry.work_start_time,
        work_end_time: entry.work_end_time,
        is_day_off: entry.is_day_off,
    }
}

#[derive(Clone)]
pub struct ScheduleService {
    pool: PgPool,
    schedule_repo: ScheduleRepository,
    employee_repo: EmployeeRepository,
}

impl ScheduleService {
    pub fn new(pool: PgPool, schedule_repo: ScheduleRepository, employee_repo: EmployeeRepository) -> Self {
        Self { pool, schedule_repo, employee_repo }
    }

    pub async fn get_week(&self, ctx: &CompanyContext, employee_id: Uuid) -> Result<Vec<WeekDayView>, AppError> {
        let employee = self.employee_repo
            .find_by_id(&self.pool, ctx.company_id, employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;

        let rows = self.schedule_repo.list_for_employee(&self.pool, employee.id).await?;
        Ok(week_view(&ScheduleResolver::new(&employee, &rows)))
    }

    pub async fn set_day(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        input: &ScheduleDayInput,
    ) -> Result<ScheduleEntry, AppError> {
        validate_day_input(input)?;

        let mut tx = self.pool.begin().await?;
        if !self.employee_repo.lock(&mut *tx, ctx.company_id, employee_id).await? {
            return Err(AppError::EmployeeNotFound);
        }
        let entry = self.schedule_repo.upsert_day(&mut *tx, employee_id, input).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Substitui a escala inteira de uma vez.
    pub async fn set_week(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        days: &[ScheduleDayInput],
    ) -> Result<Vec<WeekDayView>, AppError> {
        validate_week_input(days)?;

        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Garante que o funcionário é da empresa
        if !self.employee_repo.lock(&mut *tx, ctx.company_id, employee_id).await? {
            return Err(AppError::EmployeeNotFound);
        }

        // 3. Troca todas as linhas
        self.schedule_repo.delete_all(&mut *tx, employee_id).await?;
        for day in days {
            self.schedule_repo.upsert_day(&mut *tx, employee_id, day).await?;
        }

        // 4. Commit
        tx.commit().await?;

        self.get_week(ctx, employee_id).await
    }

    /// Apaga a linha do dia; ele volta à política padrão.
    pub async fn delete_day(&self, ctx: &CompanyContext, employee_id: Uuid, day_of_week: i16) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !self.employee_repo.lock(&mut *tx, ctx.company_id, employee_id).await? {
            return Err(AppError::EmployeeNotFound);
        }
        let deleted = self.schedule_repo.delete_day(&mut *tx, employee_id, day_of_week).await?;
        tx.commit().await?;

        if deleted == 0 {
            return Err(AppError::ResourceNotFound("Escala"));
        }
        Ok(())
    }

    /// Copia a escala de um funcionário para outros (substituindo a deles).
    pub async fn copy_from(
        &self,
        ctx: &CompanyContext,
        source_employee_id: Uuid,
        target_employee_ids: &[Uuid],
    ) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.employee_repo.lock(&mut *tx, ctx.company_id, source_employee_id).await? {
            return Err(AppError::EmployeeNotFound);
        }
        let source_rows = self.schedule_repo.list_for_employee(&mut *tx, source_employee_id).await?;

        let mut copied = 0;
        for target_id in target_employee_ids.iter().filter(|id| **id != source_employee_id) {
            if !self.employee_repo.lock(&mut *tx, ctx.company_id, *target_id).await? {
                return Err(AppError::EmployeeNotFound);
            }
            self.schedule_repo.delete_all(&mut *tx, *target_id).await?;
            for row in &source_rows {
                self.schedule_repo.upsert_day(&mut *tx, *target_id, &entry_to_input(row)).await?;
            }
            copied += 1;
        }

        tx.commit().await?;
        tracing::info!("Escala de {} copiada para {} funcionário(s)", source_employee_id, copied);
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn input(dow: i16, start: Option<u32>, end: Option<u32>, off: bool) -> ScheduleDayInput {
        ScheduleDayInput {
            day_of_week: dow,
            work_start_time: start.and_then(|h| NaiveTime::from_hms_opt(h, 0, 0)),
            work_end_time: end.and_then(|h| NaiveTime::from_hms_opt(h, 0, 0)),
            is_day_off: off,
        }
    }

    #[test]
    fn working_day_needs_ordered_times() {
        assert!(validate_day_input(&input(1, Some(9), Some(18), false)).is_ok());
        assert!(validate_day_input(&input(1, Some(18), Some(9), false)).is_err());
        assert!(validate_day_input(&input(1, Some(9), None, false)).is_err());
        // folga não precisa de horário
        assert!(validate_day_input(&input(7, None, None, true)).is_ok());
    }

    #[test]
    fn day_of_week_must_be_one_to_seven() {
        assert!(validate_day_input(&input(0, None, None, true)).is_err());
        assert!(validate_day_input(&input(8, None, None, true)).is_err());
    }

    #[test]
    fn week_rejects_repeated_days() {
        let days = vec![input(1, Some(9), Some(18), false), input(1, None, None, true)];
        assert!(matches!(validate_week_input(&days), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn default_week_view_flags_every_day_as_default() {
        let view = week_view(&ScheduleResolver::default_policy());
        assert_eq!(view.len(), 7);
        assert!(view.iter().all(|d| d.is_default));
        assert_eq!(view.iter().filter(|d| !d.is_day_off).count(), 5);
        assert_eq!(view[0].day_name, "Monday");
        assert!(view[6].is_day_off);
    }
}
