// src/services/attendance_service.rs

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::retry_once_on_conflict,
        error::AppError,
        time::{company_timezone, local_date, local_instant},
    },
    db::{
        AttendanceRepository, EmployeeRepository, LeaveRepository, PenaltyRepository, ScheduleRepository,
        SettingsRepository,
    },
    models::{
        attendance::{AttendanceEventResult, AttendanceRecord, DeviceInfo},
        employee::Employee,
        penalty::{NewPenalty, PenaltyType},
        schedule::DaySchedule,
        settings::{CompanySettings, DEFAULT_GRACE_MINUTES},
    },
    services::schedule_resolver::ScheduleResolver,
};

// =============================================================================
//  REGRAS PURAS (sem banco)
// =============================================================================

/// O que fazer com uma entrada, dado o registro do dia (se houver).
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInPlan {
    /// Já havia entrada: ignora em silêncio e devolve o registro intacto
    Duplicate(AttendanceRecord),
    /// Havia registro sem entrada: preenche
    FillExisting { id: Uuid, late_minutes: i32 },
    /// Primeiro evento do dia
    Insert { late_minutes: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutMetrics {
    pub total_work_minutes: i32,
    pub early_leave_minutes: i32,
    pub overtime_minutes: i32,
}

/// Minutos de atraso já descontada a tolerância. Folga ou dia sem horário = 0.
pub fn compute_late_minutes(
    check_in: DateTime<Utc>,
    date: NaiveDate,
    day: &DaySchedule,
    grace_minutes: i32,
    tz: Tz,
) -> i32 {
    if day.is_day_off {
        return 0;
    }
    let Some(scheduled) = day.work_start.and_then(|start| local_instant(date, start, tz)) else {
        return 0;
    };

    let late_seconds = (check_in - scheduled).num_seconds() - i64::from(grace_minutes) * 60;
    if late_seconds > 0 {
        (late_seconds / 60) as i32
    } else {
        0
    }
}

/// Trabalho líquido (menos almoço) e saída antecipada OU hora extra, nunca os dois.
pub fn compute_check_out_metrics(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    lunch_break_minutes: i32,
    date: NaiveDate,
    day: &DaySchedule,
    tz: Tz,
) -> CheckOutMetrics {
    let gross_minutes = (check_out - check_in).num_seconds() / 60;
    let total_work_minutes = (gross_minutes - i64::from(lunch_break_minutes)).max(0) as i32;

    let mut metrics = CheckOutMetrics {
        total_work_minutes,
        early_leave_minutes: 0,
        overtime_minutes: 0,
    };

    if day.is_day_off {
        return metrics;
    }
    if let Some(scheduled_end) = day.work_end.and_then(|end| local_instant(date, end, tz)) {
        let diff = (check_out - scheduled_end).num_seconds() / 60;
        if diff < 0 {
            metrics.early_leave_minutes = (-diff) as i32;
        } else {
            metrics.overtime_minutes = diff as i32;
        }
    }

    metrics
}

pub fn plan_check_in(
    existing: Option<AttendanceRecord>,
    check_in: DateTime<Utc>,
    date: NaiveDate,
    day: &DaySchedule,
    grace_minutes: i32,
    tz: Tz,
) -> CheckInPlan {
    match existing {
        Some(record) if record.check_in_time.is_some() => CheckInPlan::Duplicate(record),
        Some(record) => CheckInPlan::FillExisting {
            id: record.id,
            late_minutes: compute_late_minutes(check_in, date, day, grace_minutes, tz),
        },
        None => CheckInPlan::Insert {
            late_minutes: compute_late_minutes(check_in, date, day, grace_minutes, tz),
        },
    }
}

/// Aplica uma saída ao registro do dia. A última saída sempre vence.
pub fn apply_check_out(
    record: &mut AttendanceRecord,
    check_out: DateTime<Utc>,
    lunch_break_minutes: i32,
    day: &DaySchedule,
    tz: Tz,
) -> Result<(), AppError> {
    let Some(check_in) = record.check_in_time else {
        return Err(AppError::NoCheckIn(record.date));
    };

    let metrics = compute_check_out_metrics(check_in, check_out, lunch_break_minutes, record.date, day, tz);
    record.check_out_time = Some(check_out);
    record.total_work_minutes = metrics.total_work_minutes;
    record.early_leave_minutes = metrics.early_leave_minutes;
    record.overtime_minutes = metrics.overtime_minutes;
    Ok(())
}

/// Valor da multa de atraso lançada no livro na hora da entrada.
/// Só existe quando o desconto automático da folha está desligado,
/// assim o mesmo atraso nunca é cobrado pelos dois caminhos.
pub fn ledger_late_penalty(settings: Option<&CompanySettings>, late_minutes: i32) -> Option<Decimal> {
    let settings = settings?;
    if late_minutes <= 0 || settings.auto_penalty_enabled || settings.penalty_per_minute <= Decimal::ZERO {
        return None;
    }
    Some((Decimal::from(late_minutes) * settings.penalty_per_minute).round_dp(2))
}

/// Antes da admissão ou em dia de folga/atestado o atraso não vira multa.
pub fn is_late_exempt(date: NaiveDate, hire_date: Option<NaiveDate>, on_leave: bool) -> bool {
    on_leave || hire_date.is_some_and(|hire| date < hire)
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct AttendanceService {
    pool: PgPool,
    attendance_repo: AttendanceRepository,
    employee_repo: EmployeeRepository,
    schedule_repo: ScheduleRepository,
    settings_repo: SettingsRepository,
    penalty_repo: PenaltyRepository,
    leave_repo: LeaveRepository,
    default_tz: Tz,
}

/// Contexto do dia já resolvido antes da seção crítica.
struct DayContext {
    employee: Employee,
    settings: Option<CompanySettings>,
    tz: Tz,
    date: NaiveDate,
    day: DaySchedule,
}

impl AttendanceService {
    pub fn new(
        pool: PgPool,
        attendance_repo: AttendanceRepository,
        employee_repo: EmployeeRepository,
        schedule_repo: ScheduleRepository,
        settings_repo: SettingsRepository,
        penalty_repo: PenaltyRepository,
        leave_repo: LeaveRepository,
        default_tz: Tz,
    ) -> Self {
        Self {
            pool,
            attendance_repo,
            employee_repo,
            schedule_repo,
            settings_repo,
            penalty_repo,
            leave_repo,
            default_tz,
        }
    }

    async fn day_context(
        &self,
        employee: Employee,
        received_at: DateTime<Utc>,
    ) -> Result<DayContext, AppError> {
        let settings = self.settings_repo.get(employee.company_id).await?;
        let tz = company_timezone(settings.as_ref(), self.default_tz);
        let date = local_date(received_at, tz);

        let rows = self.schedule_repo.list_for_employee(&self.pool, employee.id).await?;
        let day = ScheduleResolver::new(&employee, &rows).resolve(date);

        Ok(DayContext { employee, settings, tz, date, day })
    }

    async fn load_employee(&self, company_id: Uuid, employee_id: Uuid) -> Result<Employee, AppError> {
        self.employee_repo
            .find_by_id(&self.pool, company_id, employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)
    }

    /// Registra uma entrada com o horário recebido pelo servidor.
    pub async fn check_in(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        received_at: DateTime<Utc>,
        device: &DeviceInfo,
    ) -> Result<AttendanceEventResult, AppError> {
        let employee = self.load_employee(company_id, employee_id).await?;
        self.check_in_employee(employee, received_at, device).await
    }

    pub async fn check_in_employee(
        &self,
        employee: Employee,
        received_at: DateTime<Utc>,
        device: &DeviceInfo,
    ) -> Result<AttendanceEventResult, AppError> {
        let ctx = self.day_context(employee, received_at).await?;
        retry_once_on_conflict("entrada", || self.try_check_in(&ctx, received_at, device)).await
    }

    async fn try_check_in(
        &self,
        ctx: &DayContext,
        received_at: DateTime<Utc>,
        device: &DeviceInfo,
    ) -> Result<AttendanceEventResult, AppError> {
        let grace = ctx
            .settings
            .as_ref()
            .map(|s| s.late_threshold_minutes)
            .unwrap_or(DEFAULT_GRACE_MINUTES);

        // 1. Inicia a transação e trava o registro do dia
        let mut tx = self.pool.begin().await?;
        let existing = self.attendance_repo.find_for_update(&mut *tx, ctx.employee.id, ctx.date).await?;

        // 2. Decide
        let (record, late_minutes) = match plan_check_in(existing, received_at, ctx.date, &ctx.day, grace, ctx.tz) {
            CheckInPlan::Duplicate(record) => {
                tx.commit().await?;
                tracing::info!(
                    "Entrada repetida ignorada: funcionário {} em {}",
                    ctx.employee.id, ctx.date
                );
                return Ok(AttendanceEventResult { record, duplicate: true });
            }
            CheckInPlan::FillExisting { id, late_minutes } => {
                let record = self.attendance_repo
                    .fill_check_in(&mut *tx, id, received_at, late_minutes, device)
                    .await?;
                (record, late_minutes)
            }
            CheckInPlan::Insert { late_minutes } => {
                // ON CONFLICT DO NOTHING: se perdeu a corrida, repete a leitura
                let record = self.attendance_repo
                    .insert_check_in(
                        &mut *tx,
                        ctx.employee.company_id,
                        ctx.employee.id,
                        ctx.date,
                        received_at,
                        late_minutes,
                        device,
                    )
                    .await?
                    .ok_or(AppError::ConcurrentModification)?;
                (record, late_minutes)
            }
        };

        // 3. Multa de atraso no livro (quando a folha não desconta sozinha)
        if let Some(amount) = ledger_late_penalty(ctx.settings.as_ref(), late_minutes) {
            let on_leave = self.leave_repo.exists_on(&mut *tx, ctx.employee.id, ctx.date).await?;
            if is_late_exempt(ctx.date, ctx.employee.hire_date, on_leave) {
                tracing::debug!("Atraso isento de multa: funcionário {} em {}", ctx.employee.id, ctx.date);
            } else {
                let penalty = NewPenalty {
                    employee_id: ctx.employee.id,
                    attendance_id: Some(record.id),
                    penalty_type: PenaltyType::Late,
                    amount,
                    late_minutes: Some(late_minutes),
                    reason: Some(format!("Atraso de {} min", late_minutes)),
                    date: ctx.date,
                    is_auto: true,
                    created_by: None,
                };
                self.penalty_repo.create(&mut *tx, ctx.employee.company_id, &penalty).await?;
            }
        }

        // 4. Commit
        tx.commit().await.map_err(AppError::from_write_conflict)?;

        if late_minutes > 0 {
            tracing::info!("Entrada com {} min de atraso: funcionário {}", late_minutes, ctx.employee.id);
        }
        Ok(AttendanceEventResult { record, duplicate: false })
    }

    /// Registra uma saída. A última saída do dia sobrescreve as anteriores.
    pub async fn check_out(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        received_at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        let employee = self.load_employee(company_id, employee_id).await?;
        self.check_out_employee(employee, received_at).await
    }

    pub async fn check_out_employee(
        &self,
        employee: Employee,
        received_at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        let ctx = self.day_context(employee, received_at).await?;
        let result = retry_once_on_conflict("saída", || self.try_check_out(&ctx, received_at)).await;

        if let Err(AppError::NoCheckIn(date)) = &result {
            tracing::warn!("Saída sem entrada descartada: funcionário {} em {}", ctx.employee.id, date);
        }
        result
    }

    async fn try_check_out(
        &self,
        ctx: &DayContext,
        received_at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut record = self.attendance_repo
            .find_for_update(&mut *tx, ctx.employee.id, ctx.date)
            .await?
            .ok_or(AppError::NoCheckIn(ctx.date))?;

        apply_check_out(&mut record, received_at, ctx.employee.lunch_break_minutes, &ctx.day, ctx.tz)?;

        let saved = self.attendance_repo.save_check_out(&mut *tx, &record).await?;
        tx.commit().await.map_err(AppError::from_write_conflict)?;

        Ok(saved)
    }

    /// Evento vindo do terminal: localiza o funcionário pela matrícula.
    pub async fn record_terminal_event(
        &self,
        company_id: Uuid,
        employee_no: &str,
        is_check_in: bool,
        received_at: DateTime<Utc>,
        device: &DeviceInfo,
    ) -> Result<AttendanceEventResult, AppError> {
        // Terminal de filial: a filial precisa ser da mesma empresa
        if let Some(branch_id) = device.branch_id {
            if !self.employee_repo.branch_exists(company_id, branch_id).await? {
                return Err(AppError::ResourceNotFound("Filial"));
            }
        }

        let employee = self.employee_repo
            .find_by_employee_no(company_id, employee_no)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;

        if is_check_in {
            self.check_in_employee(employee, received_at, device).await
        } else {
            let record = self.check_out_employee(employee, received_at).await?;
            Ok(AttendanceEventResult { record, duplicate: false })
        }
    }

    pub async fn list_for_employee(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        crate::services::payroll_engine::validate_range(start, end)?;
        let employee = self.load_employee(company_id, employee_id).await?;
        self.attendance_repo.list_for_employee(&self.pool, employee.id, start, end).await
    }

    pub async fn daily_sheet(&self, company_id: Uuid, date: NaiveDate) -> Result<Vec<AttendanceRecord>, AppError> {
        self.attendance_repo.list_for_company_day(company_id, date).await
    }
}
