// src/services/payroll_service.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        time::{company_timezone, today_in},
    },
    db::{
        AttendanceRepository, BonusRepository, EmployeeRepository, LeaveRepository, PenaltyRepository,
        ScheduleRepository, SettingsRepository,
    },
    middleware::tenancy::CompanyContext,
    models::{
        employee::Employee,
        payroll::{
            BulkPayrollResult, EmployeePayroll, LateRankingEntry, PayrollGroup, PayrollGroupedSummary,
            PayrollTotals, SalaryResult,
        },
        schedule::ScheduleEntry,
        settings::CompanySettings,
    },
    services::{
        payroll_engine::{calculate_salary, validate_range, PayrollInput},
        schedule_resolver::{month_bounds, ScheduleResolver},
    },
};

// =============================================================================
//  AGREGAÇÕES (puras)
// =============================================================================

/// Soma só os cálculos que deram certo; as falhas ficam de fora dos totais.
pub fn aggregate_totals<'a, I>(payrolls: I) -> PayrollTotals
where
    I: IntoIterator<Item = &'a EmployeePayroll>,
{
    payrolls
        .into_iter()
        .filter_map(|p| p.result.as_ref())
        .fold(PayrollTotals::default(), |mut acc, r| {
            acc.total_employees += 1;
            acc.total_salaries += r.calculated_salary;
            acc.total_penalties += r.deductions.total_penalty_amount;
            acc.total_bonuses += r.credits.total_bonus_amount;
            acc.net_payroll += r.final_salary;
            acc
        })
}

/// Agrupa a folha por uma chave (filial ou departamento). Sem chave vai para `fallback`.
pub fn group_totals<F>(payrolls: &[EmployeePayroll], fallback: &str, key: F) -> Vec<PayrollGroup>
where
    F: Fn(&EmployeePayroll) -> (Option<Uuid>, Option<&str>),
{
    let mut groups: HashMap<Option<Uuid>, (String, Vec<&EmployeePayroll>)> = HashMap::new();
    for payroll in payrolls {
        let (id, name) = key(payroll);
        groups
            .entry(id)
            .or_insert_with(|| (name.unwrap_or(fallback).to_string(), Vec::new()))
            .1
            .push(payroll);
    }

    let mut result: Vec<PayrollGroup> = groups
        .into_iter()
        .map(|(id, (name, members))| PayrollGroup {
            id,
            name,
            totals: aggregate_totals(members),
        })
        .collect();
    result.sort_by(|a, b| b.totals.net_payroll.cmp(&a.totals.net_payroll).then_with(|| a.name.cmp(&b.name)));
    result
}

/// Ranking de atrasos pelos minutos efetivamente contados (sem os justificados).
pub fn rank_lateness(payrolls: &[EmployeePayroll], limit: usize) -> Vec<LateRankingEntry> {
    let mut late: Vec<(&EmployeePayroll, &SalaryResult)> = payrolls
        .iter()
        .filter_map(|p| p.result.as_ref().map(|r| (p, r)))
        .filter(|(_, r)| r.lateness.total_late_minutes > 0)
        .collect();

    late.sort_by(|(pa, a), (pb, b)| {
        b.lateness.total_late_minutes
            .cmp(&a.lateness.total_late_minutes)
            .then_with(|| b.lateness.late_days.cmp(&a.lateness.late_days))
            .then_with(|| pa.full_name.cmp(&pb.full_name))
    });

    late.into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (p, r))| LateRankingEntry {
            rank: i as u32 + 1,
            employee_id: p.employee_id,
            employee_no: p.employee_no.clone(),
            full_name: p.full_name.clone(),
            total_late_minutes: r.lateness.total_late_minutes,
            late_days: r.lateness.late_days,
            auto_late_penalty: r.deductions.auto_late_penalty,
        })
        .collect()
}

fn employee_payroll(employee: &Employee, outcome: Result<SalaryResult, AppError>) -> EmployeePayroll {
    let (result, error) = match outcome {
        Ok(r) => (Some(r), None),
        Err(e) => {
            tracing::warn!("Falha no cálculo da folha de {}: {}", employee.id, e);
            (None, Some(e.to_string()))
        }
    };
    EmployeePayroll {
        employee_id: employee.id,
        employee_no: employee.employee_no.clone(),
        full_name: employee.full_name.clone(),
        branch_id: employee.branch_id,
        branch_name: employee.branch_name.clone(),
        department_id: employee.department_id,
        department_name: employee.department_name.clone(),
        result,
        error,
    }
}

/// Filtro da folha em lote.
#[derive(Debug, Clone, Default)]
pub struct PayrollFilter {
    pub branch_id: Option<Uuid>,
    pub employee_ids: Option<Vec<Uuid>>,
}

/// O que vale para todos os funcionários de uma rodada.
struct PayrollRun {
    settings: Option<CompanySettings>,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct PayrollService {
    pool: PgPool,
    employee_repo: EmployeeRepository,
    schedule_repo: ScheduleRepository,
    attendance_repo: AttendanceRepository,
    leave_repo: LeaveRepository,
    penalty_repo: PenaltyRepository,
    bonus_repo: BonusRepository,
    settings_repo: SettingsRepository,
    default_tz: Tz,
    concurrency: usize,
}

impl PayrollService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        employee_repo: EmployeeRepository,
        schedule_repo: ScheduleRepository,
        attendance_repo: AttendanceRepository,
        leave_repo: LeaveRepository,
        penalty_repo: PenaltyRepository,
        bonus_repo: BonusRepository,
        settings_repo: SettingsRepository,
        default_tz: Tz,
        concurrency: usize,
    ) -> Self {
        Self {
            pool,
            employee_repo,
            schedule_repo,
            attendance_repo,
            leave_repo,
            penalty_repo,
            bonus_repo,
            settings_repo,
            default_tz,
            concurrency: concurrency.max(1),
        }
    }

    async fn prepare_run(&self, ctx: &CompanyContext, start: NaiveDate, end: NaiveDate) -> Result<PayrollRun, AppError> {
        validate_range(start, end)?;
        let settings = self.settings_repo.get(ctx.company_id).await?;
        let today = today_in(company_timezone(settings.as_ref(), self.default_tz));
        Ok(PayrollRun { settings, start, end, today })
    }

    /// Lê os fatos de um funcionário e roda o motor. Só leitura.
    async fn compute(
        &self,
        employee: &Employee,
        schedule_rows: &[ScheduleEntry],
        run: &PayrollRun,
    ) -> Result<SalaryResult, AppError> {
        let (attendance, leaves, penalties, bonuses) = futures::try_join!(
            self.attendance_repo.list_for_employee(&self.pool, employee.id, run.start, run.end),
            self.leave_repo.list_for_employee(&self.pool, employee.id, run.start, run.end),
            self.penalty_repo.list_for_employee(&self.pool, employee.id, run.start, run.end),
            self.bonus_repo.list_for_employee(&self.pool, employee.id, run.start, run.end),
        )?;

        let schedule = ScheduleResolver::new(employee, schedule_rows);
        Ok(calculate_salary(&PayrollInput {
            employee,
            schedule: &schedule,
            settings: run.settings.as_ref(),
            attendance: &attendance,
            leaves: &leaves,
            penalties: &penalties,
            bonuses: &bonuses,
            start_date: run.start,
            end_date: run.end,
            today: run.today,
        }))
    }

    pub async fn calculate_for_employee(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SalaryResult, AppError> {
        let run = self.prepare_run(ctx, start, end).await?;
        let employee = self.employee_repo
            .find_by_id(&self.pool, ctx.company_id, employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;
        let rows = self.schedule_repo.list_for_employee(&self.pool, employee.id).await?;

        self.compute(&employee, &rows, &run).await
    }

    /// Folha de todos os funcionários ativos (ou do filtro), em paralelo por funcionário.
    /// Um erro num funcionário não derruba a rodada.
    pub async fn bulk_calculate(
        &self,
        ctx: &CompanyContext,
        start: NaiveDate,
        end: NaiveDate,
        filter: &PayrollFilter,
    ) -> Result<BulkPayrollResult, AppError> {
        // 1. Parâmetros comuns
        let run = self.prepare_run(ctx, start, end).await?;

        // 2. Funcionários e escalas numa consulta cada
        let employees = self.employee_repo
            .list_active(&self.pool, ctx.company_id, filter.branch_id, filter.employee_ids.as_deref())
            .await?;
        let ids: Vec<Uuid> = employees.iter().map(|e| e.id).collect();
        let mut schedules: HashMap<Uuid, Vec<ScheduleEntry>> = HashMap::new();
        for row in self.schedule_repo.list_for_employees(&ids).await? {
            schedules.entry(row.employee_id).or_default().push(row);
        }

        // 3. Fan-out (cada future é dono do seu funcionário)
        let run = &run;
        let schedules = &schedules;
        let mut payrolls: Vec<EmployeePayroll> = stream::iter(employees)
            .map(move |employee: Employee| async move {
                let rows = schedules.get(&employee.id).map(Vec::as_slice).unwrap_or(&[]);
                let outcome = self.compute(&employee, rows, run).await;
                employee_payroll(&employee, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        // 4. Reduce
        payrolls.sort_by(|a, b| a.employee_no.cmp(&b.employee_no));
        let summary = aggregate_totals(&payrolls);
        let failed = payrolls.iter().filter(|p| p.error.is_some()).count() as u32;

        tracing::info!(
            "Folha {}..{} da empresa {}: {} calculado(s), {} falha(s), líquido {}",
            start,
            end,
            ctx.company_id,
            summary.total_employees,
            failed,
            summary.net_payroll
        );

        Ok(BulkPayrollResult { start_date: start, end_date: end, employees: payrolls, failed, summary })
    }

    /// Folha do mês calendário inteiro.
    pub async fn monthly_report(&self, ctx: &CompanyContext, year: i32, month: u32) -> Result<BulkPayrollResult, AppError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::BadRequest(format!("Mês inválido: {}-{}", year, month)))?;
        let (start, end) = month_bounds(first);
        self.bulk_calculate(ctx, start, end, &PayrollFilter::default()).await
    }

    pub async fn payroll_summary(
        &self,
        ctx: &CompanyContext,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PayrollGroupedSummary, AppError> {
        let bulk = self.bulk_calculate(ctx, start, end, &PayrollFilter::default()).await?;

        Ok(PayrollGroupedSummary {
            start_date: start,
            end_date: end,
            by_branch: group_totals(&bulk.employees, "Sem filial", |p| (p.branch_id, p.branch_name.as_deref())),
            by_department: group_totals(&bulk.employees, "Sem departamento", |p| {
                (p.department_id, p.department_name.as_deref())
            }),
            overall: bulk.summary,
        })
    }

    pub async fn late_ranking(
        &self,
        ctx: &CompanyContext,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<LateRankingEntry>, AppError> {
        let bulk = self.bulk_calculate(ctx, start, end, &PayrollFilter::default()).await?;
        Ok(rank_lateness(&bulk.employees, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        employee::SalaryType,
        payroll::{CalculationMethod, Credits, DailyRateBasis, Deductions, LatenessSummary, LeaveDaysSummary, PeriodFacts},
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
    }

    fn result(calculated: Decimal, penalties: Decimal, bonuses: Decimal, late_minutes: i64, late_days: u32) -> SalaryResult {
        SalaryResult {
            employee_id: Uuid::nil(),
            salary_type: SalaryType::Monthly,
            calculation_method: CalculationMethod::FullMonthBased,
            base_salary: calculated,
            currency: "UZS".to_string(),
            rate_basis: DailyRateBasis {
                month_start: d(1),
                month_end: d(28),
                total_days: 28,
                full_month_work_days: 20,
                off_days: 8,
                daily_rate: calculated / dec!(20),
            },
            period: PeriodFacts {
                start_date: d(1),
                end_date: d(28),
                effective_start: d(1),
                effective_end: d(28),
                period_expected_days: 20,
                worked_days: 20,
                absence_days: 0,
                total_work_minutes: 0,
                total_work_hours: Decimal::ZERO,
            },
            leave_days: LeaveDaysSummary::default(),
            lateness: LatenessSummary {
                total_late_minutes: late_minutes,
                late_days,
                late_penalty_per_minute: dec!(1000),
                auto_penalty_enabled: true,
                details: Vec::new(),
            },
            excused_days: Vec::new(),
            deductions: Deductions {
                manual_penalty_amount: Decimal::ZERO,
                manual_penalty_count: 0,
                auto_late_penalty: Decimal::from(late_minutes) * dec!(1000),
                absence_penalty_per_day: Decimal::ZERO,
                absence_penalty: Decimal::ZERO,
                total_penalty_amount: penalties,
            },
            credits: Credits { bonus_count: 0, total_bonus_amount: bonuses },
            calculated_salary: calculated,
            final_salary: (calculated - penalties + bonuses).max(Decimal::ZERO),
            breakdown: Vec::new(),
        }
    }

    fn payroll(name: &str, branch: Option<(Uuid, &str)>, outcome: Option<SalaryResult>) -> EmployeePayroll {
        EmployeePayroll {
            employee_id: Uuid::new_v4(),
            employee_no: name.to_lowercase(),
            full_name: name.to_string(),
            branch_id: branch.map(|(id, _)| id),
            branch_name: branch.map(|(_, n)| n.to_string()),
            department_id: None,
            department_name: None,
            error: outcome.is_none().then(|| "Funcionário não encontrado".to_string()),
            result: outcome,
        }
    }

    #[test]
    fn totals_skip_failed_employees() {
        let payrolls = vec![
            payroll("Ana", None, Some(result(dec!(3000000), dec!(100000), dec!(50000), 0, 0))),
            payroll("Bek", None, Some(result(dec!(2000000), dec!(0), dec!(0), 0, 0))),
            payroll("Cid", None, None),
        ];

        let totals = aggregate_totals(&payrolls);

        assert_eq!(totals.total_employees, 2);
        assert_eq!(totals.total_salaries, dec!(5000000));
        assert_eq!(totals.total_penalties, dec!(100000));
        assert_eq!(totals.total_bonuses, dec!(50000));
        assert_eq!(totals.net_payroll, dec!(4950000));
    }

    #[test]
    fn groups_by_branch_with_fallback_name() {
        let north = Uuid::new_v4();
        let payrolls = vec![
            payroll("Ana", Some((north, "Norte")), Some(result(dec!(1000), dec!(0), dec!(0), 0, 0))),
            payroll("Bek", Some((north, "Norte")), Some(result(dec!(2000), dec!(0), dec!(0), 0, 0))),
            payroll("Cid", None, Some(result(dec!(500), dec!(0), dec!(0), 0, 0))),
        ];

        let groups = group_totals(&payrolls, "Sem filial", |p| (p.branch_id, p.branch_name.as_deref()));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, Some(north));
        assert_eq!(groups[0].name, "Norte");
        assert_eq!(groups[0].totals.total_employees, 2);
        assert_eq!(groups[0].totals.net_payroll, dec!(3000));
        assert_eq!(groups[1].id, None);
        assert_eq!(groups[1].name, "Sem filial");
    }

    #[test]
    fn ranking_orders_by_minutes_and_respects_limit() {
        let payrolls = vec![
            payroll("Ana", None, Some(result(dec!(1000), dec!(0), dec!(0), 30, 3))),
            payroll("Bek", None, Some(result(dec!(1000), dec!(0), dec!(0), 90, 2))),
            payroll("Cid", None, Some(result(dec!(1000), dec!(0), dec!(0), 0, 0))),
            payroll("Dil", None, Some(result(dec!(1000), dec!(0), dec!(0), 30, 5))),
            payroll("Eva", None, None),
        ];

        let ranking = rank_lateness(&payrolls, 2);

        assert_eq!(ranking.len(), 2);
        assert_eq!((ranking[0].rank, ranking[0].full_name.as_str()), (1, "Bek"));
        // empate em minutos: mais dias atrasados primeiro
        assert_eq!((ranking[1].rank, ranking[1].full_name.as_str()), (2, "Dil"));
        assert_eq!(ranking[0].auto_late_penalty, dec!(90000));
    }

    #[test]
    fn ranking_ignores_punctual_employees() {
        let payrolls = vec![payroll("Ana", None, Some(result(dec!(1000), dec!(0), dec!(0), 0, 0)))];
        assert!(rank_lateness(&payrolls, 10).is_empty());
    }

    #[test]
    fn report_futures_are_send() {
        // As rotas do axum exigem futures Send para qualquer tempo de vida dos argumentos
        fn assert_send<T: Send>(_: &T) {}
        fn check(service: &PayrollService, ctx: &CompanyContext, filter: &PayrollFilter, day: NaiveDate) {
            assert_send(&service.bulk_calculate(ctx, day, day, filter));
            assert_send(&service.monthly_report(ctx, 2025, 2));
            assert_send(&service.payroll_summary(ctx, day, day));
            assert_send(&service.late_ranking(ctx, day, day, 10));
        }
        let _ = check;
    }
}
