// src/services/report_service.rs

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        time::{company_timezone, today_in},
    },
    db::{
        penalty_repo::PenaltyFilter, AttendanceRepository, BonusRepository, EmployeeRepository,
        LeaveRepository, PenaltyRepository, ScheduleRepository, SettingsRepository,
    },
    middleware::tenancy::CompanyContext,
    models::{
        attendance::{
            AbsentEmployee, AttendanceCalendar, AttendanceRanking, AttendanceRankingEntry, AttendanceRecord,
            CalendarDay, CalendarSummary, DailyAbsences, DailyLateness, DailyStatistics, DayStatus, LateEmployee,
        },
        bonus::Bonus,
        employee::Employee,
        leave::{LeaveRecord, LeaveType},
        penalty::Penalty,
        schedule::{DaySchedule, ScheduleEntry},
    },
    services::{
        bonus_service::group_schedules,
        payroll_engine::validate_range,
        schedule_resolver::ScheduleResolver,
    },
};

/// Maior período aceito no calendário individual.
pub const MAX_CALENDAR_DAYS: i64 = 366;

// =============================================================================
//  CLASSIFICAÇÃO DO DIA (pura)
// =============================================================================

/// Situação do funcionário na data. Registro de ponto manda; sem ponto vale,
/// nesta ordem: admissão, licença, folga da escala, dia futuro, falta.
pub fn classify_day(
    date: NaiveDate,
    today: NaiveDate,
    employee: &Employee,
    schedule: &DaySchedule,
    record: Option<&AttendanceRecord>,
    leave: Option<LeaveType>,
) -> DayStatus {
    if let Some(record) = record {
        return if record.late_minutes > 0 { DayStatus::Late } else { DayStatus::OnTime };
    }
    if employee.hire_date.is_some_and(|hire| date < hire) {
        return DayStatus::BeforeHire;
    }
    match leave {
        Some(LeaveType::Rest) => DayStatus::Rest,
        Some(LeaveType::Sick) => DayStatus::Sick,
        None if schedule.is_day_off => DayStatus::DayOff,
        None if date > today => DayStatus::Pending,
        None => DayStatus::Absent,
    }
}

fn work_hours(record: &AttendanceRecord) -> Decimal {
    (Decimal::from(record.total_work_minutes) / Decimal::from(60)).round_dp(2)
}

fn tally(summary: &mut CalendarSummary, status: DayStatus) {
    match status {
        DayStatus::OnTime => {
            summary.present_days += 1;
            summary.on_time_days += 1;
        }
        DayStatus::Late => {
            summary.present_days += 1;
            summary.late_days += 1;
        }
        DayStatus::Absent => summary.absent_days += 1,
        DayStatus::Rest | DayStatus::Sick => summary.leave_days += 1,
        DayStatus::DayOff => summary.off_days += 1,
        DayStatus::BeforeHire | DayStatus::Pending => {}
    }
}

/// Monta o calendário dia a dia de um funcionário em [start, end].
pub fn build_calendar(
    employee: &Employee,
    schedule: &ScheduleResolver,
    records: &[AttendanceRecord],
    leaves: &[LeaveRecord],
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> AttendanceCalendar {
    let record_by_date: HashMap<NaiveDate, &AttendanceRecord> = records.iter().map(|r| (r.date, r)).collect();
    let leave_by_date: HashMap<NaiveDate, LeaveType> = leaves.iter().map(|l| (l.date, l.leave_type)).collect();

    let mut summary = CalendarSummary::default();
    let days: Vec<CalendarDay> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| {
            let record = record_by_date.get(&date).copied();
            let status = classify_day(
                date,
                today,
                employee,
                &schedule.resolve(date),
                record,
                leave_by_date.get(&date).copied(),
            );
            tally(&mut summary, status);

            CalendarDay {
                date,
                day_of_week: date.weekday().number_from_monday(),
                status,
                check_in_time: record.and_then(|r| r.check_in_time),
                check_out_time: record.and_then(|r| r.check_out_time),
                late_minutes: record.map_or(0, |r| r.late_minutes),
                work_hours: record.map_or(Decimal::ZERO, work_hours),
                overtime_minutes: record.map_or(0, |r| r.overtime_minutes),
            }
        })
        .collect();

    AttendanceCalendar {
        employee_id: employee.id,
        full_name: employee.full_name.clone(),
        start_date: start,
        end_date: end,
        total_days: days.len() as u32,
        summary,
        days,
    }
}

// =============================================================================
//  RETRATO DO DIA (puro)
// =============================================================================

/// Um funcionário ativo numa data, já classificado.
#[derive(Debug, Clone)]
pub struct EmployeeDay<'a> {
    pub employee: &'a Employee,
    pub schedule: DaySchedule,
    pub record: Option<&'a AttendanceRecord>,
    pub status: DayStatus,
}

pub fn snapshot_day<'a>(
    date: NaiveDate,
    today: NaiveDate,
    employees: &'a [Employee],
    schedules: &HashMap<Uuid, Vec<ScheduleEntry>>,
    records: &'a [AttendanceRecord],
    leaves: &[LeaveRecord],
) -> Vec<EmployeeDay<'a>> {
    let record_by_employee: HashMap<Uuid, &AttendanceRecord> = records
        .iter()
        .filter(|r| r.date == date)
        .map(|r| (r.employee_id, r))
        .collect();
    let leave_by_employee: HashMap<Uuid, LeaveType> = leaves
        .iter()
        .filter(|l| l.date == date)
        .map(|l| (l.employee_id, l.leave_type))
        .collect();

    employees
        .iter()
        .map(|employee| {
            let rows = schedules.get(&employee.id).map(Vec::as_slice).unwrap_or(&[]);
            let schedule = ScheduleResolver::new(employee, rows).resolve(date);
            let record = record_by_employee.get(&employee.id).copied();
            let status = classify_day(
                date,
                today,
                employee,
                &schedule,
                record,
                leave_by_employee.get(&employee.id).copied(),
            );
            EmployeeDay { employee, schedule, record, status }
        })
        .collect()
}

/// Multas ativas (nem perdoadas nem justificadas) entram no total do dia.
pub fn daily_statistics(date: NaiveDate, days: &[EmployeeDay<'_>], penalties: &[Penalty]) -> DailyStatistics {
    let count = |pred: fn(DayStatus) -> bool| days.iter().filter(|d| pred(d.status)).count() as u32;

    DailyStatistics {
        date,
        total_employees: days.len() as u32,
        present: count(DayStatus::is_present),
        on_time: count(|s| s == DayStatus::OnTime),
        late: count(|s| s == DayStatus::Late),
        absent: count(|s| s == DayStatus::Absent),
        on_leave: count(DayStatus::is_leave),
        off_duty: count(|s| matches!(s, DayStatus::DayOff | DayStatus::BeforeHire | DayStatus::Pending)),
        total_penalties: penalties
            .iter()
            .filter(|p| p.date == date && !p.is_waived && !p.is_excused)
            .map(|p| p.amount)
            .sum(),
    }
}

pub fn absent_employees(date: NaiveDate, days: &[EmployeeDay<'_>]) -> DailyAbsences {
    let mut employees: Vec<AbsentEmployee> = days
        .iter()
        .filter(|d| d.status == DayStatus::Absent)
        .map(|d| AbsentEmployee {
            employee_id: d.employee.id,
            employee_no: d.employee.employee_no.clone(),
            full_name: d.employee.full_name.clone(),
            department_name: d.employee.department_name.clone(),
        })
        .collect();
    employees.sort_by(|a, b| a.full_name.cmp(&b.full_name));

    DailyAbsences {
        date,
        total_absent: employees.len() as u32,
        employees,
    }
}

/// Atrasados do dia, do maior atraso para o menor.
pub fn late_employees(date: NaiveDate, days: &[EmployeeDay<'_>]) -> DailyLateness {
    let mut employees: Vec<LateEmployee> = days
        .iter()
        .filter(|d| d.status == DayStatus::Late)
        .filter_map(|d| {
            let record = d.record?;
            Some(LateEmployee {
                employee_id: d.employee.id,
                employee_no: d.employee.employee_no.clone(),
                full_name: d.employee.full_name.clone(),
                department_name: d.employee.department_name.clone(),
                check_in_time: record.check_in_time,
                late_minutes: record.late_minutes,
                scheduled_start: d.schedule.work_start,
            })
        })
        .collect();
    employees.sort_by(|a, b| b.late_minutes.cmp(&a.late_minutes).then_with(|| a.full_name.cmp(&b.full_name)));

    DailyLateness {
        date,
        total_late: employees.len() as u32,
        employees,
    }
}

// =============================================================================
//  RANKING DE PONTUALIDADE (puro)
// =============================================================================

/// Percentual de dias sem atraso, com duas casas.
pub fn attendance_rate(on_time_days: u32, total_days: u32) -> Decimal {
    if total_days == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(on_time_days) * Decimal::from(100) / Decimal::from(total_days)).round_dp(2)
}

/// Só entra quem tem ao menos um registro no período.
/// Ordem: taxa desc, minutos de atraso asc, nome.
pub fn rank_attendance(
    employees: &[Employee],
    records: &[AttendanceRecord],
    bonuses: &[Bonus],
    limit: usize,
) -> AttendanceRanking {
    let mut by_employee: HashMap<Uuid, Vec<&AttendanceRecord>> = HashMap::new();
    for record in records {
        by_employee.entry(record.employee_id).or_default().push(record);
    }
    let mut bonus_by_employee: HashMap<Uuid, Decimal> = HashMap::new();
    for bonus in bonuses {
        *bonus_by_employee.entry(bonus.employee_id).or_insert(Decimal::ZERO) += bonus.amount;
    }

    let mut entries: Vec<AttendanceRankingEntry> = employees
        .iter()
        .filter_map(|employee| {
            let days = by_employee.get(&employee.id)?;
            let total_days = days.len() as u32;
            let late_days = days.iter().filter(|r| r.late_minutes > 0).count() as u32;
            let on_time_days = total_days - late_days;
            Some(AttendanceRankingEntry {
                rank: 0,
                employee_id: employee.id,
                employee_no: employee.employee_no.clone(),
                full_name: employee.full_name.clone(),
                branch_id: employee.branch_id,
                total_days,
                on_time_days,
                late_days,
                total_late_minutes: days.iter().map(|r| i64::from(r.late_minutes.max(0))).sum(),
                attendance_rate: attendance_rate(on_time_days, total_days),
                bonus_amount: bonus_by_employee.get(&employee.id).copied().unwrap_or(Decimal::ZERO),
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.attendance_rate
            .cmp(&a.attendance_rate)
            .then(a.total_late_minutes.cmp(&b.total_late_minutes))
            .then_with(|| a.full_name.cmp(&b.full_name))
    });

    let total_count = entries.len() as u32;
    entries.truncate(limit);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }

    AttendanceRanking { ranking: entries, total_count }
}

// =============================================================================
//  SERVIÇO
// =============================================================================

/// Dados brutos de um dia da empresa, antes da classificação.
struct CompanyDay {
    today: NaiveDate,
    employees: Vec<Employee>,
    schedules: HashMap<Uuid, Vec<ScheduleEntry>>,
    records: Vec<AttendanceRecord>,
    leaves: Vec<LeaveRecord>,
}

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
    employee_repo: EmployeeRepository,
    schedule_repo: ScheduleRepository,
    attendance_repo: AttendanceRepository,
    leave_repo: LeaveRepository,
    penalty_repo: PenaltyRepository,
    bonus_repo: BonusRepository,
    settings_repo: SettingsRepository,
    default_tz: Tz,
}

impl ReportService {
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
        }
    }

    pub async fn today(&self, company_id: Uuid) -> Result<NaiveDate, AppError> {
        let settings = self.settings_repo.get(company_id).await?;
        Ok(today_in(company_timezone(settings.as_ref(), self.default_tz)))
    }

    async fn load_day(&self, company_id: Uuid, date: NaiveDate) -> Result<CompanyDay, AppError> {
        let (today, employees, records, leaves) = futures::try_join!(
            self.today(company_id),
            self.employee_repo.list_active(&self.pool, company_id, None, None),
            self.attendance_repo.list_for_company_day(company_id, date),
            self.leave_repo.list_for_company_day(company_id, date),
        )?;

        // Escalas de todos numa consulta só
        let ids: Vec<Uuid> = employees.iter().map(|e| e.id).collect();
        let schedules = group_schedules(self.schedule_repo.list_for_employees(&ids).await?);

        Ok(CompanyDay { today, employees, schedules, records, leaves })
    }

    pub async fn daily_statistics(&self, ctx: &CompanyContext, date: NaiveDate) -> Result<DailyStatistics, AppError> {
        let filter = PenaltyFilter {
            start: Some(date),
            end: Some(date),
            only_active: true,
            ..PenaltyFilter::default()
        };
        let (day, penalties) = futures::try_join!(
            self.load_day(ctx.company_id, date),
            self.penalty_repo.list(ctx.company_id, &filter),
        )?;

        let days = snapshot_day(date, day.today, &day.employees, &day.schedules, &day.records, &day.leaves);
        Ok(daily_statistics(date, &days, &penalties))
    }

    pub async fn absent_employees(&self, ctx: &CompanyContext, date: NaiveDate) -> Result<DailyAbsences, AppError> {
        let day = self.load_day(ctx.company_id, date).await?;
        let days = snapshot_day(date, day.today, &day.employees, &day.schedules, &day.records, &day.leaves);
        Ok(absent_employees(date, &days))
    }

    pub async fn late_employees(&self, ctx: &CompanyContext, date: NaiveDate) -> Result<DailyLateness, AppError> {
        let day = self.load_day(ctx.company_id, date).await?;
        let days = snapshot_day(date, day.today, &day.employees, &day.schedules, &day.records, &day.leaves);
        Ok(late_employees(date, &days))
    }

    pub async fn employee_calendar(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AttendanceCalendar, AppError> {
        // 1. Período
        validate_range(start, end)?;
        if (end - start).num_days() >= MAX_CALENDAR_DAYS {
            return Err(AppError::BadRequest(format!(
                "Período do calendário limitado a {} dias",
                MAX_CALENDAR_DAYS
            )));
        }

        // 2. Funcionário
        let employee = self
            .employee_repo
            .find_by_id(&self.pool, ctx.company_id, employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;

        // 3. Fatos do período
        let (today, rows, records, leaves) = futures::try_join!(
            self.today(ctx.company_id),
            self.schedule_repo.list_for_employee(&self.pool, employee.id),
            self.attendance_repo.list_for_employee(&self.pool, employee.id, start, end),
            self.leave_repo.list_for_employee(&self.pool, employee.id, start, end),
        )?;

        let schedule = ScheduleResolver::new(&employee, &rows);
        Ok(build_calendar(&employee, &schedule, &records, &leaves, start, end, today))
    }

    pub async fn attendance_ranking(
        &self,
        ctx: &CompanyContext,
        start: NaiveDate,
        end: NaiveDate,
        branch_id: Option<Uuid>,
        limit: usize,
    ) -> Result<AttendanceRanking, AppError> {
        validate_range(start, end)?;

        let (employees, records, bonuses) = futures::try_join!(
            self.employee_repo.list_active(&self.pool, ctx.company_id, branch_id, None),
            self.attendance_repo.list_for_company_range(ctx.company_id, start, end),
            self.bonus_repo.list(ctx.company_id, None, Some(start), Some(end)),
        )?;

        tracing::debug!(
            "Ranking de pontualidade: {} funcionários, {} registros",
            employees.len(),
            records.len()
        );
        Ok(rank_attendance(&employees, &records, &bonuses, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use crate::models::{
        bonus::BonusType,
        employee::{EmployeeStatus, SalaryType},
        penalty::PenaltyType,
    };

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
    }

    fn employee(name: &str, hire_date: Option<NaiveDate>) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            branch_id: None,
            department_id: None,
            employee_no: name.to_lowercase(),
            full_name: name.into(),
            base_salary: None,
            salary_type: SalaryType::Monthly,
            work_start_time: None,
            work_end_time: None,
            lunch_break_minutes: 60,
            hire_date,
            status: EmployeeStatus::Active,
            branch_name: None,
            department_name: Some("Produção".into()),
        }
    }

    fn record(employee: &Employee, date: NaiveDate, late_minutes: i32) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: employee.id,
            branch_id: None,
            date,
            check_in_time: Some(Utc.with_ymd_and_hms(2025, 2, date.day(), 4, 0, 0).unwrap()),
            check_out_time: None,
            late_minutes,
            early_leave_minutes: 0,
            total_work_minutes: 510,
            overtime_minutes: 0,
            device_name: None,
            ip_address: None,
            verify_mode: None,
            created_at: Utc::now(),
        }
    }

    fn leave(employee: &Employee, date: NaiveDate, leave_type: LeaveType) -> LeaveRecord {
        LeaveRecord {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: employee.id,
            date,
            leave_type,
            reason: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    fn penalty(date: NaiveDate, amount: Decimal, is_waived: bool) -> Penalty {
        Penalty {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: Uuid::nil(),
            attendance_id: None,
            penalty_type: PenaltyType::Late,
            amount,
            late_minutes: None,
            reason: None,
            date,
            is_auto: false,
            created_by: None,
            is_waived,
            waived_by: None,
            waived_at: None,
            waive_reason: None,
            is_excused: false,
            excused_by: None,
            excused_at: None,
            excuse_reason: None,
            created_at: Utc::now(),
        }
    }

    fn bonus(employee: &Employee, amount: Decimal) -> Bonus {
        Bonus {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: employee.id,
            bonus_type: BonusType::Manual,
            amount,
            reason: None,
            date: d(28),
            given_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn record_wins_over_every_other_status() {
        let emp = employee("Ana", Some(d(10)));
        let workday = ScheduleResolver::default_policy().resolve(d(5));
        let rec = record(&emp, d(5), 12);

        // Mesmo antes da admissão e com licença, quem bateu ponto está presente
        let status = classify_day(d(5), d(28), &emp, &workday, Some(&rec), Some(LeaveType::Sick));
        assert_eq!(status, DayStatus::Late);
    }

    #[test]
    fn days_without_record_follow_hire_leave_off_and_future_order() {
        let emp = employee("Ana", Some(d(3)));
        let resolver = ScheduleResolver::default_policy();
        let classify = |date: NaiveDate, leave: Option<LeaveType>| {
            classify_day(date, d(12), &emp, &resolver.resolve(date), None, leave)
        };

        // 2025-02-01 é sábado, 2025-02-08 também
        assert_eq!(classify(d(1), Some(LeaveType::Rest)), DayStatus::BeforeHire);
        assert_eq!(classify(d(4), Some(LeaveType::Rest)), DayStatus::Rest);
        assert_eq!(classify(d(5), Some(LeaveType::Sick)), DayStatus::Sick);
        assert_eq!(classify(d(8), None), DayStatus::DayOff);
        assert_eq!(classify(d(11), None), DayStatus::Absent);
        assert_eq!(classify(d(13), None), DayStatus::Pending);
    }

    #[test]
    fn calendar_walks_every_day_and_tallies_the_summary() {
        let emp = employee("Ana", None);
        let resolver = ScheduleResolver::default_policy();
        // Semana de 03/02 (segunda) a 09/02 (domingo)
        let records = vec![record(&emp, d(3), 0), record(&emp, d(4), 25)];
        let leaves = vec![leave(&emp, d(5), LeaveType::Sick)];

        let calendar = build_calendar(&emp, &resolver, &records, &leaves, d(3), d(9), d(28));

        assert_eq!(calendar.total_days, 7);
        assert_eq!(calendar.days[0].day_of_week, 1);
        assert_eq!(calendar.days[0].work_hours, dec!(8.5));
        assert_eq!(calendar.days[1].late_minutes, 25);
        assert_eq!(
            calendar.summary,
            CalendarSummary {
                present_days: 2,
                on_time_days: 1,
                late_days: 1,
                absent_days: 2,
                leave_days: 1,
                off_days: 2,
            }
        );
    }

    #[test]
    fn daily_numbers_split_the_active_staff() {
        let on_time = employee("Ana", None);
        let late = employee("Bruno", None);
        let sick = employee("Carla", None);
        let absent = employee("Davi", None);
        let new_hire = employee("Eva", Some(d(20)));
        let employees = vec![on_time.clone(), late.clone(), sick.clone(), absent.clone(), new_hire];
        let records = vec![record(&on_time, d(10), 0), record(&late, d(10), 40)];
        let leaves = vec![leave(&sick, d(10), LeaveType::Sick)];
        let penalties = vec![
            penalty(d(10), dec!(20000), false),
            penalty(d(10), dec!(5000), true),
            penalty(d(11), dec!(7000), false),
        ];

        let days = snapshot_day(d(10), d(10), &employees, &HashMap::new(), &records, &leaves);
        let stats = daily_statistics(d(10), &days, &penalties);

        assert_eq!(stats.total_employees, 5);
        assert_eq!(stats.present, 2);
        assert_eq!(stats.on_time, 1);
        assert_eq!(stats.late, 1);
        assert_eq!(stats.on_leave, 1);
        assert_eq!(stats.absent, 1);
        assert_eq!(stats.off_duty, 1);
        assert_eq!(stats.total_penalties, dec!(20000));

        let absences = absent_employees(d(10), &days);
        assert_eq!(absences.total_absent, 1);
        assert_eq!(absences.employees[0].employee_id, absent.id);

        let lateness = late_employees(d(10), &days);
        assert_eq!(lateness.total_late, 1);
        assert_eq!(lateness.employees[0].late_minutes, 40);
        assert_eq!(lateness.employees[0].scheduled_start, Some(crate::services::schedule_resolver::DEFAULT_WORK_START));
    }

    #[test]
    fn ranking_sorts_by_rate_then_late_minutes() {
        let ana = employee("Ana", None);
        let bruno = employee("Bruno", None);
        let carla = employee("Carla", None);
        let idle = employee("Davi", None);
        let records = vec![
            record(&ana, d(3), 0),
            record(&ana, d(4), 10),
            record(&bruno, d(3), 0),
            record(&bruno, d(4), 0),
            record(&carla, d(3), 0),
            record(&carla, d(4), 5),
        ];
        let bonuses = vec![bonus(&bruno, dec!(300)), bonus(&bruno, dec!(200))];
        let employees = vec![ana.clone(), bruno.clone(), carla.clone(), idle];

        let ranking = rank_attendance(&employees, &records, &bonuses, 20);

        assert_eq!(ranking.total_count, 3);
        assert_eq!(ranking.ranking[0].employee_id, bruno.id);
        assert_eq!(ranking.ranking[0].attendance_rate, dec!(100));
        assert_eq!(ranking.ranking[0].bonus_amount, dec!(500));
        // Mesma taxa (50%): menos minutos de atraso fica na frente
        assert_eq!(ranking.ranking[1].employee_id, carla.id);
        assert_eq!(ranking.ranking[2].employee_id, ana.id);
        assert_eq!(ranking.ranking[2].rank, 3);

        let top = rank_attendance(&employees, &records, &bonuses, 1);
        assert_eq!(top.ranking.len(), 1);
        assert_eq!(top.total_count, 3);
    }

    #[test]
    fn rate_is_rounded_and_safe_without_days() {
        assert_eq!(attendance_rate(2, 3), dec!(66.67));
        assert_eq!(attendance_rate(0, 0), Decimal::ZERO);
    }
}
