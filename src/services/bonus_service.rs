// src/services/bonus_service.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        time::{company_timezone, local_instant, today_in},
    },
    db::{
        AttendanceRepository, BonusRepository, EmployeeRepository, LeaveRepository, ScheduleRepository,
        SettingsRepository,
    },
    middleware::tenancy::CompanyContext,
    models::{
        attendance::AttendanceRecord,
        bonus::{AutoBonusOutcome, Bonus, BonusLeaderboardEntry, BonusSummary, BonusType, BonusTypeTotal, NewBonus},
        employee::Employee,
        schedule::ScheduleEntry,
    },
    services::schedule_resolver::{month_bounds, ScheduleResolver},
};

pub const DEFAULT_EARLY_THRESHOLD_MINUTES: i64 = 15;
pub const DEFAULT_EARLY_MIN_DAYS: u32 = 10;

// =============================================================================
//  REGRAS PURAS
// =============================================================================

pub fn summarize_bonuses(bonuses: &[Bonus]) -> BonusSummary {
    let mut by_type: HashMap<BonusType, (i64, Decimal)> = HashMap::new();
    for bonus in bonuses {
        let entry = by_type.entry(bonus.bonus_type).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += bonus.amount;
    }

    let mut by_type: Vec<BonusTypeTotal> = by_type
        .into_iter()
        .map(|(bonus_type, (count, amount))| BonusTypeTotal { bonus_type, count, amount })
        .collect();
    by_type.sort_by(|a, b| b.amount.cmp(&a.amount));

    BonusSummary {
        total_count: bonuses.len() as i64,
        total_amount: bonuses.iter().map(|b| b.amount).sum(),
        by_type,
    }
}

/// Presença perfeita: nenhum atraso nem saída antecipada, e cada dia esperado
/// coberto por ponto ou licença.
pub fn is_perfect_attendance(records: &[AttendanceRecord], leave_days: u32, expected_days: u32) -> bool {
    expected_days > 0
        && records.iter().all(|r| r.late_minutes == 0 && r.early_leave_minutes == 0)
        && records.len() as u32 + leave_days >= expected_days
}

/// Dias em que a entrada foi pelo menos `threshold_minutes` antes do início da escala.
pub fn count_early_arrivals(
    records: &[AttendanceRecord],
    resolver: &ScheduleResolver,
    threshold_minutes: i64,
    tz: Tz,
) -> u32 {
    records
        .iter()
        .filter(|r| {
            let day = resolver.resolve(r.date);
            if day.is_day_off {
                return false;
            }
            let scheduled = day.work_start.and_then(|start| local_instant(r.date, start, tz));
            match (r.check_in_time, scheduled) {
                (Some(check_in), Some(start)) => (start - check_in).num_minutes() >= threshold_minutes,
                _ => false,
            }
        })
        .count() as u32
}

/// Ranking por valor recebido. Só entram os funcionários da lista (filtro de filial).
/// Empate no valor: mais bônus primeiro, depois o nome.
pub fn bonus_leaderboard(employees: &[Employee], bonuses: &[Bonus], limit: usize) -> Vec<BonusLeaderboardEntry> {
    let mut totals: HashMap<Uuid, (u32, Decimal)> = HashMap::new();
    for bonus in bonuses {
        let entry = totals.entry(bonus.employee_id).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += bonus.amount;
    }

    let mut rows: Vec<(&Employee, u32, Decimal)> = employees
        .iter()
        .filter_map(|e| totals.get(&e.id).map(|(count, amount)| (e, *count, *amount)))
        .collect();
    rows.sort_by(|(ea, ca, aa), (eb, cb, ab)| {
        ab.cmp(aa).then(cb.cmp(ca)).then_with(|| ea.full_name.cmp(&eb.full_name))
    });

    rows.into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (employee, bonus_count, total_amount))| BonusLeaderboardEntry {
            rank: i as u32 + 1,
            employee_id: employee.id,
            employee_no: employee.employee_no.clone(),
            full_name: employee.full_name.clone(),
            branch_id: employee.branch_id,
            bonus_count,
            total_amount,
        })
        .collect()
}

/// Agrupa as escalas (carregadas numa única consulta) por funcionário.
pub fn group_schedules(rows: Vec<ScheduleEntry>) -> HashMap<Uuid, Vec<ScheduleEntry>> {
    let mut grouped: HashMap<Uuid, Vec<ScheduleEntry>> = HashMap::new();
    for row in rows {
        grouped.entry(row.employee_id).or_default().push(row);
    }
    grouped
}

/// Parâmetros dos bônus automáticos.
#[derive(Debug, Clone)]
pub struct AutoBonusRequest {
    pub year: i32,
    pub month: u32,
    pub amount: Decimal,
    pub employee_ids: Option<Vec<Uuid>>,
    pub threshold_minutes: Option<i64>,
    pub min_days: Option<u32>,
}

impl AutoBonusRequest {
    fn month_bounds(&self) -> Result<(NaiveDate, NaiveDate), AppError> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| AppError::BadRequest(format!("Mês inválido: {}-{}", self.year, self.month)))?;
        Ok(month_bounds(first))
    }
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct BonusService {
    pool: PgPool,
    bonus_repo: BonusRepository,
    employee_repo: EmployeeRepository,
    attendance_repo: AttendanceRepository,
    leave_repo: LeaveRepository,
    schedule_repo: ScheduleRepository,
    settings_repo: SettingsRepository,
    default_tz: Tz,
}

impl BonusService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        bonus_repo: BonusRepository,
        employee_repo: EmployeeRepository,
        attendance_repo: AttendanceRepository,
        leave_repo: LeaveRepository,
        schedule_repo: ScheduleRepository,
        settings_repo: SettingsRepository,
        default_tz: Tz,
    ) -> Self {
        Self { pool, bonus_repo, employee_repo, attendance_repo, leave_repo, schedule_repo, settings_repo, default_tz }
    }

    pub async fn create(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        bonus_type: BonusType,
        amount: Decimal,
        date: NaiveDate,
        reason: Option<String>,
    ) -> Result<Bonus, AppError> {
        let created = self.bulk_create(ctx, &[employee_id], bonus_type, amount, date, reason).await?;
        created.into_iter().next().ok_or(AppError::EmployeeNotFound)
    }

    /// Mesmo bônus para vários funcionários, tudo ou nada.
    pub async fn bulk_create(
        &self,
        ctx: &CompanyContext,
        employee_ids: &[Uuid],
        bonus_type: BonusType,
        amount: Decimal,
        date: NaiveDate,
        reason: Option<String>,
    ) -> Result<Vec<Bonus>, AppError> {
        if amount < Decimal::ZERO {
            return Err(AppError::BadRequest("Valor do bônus não pode ser negativo.".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(employee_ids.len());

        for employee_id in employee_ids {
            if !self.employee_repo.lock(&mut *tx, ctx.company_id, *employee_id).await? {
                return Err(AppError::EmployeeNotFound);
            }
            let new = NewBonus {
                employee_id: *employee_id,
                bonus_type,
                amount: amount.round_dp(2),
                reason: reason.clone(),
                date,
                given_by: Some(ctx.user_id),
            };
            created.push(self.bonus_repo.create(&mut *tx, ctx.company_id, &new).await?);
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn list(
        &self,
        ctx: &CompanyContext,
        employee_id: Option<Uuid>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bonus>, AppError> {
        self.bonus_repo.list(ctx.company_id, employee_id, start, end).await
    }

    pub async fn delete(&self, ctx: &CompanyContext, id: Uuid) -> Result<(), AppError> {
        if self.bonus_repo.delete(ctx.company_id, id).await? == 0 {
            return Err(AppError::ResourceNotFound("Bônus"));
        }
        Ok(())
    }

    pub async fn summary(
        &self,
        ctx: &CompanyContext,
        employee_id: Option<Uuid>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<BonusSummary, AppError> {
        let bonuses = self.bonus_repo.list(ctx.company_id, employee_id, start, end).await?;
        Ok(summarize_bonuses(&bonuses))
    }

    pub async fn leaderboard(
        &self,
        ctx: &CompanyContext,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        branch_id: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<BonusLeaderboardEntry>, AppError> {
        let (employees, bonuses) = futures::try_join!(
            self.employee_repo.list_active(&self.pool, ctx.company_id, branch_id, None),
            self.bonus_repo.list(ctx.company_id, None, start, end),
        )?;
        Ok(bonus_leaderboard(&employees, &bonuses, limit))
    }

    async fn target_employees(&self, ctx: &CompanyContext, ids: Option<&[Uuid]>) -> Result<Vec<Employee>, AppError> {
        self.employee_repo.list_active(&self.pool, ctx.company_id, None, ids).await
    }

    /// Bônus de presença perfeita do mês. Quem já recebeu no mês é pulado.
    pub async fn auto_perfect_attendance(
        &self,
        ctx: &CompanyContext,
        request: &AutoBonusRequest,
    ) -> Result<Vec<AutoBonusOutcome>, AppError> {
        let (month_start, month_end) = request.month_bounds()?;
        let settings = self.settings_repo.get(ctx.company_id).await?;
        let today = today_in(company_timezone(settings.as_ref(), self.default_tz));

        let employees = self.target_employees(ctx, request.employee_ids.as_deref()).await?;
        let ids: Vec<Uuid> = employees.iter().map(|e| e.id).collect();
        let mut schedules = group_schedules(self.schedule_repo.list_for_employees(&ids).await?);

        let mut outcomes = Vec::with_capacity(employees.len());
        for employee in employees {
            let rows = schedules.remove(&employee.id).unwrap_or_default();
            let resolver = ScheduleResolver::new(&employee, &rows);

            let start = employee.hire_date.map_or(month_start, |hire| hire.max(month_start));
            let end = month_end.min(today);
            let expected = resolver.count_expected_days(start, end);

            let records = self.attendance_repo.list_for_employee(&self.pool, employee.id, month_start, month_end).await?;
            let leaves = self.leave_repo.list_for_employee(&self.pool, employee.id, month_start, month_end).await?;

            let outcome = if !is_perfect_attendance(&records, leaves.len() as u32, expected) {
                skipped(&employee, "nao_elegivel")
            } else if self.bonus_repo
                .exists_of_type(&self.pool, employee.id, BonusType::PerfectAttendance, month_start, month_end)
                .await?
            {
                skipped(&employee, "ja_existe")
            } else {
                let new = NewBonus {
                    employee_id: employee.id,
                    bonus_type: BonusType::PerfectAttendance,
                    amount: request.amount.round_dp(2),
                    reason: Some(format!("Presença perfeita {}-{:02}", request.year, request.month)),
                    date: month_end,
                    given_by: Some(ctx.user_id),
                };
                let bonus = self.bonus_repo.create(&self.pool, ctx.company_id, &new).await?;
                awarded(&employee, bonus)
            };
            outcomes.push(outcome);
        }

        tracing::info!(
            "Presença perfeita {}-{:02}: {} premiado(s)",
            request.year,
            request.month,
            outcomes.iter().filter(|o| o.awarded).count()
        );
        Ok(outcomes)
    }

    /// Bônus de chegada antecipada: escalas carregadas uma vez, antes do laço de dias.
    pub async fn auto_early_arrival(
        &self,
        ctx: &CompanyContext,
        request: &AutoBonusRequest,
    ) -> Result<Vec<AutoBonusOutcome>, AppError> {
        let (month_start, month_end) = request.month_bounds()?;
        let threshold = request.threshold_minutes.unwrap_or(DEFAULT_EARLY_THRESHOLD_MINUTES);
        let min_days = request.min_days.unwrap_or(DEFAULT_EARLY_MIN_DAYS);

        let settings = self.settings_repo.get(ctx.company_id).await?;
        let tz = company_timezone(settings.as_ref(), self.default_tz);

        let employees = self.target_employees(ctx, request.employee_ids.as_deref()).await?;
        let ids: Vec<Uuid> = employees.iter().map(|e| e.id).collect();
        let mut schedules = group_schedules(self.schedule_repo.list_for_employees(&ids).await?);

        let mut outcomes = Vec::with_capacity(employees.len());
        for employee in employees {
            let rows = schedules.remove(&employee.id).unwrap_or_default();
            let resolver = ScheduleResolver::new(&employee, &rows);
            let records = self.attendance_repo.list_for_employee(&self.pool, employee.id, month_start, month_end).await?;

            let early_days = count_early_arrivals(&records, &resolver, threshold, tz);
            let outcome = if early_days < min_days {
                skipped(&employee, &format!("{}_dias", early_days))
            } else if self.bonus_repo
                .exists_of_type(&self.pool, employee.id, BonusType::EarlyArrival, month_start, month_end)
                .await?
            {
                skipped(&employee, "ja_existe")
            } else {
                let new = NewBonus {
                    employee_id: employee.id,
                    bonus_type: BonusType::EarlyArrival,
                    amount: request.amount.round_dp(2),
                    reason: Some(format!("Chegou {}+ min antes em {} dias", threshold, early_days)),
                    date: month_end,
                    given_by: Some(ctx.user_id),
                };
                let bonus = self.bonus_repo.create(&self.pool, ctx.company_id, &new).await?;
                awarded(&employee, bonus)
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

fn skipped(employee: &Employee, detail: &str) -> AutoBonusOutcome {
    AutoBonusOutcome {
        employee_id: employee.id,
        full_name: employee.full_name.clone(),
        awarded: false,
        detail: detail.to_string(),
        bonus: None,
    }
}

fn awarded(employee: &Employee, bonus: Bonus) -> AutoBonusOutcome {
    AutoBonusOutcome {
        employee_id: employee.id,
        full_name: employee.full_name.clone(),
        awarded: true,
        detail: "concedido".to_string(),
        bonus: Some(bonus),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::Asia::Tashkent;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
    }

    fn tashkent(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Tashkent.with_ymd_and_hms(2025, 2, day, hour, min, 0).unwrap().with_timezone(&Utc)
    }

    fn record(day: u32, check_in: Option<(u32, u32)>, late: i32, early_leave: i32) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: Uuid::nil(),
            branch_id: None,
            date: d(day),
            check_in_time: check_in.map(|(h, m)| tashkent(day, h, m)),
            check_out_time: None,
            late_minutes: late,
            early_leave_minutes: early_leave,
            total_work_minutes: 480,
            overtime_minutes: 0,
            device_name: None,
            ip_address: None,
            verify_mode: None,
            created_at: Utc::now(),
        }
    }

    fn bonus(bonus_type: BonusType, amount: Decimal) -> Bonus {
        Bonus {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: Uuid::nil(),
            bonus_type,
            amount,
            reason: None,
            date: d(28),
            given_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn summary_groups_by_type() {
        let bonuses = vec![
            bonus(BonusType::Manual, dec!(100)),
            bonus(BonusType::Manual, dec!(50)),
            bonus(BonusType::PerfectAttendance, dec!(500)),
        ];

        let summary = summarize_bonuses(&bonuses);

        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.total_amount, dec!(650));
        assert_eq!(
            summary.by_type,
            vec![
                BonusTypeTotal { bonus_type: BonusType::PerfectAttendance, count: 1, amount: dec!(500) },
                BonusTypeTotal { bonus_type: BonusType::Manual, count: 2, amount: dec!(150) },
            ]
        );
    }

    #[test]
    fn perfect_attendance_needs_no_late_and_full_coverage() {
        let clean: Vec<_> = (3..=7).map(|day| record(day, Some((8, 55)), 0, 0)).collect();
        assert!(is_perfect_attendance(&clean, 0, 5));
        // um dia coberto por licença
        assert!(is_perfect_attendance(&clean[..4], 1, 5));
        assert!(!is_perfect_attendance(&clean[..4], 0, 5));

        let mut late = clean.clone();
        late[2].late_minutes = 3;
        assert!(!is_perfect_attendance(&late, 0, 5));

        let mut left_early = clean.clone();
        left_early[0].early_leave_minutes = 10;
        assert!(!is_perfect_attendance(&left_early, 0, 5));

        assert!(!is_perfect_attendance(&[], 0, 0));
    }

    #[test]
    fn early_arrivals_count_only_working_days_past_threshold() {
        let resolver = ScheduleResolver::default_policy();
        let records = vec![
            record(3, Some((8, 40)), 0, 0),  // 20 min antes
            record(4, Some((8, 45)), 0, 0),  // exatamente 15
            record(5, Some((8, 50)), 0, 0),  // só 10
            record(8, Some((7, 0)), 0, 0),   // sábado, folga
            record(10, None, 0, 0),          // sem entrada
        ];

        assert_eq!(count_early_arrivals(&records, &resolver, 15, Tashkent), 2);
        assert_eq!(count_early_arrivals(&records, &resolver, 5, Tashkent), 3);
    }

    #[test]
    fn schedules_are_grouped_per_employee() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let row = |employee_id, dow| ScheduleEntry {
            id: Uuid::new_v4(),
            employee_id,
            day_of_week: dow,
            work_start_time: None,
            work_end_time: None,
            is_day_off: true,
            updated_at: Utc::now(),
        };

        let grouped = group_schedules(vec![row(a, 1), row(b, 1), row(a, 2)]);

        assert_eq!(grouped[&a].len(), 2);
        assert_eq!(grouped[&b].len(), 1);
    }

    fn staff(name: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            branch_id: None,
            department_id: None,
            employee_no: name.to_lowercase(),
            full_name: name.into(),
            base_salary: None,
            salary_type: crate::models::employee::SalaryType::Monthly,
            work_start_time: None,
            work_end_time: None,
            lunch_break_minutes: 60,
            hire_date: None,
            status: crate::models::employee::EmployeeStatus::Active,
            branch_name: None,
            department_name: None,
        }
    }

    fn bonus_for(employee: &Employee, amount: Decimal) -> Bonus {
        Bonus {
            employee_id: employee.id,
            ..bonus(BonusType::Manual, amount)
        }
    }

    #[test]
    fn leaderboard_orders_by_amount_and_respects_the_employee_list() {
        let ana = staff("Ana");
        let bruno = staff("Bruno");
        let carla = staff("Carla");
        let outsider = staff("Fora");
        let bonuses = vec![
            bonus_for(&ana, dec!(100)),
            bonus_for(&ana, dec!(100)),
            bonus_for(&bruno, dec!(500)),
            bonus_for(&carla, dec!(200)),
            bonus_for(&outsider, dec!(9999)),
        ];
        let employees = vec![ana.clone(), bruno.clone(), carla.clone()];

        let board = bonus_leaderboard(&employees, &bonuses, 10);

        assert_eq!(board.len(), 3);
        assert_eq!(board[0].employee_id, bruno.id);
        assert_eq!(board[0].rank, 1);
        // Empate em 200: Ana tem dois bônus, fica na frente
        assert_eq!(board[1].employee_id, ana.id);
        assert_eq!(board[1].bonus_count, 2);
        assert_eq!(board[2].employee_id, carla.id);

        let top = bonus_leaderboard(&employees, &bonuses, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].total_amount, dec!(500));
    }
}
