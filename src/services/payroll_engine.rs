// src/services/payroll_engine.rs

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    common::error::AppError,
    models::{
        attendance::AttendanceRecord,
        bonus::Bonus,
        employee::{Employee, SalaryType},
        leave::{LeaveRecord, LeaveType},
        payroll::{
            BreakdownStep, CalculationMethod, Credits, DailyRateBasis, Deductions, ExcuseReason,
            ExcusedDay, ExcusedKind, LateDetail, LatenessSummary, LeaveDaysSummary, PeriodFacts,
            SalaryResult,
        },
        penalty::{Penalty, PenaltyType},
        settings::CompanySettings,
    },
    services::schedule_resolver::{month_bounds, ScheduleResolver},
};

pub const DEFAULT_CURRENCY: &str = "UZS";

/// Tudo o que o cálculo precisa, já buscado do banco.
/// O motor não faz I/O: os mesmos dados sempre dão o mesmo contracheque.
pub struct PayrollInput<'a> {
    pub employee: &'a Employee,
    pub schedule: &'a ScheduleResolver,
    pub settings: Option<&'a CompanySettings>,
    pub attendance: &'a [AttendanceRecord],
    pub leaves: &'a [LeaveRecord],
    pub penalties: &'a [Penalty],
    pub bonuses: &'a [Bonus],
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Data atual no fuso da empresa
    pub today: NaiveDate,
}

/// Validação feita na borda, antes de chamar o motor.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::InvalidRange { start, end });
    }
    Ok(())
}

fn money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Calcula o salário de um funcionário em [start_date, end_date].
///
/// Passos:
/// 1. diária ancorada no mês cheio da data inicial;
/// 2. período efetivo (admissão .. hoje) e dias esperados;
/// 3. dias e horas trabalhados no período bruto;
/// 4. classificação de atrasos (folga > antes da admissão > licença > contado);
/// 5. multa automática por minuto;
/// 6. faltas (só mensalista), licença conta como dia trabalhado;
/// 7. bruto, multas manuais ativas e bônus;
/// 8. líquido, nunca negativo.
pub fn calculate_salary(input: &PayrollInput<'_>) -> SalaryResult {
    let employee = input.employee;
    let schedule = input.schedule;
    let (start, end) = (input.start_date, input.end_date);
    let in_range = |date: NaiveDate| date >= start && date <= end;

    let base_salary = employee.base_salary.unwrap_or(Decimal::ZERO);
    let currency = input
        .settings
        .map(|s| s.currency.clone())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    // Sem configuração, tudo que depende dela vale zero.
    let auto_penalty_enabled = input.settings.is_some_and(|s| s.auto_penalty_enabled);
    let late_rate = match input.settings {
        Some(s) if s.auto_penalty_enabled && s.late_penalty_per_minute > Decimal::ZERO => {
            s.late_penalty_per_minute
        }
        _ => Decimal::ZERO,
    };
    let absence_rate = input
        .settings
        .map(|s| s.absence_penalty_amount.max(Decimal::ZERO))
        .unwrap_or(Decimal::ZERO);

    // 1. Base da diária: mês calendário inteiro da data inicial
    let (month_start, month_end) = month_bounds(start);
    let full_month_work_days = schedule.count_expected_days(month_start, month_end);
    let total_days = (month_end - month_start).num_days() as u32 + 1;

    let (calculation_method, daily_rate) = match employee.salary_type {
        SalaryType::Monthly => {
            let rate = if full_month_work_days == 0 {
                Decimal::ZERO
            } else {
                base_salary / Decimal::from(full_month_work_days)
            };
            (CalculationMethod::FullMonthBased, rate)
        }
        SalaryType::Daily => (CalculationMethod::Daily, base_salary),
    };

    // 2. Período efetivo
    let effective_start = match employee.hire_date {
        Some(hire) if hire > start => hire,
        _ => start,
    };
    let effective_end = end.min(input.today);
    let period_expected_days = schedule.count_expected_days(effective_start, effective_end);

    // 3. Dias e horas trabalhados (intervalo bruto pedido)
    let records: Vec<&AttendanceRecord> = input.attendance.iter().filter(|r| in_range(r.date)).collect();
    let worked_days = records.len() as u32;
    let total_work_minutes: i64 = records.iter().map(|r| i64::from(r.total_work_minutes.max(0))).sum();
    let total_work_hours = money(Decimal::from(total_work_minutes) / dec!(60));

    // Licenças do período
    let leave_by_date: HashMap<NaiveDate, LeaveType> = input
        .leaves
        .iter()
        .filter(|l| in_range(l.date))
        .map(|l| (l.date, l.leave_type))
        .collect();
    let leave_days = LeaveDaysSummary {
        total: leave_by_date.len() as u32,
        rest: leave_by_date.values().filter(|t| **t == LeaveType::Rest).count() as u32,
        sick: leave_by_date.values().filter(|t| **t == LeaveType::Sick).count() as u32,
    };

    // 4. Classificação dos atrasos
    let late_excuse = |date: NaiveDate| {
        if schedule.resolve(date).is_day_off {
            Some(ExcuseReason::OffDay)
        } else if employee.hire_date.is_some_and(|hire| date < hire) {
            Some(ExcuseReason::BeforeHireDate)
        } else {
            leave_by_date.get(&date).map(|t| ExcuseReason::from(*t))
        }
    };

    let mut late_details = Vec::new();
    let mut excused_days = Vec::new();
    let mut total_late_minutes: i64 = 0;

    for record in records.iter().filter(|r| r.late_minutes > 0) {
        match late_excuse(record.date) {
            Some(reason) => excused_days.push(ExcusedDay {
                date: record.date,
                kind: ExcusedKind::Late,
                reason,
                late_minutes: record.late_minutes,
                penalty_saved: money(Decimal::from(record.late_minutes) * late_rate),
            }),
            None => {
                total_late_minutes += i64::from(record.late_minutes);
                late_details.push(LateDetail {
                    date: record.date,
                    late_minutes: record.late_minutes,
                    check_in_time: record.check_in_time,
                });
            }
        }
    }

    // 5. Multa automática por atraso
    let auto_late_penalty = money(Decimal::from(total_late_minutes) * late_rate);

    // 6. Faltas (só mensalista)
    let worked_dates: HashSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    let (absence_days, absence_penalty) = match employee.salary_type {
        SalaryType::Monthly => {
            // Dia com ponto e licença já está em worked_days: não conta de novo
            let leave_count = leave_by_date.keys().filter(|d| !worked_dates.contains(d)).count() as u32;
            let absence = period_expected_days.saturating_sub(worked_days).saturating_sub(leave_count);

            for date in schedule.expected_dates(effective_start, effective_end) {
                if worked_dates.contains(&date) {
                    continue;
                }
                if let Some(leave_type) = leave_by_date.get(&date) {
                    excused_days.push(ExcusedDay {
                        date,
                        kind: ExcusedKind::Absence,
                        reason: ExcuseReason::from(*leave_type),
                        late_minutes: 0,
                        penalty_saved: money(absence_rate),
                    });
                }
            }

            (absence, money(Decimal::from(absence) * absence_rate))
        }
        SalaryType::Daily => (0, Decimal::ZERO),
    };
    excused_days.sort_by_key(|e| e.date);

    // 7. Bruto, multas manuais e bônus
    let calculated_salary = money(daily_rate * Decimal::from(worked_days));

    let active_penalties: Vec<&Penalty> = input
        .penalties
        .iter()
        .filter(|p| in_range(p.date) && p.is_active())
        // Multa de atraso lançada na entrada não vale em dia isento
        .filter(|p| !(p.is_auto && p.penalty_type == PenaltyType::Late && late_excuse(p.date).is_some()))
        .collect();
    let manual_penalty_amount = money(active_penalties.iter().map(|p| p.amount).sum());

    let bonuses: Vec<&Bonus> = input.bonuses.iter().filter(|b| in_range(b.date)).collect();
    let total_bonus_amount = money(bonuses.iter().map(|b| b.amount).sum());

    // 8. Líquido
    let total_penalty_amount = manual_penalty_amount + auto_late_penalty + absence_penalty;
    let final_salary = (calculated_salary - total_penalty_amount + total_bonus_amount).max(Decimal::ZERO);

    let daily_rate = money(daily_rate);
    let breakdown = build_breakdown(
        employee.salary_type,
        base_salary,
        full_month_work_days,
        daily_rate,
        worked_days,
        calculated_salary,
        total_late_minutes,
        late_rate,
        auto_late_penalty,
        absence_days,
        absence_rate,
        absence_penalty,
        manual_penalty_amount,
        total_bonus_amount,
        final_salary,
    );

    SalaryResult {
        employee_id: employee.id,
        salary_type: employee.salary_type,
        calculation_method,
        base_salary,
        currency,
        rate_basis: DailyRateBasis {
            month_start,
            month_end,
            total_days,
            full_month_work_days,
            off_days: total_days - full_month_work_days,
            daily_rate,
        },
        period: PeriodFacts {
            start_date: start,
            end_date: end,
            effective_start,
            effective_end,
            period_expected_days,
            worked_days,
            absence_days,
            total_work_minutes,
            total_work_hours,
        },
        leave_days,
        lateness: LatenessSummary {
            total_late_minutes,
            late_days: late_details.len() as u32,
            late_penalty_per_minute: late_rate,
            auto_penalty_enabled,
            details: late_details,
        },
        excused_days,
        deductions: Deductions {
            manual_penalty_amount,
            manual_penalty_count: active_penalties.len() as u32,
            auto_late_penalty,
            absence_penalty_per_day: absence_rate,
            absence_penalty,
            total_penalty_amount,
        },
        credits: Credits {
            bonus_count: bonuses.len() as u32,
            total_bonus_amount,
        },
        calculated_salary,
        final_salary,
        breakdown,
    }
}

#[allow(clippy::too_many_arguments)]
fn build_breakdown(
    salary_type: SalaryType,
    base_salary: Decimal,
    full_month_work_days: u32,
    daily_rate: Decimal,
    worked_days: u32,
    calculated_salary: Decimal,
    total_late_minutes: i64,
    late_rate: Decimal,
    auto_late_penalty: Decimal,
    absence_days: u32,
    absence_rate: Decimal,
    absence_penalty: Decimal,
    manual_penalty_amount: Decimal,
    total_bonus_amount: Decimal,
    final_salary: Decimal,
) -> Vec<BreakdownStep> {
    let rate_formula = match salary_type {
        SalaryType::Monthly => format!("{} / {} = {}", base_salary, full_month_work_days, daily_rate),
        SalaryType::Daily => format!("diária fixa = {}", daily_rate),
    };

    vec![
        BreakdownStep {
            step: 1,
            title: "Diária".into(),
            formula: rate_formula,
            value: daily_rate,
        },
        BreakdownStep {
            step: 2,
            title: "Salário bruto".into(),
            formula: format!("{} x {} = {}", daily_rate, worked_days, calculated_salary),
            value: calculated_salary,
        },
        BreakdownStep {
            step: 3,
            title: "Multa por atraso".into(),
            formula: format!("{} min x {} = {}", total_late_minutes, late_rate, auto_late_penalty),
            value: auto_late_penalty,
        },
        BreakdownStep {
            step: 4,
            title: "Multa por falta".into(),
            formula: format!("{} dias x {} = {}", absence_days, absence_rate, absence_penalty),
            value: absence_penalty,
        },
        BreakdownStep {
            step: 5,
            title: "Multas manuais".into(),
            formula: format!("soma das multas ativas = {}", manual_penalty_amount),
            value: manual_penalty_amount,
        },
        BreakdownStep {
            step: 6,
            title: "Bônus".into(),
            formula: format!("soma dos bônus = {}", total_bonus_amount),
            value: total_bonus_amount,
        },
        BreakdownStep {
            step: 7,
            title: "Salário líquido".into(),
            formula: format!(
                "max(0, {} - {} - {} - {} + {}) = {}",
                calculated_salary, manual_penalty_amount, auto_late_penalty, absence_penalty, total_bonus_amount, final_salary
            ),
            value: final_salary,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        bonus::BonusType,
        employee::EmployeeStatus,
        penalty::PenaltyType,
    };
    use chrono::{Datelike, Utc};
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn employee(base: Decimal, salary_type: SalaryType, hire_date: Option<NaiveDate>) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            branch_id: None,
            department_id: None,
            employee_no: "1".into(),
            full_name: "Teste".into(),
            base_salary: Some(base),
            salary_type,
            work_start_time: None,
            work_end_time: None,
            lunch_break_minutes: 60,
            hire_date,
            status: EmployeeStatus::Active,
            branch_name: None,
            department_name: None,
        }
    }

    fn record(date: NaiveDate, late_minutes: i32) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: Uuid::nil(),
            branch_id: None,
            date,
            check_in_time: None,
            check_out_time: None,
            late_minutes,
            early_leave_minutes: 0,
            total_work_minutes: 480,
            overtime_minutes: 0,
            device_name: None,
            ip_address: None,
            verify_mode: None,
            created_at: Utc::now(),
        }
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

    fn settings(auto: bool, per_minute: Decimal, absence: Decimal) -> CompanySettings {
        CompanySettings {
            company_id: Uuid::nil(),
            late_threshold_minutes: 10,
            grace_period_minutes: 15,
            auto_penalty_enabled: auto,
            late_penalty_per_minute: per_minute,
            absence_penalty_amount: absence,
            penalty_per_minute: Decimal::ZERO,
            currency: "UZS".into(),
            timezone: "Asia/Tashkent".into(),
            updated_at: None,
        }
    }

    fn penalty(date: NaiveDate, amount: Decimal, waived: bool, excused: bool) -> Penalty {
        Penalty {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: Uuid::nil(),
            attendance_id: None,
            penalty_type: PenaltyType::Manual,
            amount,
            late_minutes: None,
            reason: None,
            date,
            is_auto: false,
            created_by: None,
            is_waived: waived,
            waived_by: None,
            waived_at: None,
            waive_reason: None,
            is_excused: excused,
            excused_by: None,
            excused_at: None,
            excuse_reason: None,
            created_at: Utc::now(),
        }
    }

    fn bonus(date: NaiveDate, amount: Decimal) -> Bonus {
        Bonus {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: Uuid::nil(),
            bonus_type: BonusType::Manual,
            amount,
            reason: None,
            date,
            given_by: None,
            created_at: Utc::now(),
        }
    }

    /// Um registro para cada dia útil padrão de [start, end].
    fn full_attendance(start: NaiveDate, end: NaiveDate) -> Vec<AttendanceRecord> {
        ScheduleResolver::default_policy()
            .expected_dates(start, end)
            .map(|date| record(date, 0))
            .collect()
    }

    struct Fixture {
        employee: Employee,
        schedule: ScheduleResolver,
        settings: Option<CompanySettings>,
        attendance: Vec<AttendanceRecord>,
        leaves: Vec<LeaveRecord>,
        penalties: Vec<Penalty>,
        bonuses: Vec<Bonus>,
    }

    impl Fixture {
        fn new(employee: Employee) -> Self {
            Self {
                employee,
                schedule: ScheduleResolver::default_policy(),
                settings: None,
                attendance: Vec::new(),
                leaves: Vec::new(),
                penalties: Vec::new(),
                bonuses: Vec::new(),
            }
        }

        fn run(&self, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> SalaryResult {
            calculate_salary(&PayrollInput {
                employee: &self.employee,
                schedule: &self.schedule,
                settings: self.settings.as_ref(),
                attendance: &self.attendance,
                leaves: &self.leaves,
                penalties: &self.penalties,
                bonuses: &self.bonuses,
                start_date: start,
                end_date: end,
                today,
            })
        }
    }

    #[test]
    fn full_month_with_full_attendance_pays_base_salary() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.attendance = full_attendance(d(2025, 2, 1), d(2025, 2, 28));

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.rate_basis.full_month_work_days, 20);
        assert_eq!(result.rate_basis.daily_rate, dec!(150000));
        assert_eq!(result.period.period_expected_days, 20);
        assert_eq!(result.period.worked_days, 20);
        assert_eq!(result.period.absence_days, 0);
        assert_eq!(result.final_salary, dec!(3000000));
        assert_eq!(result.currency, "UZS");
    }

    #[test]
    fn two_absent_days_are_charged_at_the_flat_rate() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.settings = Some(settings(false, dec!(1000), dec!(50000)));
        fx.attendance = full_attendance(d(2025, 2, 1), d(2025, 2, 28));
        fx.attendance.retain(|r| r.date != d(2025, 2, 5) && r.date != d(2025, 2, 12));

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.period.worked_days, 18);
        assert_eq!(result.period.absence_days, 2);
        assert_eq!(result.deductions.absence_penalty, dec!(100000));
        assert_eq!(result.calculated_salary, dec!(2700000));
        assert_eq!(result.final_salary, dec!(2600000));
    }

    #[test]
    fn lateness_on_a_rest_day_is_excused_with_penalty_saved() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.settings = Some(settings(true, dec!(1000), dec!(50000)));
        fx.attendance = vec![record(d(2025, 2, 4), 40)];
        fx.leaves = vec![leave(d(2025, 2, 4), LeaveType::Rest)];

        let result = fx.run(d(2025, 2, 4), d(2025, 2, 4), d(2025, 3, 10));

        assert_eq!(result.lateness.total_late_minutes, 0);
        assert!(result.lateness.details.is_empty());
        assert_eq!(result.deductions.auto_late_penalty, Decimal::ZERO);
        assert_eq!(result.excused_days.len(), 1);
        let excused = &result.excused_days[0];
        assert_eq!(excused.kind, ExcusedKind::Late);
        assert_eq!(excused.reason, ExcuseReason::Rest);
        assert_eq!(excused.late_minutes, 40);
        assert_eq!(excused.penalty_saved, dec!(40000));
    }

    #[test]
    fn sick_leave_removes_lateness_from_counted_minutes() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.settings = Some(settings(true, dec!(1000), Decimal::ZERO));
        fx.attendance = vec![record(d(2025, 2, 3), 30), record(d(2025, 2, 4), 5)];
        fx.leaves = vec![leave(d(2025, 2, 3), LeaveType::Sick)];

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.lateness.total_late_minutes, 5);
        assert_eq!(result.lateness.details.len(), 1);
        assert_eq!(result.lateness.details[0].date, d(2025, 2, 4));
        assert_eq!(result.deductions.auto_late_penalty, dec!(5000));

        let sick = result
            .excused_days
            .iter()
            .find(|e| e.date == d(2025, 2, 3))
            .unwrap();
        assert_eq!(sick.reason, ExcuseReason::Sick);
        assert_eq!(
            serde_json::to_value(sick.reason).unwrap(),
            serde_json::json!("sick")
        );
    }

    #[test]
    fn daily_rate_is_anchored_to_the_full_month() {
        let mut fx = Fixture::new(employee(dec!(3100000), SalaryType::Monthly, None));
        fx.attendance = full_attendance(d(2025, 1, 1), d(2025, 1, 31));

        let partial = fx.run(d(2025, 1, 5), d(2025, 1, 10), d(2025, 2, 10));
        let full = fx.run(d(2025, 1, 1), d(2025, 1, 31), d(2025, 2, 10));

        // janeiro/2025 tem 23 dias úteis
        assert_eq!(full.rate_basis.full_month_work_days, 23);
        assert_eq!(partial.rate_basis.daily_rate, full.rate_basis.daily_rate);
        assert_ne!(partial.period.worked_days, full.period.worked_days);
        assert_ne!(partial.final_salary, full.final_salary);
    }

    #[test]
    fn final_salary_is_never_negative() {
        let mut fx = Fixture::new(employee(dec!(1000000), SalaryType::Monthly, None));
        fx.settings = Some(settings(true, dec!(100000), dec!(900000)));
        fx.attendance = vec![record(d(2025, 2, 3), 120)];
        fx.penalties = vec![penalty(d(2025, 2, 3), dec!(5000000), false, false)];

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert!(result.deductions.total_penalty_amount > result.calculated_salary);
        assert_eq!(result.final_salary, Decimal::ZERO);
    }

    #[test]
    fn late_and_absence_before_hire_date_are_not_charged() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, Some(d(2025, 2, 17))));
        fx.settings = Some(settings(true, dec!(1000), dec!(50000)));
        // punch antes da admissão (dado sujo) + presença completa depois
        fx.attendance = vec![record(d(2025, 2, 10), 25)];
        fx.attendance.extend(full_attendance(d(2025, 2, 17), d(2025, 2, 28)));

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.period.effective_start, d(2025, 2, 17));
        assert_eq!(result.period.period_expected_days, 10);
        assert_eq!(result.period.absence_days, 0);
        assert_eq!(result.lateness.total_late_minutes, 0);
        assert_eq!(result.excused_days[0].reason, ExcuseReason::BeforeHireDate);
        // diária continua sendo do mês cheio
        assert_eq!(result.rate_basis.daily_rate, dec!(150000));
    }

    #[test]
    fn lateness_on_an_off_day_wins_over_leave() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.settings = Some(settings(true, dec!(1000), Decimal::ZERO));
        // sábado com licença e atraso: o motivo é a folga da escala
        fx.attendance = vec![record(d(2025, 2, 8), 15)];
        fx.leaves = vec![leave(d(2025, 2, 8), LeaveType::Rest)];

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.excused_days.len(), 1);
        assert_eq!(result.excused_days[0].reason, ExcuseReason::OffDay);
    }

    #[test]
    fn leave_days_count_as_worked_and_are_listed_as_excused_absences() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.settings = Some(settings(false, Decimal::ZERO, dec!(50000)));
        fx.attendance = full_attendance(d(2025, 2, 1), d(2025, 2, 28));
        fx.attendance.retain(|r| r.date != d(2025, 2, 20));
        fx.leaves = vec![leave(d(2025, 2, 20), LeaveType::Sick)];

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.period.absence_days, 0);
        assert_eq!(result.deductions.absence_penalty, Decimal::ZERO);
        assert_eq!(result.leave_days, LeaveDaysSummary { total: 1, rest: 0, sick: 1 });
        assert_eq!(
            result.excused_days,
            vec![ExcusedDay {
                date: d(2025, 2, 20),
                kind: ExcusedKind::Absence,
                reason: ExcuseReason::Sick,
                late_minutes: 0,
                penalty_saved: dec!(50000),
            }]
        );
    }

    #[test]
    fn future_days_are_not_expected() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.settings = Some(settings(false, Decimal::ZERO, dec!(50000)));
        fx.attendance = full_attendance(d(2025, 2, 1), d(2025, 2, 14));

        // hoje = 14/02, mês ainda aberto
        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 2, 14));

        assert_eq!(result.period.effective_end, d(2025, 2, 14));
        assert_eq!(result.period.period_expected_days, 10);
        assert_eq!(result.period.absence_days, 0);
    }

    #[test]
    fn missing_settings_zero_out_policy_amounts() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.attendance = vec![record(d(2025, 2, 3), 50)];

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.lateness.total_late_minutes, 50);
        assert_eq!(result.deductions.auto_late_penalty, Decimal::ZERO);
        assert_eq!(result.period.absence_days, 19);
        assert_eq!(result.deductions.absence_penalty, Decimal::ZERO);
        assert_eq!(result.final_salary, dec!(150000));
    }

    #[test]
    fn auto_penalty_disabled_means_no_late_charge() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.settings = Some(settings(false, dec!(1000), Decimal::ZERO));
        fx.attendance = vec![record(d(2025, 2, 3), 30)];

        let result = fx.run(d(2025, 2, 3), d(2025, 2, 3), d(2025, 3, 10));

        assert_eq!(result.lateness.total_late_minutes, 30);
        assert_eq!(result.deductions.auto_late_penalty, Decimal::ZERO);
        assert!(!result.lateness.auto_penalty_enabled);
    }

    #[test]
    fn waived_and_excused_penalties_are_not_deducted() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.attendance = full_attendance(d(2025, 2, 1), d(2025, 2, 28));
        fx.penalties = vec![
            penalty(d(2025, 2, 3), dec!(10000), false, false),
            penalty(d(2025, 2, 4), dec!(20000), true, false),
            penalty(d(2025, 2, 5), dec!(40000), false, true),
            penalty(d(2025, 3, 3), dec!(80000), false, false), // fora do período
        ];
        fx.bonuses = vec![bonus(d(2025, 2, 28), dec!(5000)), bonus(d(2025, 1, 31), dec!(7000))];

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.deductions.manual_penalty_amount, dec!(10000));
        assert_eq!(result.deductions.manual_penalty_count, 1);
        assert_eq!(result.credits.total_bonus_amount, dec!(5000));
        assert_eq!(result.credits.bonus_count, 1);
        assert_eq!(result.final_salary, dec!(2995000));
    }

    fn ledger_late(date: NaiveDate, minutes: i32, amount: Decimal) -> Penalty {
        Penalty {
            penalty_type: PenaltyType::Late,
            late_minutes: Some(minutes),
            is_auto: true,
            ..penalty(date, amount, false, false)
        }
    }

    #[test]
    fn ledger_late_penalty_on_an_exempt_day_is_not_deducted() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, Some(d(2025, 2, 10))));
        fx.settings = Some(settings(false, Decimal::ZERO, Decimal::ZERO));
        fx.attendance = vec![
            record(d(2025, 2, 5), 20),  // antes da admissão
            record(d(2025, 2, 12), 30), // atestado
            record(d(2025, 2, 13), 10), // atraso de verdade
        ];
        fx.leaves = vec![leave(d(2025, 2, 12), LeaveType::Sick)];
        fx.penalties = vec![
            ledger_late(d(2025, 2, 5), 20, dec!(10000)),
            ledger_late(d(2025, 2, 12), 30, dec!(15000)),
            ledger_late(d(2025, 2, 13), 10, dec!(5000)),
        ];

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        let reasons: Vec<_> = result.excused_days.iter().map(|e| e.reason).collect();
        assert!(reasons.contains(&ExcuseReason::BeforeHireDate));
        assert!(reasons.contains(&ExcuseReason::Sick));
        assert_eq!(result.lateness.total_late_minutes, 10);
        assert_eq!(result.deductions.manual_penalty_amount, dec!(5000));
        assert_eq!(result.deductions.manual_penalty_count, 1);
    }

    #[test]
    fn manual_penalty_on_a_leave_day_is_still_deducted() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.leaves = vec![leave(d(2025, 2, 12), LeaveType::Rest)];
        fx.penalties = vec![penalty(d(2025, 2, 12), dec!(7000), false, false)];

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.deductions.manual_penalty_amount, dec!(7000));
    }

    #[test]
    fn a_day_with_both_attendance_and_leave_is_counted_once() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        fx.settings = Some(settings(false, Decimal::ZERO, dec!(50000)));
        fx.attendance = full_attendance(d(2025, 2, 1), d(2025, 2, 28));
        fx.attendance.retain(|r| r.date != d(2025, 2, 5));
        // entrada num dia que já tinha folga
        fx.leaves = vec![leave(d(2025, 2, 12), LeaveType::Rest)];

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.period.worked_days, 19);
        assert_eq!(result.period.absence_days, 1);
        assert_eq!(result.deductions.absence_penalty, dec!(50000));
        assert!(result.excused_days.is_empty());
    }

    #[test]
    fn daily_salary_type_pays_per_worked_day_without_absence_charge() {
        let mut fx = Fixture::new(employee(dec!(200000), SalaryType::Daily, None));
        fx.settings = Some(settings(false, Decimal::ZERO, dec!(50000)));
        fx.attendance = full_attendance(d(2025, 2, 1), d(2025, 2, 14));

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.calculation_method, CalculationMethod::Daily);
        assert_eq!(result.rate_basis.daily_rate, dec!(200000));
        assert_eq!(result.period.period_expected_days, 20);
        assert_eq!(result.period.absence_days, 0);
        assert_eq!(result.calculated_salary, dec!(2000000));
        assert_eq!(result.final_salary, dec!(2000000));
    }

    #[test]
    fn month_without_working_days_has_zero_daily_rate() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        let all_off: Vec<_> = (1..=7)
            .map(|dow| crate::models::schedule::ScheduleEntry {
                id: Uuid::new_v4(),
                employee_id: Uuid::nil(),
                day_of_week: dow,
                work_start_time: None,
                work_end_time: None,
                is_day_off: true,
                updated_at: Utc::now(),
            })
            .collect();
        fx.schedule = ScheduleResolver::from_parts(None, None, &all_off);
        fx.attendance = vec![record(d(2025, 2, 3), 0)];

        let result = fx.run(d(2025, 2, 1), d(2025, 2, 28), d(2025, 3, 10));

        assert_eq!(result.rate_basis.full_month_work_days, 0);
        assert_eq!(result.rate_basis.daily_rate, Decimal::ZERO);
        assert_eq!(result.final_salary, Decimal::ZERO);
    }

    #[test]
    fn work_hours_are_summed_from_minutes() {
        let mut fx = Fixture::new(employee(dec!(3000000), SalaryType::Monthly, None));
        let mut r = record(d(2025, 2, 3), 0);
        r.total_work_minutes = 450;
        fx.attendance = vec![r, record(d(2025, 2, 4), 0)];

        let result = fx.run(d(2025, 2, 3), d(2025, 2, 4), d(2025, 3, 10));

        assert_eq!(result.period.total_work_minutes, 930);
        assert_eq!(result.period.total_work_hours, dec!(15.5));
    }

    #[test]
    fn range_validation_rejects_inverted_periods() {
        assert!(validate_range(d(2025, 2, 1), d(2025, 2, 1)).is_ok());
        assert!(matches!(
            validate_range(d(2025, 2, 2), d(2025, 2, 1)),
            Err(AppError::InvalidRange { .. })
        ));
        // sanity: helper de datas
        assert_eq!(d(2025, 2, 3).weekday().number_from_monday(), 1);
    }
}
