// src/services/schedule_resolver.rs

use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime};

use crate::models::{
    employee::Employee,
    schedule::{DaySchedule, ScheduleEntry},
};

const fn hm(hour: u32, min: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, min, 0) {
        Some(t) => t,
        None => panic!("horário padrão inválido"),
    }
}

pub const DEFAULT_WORK_START: NaiveTime = hm(9, 0);
pub const DEFAULT_WORK_END: NaiveTime = hm(18, 0);

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// Resolve a escala de um funcionário para qualquer data.
///
/// É a única fonte de verdade sobre "dia útil": o ponto usa para calcular
/// atraso/hora extra e a folha usa para contar dias esperados. Linhas da
/// escala semanal valem como estão; dias sem linha caem na política padrão
/// (segunda a sexta no horário do funcionário ou 09:00-18:00, fim de semana folga).
#[derive(Debug, Clone)]
pub struct ScheduleResolver {
    week: [Option<DaySchedule>; 7],
    default_start: NaiveTime,
    default_end: NaiveTime,
}

impl ScheduleResolver {
    pub fn new(employee: &Employee, rows: &[ScheduleEntry]) -> Self {
        Self::from_parts(employee.work_start_time, employee.work_end_time, rows)
    }

    pub fn from_parts(
        default_start: Option<NaiveTime>,
        default_end: Option<NaiveTime>,
        rows: &[ScheduleEntry],
    ) -> Self {
        let mut week = [None; 7];
        for row in rows {
            match row.day_of_week {
                1..=7 => {
                    week[(row.day_of_week - 1) as usize] = Some(DaySchedule {
                        work_start: row.work_start_time,
                        work_end: row.work_end_time,
                        is_day_off: row.is_day_off,
                    });
                }
                other => {
                    tracing::warn!("Escala ignorada: dia da semana inválido {} (funcionário {})", other, row.employee_id);
                }
            }
        }

        Self {
            week,
            default_start: default_start.unwrap_or(DEFAULT_WORK_START),
            default_end: default_end.unwrap_or(DEFAULT_WORK_END),
        }
    }

    /// Política padrão pura, sem escala nem horário próprio.
    pub fn default_policy() -> Self {
        Self::from_parts(None, None, &[])
    }

    /// Escala do dia da semana (1 = segunda .. 7 = domingo) e se veio do padrão.
    pub fn resolve_weekday(&self, day_of_week: u32) -> (DaySchedule, bool) {
        let idx = day_of_week.clamp(1, 7) as usize - 1;
        match self.week[idx] {
            Some(day) => (day, false),
            None if idx < 5 => (
                DaySchedule {
                    work_start: Some(self.default_start),
                    work_end: Some(self.default_end),
                    is_day_off: false,
                },
                true,
            ),
            None => (DaySchedule::OFF, true),
        }
    }

    pub fn resolve(&self, date: NaiveDate) -> DaySchedule {
        self.resolve_weekday(date.weekday().number_from_monday()).0
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.resolve(date).is_day_off
    }

    /// Datas úteis em [start, end], inclusive. Vazio se start > end.
    pub fn expected_dates(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> + '_ {
        start
            .iter_days()
            .take_while(move |d| *d <= end)
            .filter(move |d| self.is_working_day(*d))
    }

    pub fn count_expected_days(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        self.expected_dates(start, end).count() as u32
    }
}

/// Primeiro e último dia do mês calendário que contém `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date - Days::new(u64::from(date.day0()));
    let last = first + Months::new(1) - Days::new(1);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(dow: i16, start: Option<(u32, u32)>, end: Option<(u32, u32)>, off: bool) -> ScheduleEntry {
        ScheduleEntry {
            id: Uuid::new_v4(),
            employee_id: Uuid::nil(),
            day_of_week: dow,
            work_start_time: start.map(|(h, m)| hm(h, m)),
            work_end_time: end.map(|(h, m)| hm(h, m)),
            is_day_off: off,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn default_policy_is_monday_to_friday_nine_to_six() {
        let resolver = ScheduleResolver::default_policy();
        // 2025-02-03 é segunda
        let monday = resolver.resolve(d(2025, 2, 3));
        assert_eq!(monday.work_start, Some(hm(9, 0)));
        assert_eq!(monday.work_end, Some(hm(18, 0)));
        assert!(!monday.is_day_off);

        assert_eq!(resolver.resolve(d(2025, 2, 8)), DaySchedule::OFF);
        assert_eq!(resolver.resolve(d(2025, 2, 9)), DaySchedule::OFF);
    }

    #[test]
    fn february_counts_use_the_real_calendar() {
        let resolver = ScheduleResolver::default_policy();
        assert_eq!(resolver.count_expected_days(d(2025, 2, 1), d(2025, 2, 28)), 20);
        // 2025-03-01 é sábado
        assert_eq!(resolver.count_expected_days(d(2025, 2, 1), d(2025, 3, 1)), 20);
    }

    #[test]
    fn counting_crosses_year_boundary() {
        let resolver = ScheduleResolver::default_policy();
        // 29/12/2025 (seg) .. 02/01/2026 (sex)
        assert_eq!(resolver.count_expected_days(d(2025, 12, 29), d(2026, 1, 2)), 5);
    }

    #[test]
    fn inverted_range_counts_nothing() {
        let resolver = ScheduleResolver::default_policy();
        assert_eq!(resolver.count_expected_days(d(2025, 2, 10), d(2025, 2, 1)), 0);
    }

    #[test]
    fn explicit_rows_win_and_missing_days_fall_back() {
        let rows = vec![
            row(1, None, None, true),                       // segunda de folga
            row(6, Some((10, 0)), Some((14, 0)), false),    // sábado meio período
        ];
        let resolver = ScheduleResolver::from_parts(Some(hm(8, 0)), Some(hm(17, 0)), &rows);

        assert!(resolver.resolve(d(2025, 2, 3)).is_day_off);

        let saturday = resolver.resolve(d(2025, 2, 8));
        assert_eq!(saturday.work_start, Some(hm(10, 0)));
        assert!(!saturday.is_day_off);

        // terça sem linha: horário próprio do funcionário
        let (tuesday, is_default) = resolver.resolve_weekday(2);
        assert!(is_default);
        assert_eq!(tuesday.work_start, Some(hm(8, 0)));

        // domingo sem linha continua folga
        assert!(resolver.resolve(d(2025, 2, 9)).is_day_off);

        // fev/2025: 20 dias úteis padrão - 4 segundas + 4 sábados
        assert_eq!(resolver.count_expected_days(d(2025, 2, 1), d(2025, 2, 28)), 20);
    }

    #[test]
    fn month_bounds_handles_leap_years() {
        assert_eq!(month_bounds(d(2024, 2, 17)), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(month_bounds(d(2025, 12, 31)), (d(2025, 12, 1), d(2025, 12, 31)));
    }
}
