// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Escalas ---
        handlers::schedule::get_week,
        handlers::schedule::set_week,
        handlers::schedule::set_day,
        handlers::schedule::delete_day,
        handlers::schedule::copy_schedule,

        // --- Ponto ---
        handlers::attendance::check_in,
        handlers::attendance::check_out,
        handlers::attendance::list_for_employee,
        handlers::attendance::daily_sheet,
        handlers::attendance::daily_statistics,
        handlers::attendance::absent_employees,
        handlers::attendance::late_employees,
        handlers::attendance::employee_calendar,
        handlers::attendance::attendance_ranking,

        // --- Terminal ---
        handlers::terminal::receive_event,
        handlers::terminal::receive_branch_event,

        // --- Folgas ---
        handlers::leave::set_leave,
        handlers::leave::delete_leave,
        handlers::leave::get_month,
        handlers::leave::list_in_range,

        // --- Multas ---
        handlers::penalty::create_penalty,
        handlers::penalty::list_penalties,
        handlers::penalty::waive_penalty,
        handlers::penalty::restore_penalty,
        handlers::penalty::excuse_penalty,
        handlers::penalty::unexcuse_penalty,
        handlers::penalty::bulk_waive,
        handlers::penalty::bulk_excuse,
        handlers::penalty::employee_summary,
        handlers::penalty::delete_penalty,

        // --- Bônus ---
        handlers::bonus::create_bonus,
        handlers::bonus::bulk_create_bonus,
        handlers::bonus::list_bonuses,
        handlers::bonus::bonus_summary,
        handlers::bonus::bonus_leaderboard,
        handlers::bonus::delete_bonus,
        handlers::bonus::auto_perfect_attendance,
        handlers::bonus::auto_early_arrival,

        // --- Folha ---
        handlers::payroll::calculate_for_employee,
        handlers::payroll::bulk_calculate,
        handlers::payroll::monthly_report,
        handlers::payroll::payroll_summary,
        handlers::payroll::late_ranking,

        // --- Configurações ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Cadastro ---
            models::employee::Employee,
            models::employee::SalaryType,
            models::employee::EmployeeStatus,

            // --- Escalas ---
            models::schedule::ScheduleEntry,
            models::schedule::ScheduleDayInput,
            models::schedule::WeekDayView,

            // --- Ponto ---
            models::attendance::AttendanceRecord,
            models::attendance::AttendanceEventResult,
            models::attendance::DeviceInfo,
            models::attendance::DayStatus,
            models::attendance::CalendarDay,
            models::attendance::CalendarSummary,
            models::attendance::AttendanceCalendar,
            models::attendance::DailyStatistics,
            models::attendance::AbsentEmployee,
            models::attendance::DailyAbsences,
            models::attendance::LateEmployee,
            models::attendance::DailyLateness,
            models::attendance::AttendanceRankingEntry,
            models::attendance::AttendanceRanking,

            // --- Folgas ---
            models::leave::LeaveType,
            models::leave::LeaveRecord,
            models::leave::MonthlyLeaves,

            // --- Multas e bônus ---
            models::penalty::PenaltyType,
            models::penalty::Penalty,
            models::penalty::PenaltySummary,
            models::penalty::BulkItemOutcome,
            models::bonus::BonusType,
            models::bonus::Bonus,
            models::bonus::BonusSummary,
            models::bonus::BonusTypeTotal,
            models::bonus::AutoBonusOutcome,
            models::bonus::BonusLeaderboardEntry,

            // --- Folha ---
            models::payroll::SalaryResult,
            models::payroll::CalculationMethod,
            models::payroll::ExcuseReason,
            models::payroll::ExcusedKind,
            models::payroll::LateDetail,
            models::payroll::ExcusedDay,
            models::payroll::DailyRateBasis,
            models::payroll::PeriodFacts,
            models::payroll::LeaveDaysSummary,
            models::payroll::LatenessSummary,
            models::payroll::Deductions,
            models::payroll::Credits,
            models::payroll::BreakdownStep,
            models::payroll::EmployeePayroll,
            models::payroll::PayrollTotals,
            models::payroll::BulkPayrollResult,
            models::payroll::PayrollGroup,
            models::payroll::PayrollGroupedSummary,
            models::payroll::LateRankingEntry,

            // --- Configurações ---
            models::settings::CompanySettings,
            models::settings::UpdateSettingsRequest,

            // --- PAYLOADS ---
            handlers::schedule::SetWeekPayload,
            handlers::schedule::CopySchedulePayload,
            handlers::schedule::CopyScheduleResponse,
            handlers::terminal::TerminalEventPayload,
            handlers::terminal::Direction,
            handlers::leave::SetLeavePayload,
            handlers::penalty::CreatePenaltyPayload,
            handlers::penalty::WaivePayload,
            handlers::penalty::ExcusePayload,
            handlers::penalty::BulkWaivePayload,
            handlers::penalty::BulkExcusePayload,
            handlers::bonus::CreateBonusPayload,
            handlers::bonus::BulkBonusPayload,
            handlers::bonus::AutoBonusPayload,
            handlers::payroll::BulkPayrollPayload,
        )
    ),
    tags(
        (name = "Escalas", description = "Escala semanal por funcionário"),
        (name = "Ponto", description = "Entradas, saídas e folha de ponto"),
        (name = "Terminal", description = "Eventos dos terminais biométricos"),
        (name = "Folgas", description = "Folgas e atestados com cota mensal"),
        (name = "Multas", description = "Multas, perdão e justificativa"),
        (name = "Bônus", description = "Bônus manuais e automáticos"),
        (name = "Folha", description = "Cálculo de salário e relatórios"),
        (name = "Configurações", description = "Regras de atraso, multas e fuso da empresa")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for prefix in [
            "/api/schedules",
            "/api/attendance",
            "/api/terminal",
            "/api/leaves",
            "/api/penalties",
            "/api/bonuses",
            "/api/payroll",
            "/api/settings",
        ] {
            assert!(paths.iter().any(|p| p.starts_with(prefix)), "faltando {}", prefix);
        }
        for report in [
            "/api/attendance/statistics",
            "/api/attendance/{employee_id}/calendar",
            "/api/attendance/ranking",
            "/api/bonuses/leaderboard",
        ] {
            assert!(doc.paths.paths.contains_key(report), "faltando {}", report);
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("api_jwt"));
    }
}
