// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use chrono_tz::Tz;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AttendanceRepository, BonusRepository, EmployeeRepository, LeaveRepository, PenaltyRepository,
        ScheduleRepository, SettingsRepository,
    },
    services::{
        attendance_service::AttendanceService, bonus_service::BonusService, leave_service::LeaveService,
        payroll_service::PayrollService, penalty_service::PenaltyService, report_service::ReportService,
        schedule_service::ScheduleService,
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_PAYROLL_CONCURRENCY: usize = 8;
const DEFAULT_TIMEZONE: &str = "Asia/Tashkent";

/// Variáveis de ambiente lidas na partida.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub max_connections: u32,
    pub payroll_concurrency: usize,
    pub default_timezone: Tz,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());
        let max_connections = parse_or("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let payroll_concurrency = parse_or("PAYROLL_CONCURRENCY", DEFAULT_PAYROLL_CONCURRENCY)?;

        let tz_name = env::var("DEFAULT_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());
        let default_timezone = tz_name
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("DEFAULT_TIMEZONE inválido '{}': {}", tz_name, e))?;

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr,
            max_connections,
            payroll_concurrency,
            default_timezone,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{} inválido: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub default_tz: Tz,

    pub settings_repo: SettingsRepository,

    pub schedule_service: ScheduleService,
    pub attendance_service: AttendanceService,
    pub leave_service: LeaveService,
    pub penalty_service: PenaltyService,
    pub bonus_service: BonusService,
    pub payroll_service: PayrollService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, settings))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, settings: &Settings) -> Self {
        let tz = settings.default_timezone;

        let employee_repo = EmployeeRepository::new(db_pool.clone());
        let schedule_repo = ScheduleRepository::new(db_pool.clone());
        let attendance_repo = AttendanceRepository::new(db_pool.clone());
        let leave_repo = LeaveRepository::new(db_pool.clone());
        let penalty_repo = PenaltyRepository::new(db_pool.clone());
        let bonus_repo = BonusRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        let schedule_service = ScheduleService::new(db_pool.clone(), schedule_repo.clone(), employee_repo.clone());
        let attendance_service = AttendanceService::new(
            db_pool.clone(),
            attendance_repo.clone(),
            employee_repo.clone(),
            schedule_repo.clone(),
            settings_repo.clone(),
            penalty_repo.clone(),
            leave_repo.clone(),
            tz,
        );
        let leave_service = LeaveService::new(
            db_pool.clone(),
            leave_repo.clone(),
            employee_repo.clone(),
            attendance_repo.clone(),
        );
        let penalty_service = PenaltyService::new(penalty_repo.clone(), employee_repo.clone(), db_pool.clone());
        let bonus_service = BonusService::new(
            db_pool.clone(),
            bonus_repo.clone(),
            employee_repo.clone(),
            attendance_repo.clone(),
            leave_repo.clone(),
            schedule_repo.clone(),
            settings_repo.clone(),
            tz,
        );
        let report_service = ReportService::new(
            db_pool.clone(),
            employee_repo.clone(),
            schedule_repo.clone(),
            attendance_repo.clone(),
            leave_repo.clone(),
            penalty_repo.clone(),
            bonus_repo.clone(),
            settings_repo.clone(),
            tz,
        );

        let payroll_service = PayrollService::new(
            db_pool.clone(),
            employee_repo,
            schedule_repo,
            attendance_repo,
            leave_repo,
            penalty_repo,
            bonus_repo,
            settings_repo.clone(),
            tz,
            settings.payroll_concurrency,
        );

        Self {
            db_pool,
            jwt_secret: settings.jwt_secret.clone(),
            default_tz: tz,
            settings_repo,
            schedule_service,
            attendance_service,
            leave_service,
            penalty_service,
            bonus_service,
            payroll_service,
            report_service,
        }
    }
}
