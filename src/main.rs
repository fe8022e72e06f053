// src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::{
    config::{AppState, Settings},
    docs::ApiDoc,
    middleware::auth::auth_guard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; padrão "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = build_router(app_state);

    let listener = TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", settings.server_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}

fn build_router(app_state: AppState) -> Router {
    let schedule_routes = Router::new()
        .route(
            "/{employee_id}",
            get(handlers::schedule::get_week).put(handlers::schedule::set_week),
        )
        .route("/{employee_id}/days", put(handlers::schedule::set_day))
        .route("/{employee_id}/days/{day_of_week}", delete(handlers::schedule::delete_day))
        .route("/{employee_id}/copy", post(handlers::schedule::copy_schedule));

    let attendance_routes = Router::new()
        .route("/daily", get(handlers::attendance::daily_sheet))
        .route("/statistics", get(handlers::attendance::daily_statistics))
        .route("/absent", get(handlers::attendance::absent_employees))
        .route("/late", get(handlers::attendance::late_employees))
        .route("/ranking", get(handlers::attendance::attendance_ranking))
        .route("/{employee_id}", get(handlers::attendance::list_for_employee))
        .route("/{employee_id}/check-in", post(handlers::attendance::check_in))
        .route("/{employee_id}/check-out", post(handlers::attendance::check_out))
        .route("/{employee_id}/calendar", get(handlers::attendance::employee_calendar));

    let leave_routes = Router::new()
        .route(
            "/{employee_id}",
            get(handlers::leave::list_in_range).put(handlers::leave::set_leave),
        )
        .route("/{employee_id}/month", get(handlers::leave::get_month))
        .route("/{employee_id}/{date}", delete(handlers::leave::delete_leave));

    let penalty_routes = Router::new()
        .route(
            "/",
            post(handlers::penalty::create_penalty).get(handlers::penalty::list_penalties),
        )
        .route("/bulk-waive", post(handlers::penalty::bulk_waive))
        .route("/bulk-excuse", post(handlers::penalty::bulk_excuse))
        .route("/summary/{employee_id}", get(handlers::penalty::employee_summary))
        .route("/{id}", delete(handlers::penalty::delete_penalty))
        .route("/{id}/waive", post(handlers::penalty::waive_penalty))
        .route("/{id}/restore", post(handlers::penalty::restore_penalty))
        .route("/{id}/excuse", post(handlers::penalty::excuse_penalty))
        .route("/{id}/unexcuse", post(handlers::penalty::unexcuse_penalty));

    let bonus_routes = Router::new()
        .route(
            "/",
            post(handlers::bonus::create_bonus).get(handlers::bonus::list_bonuses),
        )
        .route("/bulk", post(handlers::bonus::bulk_create_bonus))
        .route("/summary", get(handlers::bonus::bonus_summary))
        .route("/leaderboard", get(handlers::bonus::bonus_leaderboard))
        .route("/auto/perfect-attendance", post(handlers::bonus::auto_perfect_attendance))
        .route("/auto/early-arrival", post(handlers::bonus::auto_early_arrival))
        .route("/{id}", delete(handlers::bonus::delete_bonus));

    let payroll_routes = Router::new()
        .route("/employees/{employee_id}", get(handlers::payroll::calculate_for_employee))
        .route("/bulk", post(handlers::payroll::bulk_calculate))
        .route("/monthly", get(handlers::payroll::monthly_report))
        .route("/summary", get(handlers::payroll::payroll_summary))
        .route("/late-ranking", get(handlers::payroll::late_ranking));

    let settings_routes = Router::new().route(
        "/",
        get(handlers::settings::get_settings).put(handlers::settings::update_settings),
    );

    // Tudo que exige JWT passa pelo mesmo guard
    let protected = Router::new()
        .nest("/schedules", schedule_routes)
        .nest("/attendance", attendance_routes)
        .nest("/leaves", leave_routes)
        .nest("/penalties", penalty_routes)
        .nest("/bonuses", bonus_routes)
        .nest("/payroll", payroll_routes)
        .nest("/settings", settings_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Terminais não têm JWT; a empresa vem no caminho
    let terminal_routes = Router::new()
        .route("/{company_id}/events", post(handlers::terminal::receive_event))
        .route("/{company_id}/{branch_id}/events", post(handlers::terminal::receive_branch_event));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .nest("/api/terminal", terminal_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
