// src/handlers.rs

pub mod attendance;
pub mod bonus;
pub mod leave;
pub mod payroll;
pub mod penalty;
pub mod schedule;
pub mod settings;
pub mod terminal;

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

// Query strings compartilhadas pelos handlers

/// Período fechado `[start, end]`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    #[param(example = "2025-02-01")]
    pub start: NaiveDate,
    #[param(example = "2025-02-28")]
    pub end: NaiveDate,
}

/// Período opcional (filtros de listagem).
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OptionalRangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    #[param(example = 2025)]
    pub year: i32,
    #[param(example = 2)]
    pub month: u32,
}
