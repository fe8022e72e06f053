// src/services.rs

pub mod attendance_service;
pub mod bonus_service;
pub mod leave_service;
pub mod payroll_engine;
pub mod payroll_service;
pub mod penalty_service;
pub mod report_service;
pub mod schedule_resolver;
pub mod schedule_service;
