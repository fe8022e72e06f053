// src/db.rs

pub mod attendance_repo;
pub use attendance_repo::AttendanceRepository;
pub mod bonus_repo;
pub use bonus_repo::BonusRepository;
pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod leave_repo;
pub use leave_repo::LeaveRepository;
pub mod penalty_repo;
pub use penalty_repo::PenaltyRepository;
pub mod schedule_repo;
pub use schedule_repo::ScheduleRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
