// src/models.rs

pub mod attendance;
pub mod bonus;
pub mod employee;
pub mod leave;
pub mod payroll;
pub mod penalty;
pub mod schedule;
pub mod settings;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Valores monetários nunca podem ser negativos.
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}
