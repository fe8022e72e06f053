// src/services/penalty_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{penalty_repo::PenaltyFilter, EmployeeRepository, PenaltyRepository},
    middleware::tenancy::CompanyContext,
    models::penalty::{BulkItemOutcome, NewPenalty, Penalty, PenaltySummary, PenaltyType},
};

/// Totais por estado. Uma multa perdoada E justificada conta nos dois grupos.
pub fn summarize_penalties(penalties: &[Penalty]) -> PenaltySummary {
    penalties.iter().fold(PenaltySummary::default(), |mut acc, p| {
        acc.total_count += 1;
        acc.total_amount += p.amount;
        if p.is_active() {
            acc.active_count += 1;
            acc.active_amount += p.amount;
        }
        if p.is_waived {
            acc.waived_count += 1;
            acc.waived_amount += p.amount;
        }
        if p.is_excused {
            acc.excused_count += 1;
            acc.excused_amount += p.amount;
        }
        acc
    })
}

#[derive(Clone)]
pub struct PenaltyService {
    penalty_repo: PenaltyRepository,
    employee_repo: EmployeeRepository,
    pool: PgPool,
}

impl PenaltyService {
    pub fn new(penalty_repo: PenaltyRepository, employee_repo: EmployeeRepository, pool: PgPool) -> Self {
        Self { penalty_repo, employee_repo, pool }
    }

    /// Lançamento manual feito pelo RH.
    pub async fn create_manual(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        penalty_type: PenaltyType,
        amount: Decimal,
        date: NaiveDate,
        reason: Option<String>,
    ) -> Result<Penalty, AppError> {
        if amount < Decimal::ZERO {
            return Err(AppError::BadRequest("Valor da multa não pode ser negativo.".to_string()));
        }
        let employee = self.employee_repo
            .find_by_id(&self.pool, ctx.company_id, employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;

        let new = NewPenalty {
            employee_id: employee.id,
            attendance_id: None,
            penalty_type,
            amount: amount.round_dp(2),
            late_minutes: None,
            reason,
            date,
            is_auto: false,
            created_by: Some(ctx.user_id),
        };
        self.penalty_repo.create(&self.pool, ctx.company_id, &new).await
    }

    pub async fn list(&self, ctx: &CompanyContext, filter: &PenaltyFilter) -> Result<Vec<Penalty>, AppError> {
        self.penalty_repo.list(ctx.company_id, filter).await
    }

    /// Quando um UPDATE condicional não afeta nada: ou a multa não existe,
    /// ou o estado atual não permite a transição.
    async fn explain_miss(&self, ctx: &CompanyContext, id: Uuid, state_error: AppError) -> AppError {
        match self.penalty_repo.find_by_id(ctx.company_id, id).await {
            Ok(Some(_)) => state_error,
            Ok(None) => AppError::ResourceNotFound("Multa"),
            Err(e) => e,
        }
    }

    pub async fn waive(&self, ctx: &CompanyContext, id: Uuid, reason: Option<&str>) -> Result<Penalty, AppError> {
        match self.penalty_repo.set_waived(ctx.company_id, id, ctx.user_id, reason).await? {
            Some(p) => {
                tracing::info!("Multa {} perdoada por {}", id, ctx.user_id);
                Ok(p)
            }
            None => Err(self.explain_miss(ctx, id, AppError::PenaltyAlreadyWaived).await),
        }
    }

    pub async fn restore(&self, ctx: &CompanyContext, id: Uuid) -> Result<Penalty, AppError> {
        match self.penalty_repo.clear_waived(ctx.company_id, id).await? {
            Some(p) => Ok(p),
            None => Err(self.explain_miss(ctx, id, AppError::PenaltyNotWaived).await),
        }
    }

    pub async fn excuse(&self, ctx: &CompanyContext, id: Uuid, reason: &str) -> Result<Penalty, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest("Justificativa é obrigatória.".to_string()));
        }
        match self.penalty_repo.set_excused(ctx.company_id, id, ctx.user_id, reason).await? {
            Some(p) => {
                tracing::info!("Multa {} justificada por {}", id, ctx.user_id);
                Ok(p)
            }
            None => Err(self.explain_miss(ctx, id, AppError::PenaltyAlreadyExcused).await),
        }
    }

    pub async fn unexcuse(&self, ctx: &CompanyContext, id: Uuid) -> Result<Penalty, AppError> {
        match self.penalty_repo.clear_excused(ctx.company_id, id).await? {
            Some(p) => Ok(p),
            None => Err(self.explain_miss(ctx, id, AppError::PenaltyNotExcused).await),
        }
    }

    /// Perdão em lote: cada ID tem seu próprio resultado, falhas não param o lote.
    pub async fn bulk_waive(
        &self,
        ctx: &CompanyContext,
        ids: &[Uuid],
        reason: Option<&str>,
    ) -> Vec<BulkItemOutcome> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let result = self.waive(ctx, *id, reason).await;
            outcomes.push(to_outcome(*id, result));
        }
        outcomes
    }

    pub async fn bulk_excuse(&self, ctx: &CompanyContext, ids: &[Uuid], reason: &str) -> Vec<BulkItemOutcome> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let result = self.excuse(ctx, *id, reason).await;
            outcomes.push(to_outcome(*id, result));
        }
        outcomes
    }

    pub async fn employee_summary(
        &self,
        ctx: &CompanyContext,
        employee_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PenaltySummary, AppError> {
        let filter = PenaltyFilter {
            employee_id: Some(employee_id),
            start,
            end,
            only_active: false,
        };
        let penalties = self.penalty_repo.list(ctx.company_id, &filter).await?;
        Ok(summarize_penalties(&penalties))
    }

    /// Só lançamentos manuais podem ser apagados; os automáticos ficam para auditoria.
    pub async fn delete(&self, ctx: &CompanyContext, id: Uuid) -> Result<(), AppError> {
        if self.penalty_repo.delete_manual(ctx.company_id, id).await? == 0 {
            return Err(self.explain_miss(ctx, id, AppError::OnlyManualDeletable).await);
        }
        Ok(())
    }
}

fn to_outcome(id: Uuid, result: Result<Penalty, AppError>) -> BulkItemOutcome {
    match result {
        Ok(_) => BulkItemOutcome { id, success: true, error: None },
        Err(e) => BulkItemOutcome { id, success: false, error: Some(e.to_string()) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn penalty(amount: Decimal, waived: bool, excused: bool) -> Penalty {
        Penalty {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            employee_id: Uuid::nil(),
            attendance_id: None,
            penalty_type: PenaltyType::Late,
            amount,
            late_minutes: Some(10),
            reason: None,
            date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            is_auto: true,
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

    #[test]
    fn summary_splits_by_lifecycle() {
        let penalties = vec![
            penalty(dec!(1000), false, false),
            penalty(dec!(2000), true, false),
            penalty(dec!(4000), false, true),
            penalty(dec!(8000), true, true),
        ];

        let summary = summarize_penalties(&penalties);

        assert_eq!(summary.total_count, 4);
        assert_eq!(summary.total_amount, dec!(15000));
        assert_eq!(summary.active_count, 1);
        assert_eq!(summary.active_amount, dec!(1000));
        assert_eq!(summary.waived_count, 2);
        assert_eq!(summary.waived_amount, dec!(10000));
        assert_eq!(summary.excused_count, 2);
        assert_eq!(summary.excused_amount, dec!(12000));
    }

    #[test]
    fn waived_and_excused_are_independent_toggles() {
        let only_excused = penalty(dec!(500), false, true);
        assert!(!only_excused.is_active());
        assert!(!only_excused.is_waived);

        let only_waived = penalty(dec!(500), true, false);
        assert!(!only_waived.is_active());
        assert!(!only_waived.is_excused);
    }

    #[test]
    fn bulk_outcome_carries_error_message() {
        let id = Uuid::new_v4();
        let outcome = to_outcome(id, Err(AppError::PenaltyAlreadyWaived));
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Multa já foi perdoada"));
        assert!(to_outcome(id, Ok(penalty(dec!(1), false, false))).success);
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(summarize_penalties(&[]), PenaltySummary::default());
    }
}
