// src/common/db_utils.rs

use std::future::Future;

use crate::common::error::AppError;

// ---
// Helper de concorrência: repete UMA vez a seção crítica
// ---
/// Executa `op`; se falhar com `ConcurrentModification` (outra transação
/// gravou a mesma linha), relê e reaplica uma única vez antes de desistir.
/// A closure deve refazer a leitura dentro de uma transação nova.
pub(crate) async fn retry_once_on_conflict<T, F, Fut>(label: &str, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    match op().await {
        Err(AppError::ConcurrentModification) => {
            tracing::warn!("⚠️ Conflito concorrente em {}, repetindo uma vez.", label);
            op().await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn retries_exactly_once_on_conflict() {
        let calls = Cell::new(0);
        let result: Result<u32, AppError> = retry_once_on_conflict("teste", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n == 1 { Err(AppError::ConcurrentModification) } else { Ok(n) }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), AppError> = retry_once_on_conflict("teste", || {
            calls.set(calls.get() + 1);
            async { Err(AppError::EmployeeNotFound) }
        })
        .await;

        assert!(matches!(result, Err(AppError::EmployeeNotFound)));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn second_conflict_is_surfaced() {
        let result: Result<(), AppError> =
            retry_once_on_conflict("teste", || async { Err(AppError::ConcurrentModification) }).await;

        assert!(matches!(result, Err(AppError::ConcurrentModification)));
    }
}
