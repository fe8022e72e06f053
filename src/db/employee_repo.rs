// src/db/employee_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::employee::Employee};

// Funcionário + nomes de filial/departamento (usados nos relatórios)
const EMPLOYEE_SELECT: &str = r#"
    SELECT e.id, e.company_id, e.branch_id, e.department_id, e.employee_no, e.full_name,
           e.base_salary, e.salary_type, e.work_start_time, e.work_end_time,
           e.lunch_break_minutes, e.hire_date, e.status,
           b.name AS branch_name, d.name AS department_name
    FROM employees e
    LEFT JOIN branches b ON b.id = e.branch_id
    LEFT JOIN departments d ON d.id = e.department_id
"#;

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{EMPLOYEE_SELECT} WHERE e.company_id = $1 AND e.id = $2");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .bind(employee_id)
            .fetch_optional(executor)
            .await?;

        Ok(employee)
    }

    /// Busca pelo número de matrícula usado no terminal biométrico.
    pub async fn find_by_employee_no(
        &self,
        company_id: Uuid,
        employee_no: &str,
    ) -> Result<Option<Employee>, AppError> {
        let sql = format!("{EMPLOYEE_SELECT} WHERE e.company_id = $1 AND e.employee_no = $2");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .bind(employee_no)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    /// Funcionários ativos da empresa, com filtros opcionais por filial e por lista de IDs.
    pub async fn list_active<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        branch_id: Option<Uuid>,
        employee_ids: Option<&[Uuid]>,
    ) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"{EMPLOYEE_SELECT}
            WHERE e.company_id = $1
              AND e.status = 'active'
              AND ($2::uuid IS NULL OR e.branch_id = $2)
              AND ($3::uuid[] IS NULL OR e.id = ANY($3))
            ORDER BY e.full_name"#
        );
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .bind(branch_id)
            .bind(employee_ids.map(|ids| ids.to_vec()))
            .fetch_all(executor)
            .await?;

        Ok(employees)
    }

    /// Trava a linha do funcionário até o fim da transação.
    /// Serializa escritas que dependem de contagens (cotas de folga).
    pub async fn lock<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        employee_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM employees WHERE company_id = $1 AND id = $2 FOR UPDATE",
        )
            .bind(company_id)
            .bind(employee_id)
            .fetch_optional(executor)
            .await?;

        Ok(locked.is_some())
    }

    pub async fn branch_exists(&self, company_id: Uuid, branch_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM branches WHERE company_id = $1 AND id = $2)",
        )
            .bind(company_id)
            .bind(branch_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}
