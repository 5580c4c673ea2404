use chrono::{Months, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::BigDecimal;

use crate::config::Config;
use crate::models::{Assignment, Client, Employee, Project};

mod error;
pub mod schema;

pub use error::DbError;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    // Insert operations

    /// Insert a batch of clients in one transaction, all or nothing.
    pub async fn insert_clients(&self, clients: &[Client]) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        let mut inserted = 0;
        for client in clients {
            inserted += sqlx::query(
                r#"
                INSERT INTO clients (national_id, name, phone, email)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&client.national_id)
            .bind(&client.name)
            .bind(&client.phone)
            .bind(&client.email)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;

        Ok(inserted)
    }

    /// Insert a batch of employees in one transaction, all or nothing.
    pub async fn insert_employees(&self, employees: &[Employee]) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        let mut inserted = 0;
        for employee in employees {
            inserted += sqlx::query(
                r#"
                INSERT INTO employees (national_id, name, is_manager, email)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&employee.national_id)
            .bind(&employee.name)
            .bind(employee.is_manager)
            .bind(&employee.email)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;

        Ok(inserted)
    }

    /// Insert a project after checking its client exists and its manager
    /// candidate is actually flagged as a manager. Returns the generated id;
    /// the id on the passed value is ignored.
    pub async fn create_project(&self, project: &Project) -> Result<i32, DbError> {
        let mut tx = self.pool.begin().await?;

        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE national_id = $1")
            .bind(&project.client_id)
            .fetch_optional(&mut *tx)
            .await?;
        if client.is_none() {
            return Err(DbError::NotFound {
                resource: "client",
                id: project.client_id.clone(),
            });
        }

        let manager = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE national_id = $1 AND is_manager",
        )
        .bind(&project.manager_id)
        .fetch_optional(&mut *tx)
        .await?;
        if manager.is_none() {
            return Err(DbError::NotFound {
                resource: "manager",
                id: project.manager_id.clone(),
            });
        }

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO projects (title, description, start_date, end_date, budget, client_id, manager_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(&project.budget)
        .bind(&project.client_id)
        .bind(&project.manager_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(id)
    }

    /// Put an employee on a project. The composite primary key rejects a
    /// duplicate pair as an integrity violation.
    pub async fn create_assignment(&self, employee_id: &str, project_id: i32) -> Result<(), DbError> {
        let employee = self.get_employee(employee_id).await?;
        if employee.is_none() {
            return Err(DbError::NotFound {
                resource: "employee",
                id: employee_id.to_string(),
            });
        }
        let project = self.get_project(project_id).await?;
        if project.is_none() {
            return Err(DbError::NotFound {
                resource: "project",
                id: project_id.to_string(),
            });
        }

        sqlx::query("INSERT INTO assignments (employee_id, project_id) VALUES ($1, $2)")
            .bind(employee_id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // Point lookups

    pub async fn get_client(&self, national_id: &str) -> Result<Option<Client>, DbError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE national_id = $1")
            .bind(national_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    pub async fn get_employee(&self, national_id: &str) -> Result<Option<Employee>, DbError> {
        let employee =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE national_id = $1")
                .bind(national_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(employee)
    }

    pub async fn get_project(&self, id: i32) -> Result<Option<Project>, DbError> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    // Update operations

    /// Set a client's phone number by primary key. Zero rows means no such
    /// client, which is not an error.
    pub async fn update_client_phone(&self, national_id: &str, phone: &str) -> Result<u64, DbError> {
        let result = sqlx::query("UPDATE clients SET phone = $1 WHERE national_id = $2")
            .bind(phone)
            .bind(national_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Raise the budget of every active project by 10% in one bulk update.
    /// A project is active while its end date is unset or still ahead.
    pub async fn raise_active_project_budgets(&self) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET budget = budget * 1.10
            WHERE end_date IS NULL OR end_date > $1
            "#,
        )
        .bind(today())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Hand a project over to a different manager. Both the project and a
    /// manager-flagged employee must exist; the unique constraint on the
    /// manager column rejects a candidate who already runs another project.
    pub async fn reassign_project_manager(
        &self,
        project_id: i32,
        manager_id: &str,
    ) -> Result<(Project, Employee), DbError> {
        let project = self.get_project(project_id).await?.ok_or(DbError::NotFound {
            resource: "project",
            id: project_id.to_string(),
        })?;

        let manager = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE national_id = $1 AND is_manager",
        )
        .bind(manager_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound {
            resource: "manager",
            id: manager_id.to_string(),
        })?;

        sqlx::query("UPDATE projects SET manager_id = $1 WHERE id = $2")
            .bind(manager_id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok((project, manager))
    }

    // Delete operations

    /// Delete every client that no project references, via an anti-join on
    /// the distinct client ids present in projects.
    pub async fn delete_clients_without_projects(&self) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            DELETE FROM clients
            WHERE national_id NOT IN (SELECT DISTINCT client_id FROM projects)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete projects that are both finished and under the budget floor.
    pub async fn delete_stale_projects_below(
        &self,
        budget_floor: &BigDecimal,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM projects WHERE budget < $1 AND end_date < $2")
            .bind(budget_floor)
            .bind(today())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // Transactions

    /// Move every assignment off projects that finished more than five years
    /// ago onto the destination project, then delete those projects. Both
    /// steps commit together or not at all; an employee already assigned to
    /// the destination makes the whole unit roll back.
    pub async fn consolidate_obsolete_projects(
        &self,
        destination_id: i32,
    ) -> Result<(u64, u64), DbError> {
        let destination = self.get_project(destination_id).await?;
        if destination.is_none() {
            return Err(DbError::NotFound {
                resource: "destination project",
                id: destination_id.to_string(),
            });
        }

        let cutoff = today() - Months::new(60);

        let mut tx = self.pool.begin().await?;

        let reassigned = sqlx::query(
            r#"
            UPDATE assignments
            SET project_id = $1
            WHERE project_id IN (
                SELECT id FROM projects
                WHERE end_date IS NOT NULL AND end_date < $2
            )
            "#,
        )
        .bind(destination_id)
        .bind(cutoff)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deleted = sqlx::query(
            "DELETE FROM projects WHERE end_date IS NOT NULL AND end_date < $1",
        )
        .bind(cutoff)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        tracing::info!(reassigned, deleted, "consolidated obsolete projects");

        Ok((reassigned, deleted))
    }

    /// Delete a client together with its projects and every assignment to
    /// those projects, children before parents, in one transaction.
    /// Returns the deleted (assignments, projects) counts.
    pub async fn delete_client_cascade(&self, national_id: &str) -> Result<(u64, u64), DbError> {
        let client = self.get_client(national_id).await?;
        if client.is_none() {
            return Err(DbError::NotFound {
                resource: "client",
                id: national_id.to_string(),
            });
        }

        let mut tx = self.pool.begin().await?;

        let assignments = sqlx::query(
            r#"
            DELETE FROM assignments
            WHERE project_id IN (SELECT id FROM projects WHERE client_id = $1)
            "#,
        )
        .bind(national_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let projects = sqlx::query("DELETE FROM projects WHERE client_id = $1")
            .bind(national_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM clients WHERE national_id = $1")
            .bind(national_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(client = national_id, assignments, projects, "cascade delete finished");

        Ok((assignments, projects))
    }

    // Whole-table reads for the reporting layer

    pub async fn list_clients(&self) -> Result<Vec<Client>, DbError> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>, DbError> {
        let employees = sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(employees)
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, DbError> {
        let projects = sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    pub async fn list_assignments(&self) -> Result<Vec<Assignment>, DbError> {
        let assignments = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments ORDER BY project_id ASC, employee_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> Result<Database, DbError> {
    let db = Database::new(config).await?;

    Ok(db)
}
