//! Idempotent schema creation for the four workforce tables.
//!
//! Parents are created before children so the foreign keys resolve on a
//! fresh database.

use sqlx::PgPool;

use super::DbError;

pub async fn create_tables(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("creating workforce tables if missing");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            national_id VARCHAR(15) PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            phone VARCHAR(15),
            email VARCHAR(100) NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            national_id VARCHAR(15) PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            is_manager BOOLEAN NOT NULL DEFAULT FALSE,
            email VARCHAR(100) NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // manager_id is UNIQUE: an employee can run at most one project.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id SERIAL PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            description TEXT,
            start_date DATE NOT NULL,
            end_date DATE,
            budget NUMERIC(10, 2) NOT NULL,
            client_id VARCHAR(15) NOT NULL REFERENCES clients (national_id),
            manager_id VARCHAR(15) NOT NULL UNIQUE REFERENCES employees (national_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Composite primary key rejects a duplicate (employee, project) pair.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assignments (
            employee_id VARCHAR(15) NOT NULL REFERENCES employees (national_id),
            project_id INTEGER NOT NULL REFERENCES projects (id),
            PRIMARY KEY (employee_id, project_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
