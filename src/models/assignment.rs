#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Assignment {
    pub employee_id: String,
    pub project_id: i32,
}
