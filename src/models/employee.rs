#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Employee {
    pub national_id: String,
    pub name: String,
    pub is_manager: bool,
    pub email: String,
}
