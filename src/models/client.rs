#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Client {
    pub national_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
}
