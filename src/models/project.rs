use sqlx::types::BigDecimal;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Project {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_date: chrono::NaiveDate,
    pub end_date: Option<chrono::NaiveDate>,
    pub budget: BigDecimal,
    pub client_id: String,
    pub manager_id: String,
}
