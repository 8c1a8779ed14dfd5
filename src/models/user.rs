use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub plan_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_plan(&self) -> bool {
        self.plan_id.is_some()
    }
}
