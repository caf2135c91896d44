use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub supervisor_id: u64,
}
