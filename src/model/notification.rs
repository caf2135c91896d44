use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "Attendance transmitted")]
    pub title: String,

    pub message: String,

    #[schema(example = "attendance")]
    pub notif_type: String,

    #[schema(example = "/attendance?date=2026-08-07", nullable = true)]
    pub link: Option<String>,

    pub is_read: bool,

    #[schema(example = "2026-08-07T08:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
