use crate::auth::auth::AuthUser;
use crate::model::notification::Notification;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct NotificationQuery {
    /// Only return unread notifications
    pub unread_only: Option<bool>,
    /// Maximum number of notifications to return
    pub limit: Option<u32>,
}

/// List the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notification list", body = [Notification]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notifications"
)]
pub async fn list_notifications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<impl Responder> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);

    let mut sql = String::from(
        r#"
        SELECT id, user_id, title, message, notif_type, link, is_read, created_at
        FROM notifications
        WHERE user_id = ?
        "#,
    );
    if query.unread_only.unwrap_or(false) {
        sql.push_str(" AND is_read = FALSE");
    }
    sql.push_str(" ORDER BY created_at DESC LIMIT ?");

    let notifications = sqlx::query_as::<_, Notification>(&sql)
        .bind(auth.user_id)
        .bind(limit)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch notifications");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(notifications))
}

/// Mark one owned notification as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{notification_id}/read",
    params(
        ("notification_id" = u64, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Marked as read", body = Object, example = json!({
            "message": "Notification marked as read"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found", body = Object, example = json!({
            "message": "Notification not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notifications"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let notification_id = path.into_inner();

    // Ownership is part of the predicate; someone else's id reads as missing
    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET is_read = TRUE
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(notification_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, notification_id, "Failed to mark notification read");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Notification not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Notification marked as read"
    })))
}

/// Mark all of the caller's notifications as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "All marked as read", body = Object, example = json!({
            "marked": 5
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET is_read = TRUE
        WHERE user_id = ? AND is_read = FALSE
        "#,
    )
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to mark notifications read");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "marked": result.rows_affected()
    })))
}
