use crate::auth::auth::AuthUser;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::project::Project;
use crate::model::role::{AttendanceOp, Role};
use crate::model::team::{Team, TeamMember};
use crate::utils::{token_cache, token_filter};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use std::collections::BTreeSet;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    #[schema(example = 45.4642, nullable = true)]
    pub latitude: Option<f64>,
    #[schema(example = 9.19, nullable = true)]
    pub longitude: Option<f64>,
    #[schema(example = 3, nullable = true)]
    pub project_id: Option<u64>,
    #[schema(example = "north gate", nullable = true)]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ScanReq {
    #[schema(example = "0b2f6f1e-6f1a-4c4e-9f44-7f3ce1a0d9b2")]
    pub token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ValidateReq {
    #[schema(example = json!([10, 11, 12]))]
    pub record_ids: Vec<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct TransmitReq {
    #[schema(example = "2026-08-07", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = json!([10, 11, 12]))]
    pub record_ids: Vec<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpsertReq {
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "2026-08-07", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "present")]
    pub status: AttendanceStatus,
    #[schema(example = "2026-08-07T07:58:00", format = "date-time", value_type = String, nullable = true)]
    pub check_in: Option<NaiveDateTime>,
    #[schema(example = "2026-08-07T17:02:00", format = "date-time", value_type = String, nullable = true)]
    pub check_out: Option<NaiveDateTime>,
    #[schema(example = "left early, fever", nullable = true)]
    pub notes: Option<String>,
    #[schema(example = 3, nullable = true)]
    pub project_id: Option<u64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    /// Report window: day, week or month around the reference date
    #[schema(example = "week")]
    pub period: Option<String>,
    /// Reference date, defaults to today
    #[schema(example = "2026-08-07", format = "date", value_type = String)]
    #[param(example = "2026-08-07", format = "date", value_type = String)]
    pub date: Option<NaiveDate>,
    /// Filter by project
    #[schema(example = 3)]
    pub project_id: Option<u64>,
    /// Filter by team (resolved to its members)
    #[schema(example = 2)]
    pub team_id: Option<u64>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 50)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ReportRow {
    #[schema(example = 10)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "Marco")]
    pub first_name: String,
    #[schema(example = "Rossi")]
    pub last_name: String,
    #[schema(example = "2026-08-07", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-08-07T07:58:00", format = "date-time", value_type = String, nullable = true)]
    pub check_in: Option<NaiveDateTime>,
    #[schema(example = "2026-08-07T17:02:00", format = "date-time", value_type = String, nullable = true)]
    pub check_out: Option<NaiveDateTime>,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = 3, nullable = true)]
    pub project_id: Option<u64>,
    #[schema(example = 7, nullable = true)]
    pub validated_by: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    pub data: Vec<ReportRow>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 50)]
    pub per_page: u32,
    #[schema(example = 120)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

/// Inclusive date window for a report period keyword.
/// Week windows run Monday through Sunday.
fn period_bounds(period: &str, reference: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    match period {
        "day" | "daily" => Some((reference, reference)),
        "week" | "weekly" => {
            let week = reference.week(Weekday::Mon);
            Some((week.first_day(), week.last_day()))
        }
        "month" | "monthly" => {
            let first = reference.with_day(1)?;
            let (next_y, next_m) = if reference.month() == 12 {
                (reference.year() + 1, 1)
            } else {
                (reference.year(), reference.month() + 1)
            };
            let last = NaiveDate::from_ymd_opt(next_y, next_m, 1)?.pred_opt()?;
            Some((first, last))
        }
        _ => None,
    }
}

/// "?, ?, ?" for an IN clause of `n` ids
fn in_placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Union admins and supervisors without duplicates
fn merge_recipients(admins: Vec<u64>, supervisors: Vec<u64>) -> Vec<u64> {
    admins
        .into_iter()
        .chain(supervisors)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Self check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInReq,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully",
            "status": "pending"
        })),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckInReq>,
) -> actix_web::Result<impl Responder> {
    auth.authorize(AttendanceOp::CheckIn)?;

    let result = sqlx::query(
        r#"
        INSERT INTO attendance
            (user_id, date, check_in, status, latitude, longitude, project_id, notes)
        VALUES (?, CURDATE(), NOW(), ?, ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(AttendanceStatus::Pending.to_string())
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(payload.project_id)
    .bind(&payload.notes)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked in successfully",
            "status": AttendanceStatus::Pending.to_string()
        }))),

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return Ok(HttpResponse::Conflict().json(serde_json::json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            error!(error = %e, user_id = auth.user_id, "Check-in failed");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Self check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.authorize(AttendanceOp::CheckOut)?;

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = NOW()
        WHERE user_id = ?
        AND date = CURDATE()
        AND check_out IS NULL
        "#,
    )
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Check-out failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active check-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully"
    })))
}

/// Caller's own attendance record for today
#[utoipa::path(
    get,
    path = "/api/v1/attendance/me",
    responses(
        (status = 200, description = "Today's record, if any", body = AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No record today", body = Object, example = json!({
            "message": "No attendance record for today"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let record = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in, check_out, status,
               latitude, longitude, notes, project_id, validated_by
        FROM attendance
        WHERE user_id = ? AND date = CURDATE()
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to fetch today's attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match record {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "No attendance record for today"
        }))),
    }
}

/// QR-scan check-in endpoint (Team Lead)
///
/// Duplicate scans report success=false with HTTP 200 so a scanning
/// session is never interrupted by an error dialog.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/scan",
    request_body = ScanReq,
    responses(
        (status = 200, description = "Scan processed", body = Object, example = json!({
            "success": true,
            "worker": "Marco Rossi",
            "message": "Checked in"
        })),
        (status = 400, description = "Missing token"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Worker not found", body = Object, example = json!({
            "message": "Worker not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn scan(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ScanReq>,
) -> actix_web::Result<impl Responder> {
    auth.authorize(AttendanceOp::Scan)?;

    let token = payload.token.trim();
    if token.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Token is required"
        })));
    }

    // Fast negative: an unknown token never hits the database
    if !token_filter::might_exist(token) {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Worker not found"
        })));
    }

    let worker = match token_cache::get(token).await {
        Some(w) => w,
        None => {
            let row = sqlx::query_as::<_, (u64, String, String)>(
                r#"
                SELECT id, first_name, last_name
                FROM users
                WHERE qr_token = ? AND is_active = 1
                "#,
            )
            .bind(token)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to resolve QR token");
                ErrorInternalServerError("Internal Server Error")
            })?;

            match row {
                Some((id, first_name, last_name)) => {
                    let worker = token_cache::CachedWorker {
                        id,
                        first_name,
                        last_name,
                    };
                    token_cache::mark(token, worker.clone()).await;
                    worker
                }
                None => {
                    return Ok(HttpResponse::NotFound().json(serde_json::json!({
                        "message": "Worker not found"
                    })));
                }
            }
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (user_id, date, check_in, status, notes)
        VALUES (?, CURDATE(), NOW(), ?, ?)
        "#,
    )
    .bind(worker.id)
    .bind(AttendanceStatus::Present.to_string())
    .bind(format!("Scanned by {}", auth.username))
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "worker": format!("{} {}", worker.first_name, worker.last_name),
            "message": "Checked in"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    // Soft outcome: the worker is already in for today
                    return Ok(HttpResponse::Ok().json(serde_json::json!({
                        "success": false,
                        "worker": format!("{} {}", worker.first_name, worker.last_name),
                        "message": "Already checked in today"
                    })));
                }
            }

            error!(error = %e, worker_id = worker.id, "Scan check-in failed");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Create or update an attendance record in place (Admin / Team Lead)
#[utoipa::path(
    post,
    path = "/api/v1/attendance/record",
    request_body = UpsertReq,
    responses(
        (status = 200, description = "Record created or updated", body = Object, example = json!({
            "message": "Attendance record saved"
        })),
        (status = 400, description = "Status not assignable"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn upsert_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpsertReq>,
) -> actix_web::Result<impl Responder> {
    auth.authorize(AttendanceOp::Upsert)?;

    if !payload.status.is_admin_assignable() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Status must be one of: present, absent, late, on_leave, sick"
        })));
    }

    let user_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(payload.user_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, user_id = payload.user_id, "Failed to look up user");
                ErrorInternalServerError("Internal Server Error")
            })?;

    if !user_exists {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        })));
    }

    // The (user_id, date) unique key turns the duplicate case into an
    // update in place rather than a rejection.
    let result = sqlx::query(
        r#"
        INSERT INTO attendance (user_id, date, status, check_in, check_out, notes, project_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            status = VALUES(status),
            check_in = COALESCE(VALUES(check_in), check_in),
            check_out = COALESCE(VALUES(check_out), check_out),
            notes = COALESCE(VALUES(notes), notes),
            project_id = COALESCE(VALUES(project_id), project_id),
            updated_at = NOW()
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.date)
    .bind(payload.status.to_string())
    .bind(payload.check_in)
    .bind(payload.check_out)
    .bind(&payload.notes)
    .bind(payload.project_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = payload.user_id, date = %payload.date, "Upsert failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    // MySQL reports 1 affected row for an insert, 2 for an update
    let message = if result.rows_affected() == 1 {
        "Attendance record created"
    } else {
        "Attendance record updated"
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": message
    })))
}

/// Batch validation endpoint (Team Lead)
#[utoipa::path(
    post,
    path = "/api/v1/attendance/validate",
    request_body = ValidateReq,
    responses(
        (status = 200, description = "Validation applied", body = Object, example = json!({
            "validated": 3
        })),
        (status = 400, description = "Empty id list"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn validate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ValidateReq>,
) -> actix_web::Result<impl Responder> {
    auth.authorize(AttendanceOp::Validate)?;

    if payload.record_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "record_ids must not be empty"
        })));
    }

    // Only pending rows transition; everything else is silently skipped
    let sql = format!(
        r#"
        UPDATE attendance
        SET status = ?, validated_by = ?, updated_at = NOW()
        WHERE id IN ({})
        AND status = ?
        "#,
        in_placeholders(payload.record_ids.len())
    );

    let mut query = sqlx::query(&sql)
        .bind(AttendanceStatus::Validated.to_string())
        .bind(auth.user_id);
    for id in &payload.record_ids {
        query = query.bind(*id);
    }
    query = query.bind(AttendanceStatus::Pending.to_string());

    let result = query.execute(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, validator = auth.user_id, "Batch validation failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "validated": result.rows_affected()
    })))
}

/// Transmit endpoint (Team Lead): notify supervisors and admins
#[utoipa::path(
    post,
    path = "/api/v1/attendance/transmit",
    request_body = TransmitReq,
    responses(
        (status = 200, description = "Notifications created", body = Object, example = json!({
            "notified": 4
        })),
        (status = 400, description = "Empty id list"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn transmit(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<TransmitReq>,
) -> actix_web::Result<impl Responder> {
    auth.authorize(AttendanceOp::Transmit)?;

    if payload.record_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "record_ids must not be empty"
        })));
    }

    // Every project the batch touches, and with it its supervisor
    let project_sql = format!(
        r#"
        SELECT DISTINCT p.id, p.name, p.supervisor_id
        FROM attendance a
        INNER JOIN projects p ON p.id = a.project_id
        WHERE a.id IN ({})
        "#,
        in_placeholders(payload.record_ids.len())
    );

    let mut project_q = sqlx::query_as::<_, Project>(&project_sql);
    for id in &payload.record_ids {
        project_q = project_q.bind(*id);
    }

    let projects = project_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to resolve projects for transmission");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let supervisors: Vec<u64> = projects.iter().map(|p| p.supervisor_id).collect();

    let admins = sqlx::query_scalar::<_, u64>("SELECT id FROM users WHERE role_id = ?")
        .bind(Role::Admin as u8)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to resolve admins");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let recipients = merge_recipients(admins, supervisors);

    if recipients.is_empty() {
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "notified": 0
        })));
    }

    let message = format!(
        "{} transmitted attendance for {} ({} records)",
        auth.username,
        payload.date,
        payload.record_ids.len()
    );
    let link = format!("/attendance?date={}", payload.date);

    let values = vec!["(?, ?, ?, ?, ?)"; recipients.len()].join(", ");
    let insert_sql = format!(
        "INSERT INTO notifications (user_id, title, message, notif_type, link) VALUES {}",
        values
    );

    let mut insert_q = sqlx::query(&insert_sql);
    for recipient in &recipients {
        insert_q = insert_q
            .bind(*recipient)
            .bind("Attendance transmitted")
            .bind(&message)
            .bind("attendance")
            .bind(&link);
    }

    insert_q.execute(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, date = %payload.date, "Failed to create notifications");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "notified": recipients.len()
    })))
}

/// Attendance report endpoint (Admin / Supervisor / Team Lead)
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(ReportQuery),
    responses(
        (status = 200, description = "Filtered attendance report", body = ReportResponse),
        (status = 400, description = "Unknown period keyword"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Team not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.authorize(AttendanceOp::Report)?;

    let reference = query.date.unwrap_or_else(|| Local::now().date_naive());
    let period = query.period.as_deref().unwrap_or("day");

    let (from, to) = match period_bounds(period, reference) {
        Some(bounds) => bounds,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "period must be one of: day, week, month"
            })));
        }
    };

    // Team scoping: an explicit team filter resolves to its members
    // first; team leads are always confined to teams they lead.
    let mut member_ids: Option<Vec<u64>> = None;

    if let Some(team_id) = query.team_id {
        let team = sqlx::query_as::<_, Team>("SELECT id, name, leader_id FROM teams WHERE id = ?")
            .bind(team_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, team_id, "Failed to fetch team");
                ErrorInternalServerError("Internal Server Error")
            })?;

        let team = match team {
            Some(t) => t,
            None => {
                return Ok(HttpResponse::NotFound().json(serde_json::json!({
                    "message": "Team not found"
                })));
            }
        };

        if auth.is_team_lead() && team.leader_id != auth.user_id {
            return Err(actix_web::error::ErrorForbidden("Not your team"));
        }

        let members = sqlx::query_as::<_, TeamMember>(
            "SELECT team_id, user_id FROM team_members WHERE team_id = ?",
        )
        .bind(team.id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, team_id, "Failed to fetch team members");
            ErrorInternalServerError("Internal Server Error")
        })?;

        member_ids = Some(members.into_iter().map(|m| m.user_id).collect());
    } else if auth.is_team_lead() {
        let members = sqlx::query_scalar::<_, u64>(
            r#"
            SELECT tm.user_id
            FROM team_members tm
            INNER JOIN teams t ON t.id = tm.team_id
            WHERE t.leader_id = ?
            "#,
        )
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, leader = auth.user_id, "Failed to fetch led teams");
            ErrorInternalServerError("Internal Server Error")
        })?;

        member_ids = Some(members);
    }

    let per_page = query.per_page.unwrap_or(50).min(200);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE a.date BETWEEN ? AND ?");
    let mut args = vec![FilterValue::Date(from), FilterValue::Date(to)];

    if let Some(project_id) = query.project_id {
        where_sql.push_str(" AND a.project_id = ?");
        args.push(FilterValue::U64(project_id));
    }

    if let Some(members) = &member_ids {
        if members.is_empty() {
            return Ok(HttpResponse::Ok().json(ReportResponse {
                data: Vec::new(),
                page: page as u32,
                per_page: per_page as u32,
                total: 0,
            }));
        }
        where_sql.push_str(&format!(" AND a.user_id IN ({})", in_placeholders(members.len())));
        for member in members {
            args.push(FilterValue::U64(*member));
        }
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM attendance a{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count attendance records");
        ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT a.id, a.user_id, u.first_name, u.last_name,
               a.date, a.check_in, a.check_out, a.status, a.project_id, a.validated_by
        FROM attendance a
        INNER JOIN users u ON u.id = a.user_id
        {}
        ORDER BY a.date DESC, u.last_name ASC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, ReportRow>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let rows = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch attendance report");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(ReportResponse {
        data: rows,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_window_is_a_single_date() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(period_bounds("day", d), Some((d, d)));
        assert_eq!(period_bounds("daily", d), Some((d, d)));
    }

    #[test]
    fn week_window_runs_monday_through_sunday() {
        // 2026-08-07 is a Friday
        let d = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let (from, to) = period_bounds("weekly", d).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 8, 9).unwrap());
        assert_eq!(from.weekday(), Weekday::Mon);
        assert_eq!(to.weekday(), Weekday::Sun);

        // A Monday reference starts its own week
        let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let (from, _) = period_bounds("week", monday).unwrap();
        assert_eq!(from, monday);
    }

    #[test]
    fn month_window_covers_first_through_last_day() {
        let d = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        let (from, to) = period_bounds("month", d).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());

        // December rolls into the next year
        let d = NaiveDate::from_ymd_opt(2026, 12, 5).unwrap();
        let (_, to) = period_bounds("monthly", d).unwrap();
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    }

    #[test]
    fn unknown_period_is_rejected() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert!(period_bounds("fortnight", d).is_none());
        assert!(period_bounds("", d).is_none());
    }

    #[test]
    fn in_placeholders_match_id_count() {
        assert_eq!(in_placeholders(1), "?");
        assert_eq!(in_placeholders(3), "?, ?, ?");
    }

    #[test]
    fn recipients_are_deduplicated() {
        // supervisor 7 is also an admin; must be notified once
        let merged = merge_recipients(vec![1, 7], vec![7, 9, 9]);
        assert_eq!(merged, vec![1, 7, 9]);
    }

    #[test]
    fn recipients_empty_when_no_sources() {
        assert!(merge_recipients(Vec::new(), Vec::new()).is_empty());
    }
}
