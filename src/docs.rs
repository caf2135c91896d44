use crate::api::attendance::{
    CheckInReq, ReportQuery, ReportResponse, ReportRow, ScanReq, TransmitReq, UpsertReq,
    ValidateReq,
};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::notification::Notification;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LYNX Attendance API",
        version = "1.0.0",
        description = r#"
## LYNX construction-site attendance service

This API owns the daily attendance lifecycle for construction sites.

### Key Features
- **Self check-in / check-out**
  - One attendance record per user per day, pending review
- **QR scanning**
  - Team leads scan worker badges; duplicates never abort a session
- **Validation & transmission**
  - Team leads validate pending records and notify supervisors/admins
- **Reports**
  - Day/week/month windows, filterable by project and team

### Security
Endpoints are protected using **JWT Bearer authentication**.
Scanning, validation and transmission are restricted to **Team Leads**;
reports to **Admins**, **Supervisors** and **Team Leads**.

### Response Format
- JSON-based RESTful responses
- Pagination supported for the report endpoint

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::my_attendance,
        crate::api::attendance::scan,
        crate::api::attendance::upsert_record,
        crate::api::attendance::validate,
        crate::api::attendance::transmit,
        crate::api::attendance::report,

        crate::api::notification::list_notifications,
        crate::api::notification::mark_read,
        crate::api::notification::mark_all_read
    ),
    components(
        schemas(
            CheckInReq,
            ScanReq,
            ValidateReq,
            TransmitReq,
            UpsertReq,
            ReportQuery,
            ReportRow,
            ReportResponse,
            AttendanceRecord,
            AttendanceStatus,
            Notification
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance lifecycle APIs"),
        (name = "Notifications", description = "Notification inbox APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
