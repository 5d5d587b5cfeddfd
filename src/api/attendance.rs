use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::response::ApiResponse;
use crate::error::HrError;
use crate::model::attendance::AttendanceInput;
use crate::repository::AttendanceRepository;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Native id or business employee ID; empty means no filter
    #[param(example = "EMP-001")]
    pub employee_id: Option<String>,
}

impl AttendanceQuery {
    fn employee_reference(&self) -> Option<&str> {
        self.employee_id.as_deref().filter(|raw| !raw.is_empty())
    }
}

/// List attendance, optionally for one employee
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records, newest date first", body = Object, example = json!({
            "success": true,
            "data": [{
                "id": "65a1f3d9e4b0a1b2c3d4e5f7",
                "employee_ref": "65a1f0c2e4b0a1b2c3d4e5f6",
                "employee_id": "EMP-001",
                "employee_name": "John Doe",
                "department": "Engineering",
                "date": "2024-01-05",
                "status": "Present",
                "created_at": "2024-01-05T09:00:00.000000Z"
            }],
            "count": 1
        })),
        (status = 400, description = "Invalid employee ID"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    repo: web::Data<AttendanceRepository>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, HrError> {
    let records = repo.list(query.employee_reference()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list(records)))
}

/// Mark attendance for one employee and day
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceInput,
    responses(
        (status = 201, description = "Attendance marked successfully", body = Object, example = json!({
            "success": true,
            "data": {
                "id": "65a1f3d9e4b0a1b2c3d4e5f7",
                "employee_ref": "65a1f0c2e4b0a1b2c3d4e5f6",
                "employee_id": "EMP-001",
                "employee_name": "John Doe",
                "department": "Engineering",
                "date": "2024-01-05",
                "status": "Present",
                "created_at": "2024-01-05T09:00:00.000000Z"
            },
            "message": "Attendance marked successfully."
        })),
        (status = 400, description = "Validation failed or already marked that day", body = Object, example = json!({
            "success": false,
            "error": "Attendance already marked for John Doe on 2024-01-05. Cannot mark attendance twice for the same date."
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "success": false,
            "error": "Employee not found. Please select a valid employee."
        }))
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    repo: web::Data<AttendanceRepository>,
    payload: web::Json<AttendanceInput>,
) -> Result<HttpResponse, HrError> {
    let view = repo.create(&payload).await?;

    Ok(HttpResponse::Created()
        .json(ApiResponse::ok(view).with_message("Attendance marked successfully.")))
}

/// Get one attendance record by native id
#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    params(
        ("id" = String, Path, description = "Native id of the attendance record")
    ),
    responses(
        (status = 200, description = "Attendance record", body = Object),
        (status = 400, description = "Invalid attendance ID format", body = Object, example = json!({
            "success": false,
            "error": "Invalid attendance ID format."
        })),
        (status = 404, description = "Attendance record not found")
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(
    repo: web::Data<AttendanceRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, HrError> {
    let view = repo.get_by_id(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(view)))
}

#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(
        ("id" = String, Path, description = "Native id of the attendance record")
    ),
    responses(
        (status = 204, description = "Attendance record deleted"),
        (status = 400, description = "Invalid attendance ID format"),
        (status = 404, description = "Attendance record not found")
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    repo: web::Data<AttendanceRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, HrError> {
    repo.delete_by_id(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}
