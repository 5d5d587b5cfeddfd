use actix_web::{HttpResponse, web};

use crate::api::response::ApiResponse;
use crate::error::HrError;
use crate::model::employee::EmployeeInput;
use crate::repository::EmployeeRepository;

/// List employees, most recently created first
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees", body = Object, example = json!({
            "success": true,
            "data": [{
                "id": "65a1f0c2e4b0a1b2c3d4e5f6",
                "employee_id": "EMP-001",
                "full_name": "John Doe",
                "email": "john.doe@company.com",
                "department": "Engineering",
                "created_at": "2024-01-01T09:30:00.000000Z"
            }],
            "count": 1
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "success": false,
            "error": "Something went wrong. Please try again."
        }))
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    repo: web::Data<EmployeeRepository>,
) -> Result<HttpResponse, HrError> {
    let employees = repo.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list(employees)))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeeInput,
    responses(
        (status = 201, description = "Employee created successfully", body = Object, example = json!({
            "success": true,
            "data": {
                "id": "65a1f0c2e4b0a1b2c3d4e5f6",
                "employee_id": "EMP-001",
                "full_name": "John Doe",
                "email": "john.doe@company.com",
                "department": "Engineering",
                "created_at": "2024-01-01T09:30:00.000000Z"
            },
            "message": "Employee created successfully."
        })),
        (status = 400, description = "Validation failed or employee ID taken", body = Object, example = json!({
            "success": false,
            "errors": {"employee_id": ["Employee with this Employee ID already exists."]}
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    repo: web::Data<EmployeeRepository>,
    payload: web::Json<EmployeeInput>,
) -> Result<HttpResponse, HrError> {
    let employee = repo.create(&payload).await?;

    Ok(HttpResponse::Created()
        .json(ApiResponse::ok(employee).with_message("Employee created successfully.")))
}

/// Get one employee by native id or employee ID
#[utoipa::path(
    get,
    path = "/api/employees/{reference}",
    params(
        ("reference" = String, Path, description = "Native id (24 hex characters) or business employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Object, example = json!({
            "success": true,
            "data": {
                "id": "65a1f0c2e4b0a1b2c3d4e5f6",
                "employee_id": "EMP-001",
                "full_name": "John Doe",
                "email": "john.doe@company.com",
                "department": "Engineering",
                "created_at": "2024-01-01T09:30:00.000000Z"
            }
        })),
        (status = 400, description = "Invalid employee ID", body = Object, example = json!({
            "success": false,
            "error": "Invalid employee ID."
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "success": false,
            "error": "Employee not found."
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    repo: web::Data<EmployeeRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, HrError> {
    let employee = repo.get_by_reference(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(employee)))
}

/// Delete an employee and all of their attendance
#[utoipa::path(
    delete,
    path = "/api/employees/{reference}",
    params(
        ("reference" = String, Path, description = "Native id (24 hex characters) or business employee ID")
    ),
    responses(
        (status = 204, description = "Employee and attendance deleted"),
        (status = 400, description = "Invalid employee ID"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    repo: web::Data<EmployeeRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, HrError> {
    repo.delete_by_reference(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}
