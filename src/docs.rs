use crate::api::attendance::AttendanceQuery;
use crate::model::attendance::{AttendanceInput, AttendanceStatus, AttendanceView};
use crate::model::employee::{Employee, EmployeeInput};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS Lite API",
        version = "1.0.0",
        description = r#"
## HRMS Lite

Records API for a small HR team: an employee directory and a daily attendance log.

### Key Features
- **Employees**
  - Create, list, view and delete employees
  - Address an employee by native id or by business **employee ID**
  - Deleting an employee also removes their attendance
- **Attendance**
  - Mark one `Present` / `Absent` record per employee and day
  - List all records or filter by employee

### Response Format
Every JSON response uses one envelope:
`{ "success": bool, "data"?, "error"?, "errors"?, "message"?, "count"? }`.
Field validation failures come back as `errors`, a map of field name to messages.
Deletes answer `204 No Content`.
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::list_attendance,
        crate::api::attendance::mark_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::delete_attendance
    ),
    components(
        schemas(
            Employee,
            EmployeeInput,
            AttendanceView,
            AttendanceInput,
            AttendanceStatus,
            AttendanceQuery
        )
    ),
    tags(
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Attendance", description = "Attendance log APIs"),
    )
)]
pub struct ApiDoc;
