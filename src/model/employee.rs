use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::object_id::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "id": "65a1f0c2e4b0a1b2c3d4e5f6",
        "employee_id": "EMP-001",
        "full_name": "John Doe",
        "email": "john.doe@company.com",
        "department": "Engineering",
        "created_at": "2024-01-01T09:30:00.000000Z"
    })
)]
pub struct Employee {
    #[schema(example = "65a1f0c2e4b0a1b2c3d4e5f6", value_type = String)]
    pub id: ObjectId,

    /// Business identifier assigned by HR, unique across employees
    #[serde(rename = "employee_id")]
    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John Doe")]
    pub full_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(
        example = "2024-01-01T09:30:00.000000Z",
        value_type = String,
        format = "date-time"
    )]
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Builds the record to insert: fresh native id, creation time truncated to
    /// the store's microsecond precision.
    pub fn create(new: NewEmployee) -> Self {
        Self {
            id: ObjectId::new(),
            employee_code: new.employee_code,
            full_name: new.full_name,
            email: new.email,
            department: new.department,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}

/// Employee payload as received from callers. Every field is optional so that
/// missing fields surface as validation errors instead of body parse errors.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct EmployeeInput {
    #[schema(example = "EMP-001")]
    pub employee_id: Option<String>,
    #[schema(example = "John Doe")]
    pub full_name: Option<String>,
    #[schema(example = "John.Doe@Company.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

/// Validated and normalised employee fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub employee_code: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
}
