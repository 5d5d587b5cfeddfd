use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::{employee::Employee, object_id::ObjectId};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 2] = [AttendanceStatus::Present, AttendanceStatus::Absent];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendance {
    pub id: ObjectId,
    pub employee_ref: ObjectId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

impl Attendance {
    pub fn create(employee_ref: ObjectId, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            id: ObjectId::new(),
            employee_ref,
            date,
            status,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}

/// Canonical stored form of an attendance day: the date at midnight, no zone.
/// Two records fall on the same day iff their canonical timestamps are equal.
pub fn day_timestamp(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Attendance payload as received from callers.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AttendanceInput {
    /// Native id or business code of the employee
    #[schema(example = "EMP-001")]
    pub employee_id: Option<String>,
    #[schema(example = "2024-01-05", format = "date")]
    pub date: Option<String>,
    #[schema(example = "Present")]
    pub status: Option<String>,
}

/// Validated attendance fields; the employee reference is not resolved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub employee_reference: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Attendance record with the owning employee's display fields.
/// Display fields are `null` when the employee no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "65a1f3d9e4b0a1b2c3d4e5f7",
    "employee_ref": "65a1f0c2e4b0a1b2c3d4e5f6",
    "employee_id": "EMP-001",
    "employee_name": "John Doe",
    "department": "Engineering",
    "date": "2024-01-05",
    "status": "Present",
    "created_at": "2024-01-05T09:00:00.000000Z"
}))]
pub struct AttendanceView {
    #[schema(value_type = String)]
    pub id: ObjectId,
    #[schema(value_type = String)]
    pub employee_ref: ObjectId,
    /// Business code of the employee
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub department: Option<String>,
    #[schema(example = "2024-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl AttendanceView {
    pub fn new(record: Attendance, employee: Option<&Employee>) -> Self {
        Self {
            id: record.id,
            employee_ref: record.employee_ref,
            employee_id: employee.map(|e| e.employee_code.clone()),
            employee_name: employee.map(|e| e.full_name.clone()),
            department: employee.map(|e| e.department.clone()),
            date: record.date,
            status: record.status,
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_parsing_is_exact() {
        assert_eq!(
            AttendanceStatus::from_str("Present").unwrap(),
            AttendanceStatus::Present
        );
        assert_eq!(
            AttendanceStatus::from_str("Absent").unwrap(),
            AttendanceStatus::Absent
        );
        assert!(AttendanceStatus::from_str("present").is_err());
        assert!(AttendanceStatus::from_str("ABSENT").is_err());
        assert!(AttendanceStatus::from_str("Late").is_err());
    }

    #[test]
    fn day_timestamp_is_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let ts = day_timestamp(date);
        assert_eq!(ts.date(), date);
        assert_eq!(ts.time(), NaiveTime::MIN);
    }

    #[test]
    fn view_of_orphan_has_null_display_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let record = Attendance::create(ObjectId::new(), date, AttendanceStatus::Absent);
        let view = AttendanceView::new(record, None);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["employee_id"].is_null());
        assert!(json["employee_name"].is_null());
        assert!(json["department"].is_null());
        assert_eq!(json["date"], "2024-01-05");
        assert_eq!(json["status"], "Absent");
    }
}
