use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

use crate::model::{
    attendance::{Attendance, AttendanceStatus, day_timestamp},
    employee::Employee,
    object_id::ObjectId,
};
use crate::store::{ATTENDANCE_DAY_INDEX, DocumentStore, EMPLOYEE_CODE_INDEX, StoreError};

/// MySQL-backed store. Each collection is a table keyed by the `CHAR(24)`
/// native id; the unique indexes are created by [`crate::db::ensure_schema`].
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

// -------------------- Rows --------------------
//
// Rows are read with every column optional and translated into the typed
// records below; a missing or unreadable column fails the whole operation.

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: Option<String>,
    employee_code: Option<String>,
    full_name: Option<String>,
    email: Option<String>,
    department: Option<String>,
    created_at: Option<NaiveDateTime>,
}

#[derive(Debug, FromRow)]
struct AttendanceRow {
    id: Option<String>,
    employee_ref: Option<String>,
    date: Option<NaiveDateTime>,
    status: Option<String>,
    created_at: Option<NaiveDateTime>,
}

fn column<T>(value: Option<T>, name: &str) -> Result<T, StoreError> {
    value.ok_or_else(|| StoreError::Malformed(format!("{} is missing", name)))
}

fn native_id(value: Option<String>, name: &str) -> Result<ObjectId, StoreError> {
    let raw = column(value, name)?;
    ObjectId::parse(&raw)
        .ok_or_else(|| StoreError::Malformed(format!("{} is not a native id: {:?}", name, raw)))
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Employee {
            id: native_id(row.id, "employees.id")?,
            employee_code: column(row.employee_code, "employees.employee_code")?,
            full_name: column(row.full_name, "employees.full_name")?,
            email: column(row.email, "employees.email")?,
            department: column(row.department, "employees.department")?,
            created_at: column(row.created_at, "employees.created_at")?.and_utc(),
        })
    }
}

impl TryFrom<AttendanceRow> for Attendance {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = column(row.status, "attendance.status")?;
        Ok(Attendance {
            id: native_id(row.id, "attendance.id")?,
            employee_ref: native_id(row.employee_ref, "attendance.employee_ref")?,
            date: column(row.date, "attendance.date")?.date(),
            status: AttendanceStatus::from_str(&status).map_err(|_| {
                StoreError::Malformed(format!("attendance.status is unknown: {:?}", status))
            })?,
            created_at: column(row.created_at, "attendance.created_at")?.and_utc(),
        })
    }
}

fn translate<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// MySQL reports unique index violations as SQLSTATE 23000.
fn insert_error(e: sqlx::Error, index: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23000") {
            debug!(index, error = %db_err, "Unique index rejected insert");
            return StoreError::DuplicateKey(index);
        }
    }
    StoreError::from(e)
}

#[async_trait]
impl DocumentStore for MySqlStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, employee_code, full_name, email, department, created_at
            FROM employees
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        translate(rows)
    }

    async fn find_employee_by_id(&self, id: &ObjectId) -> Result<Option<Employee>, StoreError> {
        sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, employee_code, full_name, email, department, created_at
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Employee::try_from)
        .transpose()
    }

    async fn find_employee_by_code(&self, code: &str) -> Result<Option<Employee>, StoreError> {
        sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, employee_code, full_name, email, department, created_at
            FROM employees
            WHERE employee_code = ?
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?
        .map(Employee::try_from)
        .transpose()
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO employees
            (id, employee_code, full_name, email, department, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(employee.id.as_str())
        .bind(&employee.employee_code)
        .bind(&employee.full_name)
        .bind(&employee.email)
        .bind(&employee.department)
        .bind(employee.created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, EMPLOYEE_CODE_INDEX))?;

        Ok(())
    }

    async fn delete_employee(&self, id: &ObjectId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_attendance(
        &self,
        employee_ref: Option<&ObjectId>,
    ) -> Result<Vec<Attendance>, StoreError> {
        let rows = match employee_ref {
            Some(employee_ref) => {
                sqlx::query_as::<_, AttendanceRow>(
                    r#"
                    SELECT id, employee_ref, date, status, created_at
                    FROM attendance
                    WHERE employee_ref = ?
                    ORDER BY date DESC, created_at DESC, id DESC
                    "#,
                )
                .bind(employee_ref.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AttendanceRow>(
                    r#"
                    SELECT id, employee_ref, date, status, created_at
                    FROM attendance
                    ORDER BY date DESC, created_at DESC, id DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        translate(rows)
    }

    async fn find_attendance_by_id(
        &self,
        id: &ObjectId,
    ) -> Result<Option<Attendance>, StoreError> {
        sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, employee_ref, date, status, created_at
            FROM attendance
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Attendance::try_from)
        .transpose()
    }

    async fn find_attendance_on(
        &self,
        employee_ref: &ObjectId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError> {
        sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, employee_ref, date, status, created_at
            FROM attendance
            WHERE employee_ref = ? AND date = ?
            LIMIT 1
            "#,
        )
        .bind(employee_ref.as_str())
        .bind(day_timestamp(date))
        .fetch_optional(&self.pool)
        .await?
        .map(Attendance::try_from)
        .transpose()
    }

    async fn insert_attendance(&self, record: &Attendance) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO attendance
            (id, employee_ref, date, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.employee_ref.as_str())
        .bind(day_timestamp(record.date))
        .bind(record.status.to_string())
        .bind(record.created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, ATTENDANCE_DAY_INDEX))?;

        Ok(())
    }

    async fn delete_attendance(&self, id: &ObjectId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_attendance_for_employee(
        &self,
        employee_ref: &ObjectId,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM attendance WHERE employee_ref = ?")
            .bind(employee_ref.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee_row() -> EmployeeRow {
        EmployeeRow {
            id: Some("65A1F0C2E4B0A1B2C3D4E5F6".to_string()),
            employee_code: Some("Emp-1".to_string()),
            full_name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            department: Some("R&D".to_string()),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_micro_opt(9, 30, 0, 123_456)),
        }
    }

    #[test]
    fn complete_employee_row_translates() {
        let employee = Employee::try_from(employee_row()).unwrap();
        assert_eq!(employee.id.as_str(), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(employee.employee_code, "Emp-1");
        assert_eq!(
            employee.created_at.to_rfc3339(),
            "2024-01-01T09:30:00.123456+00:00"
        );
    }

    #[test]
    fn employee_row_missing_field_is_malformed() {
        let row = EmployeeRow {
            email: None,
            ..employee_row()
        };
        let err = Employee::try_from(row).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(ref m) if m.contains("employees.email")));
    }

    #[test]
    fn attendance_row_with_unknown_status_is_malformed() {
        let row = AttendanceRow {
            id: Some("65a1f3d9e4b0a1b2c3d4e5f7".to_string()),
            employee_ref: Some("65a1f0c2e4b0a1b2c3d4e5f6".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).map(day_timestamp),
            status: Some("Late".to_string()),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 5).map(day_timestamp),
        };
        let err = Attendance::try_from(row).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(ref m) if m.contains("attendance.status")));
    }

    #[test]
    fn attendance_row_drops_time_component_of_date() {
        let row = AttendanceRow {
            id: Some("65a1f3d9e4b0a1b2c3d4e5f7".to_string()),
            employee_ref: Some("65a1f0c2e4b0a1b2c3d4e5f6".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).map(day_timestamp),
            status: Some("Absent".to_string()),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 5).map(day_timestamp),
        };
        let record = Attendance::try_from(row).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(record.status, AttendanceStatus::Absent);
    }
}
