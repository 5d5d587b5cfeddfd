//! Document store collaborator.
//!
//! Two collections, `employees` and `attendance`, addressed by native
//! [`ObjectId`]s. Implementations enforce two unique indexes: the employee
//! business code and the (employee, day) pair of attendance records.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{attendance::Attendance, employee::Employee, object_id::ObjectId};

pub mod memory;
pub mod mysql;

pub const EMPLOYEE_CODE_INDEX: &str = "uq_employees_code";
pub const ATTENDANCE_DAY_INDEX: &str = "uq_attendance_employee_date";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key on index {0}")]
    DuplicateKey(&'static str),

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All employees, most recently created first.
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;

    async fn find_employee_by_id(&self, id: &ObjectId) -> Result<Option<Employee>, StoreError>;

    async fn find_employee_by_code(&self, code: &str) -> Result<Option<Employee>, StoreError>;

    /// Fails with [`StoreError::DuplicateKey`] when the business code is taken.
    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError>;

    /// Returns the number of removed documents (0 or 1).
    async fn delete_employee(&self, id: &ObjectId) -> Result<u64, StoreError>;

    /// Attendance records, optionally restricted to one employee, ordered by
    /// date, then creation time, newest first.
    async fn list_attendance(
        &self,
        employee_ref: Option<&ObjectId>,
    ) -> Result<Vec<Attendance>, StoreError>;

    async fn find_attendance_by_id(&self, id: &ObjectId)
    -> Result<Option<Attendance>, StoreError>;

    async fn find_attendance_on(
        &self,
        employee_ref: &ObjectId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError>;

    /// Fails with [`StoreError::DuplicateKey`] when the employee already has a
    /// record on that day.
    async fn insert_attendance(&self, record: &Attendance) -> Result<(), StoreError>;

    async fn delete_attendance(&self, id: &ObjectId) -> Result<u64, StoreError>;

    async fn delete_attendance_for_employee(&self, employee_ref: &ObjectId)
    -> Result<u64, StoreError>;
}
