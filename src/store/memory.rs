use std::cmp::Reverse;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::{
    attendance::{Attendance, day_timestamp},
    employee::Employee,
    object_id::ObjectId,
};
use crate::store::{ATTENDANCE_DAY_INDEX, DocumentStore, EMPLOYEE_CODE_INDEX, StoreError};

const PRIMARY_INDEX: &str = "PRIMARY";

#[derive(Default)]
struct Collections {
    employees: Vec<Employee>,
    attendance: Vec<Attendance>,
}

/// In-process store for tests and local development. Every operation runs
/// under one lock, so index checks and inserts are atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let mut employees = self.lock()?.employees.clone();
        employees.sort_by_key(|e| Reverse((e.created_at, e.id.clone())));
        Ok(employees)
    }

    async fn find_employee_by_id(&self, id: &ObjectId) -> Result<Option<Employee>, StoreError> {
        Ok(self.lock()?.employees.iter().find(|e| &e.id == id).cloned())
    }

    async fn find_employee_by_code(&self, code: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .lock()?
            .employees
            .iter()
            .find(|e| e.employee_code == code)
            .cloned())
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        if collections.employees.iter().any(|e| e.id == employee.id) {
            return Err(StoreError::DuplicateKey(PRIMARY_INDEX));
        }
        if collections
            .employees
            .iter()
            .any(|e| e.employee_code == employee.employee_code)
        {
            return Err(StoreError::DuplicateKey(EMPLOYEE_CODE_INDEX));
        }
        collections.employees.push(employee.clone());
        Ok(())
    }

    async fn delete_employee(&self, id: &ObjectId) -> Result<u64, StoreError> {
        let mut collections = self.lock()?;
        let before = collections.employees.len();
        collections.employees.retain(|e| &e.id != id);
        Ok((before - collections.employees.len()) as u64)
    }

    async fn list_attendance(
        &self,
        employee_ref: Option<&ObjectId>,
    ) -> Result<Vec<Attendance>, StoreError> {
        let mut records: Vec<Attendance> = self
            .lock()?
            .attendance
            .iter()
            .filter(|a| employee_ref.is_none_or(|r| &a.employee_ref == r))
            .cloned()
            .collect();
        records.sort_by_key(|a| Reverse((a.date, a.created_at, a.id.clone())));
        Ok(records)
    }

    async fn find_attendance_by_id(
        &self,
        id: &ObjectId,
    ) -> Result<Option<Attendance>, StoreError> {
        Ok(self.lock()?.attendance.iter().find(|a| &a.id == id).cloned())
    }

    async fn find_attendance_on(
        &self,
        employee_ref: &ObjectId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError> {
        let day = day_timestamp(date);
        Ok(self
            .lock()?
            .attendance
            .iter()
            .find(|a| &a.employee_ref == employee_ref && day_timestamp(a.date) == day)
            .cloned())
    }

    async fn insert_attendance(&self, record: &Attendance) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        if collections.attendance.iter().any(|a| a.id == record.id) {
            return Err(StoreError::DuplicateKey(PRIMARY_INDEX));
        }
        let day = day_timestamp(record.date);
        if collections
            .attendance
            .iter()
            .any(|a| a.employee_ref == record.employee_ref && day_timestamp(a.date) == day)
        {
            return Err(StoreError::DuplicateKey(ATTENDANCE_DAY_INDEX));
        }
        collections.attendance.push(record.clone());
        Ok(())
    }

    async fn delete_attendance(&self, id: &ObjectId) -> Result<u64, StoreError> {
        let mut collections = self.lock()?;
        let before = collections.attendance.len();
        collections.attendance.retain(|a| &a.id != id);
        Ok((before - collections.attendance.len()) as u64)
    }

    async fn delete_attendance_for_employee(
        &self,
        employee_ref: &ObjectId,
    ) -> Result<u64, StoreError> {
        let mut collections = self.lock()?;
        let before = collections.attendance.len();
        collections.attendance.retain(|a| &a.employee_ref != employee_ref);
        Ok((before - collections.attendance.len()) as u64)
    }
}
