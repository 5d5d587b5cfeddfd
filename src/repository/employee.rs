use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::HrError;
use crate::model::employee::{Employee, EmployeeInput};
use crate::repository::resolver::{EMPLOYEE_NOT_FOUND, IdentifierResolver};
use crate::store::{DocumentStore, StoreError};
use crate::validation::validate_employee;

/// Outcome of a cascading employee delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionSummary {
    pub employee_code: String,
    pub attendance_removed: u64,
}

impl DeletionSummary {
    pub fn message(&self) -> String {
        let mut message = format!("Employee {} deleted successfully.", self.employee_code);
        if self.attendance_removed > 0 {
            message.push_str(&format!(
                " Also removed {} attendance record(s).",
                self.attendance_removed
            ));
        }
        message
    }
}

#[derive(Clone)]
pub struct EmployeeRepository {
    store: Arc<dyn DocumentStore>,
    resolver: IdentifierResolver,
}

impl EmployeeRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            resolver: IdentifierResolver::new(store.clone()),
            store,
        }
    }

    #[instrument(name = "employee_list", skip(self))]
    pub async fn list(&self) -> Result<Vec<Employee>, HrError> {
        Ok(self.store.list_employees().await?)
    }

    #[instrument(
        name = "employee_create",
        skip(self, input),
        fields(employee_code = ?input.employee_id)
    )]
    pub async fn create(&self, input: &EmployeeInput) -> Result<Employee, HrError> {
        let new = validate_employee(input).map_err(HrError::Validation)?;

        if self
            .store
            .find_employee_by_code(&new.employee_code)
            .await?
            .is_some()
        {
            return Err(HrError::DuplicateCode(new.employee_code));
        }

        let employee = Employee::create(new);

        // a concurrent create can win between the check above and this insert
        self.store
            .insert_employee(&employee)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey(_) => HrError::DuplicateCode(employee.employee_code.clone()),
                other => other.into(),
            })?;

        info!(id = %employee.id, employee_code = %employee.employee_code, "Employee created");
        Ok(employee)
    }

    #[instrument(name = "employee_get", skip(self))]
    pub async fn get_by_reference(&self, reference: &str) -> Result<Employee, HrError> {
        self.resolver.resolve(reference).await
    }

    /// Removes the employee's attendance first, then the employee, so an
    /// interruption can leave orphaned attendance but never a half-deleted
    /// employee.
    #[instrument(name = "employee_delete", skip(self))]
    pub async fn delete_by_reference(&self, reference: &str) -> Result<DeletionSummary, HrError> {
        let employee = self.resolver.resolve(reference).await?;

        let attendance_removed = self
            .store
            .delete_attendance_for_employee(&employee.id)
            .await?;

        if self.store.delete_employee(&employee.id).await? == 0 {
            return Err(HrError::NotFound(EMPLOYEE_NOT_FOUND.to_string()));
        }

        let summary = DeletionSummary {
            employee_code: employee.employee_code,
            attendance_removed,
        };
        info!(id = %employee.id, attendance_removed, "{}", summary.message());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{Attendance, AttendanceStatus};
    use crate::repository::testing::BlindStore;
    use crate::store::memory::MemoryStore;
    use chrono::NaiveDate;

    fn input(code: &str, email: &str) -> EmployeeInput {
        EmployeeInput {
            employee_id: Some(code.to_string()),
            full_name: Some("Ada Lovelace".to_string()),
            email: Some(email.to_string()),
            department: Some("Engineering".to_string()),
        }
    }

    fn repo() -> (EmployeeRepository, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (EmployeeRepository::new(store.clone()), store)
    }

    #[actix_web::test]
    async fn created_employee_is_readable_by_either_identifier() {
        let (repo, _) = repo();
        let created = repo.create(&input("Emp-1", "Ada@Example.com")).await.unwrap();

        assert_eq!(created.email, "ada@example.com");
        assert_eq!(repo.get_by_reference(created.id.as_str()).await.unwrap(), created);
        assert_eq!(repo.get_by_reference("Emp-1").await.unwrap(), created);
    }

    #[actix_web::test]
    async fn duplicate_code_is_rejected_and_store_keeps_one() {
        let (repo, _) = repo();
        repo.create(&input("Emp-1", "a@example.com")).await.unwrap();

        let err = repo
            .create(&input("Emp-1", "b@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::DuplicateCode(ref code) if code == "Emp-1"));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn codes_differing_in_case_are_distinct() {
        let (repo, _) = repo();
        repo.create(&input("Emp-1", "a@example.com")).await.unwrap();
        repo.create(&input("EMP-1", "b@example.com")).await.unwrap();

        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn invalid_email_writes_nothing() {
        let (repo, _) = repo();
        let err = repo.create(&input("Emp-1", "not-an-email")).await.unwrap_err();

        match err {
            HrError::Validation(errors) => {
                assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn insert_race_surfaces_as_duplicate_code() {
        let store = Arc::new(MemoryStore::new());
        let repo = EmployeeRepository::new(store.clone());
        repo.create(&input("Emp-1", "a@example.com")).await.unwrap();

        // the existence check misses, the unique index still rejects
        let blind = EmployeeRepository::new(Arc::new(BlindStore::new(store.clone())));
        let err = blind
            .create(&input("Emp-1", "b@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, HrError::DuplicateCode(_)));
        assert_eq!(store.list_employees().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn concurrent_creates_admit_one_writer() {
        let (repo, store) = repo();
        let first = input("Emp-1", "a@example.com");
        let second = input("Emp-1", "b@example.com");

        let (a, b) = futures::join!(repo.create(&first), repo.create(&second));

        assert!(a.is_ok() ^ b.is_ok());
        assert_eq!(store.list_employees().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn delete_cascades_to_attendance() {
        let (repo, store) = repo();
        let employee = repo.create(&input("Emp-1", "a@example.com")).await.unwrap();
        let other = repo.create(&input("Emp-2", "b@example.com")).await.unwrap();
        for day in 1..=3 {
            let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            store
                .insert_attendance(&Attendance::create(employee.id.clone(), date, AttendanceStatus::Present))
                .await
                .unwrap();
        }
        let kept_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        store
            .insert_attendance(&Attendance::create(other.id.clone(), kept_date, AttendanceStatus::Absent))
            .await
            .unwrap();

        let documents_before =
            store.list_employees().await.unwrap().len() + store.list_attendance(None).await.unwrap().len();
        let summary = repo.delete_by_reference("Emp-1").await.unwrap();
        let documents_after =
            store.list_employees().await.unwrap().len() + store.list_attendance(None).await.unwrap().len();

        assert_eq!(summary.attendance_removed, 3);
        assert_eq!(documents_before - documents_after, 4);
        assert_eq!(
            summary.message(),
            "Employee Emp-1 deleted successfully. Also removed 3 attendance record(s)."
        );
        assert!(matches!(
            repo.get_by_reference(employee.id.as_str()).await.unwrap_err(),
            HrError::NotFound(_)
        ));
        assert!(store.list_attendance(Some(&employee.id)).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn delete_without_attendance_has_short_message() {
        let (repo, _) = repo();
        let employee = repo.create(&input("Emp-9", "a@example.com")).await.unwrap();

        let summary = repo.delete_by_reference(employee.id.as_str()).await.unwrap();
        assert_eq!(summary.attendance_removed, 0);
        assert_eq!(summary.message(), "Employee Emp-9 deleted successfully.");
    }

    #[actix_web::test]
    async fn delete_of_unknown_reference_is_not_found() {
        let (repo, _) = repo();
        assert!(matches!(
            repo.delete_by_reference("Emp-404").await.unwrap_err(),
            HrError::NotFound(_)
        ));
        assert!(matches!(
            repo.delete_by_reference("undefined").await.unwrap_err(),
            HrError::InvalidFormat(_)
        ));
    }

    #[actix_web::test]
    async fn list_is_stable_without_writes() {
        let (repo, _) = repo();
        for n in 1..=5 {
            repo.create(&input(&format!("Emp-{n}"), "a@example.com"))
                .await
                .unwrap();
        }

        let first = repo.list().await.unwrap();
        let second = repo.list().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }
}
