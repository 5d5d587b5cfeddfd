use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{info, instrument};

use crate::error::HrError;
use crate::model::{
    attendance::{Attendance, AttendanceInput, AttendanceView},
    employee::Employee,
    object_id::ObjectId,
};
use crate::repository::resolver::{
    EMPLOYEE_NOT_FOUND, INVALID_EMPLOYEE_ID, IdentifierResolver, Reference, is_placeholder,
};
use crate::store::{DocumentStore, StoreError};
use crate::validation::validate_attendance;

pub const INVALID_ATTENDANCE_ID: &str = "Invalid attendance ID.";
pub const INVALID_ATTENDANCE_ID_FORMAT: &str = "Invalid attendance ID format.";
pub const ATTENDANCE_NOT_FOUND: &str = "Attendance record not found.";
pub const EMPLOYEE_NOT_SELECTABLE: &str = "Employee not found. Please select a valid employee.";

fn duplicate_date(employee: &Employee, record: &Attendance) -> HrError {
    HrError::DuplicateDate(format!(
        "Attendance already marked for {} on {}. Cannot mark attendance twice for the same date.",
        employee.full_name,
        record.date.format("%Y-%m-%d")
    ))
}

/// Attendance ids are native only; placeholders and malformed ids fail
/// before any lookup.
fn attendance_id(raw: &str) -> Result<ObjectId, HrError> {
    if is_placeholder(raw) {
        return Err(HrError::InvalidFormat(INVALID_ATTENDANCE_ID.to_string()));
    }
    ObjectId::parse(raw).ok_or_else(|| HrError::InvalidFormat(INVALID_ATTENDANCE_ID_FORMAT.to_string()))
}

#[derive(Clone)]
pub struct AttendanceRepository {
    store: Arc<dyn DocumentStore>,
    resolver: IdentifierResolver,
}

impl AttendanceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            resolver: IdentifierResolver::new(store.clone()),
            store,
        }
    }

    /// Lists attendance, optionally for one employee.
    ///
    /// A native-shaped reference that matches no employee is still used as the
    /// filter, so a deleted employee's history reads as empty and orphaned rows
    /// stay reachable. Unknown business codes are `NotFound`.
    #[instrument(name = "attendance_list", skip(self))]
    pub async fn list(
        &self,
        employee_reference: Option<&str>,
    ) -> Result<Vec<AttendanceView>, HrError> {
        let filter = match employee_reference {
            Some(raw) => Some(self.filter_for(raw).await?),
            None => None,
        };

        let records = self.store.list_attendance(filter.as_ref()).await?;
        self.denormalize(records).await
    }

    async fn filter_for(&self, raw: &str) -> Result<ObjectId, HrError> {
        let reference = Reference::classify(raw)
            .ok_or_else(|| HrError::InvalidFormat(INVALID_EMPLOYEE_ID.to_string()))?;

        if let Some(employee) = self.resolver.lookup(&reference).await? {
            return Ok(employee.id);
        }
        match reference {
            Reference::Native { id, .. } => Ok(id),
            Reference::BusinessCode(_) => Err(HrError::NotFound(EMPLOYEE_NOT_FOUND.to_string())),
        }
    }

    /// One employee lookup per record; order is preserved and a missing
    /// employee leaves the display fields empty.
    async fn denormalize(&self, records: Vec<Attendance>) -> Result<Vec<AttendanceView>, HrError> {
        let owners = try_join_all(
            records
                .iter()
                .map(|record| self.store.find_employee_by_id(&record.employee_ref)),
        )
        .await?;

        Ok(records
            .into_iter()
            .zip(owners)
            .map(|(record, owner)| AttendanceView::new(record, owner.as_ref()))
            .collect())
    }

    #[instrument(
        name = "attendance_create",
        skip(self, input),
        fields(employee = ?input.employee_id, date = ?input.date)
    )]
    pub async fn create(&self, input: &AttendanceInput) -> Result<AttendanceView, HrError> {
        let new = validate_attendance(input).map_err(HrError::Validation)?;

        let employee = match self.resolver.resolve(&new.employee_reference).await {
            Ok(employee) => employee,
            Err(HrError::NotFound(_)) | Err(HrError::InvalidFormat(_)) => {
                return Err(HrError::NotFound(EMPLOYEE_NOT_SELECTABLE.to_string()));
            }
            Err(e) => return Err(e),
        };

        let record = Attendance::create(employee.id.clone(), new.date, new.status);

        // the store compares canonical day timestamps
        if self
            .store
            .find_attendance_on(&employee.id, record.date)
            .await?
            .is_some()
        {
            return Err(duplicate_date(&employee, &record));
        }

        // the unique index closes the window between the check and the insert
        self.store
            .insert_attendance(&record)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey(_) => duplicate_date(&employee, &record),
                other => other.into(),
            })?;

        info!(
            id = %record.id,
            employee_code = %employee.employee_code,
            status = %record.status,
            "Attendance marked"
        );
        Ok(AttendanceView::new(record, Some(&employee)))
    }

    #[instrument(name = "attendance_get", skip(self))]
    pub async fn get_by_id(&self, raw_id: &str) -> Result<AttendanceView, HrError> {
        let id = attendance_id(raw_id)?;

        let record = self
            .store
            .find_attendance_by_id(&id)
            .await?
            .ok_or_else(|| HrError::NotFound(ATTENDANCE_NOT_FOUND.to_string()))?;
        let owner = self.store.find_employee_by_id(&record.employee_ref).await?;

        Ok(AttendanceView::new(record, owner.as_ref()))
    }

    #[instrument(name = "attendance_delete", skip(self))]
    pub async fn delete_by_id(&self, raw_id: &str) -> Result<(), HrError> {
        let id = attendance_id(raw_id)?;

        if self.store.delete_attendance(&id).await? == 0 {
            return Err(HrError::NotFound(ATTENDANCE_NOT_FOUND.to_string()));
        }

        info!(id = %id, "Attendance record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use crate::model::employee::EmployeeInput;
    use crate::repository::employee::EmployeeRepository;
    use crate::repository::testing::BlindStore;
    use crate::store::memory::MemoryStore;
    use chrono::NaiveDate;

    struct Fixture {
        store: Arc<MemoryStore>,
        employees: EmployeeRepository,
        attendance: AttendanceRepository,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        Fixture {
            employees: EmployeeRepository::new(store.clone()),
            attendance: AttendanceRepository::new(store.clone()),
            store,
        }
    }

    async fn hire(f: &Fixture, code: &str, name: &str) -> Employee {
        f.employees
            .create(&EmployeeInput {
                employee_id: Some(code.to_string()),
                full_name: Some(name.to_string()),
                email: Some("someone@example.com".to_string()),
                department: Some("Finance".to_string()),
            })
            .await
            .unwrap()
    }

    fn mark(employee: &str, date: &str, status: &str) -> AttendanceInput {
        AttendanceInput {
            employee_id: Some(employee.to_string()),
            date: Some(date.to_string()),
            status: Some(status.to_string()),
        }
    }

    #[actix_web::test]
    async fn create_denormalizes_employee_fields() {
        let f = fixture();
        let employee = hire(&f, "Emp-1", "Ada Lovelace").await;

        let view = f
            .attendance
            .create(&mark("Emp-1", "2024-01-05", "Present"))
            .await
            .unwrap();

        assert_eq!(view.employee_ref, employee.id);
        assert_eq!(view.employee_id.as_deref(), Some("Emp-1"));
        assert_eq!(view.employee_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(view.department.as_deref(), Some("Finance"));
        assert_eq!(view.status, AttendanceStatus::Present);
    }

    #[actix_web::test]
    async fn second_mark_on_same_day_is_rejected_and_first_kept() {
        let f = fixture();
        let employee = hire(&f, "Emp-1", "Ada Lovelace").await;
        let first = f
            .attendance
            .create(&mark("Emp-1", "2024-01-05", "Present"))
            .await
            .unwrap();

        // same employee addressed by native id this time
        let err = f
            .attendance
            .create(&mark(employee.id.as_str(), "2024-01-05", "Absent"))
            .await
            .unwrap_err();

        match err {
            HrError::DuplicateDate(message) => assert_eq!(
                message,
                "Attendance already marked for Ada Lovelace on 2024-01-05. \
                 Cannot mark attendance twice for the same date."
            ),
            other => panic!("expected duplicate date, got {other:?}"),
        }
        let records = f.attendance.list(Some("Emp-1")).await.unwrap();
        assert_eq!(records, vec![first]);
    }

    #[actix_web::test]
    async fn insert_race_surfaces_as_duplicate_date() {
        let f = fixture();
        let employee = hire(&f, "Emp-1", "Ada Lovelace").await;
        f.attendance
            .create(&mark("Emp-1", "2024-01-05", "Present"))
            .await
            .unwrap();

        let blind = AttendanceRepository::new(Arc::new(BlindStore::new(f.store.clone())));
        let err = blind
            .create(&mark(employee.id.as_str(), "2024-01-05", "Absent"))
            .await
            .unwrap_err();

        assert!(matches!(err, HrError::DuplicateDate(_)));
        assert_eq!(f.store.list_attendance(None).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn unknown_employee_is_not_found() {
        let f = fixture();
        for reference in ["Emp-404", "0123456789abcdef01234567", "null"] {
            let err = f
                .attendance
                .create(&mark(reference, "2024-01-05", "Present"))
                .await
                .unwrap_err();
            assert!(
                matches!(err, HrError::NotFound(ref m) if m == EMPLOYEE_NOT_SELECTABLE),
                "{reference:?} -> {err:?}"
            );
        }
        assert!(f.store.list_attendance(None).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn validation_runs_before_resolution() {
        let f = fixture();
        let err = f
            .attendance
            .create(&mark("Emp-404", "05/01/2024", "present"))
            .await
            .unwrap_err();

        match err {
            HrError::Validation(errors) => {
                assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["date", "status"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn list_filters_by_either_identifier() {
        let f = fixture();
        let ada = hire(&f, "Emp-1", "Ada Lovelace").await;
        hire(&f, "Emp-2", "Alan Turing").await;
        f.attendance.create(&mark("Emp-1", "2024-01-05", "Present")).await.unwrap();
        f.attendance.create(&mark("Emp-1", "2024-01-06", "Absent")).await.unwrap();
        f.attendance.create(&mark("Emp-2", "2024-01-05", "Present")).await.unwrap();

        assert_eq!(f.attendance.list(None).await.unwrap().len(), 3);
        let by_code = f.attendance.list(Some("Emp-1")).await.unwrap();
        let by_id = f.attendance.list(Some(ada.id.as_str())).await.unwrap();
        assert_eq!(by_code.len(), 2);
        assert_eq!(by_code, by_id);
        assert_eq!(
            by_code.iter().map(|v| v.date.to_string()).collect::<Vec<_>>(),
            vec!["2024-01-06", "2024-01-05"]
        );
    }

    #[actix_web::test]
    async fn list_with_unknown_business_code_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.attendance.list(Some("Emp-404")).await.unwrap_err(),
            HrError::NotFound(_)
        ));
    }

    #[actix_web::test]
    async fn list_after_employee_delete_is_empty() {
        let f = fixture();
        let employee = hire(&f, "Emp-1", "Ada Lovelace").await;
        f.attendance.create(&mark("Emp-1", "2024-01-05", "Present")).await.unwrap();

        f.employees.delete_by_reference("Emp-1").await.unwrap();

        assert!(f.attendance.list(Some(employee.id.as_str())).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn orphans_are_listed_with_null_display_fields() {
        let f = fixture();
        hire(&f, "Emp-1", "Ada Lovelace").await;
        f.attendance.create(&mark("Emp-1", "2024-01-05", "Present")).await.unwrap();
        let ghost = ObjectId::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        f.store
            .insert_attendance(&Attendance::create(ghost.clone(), date, AttendanceStatus::Absent))
            .await
            .unwrap();

        let views = f.attendance.list(None).await.unwrap();
        assert_eq!(views.len(), 2);
        let orphan = views.iter().find(|v| v.employee_ref == ghost).unwrap();
        assert_eq!(orphan.employee_id, None);
        assert_eq!(orphan.employee_name, None);
        assert_eq!(orphan.department, None);

        let filtered = f.attendance.list(Some(ghost.as_str())).await.unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[actix_web::test]
    async fn get_distinguishes_malformed_from_missing() {
        let f = fixture();
        hire(&f, "Emp-1", "Ada Lovelace").await;
        let created = f
            .attendance
            .create(&mark("Emp-1", "2024-01-05", "Present"))
            .await
            .unwrap();

        assert_eq!(f.attendance.get_by_id(created.id.as_str()).await.unwrap(), created);
        assert!(matches!(
            f.attendance.get_by_id("not-an-id").await.unwrap_err(),
            HrError::InvalidFormat(ref m) if m == INVALID_ATTENDANCE_ID_FORMAT
        ));
        assert!(matches!(
            f.attendance.get_by_id("null").await.unwrap_err(),
            HrError::InvalidFormat(ref m) if m == INVALID_ATTENDANCE_ID
        ));
        assert!(matches!(
            f.attendance.get_by_id("0123456789abcdef01234567").await.unwrap_err(),
            HrError::NotFound(_)
        ));
    }

    #[actix_web::test]
    async fn delete_removes_one_record() {
        let f = fixture();
        hire(&f, "Emp-1", "Ada Lovelace").await;
        let created = f
            .attendance
            .create(&mark("Emp-1", "2024-01-05", "Present"))
            .await
            .unwrap();

        f.attendance.delete_by_id(created.id.as_str()).await.unwrap();

        assert!(matches!(
            f.attendance.delete_by_id(created.id.as_str()).await.unwrap_err(),
            HrError::NotFound(_)
        ));
        assert!(f.attendance.list(None).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn concurrent_marks_admit_one_writer() {
        let f = fixture();
        hire(&f, "Emp-1", "Ada Lovelace").await;
        let present = mark("Emp-1", "2024-01-05", "Present");
        let absent = mark("Emp-1", "2024-01-05", "Absent");

        let (a, b) = futures::join!(f.attendance.create(&present), f.attendance.create(&absent));

        assert!(a.is_ok() ^ b.is_ok());
        assert_eq!(f.store.list_attendance(None).await.unwrap().len(), 1);
    }
}
