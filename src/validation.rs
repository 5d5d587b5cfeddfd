use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::model::{
    attendance::{AttendanceInput, AttendanceStatus, NewAttendance},
    employee::{EmployeeInput, NewEmployee},
};

pub const MAX_EMPLOYEE_CODE_LEN: usize = 50;
pub const MAX_FULL_NAME_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_DEPARTMENT_LEN: usize = 100;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

/// Field name -> human readable messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Trimmed, non-empty value of a required field, or `None` with the error recorded.
fn required<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a str>,
    message: &str,
) -> Option<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, message);
            None
        }
    }
}

fn within_limit(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> bool {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this field has no more than {} characters.", max),
        );
        return false;
    }
    true
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Validates every employee field and returns the normalised record fields.
/// All failures are collected before returning.
pub fn validate_employee(input: &EmployeeInput) -> Result<NewEmployee, FieldErrors> {
    let mut errors = FieldErrors::new();

    let employee_code = required(
        &mut errors,
        "employee_id",
        input.employee_id.as_deref(),
        "Employee ID is required and cannot be empty.",
    )
    .filter(|v| within_limit(&mut errors, "employee_id", v, MAX_EMPLOYEE_CODE_LEN));

    let full_name = required(
        &mut errors,
        "full_name",
        input.full_name.as_deref(),
        "Full name is required and cannot be empty.",
    )
    .filter(|v| within_limit(&mut errors, "full_name", v, MAX_FULL_NAME_LEN));

    let email = required(
        &mut errors,
        "email",
        input.email.as_deref(),
        "Email is required and cannot be empty.",
    )
    .filter(|v| {
        if !is_valid_email(v) {
            errors.add("email", "Enter a valid email address.");
            return false;
        }
        within_limit(&mut errors, "email", v, MAX_EMAIL_LEN)
    })
    .map(str::to_lowercase);

    let department = required(
        &mut errors,
        "department",
        input.department.as_deref(),
        "Department is required and cannot be empty.",
    )
    .filter(|v| within_limit(&mut errors, "department", v, MAX_DEPARTMENT_LEN));

    match (employee_code, full_name, email, department) {
        (Some(employee_code), Some(full_name), Some(email), Some(department))
            if errors.is_empty() =>
        {
            Ok(NewEmployee {
                employee_code: employee_code.to_string(),
                full_name: full_name.to_string(),
                email,
                department: department.to_string(),
            })
        }
        _ => Err(errors),
    }
}

/// Validates an attendance payload. The employee reference is only checked for
/// presence here; resolving it needs the store.
pub fn validate_attendance(input: &AttendanceInput) -> Result<NewAttendance, FieldErrors> {
    let mut errors = FieldErrors::new();

    let employee_reference = required(
        &mut errors,
        "employee_id",
        input.employee_id.as_deref(),
        "Employee is required.",
    );

    let date = required(
        &mut errors,
        "date",
        input.date.as_deref(),
        "Date is required.",
    )
    .and_then(|v| match NaiveDate::parse_from_str(v, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add("date", "Date has wrong format. Use YYYY-MM-DD.");
            None
        }
    });

    let status = required(
        &mut errors,
        "status",
        input.status.as_deref(),
        "Status is required.",
    )
    // the raw value is matched, so " Present" is rejected
    .and(input.status.as_deref())
    .and_then(|v| match AttendanceStatus::from_str(v) {
        Ok(status) => Some(status),
        Err(_) => {
            let allowed = AttendanceStatus::ALL
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            errors.add("status", format!("Status must be one of: {}", allowed));
            None
        }
    });

    match (employee_reference, date, status) {
        (Some(employee_reference), Some(date), Some(status)) => Ok(NewAttendance {
            employee_reference: employee_reference.to_string(),
            date,
            status,
        }),
        _ => Err(errors),
    }
}
