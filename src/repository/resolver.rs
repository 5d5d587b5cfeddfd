use std::sync::Arc;

use tracing::debug;

use crate::error::HrError;
use crate::model::{employee::Employee, object_id::ObjectId};
use crate::store::DocumentStore;

pub const INVALID_EMPLOYEE_ID: &str = "Invalid employee ID.";
pub const EMPLOYEE_NOT_FOUND: &str = "Employee not found.";

/// Blank input or the literal `null` / `undefined` a UI sends for an unset id.
pub fn is_placeholder(raw: &str) -> bool {
    matches!(raw.trim(), "" | "null" | "undefined")
}

/// Caller-supplied employee reference, classified once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Native-shaped input. `raw` is kept for the business-code fallback.
    Native { id: ObjectId, raw: String },
    BusinessCode(String),
}

impl Reference {
    /// `None` for placeholders, which never reach the store.
    pub fn classify(raw: &str) -> Option<Self> {
        if is_placeholder(raw) {
            return None;
        }
        Some(match ObjectId::parse(raw) {
            Some(id) => Reference::Native {
                id,
                raw: raw.to_string(),
            },
            None => Reference::BusinessCode(raw.to_string()),
        })
    }
}

/// Resolves either identifier scheme to the owning employee document.
#[derive(Clone)]
pub struct IdentifierResolver {
    store: Arc<dyn DocumentStore>,
}

impl IdentifierResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, raw: &str) -> Result<Employee, HrError> {
        let reference = Reference::classify(raw)
            .ok_or_else(|| HrError::InvalidFormat(INVALID_EMPLOYEE_ID.to_string()))?;

        self.lookup(&reference)
            .await?
            .ok_or_else(|| HrError::NotFound(EMPLOYEE_NOT_FOUND.to_string()))
    }

    /// Native id first, then business code with the raw input.
    pub async fn lookup(&self, reference: &Reference) -> Result<Option<Employee>, HrError> {
        match reference {
            Reference::Native { id, raw } => {
                if let Some(employee) = self.store.find_employee_by_id(id).await? {
                    return Ok(Some(employee));
                }
                debug!(reference = %raw, "No employee with this native id, trying business code");
                Ok(self.store.find_employee_by_code(raw).await?)
            }
            Reference::BusinessCode(code) => Ok(self.store.find_employee_by_code(code).await?),
        }
    }
}
