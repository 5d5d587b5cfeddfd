pub mod attendance;
pub mod employee;
pub mod resolver;

pub use attendance::AttendanceRepository;
pub use employee::{DeletionSummary, EmployeeRepository};
pub use resolver::{IdentifierResolver, Reference};
