pub mod attendance;
pub mod employee;
pub mod object_id;
