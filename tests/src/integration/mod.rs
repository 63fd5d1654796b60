//! Pipeline scenarios.

pub mod end_to_end;
pub mod failures;
pub mod resume;
