pub mod import;
pub mod job;
pub mod validation;
