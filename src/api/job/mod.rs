pub mod dto;
pub mod guard;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use models::{Job, JobCreate, JobStatus, JobUpdate};
pub use service::{JobService, ServiceError};
