pub mod client;
pub mod memory;

pub use client::{HttpJobStore, JobStore, StoreError};
pub use memory::MemoryJobStore;
