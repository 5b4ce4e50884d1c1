pub mod confirm;
pub mod form;
pub mod metrics;
pub mod state;
pub mod table;

pub use confirm::{Confirmation, PendingAction};
pub use form::{FormField, FormInput, JobForm};
pub use metrics::DashboardMetrics;
pub use state::{JobListView, Modal};
