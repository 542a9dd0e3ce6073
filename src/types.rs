pub mod interval;
pub mod record_id;

// Re-export types for convenience.
pub use crate::types::interval::Interval;
pub use crate::types::record_id::RecordId;
