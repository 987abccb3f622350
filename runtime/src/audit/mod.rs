//! Run audit trail.

pub mod logger;

pub use logger::{AuditEvent, AuditLogger};
