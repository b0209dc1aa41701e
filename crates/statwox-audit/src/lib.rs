//! statwox-audit
//!
//! Application-level audit events. Each event is emitted through `tracing`
//! with `audit.*` fields; the API layer additionally persists it to the
//! audit log table. Recording an event never fails the operation it
//! describes.

pub mod events;
