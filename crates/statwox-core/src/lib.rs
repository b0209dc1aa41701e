//! statwox-core
//!
//! Pure domain types, JS-compatible numeric parsing, and the skip-logic
//! evaluator. No I/O. This is the shared vocabulary of the StatWoX system,
//! used identically by the API, the builder preview, and the responder.

pub mod error;
pub mod models;
pub mod numeric;
pub mod skip_logic;
