//! statwox-storage
//!
//! SQLite persistence through `sqlx`. Each module is a set of free
//! functions over a `SqlitePool`, one module per table family. Writes that
//! touch more than one row run in a single transaction.
//!
//! UUIDs are stored as text and timestamps as microseconds since the Unix
//! epoch, so that `ORDER BY` on a timestamp column is chronological.

pub mod audit;
pub mod comments;
pub mod db;
pub mod error;
pub mod likes;
pub mod questions;
pub mod responses;
mod rows;
pub mod surveys;
pub mod users;
