//! statwox-export
//!
//! Tabular export of a survey's responses. One row per response, one
//! column per question, quoted per RFC 4180 by the `csv` crate.

pub mod error;
pub mod table;
