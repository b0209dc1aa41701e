//! statwox-auth
//!
//! Identity primitives: HS256 session tokens and bcrypt password hashing.
//! Account lookup lives in storage; this crate only signs, verifies, and
//! compares.

pub mod error;
pub mod jwt;
pub mod password;
