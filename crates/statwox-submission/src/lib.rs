//! statwox-submission
//!
//! Acceptance rules for incoming responses. Pure checks over a survey
//! snapshot and the submitted answers; lookups that need storage (identity,
//! duplicate detection) are performed by the caller between these stages:
//!
//! 1. [`validate::check_admission`]: publication status, close date, quota,
//!    access password, IP allowlist.
//! 2. [`validate::check_identity`]: anonymous submissions against `allowAnon`.
//! 3. [`validate::check_answers`]: answer set shape, question membership,
//!    required answers among the skip-logic-visible questions.
//!
//! [`anomaly::flag_response`] then annotates the accepted response.

pub mod anomaly;
pub mod error;
pub mod ip;
pub mod validate;
