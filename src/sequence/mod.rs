//! Sequence validation
//!
//! A group may only be merged when its parts form a complete run 1..N.

pub mod validator;

pub use validator::{validate_group, ValidatedSequence, ValidationFailure};
