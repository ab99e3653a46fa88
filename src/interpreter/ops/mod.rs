//! Operator evaluation, split by operator family
//!
//! - [`binary`]: arithmetic, comparison, equality, `&&`/`||`, `in`
//! - [`unary`]: `-`, `+`, `!`
//! - [`assign`]: `=`, `++`, `--`
//! - [`access`]: `.` and `[]` reads, index validation
//!
//! All of these are `impl Executor` blocks.

pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;
