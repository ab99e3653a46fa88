//! JavaScript execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: the [`Executor`](engine::Executor), its scope handling and
//!   the frame funnel
//! - `statements`, `loops`, `jumps`, `expressions`, `calls` and `ops`:
//!   execution of each node kind
//! - `builtins` and `stdlib`: `console`, `Math`, and string/array members
//! - [`errors`]: runtime error types
//! - [`api`]: `compile`, `interpret` and `evaluate_function`
//!
//! # Execution Model
//!
//! The executor walks the AST and executes statements one at a time. Every
//! statement that does observable work records a [`Frame`](crate::snapshot::Frame)
//! holding its result and a deep copy of the visible variables, so the trace
//! can be replayed without running the program again.

pub mod api;
mod builtins;
mod calls;
pub mod context;
pub mod engine;
pub mod errors;
mod expressions;
mod jumps;
mod loops;
mod ops;
mod statements;
mod stdlib;
