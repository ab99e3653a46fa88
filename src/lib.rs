//! # Introduction
//!
//! tracejs parses and executes a teaching subset of JavaScript, recording a
//! [`snapshot::Frame`] for every observable step. The recorded trace can then
//! be scrubbed forward and backward, described in plain language, or browsed
//! in a terminal UI built with [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Executor → Frames → describers / TUI
//! ```
//!
//! 1. [`parser`] — tokenises the source and builds an AST, rejecting anything
//!    the exercise's [`LanguageFeatures`] do not allow.
//! 2. [`interpreter`] — walks the AST and records frames and console output.
//! 3. [`memory`] — runtime values, scopes and callables.
//! 4. [`snapshot`] — frames, log lines and the recorder that stamps them.
//! 5. [`describe`] — turns a frame into a sentence using a [`Translator`].
//! 6. [`ui`] — ratatui-based TUI; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use tracejs::{interpret, EvaluationContext, Value};
//!
//! let result = interpret("let x = 1 + 2;", &EvaluationContext::default());
//! assert!(result.success);
//! assert_eq!(result.frames[0].variables["x"], Value::from(3.0));
//! ```

pub mod describe;
pub mod features;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod snapshot;
pub mod translator;
pub mod ui;

pub use describe::describe_frame;
pub use features::{LanguageFeatures, StdlibAllowList, StdlibType};
pub use interpreter::api::{
    compile, evaluate_function, interpret, CompileResult, EvaluateFunctionResult, EvaluationContext,
    InterpretResult,
};
pub use interpreter::context::ExecutionContext;
pub use interpreter::errors::{HostError, RuntimeError, RuntimeErrorType};
pub use memory::callable::Arity;
pub use memory::value::Value;
pub use parser::errors::CompileError;
pub use translator::Translator;

/// Install a `tracing` subscriber that writes through the test harness.
/// Safe to call from many tests; only the first call installs it.
#[doc(hidden)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
