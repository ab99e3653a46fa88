//! Runtime error types
//!
//! [`RuntimeError`] is what stops an interpretation. It always ends up as the
//! `error` of a terminal ERROR frame; frames recorded before it stay valid.
//!
//! Two narrower error types feed into it:
//! - [`StdlibError`]: raised by built-in functions, which know the failure but
//!   not the source location; the executor attaches the location.
//! - [`HostError`]: returned by embedder-supplied functions. `Logic` becomes
//!   `LogicErrorInExecution`; `Failure` becomes `FunctionExecutionError`.

use crate::parser::ast::Location;
use crate::translator::{ErrorContext, Translator};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeErrorType {
    InvalidBinaryExpression,
    InvalidUnaryExpression,
    UnsupportedOperation,
    VariableNotDeclared,
    VariableAlreadyDeclared,
    ShadowingDisabled,
    AssignmentToConstant,
    ComparisonRequiresNumber,
    TruthinessDisabled,
    TypeCoercionNotAllowed,
    StrictEqualityRequired,
    IndexOutOfRange,
    TypeError,
    PropertyNotFound,
    ArgumentError,
    NodeNotAllowed,
    FunctionNotFound,
    InvalidNumberOfArguments,
    FunctionExecutionError,
    LogicErrorInExecution,
    ReturnOutsideFunction,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    ForOfLoopTargetNotIterable,
    ForInLoopTargetNotObject,
    InOperatorRequiresObject,
    InOperatorRequiresStringKey,
    InWithArrayNotAllowed,
    RepeatCountMustBeNumber,
    RepeatCountMustBeNonNegative,
    RepeatCountTooHigh,
    MethodNotYetImplemented,
    MethodNotYetAvailable,
    MaxIterationsReached,
    MaxCallDepthReached,
    StringTooLong,
}

impl RuntimeErrorType {
    pub fn name(&self) -> String {
        format!("{:?}", self)
    }

    pub fn translation_key(&self) -> String {
        format!("error.runtime.{:?}", self)
    }
}

impl fmt::Display for RuntimeErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
    pub location: Location,
    pub error_type: RuntimeErrorType,
    pub context: ErrorContext,
}

impl RuntimeError {
    pub fn new(
        translator: &Translator,
        error_type: RuntimeErrorType,
        location: Location,
        context: ErrorContext,
    ) -> Self {
        RuntimeError {
            message: translator.translate(&error_type.translation_key(), &context),
            location,
            error_type,
            context,
        }
    }
}

/// Failure inside a built-in function, located by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error_type}")]
pub struct StdlibError {
    pub error_type: RuntimeErrorType,
    pub context: ErrorContext,
}

impl StdlibError {
    pub fn new(error_type: RuntimeErrorType, context: ErrorContext) -> Self {
        StdlibError { error_type, context }
    }

    pub fn into_runtime(self, translator: &Translator, location: Location) -> RuntimeError {
        RuntimeError::new(translator, self.error_type, location, self.context)
    }
}

/// Error returned by an embedder-supplied function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The student's inputs caused a defined failure
    #[error("{0}")]
    Logic(String),
    /// Anything else that went wrong inside the host function
    #[error("{0}")]
    Failure(String),
}
