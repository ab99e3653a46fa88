//! Executor state and the frame funnel
//!
//! [`Executor`] walks a parsed program statement by statement. Everything that
//! produces a frame goes through [`Executor::execute_frame`], which runs the
//! work, snapshots the live result and appends it to the [`FrameRecorder`].
//!
//! # Control flow
//!
//! `return`, `break` and `continue` travel back up as [`ControlFlow`] values
//! returned from statement execution. Loops consume `Break`/`Continue`, calls
//! consume `Return`. A signal that reaches the top level (or escapes a
//! function body) has its own frame replaced by an ERROR frame.
//!
//! # Errors
//!
//! Runtime errors propagate with `?` to [`Executor::execute_program`], which
//! records one terminal ERROR frame and stops. Frames recorded before the
//! error are kept.

use crate::features::LanguageFeatures;
use crate::interpreter::builtins;
use crate::interpreter::errors::{RuntimeError, RuntimeErrorType};
use crate::memory::callable::{Callable, ExternalFunction};
use crate::memory::environment::{Binding, Environment, ScopeError};
use crate::memory::value::Value;
use crate::parser::ast::{Location, NodeType, Statement};
use crate::snapshot::{EvaluationResult, FrameRecord, FrameRecorder};
use crate::translator::{context, ErrorContext, Translator};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, warn};

/// Nested user function calls allowed before the run is stopped.
pub const MAX_CALL_DEPTH: usize = 200;

/// How a statement finished.
#[derive(Debug, Clone)]
pub(crate) enum ControlFlow {
    Normal,
    Return(Value, Location),
    Break(Location),
    Continue(Location),
}

/// Tree-walking interpreter for one run.
pub struct Executor<'a> {
    source: &'a str,
    pub(crate) features: &'a LanguageFeatures,
    pub(crate) translator: &'a Translator,
    pub(crate) environment: Rc<RefCell<Environment>>,
    /// Built-in namespaces and host functions; never part of a frame's variables
    globals: FxHashMap<String, Value>,
    pub(crate) recorder: FrameRecorder,
    total_loop_iterations: usize,
    pub(crate) call_depth: usize,
}

impl<'a> Executor<'a> {
    pub fn new(
        source: &'a str,
        features: &'a LanguageFeatures,
        translator: &'a Translator,
        external_functions: &[ExternalFunction],
    ) -> Self {
        let mut globals = FxHashMap::default();
        globals.insert("console".to_string(), builtins::console());
        globals.insert("Math".to_string(), builtins::math());
        for function in external_functions {
            globals.insert(function.name.clone(), Value::function(Callable::External(function.clone())));
        }

        Executor {
            source,
            features,
            translator,
            environment: Rc::new(RefCell::new(Environment::new())),
            globals,
            recorder: FrameRecorder::new(),
            total_loop_iterations: 0,
            call_depth: 0,
        }
    }

    /// Run every statement in order. Returns `false` if the run stopped on an error.
    pub fn execute_program(&mut self, statements: &[Statement]) -> bool {
        debug!(statements = statements.len(), "executing program");
        for statement in statements {
            if let Err(error) = self.execute_top_level(statement) {
                self.record_error(error, statement.node_type());
                return false;
            }
        }
        debug!(frames = self.recorder.frames().len(), "program finished");
        true
    }

    pub(crate) fn execute_top_level(&mut self, statement: &Statement) -> Result<(), RuntimeError> {
        let flow = self.execute_statement(statement)?;
        self.reject_escaped_signal(flow)
    }

    /// Turn a signal that left its boundary into an error, dropping the
    /// frame the offending statement recorded.
    pub(crate) fn reject_escaped_signal(&mut self, flow: ControlFlow) -> Result<(), RuntimeError> {
        let (error_type, location) = match flow {
            ControlFlow::Normal => return Ok(()),
            ControlFlow::Return(_, location) => (RuntimeErrorType::ReturnOutsideFunction, location),
            ControlFlow::Break(location) => (RuntimeErrorType::BreakOutsideLoop, location),
            ControlFlow::Continue(location) => (RuntimeErrorType::ContinueOutsideLoop, location),
        };
        self.recorder.pop();
        Err(self.error(error_type, location, ErrorContext::new()))
    }

    /// Run `work` and record its result as a SUCCESS frame.
    pub(crate) fn execute_frame<F>(
        &mut self,
        location: Location,
        node: NodeType,
        work: F,
    ) -> Result<EvaluationResult, RuntimeError>
    where
        F: FnOnce(&mut Self) -> Result<EvaluationResult, RuntimeError>,
    {
        let result = work(self)?;
        self.add_success_frame(location, node, &result);
        Ok(result)
    }

    /// Source text covered by `location`.
    pub(crate) fn code(&self, location: Location) -> String {
        location.to_code(self.source)
    }

    pub(crate) fn add_success_frame(&mut self, location: Location, node: NodeType, result: &EvaluationResult) {
        let variables = self.variables();
        self.recorder.record(FrameRecord {
            location,
            code: location.to_code(self.source),
            node,
            result: Some(result),
            error: None,
            variables: &variables,
        });
    }

    pub(crate) fn record_error(&mut self, error: RuntimeError, node: NodeType) {
        warn!(error_type = %error.error_type, line = error.location.line, "run stopped: {}", error.message);
        let variables = self.variables();
        let location = error.location;
        self.recorder.record(FrameRecord {
            location,
            code: location.to_code(self.source),
            node,
            result: None,
            error: Some(error),
            variables: &variables,
        });
    }

    /// Every binding visible from the current scope.
    pub fn variables(&self) -> BTreeMap<String, Value> {
        self.environment.borrow().get_all_variables()
    }

    /// Run `work` with `scope` as the current environment, restoring the
    /// previous one whether or not `work` succeeds.
    pub(crate) fn with_scope<T, F>(&mut self, scope: Rc<RefCell<Environment>>, work: F) -> Result<T, RuntimeError>
    where
        F: FnOnce(&mut Self) -> Result<T, RuntimeError>,
    {
        let previous = std::mem::replace(&mut self.environment, scope);
        let result = work(self);
        self.environment = previous;
        result
    }

    pub(crate) fn child_scope(&self) -> Rc<RefCell<Environment>> {
        Environment::with_enclosing(Rc::clone(&self.environment))
    }

    pub(crate) fn define_variable(
        &mut self,
        name: &str,
        value: Value,
        is_const: bool,
        location: Location,
    ) -> Result<(), RuntimeError> {
        let binding = Binding {
            value,
            is_const,
            location,
        };
        let defined = self
            .environment
            .borrow_mut()
            .define(name, binding, self.features.allow_shadowing);
        defined.map_err(|err| self.scope_error(err, name, location))
    }

    pub(crate) fn scope_error(&self, err: ScopeError, name: &str, location: Location) -> RuntimeError {
        let error_type = match err {
            ScopeError::AlreadyDeclared => RuntimeErrorType::VariableAlreadyDeclared,
            ScopeError::ShadowingDisabled => RuntimeErrorType::ShadowingDisabled,
            ScopeError::AssignmentToConstant => RuntimeErrorType::AssignmentToConstant,
        };
        self.error(error_type, location, context([("name", name)]))
    }

    /// Resolve a name through the scope chain, then the globals.
    pub(crate) fn lookup(&self, name: &str) -> Option<Value> {
        self.environment
            .borrow()
            .get(name)
            .or_else(|| self.globals.get(name).cloned())
    }

    pub(crate) fn is_global(&self, name: &str) -> bool {
        self.globals.contains_key(name)
    }

    pub(crate) fn assert_node_allowed(&self, node: NodeType, location: Location) -> Result<(), RuntimeError> {
        if self.features.is_node_allowed(node) {
            Ok(())
        } else {
            Err(self.error(RuntimeErrorType::NodeNotAllowed, location, context([("nodeType", node)])))
        }
    }

    /// Count one loop iteration against the run-wide budget.
    pub(crate) fn guard_infinite_loop(&mut self, location: Location) -> Result<(), RuntimeError> {
        self.total_loop_iterations += 1;
        let max = self.features.max_total_loop_iterations;
        if self.total_loop_iterations > max {
            return Err(self.error(RuntimeErrorType::MaxIterationsReached, location, context([("max", max)])));
        }
        Ok(())
    }

    /// Condition value as a boolean, honouring `allowTruthiness`.
    pub(crate) fn verify_boolean(&self, value: &Value, location: Location) -> Result<bool, RuntimeError> {
        if self.features.allow_truthiness {
            return Ok(value.is_truthy());
        }
        match value {
            Value::Boolean(b) => Ok(*b),
            other => Err(self.error(
                RuntimeErrorType::TruthinessDisabled,
                location,
                context([("type", other.type_name())]),
            )),
        }
    }

    pub(crate) fn error(&self, error_type: RuntimeErrorType, location: Location, context: ErrorContext) -> RuntimeError {
        RuntimeError::new(self.translator, error_type, location, context)
    }

    pub fn recorder(&self) -> &FrameRecorder {
        &self.recorder
    }

    pub fn into_recorder(self) -> FrameRecorder {
        self.recorder
    }
}
