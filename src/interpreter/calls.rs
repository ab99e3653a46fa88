//! Function calls
//!
//! Arguments are evaluated left to right in the caller's scope, then the
//! argument count is checked, then the callable runs. User functions run in a
//! new scope whose parent is the closure captured at definition time.

use crate::interpreter::context::ExecutionContext;
use crate::interpreter::engine::{ControlFlow, Executor, MAX_CALL_DEPTH};
use crate::interpreter::errors::{HostError, RuntimeError, RuntimeErrorType};
use crate::memory::callable::{Callable, ExternalFunction, NativeFunction};
use crate::memory::environment::Environment;
use crate::memory::value::Value;
use crate::parser::ast::{Expression, FunctionDeclaration, Location};
use crate::parser::callee_name;
use crate::translator::context;
use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tracing::{trace, warn};

/// Result of a call plus what describers need to explain it.
pub(crate) struct CallOutcome {
    pub value: Value,
    pub callee: String,
    pub args: Vec<Value>,
}

impl<'a> Executor<'a> {
    pub(crate) fn evaluate_call(
        &mut self,
        callee: &Expression,
        args: &[Expression],
        location: Location,
    ) -> Result<CallOutcome, RuntimeError> {
        let function = match callee {
            Expression::Identifier {
                name,
                location: name_location,
            } => self.lookup(name).ok_or_else(|| {
                self.error(RuntimeErrorType::FunctionNotFound, *name_location, context([("name", name)]))
            })?,
            _ => self.evaluate(callee)?,
        };
        let callable = match &function {
            Value::Function(callable) => Rc::clone(callable),
            _ => {
                return Err(self.type_error(format!("{} is not a function", callee_name(callee)), location));
            }
        };

        let values = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<Result<Vec<_>, _>>()?;
        self.check_arity(&callable, values.len(), location)?;

        let value = self.call_function(&callable, values.clone(), location)?;
        Ok(CallOutcome {
            value,
            callee: callee_name(callee),
            args: values,
        })
    }

    pub(crate) fn check_arity(&self, callable: &Callable, count: usize, location: Location) -> Result<(), RuntimeError> {
        let arity = callable.arity();
        if arity.accepts(count) {
            return Ok(());
        }
        Err(self.error(
            RuntimeErrorType::InvalidNumberOfArguments,
            location,
            context([
                ("function", callable.name()),
                ("expected", arity.expected()),
                ("got", count.to_string()),
            ]),
        ))
    }

    pub(crate) fn call_function(
        &mut self,
        callable: &Callable,
        args: Vec<Value>,
        location: Location,
    ) -> Result<Value, RuntimeError> {
        trace!(function = %callable.name(), args = args.len(), "call");
        match callable {
            Callable::UserDefined { declaration, closure } => {
                self.call_user_function(declaration, closure, args, location)
            }
            Callable::Stdlib(function) => self.call_native(function, &Value::Undefined, &args, location),
            Callable::BoundMethod { receiver, method } => self.call_native(method, receiver, &args, location),
            Callable::External(function) => self.call_external(function, &args, location),
        }
    }

    fn call_user_function(
        &mut self,
        declaration: &Rc<FunctionDeclaration>,
        closure: &Rc<RefCell<Environment>>,
        args: Vec<Value>,
        location: Location,
    ) -> Result<Value, RuntimeError> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(self.error(
                RuntimeErrorType::MaxCallDepthReached,
                location,
                context([("max", MAX_CALL_DEPTH)]),
            ));
        }

        let scope = Environment::with_enclosing(Rc::clone(closure));
        self.call_depth += 1;
        let result = self.with_scope(scope, |this| {
            for (param, arg) in declaration.params.iter().zip(args) {
                this.define_variable(&param.name, arg, false, param.location)?;
            }
            for statement in &declaration.body {
                match this.execute_statement(statement)? {
                    ControlFlow::Normal => {}
                    ControlFlow::Return(value, _) => return Ok(value),
                    signal => {
                        this.reject_escaped_signal(signal)?;
                    }
                }
            }
            Ok(Value::Undefined)
        });
        self.call_depth -= 1;
        result
    }

    fn call_native(
        &mut self,
        function: &NativeFunction,
        receiver: &Value,
        args: &[Value],
        location: Location,
    ) -> Result<Value, RuntimeError> {
        let Some(call) = function.call else {
            return Err(self.error(
                RuntimeErrorType::MethodNotYetImplemented,
                location,
                context([("method", function.name)]),
            ));
        };
        let mut ctx = ExecutionContext::new(&mut self.recorder, self.features);
        call(&mut ctx, receiver, args).map_err(|err| err.into_runtime(self.translator, location))
    }

    fn call_external(
        &mut self,
        function: &ExternalFunction,
        args: &[Value],
        location: Location,
    ) -> Result<Value, RuntimeError> {
        let mut ctx = ExecutionContext::new(&mut self.recorder, self.features);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (function.func)(&mut ctx, args)))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                warn!(function = %function.name, %message, "host function panicked");
                Err(HostError::Failure(message))
            });
        match outcome {
            Ok(value) => Ok(value),
            Err(HostError::Logic(message)) => Err(self.error(
                RuntimeErrorType::LogicErrorInExecution,
                location,
                context([("message", message)]),
            )),
            Err(HostError::Failure(message)) => Err(self.error(
                RuntimeErrorType::FunctionExecutionError,
                location,
                context([("function", function.name.clone()), ("message", message)]),
            )),
        }
    }

    /// Call a top-level function by name with host-supplied arguments.
    pub(crate) fn call_named_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let location = Location::UNKNOWN;
        let callable = match self.lookup(name) {
            Some(Value::Function(callable)) => callable,
            _ => return Err(self.error(RuntimeErrorType::FunctionNotFound, location, context([("name", name)]))),
        };
        self.check_arity(&callable, args.len(), location)?;
        self.call_function(&callable, args, location)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "the function stopped unexpectedly".to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::features::LanguageFeatures;
    use crate::interpreter::context::ExecutionContext;
    use crate::interpreter::engine::Executor;
    use crate::interpreter::errors::{HostError, RuntimeErrorType};
    use crate::memory::callable::{Arity, ExternalFunction};
    use crate::memory::value::Value;
    use crate::parser::parse_program;
    use crate::snapshot::Frame;
    use crate::translator::Translator;
    use std::rc::Rc;

    fn run_with(source: &str, externals: &[ExternalFunction]) -> (bool, Vec<Frame>) {
        let translator = Translator::english();
        let features = LanguageFeatures::default();
        let program = parse_program(source, &features, &translator).unwrap();
        let mut executor = Executor::new(source, &features, &translator, externals);
        let success = executor.execute_program(&program);
        (success, executor.into_recorder().into_parts().0)
    }

    fn run(source: &str) -> (bool, Vec<Frame>) {
        run_with(source, &[])
    }

    fn error_of(frames: &[Frame]) -> Option<RuntimeErrorType> {
        frames.last()?.error.as_ref().map(|e| e.error_type)
    }

    #[test]
    fn test_closures_capture_per_call() {
        let source = "function make(n) { return function () { return n; }; }\nlet f = make(5);\nlet g = make(6);\nlet a = f();\nlet b = g();";
        let (success, frames) = run(source);
        assert!(success);
        let last = frames.last().unwrap();
        assert_eq!(last.variables["a"], Value::from(5.0));
        assert_eq!(last.variables["b"], Value::from(6.0));
    }

    #[test]
    fn test_functions_see_their_definition_scope() {
        let source = "let count = 0;\nfunction bump() { count = count + 1; }\nbump();\nbump();";
        let (_, frames) = run(source);
        assert_eq!(frames.last().unwrap().variables["count"], Value::from(2.0));
    }

    #[test]
    fn test_arity_is_checked_after_arguments() {
        let source = "let calls = 0;\nfunction add(a, b) { return a + b; }\nadd(calls++);";
        let (success, frames) = run(source);
        assert!(!success);
        let error = frames.last().unwrap().error.clone().unwrap();
        assert_eq!(error.error_type, RuntimeErrorType::InvalidNumberOfArguments);
        assert_eq!(error.context["expected"], "2");
        assert_eq!(error.context["got"], "1");
        assert_eq!(frames.last().unwrap().variables["calls"], Value::from(1.0));
    }

    #[test]
    fn test_missing_and_non_callable_functions() {
        assert_eq!(error_of(&run("nope();").1), Some(RuntimeErrorType::FunctionNotFound));
        assert_eq!(error_of(&run("let x = 1;\nx();").1), Some(RuntimeErrorType::TypeError));
    }

    #[test]
    fn test_runaway_recursion_is_stopped() {
        let (success, frames) = run("function down(n) { return down(n + 1); }\ndown(0);");
        assert!(!success);
        assert_eq!(error_of(&frames), Some(RuntimeErrorType::MaxCallDepthReached));
    }

    #[test]
    fn test_external_functions_and_their_errors() {
        let double = ExternalFunction {
            name: "double".to_string(),
            arity: Arity::Exact(1),
            func: Rc::new(|_: &mut ExecutionContext<'_>, args: &[Value]| match args[0].as_number() {
                Some(n) => Ok(Value::from(n * 2.0)),
                None => Err(HostError::Logic("double needs a number".to_string())),
            }),
            description: "doubles a number".to_string(),
        };
        let externals = vec![double];

        let (success, frames) = run_with("let x = double(21);", &externals);
        assert!(success);
        assert_eq!(frames[0].variables["x"], Value::from(42.0));
        assert!(!frames[0].variables.contains_key("double"));

        let (_, frames) = run_with("double(\"a\");", &externals);
        let error = frames.last().unwrap().error.clone().unwrap();
        assert_eq!(error.error_type, RuntimeErrorType::LogicErrorInExecution);
        assert_eq!(error.message, "double needs a number");
    }

    #[test]
    fn test_panicking_external_function_is_reported() {
        let explode = ExternalFunction {
            name: "explode".to_string(),
            arity: Arity::Exact(0),
            func: Rc::new(|_: &mut ExecutionContext<'_>, _: &[Value]| -> Result<Value, HostError> {
                panic!("wires crossed")
            }),
            description: "always fails".to_string(),
        };

        let (success, frames) = run_with("let before = 1;\nexplode();", &[explode]);
        assert!(!success);
        assert_eq!(frames.len(), 2);
        let error = frames[1].error.clone().unwrap();
        assert_eq!(error.error_type, RuntimeErrorType::FunctionExecutionError);
        assert_eq!(error.context["function"], "explode");
        assert_eq!(error.context["message"], "wires crossed");
    }
}
