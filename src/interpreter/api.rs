//! Public entry points
//!
//! - [`compile`]: scan and parse only
//! - [`interpret`]: compile, then run the whole program
//! - [`evaluate_function`]: run the program, then call one function by name
//!
//! Compile errors come back in the result's `error`; runtime errors end the
//! frame list with an ERROR frame instead. Each call is independent: no state
//! is shared between runs.

use crate::features::LanguageFeatures;
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::engine::Executor;
use crate::interpreter::errors::HostError;
use crate::memory::callable::{Arity, ExternalFunction};
use crate::memory::value::Value;
use crate::parser::ast::NodeType;
use crate::parser::errors::CompileError;
use crate::parser::parse_program;
use crate::snapshot::{Frame, LogLine};
use crate::translator::{default_translator, Translator};
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

/// Everything a run needs besides the source text.
#[derive(Clone)]
pub struct EvaluationContext {
    pub language_features: LanguageFeatures,
    pub external_functions: Vec<ExternalFunction>,
    pub translator: Arc<Translator>,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        EvaluationContext {
            language_features: LanguageFeatures::default(),
            external_functions: Vec::new(),
            translator: default_translator(),
        }
    }
}

impl EvaluationContext {
    pub fn new() -> Self {
        EvaluationContext::default()
    }

    pub fn with_language_features(mut self, language_features: LanguageFeatures) -> Self {
        self.language_features = language_features;
        self
    }

    pub fn with_translator(mut self, translator: Arc<Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Expose a host function to programs as a global.
    pub fn with_external_function<F>(
        mut self,
        name: impl Into<String>,
        arity: Arity,
        description: impl Into<String>,
        func: F,
    ) -> Self
    where
        F: Fn(&mut ExecutionContext<'_>, &[Value]) -> Result<Value, HostError> + 'static,
    {
        self.external_functions.push(ExternalFunction {
            name: name.into(),
            arity,
            func: Rc::new(func),
            description: description.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    pub success: bool,
    pub error: Option<CompileError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterpretResult {
    pub frames: Vec<Frame>,
    pub log_lines: Vec<LogLine>,
    pub error: Option<CompileError>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluateFunctionResult {
    /// Return value of the call; `None` if the run stopped before it finished
    pub value: Option<Value>,
    pub frames: Vec<Frame>,
    pub log_lines: Vec<LogLine>,
    pub error: Option<CompileError>,
    pub success: bool,
}

pub fn compile(source: &str, context: &EvaluationContext) -> CompileResult {
    match parse_program(source, &context.language_features, &context.translator) {
        Ok(statements) => {
            debug!(statements = statements.len(), "compiled");
            CompileResult {
                success: true,
                error: None,
            }
        }
        Err(error) => {
            debug!(error_type = %error.type_name(), "compile failed");
            CompileResult {
                success: false,
                error: Some(error),
            }
        }
    }
}

pub fn interpret(source: &str, context: &EvaluationContext) -> InterpretResult {
    let features = &context.language_features;
    let statements = match parse_program(source, features, &context.translator) {
        Ok(statements) => statements,
        Err(error) => {
            debug!(error_type = %error.type_name(), "compile failed");
            return InterpretResult {
                frames: Vec::new(),
                log_lines: Vec::new(),
                error: Some(error),
                success: false,
            };
        }
    };

    let mut executor = Executor::new(source, features, &context.translator, &context.external_functions);
    let success = executor.execute_program(&statements);
    let (frames, log_lines) = executor.into_recorder().into_parts();
    debug!(frames = frames.len(), log_lines = log_lines.len(), success, "interpreted");

    InterpretResult {
        frames,
        log_lines,
        error: None,
        success,
    }
}

/// Run the program's top level, then call `name` with `args`.
pub fn evaluate_function(
    source: &str,
    context: &EvaluationContext,
    name: &str,
    args: Vec<Value>,
) -> EvaluateFunctionResult {
    let features = &context.language_features;
    let statements = match parse_program(source, features, &context.translator) {
        Ok(statements) => statements,
        Err(error) => {
            return EvaluateFunctionResult {
                value: None,
                frames: Vec::new(),
                log_lines: Vec::new(),
                error: Some(error),
                success: false,
            };
        }
    };

    let mut executor = Executor::new(source, features, &context.translator, &context.external_functions);
    let value = if executor.execute_program(&statements) {
        debug!(function = name, args = args.len(), "calling function");
        match executor.call_named_function(name, args) {
            Ok(value) => Some(value),
            Err(error) => {
                executor.record_error(error, NodeType::CallExpression);
                None
            }
        }
    } else {
        None
    };

    let (frames, log_lines) = executor.into_recorder().into_parts();
    EvaluateFunctionResult {
        success: value.is_some(),
        value,
        frames,
        log_lines,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::errors::RuntimeErrorType;
    use crate::parser::errors::SyntaxErrorType;
    use crate::snapshot::FrameStatus;

    #[test]
    fn test_compile_reports_syntax_errors() {
        let ctx = EvaluationContext::default();
        assert!(compile("let x = 1;", &ctx).success);

        let result = compile("let x = ;", &ctx);
        assert!(!result.success);
        match result.error {
            Some(CompileError::Syntax(err)) => assert_eq!(err.error_type, SyntaxErrorType::MissingExpression),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_interpret_stops_at_first_runtime_error() {
        let ctx = EvaluationContext::default();
        let result = interpret("let x = 1;\nx = y;\nx = 3;", &ctx);
        assert!(!result.success);
        assert!(result.error.is_none());
        assert_eq!(result.frames.len(), 2);
        assert_eq!(result.frames[1].status, FrameStatus::Error);
    }

    #[test]
    fn test_evaluate_function_calls_after_top_level() {
        let ctx = EvaluationContext::default();
        let source = "const base = 10;\nfunction add(a, b) { return base + a + b; }";
        let result = evaluate_function(source, &ctx, "add", vec![Value::from(1.0), Value::from(2.0)]);
        assert!(result.success);
        assert_eq!(result.value, Some(Value::from(13.0)));
        assert_eq!(result.frames.len(), 2);
    }

    #[test]
    fn test_evaluate_function_unknown_name_and_bad_arity() {
        let ctx = EvaluationContext::default();
        let source = "function add(a, b) { return a + b; }";

        let result = evaluate_function(source, &ctx, "sub", vec![]);
        assert!(!result.success);
        assert_eq!(result.frames.len(), 1);
        let error = result.frames[0].error.clone().unwrap();
        assert_eq!(error.error_type, RuntimeErrorType::FunctionNotFound);

        let result = evaluate_function(source, &ctx, "add", vec![Value::from(1.0)]);
        assert_eq!(result.frames.len(), 1);
        let error = result.frames[0].error.clone().unwrap();
        assert_eq!(error.error_type, RuntimeErrorType::InvalidNumberOfArguments);
    }

    #[test]
    fn test_external_function_registration() {
        let ctx = EvaluationContext::default().with_external_function(
            "shout",
            Arity::Exact(1),
            "upper-cases a word",
            |ctx, args| {
                let word = args[0].to_display_string().to_uppercase();
                ctx.log(word.clone());
                Ok(Value::String(word))
            },
        );
        let result = interpret("let loud = shout(\"hi\");", &ctx);
        assert!(result.success);
        assert_eq!(result.frames[0].variables["loud"], Value::from("HI"));
        assert_eq!(result.log_lines[0].output, "HI");
    }
}
