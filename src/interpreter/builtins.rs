//! Built-in global namespaces
//!
//! These are installed as globals by [`Executor::new`](crate::interpreter::engine::Executor::new)
//! and never appear in a frame's variables.
//!
//! # Supported Built-ins
//!
//! - `console.log(...args)`: one log line per call, arguments joined by a space
//! - `Math.abs/floor/ceil/round/trunc/sign/sqrt(n)`
//! - `Math.pow(base, exponent)`
//! - `Math.min/max(...numbers)`: at least one argument
//!
//! Arguments that are not numbers raise `ArgumentError`.

use crate::interpreter::context::ExecutionContext;
use crate::interpreter::errors::{RuntimeErrorType, StdlibError};
use crate::memory::callable::{Arity, Callable, NativeFunction};
use crate::memory::value::{Namespace, Value};
use crate::translator::context;
use std::rc::Rc;

const CONSOLE_LOG: NativeFunction = NativeFunction::new("log", Arity::Range(0, None), console_log);

const MATH_FUNCTIONS: &[NativeFunction] = &[
    NativeFunction::new("abs", Arity::Exact(1), math_abs),
    NativeFunction::new("floor", Arity::Exact(1), math_floor),
    NativeFunction::new("ceil", Arity::Exact(1), math_ceil),
    NativeFunction::new("round", Arity::Exact(1), math_round),
    NativeFunction::new("trunc", Arity::Exact(1), math_trunc),
    NativeFunction::new("sign", Arity::Exact(1), math_sign),
    NativeFunction::new("sqrt", Arity::Exact(1), math_sqrt),
    NativeFunction::new("pow", Arity::Exact(2), math_pow),
    NativeFunction::new("min", Arity::Range(1, None), math_min),
    NativeFunction::new("max", Arity::Range(1, None), math_max),
];

pub(crate) fn console() -> Value {
    Value::Namespace(Rc::new(Namespace {
        name: "console",
        members: vec![("log", Value::function(Callable::Stdlib(CONSOLE_LOG)))],
    }))
}

pub(crate) fn math() -> Value {
    let members = MATH_FUNCTIONS
        .iter()
        .map(|function| (function.name, Value::function(Callable::Stdlib(*function))))
        .collect();
    Value::Namespace(Rc::new(Namespace { name: "Math", members }))
}

fn console_log(ctx: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let line = args
        .iter()
        .map(Value::to_display_string)
        .collect::<Vec<_>>()
        .join(" ");
    ctx.log(line);
    Ok(Value::Undefined)
}

fn number_args(function: &str, args: &[Value]) -> Result<Vec<f64>, StdlibError> {
    args.iter()
        .enumerate()
        .map(|(i, arg)| {
            arg.as_number().ok_or_else(|| {
                StdlibError::new(
                    RuntimeErrorType::ArgumentError,
                    context([(
                        "message",
                        format!(
                            "Math.{} expects a number as argument {}, but got {}.",
                            function,
                            i + 1,
                            arg.type_name()
                        ),
                    )]),
                )
            })
        })
        .collect()
}

fn unary_math(function: &str, args: &[Value], op: fn(f64) -> f64) -> Result<Value, StdlibError> {
    let numbers = number_args(function, args)?;
    Ok(Value::Number(op(numbers[0])))
}

fn math_abs(_: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    unary_math("abs", args, f64::abs)
}

fn math_floor(_: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    unary_math("floor", args, f64::floor)
}

fn math_ceil(_: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    unary_math("ceil", args, f64::ceil)
}

// Halves round towards +Infinity: Math.round(-2.5) is -2
fn math_round(_: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    unary_math("round", args, |n| (n + 0.5).floor())
}

fn math_trunc(_: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    unary_math("trunc", args, f64::trunc)
}

fn math_sign(_: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    unary_math("sign", args, |n| if n == 0.0 || n.is_nan() { n } else { n.signum() })
}

fn math_sqrt(_: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    unary_math("sqrt", args, f64::sqrt)
}

fn math_pow(_: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let numbers = number_args("pow", args)?;
    Ok(Value::Number(numbers[0].powf(numbers[1])))
}

fn math_min(_: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let numbers = number_args("min", args)?;
    Ok(Value::Number(numbers.into_iter().fold(f64::INFINITY, |acc, n| {
        if n.is_nan() || acc.is_nan() { f64::NAN } else { acc.min(n) }
    })))
}

fn math_max(_: &mut ExecutionContext<'_>, _: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let numbers = number_args("max", args)?;
    Ok(Value::Number(numbers.into_iter().fold(f64::NEG_INFINITY, |acc, n| {
        if n.is_nan() || acc.is_nan() { f64::NAN } else { acc.max(n) }
    })))
}

#[cfg(test)]
mod tests {
    use crate::features::LanguageFeatures;
    use crate::interpreter::engine::Executor;
    use crate::interpreter::errors::RuntimeErrorType;
    use crate::memory::value::Value;
    use crate::parser::parse_program;
    use crate::snapshot::{Frame, LogLine};
    use crate::translator::Translator;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> (Vec<Frame>, Vec<LogLine>) {
        let translator = Translator::english();
        let features = LanguageFeatures::default();
        let program = parse_program(source, &features, &translator).unwrap();
        let mut executor = Executor::new(source, &features, &translator, &[]);
        executor.execute_program(&program);
        executor.into_recorder().into_parts()
    }

    fn result(source: &str) -> Value {
        let (frames, _) = run(source);
        frames.last().unwrap().variables["result"].clone()
    }

    #[test]
    fn test_console_log_joins_arguments() {
        let (frames, logs) = run("console.log(\"total:\", 3, [1, \"a\"], {});\nconsole.log();");
        let outputs: Vec<&str> = logs.iter().map(|line| line.output.as_str()).collect();
        assert_eq!(outputs, vec!["total: 3 [ 1, 'a' ] {}", ""]);
        assert_eq!(logs[0].time, frames[0].time);
        assert_eq!(logs[1].time, frames[1].time);
    }

    #[test]
    fn test_math_functions() {
        assert_eq!(result("let result = Math.max(3, 9, 4);"), Value::from(9.0));
        assert_eq!(result("let result = Math.min(3, -9);"), Value::from(-9.0));
        assert_eq!(result("let result = Math.round(2.5);"), Value::from(3.0));
        assert_eq!(result("let result = Math.round(-2.5);"), Value::from(-2.0));
        assert_eq!(result("let result = Math.pow(2, 10);"), Value::from(1024.0));
        assert_eq!(result("let result = Math.sign(-7);"), Value::from(-1.0));
        assert_eq!(result("let result = Math.trunc(-7.9);"), Value::from(-7.0));
    }

    #[test]
    fn test_math_argument_errors() {
        let (frames, _) = run("let result = Math.sqrt(\"9\");");
        let error = frames.last().unwrap().error.clone().unwrap();
        assert_eq!(error.error_type, RuntimeErrorType::ArgumentError);
        assert_eq!(error.message, "Math.sqrt expects a number as argument 1, but got string.");

        let (frames, _) = run("let result = Math.max();");
        let error = frames.last().unwrap().error.clone().unwrap();
        assert_eq!(error.error_type, RuntimeErrorType::InvalidNumberOfArguments);
    }
}
