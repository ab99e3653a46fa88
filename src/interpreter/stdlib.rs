//! String and array members
//!
//! Dot access on a string or array resolves here. Each member falls into one
//! of three cases, reported distinctly so an exercise can tell "not unlocked"
//! from "not built" from "no such thing":
//!
//! | Case                                  | Error                     |
//! |---------------------------------------|---------------------------|
//! | not in the exercise's `allowedStdlib` | `MethodNotYetAvailable`   |
//! | known but not implemented             | `MethodNotYetImplemented` |
//! | unknown                               | `PropertyNotFound`        |
//!
//! Methods are returned as bound methods and run through the normal call
//! path, so the argument count is checked there.

use crate::features::StdlibType;
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::engine::Executor;
use crate::interpreter::errors::{RuntimeError, RuntimeErrorType, StdlibError};
use crate::memory::callable::{Arity, Callable, NativeFunction};
use crate::memory::value::{format_number, Value, MAX_ARRAY_LENGTH, MAX_STRING_LENGTH};
use crate::parser::ast::Location;
use crate::translator::context;
use std::cell::RefCell;
use std::rc::Rc;

type Getter = fn(&Value) -> Value;

struct StdlibProperty {
    name: &'static str,
    get: Option<Getter>,
}

const STRING_PROPERTIES: &[StdlibProperty] = &[StdlibProperty {
    name: "length",
    get: Some(length),
}];

const ARRAY_PROPERTIES: &[StdlibProperty] = &[StdlibProperty {
    name: "length",
    get: Some(length),
}];

const STRING_METHODS: &[NativeFunction] = &[
    NativeFunction::new("at", Arity::Exact(1), string_at),
    NativeFunction::new("charAt", Arity::Exact(1), string_char_at),
    NativeFunction::new("includes", Arity::Exact(1), string_includes),
    NativeFunction::new("indexOf", Arity::Exact(1), string_index_of),
    NativeFunction::new("lastIndexOf", Arity::Exact(1), string_last_index_of),
    NativeFunction::new("startsWith", Arity::Exact(1), string_starts_with),
    NativeFunction::new("endsWith", Arity::Exact(1), string_ends_with),
    NativeFunction::new("toUpperCase", Arity::Exact(0), string_to_upper_case),
    NativeFunction::new("toLowerCase", Arity::Exact(0), string_to_lower_case),
    NativeFunction::new("trim", Arity::Exact(0), string_trim),
    NativeFunction::new("trimStart", Arity::Exact(0), string_trim_start),
    NativeFunction::new("trimEnd", Arity::Exact(0), string_trim_end),
    NativeFunction::new("slice", Arity::Range(0, Some(2)), string_slice),
    NativeFunction::new("substring", Arity::Range(1, Some(2)), string_substring),
    NativeFunction::new("split", Arity::Exact(1), string_split),
    NativeFunction::new("repeat", Arity::Exact(1), string_repeat),
    NativeFunction::new("concat", Arity::Range(0, None), string_concat),
    NativeFunction::new("padStart", Arity::Range(1, Some(2)), string_pad_start),
    NativeFunction::new("padEnd", Arity::Range(1, Some(2)), string_pad_end),
    NativeFunction::unimplemented("replace"),
    NativeFunction::unimplemented("replaceAll"),
    NativeFunction::unimplemented("match"),
    NativeFunction::unimplemented("matchAll"),
    NativeFunction::unimplemented("search"),
    NativeFunction::unimplemented("localeCompare"),
    NativeFunction::unimplemented("normalize"),
    NativeFunction::unimplemented("codePointAt"),
    NativeFunction::unimplemented("charCodeAt"),
];

const ARRAY_METHODS: &[NativeFunction] = &[
    NativeFunction::new("at", Arity::Exact(1), array_at),
    NativeFunction::new("push", Arity::Range(0, None), array_push),
    NativeFunction::new("pop", Arity::Exact(0), array_pop),
    NativeFunction::new("shift", Arity::Exact(0), array_shift),
    NativeFunction::new("unshift", Arity::Range(0, None), array_unshift),
    NativeFunction::new("indexOf", Arity::Exact(1), array_index_of),
    NativeFunction::new("lastIndexOf", Arity::Exact(1), array_last_index_of),
    NativeFunction::new("includes", Arity::Exact(1), array_includes),
    NativeFunction::new("join", Arity::Range(0, Some(1)), array_join),
    NativeFunction::new("reverse", Arity::Exact(0), array_reverse),
    NativeFunction::new("slice", Arity::Range(0, Some(2)), array_slice),
    NativeFunction::new("concat", Arity::Range(0, None), array_concat),
    NativeFunction::new("fill", Arity::Range(1, Some(3)), array_fill),
    NativeFunction::unimplemented("forEach"),
    NativeFunction::unimplemented("map"),
    NativeFunction::unimplemented("filter"),
    NativeFunction::unimplemented("reduce"),
    NativeFunction::unimplemented("reduceRight"),
    NativeFunction::unimplemented("find"),
    NativeFunction::unimplemented("findIndex"),
    NativeFunction::unimplemented("findLast"),
    NativeFunction::unimplemented("every"),
    NativeFunction::unimplemented("some"),
    NativeFunction::unimplemented("sort"),
    NativeFunction::unimplemented("splice"),
    NativeFunction::unimplemented("flat"),
    NativeFunction::unimplemented("flatMap"),
];

fn stdlib_type_of(value: &Value) -> Option<StdlibType> {
    match value {
        Value::String(_) => Some(StdlibType::String),
        Value::Array(_) => Some(StdlibType::Array),
        _ => None,
    }
}

fn members(stdlib_type: StdlibType) -> (&'static [StdlibProperty], &'static [NativeFunction]) {
    match stdlib_type {
        StdlibType::String => (STRING_PROPERTIES, STRING_METHODS),
        StdlibType::Array => (ARRAY_PROPERTIES, ARRAY_METHODS),
    }
}

impl<'a> Executor<'a> {
    /// Resolve `receiver.name` for a string or array receiver.
    pub(crate) fn stdlib_member(
        &self,
        receiver: &Value,
        name: &str,
        location: Location,
    ) -> Result<Value, RuntimeError> {
        let Some(stdlib_type) = stdlib_type_of(receiver) else {
            return Err(self.type_error(
                format!("Cannot read properties of {}", receiver.type_name()),
                location,
            ));
        };
        let (properties, methods) = members(stdlib_type);

        if let Some(property) = properties.iter().find(|p| p.name == name) {
            if !self.features.is_stdlib_property_allowed(stdlib_type, name) {
                return Err(self.not_yet_available(name, location));
            }
            return match property.get {
                Some(get) => Ok(get(receiver)),
                None => Err(self.error(
                    RuntimeErrorType::MethodNotYetImplemented,
                    location,
                    context([("method", name)]),
                )),
            };
        }

        if let Some(method) = methods.iter().find(|m| m.name == name) {
            if !self.features.is_stdlib_method_allowed(stdlib_type, name) {
                return Err(self.not_yet_available(name, location));
            }
            return Ok(Value::function(Callable::BoundMethod {
                receiver: receiver.clone(),
                method: *method,
            }));
        }

        Err(self.error(RuntimeErrorType::PropertyNotFound, location, context([("property", name)])))
    }

    fn not_yet_available(&self, name: &str, location: Location) -> RuntimeError {
        self.error(RuntimeErrorType::MethodNotYetAvailable, location, context([("method", name)]))
    }
}

// Argument guards

fn argument_error(message: String) -> StdlibError {
    StdlibError::new(RuntimeErrorType::ArgumentError, context([("message", message)]))
}

fn check_string_length(method: &str, length: usize) -> Result<(), StdlibError> {
    if length > MAX_STRING_LENGTH {
        return Err(argument_error(format!(
            "{} would make a string longer than {} characters.",
            method, MAX_STRING_LENGTH
        )));
    }
    Ok(())
}

fn check_list_length(method: &str, length: usize) -> Result<(), StdlibError> {
    if length > MAX_ARRAY_LENGTH {
        return Err(argument_error(format!(
            "{} would make a list longer than {} elements.",
            method, MAX_ARRAY_LENGTH
        )));
    }
    Ok(())
}

fn string_arg<'v>(method: &str, args: &'v [Value], i: usize) -> Result<&'v str, StdlibError> {
    args[i].as_str().ok_or_else(|| {
        argument_error(format!(
            "{} expects a string as argument {}, but got {}.",
            method,
            i + 1,
            args[i].type_name()
        ))
    })
}

fn number_arg(method: &str, args: &[Value], i: usize) -> Result<f64, StdlibError> {
    args[i].as_number().ok_or_else(|| {
        argument_error(format!(
            "{} expects a number as argument {}, but got {}.",
            method,
            i + 1,
            args[i].type_name()
        ))
    })
}

/// Optional numeric argument, truncated towards zero.
fn optional_integer(method: &str, args: &[Value], i: usize) -> Result<Option<f64>, StdlibError> {
    match args.get(i) {
        None | Some(Value::Undefined) => Ok(None),
        Some(_) => Ok(Some(number_arg(method, args, i)?.trunc())),
    }
}

fn integer_index(method: &str, args: &[Value]) -> Result<f64, StdlibError> {
    let n = number_arg(method, args, 0)?;
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(StdlibError::new(
            RuntimeErrorType::TypeError,
            context([("message", format!("{} expects an integer index, but got {}.", method, format_number(n)))]),
        ));
    }
    Ok(n)
}

/// Resolve a relative position (negative counts from the end) into `0..=len`.
fn relative_position(position: f64, len: usize) -> usize {
    let len = len as f64;
    let resolved = if position < 0.0 { (len + position).max(0.0) } else { position.min(len) };
    resolved as usize
}

/// `at`: negative indices count from the end; out of range is `None`.
fn at_position(index: f64, len: usize) -> Option<usize> {
    let resolved = if index < 0.0 { len as f64 + index } else { index };
    (resolved >= 0.0 && resolved < len as f64).then_some(resolved as usize)
}

fn length(receiver: &Value) -> Value {
    match receiver {
        Value::String(text) => Value::Number(text.chars().count() as f64),
        Value::Array(elements) => Value::Number(elements.borrow().len() as f64),
        _ => Value::Undefined,
    }
}

// Strings

fn text(receiver: &Value) -> &str {
    receiver.as_str().unwrap_or_default()
}

fn char_index(text: &str, byte_index: usize) -> Value {
    Value::Number(text[..byte_index].chars().count() as f64)
}

fn string_at(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let chars: Vec<char> = text(receiver).chars().collect();
    let index = integer_index("at", args)?;
    Ok(at_position(index, chars.len()).map_or(Value::Undefined, |i| Value::String(chars[i].to_string())))
}

fn string_char_at(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let index = number_arg("charAt", args, 0)?.trunc();
    let character = if index < 0.0 {
        None
    } else {
        text(receiver).chars().nth(index as usize)
    };
    Ok(Value::String(character.map(String::from).unwrap_or_default()))
}

fn string_includes(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let needle = string_arg("includes", args, 0)?;
    Ok(Value::Boolean(text(receiver).contains(needle)))
}

fn string_index_of(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let haystack = text(receiver);
    let needle = string_arg("indexOf", args, 0)?;
    Ok(haystack
        .find(needle)
        .map_or(Value::Number(-1.0), |i| char_index(haystack, i)))
}

fn string_last_index_of(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let haystack = text(receiver);
    let needle = string_arg("lastIndexOf", args, 0)?;
    Ok(haystack
        .rfind(needle)
        .map_or(Value::Number(-1.0), |i| char_index(haystack, i)))
}

fn string_starts_with(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let prefix = string_arg("startsWith", args, 0)?;
    Ok(Value::Boolean(text(receiver).starts_with(prefix)))
}

fn string_ends_with(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let suffix = string_arg("endsWith", args, 0)?;
    Ok(Value::Boolean(text(receiver).ends_with(suffix)))
}

fn string_to_upper_case(_: &mut ExecutionContext<'_>, receiver: &Value, _: &[Value]) -> Result<Value, StdlibError> {
    Ok(Value::String(text(receiver).to_uppercase()))
}

fn string_to_lower_case(_: &mut ExecutionContext<'_>, receiver: &Value, _: &[Value]) -> Result<Value, StdlibError> {
    Ok(Value::String(text(receiver).to_lowercase()))
}

fn string_trim(_: &mut ExecutionContext<'_>, receiver: &Value, _: &[Value]) -> Result<Value, StdlibError> {
    Ok(Value::string(text(receiver).trim()))
}

fn string_trim_start(_: &mut ExecutionContext<'_>, receiver: &Value, _: &[Value]) -> Result<Value, StdlibError> {
    Ok(Value::string(text(receiver).trim_start()))
}

fn string_trim_end(_: &mut ExecutionContext<'_>, receiver: &Value, _: &[Value]) -> Result<Value, StdlibError> {
    Ok(Value::string(text(receiver).trim_end()))
}

fn string_slice(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let chars: Vec<char> = text(receiver).chars().collect();
    let start = relative_position(optional_integer("slice", args, 0)?.unwrap_or(0.0), chars.len());
    let end = optional_integer("slice", args, 1)?.map_or(chars.len(), |end| relative_position(end, chars.len()));
    let slice: String = if start < end { chars[start..end].iter().collect() } else { String::new() };
    Ok(Value::String(slice))
}

fn string_substring(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let chars: Vec<char> = text(receiver).chars().collect();
    let clamp = |n: f64| n.max(0.0).min(chars.len() as f64) as usize;
    let start = clamp(number_arg("substring", args, 0)?.trunc());
    let end = optional_integer("substring", args, 1)?.map_or(chars.len(), clamp);
    let (start, end) = if start > end { (end, start) } else { (start, end) };
    Ok(Value::String(chars[start..end].iter().collect()))
}

fn string_split(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let separator = string_arg("split", args, 0)?;
    let parts: Vec<Value> = if separator.is_empty() {
        text(receiver).chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        text(receiver).split(separator).map(Value::string).collect()
    };
    Ok(Value::array(parts))
}

fn string_repeat(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let count = number_arg("repeat", args, 0)?;
    if count < 0.0 || !count.is_finite() {
        return Err(argument_error(format!(
            "repeat expects a count of zero or more, but got {}.",
            format_number(count)
        )));
    }
    let count = count as usize;
    check_string_length("repeat", text(receiver).chars().count().saturating_mul(count))?;
    Ok(Value::String(text(receiver).repeat(count)))
}

fn string_concat(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let mut joined = text(receiver).to_string();
    for i in 0..args.len() {
        joined.push_str(string_arg("concat", args, i)?);
        check_string_length("concat", joined.chars().count())?;
    }
    Ok(Value::String(joined))
}

fn padding(method: &str, receiver: &Value, args: &[Value]) -> Result<String, StdlibError> {
    let target = number_arg(method, args, 0)?.trunc();
    let fill = match args.get(1) {
        Some(_) => string_arg(method, args, 1)?,
        None => " ",
    };
    let current = text(receiver).chars().count();
    if fill.is_empty() || target <= current as f64 {
        return Ok(String::new());
    }
    check_string_length(method, target as usize)?;
    Ok(fill.chars().cycle().take(target as usize - current).collect())
}

fn string_pad_start(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let pad = padding("padStart", receiver, args)?;
    Ok(Value::String(pad + text(receiver)))
}

fn string_pad_end(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let pad = padding("padEnd", receiver, args)?;
    Ok(Value::String(format!("{}{}", text(receiver), pad)))
}

// Arrays

fn elements(receiver: &Value) -> Result<&Rc<RefCell<Vec<Value>>>, StdlibError> {
    match receiver {
        Value::Array(elements) => Ok(elements),
        other => Err(StdlibError::new(
            RuntimeErrorType::TypeError,
            context([("message", format!("Expected a list, but got {}.", other.type_name()))]),
        )),
    }
}

fn array_at(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let elements = elements(receiver)?.borrow();
    let index = integer_index("at", args)?;
    Ok(at_position(index, elements.len()).map_or(Value::Undefined, |i| elements[i].clone()))
}

fn array_push(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let mut elements = elements(receiver)?.borrow_mut();
    check_list_length("push", elements.len() + args.len())?;
    elements.extend(args.iter().cloned());
    Ok(Value::Number(elements.len() as f64))
}

fn array_pop(_: &mut ExecutionContext<'_>, receiver: &Value, _: &[Value]) -> Result<Value, StdlibError> {
    Ok(elements(receiver)?.borrow_mut().pop().unwrap_or(Value::Undefined))
}

fn array_shift(_: &mut ExecutionContext<'_>, receiver: &Value, _: &[Value]) -> Result<Value, StdlibError> {
    let mut elements = elements(receiver)?.borrow_mut();
    if elements.is_empty() {
        return Ok(Value::Undefined);
    }
    Ok(elements.remove(0))
}

fn array_unshift(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let mut elements = elements(receiver)?.borrow_mut();
    check_list_length("unshift", elements.len() + args.len())?;
    elements.splice(0..0, args.iter().cloned());
    Ok(Value::Number(elements.len() as f64))
}

fn array_index_of(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let elements = elements(receiver)?.borrow();
    let position = elements.iter().position(|element| element.strict_equals(&args[0]));
    Ok(Value::Number(position.map_or(-1.0, |i| i as f64)))
}

fn array_last_index_of(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let elements = elements(receiver)?.borrow();
    let position = elements.iter().rposition(|element| element.strict_equals(&args[0]));
    Ok(Value::Number(position.map_or(-1.0, |i| i as f64)))
}

fn array_includes(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let elements = elements(receiver)?.borrow();
    Ok(Value::Boolean(elements.iter().any(|element| element.strict_equals(&args[0]))))
}

fn array_join(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let separator = match args.first() {
        Some(_) => string_arg("join", args, 0)?,
        None => ",",
    };
    let elements = elements(receiver)?.borrow();
    let separator_length = separator.chars().count();
    let mut joined = String::new();
    let mut length = 0;
    for (i, element) in elements.iter().enumerate() {
        let part = match element {
            Value::Null | Value::Undefined => String::new(),
            other => other.to_display_string(),
        };
        if i > 0 {
            length += separator_length;
            joined.push_str(separator);
        }
        length += part.chars().count();
        check_string_length("join", length)?;
        joined.push_str(&part);
    }
    Ok(Value::String(joined))
}

fn array_reverse(_: &mut ExecutionContext<'_>, receiver: &Value, _: &[Value]) -> Result<Value, StdlibError> {
    elements(receiver)?.borrow_mut().reverse();
    Ok(receiver.clone())
}

fn array_slice(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let elements = elements(receiver)?.borrow();
    let len = elements.len();
    let start = relative_position(optional_integer("slice", args, 0)?.unwrap_or(0.0), len);
    let end = optional_integer("slice", args, 1)?.map_or(len, |end| relative_position(end, len));
    let slice = if start < end { elements[start..end].to_vec() } else { Vec::new() };
    Ok(Value::array(slice))
}

fn array_concat(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let mut joined = elements(receiver)?.borrow().clone();
    for arg in args {
        match arg {
            Value::Array(other) => {
                let other = other.borrow();
                check_list_length("concat", joined.len() + other.len())?;
                joined.extend(other.iter().cloned());
            }
            other => {
                check_list_length("concat", joined.len() + 1)?;
                joined.push(other.clone());
            }
        }
    }
    Ok(Value::array(joined))
}

fn array_fill(_: &mut ExecutionContext<'_>, receiver: &Value, args: &[Value]) -> Result<Value, StdlibError> {
    let mut elements = elements(receiver)?.borrow_mut();
    let len = elements.len();
    let start = relative_position(optional_integer("fill", args, 1)?.unwrap_or(0.0), len);
    let end = optional_integer("fill", args, 2)?.map_or(len, |end| relative_position(end, len));
    for element in elements.iter_mut().take(end).skip(start) {
        *element = args[0].clone();
    }
    Ok(receiver.clone())
}

#[cfg(test)]
mod tests {
    use crate::features::{LanguageFeatures, StdlibAllowList, StdlibType};
    use crate::interpreter::engine::Executor;
    use crate::interpreter::errors::RuntimeErrorType;
    use crate::memory::value::Value;
    use crate::parser::parse_program;
    use crate::translator::Translator;
    use pretty_assertions::assert_eq;
    use rustc_hash::FxHashMap;

    fn eval_with(features: &LanguageFeatures, source: &str) -> Result<Value, RuntimeErrorType> {
        let translator = Translator::english();
        let program = parse_program(source, features, &translator).unwrap();
        let mut executor = Executor::new(source, features, &translator, &[]);
        executor.execute_program(&program);
        let frame = executor.recorder().frames().last().unwrap().clone();
        match frame.error {
            Some(error) => Err(error.error_type),
            None => Ok(frame.variables["result"].clone()),
        }
    }

    fn eval(source: &str) -> Result<Value, RuntimeErrorType> {
        eval_with(&LanguageFeatures::default(), source)
    }

    fn strings(values: &[&str]) -> Value {
        Value::array(values.iter().map(|s| Value::from(*s)).collect())
    }

    #[test]
    fn test_string_members() {
        assert_eq!(eval("let result = \"héllo\".length;"), Ok(Value::from(5.0)));
        assert_eq!(eval("let result = \"hello\".toUpperCase();"), Ok(Value::from("HELLO")));
        assert_eq!(eval("let result = \"hello\".at(-1);"), Ok(Value::from("o")));
        assert_eq!(eval("let result = \"hello\".at(9);"), Ok(Value::Undefined));
        assert_eq!(eval("let result = \"hello\".slice(1, -1);"), Ok(Value::from("ell")));
        assert_eq!(eval("let result = \"hello\".substring(4, 1);"), Ok(Value::from("ell")));
        assert_eq!(eval("let result = \"a-b-c\".split(\"-\");"), Ok(strings(&["a", "b", "c"])));
        assert_eq!(eval("let result = \"ab\".split(\"\");"), Ok(strings(&["a", "b"])));
        assert_eq!(eval("let result = \"5\".padStart(3, \"0\");"), Ok(Value::from("005")));
        assert_eq!(eval("let result = \"ab\".repeat(3);"), Ok(Value::from("ababab")));
        assert_eq!(eval("let result = \"banana\".lastIndexOf(\"an\");"), Ok(Value::from(3.0)));
    }

    #[test]
    fn test_array_methods_mutate_in_place() {
        assert_eq!(
            eval("let xs = [1, 2];\nxs.push(3, 4);\nlet result = xs;"),
            Ok(Value::array(vec![1.0, 2.0, 3.0, 4.0].into_iter().map(Value::from).collect()))
        );
        assert_eq!(eval("let xs = [1, 2];\nlet result = xs.pop();"), Ok(Value::from(2.0)));
        assert_eq!(eval("let xs = [];\nlet result = xs.shift();"), Ok(Value::Undefined));
        assert_eq!(eval("let xs = [1, null, \"a\"];\nlet result = xs.join(\"-\");"), Ok(Value::from("1--a")));
        assert_eq!(eval("let result = [1, 2, 3].indexOf(3);"), Ok(Value::from(2.0)));
        assert_eq!(
            eval("let result = [1, 2].concat([3], 4);"),
            Ok(Value::array(vec![1.0, 2.0, 3.0, 4.0].into_iter().map(Value::from).collect()))
        );
        assert_eq!(
            eval("let result = [0, 0, 0].fill(7, 1);"),
            Ok(Value::array(vec![0.0, 7.0, 7.0].into_iter().map(Value::from).collect()))
        );
    }

    #[test]
    fn test_three_kinds_of_missing_member() {
        assert!(matches!(eval("let result = [1].map;"), Ok(Value::Function(_))));
        assert_eq!(
            eval("let result = [1].map(1);"),
            Err(RuntimeErrorType::MethodNotYetImplemented)
        );
        assert_eq!(eval("let result = [1].size;"), Err(RuntimeErrorType::PropertyNotFound));

        let mut allowed = FxHashMap::default();
        allowed.insert(
            StdlibType::String,
            StdlibAllowList {
                properties: vec![],
                methods: vec!["toUpperCase".to_string()],
            },
        );
        let features = LanguageFeatures {
            allowed_stdlib: Some(allowed),
            ..LanguageFeatures::default()
        };
        assert_eq!(
            eval_with(&features, "let result = \"a\".toUpperCase();"),
            Ok(Value::from("A"))
        );
        assert_eq!(
            eval_with(&features, "let result = \"a\".length;"),
            Err(RuntimeErrorType::MethodNotYetAvailable)
        );
        // Arrays are not in the map, so they stay unrestricted
        assert_eq!(eval_with(&features, "let result = [1].length;"), Ok(Value::from(1.0)));
    }

    #[test]
    fn test_argument_guards() {
        assert_eq!(eval("let result = \"abc\".includes(1);"), Err(RuntimeErrorType::ArgumentError));
        assert_eq!(eval("let result = \"abc\".at(0.5);"), Err(RuntimeErrorType::TypeError));
        assert_eq!(
            eval("let result = \"abc\".includes();"),
            Err(RuntimeErrorType::InvalidNumberOfArguments)
        );
    }

    #[test]
    fn test_results_cannot_outgrow_the_limits() {
        assert_eq!(eval("let result = \"ab\".repeat(1e18);"), Err(RuntimeErrorType::ArgumentError));
        assert_eq!(eval("let result = \"\".repeat(1e18);"), Ok(Value::from("")));
        assert_eq!(eval("let result = \"x\".padEnd(1e12);"), Err(RuntimeErrorType::ArgumentError));
        assert_eq!(eval("let result = \"x\".padStart(1e12, \"-\");"), Err(RuntimeErrorType::ArgumentError));
        assert_eq!(
            eval("let sep = \"ab\".repeat(300000);\nlet result = [1, 2, 3].join(sep);"),
            Err(RuntimeErrorType::ArgumentError)
        );
        assert_eq!(
            eval("let xs = [];\nxs[99999] = 0;\nlet result = xs.concat(xs);"),
            Err(RuntimeErrorType::ArgumentError)
        );
    }
}
