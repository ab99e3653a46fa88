//! Callable values
//!
//! [`Callable`] is a closed enum over the four kinds of thing a program can
//! call. The executor matches on it in `interpreter::calls`.
//!
//! | Variant       | Created by                                   |
//! |---------------|----------------------------------------------|
//! | `UserDefined` | `function` declarations and expressions      |
//! | `Stdlib`      | built-in namespaces (`console.log`, `Math.max`) |
//! | `BoundMethod` | member access on a string or array (`xs.push`) |
//! | `External`    | the embedder, via `EvaluationContext`         |

use crate::interpreter::context::ExecutionContext;
use crate::interpreter::errors::{HostError, StdlibError};
use crate::memory::environment::Environment;
use crate::memory::value::Value;
use crate::parser::ast::FunctionDeclaration;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Accepted argument counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// `(min, max)`; no max means variadic
    Range(usize, Option<usize>),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range(min, max) => count >= min && max.map_or(true, |max| count <= max),
        }
    }

    /// Wording used in `InvalidNumberOfArguments` messages.
    pub fn expected(&self) -> String {
        match *self {
            Arity::Exact(n) => n.to_string(),
            Arity::Range(min, None) => format!("at least {}", min),
            Arity::Range(min, Some(max)) if min == max => min.to_string(),
            Arity::Range(min, Some(max)) => format!("between {} and {}", min, max),
        }
    }
}

/// Built-in implementation. The receiver is `Undefined` for namespace functions.
pub type NativeFn = fn(&mut ExecutionContext<'_>, &Value, &[Value]) -> Result<Value, StdlibError>;

/// Embedder-supplied implementation.
pub type HostFn = Rc<dyn Fn(&mut ExecutionContext<'_>, &[Value]) -> Result<Value, HostError>>;

/// A built-in function or method.
#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: Arity,
    /// `None` for members that exist but have not been built yet
    pub call: Option<NativeFn>,
}

impl NativeFunction {
    pub const fn new(name: &'static str, arity: Arity, call: NativeFn) -> Self {
        NativeFunction {
            name,
            arity,
            call: Some(call),
        }
    }

    pub const fn unimplemented(name: &'static str) -> Self {
        NativeFunction {
            name,
            arity: Arity::Range(0, None),
            call: None,
        }
    }
}

#[derive(Clone)]
pub struct ExternalFunction {
    pub name: String,
    pub arity: Arity,
    pub func: HostFn,
    pub description: String,
}

pub enum Callable {
    UserDefined {
        declaration: Rc<FunctionDeclaration>,
        closure: Rc<RefCell<Environment>>,
    },
    Stdlib(NativeFunction),
    BoundMethod {
        receiver: Value,
        method: NativeFunction,
    },
    External(ExternalFunction),
}

impl Callable {
    pub fn name(&self) -> String {
        match self {
            Callable::UserDefined { declaration, .. } => declaration.name.clone(),
            Callable::Stdlib(function) => function.name.to_string(),
            Callable::BoundMethod { method, .. } => method.name.to_string(),
            Callable::External(function) => function.name.clone(),
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Callable::UserDefined { declaration, .. } => Arity::Exact(declaration.params.len()),
            Callable::Stdlib(function) => function.arity,
            Callable::BoundMethod { method, .. } => method.arity,
            Callable::External(function) => function.arity,
        }
    }
}

// Closures can reach themselves through their environment, so Debug stays shallow
impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Callable::UserDefined { .. } => "UserDefined",
            Callable::Stdlib(_) => "Stdlib",
            Callable::BoundMethod { .. } => "BoundMethod",
            Callable::External(_) => "External",
        };
        write!(f, "{}({})", kind, self.name())
    }
}
