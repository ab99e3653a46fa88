//! Memory model for the interpreter
//!
//! - [`value`]: runtime values (numbers, strings, arrays, dictionaries, functions)
//! - [`environment`]: lexical scopes with `let`/`const` bindings
//! - [`callable`]: the four kinds of callable and their [`Arity`](callable::Arity)
//!
//! # Sharing
//!
//! Arrays, dictionaries and scopes are reference counted with interior
//! mutability (`Rc<RefCell<..>>`). The interpreter is single threaded, and a
//! closure that captures its scope keeps that scope alive.

pub mod callable;
pub mod environment;
pub mod value;

pub use callable::{Arity, Callable, ExternalFunction, NativeFunction};
pub use environment::{Binding, Environment, ScopeError};
pub use value::{Dictionary, Value};
