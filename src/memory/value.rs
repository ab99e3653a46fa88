//! Runtime value representation
//!
//! Primitives are stored inline. Arrays and dictionaries are shared, mutable
//! containers (`Rc<RefCell<..>>`) so that aliasing behaves the way learners
//! expect: `let b = a; b.push(1)` changes `a` too. Frames must not observe
//! later mutations, so every snapshot goes through [`Value::deep_clone`].
//!
//! # Display
//!
//! [`Value::to_display_string`] is what `console.log` and template literals
//! print. Strings nested inside containers are single-quoted:
//!
//! ```text
//! [ 1, 'a', [] ]      { name: 'Ada', age: 36 }
//! ```

use crate::memory::callable::Callable;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Longest list an index write may grow.
pub const MAX_ARRAY_LENGTH: usize = 100_000;

/// Longest string the interpreter will build, in characters.
pub const MAX_STRING_LENGTH: usize = 1 << 20;

/// Runtime values in the interpreter
#[derive(Clone, Default)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    #[default]
    Undefined,
    Array(Rc<RefCell<Vec<Value>>>),
    Dictionary(Rc<RefCell<Dictionary>>),
    Function(Rc<Callable>),
    /// A built-in namespace such as `console` or `Math`
    Namespace(Rc<Namespace>),
}

/// Insertion-ordered string-keyed map backing object literals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(String, Value)>,
    index: FxHashMap<String, usize>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut dictionary = Dictionary::new();
        for (key, value) in entries {
            dictionary.insert(key, value);
        }
        dictionary
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Overwrite in place, or append a new key at the end.
    pub fn insert(&mut self, key: String, value: Value) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Members of a built-in namespace, in declaration order.
pub struct Namespace {
    pub name: &'static str,
    pub members: Vec<(&'static str, Value)>,
}

impl Namespace {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members
            .iter()
            .find(|(member, _)| *member == name)
            .map(|(_, value)| value)
    }
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn dictionary(dictionary: Dictionary) -> Self {
        Value::Dictionary(Rc::new(RefCell::new(dictionary)))
    }

    pub fn function(callable: Callable) -> Self {
        Value::Function(Rc::new(callable))
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Array(_) => "list",
            Value::Dictionary(_) | Value::Namespace(_) => "object",
            Value::Function(_) => "function",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric conversion used when type coercion is enabled.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Null => 0.0,
            Value::Undefined | Value::Array(_) | Value::Dictionary(_) | Value::Function(_) | Value::Namespace(_) => {
                f64::NAN
            }
        }
    }

    /// JavaScript truthiness, used only when `allowTruthiness` is on.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::Null | Value::Undefined => false,
            Value::Array(_) | Value::Dictionary(_) | Value::Function(_) | Value::Namespace(_) => true,
        }
    }

    /// `===`: primitives by value, containers and functions by identity.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Dictionary(a), Value::Dictionary(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Namespace(a), Value::Namespace(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==` with the usual number/string/boolean coercions.
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
            (Value::Null | Value::Undefined, _) | (_, Value::Null | Value::Undefined) => false,
            (Value::Number(a), Value::String(b)) | (Value::String(b), Value::Number(a)) => {
                string_to_number(b) == *a
            }
            (Value::Boolean(a), other) | (other, Value::Boolean(a)) if !matches!(other, Value::Boolean(_)) => {
                Value::Number(if *a { 1.0 } else { 0.0 }).loose_equals(other)
            }
            _ => self.strict_equals(other),
        }
    }

    /// Copy that shares nothing mutable with `self`.
    ///
    /// A container reached twice is copied once, so aliases and cycles in
    /// the original are aliases and cycles in the copy. Functions and
    /// namespaces are immutable and stay shared.
    pub fn deep_clone(&self) -> Value {
        self.clone_with(&mut FxHashMap::default())
    }

    fn clone_with(&self, copies: &mut FxHashMap<*const (), Value>) -> Value {
        match self {
            Value::Array(elements) => {
                let key = Rc::as_ptr(elements) as *const ();
                if let Some(copy) = copies.get(&key) {
                    return copy.clone();
                }
                let copy = Rc::new(RefCell::new(Vec::new()));
                copies.insert(key, Value::Array(Rc::clone(&copy)));
                let items: Vec<Value> = elements.borrow().iter().map(|item| item.clone_with(copies)).collect();
                *copy.borrow_mut() = items;
                Value::Array(copy)
            }
            Value::Dictionary(dictionary) => {
                let key = Rc::as_ptr(dictionary) as *const ();
                if let Some(copy) = copies.get(&key) {
                    return copy.clone();
                }
                let copy = Rc::new(RefCell::new(Dictionary::new()));
                copies.insert(key, Value::Dictionary(Rc::clone(&copy)));
                let entries: Vec<(String, Value)> = dictionary
                    .borrow()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone_with(copies)))
                    .collect();
                *copy.borrow_mut() = Dictionary::from_entries(entries);
                Value::Dictionary(copy)
            }
            other => other.clone(),
        }
    }

    /// Form printed by `console.log` and template literals.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.inspect(),
        }
    }

    /// Form used inside containers: strings are quoted. A container nested
    /// inside itself prints as `[Circular]`.
    pub fn inspect(&self) -> String {
        self.inspect_within(&mut Vec::new())
    }

    fn inspect_within(&self, open: &mut Vec<*const ()>) -> String {
        if let Some(key) = self.container_key() {
            if open.contains(&key) {
                return "[Circular]".to_string();
            }
            open.push(key);
        }
        let text = match self {
            Value::Number(n) => format_number(*n),
            Value::String(s) => format!("'{}'", s),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Array(elements) => {
                let elements = elements.borrow();
                if elements.is_empty() {
                    "[]".to_string()
                } else {
                    let items: Vec<String> = elements.iter().map(|item| item.inspect_within(open)).collect();
                    format!("[ {} ]", items.join(", "))
                }
            }
            Value::Dictionary(dictionary) => {
                let dictionary = dictionary.borrow();
                if dictionary.is_empty() {
                    "{}".to_string()
                } else {
                    let items: Vec<String> = dictionary
                        .iter()
                        .map(|(key, value)| format!("{}: {}", format_key(key), value.inspect_within(open)))
                        .collect();
                    format!("{{ {} }}", items.join(", "))
                }
            }
            Value::Function(callable) => format!("[Function: {}]", callable.name()),
            Value::Namespace(namespace) => format!("[object {}]", namespace.name),
        };
        if self.container_key().is_some() {
            open.pop();
        }
        text
    }

    /// Identity of a mutable container, used to detect cycles.
    fn container_key(&self) -> Option<*const ()> {
        match self {
            Value::Array(elements) => Some(Rc::as_ptr(elements) as *const ()),
            Value::Dictionary(dictionary) => Some(Rc::as_ptr(dictionary) as *const ()),
            _ => None,
        }
    }

    /// Structural comparison. A pair of containers already being compared
    /// further up is assumed equal, which keeps cyclic values finite.
    fn structural_eq(&self, other: &Value, comparing: &mut Vec<(*const (), *const ())>) -> bool {
        let pair = match (self.container_key(), other.container_key()) {
            (Some(a), Some(b)) if a == b => return true,
            (Some(a), Some(b)) => (a, b),
            _ => {
                return match (self, other) {
                    (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
                    _ => self.strict_equals(other),
                }
            }
        };
        if comparing.contains(&pair) {
            return true;
        }
        comparing.push(pair);
        let equal = match (self, other) {
            (Value::Array(a), Value::Array(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.structural_eq(y, comparing))
            }
            (Value::Dictionary(a), Value::Dictionary(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va.structural_eq(vb, comparing))
            }
            _ => false,
        };
        comparing.pop();
        equal
    }

    /// Convert a JSON value (e.g. a `--arg` on the command line).
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::array(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => Value::dictionary(Dictionary::from_entries(
                map.iter().map(|(key, value)| (key.clone(), Value::from_json(value))),
            )),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality; functions and namespaces compare by identity.
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => f.write_str(&other.inspect()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// JavaScript number formatting: `1`, `1.5`, `NaN`, `Infinity`, `-0` as `0`,
/// and exponent form (`1e+21`, `1e-7`) outside `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
            _ => text,
        }
    } else {
        format!("{}", n)
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse::<f64>().unwrap_or(f64::NAN)
    }
}

fn format_key(key: &str) -> String {
    let is_identifier = key
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        key.to_string()
    } else {
        format!("'{}'", key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e22), "-1.5e+22");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(2.5e-8), "2.5e-8");
    }

    #[test]
    fn test_display_nested_values() {
        let value = Value::array(vec![Value::from(1.0), Value::from("a"), Value::array(vec![])]);
        assert_eq!(value.to_display_string(), "[ 1, 'a', [] ]");

        let dict = Value::dictionary(Dictionary::from_entries([
            ("name".to_string(), Value::from("Ada")),
            ("two words".to_string(), Value::from(2.0)),
        ]));
        assert_eq!(dict.to_display_string(), "{ name: 'Ada', 'two words': 2 }");
        assert_eq!(Value::dictionary(Dictionary::new()).to_display_string(), "{}");
        assert_eq!(Value::from("plain").to_display_string(), "plain");
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let original = Value::array(vec![Value::array(vec![Value::from(1.0)])]);
        let copy = original.deep_clone();

        if let Value::Array(outer) = &original {
            if let Value::Array(inner) = &outer.borrow()[0] {
                inner.borrow_mut().push(Value::from(2.0));
            }
        }

        assert_eq!(copy.to_display_string(), "[ [ 1 ] ]");
        assert_eq!(original.to_display_string(), "[ [ 1, 2 ] ]");
    }

    #[test]
    fn test_strict_equality_uses_identity_for_containers() {
        let a = Value::array(vec![Value::from(1.0)]);
        let b = Value::array(vec![Value::from(1.0)]);
        assert!(a.strict_equals(&a.clone()));
        assert!(!a.strict_equals(&b));
        // Rust-side equality is structural
        assert_eq!(a, b);
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(Value::from(1.0).loose_equals(&Value::from("1")));
        assert!(Value::from(true).loose_equals(&Value::from(1.0)));
        assert!(!Value::from(0.0).loose_equals(&Value::Null));
    }

    #[test]
    fn test_dictionary_keeps_insertion_order() {
        let mut dictionary = Dictionary::new();
        dictionary.insert("b".to_string(), Value::from(1.0));
        dictionary.insert("a".to_string(), Value::from(2.0));
        dictionary.insert("b".to_string(), Value::from(3.0));
        let keys: Vec<_> = dictionary.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(dictionary.get("b"), Some(&Value::from(3.0)));
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value = serde_json::from_str(r#"{"xs": [1, "two"], "ok": true}"#).unwrap();
        let value = Value::from_json(&json);
        assert_eq!(value.type_name(), "object");
        assert_eq!(value.to_display_string(), "{ ok: true, xs: [ 1, 'two' ] }");
    }

    fn self_containing_list() -> Value {
        let list = Value::array(vec![Value::from(1.0)]);
        if let Value::Array(elements) = &list {
            elements.borrow_mut().push(list.clone());
        }
        list
    }

    #[test]
    fn test_cycles_print_as_circular() {
        let list = self_containing_list();
        assert_eq!(list.inspect(), "[ 1, [Circular] ]");

        let dictionary = Value::dictionary(Dictionary::new());
        if let Value::Dictionary(entries) = &dictionary {
            entries.borrow_mut().insert("me".to_string(), dictionary.clone());
        }
        assert_eq!(dictionary.to_display_string(), "{ me: [Circular] }");
    }

    #[test]
    fn test_shared_values_are_not_circular() {
        let shared = Value::array(vec![Value::from(1.0)]);
        let pair = Value::array(vec![shared.clone(), shared]);
        assert_eq!(pair.inspect(), "[ [ 1 ], [ 1 ] ]");
    }

    #[test]
    fn test_deep_clone_reproduces_cycles() {
        let list = self_containing_list();
        let copy = list.deep_clone();
        assert!(!copy.strict_equals(&list));
        assert_eq!(copy, list);

        let Value::Array(elements) = &copy else {
            panic!("expected a list");
        };
        assert!(elements.borrow()[1].strict_equals(&copy));
    }

    #[test]
    fn test_deep_clone_keeps_aliases_together() {
        let shared = Value::array(vec![]);
        let pair = Value::array(vec![shared.clone(), shared]);
        let copy = pair.deep_clone();
        let Value::Array(elements) = &copy else {
            panic!("expected a list");
        };
        let elements = elements.borrow();
        assert!(elements[0].strict_equals(&elements[1]));
    }
}
