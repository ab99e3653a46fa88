use crate::interpreter::engine::Executor;
use crate::interpreter::errors::{RuntimeError, RuntimeErrorType};
use crate::memory::value::{format_number, Value, MAX_ARRAY_LENGTH};
use crate::parser::ast::{Expression, Literal, Location};
use crate::translator::context;

impl<'a> Executor<'a> {
    /// `object.property` and `object[property]`
    pub(crate) fn evaluate_member(
        &mut self,
        object: &Expression,
        property: &Expression,
        computed: bool,
        location: Location,
    ) -> Result<Value, RuntimeError> {
        let target = self.evaluate(object)?;

        match &target {
            Value::Dictionary(dictionary) => {
                let key = self.property_key(property, computed)?;
                let value = dictionary.borrow().get(&key).cloned();
                Ok(value.unwrap_or(Value::Undefined))
            }
            Value::Namespace(namespace) => {
                let name = self.property_key(property, computed)?;
                namespace.get(&name).cloned().ok_or_else(|| {
                    self.error(RuntimeErrorType::PropertyNotFound, location, context([("property", name)]))
                })
            }
            Value::Array(elements) if computed => {
                let index = self.evaluate(property)?;
                if index.as_str().is_some() {
                    return Err(self.computed_stdlib_error(location));
                }
                let elements = elements.borrow();
                let i = self.array_index(&index, elements.len(), property.location(), false)?;
                Ok(elements[i].clone())
            }
            Value::String(text) if computed => {
                let index = self.evaluate(property)?;
                if index.as_str().is_some() {
                    return Err(self.computed_stdlib_error(location));
                }
                let chars: Vec<char> = text.chars().collect();
                let i = self.array_index(&index, chars.len(), property.location(), false)?;
                Ok(Value::String(chars[i].to_string()))
            }
            Value::Array(_) | Value::String(_) => {
                let name = self.property_key(property, computed)?;
                self.stdlib_member(&target, &name, location)
            }
            other => Err(self.type_error(
                format!("Cannot read properties of {}", other.type_name()),
                object.location(),
            )),
        }
    }

    /// Key named by a member expression: the identifier after `.`, or the
    /// evaluated bracket expression (numbers are stringified).
    pub(crate) fn property_key(&mut self, property: &Expression, computed: bool) -> Result<String, RuntimeError> {
        if !computed {
            if let Expression::Literal {
                value: Literal::String(name),
                ..
            } = property
            {
                return Ok(name.clone());
            }
        }
        match self.evaluate(property)? {
            Value::String(key) => Ok(key),
            Value::Number(n) => Ok(format_number(n)),
            other => Ok(other.to_display_string()),
        }
    }

    /// Validate a list/string index. Writes may address one past the end or
    /// beyond, up to [`MAX_ARRAY_LENGTH`]; reads may not.
    pub(crate) fn array_index(
        &self,
        index: &Value,
        length: usize,
        location: Location,
        for_write: bool,
    ) -> Result<usize, RuntimeError> {
        let n = match index {
            Value::Number(n) => *n,
            _ => return Err(self.type_error("List index must be a number".to_string(), location)),
        };
        if n.fract() != 0.0 || !n.is_finite() {
            return Err(self.type_error("List index must be an integer".to_string(), location));
        }
        let limit = if for_write { MAX_ARRAY_LENGTH } else { length };
        if n < 0.0 || n >= limit as f64 {
            return Err(self.error(
                RuntimeErrorType::IndexOutOfRange,
                location,
                context([("index", format_number(n)), ("length", length.to_string())]),
            ));
        }
        Ok(n as usize)
    }

    pub(crate) fn type_error(&self, message: String, location: Location) -> RuntimeError {
        self.error(RuntimeErrorType::TypeError, location, context([("message", message)]))
    }

    fn computed_stdlib_error(&self, location: Location) -> RuntimeError {
        self.type_error(
            "Cannot use computed property access for stdlib members".to_string(),
            location,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::features::LanguageFeatures;
    use crate::interpreter::engine::Executor;
    use crate::interpreter::errors::RuntimeErrorType;
    use crate::memory::value::Value;
    use crate::parser::parse_program;
    use crate::translator::Translator;

    fn eval(source: &str) -> Result<Value, (RuntimeErrorType, String)> {
        let translator = Translator::english();
        let features = LanguageFeatures::default();
        let program = parse_program(source, &features, &translator).unwrap();
        let mut executor = Executor::new(source, &features, &translator, &[]);
        executor.execute_program(&program);
        let frame = executor.recorder().frames().last().unwrap().clone();
        match frame.error {
            Some(error) => Err((error.error_type, error.message)),
            None => Ok(frame.variables["result"].clone()),
        }
    }

    #[test]
    fn test_list_and_string_indexing() {
        assert_eq!(eval("let xs = [10, 20];\nlet result = xs[1];"), Ok(Value::from(20.0)));
        assert_eq!(eval("let result = \"hey\"[0];"), Ok(Value::from("h")));
    }

    #[test]
    fn test_index_errors() {
        let (error_type, message) = eval("let xs = [10, 20];\nlet result = xs[2];").unwrap_err();
        assert_eq!(error_type, RuntimeErrorType::IndexOutOfRange);
        assert_eq!(message, "Index 2 is out of range for a list of length 2.");

        assert_eq!(
            eval("let result = [1][-1];").unwrap_err().0,
            RuntimeErrorType::IndexOutOfRange
        );
        assert_eq!(eval("let result = [1][0.5];").unwrap_err().0, RuntimeErrorType::TypeError);
        assert_eq!(
            eval("let result = \"abc\"[\"length\"];").unwrap_err().0,
            RuntimeErrorType::TypeError
        );
    }

    #[test]
    fn test_dictionary_access() {
        assert_eq!(eval("let o = {a: 1, 2: \"two\"};\nlet result = o.a;"), Ok(Value::from(1.0)));
        assert_eq!(eval("let o = {a: 1, 2: \"two\"};\nlet result = o[2];"), Ok(Value::from("two")));
        assert_eq!(eval("let o = {a: 1};\nlet result = o.missing;"), Ok(Value::Undefined));
    }

    #[test]
    fn test_reading_from_a_number_is_a_type_error() {
        let (error_type, message) = eval("let n = 1;\nlet result = n.x;").unwrap_err();
        assert_eq!(error_type, RuntimeErrorType::TypeError);
        assert_eq!(message, "Cannot read properties of number");
    }

    #[test]
    fn test_namespace_members() {
        assert_eq!(
            eval("let result = Math.nope;").unwrap_err().0,
            RuntimeErrorType::PropertyNotFound
        );
    }
}
