use crate::interpreter::engine::Executor;
use crate::interpreter::errors::{RuntimeError, RuntimeErrorType};
use crate::memory::value::{Value, MAX_STRING_LENGTH};
use crate::parser::ast::{BinaryOperator, Expression, Location};
use crate::translator::context;

impl<'a> Executor<'a> {
    pub(crate) fn evaluate_binary(
        &mut self,
        left: &Expression,
        operator: BinaryOperator,
        right: &Expression,
        location: Location,
    ) -> Result<Value, RuntimeError> {
        if matches!(operator, BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr) {
            return self.evaluate_logical(left, operator, right);
        }

        let lhs = self.evaluate(left)?;
        let rhs = self.evaluate(right)?;
        self.apply_binary(operator, &lhs, &rhs, location)
    }

    /// `&&` and `||`. The right operand is only evaluated when the left one
    /// does not decide the result.
    fn evaluate_logical(
        &mut self,
        left: &Expression,
        operator: BinaryOperator,
        right: &Expression,
    ) -> Result<Value, RuntimeError> {
        let lhs = self.evaluate(left)?;
        let left_holds = self.verify_boolean(&lhs, left.location())?;
        let decided = match operator {
            BinaryOperator::LogicalAnd => !left_holds,
            _ => left_holds,
        };
        if decided {
            return Ok(lhs);
        }

        let rhs = self.evaluate(right)?;
        self.verify_boolean(&rhs, right.location())?;
        Ok(rhs)
    }

    pub(crate) fn apply_binary(
        &self,
        operator: BinaryOperator,
        lhs: &Value,
        rhs: &Value,
        location: Location,
    ) -> Result<Value, RuntimeError> {
        let coercion = self.features.allow_type_coercion;
        match operator {
            BinaryOperator::Plus => match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => self.bounded_string(format!("{}{}", a, b), location),
                _ if !coercion => Err(self.coercion_error(operator, lhs, rhs, location)),
                _ if is_concatenation(lhs, rhs) => self.bounded_string(
                    format!("{}{}", lhs.to_display_string(), rhs.to_display_string()),
                    location,
                ),
                _ => Ok(Value::Number(lhs.to_number() + rhs.to_number())),
            },
            BinaryOperator::Minus
            | BinaryOperator::Star
            | BinaryOperator::Slash
            | BinaryOperator::Percent
            | BinaryOperator::StarStar => {
                let (a, b) = match (lhs, rhs) {
                    (Value::Number(a), Value::Number(b)) => (*a, *b),
                    _ if coercion => (lhs.to_number(), rhs.to_number()),
                    _ => return Err(self.coercion_error(operator, lhs, rhs, location)),
                };
                Ok(Value::Number(arithmetic(operator, a, b)))
            }
            BinaryOperator::Greater | BinaryOperator::GreaterEqual | BinaryOperator::Less | BinaryOperator::LessEqual => {
                let (a, b) = match (lhs, rhs) {
                    (Value::Number(a), Value::Number(b)) => (*a, *b),
                    (Value::Number(_), other) | (other, _) => {
                        return Err(self.error(
                            RuntimeErrorType::ComparisonRequiresNumber,
                            location,
                            context([("operator", operator.lexeme()), ("type", other.type_name())]),
                        ))
                    }
                };
                let result = match operator {
                    BinaryOperator::Greater => a > b,
                    BinaryOperator::GreaterEqual => a >= b,
                    BinaryOperator::Less => a < b,
                    _ => a <= b,
                };
                Ok(Value::Boolean(result))
            }
            BinaryOperator::StrictEqual => Ok(Value::Boolean(lhs.strict_equals(rhs))),
            BinaryOperator::NotStrictEqual => Ok(Value::Boolean(!lhs.strict_equals(rhs))),
            BinaryOperator::EqualEqual | BinaryOperator::NotEqual => {
                if self.features.enforce_strict_equality {
                    let suggestion = match operator {
                        BinaryOperator::EqualEqual => "===",
                        _ => "!==",
                    };
                    return Err(self.error(
                        RuntimeErrorType::StrictEqualityRequired,
                        location,
                        context([("operator", operator.lexeme()), ("suggestion", suggestion)]),
                    ));
                }
                let equal = lhs.loose_equals(rhs);
                Ok(Value::Boolean(if operator == BinaryOperator::EqualEqual {
                    equal
                } else {
                    !equal
                }))
            }
            BinaryOperator::In => self.apply_in(lhs, rhs, location),
            BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr => Err(self.error(
                RuntimeErrorType::InvalidBinaryExpression,
                location,
                context([("operator", operator.lexeme())]),
            )),
        }
    }

    /// `key in object`
    fn apply_in(&self, key: &Value, object: &Value, location: Location) -> Result<Value, RuntimeError> {
        let dictionary = match object {
            Value::Dictionary(dictionary) => dictionary,
            Value::Array(_) => {
                return Err(self.error(RuntimeErrorType::InWithArrayNotAllowed, location, context([("type", "list")])))
            }
            other => {
                return Err(self.error(
                    RuntimeErrorType::InOperatorRequiresObject,
                    location,
                    context([("type", other.type_name())]),
                ))
            }
        };
        match key {
            Value::String(key) => Ok(Value::Boolean(dictionary.borrow().contains_key(key))),
            other => Err(self.error(
                RuntimeErrorType::InOperatorRequiresStringKey,
                location,
                context([("type", other.type_name())]),
            )),
        }
    }

    /// Strings built by operators share the stdlib's length cap.
    pub(crate) fn bounded_string(&self, text: String, location: Location) -> Result<Value, RuntimeError> {
        if text.chars().count() > MAX_STRING_LENGTH {
            return Err(self.error(
                RuntimeErrorType::StringTooLong,
                location,
                context([("max", MAX_STRING_LENGTH)]),
            ));
        }
        Ok(Value::String(text))
    }

    fn coercion_error(&self, operator: BinaryOperator, lhs: &Value, rhs: &Value, location: Location) -> RuntimeError {
        self.error(
            RuntimeErrorType::TypeCoercionNotAllowed,
            location,
            context([
                ("operator", operator.lexeme()),
                ("left", lhs.type_name()),
                ("right", rhs.type_name()),
            ]),
        )
    }
}

/// With coercion on, `+` concatenates as soon as either side is not a primitive number-like.
fn is_concatenation(lhs: &Value, rhs: &Value) -> bool {
    let stringy = |value: &Value| {
        matches!(
            value,
            Value::String(_) | Value::Array(_) | Value::Dictionary(_) | Value::Function(_) | Value::Namespace(_)
        )
    };
    stringy(lhs) || stringy(rhs)
}

fn arithmetic(operator: BinaryOperator, a: f64, b: f64) -> f64 {
    match operator {
        BinaryOperator::Minus => a - b,
        BinaryOperator::Star => a * b,
        BinaryOperator::Slash => a / b,
        BinaryOperator::Percent => a % b,
        BinaryOperator::StarStar => a.powf(b),
        _ => a + b,
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

    fn eval_with(expression: &str, features: &LanguageFeatures) -> Result<Value, RuntimeErrorType> {
        let source = format!("let result = {};", expression);
        let translator = Translator::english();
        let program = parse_program(&source, features, &translator).unwrap();
        let mut executor = Executor::new(&source, features, &translator, &[]);
        executor.execute_program(&program);
        let frame = executor.recorder().frames().last().unwrap().clone();
        match frame.error {
            Some(error) => Err(error.error_type),
            None => Ok(frame.variables["result"].clone()),
        }
    }

    fn eval(expression: &str) -> Result<Value, RuntimeErrorType> {
        eval_with(expression, &LanguageFeatures::default())
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Ok(Value::from(7.0)));
        assert_eq!(eval("2 ** 3 ** 2"), Ok(Value::from(512.0)));
        assert_eq!(eval("7 % 3"), Ok(Value::from(1.0)));
        assert_eq!(eval("1 / 0"), Ok(Value::from(f64::INFINITY)));
        assert_eq!(eval("\"a\" + \"b\""), Ok(Value::from("ab")));
    }

    #[test]
    fn test_coercion_is_refused_by_default() {
        assert_eq!(eval("\"a\" + 1"), Err(RuntimeErrorType::TypeCoercionNotAllowed));
        assert_eq!(eval("\"4\" - 1"), Err(RuntimeErrorType::TypeCoercionNotAllowed));

        let features = LanguageFeatures {
            allow_type_coercion: true,
            ..LanguageFeatures::default()
        };
        assert_eq!(eval_with("\"a\" + 1", &features), Ok(Value::from("a1")));
        assert_eq!(eval_with("\"4\" - 1", &features), Ok(Value::from(3.0)));
        assert_eq!(eval_with("true + 1", &features), Ok(Value::from(2.0)));
    }

    #[test]
    fn test_comparison_requires_numbers() {
        assert_eq!(eval("2 >= 2"), Ok(Value::from(true)));
        assert_eq!(eval("\"a\" < \"b\""), Err(RuntimeErrorType::ComparisonRequiresNumber));
    }

    #[test]
    fn test_equality() {
        assert_eq!(eval("1 === 1"), Ok(Value::from(true)));
        assert_eq!(eval("[1] === [1]"), Ok(Value::from(false)));
        assert_eq!(eval("1 == 1"), Err(RuntimeErrorType::StrictEqualityRequired));

        let features = LanguageFeatures {
            enforce_strict_equality: false,
            ..LanguageFeatures::default()
        };
        assert_eq!(eval_with("1 == \"1\"", &features), Ok(Value::from(true)));
        assert_eq!(eval_with("null != undefined", &features), Ok(Value::from(false)));
    }

    #[test]
    fn test_logical_operators_short_circuit() {
        assert_eq!(eval("false && missing"), Ok(Value::from(false)));
        assert_eq!(eval("true || missing"), Ok(Value::from(true)));
        assert_eq!(eval("true && missing"), Err(RuntimeErrorType::VariableNotDeclared));
        assert_eq!(eval("1 && true"), Err(RuntimeErrorType::TruthinessDisabled));

        let features = LanguageFeatures {
            allow_truthiness: true,
            ..LanguageFeatures::default()
        };
        assert_eq!(eval_with("0 || \"fallback\"", &features), Ok(Value::from("fallback")));
    }

    #[test]
    fn test_in_operator() {
        assert_eq!(eval("\"a\" in {a: 1}"), Ok(Value::from(true)));
        assert_eq!(eval("\"b\" in {a: 1}"), Ok(Value::from(false)));
        assert_eq!(eval("0 in [1]"), Err(RuntimeErrorType::InWithArrayNotAllowed));
        assert_eq!(eval("\"a\" in \"abc\""), Err(RuntimeErrorType::InOperatorRequiresObject));
        assert_eq!(eval("1 in {a: 1}"), Err(RuntimeErrorType::InOperatorRequiresStringKey));
    }
}
