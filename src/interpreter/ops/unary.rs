use crate::interpreter::engine::Executor;
use crate::interpreter::errors::{RuntimeError, RuntimeErrorType};
use crate::memory::value::Value;
use crate::parser::ast::{Expression, Location, UnaryOperator};
use crate::translator::context;

impl<'a> Executor<'a> {
    pub(crate) fn evaluate_unary(
        &mut self,
        operator: UnaryOperator,
        operand: &Expression,
        location: Location,
    ) -> Result<Value, RuntimeError> {
        let value = self.evaluate(operand)?;

        match operator {
            UnaryOperator::Not => {
                let holds = self.verify_boolean(&value, operand.location())?;
                Ok(Value::Boolean(!holds))
            }
            UnaryOperator::Minus | UnaryOperator::Plus => {
                let n = match &value {
                    Value::Number(n) => *n,
                    other if self.features.allow_type_coercion => other.to_number(),
                    other => return Err(self.invalid_unary(operator.lexeme(), "number", other, location)),
                };
                Ok(Value::Number(if operator == UnaryOperator::Minus { -n } else { n }))
            }
        }
    }

    pub(crate) fn invalid_unary(
        &self,
        operator: &str,
        expected: &str,
        value: &Value,
        location: Location,
    ) -> RuntimeError {
        self.error(
            RuntimeErrorType::InvalidUnaryExpression,
            location,
            context([
                ("operator", operator),
                ("expected", expected),
                ("type", value.type_name()),
            ]),
        )
    }
}
