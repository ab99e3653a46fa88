//! Expression evaluation
//!
//! [`Executor::evaluate`] is the single entry point; operators, member access
//! and calls are delegated to `ops/` and `calls.rs`. Expressions do not record
//! frames themselves: the statement or loop header that owns them does.

use crate::interpreter::engine::Executor;
use crate::interpreter::errors::{RuntimeError, RuntimeErrorType};
use crate::memory::callable::Callable;
use crate::memory::value::{Dictionary, Value};
use crate::parser::ast::{Expression, Literal, TemplatePart};
use crate::snapshot::ExpressionDetail;
use crate::translator::context;
use std::rc::Rc;

impl<'a> Executor<'a> {
    pub(crate) fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        self.assert_node_allowed(expression.node_type(), expression.location())?;

        match expression {
            Expression::Literal { value, .. } => Ok(literal_value(value)),
            Expression::Binary {
                left,
                operator,
                right,
                location,
            } => self.evaluate_binary(left, *operator, right, *location),
            Expression::Unary {
                operator,
                operand,
                location,
            } => self.evaluate_unary(*operator, operand, *location),
            Expression::Grouping { inner, .. } => self.evaluate(inner),
            Expression::Identifier { name, location } => self
                .lookup(name)
                .ok_or_else(|| self.error(RuntimeErrorType::VariableNotDeclared, *location, context([("name", name)]))),
            Expression::Assignment { target, value, .. } => self.evaluate_assignment(target, value),
            Expression::Update {
                operator,
                operand,
                prefix,
                location,
            } => Ok(self.evaluate_update(*operator, operand, *prefix, *location)?.0),
            Expression::TemplateLiteral { parts, location } => {
                let mut text = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text(chunk) => text.push_str(chunk),
                        TemplatePart::Interpolation(inner) => text.push_str(&self.evaluate(inner)?.to_display_string()),
                    }
                }
                self.bounded_string(text, *location)
            }
            Expression::Array { elements, .. } => {
                let values = elements
                    .iter()
                    .map(|element| self.evaluate(element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(values))
            }
            Expression::Dictionary { entries, .. } => {
                let mut dictionary = Dictionary::new();
                for (key, value) in entries {
                    let value = self.evaluate(value)?;
                    dictionary.insert(key.clone(), value);
                }
                Ok(Value::dictionary(dictionary))
            }
            Expression::Member {
                object,
                property,
                computed,
                location,
            } => self.evaluate_member(object, property, *computed, *location),
            Expression::Call { callee, args, location } => Ok(self.evaluate_call(callee, args, *location)?.value),
            Expression::Function { declaration, .. } => Ok(Value::function(Callable::UserDefined {
                declaration: Rc::clone(declaration),
                closure: Rc::clone(&self.environment),
            })),
        }
    }

    /// Evaluate the top expression of an expression statement, keeping what
    /// describers need to explain it.
    pub(crate) fn evaluate_with_detail(
        &mut self,
        expression: &Expression,
    ) -> Result<(Value, ExpressionDetail), RuntimeError> {
        match expression {
            Expression::Call { callee, args, location } => {
                self.assert_node_allowed(expression.node_type(), *location)?;
                let outcome = self.evaluate_call(callee, args, *location)?;
                Ok((
                    outcome.value,
                    ExpressionDetail::Call {
                        callee: outcome.callee,
                        args: outcome.args,
                    },
                ))
            }
            Expression::Update {
                operator,
                operand,
                prefix,
                location,
            } => {
                self.assert_node_allowed(expression.node_type(), *location)?;
                let (value, previous) = self.evaluate_update(*operator, operand, *prefix, *location)?;
                Ok((
                    value,
                    ExpressionDetail::Update {
                        target: self.code(operand.location()),
                        operator: operator.lexeme(),
                        previous,
                    },
                ))
            }
            Expression::Assignment { target, .. } => {
                let value = self.evaluate(expression)?;
                Ok((
                    value,
                    ExpressionDetail::Assignment {
                        target: self.code(target.location()),
                    },
                ))
            }
            Expression::Binary { operator, .. } => {
                let value = self.evaluate(expression)?;
                Ok((
                    value,
                    ExpressionDetail::Binary {
                        operator: operator.lexeme(),
                    },
                ))
            }
            _ => Ok((self.evaluate(expression)?, ExpressionDetail::Other)),
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
        Literal::Undefined => Value::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use crate::features::LanguageFeatures;
    use crate::interpreter::engine::Executor;
    use crate::memory::value::Value;
    use crate::parser::ast::NodeType;
    use crate::parser::parse_program;
    use crate::snapshot::{EvaluationResult, ExpressionDetail, Frame};
    use crate::translator::Translator;

    fn run(source: &str) -> Vec<Frame> {
        let translator = Translator::english();
        let features = LanguageFeatures::default();
        let program = parse_program(source, &features, &translator).unwrap();
        let mut executor = Executor::new(source, &features, &translator, &[]);
        executor.execute_program(&program);
        executor.into_recorder().into_parts().0
    }

    #[test]
    fn test_template_literal_interpolation() {
        let frames = run("let name = \"Ada\";\nlet greeting = `Hi ${name}, ${1 + 1} ${[1, 'a']}`;");
        assert_eq!(
            frames.last().unwrap().variables["greeting"],
            Value::from("Hi Ada, 2 [ 1, 'a' ]")
        );
    }

    #[test]
    fn test_literals_and_containers() {
        let frames = run("let o = {list: [1, null, undefined], flag: true};");
        assert_eq!(
            frames[0].variables["o"].to_display_string(),
            "{ list: [ 1, null, undefined ], flag: true }"
        );
    }

    #[test]
    fn test_assignment_detail_names_target() {
        let frames = run("let x = 1;\nx = x + 1;");
        assert_eq!(frames[1].node, NodeType::ExpressionStatement);
        assert_eq!(
            frames[1].result,
            Some(EvaluationResult::Expression {
                value: Value::from(2.0),
                detail: ExpressionDetail::Assignment {
                    target: "x".to_string()
                },
            })
        );
    }

    #[test]
    fn test_runtime_node_check_matches_parser() {
        let translator = Translator::english();
        let source = "let x = [1];";
        let program = parse_program(source, &LanguageFeatures::default(), &translator).unwrap();
        let restricted = LanguageFeatures {
            allowed_nodes: Some(vec![NodeType::VariableDeclaration]),
            ..LanguageFeatures::default()
        };
        let mut executor = Executor::new(source, &restricted, &translator, &[]);
        assert!(!executor.execute_program(&program));
        let error = executor.recorder().frames()[0].error.clone().unwrap();
        assert_eq!(error.context["nodeType"], "ArrayExpression");
    }
}
