use crate::interpreter::engine::Executor;
use crate::interpreter::errors::{RuntimeError, RuntimeErrorType};
use crate::memory::value::{Dictionary, Value};
use crate::parser::ast::{Expression, Location, UpdateOperator};
use crate::translator::context;
use std::cell::RefCell;
use std::rc::Rc;

/// The slot an assignment or update writes to. Resolving it evaluates the
/// target's object and key exactly once.
enum Place {
    Variable {
        name: String,
        location: Location,
    },
    Property {
        dictionary: Rc<RefCell<Dictionary>>,
        key: String,
    },
    Element {
        elements: Rc<RefCell<Vec<Value>>>,
        index: usize,
        location: Location,
    },
}

impl<'a> Executor<'a> {
    /// `target = value`. The value is evaluated before the target.
    pub(crate) fn evaluate_assignment(&mut self, target: &Expression, value: &Expression) -> Result<Value, RuntimeError> {
        let value = self.evaluate(value)?;
        let place = self.resolve_place(target)?;
        self.write_place(place, value.clone())?;
        Ok(value)
    }

    /// `++x`, `x--`, `xs[0]++`. Returns the expression's value and the value
    /// the target held before.
    pub(crate) fn evaluate_update(
        &mut self,
        operator: UpdateOperator,
        operand: &Expression,
        prefix: bool,
        location: Location,
    ) -> Result<(Value, Value), RuntimeError> {
        let place = self.resolve_place(operand)?;
        let previous = self.read_place(&place)?;
        let n = match &previous {
            Value::Number(n) => *n,
            other => return Err(self.invalid_unary(operator.lexeme(), "number", other, location)),
        };
        let updated = Value::Number(match operator {
            UpdateOperator::Increment => n + 1.0,
            UpdateOperator::Decrement => n - 1.0,
        });
        self.write_place(place, updated.clone())?;

        let result = if prefix { updated } else { previous.clone() };
        Ok((result, previous))
    }

    fn resolve_place(&mut self, target: &Expression) -> Result<Place, RuntimeError> {
        match target {
            Expression::Identifier { name, location } => Ok(Place::Variable {
                name: name.clone(),
                location: *location,
            }),
            Expression::Member {
                object,
                property,
                computed,
                location,
            } => {
                self.assert_node_allowed(target.node_type(), *location)?;
                let container = self.evaluate(object)?;
                match container {
                    Value::Dictionary(dictionary) => {
                        let key = self.property_key(property, *computed)?;
                        Ok(Place::Property { dictionary, key })
                    }
                    Value::Array(elements) if *computed => {
                        let index = self.evaluate(property)?;
                        let length = elements.borrow().len();
                        let index = self.array_index(&index, length, property.location(), true)?;
                        Ok(Place::Element {
                            elements,
                            index,
                            location: property.location(),
                        })
                    }
                    other => Err(self.type_error(
                        format!("Cannot set property of {}", other.type_name()),
                        object.location(),
                    )),
                }
            }
            other => Err(self.error(
                RuntimeErrorType::UnsupportedOperation,
                other.location(),
                context([("node", other.node_type())]),
            )),
        }
    }

    fn read_place(&self, place: &Place) -> Result<Value, RuntimeError> {
        match place {
            Place::Variable { name, location } => self
                .lookup(name)
                .ok_or_else(|| self.error(RuntimeErrorType::VariableNotDeclared, *location, context([("name", name)]))),
            Place::Property { dictionary, key } => Ok(dictionary.borrow().get(key).cloned().unwrap_or_default()),
            Place::Element {
                elements,
                index,
                location,
            } => {
                let elements = elements.borrow();
                elements.get(*index).cloned().ok_or_else(|| {
                    self.error(
                        RuntimeErrorType::IndexOutOfRange,
                        *location,
                        context([("index", index.to_string()), ("length", elements.len().to_string())]),
                    )
                })
            }
        }
    }

    fn write_place(&mut self, place: Place, value: Value) -> Result<(), RuntimeError> {
        match place {
            Place::Variable { name, location } => self.assign_variable(&name, value, location),
            Place::Property { dictionary, key } => {
                dictionary.borrow_mut().insert(key, value);
                Ok(())
            }
            Place::Element { elements, index, .. } => {
                let mut elements = elements.borrow_mut();
                if index >= elements.len() {
                    elements.resize(index + 1, Value::Undefined);
                }
                elements[index] = value;
                Ok(())
            }
        }
    }

    pub(crate) fn assign_variable(&mut self, name: &str, value: Value, location: Location) -> Result<(), RuntimeError> {
        let assigned = self.environment.borrow_mut().assign(name, value);
        match assigned {
            Ok(true) => Ok(()),
            // Built-ins and host functions behave like constants
            Ok(false) if self.is_global(name) => Err(self.error(
                RuntimeErrorType::AssignmentToConstant,
                location,
                context([("name", name)]),
            )),
            Ok(false) => Err(self.error(
                RuntimeErrorType::VariableNotDeclared,
                location,
                context([("name", name)]),
            )),
            Err(err) => Err(self.scope_error(err, name, location)),
        }
    }
}
