//! Loop statement execution (`while`, `for`, `for...of`, `for...in`, `repeat`).
//!
//! Every loop runs inside one loop-scoped environment. Each iteration first
//! records a header frame (condition, element, key or count), then counts
//! against the run-wide iteration budget, then runs the body.
//!
//! `break` and `continue` come back from the body as [`LoopBodyResult`] so the
//! loop driver can react without inspecting [`ControlFlow`] itself. A
//! `return` inside a loop body is passed on unchanged through
//! [`LoopBodyResult::Exit`].

use crate::interpreter::engine::{ControlFlow, Executor};
use crate::interpreter::errors::{RuntimeError, RuntimeErrorType};
use crate::memory::value::{format_number, Value};
use crate::parser::ast::{Expression, Location, LoopVariable, NodeType, Statement};
use crate::snapshot::EvaluationResult;
use crate::translator::context;

/// How one run of a loop body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`
    Continue,
    /// `break` was encountered
    Break,
    /// A `return` that the enclosing call must handle
    Exit(ControlFlow),
}

impl<'a> Executor<'a> {
    pub(crate) fn execute_loop_body(&mut self, body: &Statement) -> Result<LoopBodyResult, RuntimeError> {
        match self.execute_statement(body)? {
            ControlFlow::Normal | ControlFlow::Continue(_) => Ok(LoopBodyResult::Continue),
            ControlFlow::Break(_) => Ok(LoopBodyResult::Break),
            signal @ ControlFlow::Return(..) => Ok(LoopBodyResult::Exit(signal)),
        }
    }

    /// Record a header frame for a condition and return whether it holds.
    fn check_condition(
        &mut self,
        condition: &Expression,
        node: NodeType,
        iteration: usize,
    ) -> Result<bool, RuntimeError> {
        let mut holds = false;
        self.execute_frame(condition.location(), node, |this| {
            let value = this.evaluate(condition)?;
            holds = this.verify_boolean(&value, condition.location())?;
            Ok(match node {
                NodeType::ForStatement => EvaluationResult::ForCondition { value, iteration },
                _ => EvaluationResult::WhileCondition { value, iteration },
            })
        })?;
        Ok(holds)
    }

    pub(crate) fn execute_while(
        &mut self,
        condition: &Expression,
        body: &Statement,
        location: Location,
    ) -> Result<ControlFlow, RuntimeError> {
        let scope = self.child_scope();
        self.with_scope(scope, |this| {
            let mut iteration = 0;
            loop {
                iteration += 1;
                if !this.check_condition(condition, NodeType::WhileStatement, iteration)? {
                    return Ok(ControlFlow::Normal);
                }
                this.guard_infinite_loop(location)?;

                match this.execute_loop_body(body)? {
                    LoopBodyResult::Continue => {}
                    LoopBodyResult::Break => return Ok(ControlFlow::Normal),
                    LoopBodyResult::Exit(signal) => return Ok(signal),
                }
            }
        })
    }

    pub(crate) fn execute_for(
        &mut self,
        init: Option<&Statement>,
        condition: Option<&Expression>,
        update: Option<&Expression>,
        body: &Statement,
        location: Location,
    ) -> Result<ControlFlow, RuntimeError> {
        let scope = self.child_scope();
        self.with_scope(scope, |this| {
            if let Some(init) = init {
                this.execute_statement(init)?;
            }

            let mut iteration = 0;
            loop {
                iteration += 1;
                if let Some(condition) = condition {
                    if !this.check_condition(condition, NodeType::ForStatement, iteration)? {
                        return Ok(ControlFlow::Normal);
                    }
                }
                this.guard_infinite_loop(location)?;

                match this.execute_loop_body(body)? {
                    LoopBodyResult::Continue => {}
                    LoopBodyResult::Break => return Ok(ControlFlow::Normal),
                    LoopBodyResult::Exit(signal) => return Ok(signal),
                }

                if let Some(update) = update {
                    this.execute_frame(update.location(), NodeType::ForStatement, |this| {
                        let value = this.evaluate(update)?;
                        Ok(EvaluationResult::ForUpdate { value, iteration })
                    })?;
                }
            }
        })
    }

    pub(crate) fn execute_for_of(
        &mut self,
        variable: &LoopVariable,
        iterable: &Expression,
        body: &Statement,
        location: Location,
    ) -> Result<ControlFlow, RuntimeError> {
        let collection = self.evaluate(iterable)?;
        let items: Vec<Value> = match &collection {
            Value::Array(elements) => elements.borrow().clone(),
            Value::String(text) => text.chars().map(|c| Value::String(c.to_string())).collect(),
            other => {
                return Err(self.error(
                    RuntimeErrorType::ForOfLoopTargetNotIterable,
                    iterable.location(),
                    context([("type", other.type_name())]),
                ))
            }
        };
        let header = Location::between(variable.location, iterable.location());

        if items.is_empty() {
            self.execute_frame(header, NodeType::ForOfStatement, |_| {
                Ok(EvaluationResult::EmptyIteration { collection })
            })?;
            return Ok(ControlFlow::Normal);
        }

        let scope = self.child_scope();
        self.with_scope(scope, |this| {
            for (index, item) in items.into_iter().enumerate() {
                this.guard_infinite_loop(location)?;

                // A fresh scope per element lets `const` loop variables rebind
                let iteration_scope = this.child_scope();
                let outcome = this.with_scope(iteration_scope, |this| {
                    this.execute_frame(header, NodeType::ForOfStatement, |this| {
                        this.define_variable(&variable.name, item.clone(), variable.kind.is_const(), variable.location)?;
                        Ok(EvaluationResult::ForOfIteration {
                            variable: variable.name.clone(),
                            value: item,
                            index,
                        })
                    })?;
                    this.execute_loop_body(body)
                })?;

                match outcome {
                    LoopBodyResult::Continue => {}
                    LoopBodyResult::Break => break,
                    LoopBodyResult::Exit(signal) => return Ok(signal),
                }
            }
            Ok(ControlFlow::Normal)
        })
    }

    pub(crate) fn execute_for_in(
        &mut self,
        variable: &LoopVariable,
        object: &Expression,
        body: &Statement,
        location: Location,
    ) -> Result<ControlFlow, RuntimeError> {
        let target = self.evaluate(object)?;
        let keys: Vec<String> = match &target {
            Value::Dictionary(dictionary) => dictionary.borrow().keys().cloned().collect(),
            Value::Array(elements) => (0..elements.borrow().len()).map(|i| i.to_string()).collect(),
            other => {
                return Err(self.error(
                    RuntimeErrorType::ForInLoopTargetNotObject,
                    object.location(),
                    context([("type", other.type_name())]),
                ))
            }
        };
        let header = Location::between(variable.location, object.location());

        if keys.is_empty() {
            self.execute_frame(header, NodeType::ForInStatement, |_| {
                Ok(EvaluationResult::EmptyIteration { collection: target })
            })?;
            return Ok(ControlFlow::Normal);
        }

        let scope = self.child_scope();
        self.with_scope(scope, |this| {
            for (index, key) in keys.into_iter().enumerate() {
                this.guard_infinite_loop(location)?;

                let iteration_scope = this.child_scope();
                let outcome = this.with_scope(iteration_scope, |this| {
                    this.execute_frame(header, NodeType::ForInStatement, |this| {
                        let value = Value::String(key.clone());
                        this.define_variable(&variable.name, value, variable.kind.is_const(), variable.location)?;
                        Ok(EvaluationResult::ForInIteration {
                            variable: variable.name.clone(),
                            key,
                            index,
                        })
                    })?;
                    this.execute_loop_body(body)
                })?;

                match outcome {
                    LoopBodyResult::Continue => {}
                    LoopBodyResult::Break => break,
                    LoopBodyResult::Exit(signal) => return Ok(signal),
                }
            }
            Ok(ControlFlow::Normal)
        })
    }

    pub(crate) fn execute_repeat(
        &mut self,
        count: Option<&Expression>,
        body: &Statement,
        location: Location,
    ) -> Result<ControlFlow, RuntimeError> {
        let count = match count {
            Some(expression) => Some(self.repeat_count(expression)?),
            None => None,
        };
        let header = match count_location(location) {
            Some(header) => header,
            None => location,
        };

        if count == Some(0) {
            self.execute_frame(header, NodeType::RepeatStatement, |_| {
                Ok(EvaluationResult::RepeatIteration { iteration: 0, count })
            })?;
            return Ok(ControlFlow::Normal);
        }

        let scope = self.child_scope();
        self.with_scope(scope, |this| {
            let mut iteration = 0;
            while count.map_or(true, |count| iteration < count) {
                iteration += 1;
                this.execute_frame(header, NodeType::RepeatStatement, |_| {
                    Ok(EvaluationResult::RepeatIteration { iteration, count })
                })?;
                this.guard_infinite_loop(location)?;

                match this.execute_loop_body(body)? {
                    LoopBodyResult::Continue => {}
                    LoopBodyResult::Break => break,
                    LoopBodyResult::Exit(signal) => return Ok(signal),
                }
            }
            Ok(ControlFlow::Normal)
        })
    }

    /// Evaluate and validate a `repeat` count. Fractions are truncated.
    fn repeat_count(&mut self, expression: &Expression) -> Result<usize, RuntimeError> {
        let value = self.evaluate(expression)?;
        let location = expression.location();
        let count = match value {
            Value::Number(n) if !n.is_nan() => n,
            other => {
                return Err(self.error(
                    RuntimeErrorType::RepeatCountMustBeNumber,
                    location,
                    context([("type", other.type_name())]),
                ))
            }
        };
        if count < 0.0 {
            return Err(self.error(
                RuntimeErrorType::RepeatCountMustBeNonNegative,
                location,
                context([("count", format_number(count))]),
            ));
        }
        let max = self.features.max_total_loop_iterations;
        if count > max as f64 {
            return Err(self.error(
                RuntimeErrorType::RepeatCountTooHigh,
                location,
                context([("count", format_number(count)), ("max", max.to_string())]),
            ));
        }
        Ok(count.trunc() as usize)
    }
}

/// The `repeat` keyword alone, used as the header of each iteration frame.
fn count_location(location: Location) -> Option<Location> {
    let keyword_len = "repeat".len();
    if location.abs_end < location.abs_start + keyword_len {
        return None;
    }
    Some(Location::new(
        location.line,
        location.col_start,
        location.col_start + keyword_len,
        location.abs_start,
        location.abs_start + keyword_len,
    ))
}
