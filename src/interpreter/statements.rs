//! Statement execution
//!
//! Dispatches on [`Statement`] and handles the non-loop forms: expression
//! statements, declarations, blocks and `if`. Loops live in `loops.rs`,
//! `return`/`break`/`continue` in `jumps.rs`.

use crate::interpreter::engine::{ControlFlow, Executor};
use crate::interpreter::errors::RuntimeError;
use crate::memory::callable::Callable;
use crate::memory::environment::Environment;
use crate::memory::value::Value;
use crate::parser::ast::{DeclarationKind, Expression, FunctionDeclaration, Location, NodeType, Statement};
use crate::snapshot::EvaluationResult;
use std::cell::RefCell;
use std::rc::Rc;

impl<'a> Executor<'a> {
    pub(crate) fn execute_statement(&mut self, statement: &Statement) -> Result<ControlFlow, RuntimeError> {
        // The empty statement `;` parses to an empty block and is never gated
        if !matches!(statement, Statement::Block { .. }) {
            self.assert_node_allowed(statement.node_type(), statement.location())?;
        }

        match statement {
            Statement::Expression { expression, location } => {
                self.execute_expression_statement(expression, *location)?;
                Ok(ControlFlow::Normal)
            }
            Statement::VariableDeclaration {
                name,
                kind,
                initializer,
                name_location,
                location,
            } => {
                self.execute_variable_declaration(name, *kind, initializer.as_ref(), *name_location, *location)?;
                Ok(ControlFlow::Normal)
            }
            Statement::FunctionDeclaration(declaration) => {
                self.execute_function_declaration(declaration)?;
                Ok(ControlFlow::Normal)
            }
            Statement::Block { statements, .. } => {
                let scope = self.child_scope();
                self.execute_block(statements, scope)
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.execute_if(condition, then_branch, else_branch.as_deref()),
            Statement::While {
                condition,
                body,
                location,
            } => self.execute_while(condition, body, *location),
            Statement::For {
                init,
                condition,
                update,
                body,
                location,
            } => self.execute_for(init.as_deref(), condition.as_ref(), update.as_ref(), body, *location),
            Statement::ForOf {
                variable,
                iterable,
                body,
                location,
            } => self.execute_for_of(variable, iterable, body, *location),
            Statement::ForIn {
                variable,
                object,
                body,
                location,
            } => self.execute_for_in(variable, object, body, *location),
            Statement::Repeat { count, body, location } => self.execute_repeat(count.as_ref(), body, *location),
            Statement::Return { value, location } => self.execute_return(value.as_ref(), *location),
            Statement::Break { location } => self.execute_break(*location),
            Statement::Continue { location } => self.execute_continue(*location),
        }
    }

    /// Run `statements` in `scope`, stopping at the first control-flow signal.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Statement],
        scope: Rc<RefCell<Environment>>,
    ) -> Result<ControlFlow, RuntimeError> {
        self.with_scope(scope, |this| {
            for statement in statements {
                match this.execute_statement(statement)? {
                    ControlFlow::Normal => {}
                    signal => return Ok(signal),
                }
            }
            Ok(ControlFlow::Normal)
        })
    }

    fn execute_expression_statement(&mut self, expression: &Expression, location: Location) -> Result<(), RuntimeError> {
        self.execute_frame(location, NodeType::ExpressionStatement, |this| {
            let (value, detail) = this.evaluate_with_detail(expression)?;
            Ok(EvaluationResult::Expression { value, detail })
        })?;
        Ok(())
    }

    pub(crate) fn execute_variable_declaration(
        &mut self,
        name: &str,
        kind: DeclarationKind,
        initializer: Option<&Expression>,
        name_location: Location,
        location: Location,
    ) -> Result<(), RuntimeError> {
        self.execute_frame(location, NodeType::VariableDeclaration, |this| {
            let value = match initializer {
                Some(expression) => this.evaluate(expression)?,
                None => Value::Undefined,
            };
            this.define_variable(name, value.clone(), kind.is_const(), name_location)?;
            Ok(EvaluationResult::VariableDeclaration {
                name: name.to_string(),
                value,
                is_const: kind.is_const(),
            })
        })?;
        Ok(())
    }

    /// Bind the function in the current scope; no frame is recorded.
    fn execute_function_declaration(&mut self, declaration: &Rc<FunctionDeclaration>) -> Result<(), RuntimeError> {
        let function = Value::function(Callable::UserDefined {
            declaration: Rc::clone(declaration),
            closure: Rc::clone(&self.environment),
        });
        self.define_variable(&declaration.name, function, false, declaration.location)
    }

    fn execute_if(
        &mut self,
        condition: &Expression,
        then_branch: &Statement,
        else_branch: Option<&Statement>,
    ) -> Result<ControlFlow, RuntimeError> {
        let mut taken = false;
        self.execute_frame(condition.location(), NodeType::IfStatement, |this| {
            let value = this.evaluate(condition)?;
            taken = this.verify_boolean(&value, condition.location())?;
            Ok(EvaluationResult::IfCondition { value })
        })?;

        if taken {
            self.execute_statement(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute_statement(else_branch)
        } else {
            Ok(ControlFlow::Normal)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::features::LanguageFeatures;
    use crate::interpreter::engine::Executor;
    use crate::interpreter::errors::RuntimeErrorType;
    use crate::memory::value::Value;
    use crate::parser::parse_program;
    use crate::snapshot::{EvaluationResult, FrameRecorder};
    use crate::translator::Translator;

    fn run_with(source: &str, features: &LanguageFeatures) -> FrameRecorder {
        let translator = Translator::english();
        let program = parse_program(source, features, &translator).unwrap();
        let mut executor = Executor::new(source, features, &translator, &[]);
        executor.execute_program(&program);
        executor.into_recorder()
    }

    fn run(source: &str) -> FrameRecorder {
        run_with(source, &LanguageFeatures::default())
    }

    fn last_error(recorder: &FrameRecorder) -> Option<RuntimeErrorType> {
        recorder.frames().last()?.error.as_ref().map(|e| e.error_type)
    }

    #[test]
    fn test_declaration_frame_carries_value() {
        let recorder = run("const name = \"Ada\";");
        let frame = &recorder.frames()[0];
        assert_eq!(frame.code, "const name = \"Ada\"");
        assert_eq!(
            frame.result,
            Some(EvaluationResult::VariableDeclaration {
                name: "name".to_string(),
                value: Value::from("Ada"),
                is_const: true,
            })
        );
    }

    #[test]
    fn test_let_without_initializer_is_undefined() {
        let features = LanguageFeatures {
            require_variable_instantiation: false,
            ..LanguageFeatures::default()
        };
        let recorder = run_with("let x;", &features);
        assert_eq!(recorder.frames()[0].variables["x"], Value::Undefined);
    }

    #[test]
    fn test_redeclare_and_shadowing_errors() {
        assert_eq!(
            last_error(&run("let x = 1;\nlet x = 2;")),
            Some(RuntimeErrorType::VariableAlreadyDeclared)
        );
        assert_eq!(
            last_error(&run("let x = 1;\n{ let x = 2; }")),
            Some(RuntimeErrorType::ShadowingDisabled)
        );
        let features = LanguageFeatures {
            allow_shadowing: true,
            ..LanguageFeatures::default()
        };
        assert_eq!(last_error(&run_with("let x = 1;\n{ let x = 2; }", &features)), None);
    }

    #[test]
    fn test_block_scope_ends_with_block() {
        let recorder = run("let a = 1;\n{ let b = 2; }\nlet c = 3;");
        let last = recorder.frames().last().unwrap();
        assert!(last.variables.contains_key("a"));
        assert!(!last.variables.contains_key("b"));
    }

    #[test]
    fn test_if_takes_one_branch() {
        let recorder = run("let x = 0;\nif (x > 1) { x = 1; } else if (x === 0) { x = 2; } else { x = 3; }");
        let last = recorder.frames().last().unwrap();
        assert_eq!(last.variables["x"], Value::from(2.0));
        // declaration, two conditions, one assignment
        assert_eq!(recorder.frames().len(), 4);
    }

    #[test]
    fn test_if_condition_must_be_boolean() {
        assert_eq!(
            last_error(&run("let x = 1;\nif (x) { }")),
            Some(RuntimeErrorType::TruthinessDisabled)
        );
        let features = LanguageFeatures {
            allow_truthiness: true,
            ..LanguageFeatures::default()
        };
        assert_eq!(last_error(&run_with("let x = 1;\nif (x) { }", &features)), None);
    }
}
