//! `return`, `break` and `continue`
//!
//! Each records its own frame and hands a [`ControlFlow`] signal back to the
//! statement that encloses it. Loops and calls decide what the signal means;
//! see `Executor::reject_escaped_signal` for signals nobody catches.

use crate::interpreter::engine::{ControlFlow, Executor};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{Expression, Location, NodeType};
use crate::snapshot::EvaluationResult;

impl<'a> Executor<'a> {
    pub(crate) fn execute_return(
        &mut self,
        value: Option<&Expression>,
        location: Location,
    ) -> Result<ControlFlow, RuntimeError> {
        let result = self.execute_frame(location, NodeType::ReturnStatement, |this| {
            let value = match value {
                Some(expression) => Some(this.evaluate(expression)?),
                None => None,
            };
            Ok(EvaluationResult::Return { value })
        })?;

        let value = match result {
            EvaluationResult::Return { value: Some(value) } => value,
            _ => Value::Undefined,
        };
        Ok(ControlFlow::Return(value, location))
    }

    pub(crate) fn execute_break(&mut self, location: Location) -> Result<ControlFlow, RuntimeError> {
        self.execute_frame(location, NodeType::BreakStatement, |_| Ok(EvaluationResult::Break))?;
        Ok(ControlFlow::Break(location))
    }

    pub(crate) fn execute_continue(&mut self, location: Location) -> Result<ControlFlow, RuntimeError> {
        self.execute_frame(location, NodeType::ContinueStatement, |_| Ok(EvaluationResult::Continue))?;
        Ok(ControlFlow::Continue(location))
    }
}

#[cfg(test)]
mod tests {
    use crate::features::LanguageFeatures;
    use crate::interpreter::engine::Executor;
    use crate::interpreter::errors::RuntimeErrorType;
    use crate::parser::parse_program;
    use crate::snapshot::{EvaluationResult, FrameStatus};
    use crate::translator::Translator;

    fn last_frame_error(source: &str) -> Option<RuntimeErrorType> {
        let translator = Translator::english();
        let features = LanguageFeatures::default();
        let program = parse_program(source, &features, &translator).unwrap();
        let mut executor = Executor::new(source, &features, &translator, &[]);
        executor.execute_program(&program);
        let recorder = executor.into_recorder();
        recorder.frames().last()?.error.as_ref().map(|e| e.error_type)
    }

    #[test]
    fn test_signals_outside_their_boundary() {
        assert_eq!(last_frame_error("return 1;"), Some(RuntimeErrorType::ReturnOutsideFunction));
        assert_eq!(last_frame_error("continue;"), Some(RuntimeErrorType::ContinueOutsideLoop));
        assert_eq!(
            last_frame_error("if (true) { break; }"),
            Some(RuntimeErrorType::BreakOutsideLoop)
        );
    }

    #[test]
    fn test_break_inside_a_function_does_not_reach_the_callers_loop() {
        let source = "function stop() { break; }\nwhile (true) { stop(); }";
        assert_eq!(last_frame_error(source), Some(RuntimeErrorType::BreakOutsideLoop));
    }

    #[test]
    fn test_return_frame_holds_value() {
        let source = "function two() { return 2; }\nlet x = two();";
        let translator = Translator::english();
        let features = LanguageFeatures::default();
        let program = parse_program(source, &features, &translator).unwrap();
        let mut executor = Executor::new(source, &features, &translator, &[]);
        assert!(executor.execute_program(&program));
        let frames = executor.recorder().frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].node.to_string(), "ReturnStatement");
        assert!(matches!(
            &frames[0].result,
            Some(EvaluationResult::Return { value: Some(v) }) if v.as_number() == Some(2.0)
        ));
        assert!(frames.iter().all(|f| f.status == FrameStatus::Success));
    }
}
