//! Frame narratives
//!
//! Turns a recorded [`Frame`] into one sentence for the student, using the
//! `frame.*` templates of a [`Translator`]. Describers only read frames; they
//! never look at the AST or the executor.

use crate::memory::value::{format_number, Value};
use crate::snapshot::{EvaluationResult, ExpressionDetail, Frame};
use crate::translator::{context, ErrorContext, Translator};

pub fn describe_frame(frame: &Frame, translator: &Translator) -> String {
    if let Some(error) = &frame.error {
        return translator.translate("frame.error", &context([("message", &error.message)]));
    }
    match &frame.result {
        Some(result) => {
            let (key, ctx) = describe_result(result, &frame.code);
            translator.translate(key, &ctx)
        }
        None => frame.code.clone(),
    }
}

fn describe_result(result: &EvaluationResult, code: &str) -> (&'static str, ErrorContext) {
    match result {
        EvaluationResult::Expression { value, detail } => describe_expression(value, detail, code),
        EvaluationResult::VariableDeclaration { name, value, is_const } => {
            let key = if *is_const { "frame.declareConstant" } else { "frame.declareVariable" };
            (key, context([("name", name.clone()), ("value", value.inspect())]))
        }
        EvaluationResult::IfCondition { value } => {
            let key = match value {
                Value::Boolean(true) => "frame.ifTrue",
                Value::Boolean(false) => "frame.ifFalse",
                _ => "frame.ifValue",
            };
            (key, context([("code", code.to_string()), ("value", value.inspect())]))
        }
        EvaluationResult::WhileCondition { value, iteration } => (
            "frame.whileCondition",
            context([
                ("code", code.to_string()),
                ("value", value.inspect()),
                ("iteration", iteration.to_string()),
            ]),
        ),
        EvaluationResult::ForCondition { value, iteration } => (
            "frame.forCondition",
            context([
                ("code", code.to_string()),
                ("value", value.inspect()),
                ("iteration", iteration.to_string()),
            ]),
        ),
        EvaluationResult::ForUpdate { value, iteration } => (
            "frame.forUpdate",
            context([
                ("code", code.to_string()),
                ("value", value.inspect()),
                ("iteration", iteration.to_string()),
            ]),
        ),
        EvaluationResult::ForOfIteration { variable, value, index } => (
            "frame.forOf",
            context([
                ("variable", variable.clone()),
                ("value", value.inspect()),
                ("iteration", (index + 1).to_string()),
            ]),
        ),
        EvaluationResult::ForInIteration { variable, key, index } => (
            "frame.forIn",
            context([
                ("variable", variable.clone()),
                ("key", key.clone()),
                ("iteration", (index + 1).to_string()),
            ]),
        ),
        EvaluationResult::EmptyIteration { collection } => {
            ("frame.emptyIteration", context([("collection", collection.inspect())]))
        }
        EvaluationResult::RepeatIteration { iteration, count } => match count {
            Some(0) => ("frame.repeatNone", ErrorContext::new()),
            Some(count) => (
                "frame.repeat",
                context([("iteration", iteration.to_string()), ("count", count.to_string())]),
            ),
            None => ("frame.repeatForever", context([("iteration", iteration.to_string())])),
        },
        EvaluationResult::Return { value: Some(value) } => ("frame.return", context([("value", value.inspect())])),
        EvaluationResult::Return { value: None } => ("frame.returnNothing", ErrorContext::new()),
        EvaluationResult::Break => ("frame.break", ErrorContext::new()),
        EvaluationResult::Continue => ("frame.continue", ErrorContext::new()),
    }
}

fn describe_expression(value: &Value, detail: &ExpressionDetail, code: &str) -> (&'static str, ErrorContext) {
    match detail {
        ExpressionDetail::Call { callee, args } => {
            let args = args.iter().map(Value::inspect).collect::<Vec<_>>().join(", ");
            if matches!(value, Value::Undefined) {
                ("frame.callWithoutResult", context([("callee", callee.clone()), ("args", args)]))
            } else {
                (
                    "frame.call",
                    context([("callee", callee.clone()), ("args", args), ("value", value.inspect())]),
                )
            }
        }
        ExpressionDetail::Assignment { target } => (
            "frame.assignment",
            context([("target", target.clone()), ("value", value.inspect())]),
        ),
        ExpressionDetail::Update {
            target,
            operator,
            previous,
        } => {
            let previous = previous.as_number().unwrap_or(f64::NAN);
            let next = if *operator == "++" { previous + 1.0 } else { previous - 1.0 };
            (
                "frame.update",
                context([
                    ("target", target.clone()),
                    ("operator", operator.to_string()),
                    ("previous", format_number(previous)),
                    ("next", format_number(next)),
                ]),
            )
        }
        ExpressionDetail::Binary { operator } => (
            "frame.binary",
            context([
                ("code", code.to_string()),
                ("operator", operator.to_string()),
                ("value", value.inspect()),
            ]),
        ),
        ExpressionDetail::Other => (
            "frame.expression",
            context([("code", code.to_string()), ("value", value.inspect())]),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::api::{interpret, EvaluationContext};
    use pretty_assertions::assert_eq;

    fn narrate(source: &str) -> Vec<String> {
        let translator = Translator::english();
        interpret(source, &EvaluationContext::default())
            .frames
            .iter()
            .map(|frame| describe_frame(frame, &translator))
            .collect()
    }

    #[test]
    fn test_describes_each_step() {
        let lines = narrate("let x = 1;\nx++;\nif (x > 1) { console.log(\"big\"); }");
        assert_eq!(
            lines,
            vec![
                "Created a variable called x with the value 1.",
                "Used ++ on x, changing it from 1 to 2.",
                "Checked x > 1. It was true, so the if block runs.",
                "Called console.log('big').",
            ]
        );
    }

    #[test]
    fn test_describes_loops_and_errors() {
        let lines = narrate("for (const c of \"ab\") { }\nrepeat (0) { }\nlet y = z;");
        assert_eq!(lines[0], "Iteration 1: c is now 'a'.");
        assert_eq!(lines[1], "Iteration 2: c is now 'b'.");
        assert_eq!(lines[2], "The repeat count was 0, so the body was skipped.");
        assert!(lines[3].starts_with("This step stopped the program: "));
    }

    #[test]
    fn test_custom_templates_override_english() {
        let translator = Translator::english().with_message("frame.break", "Stop!");
        let result = interpret("while (true) { break; }", &EvaluationContext::default());
        let last = result.frames.last().unwrap();
        assert_eq!(describe_frame(last, &translator), "Stop!");
    }
}
