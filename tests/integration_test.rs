// Integration tests for whole programs: frames, logs and errors

use pretty_assertions::assert_eq;
use tracejs::parser::ast::NodeType;
use tracejs::snapshot::{EvaluationResult, FrameStatus};
use tracejs::{compile, interpret, EvaluationContext, LanguageFeatures, RuntimeErrorType, Value};

fn run(source: &str) -> tracejs::InterpretResult {
    tracejs::init_test_logging();
    interpret(source, &EvaluationContext::default())
}

fn run_with(features: LanguageFeatures, source: &str) -> tracejs::InterpretResult {
    tracejs::init_test_logging();
    interpret(source, &EvaluationContext::default().with_language_features(features))
}

fn last_error(result: &tracejs::InterpretResult) -> Option<RuntimeErrorType> {
    result.frames.last()?.error.as_ref().map(|e| e.error_type)
}

const PROGRAM: &str = r#"
let total = 0;
const items = [3, 4, 5];
for (const item of items) {
  total = total + item;
}
function double(n) {
  return n * 2;
}
let result = double(total);
console.log(`result is ${result}`);
"#;

#[test]
fn test_runs_are_deterministic() {
    let first = run(PROGRAM);
    let second = run(PROGRAM);
    assert!(first.success);
    assert_eq!(first.frames, second.frames);
    assert_eq!(first.log_lines, second.log_lines);
}

#[test]
fn test_frame_times_increase_by_one() {
    let result = run(PROGRAM);
    for (i, frame) in result.frames.iter().enumerate() {
        assert_eq!(frame.time, i);
        assert_eq!(frame.time_in_ms, i);
    }
    assert_eq!(result.log_lines.len(), 1);
    assert_eq!(result.log_lines[0].output, "result is 24");
    assert_eq!(result.log_lines[0].time, result.frames.last().unwrap().time);
}

#[test]
fn test_frames_keep_values_from_their_own_time() {
    let result = run("let xs = [1];\nxs.push(2);\nxs[0] = 9;");
    assert!(result.success);
    assert_eq!(result.frames[0].variables["xs"], Value::array(vec![Value::from(1.0)]));
    assert_eq!(
        result.frames[1].variables["xs"],
        Value::array(vec![Value::from(1.0), Value::from(2.0)])
    );
    assert_eq!(
        result.frames[2].variables["xs"],
        Value::array(vec![Value::from(9.0), Value::from(2.0)])
    );
}

#[test]
fn test_const_cannot_change() {
    let result = run("const x = 1;\nx = 2;");
    assert!(!result.success);
    assert!(result.error.is_none());
    assert_eq!(last_error(&result), Some(RuntimeErrorType::AssignmentToConstant));
    assert_eq!(result.frames.last().unwrap().status, FrameStatus::Error);
    assert_eq!(result.frames.last().unwrap().line, 2);
}

#[test]
fn test_arity_reports_real_counts() {
    for (call, got) in [("add(1)", "1"), ("add(1, 2, 3)", "3")] {
        let source = format!("function add(a, b) {{ return a + b; }}\n{};", call);
        let result = run(&source);
        let error = result.frames.last().unwrap().error.clone().unwrap();
        assert_eq!(error.error_type, RuntimeErrorType::InvalidNumberOfArguments);
        assert_eq!(error.context["expected"], "2");
        assert_eq!(error.context["got"], got);
    }
}

#[test]
fn test_infinite_loop_is_stopped() {
    let features = LanguageFeatures {
        max_total_loop_iterations: 1000,
        ..LanguageFeatures::default()
    };
    let result = run_with(features, "while (true) {}");
    assert!(!result.success);
    assert_eq!(last_error(&result), Some(RuntimeErrorType::MaxIterationsReached));
    let checks = result
        .frames
        .iter()
        .filter(|f| matches!(f.result, Some(EvaluationResult::WhileCondition { .. })))
        .count();
    assert_eq!(checks, 1001);
}

#[test]
fn test_empty_for_of_records_one_frame() {
    let result = run("for (const x of []) { console.log(x); }");
    assert!(result.success);
    assert_eq!(result.frames.len(), 1);
    assert_eq!(result.frames[0].node, NodeType::ForOfStatement);
    assert!(result.log_lines.is_empty());
}

#[test]
fn test_closures_capture_each_call() {
    let result = run(
        "function make(n){ return function(){ return n; }; }\nlet f = make(5);\nlet g = make(6);\nf();\ng();",
    );
    assert!(result.success);
    let values: Vec<Value> = result
        .frames
        .iter()
        .filter(|f| f.node == NodeType::ExpressionStatement)
        .filter_map(|f| f.result.as_ref().and_then(|r| r.value().cloned()))
        .collect();
    assert_eq!(values, vec![Value::from(5.0), Value::from(6.0)]);
}

#[test]
fn test_console_log_makes_one_line_and_one_frame() {
    let result = run("console.log(\"a\", 1, true);");
    assert!(result.success);
    assert_eq!(result.frames.len(), 1);
    assert_eq!(result.frames[0].status, FrameStatus::Success);
    assert_eq!(result.log_lines.len(), 1);
    assert_eq!(result.log_lines[0].output, "a 1 true");
}

#[test]
fn test_compile_success_implies_no_interpret_error() {
    let ctx = EvaluationContext::default();
    for source in [PROGRAM, "let x = y;", "while (true) {}", "break;", "let s = \"abc\";\ns.nope();"] {
        assert!(compile(source, &ctx).success, "{}", source);
        assert!(interpret(source, &ctx).error.is_none(), "{}", source);
    }
}

#[test]
fn test_compile_errors_produce_no_frames() {
    let result = run("let x = \"unterminated;");
    assert!(!result.success);
    assert!(result.frames.is_empty());
    assert_eq!(result.error.unwrap().type_name(), "MissingDoubleQuoteToTerminateString");
}

#[test]
fn test_signals_outside_their_boundary() {
    let result = run("let x = 1;\nbreak;");
    assert_eq!(result.frames.len(), 2);
    assert_eq!(last_error(&result), Some(RuntimeErrorType::BreakOutsideLoop));

    let result = run("return 5;");
    assert_eq!(result.frames.len(), 1);
    assert_eq!(last_error(&result), Some(RuntimeErrorType::ReturnOutsideFunction));

    let result = run("function f() { continue; }\nwhile (true) { f(); }");
    assert_eq!(last_error(&result), Some(RuntimeErrorType::ContinueOutsideLoop));
}

#[test]
fn test_scopes_end_with_their_block() {
    let result = run("if (true) { let inner = 1; }\nlet after = inner;");
    assert_eq!(last_error(&result), Some(RuntimeErrorType::VariableNotDeclared));
    assert!(!result.frames.last().unwrap().variables.contains_key("inner"));
}

#[test]
fn test_for_in_and_repeat() {
    let result = run(
        "let person = {name: \"Ada\", age: 36};\nlet keys = \"\";\nfor (const key in person) { keys = keys + key + \",\"; }\nlet n = 0;\nrepeat (4) { n++; }",
    );
    assert!(result.success);
    let last = result.frames.last().unwrap();
    assert_eq!(last.variables["keys"], Value::from("name,age,"));
    assert_eq!(last.variables["n"], Value::from(4.0));
}

#[test]
fn test_nested_loops_with_break_and_continue() {
    let result = run(
        "let hits = 0;\nfor (let i = 0; i < 3; i++) {\n  for (let j = 0; j < 3; j++) {\n    if (j === 1) { continue; }\n    if (j === 2) { break; }\n    hits++;\n  }\n}",
    );
    assert!(result.success);
    assert_eq!(result.frames.last().unwrap().variables["hits"], Value::from(3.0));
}

#[test]
fn test_self_containing_values_are_recorded() {
    let source = "let a = [];\na.push(a);\nconsole.log(a);\nlet d = {};\nd.self = d;\nconsole.log(d);";
    let result = run(source);
    assert!(result.success);
    assert_eq!(result.log_lines[0].output, "[ [Circular] ]");
    assert_eq!(result.log_lines[1].output, "{ self: [Circular] }");
    assert_eq!(run(source).frames, result.frames);
}

#[test]
fn test_oversized_values_are_runtime_errors() {
    let result = run("let xs = [];\nxs[1e18] = 1;");
    assert_eq!(result.frames.len(), 2);
    assert_eq!(last_error(&result), Some(RuntimeErrorType::IndexOutOfRange));

    let result = run("let s = \"ab\".repeat(1e18);");
    assert_eq!(last_error(&result), Some(RuntimeErrorType::ArgumentError));

    let result = run("let s = \"ab\";\nwhile (true) {\n  s = s + s;\n}");
    assert_eq!(last_error(&result), Some(RuntimeErrorType::StringTooLong));

    let result = run("let s = \"ab\";\nrepeat (40) {\n  s = `${s}${s}`;\n}");
    assert_eq!(last_error(&result), Some(RuntimeErrorType::StringTooLong));
}

#[test]
fn test_update_targets_are_evaluated_once() {
    let result = run(
        "let i = 0;\nlet xs = [10, 20, 30];\nxs[i++]++;\nlet d = {a: 1};\nfunction key() {\n  console.log(\"key\");\n  return \"a\";\n}\nd[key()]++;",
    );
    assert!(result.success);
    let last = result.frames.last().unwrap();
    assert_eq!(last.variables["i"], Value::from(1.0));
    assert_eq!(last.variables["xs"].to_display_string(), "[ 11, 20, 30 ]");
    assert_eq!(last.variables["d"].to_display_string(), "{ a: 2 }");
    assert_eq!(result.log_lines.len(), 1);
}
