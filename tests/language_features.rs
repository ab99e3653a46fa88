// Exercise configuration: node allow-lists, token lists, stdlib gating and host functions

use rustc_hash::FxHashMap;
use tracejs::parser::ast::NodeType;
use tracejs::{
    compile, evaluate_function, interpret, Arity, EvaluationContext, HostError, LanguageFeatures, RuntimeErrorType,
    StdlibAllowList, StdlibType, Value,
};

fn context_with(features: LanguageFeatures) -> EvaluationContext {
    tracejs::init_test_logging();
    EvaluationContext::default().with_language_features(features)
}

#[test]
fn test_allowed_nodes_reject_other_statements() {
    let context = context_with(LanguageFeatures {
        allowed_nodes: Some(vec![NodeType::VariableDeclaration]),
        allow_truthiness: true,
        ..LanguageFeatures::default()
    });

    assert!(compile("let x = 1;\nlet y = x;", &context).success);

    let result = compile("let x = true;\nif (x) {}", &context);
    assert!(!result.success);
    let error = result.error.unwrap();
    assert_eq!(error.type_name(), "IfStatementNotAllowed");
    assert_eq!(error.location().line, 2);
}

#[test]
fn test_features_load_from_exercise_json() {
    let features: LanguageFeatures = serde_json::from_str(
        r#"{ "allowTruthiness": true, "excludeList": ["FOR"], "maxTotalLoopIterations": 5 }"#,
    )
    .unwrap();
    assert!(features.allow_truthiness);
    assert!(!features.allow_type_coercion);
    assert_eq!(features.max_total_loop_iterations, 5);

    let context = context_with(features);
    let result = compile("for (let i = 0; i < 2; i++) {}", &context);
    assert_eq!(result.error.unwrap().type_name(), "DisabledFeatureExcludeListViolation");
    assert!(compile("let i = 0;\nwhile (i < 2) { i++; }", &context).success);
}

#[test]
fn test_stdlib_allow_list_gates_methods() {
    let mut allowed = FxHashMap::default();
    allowed.insert(
        StdlibType::String,
        StdlibAllowList {
            properties: vec!["length".to_string()],
            methods: vec!["toUpperCase".to_string()],
        },
    );
    let context = context_with(LanguageFeatures {
        allowed_stdlib: Some(allowed),
        ..LanguageFeatures::default()
    });

    let result = interpret("let s = \"hi\".toUpperCase();\nlet n = s.length;", &context);
    assert!(result.success);
    assert_eq!(result.frames.last().unwrap().variables["s"], Value::from("HI"));

    let result = interpret("let s = \"hi\".toLowerCase();", &context);
    let error = result.frames.last().unwrap().error.clone().unwrap();
    assert_eq!(error.error_type, RuntimeErrorType::MethodNotYetAvailable);

    let result = interpret("let xs = [1];\nxs.push(2);", &context);
    assert!(result.success);
}

#[test]
fn test_unknown_members_are_reported() {
    let context = context_with(LanguageFeatures::default());
    let result = interpret("let s = \"hi\".shout();", &context);
    let error = result.frames.last().unwrap().error.clone().unwrap();
    assert_eq!(error.error_type, RuntimeErrorType::PropertyNotFound);
}

#[test]
fn test_evaluate_function_after_the_top_level() {
    let context = context_with(LanguageFeatures::default());
    let source = "let calls = 0;\nfunction area(w, h) {\n  calls++;\n  return w * h;\n}";
    let result = evaluate_function(source, &context, "area", vec![Value::from(3.0), Value::from(4.0)]);
    assert!(result.success);
    assert_eq!(result.value, Some(Value::from(12.0)));
    assert_eq!(result.frames.last().unwrap().variables["calls"], Value::from(1.0));

    let result = evaluate_function(source, &context, "perimeter", vec![]);
    assert!(!result.success);
    assert_eq!(result.value, None);
    let error = result.frames.last().unwrap().error.clone().unwrap();
    assert_eq!(error.error_type, RuntimeErrorType::FunctionNotFound);
}

#[test]
fn test_host_functions_are_callable_and_report_errors() {
    let context = context_with(LanguageFeatures::default())
        .with_external_function("move", Arity::Exact(1), "Moves the robot", |ctx, args| {
            match args[0].as_number() {
                Some(steps) if steps >= 0.0 => {
                    ctx.log(format!("moved {}", steps));
                    Ok(Value::Undefined)
                }
                _ => Err(HostError::Logic("The robot cannot move backwards".to_string())),
            }
        });

    let result = interpret("move(2);", &context);
    assert!(result.success);
    assert_eq!(result.log_lines[0].output, "moved 2");

    let result = interpret("move(-1);", &context);
    let error = result.frames.last().unwrap().error.clone().unwrap();
    assert_eq!(error.error_type, RuntimeErrorType::LogicErrorInExecution);
    assert_eq!(error.message, "The robot cannot move backwards");
}
