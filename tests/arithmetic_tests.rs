// Operators, coercion rules and the feature flags that relax them

use tracejs::{interpret, EvaluationContext, LanguageFeatures, RuntimeErrorType, Value};

fn eval_with(features: &LanguageFeatures, expression: &str) -> Result<Value, RuntimeErrorType> {
    let source = format!("let result = {};", expression);
    let context = EvaluationContext::default().with_language_features(features.clone());
    let result = interpret(&source, &context);
    assert!(result.error.is_none(), "{} did not compile", source);
    let frame = result.frames.last().expect("at least one frame");
    match &frame.error {
        Some(error) => Err(error.error_type),
        None => Ok(frame.variables["result"].clone()),
    }
}

fn eval(expression: &str) -> Result<Value, RuntimeErrorType> {
    eval_with(&LanguageFeatures::default(), expression)
}

fn relaxed() -> LanguageFeatures {
    LanguageFeatures {
        allow_type_coercion: true,
        allow_truthiness: true,
        enforce_strict_equality: false,
        ..LanguageFeatures::default()
    }
}

#[test]
fn test_number_arithmetic() {
    assert_eq!(eval("1 + 2 * 3"), Ok(Value::from(7.0)));
    assert_eq!(eval("(1 + 2) * 3"), Ok(Value::from(9.0)));
    assert_eq!(eval("7 % 3"), Ok(Value::from(1.0)));
    assert_eq!(eval("2 ** 3 ** 2"), Ok(Value::from(512.0)));
    assert_eq!(eval("1 / 0"), Ok(Value::from(f64::INFINITY)));
    assert_eq!(eval("0.1 + 0.2").map(|v| v.to_display_string()), Ok("0.30000000000000004".to_string()));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("\"a\" + \"b\""), Ok(Value::from("ab")));
    assert_eq!(eval("\"a\" + 1"), Err(RuntimeErrorType::TypeCoercionNotAllowed));
    assert_eq!(eval_with(&relaxed(), "\"a\" + 1"), Ok(Value::from("a1")));
    assert_eq!(eval_with(&relaxed(), "1 + [2, 3]"), Ok(Value::from("1[ 2, 3 ]")));
}

#[test]
fn test_arithmetic_needs_numbers() {
    assert_eq!(eval("\"6\" * 2"), Err(RuntimeErrorType::TypeCoercionNotAllowed));
    assert_eq!(eval_with(&relaxed(), "\"6\" * 2"), Ok(Value::from(12.0)));
    assert_eq!(eval("true - 1"), Err(RuntimeErrorType::TypeCoercionNotAllowed));
}

#[test]
fn test_comparisons() {
    assert_eq!(eval("2 < 3"), Ok(Value::from(true)));
    assert_eq!(eval("3 <= 3"), Ok(Value::from(true)));
    assert_eq!(eval("\"a\" < \"b\""), Err(RuntimeErrorType::ComparisonRequiresNumber));
}

#[test]
fn test_equality() {
    assert_eq!(eval("1 === 1"), Ok(Value::from(true)));
    assert_eq!(eval("\"1\" === 1"), Ok(Value::from(false)));
    assert_eq!(eval("[1] === [1]"), Ok(Value::from(false)));
    assert_eq!(eval("null !== undefined"), Ok(Value::from(true)));
    assert_eq!(eval("1 == 1"), Err(RuntimeErrorType::StrictEqualityRequired));
    assert_eq!(eval_with(&relaxed(), "\"1\" == 1"), Ok(Value::from(true)));
    assert_eq!(eval_with(&relaxed(), "null == undefined"), Ok(Value::from(true)));
}

#[test]
fn test_logical_operators() {
    assert_eq!(eval("true && false"), Ok(Value::from(false)));
    assert_eq!(eval("false || true"), Ok(Value::from(true)));
    assert_eq!(eval("1 && true"), Err(RuntimeErrorType::TruthinessDisabled));
    assert_eq!(eval_with(&relaxed(), "0 || \"fallback\""), Ok(Value::from("fallback")));
    assert_eq!(eval_with(&relaxed(), "\"\" && missing"), Ok(Value::from("")));
}

#[test]
fn test_short_circuit_skips_the_right_side() {
    assert_eq!(eval("false && missing"), Ok(Value::from(false)));
    assert_eq!(eval("true || missing"), Ok(Value::from(true)));
    assert_eq!(eval("true && missing"), Err(RuntimeErrorType::VariableNotDeclared));
}

#[test]
fn test_unary_operators() {
    assert_eq!(eval("-(4)"), Ok(Value::from(-4.0)));
    assert_eq!(eval("!true"), Ok(Value::from(false)));
    assert_eq!(eval("!1"), Err(RuntimeErrorType::TruthinessDisabled));
    assert_eq!(eval_with(&relaxed(), "!0"), Ok(Value::from(true)));
    assert_eq!(eval("-\"3\""), Err(RuntimeErrorType::InvalidUnaryExpression));
}

#[test]
fn test_in_operator() {
    assert_eq!(eval("\"a\" in {a: 1}"), Ok(Value::from(true)));
    assert_eq!(eval("\"b\" in {a: 1}"), Ok(Value::from(false)));
    assert_eq!(eval("\"a\" in [1]"), Err(RuntimeErrorType::InWithArrayNotAllowed));
    assert_eq!(eval("\"a\" in 5"), Err(RuntimeErrorType::InOperatorRequiresObject));
    assert_eq!(eval("1 in {a: 1}"), Err(RuntimeErrorType::InOperatorRequiresStringKey));
}

#[test]
fn test_conditions_must_be_boolean() {
    let result = interpret("let n = 1;\nif (n) { n = 2; }", &EvaluationContext::default());
    let error = result.frames.last().unwrap().error.clone().unwrap();
    assert_eq!(error.error_type, RuntimeErrorType::TruthinessDisabled);

    let context = EvaluationContext::default().with_language_features(relaxed());
    let result = interpret("let n = 1;\nif (n) { n = 2; }", &context);
    assert!(result.success);
    assert_eq!(result.frames.last().unwrap().variables["n"], Value::from(2.0));
}
