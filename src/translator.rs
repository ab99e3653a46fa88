//! Error message catalogue
//!
//! Every error carries a stable type plus a structured context; the rendered
//! message is produced here from a dotted key such as
//! `error.runtime.AssignmentToConstant`. Templates interpolate context values
//! with `{{name}}` placeholders.
//!
//! A [`Translator`] is passed explicitly to the scanner, parser and executor.
//! [`default_translator`] is only a convenience for the outermost boundary.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Structured interpolation values attached to an error.
pub type ErrorContext = BTreeMap<String, String>;

/// Build an [`ErrorContext`] from key/value pairs.
pub fn context<K, V, I>(pairs: I) -> ErrorContext
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.to_string()))
        .collect()
}

static DEFAULT_TRANSLATOR: Lazy<Arc<Translator>> = Lazy::new(|| Arc::new(Translator::english()));

/// Shared English catalogue.
pub fn default_translator() -> Arc<Translator> {
    Arc::clone(&DEFAULT_TRANSLATOR)
}

#[derive(Debug, Clone)]
pub struct Translator {
    messages: FxHashMap<String, String>,
}

impl Default for Translator {
    fn default() -> Self {
        Translator::english()
    }
}

impl Translator {
    /// A translator with no templates; every lookup falls back to the key.
    pub fn empty() -> Self {
        Translator {
            messages: FxHashMap::default(),
        }
    }

    /// The built-in English catalogue.
    pub fn english() -> Self {
        let mut translator = Translator::empty();
        for (key, template) in ENGLISH {
            translator.messages.insert((*key).to_string(), (*template).to_string());
        }
        translator
    }

    /// Override or add a single template.
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    /// Render `key` with the given context.
    ///
    /// Unknown keys render as the key itself followed by the context values,
    /// so a missing template never hides the error type.
    pub fn translate(&self, key: &str, context: &ErrorContext) -> String {
        match self.messages.get(key) {
            Some(template) => interpolate(template, context),
            None if context.is_empty() => key.to_string(),
            None => {
                let details: Vec<String> = context.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                format!("{}: {}", key, details.join(": "))
            }
        }
    }
}

fn interpolate(template: &str, context: &ErrorContext) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        output.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let name = after[..close].trim();
                match context.get(name) {
                    Some(value) => output.push_str(value),
                    None => {
                        output.push_str("{{");
                        output.push_str(&after[..close]);
                        output.push_str("}}");
                    }
                }
                rest = &after[close + 2..];
            }
            None => {
                output.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    output.push_str(rest);
    output
}

const ENGLISH: &[(&str, &str)] = &[
    // Scanner / parser
    ("error.syntax.UnknownCharacter", "Unknown character '{{character}}'."),
    ("error.syntax.MissingDoubleQuoteToTerminateString", "This string is missing a closing double quote."),
    ("error.syntax.MissingSingleQuoteToTerminateString", "This string is missing a closing single quote."),
    ("error.syntax.MissingBacktickToTerminateTemplateLiteral", "This template literal is missing a closing backtick."),
    ("error.syntax.UnterminatedComment", "This comment is never closed with */."),
    ("error.syntax.UnimplementedToken", "'{{lexeme}}' isn't available in this version of JavaScript yet."),
    ("error.syntax.PermanentlyExcludedToken", "'{{lexeme}}' is not part of the JavaScript taught here."),
    ("error.syntax.MissingExpression", "Expected an expression here."),
    ("error.syntax.MissingSemicolon", "Expected a semicolon at the end of this statement."),
    ("error.syntax.MultipleStatementsPerLine", "Only one statement is allowed per line."),
    ("error.syntax.MissingIdentifier", "Expected a variable name."),
    ("error.syntax.MissingInitializerInVariableDeclaration", "Variables must be given a value when they are declared."),
    ("error.syntax.MissingInitializerInConstDeclaration", "A const must be given a value when it is declared."),
    ("error.syntax.ConstInForLoopInit", "Use let, not const, to declare the counter of a for loop."),
    ("error.syntax.MissingFunctionName", "Expected a name after 'function'."),
    ("error.syntax.MissingLeftParenthesisAfterFunctionName", "Expected '(' after the function name."),
    ("error.syntax.MissingLeftBraceBeforeFunctionBody", "Expected '{' before the function body."),
    ("error.syntax.NestedFunctionDeclaration", "Functions can only be declared at the top level."),
    ("error.syntax.DuplicateParameterName", "The parameter '{{name}}' is declared twice."),
    ("error.syntax.MissingRightParenthesisAfterParameters", "Expected ')' after the parameter list."),
    ("error.syntax.MissingLeftParenthesisAfterIf", "Expected '(' after 'if'."),
    ("error.syntax.MissingRightParenthesisAfterIfCondition", "Expected ')' after the if condition."),
    ("error.syntax.MissingLeftParenthesisAfterWhile", "Expected '(' after 'while'."),
    ("error.syntax.MissingRightParenthesisAfterWhileCondition", "Expected ')' after the while condition."),
    ("error.syntax.MissingLeftParenthesisAfterFor", "Expected '(' after 'for'."),
    ("error.syntax.MissingRightParenthesisAfterForClauses", "Expected ')' to close the for loop header."),
    ("error.syntax.MissingSemicolonInForLoop", "Expected ';' between the parts of the for loop header."),
    ("error.syntax.MissingOfOrInInForLoop", "Expected 'of' or 'in' after the loop variable."),
    ("error.syntax.MissingLeftParenthesisAfterRepeat", "Expected '(' after 'repeat'."),
    ("error.syntax.MissingRightParenthesisAfterRepeatCount", "Expected ')' after the repeat count."),
    ("error.syntax.MissingRightBrace", "Expected '}' to close this block."),
    ("error.syntax.UnexpectedRightBrace", "There is a '}' without a matching '{'."),
    ("error.syntax.MissingRightParenthesisAfterExpression", "Expected ')' after the expression."),
    ("error.syntax.MissingRightParenthesisAfterFunctionCall", "Expected ')' to close the call to {{function}}."),
    ("error.syntax.TrailingCommaInArray", "Remove the extra comma in this list."),
    ("error.syntax.MissingRightBracketInArray", "Expected ']' to close this list."),
    ("error.syntax.MissingRightBracketInIndex", "Expected ']' after the index."),
    ("error.syntax.InvalidDictionaryKey", "Object keys must be names, strings or numbers."),
    ("error.syntax.MissingColonInDictionary", "Expected ':' after the key."),
    ("error.syntax.DuplicateDictionaryKey", "The key '{{key}}' appears twice."),
    ("error.syntax.TrailingCommaInDictionary", "Remove the extra comma in this object."),
    ("error.syntax.MissingRightBraceInDictionary", "Expected '}' to close this object."),
    ("error.syntax.MissingPropertyName", "Expected a property name after '.'."),
    ("error.syntax.InvalidAssignmentTargetExpression", "You can only assign to a variable or a property."),
    ("error.syntax.InvalidUpdateTarget", "'{{operator}}' can only be used on a variable or a property."),
    ("error.syntax.MissingTemplateClosingBrace", "Expected '}' to close the ${ in this template literal."),
    ("error.syntax.NodeNotAllowed", "{{friendlyName}} are not available yet."),
    ("error.syntax.GenericSyntaxError", "Unexpected '{{token}}'."),
    // Disabled features
    ("error.disabledLanguageFeature.DisabledFeatureExcludeListViolation", "'{{lexeme}}' is switched off for this exercise."),
    ("error.disabledLanguageFeature.DisabledFeatureIncludeListViolation", "'{{lexeme}}' is not enabled for this exercise."),
    // Runtime
    ("error.runtime.InvalidBinaryExpression", "The operator '{{operator}}' can't be used here."),
    ("error.runtime.InvalidUnaryExpression", "'{{operator}}' needs a {{expected}}, but got a {{type}}."),
    ("error.runtime.UnsupportedOperation", "This operation isn't supported."),
    ("error.runtime.VariableNotDeclared", "The variable '{{name}}' has not been declared."),
    ("error.runtime.VariableAlreadyDeclared", "The variable '{{name}}' has already been declared."),
    ("error.runtime.ShadowingDisabled", "'{{name}}' is already declared in an outer scope."),
    ("error.runtime.AssignmentToConstant", "'{{name}}' is a constant and can't be changed."),
    ("error.runtime.ComparisonRequiresNumber", "'{{operator}}' can only compare numbers, but got a {{type}}."),
    ("error.runtime.TruthinessDisabled", "Expected a boolean here, but got a {{type}}."),
    ("error.runtime.TypeCoercionNotAllowed", "'{{operator}}' can't combine a {{left}} and a {{right}}."),
    ("error.runtime.StrictEqualityRequired", "Use '{{suggestion}}' instead of '{{operator}}'."),
    ("error.runtime.IndexOutOfRange", "Index {{index}} is out of range for a list of length {{length}}."),
    ("error.runtime.TypeError", "{{message}}"),
    ("error.runtime.PropertyNotFound", "There is no property called '{{property}}'."),
    ("error.runtime.ArgumentError", "{{message}}"),
    ("error.runtime.NodeNotAllowed", "{{nodeType}} is not allowed."),
    ("error.runtime.FunctionNotFound", "There is no function called '{{name}}'."),
    ("error.runtime.InvalidNumberOfArguments", "{{function}} expects {{expected}} arguments, but got {{got}}."),
    ("error.runtime.FunctionExecutionError", "{{function}} failed: {{message}}"),
    ("error.runtime.LogicErrorInExecution", "{{message}}"),
    ("error.runtime.ReturnOutsideFunction", "'return' can only be used inside a function."),
    ("error.runtime.BreakOutsideLoop", "'break' can only be used inside a loop."),
    ("error.runtime.ContinueOutsideLoop", "'continue' can only be used inside a loop."),
    ("error.runtime.ForOfLoopTargetNotIterable", "for...of needs a list or a string, but got a {{type}}."),
    ("error.runtime.ForInLoopTargetNotObject", "for...in needs an object, but got a {{type}}."),
    ("error.runtime.InOperatorRequiresObject", "'in' needs an object on its right, but got a {{type}}."),
    ("error.runtime.InOperatorRequiresStringKey", "'in' needs a string key, but got a {{type}}."),
    ("error.runtime.InWithArrayNotAllowed", "'in' can't be used with lists. Try .includes() instead."),
    ("error.runtime.RepeatCountMustBeNumber", "repeat needs a number, but got a {{type}}."),
    ("error.runtime.RepeatCountMustBeNonNegative", "repeat can't run {{count}} times."),
    ("error.runtime.RepeatCountTooHigh", "repeat can run at most {{max}} times, not {{count}}."),
    ("error.runtime.MethodNotYetImplemented", "'{{method}}' hasn't been built yet."),
    ("error.runtime.MethodNotYetAvailable", "'{{method}}' isn't available in this exercise yet."),
    ("error.runtime.MaxIterationsReached", "Your loops ran more than {{max}} times. Is there an infinite loop?"),
    ("error.runtime.MaxCallDepthReached", "Functions called each other more than {{max}} levels deep. Is there a function that never stops calling itself?"),
    ("error.runtime.StringTooLong", "Strings can be at most {{max}} characters long."),
    // Frame descriptions
    ("frame.error", "This step stopped the program: {{message}}"),
    ("frame.expression", "Evaluated {{code}}, which gave {{value}}."),
    ("frame.call", "Called {{callee}}({{args}}), which returned {{value}}."),
    ("frame.callWithoutResult", "Called {{callee}}({{args}})."),
    ("frame.assignment", "Set {{target}} to {{value}}."),
    ("frame.update", "Used {{operator}} on {{target}}, changing it from {{previous}} to {{next}}."),
    ("frame.binary", "Worked out {{code}} using {{operator}}, which gave {{value}}."),
    ("frame.declareVariable", "Created a variable called {{name}} with the value {{value}}."),
    ("frame.declareConstant", "Created a constant called {{name}} with the value {{value}}."),
    ("frame.ifTrue", "Checked {{code}}. It was true, so the if block runs."),
    ("frame.ifFalse", "Checked {{code}}. It was false, so the if block is skipped."),
    ("frame.ifValue", "Checked {{code}}, which gave {{value}}."),
    ("frame.whileCondition", "Check {{iteration}} of the while loop: {{code}} gave {{value}}."),
    ("frame.forCondition", "Check {{iteration}} of the for loop: {{code}} gave {{value}}."),
    ("frame.forUpdate", "After iteration {{iteration}}, ran {{code}}, which gave {{value}}."),
    ("frame.forOf", "Iteration {{iteration}}: {{variable}} is now {{value}}."),
    ("frame.forIn", "Iteration {{iteration}}: {{variable}} is now '{{key}}'."),
    ("frame.emptyIteration", "There was nothing to loop over in {{collection}}, so the loop body was skipped."),
    ("frame.repeat", "Repeat iteration {{iteration}} of {{count}}."),
    ("frame.repeatForever", "Repeat iteration {{iteration}}."),
    ("frame.repeatNone", "The repeat count was 0, so the body was skipped."),
    ("frame.return", "Returned {{value}} from the function."),
    ("frame.returnNothing", "Returned from the function without a value."),
    ("frame.break", "Left the loop with break."),
    ("frame.continue", "Skipped to the next iteration with continue."),
];
