//! Compile-time error taxonomies
//!
//! Two families are kept apart:
//!
//! - [`SyntaxError`]: malformed tokens, grammar violations and node types that
//!   the current lesson does not allow.
//! - [`DisabledLanguageFeatureError`]: a well-formed token that the
//!   configuration switched off through `includeList` / `excludeList`.
//!
//! [`CompileError`] is what `compile` and `interpret` hand back when either
//! one stops the scan or parse.

use crate::parser::ast::{Location, NodeType};
use crate::translator::{ErrorContext, Translator};
use std::fmt;
use thiserror::Error;

/// Kinds of syntax error. [`SyntaxErrorType::NodeNotAllowed`] renders as
/// `"<NodeType>NotAllowed"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorType {
    UnknownCharacter,
    MissingDoubleQuoteToTerminateString,
    MissingSingleQuoteToTerminateString,
    MissingBacktickToTerminateTemplateLiteral,
    UnterminatedComment,
    UnimplementedToken,
    PermanentlyExcludedToken,
    MissingExpression,
    MissingSemicolon,
    MultipleStatementsPerLine,
    MissingIdentifier,
    MissingInitializerInVariableDeclaration,
    MissingInitializerInConstDeclaration,
    ConstInForLoopInit,
    MissingFunctionName,
    MissingLeftParenthesisAfterFunctionName,
    MissingLeftBraceBeforeFunctionBody,
    NestedFunctionDeclaration,
    DuplicateParameterName,
    MissingRightParenthesisAfterParameters,
    MissingLeftParenthesisAfterIf,
    MissingRightParenthesisAfterIfCondition,
    MissingLeftParenthesisAfterWhile,
    MissingRightParenthesisAfterWhileCondition,
    MissingLeftParenthesisAfterFor,
    MissingRightParenthesisAfterForClauses,
    MissingSemicolonInForLoop,
    MissingOfOrInInForLoop,
    MissingLeftParenthesisAfterRepeat,
    MissingRightParenthesisAfterRepeatCount,
    MissingRightBrace,
    UnexpectedRightBrace,
    MissingRightParenthesisAfterExpression,
    MissingRightParenthesisAfterFunctionCall,
    TrailingCommaInArray,
    MissingRightBracketInArray,
    MissingRightBracketInIndex,
    InvalidDictionaryKey,
    MissingColonInDictionary,
    DuplicateDictionaryKey,
    TrailingCommaInDictionary,
    MissingRightBraceInDictionary,
    MissingPropertyName,
    InvalidAssignmentTargetExpression,
    InvalidUpdateTarget,
    MissingTemplateClosingBrace,
    NodeNotAllowed(NodeType),
    GenericSyntaxError,
}

impl SyntaxErrorType {
    /// Stable name, e.g. `MissingSemicolon` or `IfStatementNotAllowed`.
    pub fn name(&self) -> String {
        match self {
            SyntaxErrorType::NodeNotAllowed(node) => format!("{}NotAllowed", node),
            other => format!("{:?}", other),
        }
    }

    /// Catalogue key; all `NotAllowed` variants share one template.
    pub fn translation_key(&self) -> String {
        match self {
            SyntaxErrorType::NodeNotAllowed(_) => "error.syntax.NodeNotAllowed".to_string(),
            other => format!("error.syntax.{}", other.name()),
        }
    }
}

impl fmt::Display for SyntaxErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub location: Location,
    pub error_type: SyntaxErrorType,
    pub context: ErrorContext,
}

impl SyntaxError {
    pub fn new(
        translator: &Translator,
        error_type: SyntaxErrorType,
        location: Location,
        context: ErrorContext,
    ) -> Self {
        SyntaxError {
            message: translator.translate(&error_type.translation_key(), &context),
            location,
            error_type,
            context,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisabledLanguageFeatureErrorType {
    DisabledFeatureExcludeListViolation,
    DisabledFeatureIncludeListViolation,
}

impl fmt::Display for DisabledLanguageFeatureErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct DisabledLanguageFeatureError {
    pub message: String,
    pub location: Location,
    pub error_type: DisabledLanguageFeatureErrorType,
    pub context: ErrorContext,
}

impl DisabledLanguageFeatureError {
    pub fn new(
        translator: &Translator,
        error_type: DisabledLanguageFeatureErrorType,
        location: Location,
        context: ErrorContext,
    ) -> Self {
        DisabledLanguageFeatureError {
            message: translator.translate(&format!("error.disabledLanguageFeature.{}", error_type), &context),
            location,
            error_type,
            context,
        }
    }
}

/// Either compile-time failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    DisabledLanguageFeature(#[from] DisabledLanguageFeatureError),
}

impl CompileError {
    pub fn location(&self) -> Location {
        match self {
            CompileError::Syntax(err) => err.location,
            CompileError::DisabledLanguageFeature(err) => err.location,
        }
    }

    /// Stable type name across both families.
    pub fn type_name(&self) -> String {
        match self {
            CompileError::Syntax(err) => err.error_type.name(),
            CompileError::DisabledLanguageFeature(err) => err.error_type.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CompileError::Syntax(err) => &err.message,
            CompileError::DisabledLanguageFeature(err) => &err.message,
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            CompileError::Syntax(err) => &err.context,
            CompileError::DisabledLanguageFeature(err) => &err.context,
        }
    }

    /// The syntax error, if this is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            CompileError::Syntax(err) => Some(err),
            CompileError::DisabledLanguageFeature(_) => None,
        }
    }
}
