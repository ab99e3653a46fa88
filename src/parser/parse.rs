//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and the helpers shared by the
//! grammar files:
//! - `declarations`: variable and function declarations
//! - `statements`: control flow, blocks, expression statements
//! - `expressions`: precedence climbing from assignment down to primaries
//!
//! Parser methods are split across those files using `impl Parser` blocks.
//!
//! # Error recovery
//!
//! On a syntax error the parser records it, skips ahead to the next statement
//! boundary with [`Parser::synchronize`] and keeps going. Only the first error
//! is reported; the rest are logged at debug level.

use crate::features::LanguageFeatures;
use crate::parser::ast::{Location, NodeType, Statement};
use crate::parser::errors::{SyntaxError, SyntaxErrorType};
use crate::parser::lexer::{Token, TokenType};
use crate::translator::{context, ErrorContext, Translator};

pub(crate) type ParseResult<T> = Result<T, SyntaxError>;

/// Recursive descent parser over a scanned token stream
pub struct Parser<'a> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) features: &'a LanguageFeatures,
    pub(crate) translator: &'a Translator,
}

impl<'a> Parser<'a> {
    /// `tokens` must end with an `EOF` token, as produced by the lexer.
    pub fn new(tokens: Vec<Token>, features: &'a LanguageFeatures, translator: &'a Translator) -> Self {
        Parser {
            tokens,
            position: 0,
            features,
            translator,
        }
    }

    /// Parse the whole program, returning the first syntax error if any.
    pub fn parse(mut self) -> Result<Vec<Statement>, SyntaxError> {
        let mut statements = Vec::new();
        let mut first_error: Option<SyntaxError> = None;

        loop {
            self.skip_eols();
            if self.is_at_end() {
                break;
            }

            match self.statement(true) {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    } else {
                        tracing::debug!(error = %error.error_type, line = error.location.line, "suppressed follow-on syntax error");
                    }
                    self.synchronize();
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => {
                tracing::debug!(statements = statements.len(), "parsed program");
                Ok(statements)
            }
        }
    }

    /// Skip to the start of the next statement.
    pub(crate) fn synchronize(&mut self) {
        if !self.is_at_end() {
            self.advance();
        }

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::Semicolon | TokenType::Eol) {
                return;
            }
            if matches!(
                self.peek().token_type,
                TokenType::Function
                    | TokenType::Let
                    | TokenType::Const
                    | TokenType::If
                    | TokenType::While
                    | TokenType::For
                    | TokenType::Repeat
                    | TokenType::Return
                    | TokenType::Break
                    | TokenType::Continue
            ) {
                return;
            }
            self.advance();
        }
    }

    // ===== Helper methods =====

    pub(crate) fn check_node_allowed(&self, node: NodeType, location: Location) -> ParseResult<()> {
        if self.features.is_node_allowed(node) {
            Ok(())
        } else {
            Err(self.error_with_context(
                SyntaxErrorType::NodeNotAllowed(node),
                location,
                context([("nodeType", node.to_string()), ("friendlyName", node.friendly_name().to_string())]),
            ))
        }
    }

    /// End of a simple statement: `;`, a line break, or a closing brace.
    pub(crate) fn consume_semicolon(&mut self) -> ParseResult<()> {
        if self.match_token(TokenType::Semicolon) {
            return self.check_one_statement_per_line();
        }

        let end = self.previous().location;
        if self.features.require_semicolons {
            return Err(self.error(SyntaxErrorType::MissingSemicolon, end));
        }

        match self.peek().token_type {
            TokenType::Eol => {
                self.advance();
                Ok(())
            }
            TokenType::Eof | TokenType::RightBrace => Ok(()),
            _ => Err(self.error(SyntaxErrorType::MissingSemicolon, end)),
        }
    }

    fn check_one_statement_per_line(&self) -> ParseResult<()> {
        if !self.features.one_statement_per_line {
            return Ok(());
        }

        let next = self.peek();
        if matches!(
            next.token_type,
            TokenType::Eol | TokenType::Eof | TokenType::RightBrace | TokenType::RightParen
        ) {
            return Ok(());
        }
        if next.location.line == self.previous().location.line {
            return Err(self.error(SyntaxErrorType::MultipleStatementsPerLine, next.location));
        }
        Ok(())
    }

    pub(crate) fn skip_eols(&mut self) {
        while self.check(TokenType::Eol) {
            self.advance();
        }
    }

    pub(crate) fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_any(&mut self, token_types: &[TokenType]) -> Option<Token> {
        if token_types.contains(&self.peek().token_type) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(crate) fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    pub(crate) fn check_ahead(&self, n: usize, token_type: TokenType) -> bool {
        self.peek_ahead(n).is_some_and(|token| token.token_type == token_type)
    }

    pub(crate) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous().clone()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.position.min(last)]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> Location {
        self.peek().location
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Location) -> Location {
        Location::between(start, self.previous().location)
    }

    /// Consume a token of the given type or fail with `error_type` at the
    /// current token.
    pub(crate) fn consume(&mut self, token_type: TokenType, error_type: SyntaxErrorType) -> ParseResult<Token> {
        self.consume_with_context(token_type, error_type, ErrorContext::new())
    }

    pub(crate) fn consume_with_context(
        &mut self,
        token_type: TokenType,
        error_type: SyntaxErrorType,
        context: ErrorContext,
    ) -> ParseResult<Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.error_with_context(error_type, self.current_location(), context))
        }
    }

    pub(crate) fn error(&self, error_type: SyntaxErrorType, location: Location) -> SyntaxError {
        self.error_with_context(error_type, location, ErrorContext::new())
    }

    pub(crate) fn error_with_context(
        &self,
        error_type: SyntaxErrorType,
        location: Location,
        context: ErrorContext,
    ) -> SyntaxError {
        SyntaxError::new(self.translator, error_type, location, context)
    }

    /// Error for a token that cannot start or continue the current construct.
    pub(crate) fn unexpected_token(&self) -> SyntaxError {
        let token = self.peek();
        let error_type = match token.token_type {
            TokenType::Eol
            | TokenType::Eof
            | TokenType::Semicolon
            | TokenType::Comma
            | TokenType::RightParen
            | TokenType::RightBracket
            | TokenType::RightBrace => SyntaxErrorType::MissingExpression,
            _ => SyntaxErrorType::GenericSyntaxError,
        };
        self.error_with_context(error_type, token.location, context([("token", token.lexeme.clone())]))
    }
}

#[cfg(test)]
mod tests {
    use crate::features::LanguageFeatures;
    use crate::parser::ast::*;
    use crate::parser::parse_program;
    use crate::translator::Translator;

    fn parse(source: &str) -> Vec<Statement> {
        parse_program(source, &LanguageFeatures::default(), &Translator::english()).unwrap()
    }

    fn parse_err(source: &str, features: &LanguageFeatures) -> String {
        parse_program(source, features, &Translator::english())
            .unwrap_err()
            .type_name()
    }

    #[test]
    fn test_parse_simple_program() {
        let program = parse("let x = 1\nx = x + 2\nconsole.log(x)");
        assert_eq!(program.len(), 3);
        assert_eq!(program[0].node_type(), NodeType::VariableDeclaration);
        assert_eq!(program[1].node_type(), NodeType::ExpressionStatement);
        assert_eq!(program[2].node_type(), NodeType::ExpressionStatement);
    }

    #[test]
    fn test_blank_lines_and_semicolons() {
        let program = parse("\n\nlet a = 1;\n\n\nlet b = 2;;\n");
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn test_only_first_error_is_reported() {
        let features = LanguageFeatures::default();
        assert_eq!(parse_err("let = 5\nlet y\n", &features), "MissingIdentifier");
    }

    #[test]
    fn test_parsing_continues_after_an_error() {
        let features = LanguageFeatures::default();
        // The stray brace is reached only after recovering from the first error
        assert_eq!(parse_err("let x = ;\n}\n", &features), "MissingExpression");
        assert_eq!(parse_err("}\n", &features), "UnexpectedRightBrace");
    }

    #[test]
    fn test_require_semicolons() {
        let features = LanguageFeatures {
            require_semicolons: true,
            ..LanguageFeatures::default()
        };
        assert_eq!(parse_err("let x = 1\n", &features), "MissingSemicolon");
        assert!(parse_program("let x = 1;\n", &features, &Translator::english()).is_ok());
    }

    #[test]
    fn test_missing_semicolon_between_statements() {
        assert_eq!(parse_err("let x = 1 let y = 2", &LanguageFeatures::default()), "MissingSemicolon");
    }

    #[test]
    fn test_one_statement_per_line() {
        let features = LanguageFeatures {
            one_statement_per_line: true,
            ..LanguageFeatures::default()
        };
        assert_eq!(parse_err("let x = 1; let y = 2;", &features), "MultipleStatementsPerLine");
        assert!(parse_program(
            "for (let i = 0; i < 3; i++) {\n  x = i;\n}",
            &features,
            &Translator::english()
        )
        .is_ok());
    }

    #[test]
    fn test_node_not_allowed() {
        let features = LanguageFeatures {
            allowed_nodes: Some(vec![
                NodeType::VariableDeclaration,
                NodeType::LiteralExpression,
                NodeType::IdentifierExpression,
                NodeType::BinaryExpression,
                NodeType::ExpressionStatement,
                NodeType::BlockStatement,
            ]),
            ..LanguageFeatures::default()
        };
        assert_eq!(
            parse_err("let x = 1\nif (x > 0) { x }", &features),
            "IfStatementNotAllowed"
        );
        assert_eq!(parse_err("let xs = [1]", &features), "ArrayExpressionNotAllowed");
    }
}
