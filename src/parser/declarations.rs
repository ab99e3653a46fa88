//! Declaration parsing implementation
//!
//! - Variable declarations: `let x = 1`, `const name = "Ada"`
//! - Function declarations: `function add(a, b) { return a + b }`
//! - Function expressions share the parameter and body grammar:
//!   `function (a) { ... }`

use crate::parser::ast::*;
use crate::parser::errors::SyntaxErrorType;
use crate::parser::lexer::TokenType;
use crate::parser::parse::{ParseResult, Parser};
use crate::translator::context;
use std::rc::Rc;

/// Name given to function expressions written without one.
pub const ANONYMOUS_FUNCTION_NAME: &str = "anonymous";

impl<'a> Parser<'a> {
    pub(crate) fn variable_declaration(&mut self) -> ParseResult<Statement> {
        let declaration = self.variable_declaration_clause()?;
        self.consume_semicolon()?;
        Ok(declaration)
    }

    /// `let|const name [= initializer]` without the statement terminator;
    /// shared with the init clause of a `for` loop.
    pub(crate) fn variable_declaration_clause(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        let start = keyword.location;
        self.check_node_allowed(NodeType::VariableDeclaration, start)?;

        let kind = if keyword.token_type == TokenType::Const {
            DeclarationKind::Const
        } else {
            DeclarationKind::Let
        };

        let name = self.consume(TokenType::Identifier, SyntaxErrorType::MissingIdentifier)?;

        let initializer = if self.match_token(TokenType::Equal) {
            Some(self.expression()?)
        } else if kind.is_const() {
            return Err(self.error_with_context(
                SyntaxErrorType::MissingInitializerInConstDeclaration,
                name.location,
                context([("name", &name.lexeme)]),
            ));
        } else if self.features.require_variable_instantiation {
            return Err(self.error_with_context(
                SyntaxErrorType::MissingInitializerInVariableDeclaration,
                name.location,
                context([("name", &name.lexeme)]),
            ));
        } else {
            None
        };

        Ok(Statement::VariableDeclaration {
            name: name.lexeme,
            kind,
            initializer,
            name_location: name.location,
            location: self.span_from(start),
        })
    }

    pub(crate) fn function_declaration(&mut self) -> ParseResult<Statement> {
        let start = self.advance().location;
        self.check_node_allowed(NodeType::FunctionDeclaration, start)?;

        let name = self.consume(TokenType::Identifier, SyntaxErrorType::MissingFunctionName)?;
        let declaration = self.function_rest(name.lexeme, start)?;

        Ok(Statement::FunctionDeclaration(Rc::new(declaration)))
    }

    /// `function [name] (params) { body }` in expression position.
    pub(crate) fn function_expression(&mut self) -> ParseResult<Expression> {
        let start = self.advance().location;
        self.check_node_allowed(NodeType::FunctionExpression, start)?;

        let name = if self.check(TokenType::Identifier) {
            self.advance().lexeme
        } else {
            ANONYMOUS_FUNCTION_NAME.to_string()
        };
        let declaration = self.function_rest(name, start)?;
        let location = declaration.location;

        Ok(Expression::Function {
            declaration: Rc::new(declaration),
            location,
        })
    }

    /// Parameter list and body, after the name.
    fn function_rest(&mut self, name: String, start: Location) -> ParseResult<FunctionDeclaration> {
        self.consume(TokenType::LeftParen, SyntaxErrorType::MissingLeftParenthesisAfterFunctionName)?;
        let params = self.parameters()?;
        self.consume(TokenType::RightParen, SyntaxErrorType::MissingRightParenthesisAfterParameters)?;

        self.consume(TokenType::LeftBrace, SyntaxErrorType::MissingLeftBraceBeforeFunctionBody)?;
        let body = self.block_body()?;

        Ok(FunctionDeclaration {
            name,
            params,
            body,
            location: self.span_from(start),
        })
    }

    fn parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        let mut params: Vec<Parameter> = Vec::new();
        if self.check(TokenType::RightParen) {
            return Ok(params);
        }

        loop {
            let token = self.consume(TokenType::Identifier, SyntaxErrorType::MissingIdentifier)?;
            if params.iter().any(|param| param.name == token.lexeme) {
                return Err(self.error_with_context(
                    SyntaxErrorType::DuplicateParameterName,
                    token.location,
                    context([("name", &token.lexeme)]),
                ));
            }
            params.push(Parameter {
                name: token.lexeme,
                location: token.location,
            });

            if !self.match_token(TokenType::Comma) {
                break;
            }
        }

        Ok(params)
    }
}
