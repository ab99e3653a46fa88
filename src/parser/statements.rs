//! Statement parsing implementation
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | function_decl | if_stmt | while_stmt | for_stmt
//!             | for_of_stmt | for_in_stmt | repeat_stmt | return_stmt
//!             | break_stmt | continue_stmt | block | ";" | expr_stmt
//! ```
//!
//! Statements end at `;`, a line break, or a closing `}` (see
//! [`Parser::consume_semicolon`]). Function declarations are only accepted at
//! the top level.

use crate::parser::ast::*;
use crate::parser::errors::SyntaxErrorType;
use crate::parser::lexer::TokenType;
use crate::parser::parse::{ParseResult, Parser};

impl<'a> Parser<'a> {
    /// Parse a statement
    pub(crate) fn statement(&mut self, is_top_level: bool) -> ParseResult<Statement> {
        self.skip_eols();

        match self.peek().token_type {
            TokenType::Function if is_top_level => self.function_declaration(),
            TokenType::Function => Err(self.error(SyntaxErrorType::NestedFunctionDeclaration, self.current_location())),
            TokenType::Let | TokenType::Const => self.variable_declaration(),
            TokenType::If => self.if_statement(),
            TokenType::While => self.while_statement(),
            TokenType::For => self.for_statement(),
            TokenType::Repeat => self.repeat_statement(),
            TokenType::Return => self.return_statement(),
            TokenType::Break => self.break_statement(),
            TokenType::Continue => self.continue_statement(),
            TokenType::LeftBrace => self.block_statement(),
            TokenType::Semicolon => {
                // Empty statement
                let location = self.advance().location;
                Ok(Statement::Block {
                    statements: Vec::new(),
                    location,
                })
            }
            TokenType::RightBrace if is_top_level => {
                Err(self.error(SyntaxErrorType::UnexpectedRightBrace, self.current_location()))
            }
            _ => self.expression_statement(),
        }
    }

    pub(crate) fn block_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current_location();
        self.check_node_allowed(NodeType::BlockStatement, start)?;
        self.consume(TokenType::LeftBrace, SyntaxErrorType::GenericSyntaxError)?;
        let statements = self.block_body()?;

        Ok(Statement::Block {
            statements,
            location: self.span_from(start),
        })
    }

    /// Statements up to and including the closing `}` (the `{` is already consumed).
    pub(crate) fn block_body(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();

        loop {
            self.skip_eols();
            if self.check(TokenType::RightBrace) || self.is_at_end() {
                break;
            }
            statements.push(self.statement(false)?);
        }

        self.consume(TokenType::RightBrace, SyntaxErrorType::MissingRightBrace)?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current_location();
        self.check_node_allowed(NodeType::ExpressionStatement, start)?;
        let expression = self.expression()?;
        let location = self.span_from(start);
        self.consume_semicolon()?;

        Ok(Statement::Expression { expression, location })
    }

    fn if_statement(&mut self) -> ParseResult<Statement> {
        let start = self.advance().location;
        self.check_node_allowed(NodeType::IfStatement, start)?;

        self.consume(TokenType::LeftParen, SyntaxErrorType::MissingLeftParenthesisAfterIf)?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, SyntaxErrorType::MissingRightParenthesisAfterIfCondition)?;

        let then_branch = Box::new(self.statement(false)?);

        // `else` may sit on the line after the closing brace
        let checkpoint = self.position;
        self.skip_eols();
        let else_branch = if self.match_token(TokenType::Else) {
            Some(Box::new(self.statement(false)?))
        } else {
            self.position = checkpoint;
            None
        };

        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            location: self.span_from(start),
        })
    }

    fn while_statement(&mut self) -> ParseResult<Statement> {
        let start = self.advance().location;
        self.check_node_allowed(NodeType::WhileStatement, start)?;

        self.consume(TokenType::LeftParen, SyntaxErrorType::MissingLeftParenthesisAfterWhile)?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, SyntaxErrorType::MissingRightParenthesisAfterWhileCondition)?;
        let body = Box::new(self.statement(false)?);

        Ok(Statement::While {
            condition,
            body,
            location: self.span_from(start),
        })
    }

    fn for_statement(&mut self) -> ParseResult<Statement> {
        let start = self.advance().location;
        self.consume(TokenType::LeftParen, SyntaxErrorType::MissingLeftParenthesisAfterFor)?;

        let declares_variable = self.check(TokenType::Let) || self.check(TokenType::Const);
        if declares_variable && self.check_ahead(1, TokenType::Identifier) {
            if self.check_ahead(2, TokenType::Of) {
                return self.for_of_statement(start);
            }
            if self.check_ahead(2, TokenType::In) {
                return self.for_in_statement(start);
            }
            if !self.check_ahead(2, TokenType::Equal) && !self.check_ahead(2, TokenType::Semicolon) {
                let location = self.peek_ahead(2).map_or(start, |token| token.location);
                return Err(self.error(SyntaxErrorType::MissingOfOrInInForLoop, location));
            }
        }

        self.check_node_allowed(NodeType::ForStatement, start)?;

        let init = if self.check(TokenType::Semicolon) {
            None
        } else if self.check(TokenType::Const) {
            return Err(self.error(SyntaxErrorType::ConstInForLoopInit, self.current_location()));
        } else if self.check(TokenType::Let) {
            Some(Box::new(self.variable_declaration_clause()?))
        } else {
            let expr_start = self.current_location();
            self.check_node_allowed(NodeType::ExpressionStatement, expr_start)?;
            let expression = self.expression()?;
            Some(Box::new(Statement::Expression {
                expression,
                location: self.span_from(expr_start),
            }))
        };
        self.consume(TokenType::Semicolon, SyntaxErrorType::MissingSemicolonInForLoop)?;

        let condition = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::Semicolon, SyntaxErrorType::MissingSemicolonInForLoop)?;

        let update = if self.check(TokenType::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::RightParen, SyntaxErrorType::MissingRightParenthesisAfterForClauses)?;

        let body = Box::new(self.statement(false)?);

        Ok(Statement::For {
            init,
            condition,
            update,
            body,
            location: self.span_from(start),
        })
    }

    fn loop_variable(&mut self) -> ParseResult<LoopVariable> {
        let kind = if self.advance().token_type == TokenType::Const {
            DeclarationKind::Const
        } else {
            DeclarationKind::Let
        };
        let name = self.consume(TokenType::Identifier, SyntaxErrorType::MissingIdentifier)?;

        Ok(LoopVariable {
            name: name.lexeme,
            kind,
            location: name.location,
        })
    }

    fn for_of_statement(&mut self, start: Location) -> ParseResult<Statement> {
        self.check_node_allowed(NodeType::ForOfStatement, start)?;
        let variable = self.loop_variable()?;
        self.consume(TokenType::Of, SyntaxErrorType::MissingOfOrInInForLoop)?;
        let iterable = self.expression()?;
        self.consume(TokenType::RightParen, SyntaxErrorType::MissingRightParenthesisAfterForClauses)?;
        let body = Box::new(self.statement(false)?);

        Ok(Statement::ForOf {
            variable,
            iterable,
            body,
            location: self.span_from(start),
        })
    }

    fn for_in_statement(&mut self, start: Location) -> ParseResult<Statement> {
        self.check_node_allowed(NodeType::ForInStatement, start)?;
        let variable = self.loop_variable()?;
        self.consume(TokenType::In, SyntaxErrorType::MissingOfOrInInForLoop)?;
        let object = self.expression()?;
        self.consume(TokenType::RightParen, SyntaxErrorType::MissingRightParenthesisAfterForClauses)?;
        let body = Box::new(self.statement(false)?);

        Ok(Statement::ForIn {
            variable,
            object,
            body,
            location: self.span_from(start),
        })
    }

    fn repeat_statement(&mut self) -> ParseResult<Statement> {
        let start = self.advance().location;
        self.check_node_allowed(NodeType::RepeatStatement, start)?;

        let count = if self.match_token(TokenType::LeftParen) {
            let count = self.expression()?;
            self.consume(TokenType::RightParen, SyntaxErrorType::MissingRightParenthesisAfterRepeatCount)?;
            Some(count)
        } else if self.check(TokenType::LeftBrace) {
            None
        } else {
            return Err(self.error(SyntaxErrorType::MissingLeftParenthesisAfterRepeat, self.current_location()));
        };

        let body = Box::new(self.statement(false)?);

        Ok(Statement::Repeat {
            count,
            body,
            location: self.span_from(start),
        })
    }

    fn return_statement(&mut self) -> ParseResult<Statement> {
        let start = self.advance().location;
        self.check_node_allowed(NodeType::ReturnStatement, start)?;

        let value = if matches!(
            self.peek().token_type,
            TokenType::Semicolon | TokenType::Eol | TokenType::Eof | TokenType::RightBrace
        ) {
            None
        } else {
            Some(self.expression()?)
        };
        let location = self.span_from(start);
        self.consume_semicolon()?;

        Ok(Statement::Return { value, location })
    }

    fn break_statement(&mut self) -> ParseResult<Statement> {
        let location = self.advance().location;
        self.check_node_allowed(NodeType::BreakStatement, location)?;
        self.consume_semicolon()?;
        Ok(Statement::Break { location })
    }

    fn continue_statement(&mut self) -> ParseResult<Statement> {
        let location = self.advance().location;
        self.check_node_allowed(NodeType::ContinueStatement, location)?;
        self.consume_semicolon()?;
        Ok(Statement::Continue { location })
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

    fn parse_err(source: &str) -> String {
        parse_program(source, &LanguageFeatures::default(), &Translator::english())
            .unwrap_err()
            .type_name()
    }

    #[test]
    fn test_if_else_chain() {
        let program = parse("if (a) {\n  b = 1\n}\nelse if (c) {\n  b = 2\n} else {\n  b = 3\n}");
        assert_eq!(program.len(), 1);
        match &program[0] {
            Statement::If { else_branch, .. } => {
                let else_branch = else_branch.as_ref().expect("else branch");
                assert!(matches!(else_branch.as_ref(), Statement::If { else_branch: Some(_), .. }));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_else_keeps_following_statement() {
        let program = parse("if (a) {\n  b = 1\n}\nc = 2");
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_for_loop_clauses() {
        let program = parse("for (let i = 0; i < 3; i++) {\n}");
        match &program[0] {
            Statement::For {
                init, condition, update, ..
            } => {
                assert!(matches!(init.as_deref(), Some(Statement::VariableDeclaration { .. })));
                assert!(condition.is_some());
                assert!(matches!(update, Some(Expression::Update { prefix: false, .. })));
            }
            other => panic!("Expected for statement, got {:?}", other),
        }
    }

    #[test]
    fn test_for_of_and_for_in() {
        let program = parse("for (const x of xs) {\n}\nfor (let k in obj) {\n}");
        assert!(matches!(&program[0], Statement::ForOf { variable, .. } if variable.name == "x" && variable.kind.is_const()));
        assert!(matches!(&program[1], Statement::ForIn { variable, .. } if variable.name == "k"));
    }

    #[test]
    fn test_for_loop_errors() {
        assert_eq!(parse_err("for (const i = 0; i < 3; i++) {}"), "ConstInForLoopInit");
        assert_eq!(parse_err("for (let x at xs) {}"), "MissingOfOrInInForLoop");
        assert_eq!(parse_err("for (let i = 0 i < 3; i++) {}"), "MissingSemicolonInForLoop");
        assert_eq!(parse_err("for let i = 0; i < 3; i++) {}"), "MissingLeftParenthesisAfterFor");
    }

    #[test]
    fn test_repeat_forms() {
        let program = parse("repeat (3) {\n}\nrepeat {\n  break\n}");
        assert!(matches!(&program[0], Statement::Repeat { count: Some(_), .. }));
        assert!(matches!(&program[1], Statement::Repeat { count: None, .. }));
        assert_eq!(parse_err("repeat 3 {}"), "MissingLeftParenthesisAfterRepeat");
        assert_eq!(parse_err("repeat (3 {}"), "MissingRightParenthesisAfterRepeatCount");
    }

    #[test]
    fn test_block_errors() {
        assert_eq!(parse_err("{\n  x = 1\n"), "MissingRightBrace");
        assert_eq!(parse_err("if (x > 1 {}"), "MissingRightParenthesisAfterIfCondition");
        assert_eq!(parse_err("while x {}"), "MissingLeftParenthesisAfterWhile");
    }

    #[test]
    fn test_return_forms() {
        let program = parse("function f() {\n  return\n}\nfunction g() { return 1 }");
        match &program[0] {
            Statement::FunctionDeclaration(declaration) => {
                assert!(matches!(&declaration.body[0], Statement::Return { value: None, .. }));
            }
            other => panic!("Expected function, got {:?}", other),
        }
        match &program[1] {
            Statement::FunctionDeclaration(declaration) => {
                assert!(matches!(&declaration.body[0], Statement::Return { value: Some(_), .. }));
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }
}
