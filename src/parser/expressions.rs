//! Expression parsing implementation
//!
//! Precedence, lowest first:
//!
//! ```text
//! assignment      =            (right assoc)
//! logical_or      ||
//! logical_and     &&
//! equality        == != === !==
//! comparison      < <= > >= in
//! additive        + -
//! multiplicative  * / %
//! exponent        **           (right assoc)
//! unary           ! - + ++x --x
//! postfix         x++ x--
//! call            f(...) a.b a[b]
//! primary         literals, names, templates, ( ), [ ], { }, function
//! ```

use crate::memory::value::format_number;
use crate::parser::ast::*;
use crate::parser::errors::SyntaxErrorType;
use crate::parser::lexer::{TokenLiteral, TokenType};
use crate::parser::parse::{ParseResult, Parser};
use crate::translator::context;

impl<'a> Parser<'a> {
    pub(crate) fn expression(&mut self) -> ParseResult<Expression> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expression> {
        let target = self.logical_or()?;

        if self.check(TokenType::Equal) {
            let equals = self.advance();
            if !is_assignable(&target) {
                return Err(self.error(SyntaxErrorType::InvalidAssignmentTargetExpression, target.location()));
            }
            self.check_node_allowed(NodeType::AssignmentExpression, equals.location)?;

            let value = self.assignment()?;
            let location = Location::between(target.location(), value.location());
            return Ok(Expression::Assignment {
                target: Box::new(target),
                value: Box::new(value),
                location,
            });
        }

        Ok(target)
    }

    fn binary_level(
        &mut self,
        operators: &[(TokenType, BinaryOperator)],
        next: fn(&mut Self) -> ParseResult<Expression>,
    ) -> ParseResult<Expression> {
        let mut left = next(self)?;

        loop {
            let token_type = self.peek().token_type;
            let Some(&(_, operator)) = operators.iter().find(|(tt, _)| *tt == token_type) else {
                break;
            };
            let token = self.advance();
            self.check_node_allowed(NodeType::BinaryExpression, token.location)?;

            let right = next(self)?;
            let location = Location::between(left.location(), right.location());
            left = Expression::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn logical_or(&mut self) -> ParseResult<Expression> {
        self.binary_level(&[(TokenType::LogicalOr, BinaryOperator::LogicalOr)], Self::logical_and)
    }

    fn logical_and(&mut self) -> ParseResult<Expression> {
        self.binary_level(&[(TokenType::LogicalAnd, BinaryOperator::LogicalAnd)], Self::equality)
    }

    fn equality(&mut self) -> ParseResult<Expression> {
        self.binary_level(
            &[
                (TokenType::EqualEqual, BinaryOperator::EqualEqual),
                (TokenType::NotEqual, BinaryOperator::NotEqual),
                (TokenType::StrictEqual, BinaryOperator::StrictEqual),
                (TokenType::NotStrictEqual, BinaryOperator::NotStrictEqual),
            ],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expression> {
        self.binary_level(
            &[
                (TokenType::Greater, BinaryOperator::Greater),
                (TokenType::GreaterEqual, BinaryOperator::GreaterEqual),
                (TokenType::Less, BinaryOperator::Less),
                (TokenType::LessEqual, BinaryOperator::LessEqual),
                (TokenType::In, BinaryOperator::In),
            ],
            Self::additive,
        )
    }

    fn additive(&mut self) -> ParseResult<Expression> {
        self.binary_level(
            &[
                (TokenType::Plus, BinaryOperator::Plus),
                (TokenType::Minus, BinaryOperator::Minus),
            ],
            Self::multiplicative,
        )
    }

    fn multiplicative(&mut self) -> ParseResult<Expression> {
        self.binary_level(
            &[
                (TokenType::Star, BinaryOperator::Star),
                (TokenType::Slash, BinaryOperator::Slash),
                (TokenType::Percent, BinaryOperator::Percent),
            ],
            Self::exponent,
        )
    }

    fn exponent(&mut self) -> ParseResult<Expression> {
        let base = self.unary()?;

        if self.check(TokenType::StarStar) {
            let token = self.advance();
            self.check_node_allowed(NodeType::BinaryExpression, token.location)?;
            let power = self.exponent()?;
            let location = Location::between(base.location(), power.location());
            return Ok(Expression::Binary {
                left: Box::new(base),
                operator: BinaryOperator::StarStar,
                right: Box::new(power),
                location,
            });
        }

        Ok(base)
    }

    fn unary(&mut self) -> ParseResult<Expression> {
        if let Some(token) = self.match_any(&[TokenType::Not, TokenType::Minus, TokenType::Plus]) {
            self.check_node_allowed(NodeType::UnaryExpression, token.location)?;
            let operator = match token.token_type {
                TokenType::Not => UnaryOperator::Not,
                TokenType::Minus => UnaryOperator::Minus,
                _ => UnaryOperator::Plus,
            };
            let operand = self.unary()?;
            let location = Location::between(token.location, operand.location());
            return Ok(Expression::Unary {
                operator,
                operand: Box::new(operand),
                location,
            });
        }

        if let Some(token) = self.match_any(&[TokenType::Increment, TokenType::Decrement]) {
            self.check_node_allowed(NodeType::UpdateExpression, token.location)?;
            let operator = update_operator(token.token_type);
            let operand = self.unary()?;
            if !is_assignable(&operand) {
                return Err(self.error_with_context(
                    SyntaxErrorType::InvalidUpdateTarget,
                    operand.location(),
                    context([("operator", operator.lexeme())]),
                ));
            }
            let location = Location::between(token.location, operand.location());
            return Ok(Expression::Update {
                operator,
                operand: Box::new(operand),
                prefix: true,
                location,
            });
        }

        self.postfix()
    }

    fn postfix(&mut self) -> ParseResult<Expression> {
        let operand = self.call()?;

        if let Some(token) = self.match_any(&[TokenType::Increment, TokenType::Decrement]) {
            self.check_node_allowed(NodeType::UpdateExpression, token.location)?;
            let operator = update_operator(token.token_type);
            if !is_assignable(&operand) {
                return Err(self.error_with_context(
                    SyntaxErrorType::InvalidUpdateTarget,
                    operand.location(),
                    context([("operator", operator.lexeme())]),
                ));
            }
            let location = Location::between(operand.location(), token.location);
            return Ok(Expression::Update {
                operator,
                operand: Box::new(operand),
                prefix: false,
                location,
            });
        }

        Ok(operand)
    }

    fn call(&mut self) -> ParseResult<Expression> {
        let mut expr = self.primary()?;

        loop {
            if self.check(TokenType::LeftParen) {
                let paren = self.advance();
                self.check_node_allowed(NodeType::CallExpression, paren.location)?;
                expr = self.finish_call(expr)?;
            } else if self.check(TokenType::Dot) {
                let dot = self.advance();
                self.check_node_allowed(NodeType::MemberExpression, dot.location)?;

                let token = self.peek().clone();
                if token.token_type != TokenType::Identifier && !token.token_type.is_keyword() {
                    return Err(self.error(SyntaxErrorType::MissingPropertyName, token.location));
                }
                self.advance();

                let location = Location::between(expr.location(), token.location);
                expr = Expression::Member {
                    object: Box::new(expr),
                    property: Box::new(Expression::Literal {
                        value: Literal::String(token.lexeme),
                        location: token.location,
                    }),
                    computed: false,
                    location,
                };
            } else if self.check(TokenType::LeftBracket) {
                let bracket = self.advance();
                self.check_node_allowed(NodeType::IndexExpression, bracket.location)?;

                let index = self.expression()?;
                let close = self.consume(TokenType::RightBracket, SyntaxErrorType::MissingRightBracketInIndex)?;
                let location = Location::between(expr.location(), close.location);
                expr = Expression::Member {
                    object: Box::new(expr),
                    property: Box::new(index),
                    computed: true,
                    location,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expression) -> ParseResult<Expression> {
        let mut args = Vec::new();

        self.skip_eols();
        if !self.check(TokenType::RightParen) {
            loop {
                self.skip_eols();
                args.push(self.expression()?);
                self.skip_eols();
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }

        let close = self.consume_with_context(
            TokenType::RightParen,
            SyntaxErrorType::MissingRightParenthesisAfterFunctionCall,
            context([("function", callee_name(&callee))]),
        )?;

        let location = Location::between(callee.location(), close.location);
        Ok(Expression::Call {
            callee: Box::new(callee),
            args,
            location,
        })
    }

    fn primary(&mut self) -> ParseResult<Expression> {
        let token = self.peek().clone();

        let literal = match (token.token_type, &token.literal) {
            (TokenType::Number, Some(TokenLiteral::Number(n))) => Some(Literal::Number(*n)),
            (TokenType::String, Some(TokenLiteral::String(s))) => Some(Literal::String(s.clone())),
            (TokenType::True, _) => Some(Literal::Boolean(true)),
            (TokenType::False, _) => Some(Literal::Boolean(false)),
            (TokenType::Null, _) => Some(Literal::Null),
            (TokenType::Undefined, _) => Some(Literal::Undefined),
            _ => None,
        };
        if let Some(value) = literal {
            self.check_node_allowed(NodeType::LiteralExpression, token.location)?;
            self.advance();
            return Ok(Expression::Literal {
                value,
                location: token.location,
            });
        }

        match token.token_type {
            TokenType::Identifier => {
                self.check_node_allowed(NodeType::IdentifierExpression, token.location)?;
                self.advance();
                Ok(Expression::Identifier {
                    name: token.lexeme,
                    location: token.location,
                })
            }
            TokenType::LeftParen => {
                self.check_node_allowed(NodeType::GroupingExpression, token.location)?;
                self.advance();
                let inner = self.expression()?;
                let close = self.consume(TokenType::RightParen, SyntaxErrorType::MissingRightParenthesisAfterExpression)?;
                Ok(Expression::Grouping {
                    inner: Box::new(inner),
                    location: Location::between(token.location, close.location),
                })
            }
            TokenType::Backtick => self.template_literal(),
            TokenType::LeftBracket => self.array_literal(),
            TokenType::LeftBrace => self.dictionary_literal(),
            TokenType::Function => self.function_expression(),
            _ => Err(self.unexpected_token()),
        }
    }

    fn template_literal(&mut self) -> ParseResult<Expression> {
        let start = self.advance().location;
        self.check_node_allowed(NodeType::TemplateLiteralExpression, start)?;

        let mut parts = Vec::new();
        loop {
            let token = self.advance();
            match token.token_type {
                TokenType::Backtick => break,
                TokenType::TemplateLiteralText => {
                    if let Some(TokenLiteral::String(text)) = token.literal {
                        parts.push(TemplatePart::Text(text));
                    }
                }
                TokenType::DollarLeftBrace => {
                    let expr = self.expression()?;
                    self.consume(TokenType::RightBrace, SyntaxErrorType::MissingTemplateClosingBrace)?;
                    parts.push(TemplatePart::Interpolation(expr));
                }
                _ => {
                    return Err(self.error(
                        SyntaxErrorType::MissingBacktickToTerminateTemplateLiteral,
                        token.location,
                    ))
                }
            }
        }

        Ok(Expression::TemplateLiteral {
            parts,
            location: self.span_from(start),
        })
    }

    fn array_literal(&mut self) -> ParseResult<Expression> {
        let start = self.advance().location;
        self.check_node_allowed(NodeType::ArrayExpression, start)?;

        let mut elements = Vec::new();
        self.skip_eols();
        if self.check(TokenType::Comma) {
            return Err(self.error(SyntaxErrorType::TrailingCommaInArray, self.current_location()));
        }

        if !self.check(TokenType::RightBracket) {
            loop {
                elements.push(self.expression()?);
                self.skip_eols();
                if !self.match_token(TokenType::Comma) {
                    break;
                }
                self.skip_eols();
                if self.check(TokenType::RightBracket) || self.check(TokenType::Comma) {
                    return Err(self.error(SyntaxErrorType::TrailingCommaInArray, self.previous().location));
                }
            }
        }

        self.consume(TokenType::RightBracket, SyntaxErrorType::MissingRightBracketInArray)?;
        Ok(Expression::Array {
            elements,
            location: self.span_from(start),
        })
    }

    fn dictionary_literal(&mut self) -> ParseResult<Expression> {
        let start = self.advance().location;
        self.check_node_allowed(NodeType::DictionaryExpression, start)?;

        let mut entries: Vec<(String, Expression)> = Vec::new();
        self.skip_eols();

        if !self.check(TokenType::RightBrace) {
            loop {
                let key_token = self.peek().clone();
                let key = match (key_token.token_type, &key_token.literal) {
                    (TokenType::String, Some(TokenLiteral::String(s))) => s.clone(),
                    (TokenType::Number, Some(TokenLiteral::Number(n))) => format_number(*n),
                    (tt, _) if tt == TokenType::Identifier || tt.is_keyword() => key_token.lexeme.clone(),
                    _ => return Err(self.error(SyntaxErrorType::InvalidDictionaryKey, key_token.location)),
                };
                self.advance();

                if entries.iter().any(|(existing, _)| *existing == key) {
                    return Err(self.error_with_context(
                        SyntaxErrorType::DuplicateDictionaryKey,
                        key_token.location,
                        context([("key", &key)]),
                    ));
                }

                self.consume(TokenType::Colon, SyntaxErrorType::MissingColonInDictionary)?;
                self.skip_eols();
                let value = self.expression()?;
                entries.push((key, value));

                self.skip_eols();
                if !self.match_token(TokenType::Comma) {
                    break;
                }
                self.skip_eols();
                if self.check(TokenType::RightBrace) {
                    return Err(self.error(SyntaxErrorType::TrailingCommaInDictionary, self.previous().location));
                }
            }
        }

        self.consume(TokenType::RightBrace, SyntaxErrorType::MissingRightBraceInDictionary)?;
        Ok(Expression::Dictionary {
            entries,
            location: self.span_from(start),
        })
    }
}

fn is_assignable(expr: &Expression) -> bool {
    matches!(expr, Expression::Identifier { .. } | Expression::Member { .. })
}

fn update_operator(token_type: TokenType) -> UpdateOperator {
    if token_type == TokenType::Increment {
        UpdateOperator::Increment
    } else {
        UpdateOperator::Decrement
    }
}

/// Readable name of a call target, e.g. `console.log`.
pub(crate) fn callee_name(callee: &Expression) -> String {
    match callee {
        Expression::Identifier { name, .. } => name.clone(),
        Expression::Member {
            object,
            property,
            computed: false,
            ..
        } => match property.as_ref() {
            Expression::Literal {
                value: Literal::String(name),
                ..
            } => format!("{}.{}", callee_name(object), name),
            _ => callee_name(object),
        },
        Expression::Function { declaration, .. } => declaration.name.clone(),
        _ => "function".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::features::LanguageFeatures;
    use crate::parser::ast::*;
    use crate::parser::parse_program;
    use crate::translator::Translator;

    fn parse_expr(source: &str) -> Expression {
        let program = parse_program(source, &LanguageFeatures::default(), &Translator::english()).unwrap();
        match program.into_iter().next() {
            Some(Statement::Expression { expression, .. }) => expression,
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    fn parse_err(source: &str) -> String {
        parse_program(source, &LanguageFeatures::default(), &Translator::english())
            .unwrap_err()
            .type_name()
    }

    #[test]
    fn test_precedence() {
        // 1 + (2 * 3)
        match parse_expr("1 + 2 * 3") {
            Expression::Binary {
                operator: BinaryOperator::Plus,
                right,
                ..
            } => assert!(matches!(*right, Expression::Binary { operator: BinaryOperator::Star, .. })),
            other => panic!("Unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_exponent_is_right_associative() {
        match parse_expr("2 ** 3 ** 2") {
            Expression::Binary {
                operator: BinaryOperator::StarStar,
                left,
                right,
                ..
            } => {
                assert!(matches!(*left, Expression::Literal { .. }));
                assert!(matches!(*right, Expression::Binary { operator: BinaryOperator::StarStar, .. }));
            }
            other => panic!("Unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_assignment_targets() {
        assert!(matches!(parse_expr("x = 1"), Expression::Assignment { .. }));
        assert!(matches!(parse_expr("a.b = 1"), Expression::Assignment { .. }));
        assert!(matches!(parse_expr("a[0] = 1"), Expression::Assignment { .. }));
        assert_eq!(parse_err("1 = x"), "InvalidAssignmentTargetExpression");
        assert_eq!(parse_err("(1 + 2)++"), "InvalidUpdateTarget");
    }

    #[test]
    fn test_member_and_call_chain() {
        match parse_expr("console.log(xs[0], 'a')") {
            Expression::Call { callee, args, .. } => {
                assert_eq!(args.len(), 2);
                assert_eq!(callee.node_type(), NodeType::MemberExpression);
                assert_eq!(args[0].node_type(), NodeType::IndexExpression);
            }
            other => panic!("Unexpected tree {:?}", other),
        }
        // Keywords are fine as property names
        assert!(matches!(parse_expr("obj.in"), Expression::Member { computed: false, .. }));
    }

    #[test]
    fn test_template_literal_parts() {
        match parse_expr("`Hi ${name}!`") {
            Expression::TemplateLiteral { parts, .. } => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], TemplatePart::Text("Hi ".to_string()));
                assert!(matches!(&parts[1], TemplatePart::Interpolation(Expression::Identifier { .. })));
            }
            other => panic!("Unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_array_literals() {
        match parse_expr("[1,\n 2,\n 3]") {
            Expression::Array { elements, .. } => assert_eq!(elements.len(), 3),
            other => panic!("Unexpected tree {:?}", other),
        }
        assert_eq!(parse_err("[1, 2,]"), "TrailingCommaInArray");
        assert_eq!(parse_err("[, 1]"), "TrailingCommaInArray");
        assert_eq!(parse_err("[1, 2"), "MissingRightBracketInArray");
    }

    #[test]
    fn test_dictionary_literals() {
        let program = parse_program(
            "let d = { a: 1, 'b c': 2, 3: true }",
            &LanguageFeatures::default(),
            &Translator::english(),
        )
        .unwrap();
        match &program[0] {
            Statement::VariableDeclaration {
                initializer: Some(Expression::Dictionary { entries, .. }),
                ..
            } => {
                let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["a", "b c", "3"]);
            }
            other => panic!("Unexpected tree {:?}", other),
        }

        assert_eq!(parse_err("let d = { a: 1, a: 2 }"), "DuplicateDictionaryKey");
        assert_eq!(parse_err("let d = { a 1 }"), "MissingColonInDictionary");
        assert_eq!(parse_err("let d = { a: 1, }"), "TrailingCommaInDictionary");
        assert_eq!(parse_err("let d = { [a]: 1 }"), "InvalidDictionaryKey");
    }

    #[test]
    fn test_grouping_and_call_errors() {
        assert_eq!(parse_err("(1 + 2"), "MissingRightParenthesisAfterExpression");
        assert_eq!(parse_err("f(1, 2"), "MissingRightParenthesisAfterFunctionCall");
        assert_eq!(parse_err("a."), "MissingPropertyName");
        assert_eq!(parse_err("a[0"), "MissingRightBracketInIndex");
        assert_eq!(parse_err("x = "), "MissingExpression");
    }
}
