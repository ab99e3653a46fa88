//! Scanner: source text to tokens
//!
//! A single left-to-right pass over the source characters with one character
//! of lookahead past the current one. Besides the ordinary tokens it
//!
//! - synthesises an `EOL` token at each newline that ends a statement
//!   (never directly after another `EOL` or a `;`) and a trailing `EOF`,
//! - splits template literals into `BACKTICK`, `TEMPLATE_LITERAL_TEXT` and
//!   `DOLLAR_LEFT_BRACE ... RIGHT_BRACE` pieces, re-entering the normal scan
//!   loop for each interpolation,
//! - checks every token against the configured include/exclude lists and
//!   rejects tokens this dialect does not implement.

use crate::features::LanguageFeatures;
use crate::parser::ast::Location;
use crate::parser::errors::{
    CompileError, DisabledLanguageFeatureError, DisabledLanguageFeatureErrorType, SyntaxError, SyntaxErrorType,
};
use crate::translator::{context, ErrorContext, Translator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token kinds. Serialised as `SCREAMING_SNAKE_CASE` (`LEFT_PAREN`, `STAR_STAR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Not,
    Equal,
    Greater,
    Less,
    Question,
    Ampersand,
    Pipe,
    Caret,
    Tilde,

    // Multi-character operators
    StarStar,
    Increment,
    Decrement,
    EqualEqual,
    StrictEqual,
    NotEqual,
    NotStrictEqual,
    GreaterEqual,
    LessEqual,
    LogicalAnd,
    LogicalOr,
    Arrow,
    PlusEqual,
    MinusEqual,
    MultiplyEqual,
    DivideEqual,
    ModuloEqual,
    LeftShift,
    RightShift,
    AndEqual,
    OrEqual,
    XorEqual,

    // Template literals
    Backtick,
    TemplateLiteralText,
    DollarLeftBrace,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Export,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    Let,
    New,
    Null,
    Of,
    Repeat,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Undefined,
    Var,
    Void,
    While,
    With,
    Yield,

    // Structural
    Eol,
    Eof,
}

impl TokenType {
    /// `SCREAMING_SNAKE_CASE` name, matching the serialised form.
    pub fn name(&self) -> String {
        let debug = format!("{:?}", self);
        let mut name = String::with_capacity(debug.len() + 4);
        for (i, ch) in debug.chars().enumerate() {
            if ch.is_ascii_uppercase() && i > 0 {
                name.push('_');
            }
            name.push(ch.to_ascii_uppercase());
        }
        name
    }

    /// Planned for a later version of the dialect.
    pub fn is_unimplemented(&self) -> bool {
        matches!(
            self,
            TokenType::Case
                | TokenType::Catch
                | TokenType::Class
                | TokenType::Default
                | TokenType::Do
                | TokenType::Extends
                | TokenType::Finally
                | TokenType::Instanceof
                | TokenType::New
                | TokenType::Super
                | TokenType::Switch
                | TokenType::This
                | TokenType::Throw
                | TokenType::Try
                | TokenType::Typeof
                | TokenType::Question
                | TokenType::Arrow
                | TokenType::PlusEqual
                | TokenType::MinusEqual
                | TokenType::MultiplyEqual
                | TokenType::DivideEqual
                | TokenType::ModuloEqual
        )
    }

    /// Never part of the taught dialect.
    pub fn is_permanently_excluded(&self) -> bool {
        matches!(
            self,
            TokenType::Var
                | TokenType::With
                | TokenType::Debugger
                | TokenType::Void
                | TokenType::Yield
                | TokenType::Delete
                | TokenType::Import
                | TokenType::Export
                | TokenType::Ampersand
                | TokenType::Pipe
                | TokenType::Caret
                | TokenType::Tilde
                | TokenType::LeftShift
                | TokenType::RightShift
                | TokenType::AndEqual
                | TokenType::OrEqual
                | TokenType::XorEqual
        )
    }

    /// Keywords may still be used as property names after a dot.
    pub fn is_keyword(&self) -> bool {
        keyword(&self.name().to_ascii_lowercase()) == Some(*self)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn keyword(lexeme: &str) -> Option<TokenType> {
    let token_type = match lexeme {
        "break" => TokenType::Break,
        "case" => TokenType::Case,
        "catch" => TokenType::Catch,
        "class" => TokenType::Class,
        "const" => TokenType::Const,
        "continue" => TokenType::Continue,
        "debugger" => TokenType::Debugger,
        "default" => TokenType::Default,
        "delete" => TokenType::Delete,
        "do" => TokenType::Do,
        "else" => TokenType::Else,
        "export" => TokenType::Export,
        "extends" => TokenType::Extends,
        "false" => TokenType::False,
        "finally" => TokenType::Finally,
        "for" => TokenType::For,
        "function" => TokenType::Function,
        "if" => TokenType::If,
        "import" => TokenType::Import,
        "in" => TokenType::In,
        "instanceof" => TokenType::Instanceof,
        "let" => TokenType::Let,
        "new" => TokenType::New,
        "null" => TokenType::Null,
        "of" => TokenType::Of,
        "repeat" => TokenType::Repeat,
        "return" => TokenType::Return,
        "super" => TokenType::Super,
        "switch" => TokenType::Switch,
        "this" => TokenType::This,
        "throw" => TokenType::Throw,
        "true" => TokenType::True,
        "try" => TokenType::Try,
        "typeof" => TokenType::Typeof,
        "undefined" => TokenType::Undefined,
        "var" => TokenType::Var,
        "void" => TokenType::Void,
        "while" => TokenType::While,
        "with" => TokenType::With,
        "yield" => TokenType::Yield,
        _ => return None,
    };
    Some(token_type)
}

/// Literal payload of `NUMBER`, `STRING` and `TEMPLATE_LITERAL_TEXT` tokens
#[derive(Debug, Clone, PartialEq)]
pub enum TokenLiteral {
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub literal: Option<TokenLiteral>,
    pub location: Location,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_type {
            TokenType::Eol => f.write_str("end of line"),
            TokenType::Eof => f.write_str("end of file"),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

pub struct Lexer<'a> {
    input: Vec<char>,
    features: &'a LanguageFeatures,
    translator: &'a Translator,
    tokens: Vec<Token>,
    position: usize,
    line: usize,
    line_start: usize,
    // Position, line and column where the current token began
    start: usize,
    start_line: usize,
    start_column: usize,
    // > 0 while scanning inside `${ ... }`
    interpolation_depth: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &str, features: &'a LanguageFeatures, translator: &'a Translator) -> Self {
        Lexer {
            input: input.chars().collect(),
            features,
            translator,
            tokens: Vec::new(),
            position: 0,
            line: 1,
            line_start: 0,
            start: 0,
            start_line: 1,
            start_column: 1,
            interpolation_depth: 0,
        }
    }

    /// Scan the whole input.
    pub fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        while !self.is_at_end() {
            self.begin_token();
            self.scan_token()?;
        }

        self.begin_token();
        if self.should_add_eol() {
            self.add_synthetic_token(TokenType::Eol, "\n");
        }
        self.add_synthetic_token(TokenType::Eof, "");

        tracing::debug!(tokens = self.tokens.len(), "scanned source");
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), CompileError> {
        let Some(ch) = self.advance() else {
            return Ok(());
        };

        match ch {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            '[' => self.add_token(TokenType::LeftBracket),
            ']' => self.add_token(TokenType::RightBracket),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            ':' => self.add_token(TokenType::Colon),
            ';' => self.add_token(TokenType::Semicolon),
            '?' => self.add_token(TokenType::Question),
            '~' => self.add_token(TokenType::Tilde),
            '+' => {
                let token_type = if self.match_char('+') {
                    TokenType::Increment
                } else if self.match_char('=') {
                    TokenType::PlusEqual
                } else {
                    TokenType::Plus
                };
                self.add_token(token_type)
            }
            '-' => {
                let token_type = if self.match_char('-') {
                    TokenType::Decrement
                } else if self.match_char('=') {
                    TokenType::MinusEqual
                } else {
                    TokenType::Minus
                };
                self.add_token(token_type)
            }
            '*' => {
                let token_type = if self.match_char('*') {
                    TokenType::StarStar
                } else if self.match_char('=') {
                    TokenType::MultiplyEqual
                } else {
                    TokenType::Star
                };
                self.add_token(token_type)
            }
            '/' => {
                if self.match_char('/') {
                    self.skip_line_comment();
                    Ok(())
                } else if self.match_char('*') {
                    self.skip_block_comment()
                } else if self.match_char('=') {
                    self.add_token(TokenType::DivideEqual)
                } else {
                    self.add_token(TokenType::Slash)
                }
            }
            '%' => {
                let token_type = if self.match_char('=') {
                    TokenType::ModuloEqual
                } else {
                    TokenType::Percent
                };
                self.add_token(token_type)
            }
            '^' => {
                let token_type = if self.match_char('=') {
                    TokenType::XorEqual
                } else {
                    TokenType::Caret
                };
                self.add_token(token_type)
            }
            '!' => {
                let token_type = if self.match_char('=') {
                    if self.match_char('=') {
                        TokenType::NotStrictEqual
                    } else {
                        TokenType::NotEqual
                    }
                } else {
                    TokenType::Not
                };
                self.add_token(token_type)
            }
            '=' => {
                let token_type = if self.match_char('=') {
                    if self.match_char('=') {
                        TokenType::StrictEqual
                    } else {
                        TokenType::EqualEqual
                    }
                } else if self.match_char('>') {
                    TokenType::Arrow
                } else {
                    TokenType::Equal
                };
                self.add_token(token_type)
            }
            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else if self.match_char('>') {
                    TokenType::RightShift
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type)
            }
            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else if self.match_char('<') {
                    TokenType::LeftShift
                } else {
                    TokenType::Less
                };
                self.add_token(token_type)
            }
            '&' => {
                let token_type = if self.match_char('&') {
                    TokenType::LogicalAnd
                } else if self.match_char('=') {
                    TokenType::AndEqual
                } else {
                    TokenType::Ampersand
                };
                self.add_token(token_type)
            }
            '|' => {
                let token_type = if self.match_char('|') {
                    TokenType::LogicalOr
                } else if self.match_char('=') {
                    TokenType::OrEqual
                } else {
                    TokenType::Pipe
                };
                self.add_token(token_type)
            }
            ' ' | '\t' | '\r' => Ok(()),
            '\n' => {
                // Interpolations never end a statement
                if self.interpolation_depth == 0 && self.should_add_eol() {
                    self.add_token(TokenType::Eol)?;
                }
                Ok(())
            }
            '"' | '\'' => self.string_literal(ch),
            '`' => self.template_literal(),
            '0'..='9' => self.number_literal(),
            c if is_identifier_start(c) => self.identifier_or_keyword(),
            other => Err(self.syntax_error(
                SyntaxErrorType::UnknownCharacter,
                context([("character", other)]),
            )),
        }
    }

    fn string_literal(&mut self, quote: char) -> Result<(), CompileError> {
        let mut value = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    let error_type = if quote == '"' {
                        SyntaxErrorType::MissingDoubleQuoteToTerminateString
                    } else {
                        SyntaxErrorType::MissingSingleQuoteToTerminateString
                    };
                    return Err(self.syntax_error(error_type, context([("string", value)])));
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(escaped) = self.advance() {
                        value.push(unescape(escaped));
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        self.add_token_with_literal(TokenType::String, Some(TokenLiteral::String(value)))
    }

    fn template_literal(&mut self) -> Result<(), CompileError> {
        self.add_token(TokenType::Backtick)?;

        loop {
            self.begin_token();
            match self.peek() {
                None => {
                    return Err(self.syntax_error(
                        SyntaxErrorType::MissingBacktickToTerminateTemplateLiteral,
                        ErrorContext::new(),
                    ))
                }
                Some('`') => {
                    self.advance();
                    return self.add_token(TokenType::Backtick);
                }
                Some('$') if self.peek_ahead(1) == Some('{') => {
                    self.advance();
                    self.advance();
                    self.add_token(TokenType::DollarLeftBrace)?;
                    self.template_interpolation()?;
                }
                Some(_) => {
                    let mut text = String::new();
                    while let Some(c) = self.peek() {
                        if c == '`' || (c == '$' && self.peek_ahead(1) == Some('{')) {
                            break;
                        }
                        self.advance();
                        if c == '\\' {
                            if let Some(escaped) = self.advance() {
                                text.push(unescape(escaped));
                            }
                        } else {
                            text.push(c);
                        }
                    }
                    self.add_token_with_literal(TokenType::TemplateLiteralText, Some(TokenLiteral::String(text)))?;
                }
            }
        }
    }

    /// Scan tokens inside `${ ... }` up to and including the matching `}`.
    fn template_interpolation(&mut self) -> Result<(), CompileError> {
        self.interpolation_depth += 1;
        let mut brace_depth = 0usize;

        loop {
            self.begin_token();
            match self.peek() {
                None => {
                    self.interpolation_depth -= 1;
                    return Err(self.syntax_error(
                        SyntaxErrorType::MissingBacktickToTerminateTemplateLiteral,
                        ErrorContext::new(),
                    ));
                }
                Some('}') if brace_depth == 0 => {
                    self.advance();
                    self.interpolation_depth -= 1;
                    return self.add_token(TokenType::RightBrace);
                }
                Some('{') => brace_depth += 1,
                Some('}') => brace_depth -= 1,
                _ => {}
            }
            self.scan_token()?;
        }
    }

    fn number_literal(&mut self) -> Result<(), CompileError> {
        let first = self.input[self.start];
        if first == '0' {
            let radix = match self.peek() {
                Some('x') | Some('X') => Some(16),
                Some('b') | Some('B') => Some(2),
                Some('o') | Some('O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                let digits_start = self.position;
                while self.peek().is_some_and(|c| c.is_digit(radix)) {
                    self.advance();
                }
                let digits: String = self.input[digits_start..self.position].iter().collect();
                let value = u64::from_str_radix(&digits, radix).unwrap_or(0) as f64;
                return self.add_token_with_literal(TokenType::Number, Some(TokenLiteral::Number(value)));
            }
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign_offset = usize::from(matches!(self.peek_ahead(1), Some('+') | Some('-')));
            if self.peek_ahead(1 + sign_offset).is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                if sign_offset == 1 {
                    self.advance();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let text = self.lexeme();
        let value = text.parse::<f64>().unwrap_or(f64::NAN);
        self.add_token_with_literal(TokenType::Number, Some(TokenLiteral::Number(value)))
    }

    fn identifier_or_keyword(&mut self) -> Result<(), CompileError> {
        while self.peek().is_some_and(is_identifier_part) {
            self.advance();
        }

        let token_type = keyword(&self.lexeme()).unwrap_or(TokenType::Identifier);
        self.add_token(token_type)
    }

    fn skip_line_comment(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), CompileError> {
        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(self.syntax_error(SyntaxErrorType::UnterminatedComment, ErrorContext::new()))
    }

    fn should_add_eol(&self) -> bool {
        self.tokens
            .last()
            .is_some_and(|token| !matches!(token.token_type, TokenType::Eol | TokenType::Semicolon))
    }

    fn add_token(&mut self, token_type: TokenType) -> Result<(), CompileError> {
        self.add_token_with_literal(token_type, None)
    }

    fn add_token_with_literal(
        &mut self,
        token_type: TokenType,
        literal: Option<TokenLiteral>,
    ) -> Result<(), CompileError> {
        let lexeme = self.lexeme();
        self.verify_enabled(token_type, &lexeme)?;

        if token_type.is_permanently_excluded() {
            return Err(self.syntax_error(
                SyntaxErrorType::PermanentlyExcludedToken,
                context([("tokenType", token_type.name()), ("lexeme", lexeme)]),
            ));
        }
        if token_type.is_unimplemented() {
            return Err(self.syntax_error(
                SyntaxErrorType::UnimplementedToken,
                context([("tokenType", token_type.name()), ("lexeme", lexeme)]),
            ));
        }

        let location = self.token_location();
        self.tokens.push(Token {
            token_type,
            lexeme,
            literal,
            location,
        });
        Ok(())
    }

    fn add_synthetic_token(&mut self, token_type: TokenType, lexeme: &str) {
        let location = self.token_location();
        self.tokens.push(Token {
            token_type,
            lexeme: lexeme.to_string(),
            literal: None,
            location,
        });
    }

    fn verify_enabled(&self, token_type: TokenType, lexeme: &str) -> Result<(), CompileError> {
        if matches!(token_type, TokenType::Eol | TokenType::Eof) {
            return Ok(());
        }

        let violation = if self.features.is_token_excluded(token_type) {
            Some(DisabledLanguageFeatureErrorType::DisabledFeatureExcludeListViolation)
        } else if !self.features.is_token_included(token_type) {
            Some(DisabledLanguageFeatureErrorType::DisabledFeatureIncludeListViolation)
        } else {
            None
        };

        match violation {
            None => Ok(()),
            Some(error_type) => Err(DisabledLanguageFeatureError::new(
                self.translator,
                error_type,
                self.token_location(),
                context([("tokenType", token_type.name()), ("lexeme", lexeme.to_string())]),
            )
            .into()),
        }
    }

    fn syntax_error(&self, error_type: SyntaxErrorType, context: ErrorContext) -> CompileError {
        SyntaxError::new(self.translator, error_type, self.token_location(), context).into()
    }

    fn begin_token(&mut self) {
        self.start = self.position;
        self.start_line = self.line;
        self.start_column = self.position - self.line_start + 1;
    }

    fn token_location(&self) -> Location {
        let col_end = if self.line == self.start_line {
            self.position - self.line_start + 1
        } else {
            self.start_column + 1
        };
        Location::new(self.start_line, self.start_column, col_end, self.start, self.position)
    }

    fn lexeme(&self) -> String {
        self.input[self.start..self.position].iter().collect()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.line_start = self.position;
        }
        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}
