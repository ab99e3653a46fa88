//! JavaScript source parser
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens), including the
//!   include/exclude list checks
//! - [`parse`]: the [`Parser`] core; grammar rules live in `statements`,
//!   `declarations` and `expressions`
//! - [`ast`]: AST node definitions
//! - [`errors`]: syntax and disabled-feature errors
//!
//! # Supported subset
//!
//! - Declarations: `let`, `const`, top-level `function`
//! - Control flow: `if`/`else`, `while`, C-style `for`, `for...of`,
//!   `for...in`, `repeat`, `break`, `continue`, `return`
//! - Expressions: arithmetic, comparison, logical, `in`, `++`/`--`,
//!   template literals, arrays, object literals, member access, calls and
//!   anonymous function expressions
//!
//! Statements end at a semicolon or a line break. Hand-written recursive
//! descent; no external parser generator.

pub mod ast;
mod declarations;
pub mod errors;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use declarations::ANONYMOUS_FUNCTION_NAME;
pub(crate) use expressions::callee_name;
pub use parse::Parser;

use crate::features::LanguageFeatures;
use crate::translator::Translator;
use ast::Statement;
use errors::CompileError;
use lexer::Lexer;

/// Scan and parse `source` in one go.
pub fn parse_program(
    source: &str,
    features: &LanguageFeatures,
    translator: &Translator,
) -> Result<Vec<Statement>, CompileError> {
    let tokens = Lexer::new(source, features, translator).tokenize()?;
    let statements = Parser::new(tokens, features, translator).parse()?;
    Ok(statements)
}
