//! Abstract syntax tree for the JavaScript subset
//!
//! Nodes are closed enums with struct variants. Every node carries its own
//! [`Location`]; there are no parent pointers. Traversal over sub-expressions
//! goes through [`Expression::children`] and [`Statement::children`], which
//! only ever return *expression* children. Nested statements (block bodies,
//! loop bodies) are reached by matching on the statement variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Source span attached to every token, node and error.
///
/// Lines and columns are 1-based; `abs_start..abs_end` is a half-open range of
/// character offsets into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub line: usize,
    pub col_start: usize,
    pub col_end: usize,
    pub abs_start: usize,
    pub abs_end: usize,
}

impl Location {
    /// Location used for engine-provided bindings that have no source text.
    pub const UNKNOWN: Location = Location {
        line: 0,
        col_start: 0,
        col_end: 0,
        abs_start: 0,
        abs_end: 0,
    };

    pub fn new(line: usize, col_start: usize, col_end: usize, abs_start: usize, abs_end: usize) -> Self {
        Location {
            line,
            col_start,
            col_end,
            abs_start,
            abs_end,
        }
    }

    /// Span from the start of `start` to the end of `end`.
    pub fn between(start: Location, end: Location) -> Self {
        Location {
            line: start.line,
            col_start: start.col_start,
            col_end: if end.line == start.line {
                end.col_end
            } else {
                start.col_end
            },
            abs_start: start.abs_start,
            abs_end: end.abs_end.max(start.abs_end),
        }
    }

    /// The source text covered by this location.
    pub fn to_code(&self, source: &str) -> String {
        source
            .chars()
            .skip(self.abs_start)
            .take(self.abs_end.saturating_sub(self.abs_start))
            .collect()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col_start)
    }
}

/// Node kinds, used by the `allowedNodes` restriction and by frames.
///
/// `IndexExpression` is the computed (`a[b]`) form of a member access; it is
/// gated separately from dot access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    // Statements
    ExpressionStatement,
    VariableDeclaration,
    FunctionDeclaration,
    BlockStatement,
    IfStatement,
    WhileStatement,
    ForStatement,
    ForOfStatement,
    ForInStatement,
    RepeatStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    // Expressions
    LiteralExpression,
    BinaryExpression,
    UnaryExpression,
    GroupingExpression,
    IdentifierExpression,
    AssignmentExpression,
    UpdateExpression,
    TemplateLiteralExpression,
    ArrayExpression,
    DictionaryExpression,
    MemberExpression,
    IndexExpression,
    CallExpression,
    FunctionExpression,
}

impl NodeType {
    /// Human-readable name used in "not available yet" messages.
    pub fn friendly_name(&self) -> &'static str {
        match self {
            NodeType::ExpressionStatement => "Expressions",
            NodeType::VariableDeclaration => "Variable declarations",
            NodeType::FunctionDeclaration => "Functions",
            NodeType::BlockStatement => "Blocks",
            NodeType::IfStatement => "If statements",
            NodeType::WhileStatement => "While loops",
            NodeType::ForStatement => "For loops",
            NodeType::ForOfStatement => "For...of loops",
            NodeType::ForInStatement => "For...in loops",
            NodeType::RepeatStatement => "Repeat loops",
            NodeType::ReturnStatement => "Return statements",
            NodeType::BreakStatement => "Break statements",
            NodeType::ContinueStatement => "Continue statements",
            NodeType::LiteralExpression => "Literals",
            NodeType::BinaryExpression => "Operators",
            NodeType::UnaryExpression => "Unary operators",
            NodeType::GroupingExpression => "Parentheses",
            NodeType::IdentifierExpression => "Variables",
            NodeType::AssignmentExpression => "Assignments",
            NodeType::UpdateExpression => "Increment and decrement",
            NodeType::TemplateLiteralExpression => "Template literals",
            NodeType::ArrayExpression => "Arrays",
            NodeType::DictionaryExpression => "Objects",
            NodeType::MemberExpression => "Property access",
            NodeType::IndexExpression => "Indexing",
            NodeType::CallExpression => "Function calls",
            NodeType::FunctionExpression => "Function expressions",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Literal values that appear directly in source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    EqualEqual,
    NotEqual,
    StrictEqual,
    NotStrictEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    LogicalAnd,
    LogicalOr,
    In,
}

impl BinaryOperator {
    pub fn lexeme(&self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Star => "*",
            BinaryOperator::Slash => "/",
            BinaryOperator::Percent => "%",
            BinaryOperator::StarStar => "**",
            BinaryOperator::EqualEqual => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::NotStrictEqual => "!==",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
            BinaryOperator::In => "in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Plus,
    Not,
}

impl UnaryOperator {
    pub fn lexeme(&self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

impl UpdateOperator {
    pub fn lexeme(&self) -> &'static str {
        match self {
            UpdateOperator::Increment => "++",
            UpdateOperator::Decrement => "--",
        }
    }
}

/// One piece of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    Interpolation(Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Let,
    Const,
}

impl DeclarationKind {
    pub fn is_const(&self) -> bool {
        matches!(self, DeclarationKind::Const)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: Location,
}

/// A named function (or an anonymous function expression).
///
/// Shared behind an `Rc` so callables can hold on to their declaration
/// without copying the body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub params: Vec<Parameter>,
    pub body: Vec<Statement>,
    pub location: Location,
}

/// Loop variable introduced by `for (let x of ...)` / `for (const k in ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopVariable {
    pub name: String,
    pub kind: DeclarationKind,
    pub location: Location,
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal {
        value: Literal,
        location: Location,
    },
    Binary {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
        location: Location,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
        location: Location,
    },
    Grouping {
        inner: Box<Expression>,
        location: Location,
    },
    Identifier {
        name: String,
        location: Location,
    },
    /// `target = value` where target is an identifier or a member expression
    Assignment {
        target: Box<Expression>,
        value: Box<Expression>,
        location: Location,
    },
    Update {
        operator: UpdateOperator,
        operand: Box<Expression>,
        prefix: bool,
        location: Location,
    },
    TemplateLiteral {
        parts: Vec<TemplatePart>,
        location: Location,
    },
    Array {
        elements: Vec<Expression>,
        location: Location,
    },
    /// Entries keep source order; keys are already normalised to strings.
    Dictionary {
        entries: Vec<(String, Expression)>,
        location: Location,
    },
    /// `object.property` (property is a string literal) or `object[property]`
    Member {
        object: Box<Expression>,
        property: Box<Expression>,
        computed: bool,
        location: Location,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
        location: Location,
    },
    Function {
        declaration: Rc<FunctionDeclaration>,
        location: Location,
    },
}

impl Expression {
    pub fn location(&self) -> Location {
        match self {
            Expression::Literal { location, .. }
            | Expression::Binary { location, .. }
            | Expression::Unary { location, .. }
            | Expression::Grouping { location, .. }
            | Expression::Identifier { location, .. }
            | Expression::Assignment { location, .. }
            | Expression::Update { location, .. }
            | Expression::TemplateLiteral { location, .. }
            | Expression::Array { location, .. }
            | Expression::Dictionary { location, .. }
            | Expression::Member { location, .. }
            | Expression::Call { location, .. }
            | Expression::Function { location, .. } => *location,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Expression::Literal { .. } => NodeType::LiteralExpression,
            Expression::Binary { .. } => NodeType::BinaryExpression,
            Expression::Unary { .. } => NodeType::UnaryExpression,
            Expression::Grouping { .. } => NodeType::GroupingExpression,
            Expression::Identifier { .. } => NodeType::IdentifierExpression,
            Expression::Assignment { .. } => NodeType::AssignmentExpression,
            Expression::Update { .. } => NodeType::UpdateExpression,
            Expression::TemplateLiteral { .. } => NodeType::TemplateLiteralExpression,
            Expression::Array { .. } => NodeType::ArrayExpression,
            Expression::Dictionary { .. } => NodeType::DictionaryExpression,
            Expression::Member { computed: false, .. } => NodeType::MemberExpression,
            Expression::Member { computed: true, .. } => NodeType::IndexExpression,
            Expression::Call { .. } => NodeType::CallExpression,
            Expression::Function { .. } => NodeType::FunctionExpression,
        }
    }

    /// Immediate expression children, in evaluation order.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal { .. } | Expression::Identifier { .. } | Expression::Function { .. } => {
                Vec::new()
            }
            Expression::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::Unary { operand, .. } | Expression::Update { operand, .. } => vec![operand.as_ref()],
            Expression::Grouping { inner, .. } => vec![inner.as_ref()],
            Expression::Assignment { target, value, .. } => vec![target.as_ref(), value.as_ref()],
            Expression::TemplateLiteral { parts, .. } => parts
                .iter()
                .filter_map(|part| match part {
                    TemplatePart::Interpolation(expr) => Some(expr),
                    TemplatePart::Text(_) => None,
                })
                .collect(),
            Expression::Array { elements, .. } => elements.iter().collect(),
            Expression::Dictionary { entries, .. } => entries.iter().map(|(_, value)| value).collect(),
            Expression::Member { object, property, .. } => vec![object.as_ref(), property.as_ref()],
            Expression::Call { callee, args, .. } => {
                let mut children = vec![callee.as_ref()];
                children.extend(args.iter());
                children
            }
        }
    }
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression {
        expression: Expression,
        location: Location,
    },
    VariableDeclaration {
        name: String,
        kind: DeclarationKind,
        initializer: Option<Expression>,
        name_location: Location,
        location: Location,
    },
    FunctionDeclaration(Rc<FunctionDeclaration>),
    Block {
        statements: Vec<Statement>,
        location: Location,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        location: Location,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
        location: Location,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
        location: Location,
    },
    ForOf {
        variable: LoopVariable,
        iterable: Expression,
        body: Box<Statement>,
        location: Location,
    },
    ForIn {
        variable: LoopVariable,
        object: Expression,
        body: Box<Statement>,
        location: Location,
    },
    /// `repeat (count) body`; a missing count repeats until the loop guard trips
    Repeat {
        count: Option<Expression>,
        body: Box<Statement>,
        location: Location,
    },
    Return {
        value: Option<Expression>,
        location: Location,
    },
    Break {
        location: Location,
    },
    Continue {
        location: Location,
    },
}

impl Statement {
    pub fn location(&self) -> Location {
        match self {
            Statement::FunctionDeclaration(declaration) => declaration.location,
            Statement::Expression { location, .. }
            | Statement::VariableDeclaration { location, .. }
            | Statement::Block { location, .. }
            | Statement::If { location, .. }
            | Statement::While { location, .. }
            | Statement::For { location, .. }
            | Statement::ForOf { location, .. }
            | Statement::ForIn { location, .. }
            | Statement::Repeat { location, .. }
            | Statement::Return { location, .. }
            | Statement::Break { location }
            | Statement::Continue { location } => *location,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Statement::Expression { .. } => NodeType::ExpressionStatement,
            Statement::VariableDeclaration { .. } => NodeType::VariableDeclaration,
            Statement::FunctionDeclaration(_) => NodeType::FunctionDeclaration,
            Statement::Block { .. } => NodeType::BlockStatement,
            Statement::If { .. } => NodeType::IfStatement,
            Statement::While { .. } => NodeType::WhileStatement,
            Statement::For { .. } => NodeType::ForStatement,
            Statement::ForOf { .. } => NodeType::ForOfStatement,
            Statement::ForIn { .. } => NodeType::ForInStatement,
            Statement::Repeat { .. } => NodeType::RepeatStatement,
            Statement::Return { .. } => NodeType::ReturnStatement,
            Statement::Break { .. } => NodeType::BreakStatement,
            Statement::Continue { .. } => NodeType::ContinueStatement,
        }
    }

    /// Immediate expression children (nested statements are not included).
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Statement::Expression { expression, .. } => vec![expression],
            Statement::VariableDeclaration { initializer, .. } => initializer.iter().collect(),
            Statement::FunctionDeclaration(_)
            | Statement::Block { .. }
            | Statement::Break { .. }
            | Statement::Continue { .. } => Vec::new(),
            Statement::If { condition, .. } | Statement::While { condition, .. } => vec![condition],
            Statement::For {
                condition, update, ..
            } => condition.iter().chain(update.iter()).collect(),
            Statement::ForOf { iterable, .. } => vec![iterable],
            Statement::ForIn { object, .. } => vec![object],
            Statement::Repeat { count, .. } => count.iter().collect(),
            Statement::Return { value, .. } => value.iter().collect(),
        }
    }
}
