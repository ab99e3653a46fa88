//! Per-exercise language configuration
//!
//! [`LanguageFeatures`] is the JSON object an exercise ships with. Every field
//! is optional when deserialising; missing fields take the defaults below.
//!
//! ```json
//! {
//!   "allowTruthiness": true,
//!   "allowedNodes": ["VariableDeclaration", "ExpressionStatement", "LiteralExpression"],
//!   "allowedStdlib": { "string": { "properties": ["length"], "methods": ["toUpperCase"] } },
//!   "excludeList": ["FOR"]
//! }
//! ```

use crate::parser::ast::NodeType;
use crate::parser::lexer::TokenType;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on loop iterations across a whole run.
pub const DEFAULT_MAX_TOTAL_LOOP_ITERATIONS: usize = 10_000;

/// Receiver types that have stdlib members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdlibType {
    String,
    Array,
}

impl fmt::Display for StdlibType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StdlibType::String => f.write_str("string"),
            StdlibType::Array => f.write_str("array"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StdlibAllowList {
    pub properties: Vec<String>,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageFeatures {
    pub allow_shadowing: bool,
    pub allow_type_coercion: bool,
    pub enforce_strict_equality: bool,
    pub allow_truthiness: bool,
    pub require_semicolons: bool,
    pub one_statement_per_line: bool,
    pub require_variable_instantiation: bool,
    pub max_total_loop_iterations: usize,
    /// `None` allows every node type.
    pub allowed_nodes: Option<Vec<NodeType>>,
    /// `None` allows every stdlib member. Types missing from the map are unrestricted.
    pub allowed_stdlib: Option<FxHashMap<StdlibType, StdlibAllowList>>,
    pub include_list: Option<Vec<TokenType>>,
    pub exclude_list: Option<Vec<TokenType>>,
}

impl Default for LanguageFeatures {
    fn default() -> Self {
        LanguageFeatures {
            allow_shadowing: false,
            allow_type_coercion: false,
            enforce_strict_equality: true,
            allow_truthiness: false,
            require_semicolons: false,
            one_statement_per_line: false,
            require_variable_instantiation: true,
            max_total_loop_iterations: DEFAULT_MAX_TOTAL_LOOP_ITERATIONS,
            allowed_nodes: None,
            allowed_stdlib: None,
            include_list: None,
            exclude_list: None,
        }
    }
}

impl LanguageFeatures {
    /// Literals and plain names are always available; every other node
    /// type must be listed when `allowed_nodes` is set.
    pub fn is_node_allowed(&self, node: NodeType) -> bool {
        if matches!(node, NodeType::LiteralExpression | NodeType::IdentifierExpression) {
            return true;
        }
        self.allowed_nodes
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&node))
    }

    pub fn is_token_excluded(&self, token_type: TokenType) -> bool {
        self.exclude_list
            .as_ref()
            .is_some_and(|excluded| excluded.contains(&token_type))
    }

    pub fn is_token_included(&self, token_type: TokenType) -> bool {
        self.include_list
            .as_ref()
            .map_or(true, |included| included.contains(&token_type))
    }

    pub fn is_stdlib_property_allowed(&self, stdlib_type: StdlibType, name: &str) -> bool {
        self.stdlib_allow_list(stdlib_type)
            .map_or(true, |list| list.properties.iter().any(|p| p == name))
    }

    pub fn is_stdlib_method_allowed(&self, stdlib_type: StdlibType, name: &str) -> bool {
        self.stdlib_allow_list(stdlib_type)
            .map_or(true, |list| list.methods.iter().any(|m| m == name))
    }

    fn stdlib_allow_list(&self, stdlib_type: StdlibType) -> Option<&StdlibAllowList> {
        self.allowed_stdlib.as_ref()?.get(&stdlib_type)
    }
}
