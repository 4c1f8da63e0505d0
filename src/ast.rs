// src/ast.rs

//! Abstract syntax tree for boolean dependency expressions
//!
//! The parser produces a tree of [`Node`]s owned by a [`BoolDep`].
//! Operator chains right-nest: `(a and b and c)` parses as
//! `And(a, And(b, c))`, never a flat 3-ary node; the evaluator makes the
//! nesting transparent by flattening results left-to-right.

use std::fmt;
use std::str::FromStr;

use crate::capreq::Requirement;
use crate::error::ParseError;
use crate::parser;

/// Operator kinds of the expression language
///
/// `else` is a parse-time token only: its operand becomes the third
/// argument of the nearest enclosing `if`/`unless` node, so no `Else`
/// kind exists here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    And,
    Or,
    If,
    Unless,
    With,
    Without,
}

impl OpKind {
    /// Maximum number of arguments this operator can carry
    pub fn arity(self) -> usize {
        match self {
            OpKind::And | OpKind::Or | OpKind::With | OpKind::Without => 2,
            OpKind::If | OpKind::Unless => 3,
        }
    }

    /// The operator's token in the textual grammar
    pub fn name(self) -> &'static str {
        match self {
            OpKind::And => "and",
            OpKind::Or => "or",
            OpKind::If => "if",
            OpKind::Unless => "unless",
            OpKind::With => "with",
            OpKind::Without => "without",
        }
    }

    /// True for the conditional operators that accept an `else` arm
    pub fn is_conditional(self) -> bool {
        matches!(self, OpKind::If | OpKind::Unless)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One element of the expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A leaf naming one concrete capability requirement
    Identifier(Requirement),
    /// An operator with its arguments
    ///
    /// Binary operators always carry exactly 2 arguments after a
    /// successful parse; `if`/`unless` carry 2 (no `else`) or 3.
    Operator { kind: OpKind, args: Vec<Node> },
}

impl Node {
    /// Build an operator node
    pub(crate) fn op(kind: OpKind, args: Vec<Node>) -> Self {
        Node::Operator { kind, args }
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            Node::Identifier(req) => {
                out.push_str(&req.name);
                out.push(',');
            }
            Node::Operator { kind, args } => {
                out.push_str(kind.name());
                out.push(',');
                for arg in args {
                    arg.write_canonical(out);
                }
            }
        }
        out.push(';');
    }
}

/// A parsed boolean dependency expression
///
/// Owns the root of the tree plus the original source text. The source is
/// kept for diagnostics only and never reparsed; the tree may be evaluated
/// any number of times against different cost oracles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolDep {
    root: Node,
    source: String,
}

impl BoolDep {
    pub(crate) fn new(root: Node, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
        }
    }

    /// Parse an expression; see [`crate::parse`]
    pub fn parse(expr: &str) -> Result<Self, ParseError> {
        parser::parse(expr)
    }

    /// The root node of the expression tree
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The original expression text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Deterministic `op,child;child;;` rendering of the tree shape
    ///
    /// Stable across repeated parses of the same text; intended for
    /// diagnostics and structural assertions, not round-tripping back
    /// through the parser.
    pub fn canonical(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        self.root.write_canonical(&mut out);
        out
    }
}

impl FromStr for BoolDep {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoolDep::parse(s)
    }
}
