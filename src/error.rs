// src/error.rs

//! Parse diagnostics for the expression grammar
//!
//! Callers only need to branch on parse success; the variants exist to
//! make rejected expressions explainable. Evaluation has no error type at
//! all: an unsatisfiable expression is a normal `None` outcome, not a
//! failure.

use thiserror::Error;

/// Errors that can occur while parsing a boolean dependency expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The expression does not start with '('
    #[error("expression must start with '('")]
    MissingParen,

    /// Input ended mid-expression (unterminated group)
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// An operand was expected but not found (e.g. empty group)
    #[error("expected an operand")]
    MissingOperand,

    /// A token in operator position is not a known operator
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Two different operator kinds mixed in one chain without parentheses
    #[error("cannot chain '{found}' into a '{expected}' chain without parentheses")]
    MixedChain {
        expected: &'static str,
        found: String,
    },

    /// An `else` with no enclosing `if`/`unless` chain to attach to
    #[error("'else' outside an 'if'/'unless' chain")]
    MisplacedElse,

    /// A second `else` arm for the same conditional
    #[error("duplicate 'else' arm")]
    DuplicateElse,

    /// A relation operator with no EVR token after it
    #[error("missing version after relation on '{0}'")]
    MissingEvr(String),

    /// Nesting deeper than the parser is willing to recurse
    #[error("expression nested too deeply")]
    TooDeep,
}
