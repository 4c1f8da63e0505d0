// src/lib.rs

//! Boolean dependency expressions
//!
//! A small domain-specific language for conditional, alternative, and
//! preference relationships between package capability requirements:
//!
//! ```text
//! (a and b)                   requires a AND b
//! (a or b)                    requires a OR b, cheaper one wins
//! (a if b)                    requires a only if b already satisfied
//! (a if b else c)             requires a if b holds, else requires c
//! (a unless b)                requires a unless b already satisfied
//! (a with b)                  the single package satisfying both a and b
//! (a without b)               a from providers not also satisfying b
//! ((a or b) and (c or d))     nested grouping
//! ```
//!
//! # Architecture
//!
//! - [`parse`] turns the text into a [`BoolDep`] tree, once; the tree may
//!   then be evaluated any number of times without reparsing
//! - [`evaluate`] walks the tree against a caller-supplied [`CostOracle`]
//!   and produces the flattened list of concrete requirements to satisfy,
//!   or `None` when the expression is unsatisfiable
//!
//! The cost oracle is the only extension point: all package-database and
//! resolver knowledge stays behind it.

pub mod ast;
pub mod capreq;
mod error;
pub mod eval;
pub mod package;
mod parser;

pub use ast::{BoolDep, Node, OpKind};
pub use capreq::{Constraint, Evr, Relation, Requirement};
pub use error::ParseError;
pub use eval::{CostAnswer, CostOracle, UNKNOWN_COST, evaluate};
pub use package::Package;
pub use parser::parse;
