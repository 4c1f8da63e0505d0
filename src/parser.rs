// src/parser.rs

//! Parser for boolean dependency expressions
//!
//! Grammar (whitespace-insensitive, parentheses mandatory around every
//! group, operators whitespace-delimited):
//!
//! ```text
//! expr        := '(' term ')'
//! term        := atom (op atom)*
//! atom        := expr | identifier
//! identifier  := NAME [ relation EVR ]
//! relation    := any run of '<' '=' '>'
//! op          := "and" | "or" | "if" | "unless" | "else" | "with" | "without"
//! ```
//!
//! Within one group all operators must be of the same kind as the first
//! one seen; `else` is the exception and closes the nearest `if`/`unless`
//! chain by supplying its third argument. Same-kind chains right-nest.
//!
//! Parsing is a pure function of the input text: it never consults the
//! cost oracle and has no side effects beyond tree allocation.

use tracing::trace;

use crate::ast::{BoolDep, Node, OpKind};
use crate::capreq::{Evr, Relation, Requirement};
use crate::error::ParseError;

/// Nesting-depth guard against stack exhaustion on adversarial input
const MAX_DEPTH: usize = 64;

/// Parse an expression into a [`BoolDep`]
///
/// The input must start with `(`. Trailing text after the top-level
/// group's closing paren is ignored.
pub fn parse(expr: &str) -> Result<BoolDep, ParseError> {
    if !expr.starts_with('(') {
        return Err(ParseError::MissingParen);
    }

    let mut cur = Cursor::new(expr);
    let root = parse_group(&mut cur, 0)?;

    Ok(BoolDep::new(root, expr))
}

/// Operator-position token: a real node kind, or the `else` pseudo-operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpToken {
    Kind(OpKind),
    Else,
}

fn lookup_op(word: &str) -> Option<OpToken> {
    let kind = match word {
        "and" => OpKind::And,
        "or" => OpKind::Or,
        "if" => OpKind::If,
        "unless" => OpKind::Unless,
        "with" => OpKind::With,
        "without" => OpKind::Without,
        "else" => return Some(OpToken::Else),
        _ => return None,
    };
    Some(OpToken::Kind(kind))
}

/// Parse a parenthesized group; the cursor sits on the opening `(`
fn parse_group(cur: &mut Cursor<'_>, depth: usize) -> Result<Node, ParseError> {
    if depth >= MAX_DEPTH {
        return Err(ParseError::TooDeep);
    }
    cur.bump();
    parse_chain(cur, depth)
}

/// Parse a chain of operands up to and including the group's closing `)`
///
/// Collects the operands of one group, enforcing the single-kind chain
/// rule, then right-nests them. An `else` arm attaches as the third
/// argument of the innermost conditional node.
fn parse_chain(cur: &mut Cursor<'_>, depth: usize) -> Result<Node, ParseError> {
    let first = parse_operand(cur, depth)?;

    let mut kind: Option<OpKind> = None;
    let mut operands = vec![first];
    let mut else_arm: Option<Node> = None;

    loop {
        cur.skip_ws();
        match cur.peek() {
            None => return Err(ParseError::UnexpectedEnd),
            Some(b')') => {
                cur.bump();
                break;
            }
            Some(_) => {}
        }

        let word = cur.take_word();
        let Some(op) = lookup_op(word) else {
            return Err(ParseError::UnknownOperator(word.to_string()));
        };
        trace!(op = word, "chain operator");

        // the else arm terminates its chain; only ')' may follow it
        if else_arm.is_some() {
            return Err(match op {
                OpToken::Else => ParseError::DuplicateElse,
                OpToken::Kind(k) => ParseError::MixedChain {
                    expected: kind.map_or("else", OpKind::name),
                    found: k.name().to_string(),
                },
            });
        }

        match op {
            OpToken::Else => {
                match kind {
                    Some(k) if k.is_conditional() => {}
                    _ => return Err(ParseError::MisplacedElse),
                }
                else_arm = Some(parse_operand(cur, depth)?);
            }
            OpToken::Kind(k) => {
                match kind {
                    None => kind = Some(k),
                    Some(k0) if k0 == k => {}
                    Some(k0) => {
                        return Err(ParseError::MixedChain {
                            expected: k0.name(),
                            found: k.name().to_string(),
                        });
                    }
                }
                operands.push(parse_operand(cur, depth)?);
            }
        }
    }

    let Some(kind) = kind else {
        // single-operand group like "(a)"
        return operands.pop().ok_or(ParseError::MissingOperand);
    };

    // right-nest: the innermost node pairs the last two operands and
    // receives the else arm, if any
    let mut node: Option<Node> = None;
    for operand in operands.into_iter().rev() {
        node = Some(match node {
            None => operand,
            Some(right) => {
                let mut args = vec![operand, right];
                if let Some(arm) = else_arm.take() {
                    args.push(arm);
                }
                Node::op(kind, args)
            }
        });
    }
    node.ok_or(ParseError::MissingOperand)
}

/// Parse one operand: a nested group or an identifier
fn parse_operand(cur: &mut Cursor<'_>, depth: usize) -> Result<Node, ParseError> {
    cur.skip_ws();
    match cur.peek() {
        None => Err(ParseError::UnexpectedEnd),
        Some(b')') => Err(ParseError::MissingOperand),
        Some(b'(') => parse_group(cur, depth + 1),
        Some(_) => parse_identifier(cur),
    }
}

/// Parse an identifier with its optional relation + EVR constraint
fn parse_identifier(cur: &mut Cursor<'_>) -> Result<Node, ParseError> {
    let name = cur.take_token();
    if name.is_empty() {
        return Err(ParseError::MissingOperand);
    }

    cur.skip_ws();
    let mut relation = Relation::ANY;
    while let Some(b) = cur.peek() {
        if !relation.set(b as char) {
            break;
        }
        cur.bump();
    }

    let req = if relation.is_any() {
        Requirement::bare(name)
    } else {
        cur.skip_ws();
        let evr = cur.take_token();
        if evr.is_empty() {
            return Err(ParseError::MissingEvr(name.to_string()));
        }
        Requirement::versioned(name, relation, Evr::parse(evr))
    };
    trace!(identifier = %req, "parsed identifier");

    Ok(Node::Identifier(req))
}

/// Byte cursor over the expression text
///
/// All significant grammar characters are ASCII, so scanning by byte and
/// slicing at the resulting positions is always char-boundary safe.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Advance past the current byte; only called after peeking ASCII
    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Scan an identifier or EVR token
    ///
    /// The token runs until whitespace, `,`, or an unbalanced `)`; an
    /// embedded `(` opens a balanced region so virtual capabilities like
    /// `python3dist(foo)` stay one token.
    fn take_token(&mut self) -> &'a str {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        let mut balance: i32 = 0;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b if b.is_ascii_whitespace() => break,
                b',' => break,
                b')' if balance <= 0 => break,
                b')' => balance -= 1,
                b'(' => balance += 1,
                _ => {}
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Scan an operator-position word: everything up to whitespace
    fn take_word(&mut self) -> &'a str {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && !bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(expr: &str) -> String {
        parse(expr).unwrap().canonical()
    }

    #[test]
    fn test_parse_shapes() {
        let cases = [
            ("(a and b)", "and,a,;b,;;"),
            ("(a or b)", "or,a,;b,;;"),
            ("(a and (b or c))", "and,a,;or,b,;c,;;;"),
            ("(a or (b and c))", "or,a,;and,b,;c,;;;"),
            ("((a or b) and (c or d))", "and,or,a,;b,;;or,c,;d,;;;"),
            ("((a and b) or (c and d))", "or,and,a,;b,;;and,c,;d,;;;"),
            ("(a if b)", "if,a,;b,;;"),
            ("(a if (b or c))", "if,a,;or,b,;c,;;;"),
            ("(a if b else c)", "if,a,;b,;c,;;"),
            ("(a unless b)", "unless,a,;b,;;"),
            ("(a unless (b or c))", "unless,a,;or,b,;c,;;;"),
            ("(a unless b else c)", "unless,a,;b,;c,;;"),
            ("(a with b)", "with,a,;b,;;"),
            ("(a without b)", "without,a,;b,;;"),
            ("(a with b with c)", "with,a,;with,b,;c,;;;"),
        ];
        for (expr, expected) in cases {
            assert_eq!(canon(expr), expected, "shape of {expr}");
        }
    }

    #[test]
    fn test_parse_chain_right_nests() {
        assert_eq!(canon("(a and b and c)"), "and,a,;and,b,;c,;;;");
        assert_eq!(canon("(a or b or c or d)"), "or,a,;or,b,;or,c,;d,;;;;");
        assert_eq!(canon("(a if b if c else d)"), "if,a,;if,b,;c,;d,;;;");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let expr = "((a or b) and (c if d else e))";
        let first = canon(expr);
        for _ in 0..3 {
            assert_eq!(canon(expr), first);
        }
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse("a or b"), Err(ParseError::MissingParen));
        assert_eq!(parse(" (a or b)"), Err(ParseError::MissingParen));
        assert_eq!(parse("(a or b"), Err(ParseError::UnexpectedEnd));
        assert_eq!(parse("(a or "), Err(ParseError::UnexpectedEnd));
        assert_eq!(
            parse("(a on b)"),
            Err(ParseError::UnknownOperator("on".to_string()))
        );
        // the operator word runs to whitespace, so "if)" is one token
        assert_eq!(
            parse("(a if)"),
            Err(ParseError::UnknownOperator("if)".to_string()))
        );
        assert_eq!(parse("()"), Err(ParseError::MissingOperand));
        assert_eq!(parse("(a and )"), Err(ParseError::MissingOperand));
    }

    #[test]
    fn test_parse_mixed_chain_rejected() {
        assert_eq!(
            parse("(a and b or c)"),
            Err(ParseError::MixedChain {
                expected: "and",
                found: "or".to_string()
            })
        );
        assert_eq!(
            parse("(a if b unless c)"),
            Err(ParseError::MixedChain {
                expected: "if",
                found: "unless".to_string()
            })
        );
        // explicit nesting makes it legal again
        assert!(parse("((a and b) or c)").is_ok());
    }

    #[test]
    fn test_parse_else_rules() {
        assert_eq!(parse("(a else b)"), Err(ParseError::MisplacedElse));
        assert_eq!(parse("(a and b else c)"), Err(ParseError::MisplacedElse));
        assert_eq!(
            parse("(a if b else c else d)"),
            Err(ParseError::DuplicateElse)
        );
        // nothing but ')' may follow an else arm
        assert_eq!(
            parse("(a if b else c if d)"),
            Err(ParseError::MixedChain {
                expected: "if",
                found: "if".to_string()
            })
        );
    }

    #[test]
    fn test_parse_versioned_identifier() {
        let dep = parse("(a >= 1:2.3-4 or b)").unwrap();
        let Node::Operator { kind, args } = dep.root() else {
            panic!("expected operator root");
        };
        assert_eq!(*kind, OpKind::Or);
        let Node::Identifier(req) = &args[0] else {
            panic!("expected identifier");
        };
        assert_eq!(req.to_string(), "a >= 1:2.3-4");
    }

    #[test]
    fn test_parse_relation_without_evr() {
        assert_eq!(
            parse("(a >= )"),
            Err(ParseError::MissingEvr("a".to_string()))
        );
        assert_eq!(
            parse("(a or b <)"),
            Err(ParseError::MissingEvr("b".to_string()))
        );
    }

    #[test]
    fn test_parse_parenthesized_capability_name() {
        // an embedded balanced paren is part of the identifier token
        let dep = parse("(python3dist(requests) or b)").unwrap();
        assert_eq!(dep.canonical(), "or,python3dist(requests),;b,;;");
    }

    #[test]
    fn test_parse_trailing_text_ignored() {
        let dep = parse("(a and b) leftover").unwrap();
        assert_eq!(dep.canonical(), "and,a,;b,;;");
        assert_eq!(dep.source(), "(a and b) leftover");
    }

    #[test]
    fn test_parse_depth_guard() {
        let deep = "(".repeat(100) + "a" + &")".repeat(100);
        assert_eq!(parse(&deep), Err(ParseError::TooDeep));

        let ok = "(".repeat(30) + "a" + &")".repeat(30);
        assert!(parse(&ok).is_ok());
    }

    #[test]
    fn test_parse_whitespace_insensitive() {
        assert_eq!(canon("(  a   and\tb )"), "and,a,;b,;;");
    }
}
