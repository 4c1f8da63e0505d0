// src/eval.rs

//! Tree evaluation against a cost/provider oracle
//!
//! Walks a parsed expression and reduces it to the concrete, flattened
//! list of requirements to satisfy, or determines it is unsatisfiable.
//! All cost and provider knowledge is injected through [`CostOracle`];
//! the evaluator itself holds no state across calls, so one tree may be
//! evaluated concurrently from multiple threads against independent
//! oracles.
//!
//! Unsatisfiability is a normal outcome (`None`), never an error: the
//! surrounding resolver decides what to do about it. An empty result
//! (`Some(vec![])`) is equally normal and means "satisfied with nothing
//! required", e.g. `(a unless b)` when `b` already holds.

use tracing::{debug, trace};

use crate::ast::{BoolDep, Node, OpKind};
use crate::capreq::Requirement;
use crate::package::Package;

/// Sentinel for an unknown satisfaction cost
///
/// A negative oracle cost is normalized to this value in total-cost
/// comparisons: very expensive, but not impossible.
pub const UNKNOWN_COST: i32 = 99;

/// The oracle's answer for one requirement
#[derive(Debug, Clone, Default)]
pub struct CostAnswer {
    /// Distance to satisfy: 0 = already satisfied, positive = number of
    /// packages to install, negative = unknown
    pub cost: i32,
    /// Packages whose bare name or virtual capability matches the
    /// requirement, independent of version constraints; in a stable
    /// order, since cost ties go to the first provider seen
    pub providers: Option<Vec<Package>>,
}

impl CostAnswer {
    /// The requirement already holds
    pub fn satisfied() -> Self {
        Self::cost(0)
    }

    /// A concrete distance to satisfy
    pub fn cost(cost: i32) -> Self {
        Self {
            cost,
            providers: None,
        }
    }

    /// The oracle cannot judge this requirement
    pub fn unknown() -> Self {
        Self::cost(-1)
    }

    /// Attach the matching provider packages
    pub fn with_providers(mut self, providers: Vec<Package>) -> Self {
        self.providers = Some(providers);
        self
    }
}

/// The single injection point for cost and provider knowledge
///
/// Implementations may perform I/O (e.g. a package database lookup); the
/// evaluator treats every call as a pure synchronous query.
pub trait CostOracle {
    /// Satisfaction cost and candidate providers for one requirement
    fn cost_of(&self, req: &Requirement) -> CostAnswer;
}

impl<F> CostOracle for F
where
    F: Fn(&Requirement) -> CostAnswer,
{
    fn cost_of(&self, req: &Requirement) -> CostAnswer {
        self(req)
    }
}

/// One link of the evaluation-time value chain
///
/// The requirement goes absent when provider selection finds no eligible
/// candidate; such entries stay in the chain (their cost still counts)
/// but contribute nothing to the final list.
#[derive(Debug)]
struct Entry {
    req: Option<Requirement>,
    cost: i32,
    providers: Option<Vec<Package>>,
}

/// A conjunction of concrete requirements under evaluation
type Chain = Vec<Entry>;

/// Evaluate an expression against a cost oracle
///
/// Returns `None` only when the whole expression is unsatisfiable.
/// `Some(vec![])` is a valid, satisfied-with-nothing-required result.
pub fn evaluate<O>(dep: &BoolDep, oracle: &O) -> Option<Vec<Requirement>>
where
    O: CostOracle + ?Sized,
{
    let chain = eval(dep.root(), oracle)?;
    Some(chain.into_iter().filter_map(|entry| entry.req).collect())
}

impl BoolDep {
    /// Evaluate this expression; see [`evaluate`]
    pub fn evaluate<O>(&self, oracle: &O) -> Option<Vec<Requirement>>
    where
        O: CostOracle + ?Sized,
    {
        evaluate(self, oracle)
    }
}

/// Total cost of a chain, normalizing unknown per-entry costs
fn chain_cost(chain: &Chain) -> i32 {
    chain
        .iter()
        .map(|entry| if entry.cost < 0 { UNKNOWN_COST } else { entry.cost })
        .sum()
}

/// Total cost of a branch outcome; an unsatisfiable branch counts as unknown
fn branch_cost(branch: &Option<Chain>) -> i32 {
    match branch {
        Some(chain) => chain_cost(chain),
        None => UNKNOWN_COST,
    }
}

/// Evaluate an optional child; a missing child (an omitted `else`) is the
/// canonical empty value: nothing required, total cost 0
fn eval_child<O>(node: Option<&Node>, oracle: &O) -> Option<Chain>
where
    O: CostOracle + ?Sized,
{
    match node {
        Some(node) => eval(node, oracle),
        None => Some(Vec::new()),
    }
}

fn eval<O>(node: &Node, oracle: &O) -> Option<Chain>
where
    O: CostOracle + ?Sized,
{
    match node {
        Node::Identifier(req) => Some(eval_identifier(req, oracle)),
        Node::Operator { kind, args } => match kind {
            OpKind::And => eval_and(args, oracle),
            OpKind::Or => eval_or(args, oracle),
            OpKind::If => eval_conditional(args, oracle, false),
            OpKind::Unless => eval_conditional(args, oracle, true),
            OpKind::With => eval_providers(args, oracle, SetOp::Intersection),
            OpKind::Without => eval_providers(args, oracle, SetOp::Difference),
        },
    }
}

/// Identifier leaf: one oracle query
fn eval_identifier<O>(req: &Requirement, oracle: &O) -> Chain
where
    O: CostOracle + ?Sized,
{
    let answer = oracle.cost_of(req);
    trace!(requirement = %req, cost = answer.cost, "oracle answer");
    vec![Entry {
        req: Some(req.clone()),
        cost: answer.cost,
        providers: answer.providers,
    }]
}

/// Both sides are mandatory: concatenate, left chain first
fn eval_and<O>(args: &[Node], oracle: &O) -> Option<Chain>
where
    O: CostOracle + ?Sized,
{
    let mut left = eval_child(args.first(), oracle)?;
    let right = eval_child(args.get(1), oracle)?;
    left.extend(right);
    Some(left)
}

/// The cheaper side wins; an exact tie keeps the left (preferred) side.
/// A satisfiable branch always beats an unsatisfiable one, even when the
/// unsatisfiable side's sentinel cost would tie or win.
fn eval_or<O>(args: &[Node], oracle: &O) -> Option<Chain>
where
    O: CostOracle + ?Sized,
{
    let left = eval_child(args.first(), oracle);
    let right = eval_child(args.get(1), oracle);

    match (&left, &right) {
        (None, Some(_)) => return right,
        (Some(_), None) => return left,
        _ => {}
    }

    let lcost = branch_cost(&left);
    let rcost = branch_cost(&right);
    debug!(lcost, rcost, "or branch costs");

    if rcost < lcost { right } else { left }
}

/// `if`: condition satisfied (total cost 0) selects the then-branch,
/// otherwise the else-branch (empty when omitted). `unless` inverts the
/// test. The condition's own chain is discarded once costed.
fn eval_conditional<O>(args: &[Node], oracle: &O, invert: bool) -> Option<Chain>
where
    O: CostOracle + ?Sized,
{
    let cond = eval_child(args.get(1), oracle);
    let cost = branch_cost(&cond);
    debug!(cost, invert, "conditional cost");

    if (cost == 0) != invert {
        eval_child(args.first(), oracle)
    } else {
        eval_child(args.get(2), oracle)
    }
}

#[derive(Debug, Clone, Copy)]
enum SetOp {
    Intersection,
    Difference,
}

/// `with`/`without`: set algebra over the two sides' provider sets
///
/// The surviving set replaces the left chain's head providers, and the
/// head requirement is re-pinned to the best provider. The right chain is
/// discarded entirely. Either side lacking providers, or an empty result
/// set, makes the node unsatisfiable.
fn eval_providers<O>(args: &[Node], oracle: &O, op: SetOp) -> Option<Chain>
where
    O: CostOracle + ?Sized,
{
    let mut left = eval_child(args.first(), oracle)?;
    let lprov = left.first().and_then(|entry| entry.providers.as_deref())?;
    if lprov.is_empty() {
        return None;
    }

    let right = eval_child(args.get(1), oracle)?;
    let rprov = right.first().and_then(|entry| entry.providers.as_deref())?;
    if rprov.is_empty() {
        return None;
    }

    // left order is preserved, so tie-breaks stay deterministic
    let selected: Vec<Package> = match op {
        SetOp::Intersection => lprov
            .iter()
            .filter(|pkg| rprov.contains(pkg))
            .cloned()
            .collect(),
        SetOp::Difference => lprov
            .iter()
            .filter(|pkg| !rprov.contains(pkg))
            .cloned()
            .collect(),
    };

    if selected.is_empty() {
        debug!(?op, "no provider survives");
        return None;
    }
    debug!(?op, survivors = selected.len(), "provider set reduced");

    if let Some(head) = left.first_mut() {
        head.req = pick_best(&selected, oracle);
        head.providers = Some(selected);
    }

    Some(left)
}

/// Pin the cheapest provider from a non-empty candidate set
///
/// A singleton set is pinned directly without consulting the oracle.
/// Otherwise each candidate is pinned by exact EVR and costed; the
/// minimum is tracked with strict less-than, so the first candidate seen
/// wins exact ties. Candidates with unknown (negative) cost, or cost at
/// or above [`UNKNOWN_COST`], are never eligible; when no candidate is,
/// no requirement is synthesized.
fn pick_best<O>(candidates: &[Package], oracle: &O) -> Option<Requirement>
where
    O: CostOracle + ?Sized,
{
    if let [only] = candidates {
        return Some(Requirement::pinned(only));
    }

    let mut best = None;
    let mut min_cost = UNKNOWN_COST;

    for pkg in candidates {
        let req = Requirement::pinned(pkg);
        let cost = oracle.cost_of(&req).cost;
        trace!(package = %pkg, cost, "candidate provider");

        if cost >= 0 && cost < min_cost {
            min_cost = cost;
            best = Some(req);
        }
    }

    best
}
