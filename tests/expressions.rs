// tests/expressions.rs

//! End-to-end expression tests: parse once, evaluate against different
//! cost oracles, check the flattened requirement lists.

use booldep::{BoolDep, CostAnswer, Package, ParseError, Requirement, evaluate, parse};

fn cost_table(costs: Vec<(&'static str, i32)>) -> impl Fn(&Requirement) -> CostAnswer {
    move |req: &Requirement| {
        costs
            .iter()
            .find(|(name, _)| *name == req.name)
            .map_or(CostAnswer::unknown(), |(_, c)| CostAnswer::cost(*c))
    }
}

fn names(result: Option<Vec<Requirement>>) -> Vec<String> {
    result
        .expect("expression should be satisfiable")
        .iter()
        .map(|r| r.to_string())
        .collect()
}

#[test]
fn test_reject_without_parens() {
    assert_eq!(parse("a or b"), Err(ParseError::MissingParen));
}

#[test]
fn test_reject_unknown_operator() {
    assert!(parse("(a on b)").is_err());
}

#[test]
fn test_or_picks_satisfied_branch() {
    let dep = parse("(a or b)").unwrap();
    let oracle = cost_table(vec![("a", 0), ("b", 1)]);
    assert_eq!(names(dep.evaluate(&oracle)), ["a"]);
}

#[test]
fn test_if_branches_on_condition_cost() {
    let dep = parse("(a if b)").unwrap();
    assert_eq!(
        names(dep.evaluate(&cost_table(vec![("a", 1), ("b", 0)]))),
        ["a"]
    );
    assert_eq!(
        names(dep.evaluate(&cost_table(vec![("a", 1), ("b", 2)]))),
        Vec::<String>::new()
    );
}

#[test]
fn test_unless_inverts_condition() {
    let dep = parse("(a unless b)").unwrap();
    assert_eq!(
        names(dep.evaluate(&cost_table(vec![("a", 1), ("b", 0)]))),
        Vec::<String>::new()
    );
    assert_eq!(
        names(dep.evaluate(&cost_table(vec![("a", 1), ("b", 2)]))),
        ["a"]
    );
}

#[test]
fn test_with_pins_shared_provider() {
    let p1 = Package::new("P1", 0, "1.0", "1");
    let p2 = Package::new("P2", 0, "2.0", "1");
    let p3 = Package::new("P3", 0, "3.0", "1");

    let oracle = move |req: &Requirement| match req.name.as_str() {
        "a" => CostAnswer::cost(1).with_providers(vec![p1.clone(), p2.clone()]),
        "b" => CostAnswer::cost(1).with_providers(vec![p2.clone(), p3.clone()]),
        _ => CostAnswer::unknown(),
    };

    let dep = parse("(a with b)").unwrap();
    assert_eq!(names(dep.evaluate(&oracle)), ["P2 = 2.0-1"]);
}

#[test]
fn test_nested_grouping_flattens_in_order() {
    let dep = parse("((a or b) and (c or d))").unwrap();
    let oracle = cost_table(vec![("a", 2), ("b", 1), ("c", 1), ("d", 2)]);
    assert_eq!(names(dep.evaluate(&oracle)), ["b", "c"]);
}

#[test]
fn test_one_tree_many_oracles() {
    let dep: BoolDep = "(a or b)".parse().unwrap();
    assert_eq!(names(dep.evaluate(&cost_table(vec![("a", 0), ("b", 1)]))), ["a"]);
    assert_eq!(names(dep.evaluate(&cost_table(vec![("a", 3), ("b", 1)]))), ["b"]);
    assert_eq!(dep.source(), "(a or b)");
}

#[test]
fn test_canonical_stable_across_reparses() {
    let expr = "((a and b) or (c if d else e))";
    let shape = parse(expr).unwrap().canonical();
    for _ in 0..5 {
        assert_eq!(parse(expr).unwrap().canonical(), shape);
    }
}

#[test]
fn test_versioned_requirements_flow_through() {
    let dep = parse("(libfoo >= 2:1.0-3 and bar)").unwrap();
    let result = names(evaluate(&dep, &cost_table(vec![("libfoo", 1), ("bar", 1)])));
    assert_eq!(result, ["libfoo >= 2:1.0-3", "bar"]);
}

#[test]
fn test_unsatisfiable_is_not_an_error() {
    // disjoint provider sets: definite "no solution", distinct from a
    // parse failure
    let p1 = Package::new("P1", 0, "1.0", "1");
    let p2 = Package::new("P2", 0, "2.0", "1");
    let oracle = move |req: &Requirement| match req.name.as_str() {
        "a" => CostAnswer::cost(1).with_providers(vec![p1.clone()]),
        "b" => CostAnswer::cost(1).with_providers(vec![p2.clone()]),
        _ => CostAnswer::unknown(),
    };

    let dep = parse("(a with b)").unwrap();
    assert_eq!(dep.evaluate(&oracle), None);
}
