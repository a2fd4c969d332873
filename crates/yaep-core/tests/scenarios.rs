//! End-to-end recognition/translation scenarios plus a few cross-cutting
//! invariants (core/set sharing, transition-cache reuse, invalid token
//! codes).

use yaep_core::{ErrorCode, Grammar, GrammarBuilder, Parser, SyntaxErrorInfo, Translation, TranslationNode};

const NUM: i32 = 1;
const PLUS: i32 = 2;
const STAR: i32 = 3;
const LPAREN: i32 = 4;
const RPAREN: i32 = 5;
const ID: i32 = 6;
const SEMI: i32 = 7;
const GARBAGE: i32 = 8;
const A: i32 = 9;

fn tokens(pairs: &[(i32, i64)]) -> impl FnMut() -> Option<(i32, i64)> + '_ {
  let mut it = pairs.iter().copied();
  move || it.next()
}

fn no_errors() -> impl FnMut(SyntaxErrorInfo) {
  |info| panic!("unexpected syntax error: {info:?}")
}

/// Arithmetic expressions with the usual precedence, expressed through
/// layered nonterminals so the grammar is unambiguous on its own.
fn arithmetic_grammar() -> Grammar {
  GrammarBuilder::new()
    .add_terminal("num", NUM)
    .unwrap()
    .add_terminal("+", PLUS)
    .unwrap()
    .add_terminal("*", STAR)
    .unwrap()
    .add_terminal("(", LPAREN)
    .unwrap()
    .add_terminal(")", RPAREN)
    .unwrap()
    .add_rule("expr", &["expr", "+", "term"], Translation::anode("Add", 0, &[0, 2]))
    .unwrap()
    .add_rule("expr", &["term"], Translation::forward(0))
    .unwrap()
    .add_rule("term", &["term", "*", "factor"], Translation::anode("Mul", 0, &[0, 2]))
    .unwrap()
    .add_rule("term", &["factor"], Translation::forward(0))
    .unwrap()
    .add_rule("factor", &["num"], Translation::forward(0))
    .unwrap()
    .add_rule("factor", &["(", "expr", ")"], Translation::forward(1))
    .unwrap()
    .set_start("expr")
    .prepare()
    .unwrap()
}

#[test]
fn arithmetic_builds_precedence_correct_tree() {
  let grammar = arithmetic_grammar();
  // "2 + 3 * 4"
  let input = [(NUM, 2), (PLUS, 0), (NUM, 3), (STAR, 0), (NUM, 4)];
  let parser = Parser::parse(&grammar, tokens(&input), no_errors()).expect("recognizes");
  let outcome = yaep_core::translate(&parser).expect("translates");
  assert!(!outcome.ambiguous);

  let TranslationNode::Anode { name, children, .. } = outcome.forest.get(outcome.root) else {
    panic!("expected root Add node");
  };
  assert_eq!(name, "Add");
  assert_eq!(children.len(), 2);

  let TranslationNode::Terminal { attr: left_attr, .. } = outcome.forest.get(children[0]) else {
    panic!("expected leaf 2 on the left of Add");
  };
  assert_eq!(*left_attr, 2);

  let TranslationNode::Anode { name: mul_name, children: mul_children, .. } = outcome.forest.get(children[1]) else {
    panic!("expected Mul node on the right of Add");
  };
  assert_eq!(mul_name, "Mul");
  let TranslationNode::Terminal { attr: a, .. } = outcome.forest.get(mul_children[0]) else { panic!() };
  let TranslationNode::Terminal { attr: b, .. } = outcome.forest.get(mul_children[1]) else { panic!() };
  assert_eq!((*a, *b), (3, 4));
}

/// `L -> 'a' L | 'a'`: non-nullable right recursion, the shape Leo's
/// optimization targets. Checks both the resulting tree and that
/// recognition collapses to a small, input-length-independent number of
/// distinct cores/sets rather than growing one-for-one with the input.
fn right_recursive_grammar() -> Grammar {
  GrammarBuilder::new()
    .add_terminal("a", A)
    .unwrap()
    .add_rule("L", &["a", "L"], Translation::anode("Cons", 0, &[0, 1]))
    .unwrap()
    .add_rule("L", &["a"], Translation::forward(0))
    .unwrap()
    .set_start("L")
    .prepare()
    .unwrap()
}

#[test]
fn right_recursion_nests_correctly_and_shares_cores() {
  let _ = env_logger::try_init();
  let grammar = right_recursive_grammar();
  let input: Vec<(i32, i64)> = (0..6).map(|_| (A, 0)).collect();
  let parser = Parser::parse(&grammar, tokens(&input), no_errors()).expect("recognizes");

  // Distinct cores/sets stay bounded well below the input length: the
  // tail-recursive chain settles into a steady-state core reused at every
  // position past the first.
  assert!(parser.cores().len() <= 4, "core count {} should stay small", parser.cores().len());
  assert!(parser.sets().len() <= 4, "set count {} should stay small", parser.sets().len());

  // The tail-recursive chain is exactly the shape Leo's optimization
  // targets: completing `L -> a L .` at each position should have
  // triggered at least one Leo-shortcut completion rather than walking the
  // waiter chain back through every earlier set.
  let (_, leo_completions_used) = parser.leo_stats();
  assert!(leo_completions_used >= 1, "expected at least one Leo completion on this right-recursive chain");

  let outcome = yaep_core::translate(&parser).expect("translates");
  assert!(!outcome.ambiguous);

  // Walk the nested Cons(a, Cons(a, ... Forward(a))) spine; it should be
  // exactly 6 levels deep (one per input token), bottoming out at a leaf.
  let mut node = outcome.root;
  for _ in 0..5 {
    let TranslationNode::Anode { name, children, .. } = outcome.forest.get(node) else {
      panic!("expected a Cons node");
    };
    assert_eq!(name, "Cons");
    assert!(matches!(outcome.forest.get(children[0]), TranslationNode::Terminal { .. }));
    node = children[1];
  }
  assert!(matches!(outcome.forest.get(node), TranslationNode::Terminal { .. }));
}

/// `S -> S S | 'x'`: classically ambiguous. Three `x`s admit exactly two
/// distinct groupings, and both must survive in the forest when `one_parse`
/// is disabled.
#[test]
fn ambiguous_grammar_packs_both_derivations() {
  let grammar = GrammarBuilder::new()
    .set_one_parse(false)
    .add_terminal("x", A)
    .unwrap()
    .add_rule("S", &["S", "S"], Translation::anode("Cat", 0, &[0, 1]))
    .unwrap()
    .add_rule("S", &["x"], Translation::forward(0))
    .unwrap()
    .set_start("S")
    .prepare()
    .unwrap();

  let input = [(A, 0), (A, 0), (A, 0)];
  let parser = Parser::parse(&grammar, tokens(&input), no_errors()).expect("recognizes");
  let outcome = yaep_core::translate(&parser).expect("translates");

  assert!(outcome.ambiguous);
  let TranslationNode::Alt { alternatives } = outcome.forest.get(outcome.root) else {
    panic!("expected the root to pack both groupings of 3 x's");
  };
  assert_eq!(alternatives.len(), 2);
  for &alt in alternatives {
    assert!(matches!(outcome.forest.get(alt), TranslationNode::Anode { .. }));
  }
}

/// Two productions for the same span with different costs: cost-minimal
/// selection must pick the cheap one when `one_parse` + `cost` are set.
#[test]
fn cost_minimal_selection_prefers_cheaper_node() {
  let grammar = GrammarBuilder::new()
    .set_one_parse(true)
    .set_cost(true)
    .add_terminal("a", A)
    .unwrap()
    .add_rule("E", &["a"], Translation::anode("Cheap", 1, &[0]))
    .unwrap()
    .add_rule("E", &["a"], Translation::anode("Expensive", 5, &[0]))
    .unwrap()
    .set_start("E")
    .prepare()
    .unwrap();

  let input = [(A, 7)];
  let parser = Parser::parse(&grammar, tokens(&input), no_errors()).expect("recognizes");
  let outcome = yaep_core::translate(&parser).expect("translates");

  assert!(outcome.ambiguous, "two distinct rules derive the same span");
  let TranslationNode::Anode { name, .. } = outcome.forest.get(outcome.root) else { panic!("expected an Anode root") };
  assert_eq!(name, "Cheap");
}

/// A single bad token is absorbed by the synthetic `error` terminal and
/// minimal-cost recovery resumes scanning at the next real token. The
/// recovered tree keeps the skipped token as the `error` subtree's child.
#[test]
fn error_recovery_skips_minimal_tokens() {
  let grammar = GrammarBuilder::new()
    .set_error_recovery(true)
    .set_recovery_token_matches(1)
    .add_terminal("id", ID)
    .unwrap()
    .add_terminal(";", SEMI)
    .unwrap()
    .add_terminal("garbage", GARBAGE)
    .unwrap()
    .add_rule("prog", &["stmt"], Translation::forward(0))
    .unwrap()
    .add_rule("stmt", &["id", ";"], Translation::anode("Stmt", 0, &[0]))
    .unwrap()
    .add_rule("stmt", &["error", ";"], Translation::anode("ErrStmt", 0, &[0]))
    .unwrap()
    .set_start("prog")
    .prepare()
    .unwrap();

  let input = [(GARBAGE, 0), (SEMI, 0)];
  let mut reports = Vec::new();
  let parser = Parser::parse(&grammar, tokens(&input), |info| reports.push(info)).expect("recovers and recognizes");

  assert_eq!(reports.len(), 1);
  assert_eq!(reports[0].position, 0);
  assert_eq!(reports[0].tokens_ignored, 1);

  let outcome = yaep_core::translate(&parser).expect("translates");
  let TranslationNode::Anode { name, children, .. } = outcome.forest.get(outcome.root) else {
    panic!("expected ErrStmt root")
  };
  assert_eq!(name, "ErrStmt");
  assert_eq!(children.len(), 1);
  let TranslationNode::Terminal { symbol, attr } = outcome.forest.get(children[0]) else {
    panic!("expected the error subtree's single child to be the skipped token")
  };
  assert_eq!(*symbol, grammar.symbol_by_code(GARBAGE).expect("garbage terminal declared"));
  assert_eq!(*attr, 0);
}

/// A token code the grammar never declared is a hard error, not a recovery
/// case: `parse` fails before recognition even begins.
#[test]
fn invalid_token_code_is_rejected() {
  let grammar = right_recursive_grammar();
  let input = [(A, 0), (999, 0)];
  let err = Parser::parse(&grammar, tokens(&input), no_errors()).expect_err("unregistered code must fail");
  assert_eq!(err.code(), ErrorCode::InvalidTokenCode);
  assert_eq!(yaep_core::types::error::last_error_code(), Some(ErrorCode::InvalidTokenCode));
}

/// The transition cache actually gets reused, not just populated: scanning
/// the recurring `a` terminal through the steady-state core of the
/// right-recursive grammar should hit the cache on later tokens.
#[test]
fn transition_cache_is_reused_on_repeated_configuration() {
  let grammar = right_recursive_grammar();
  let input: Vec<(i32, i64)> = (0..8).map(|_| (A, 0)).collect();
  let parser = Parser::parse(&grammar, tokens(&input), no_errors()).expect("recognizes");
  let (hits, _misses) = parser.transition_cache_stats();
  assert!(hits > 0, "expected the steady-state right-recursive chain to hit the transition cache");
}
