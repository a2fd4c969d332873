use yaep_core::{Parser, TranslationNode};

const SRC: &str = r"
TERM NUMBER;
E : T | E '+' T #plus(0 2);
T : F | T '*' F #mult(0 2);
F : NUMBER | '(' E ')' #1;
";

fn code_of(grammar: &yaep_core::Grammar, name: &str) -> i32 {
  grammar.symbol(grammar.symbol_by_name(name).expect("declared")).terminal_code().expect("terminal")
}

#[test]
fn reads_arithmetic_description_and_parses() {
  let _ = env_logger::try_init();
  let builder = yaep_descr::read_grammar(SRC).expect("description parses");
  let grammar = builder.prepare().expect("grammar prepares");

  assert_eq!(grammar.symbol(grammar.start()).name, "E");

  let number = code_of(&grammar, "NUMBER");
  let plus = code_of(&grammar, "'+'");
  let star = code_of(&grammar, "'*'");

  // "NUMBER + NUMBER * NUMBER"
  let input = [(number, 2), (plus, 0), (number, 3), (star, 0), (number, 4)];
  let mut it = input.into_iter();
  let parser = Parser::parse(&grammar, || it.next(), |info| panic!("unexpected syntax error: {info:?}"))
    .expect("recognizes");
  let outcome = yaep_core::translate(&parser).expect("translates");
  assert!(!outcome.ambiguous);

  let TranslationNode::Anode { name, children, .. } = outcome.forest.get(outcome.root) else {
    panic!("expected a plus node at the root");
  };
  assert_eq!(name, "plus");
  assert!(matches!(outcome.forest.get(children[0]), TranslationNode::Terminal { attr: 2, .. }));
  let TranslationNode::Anode { name: mul_name, .. } = outcome.forest.get(children[1]) else {
    panic!("expected a mult node on the right");
  };
  assert_eq!(mul_name, "mult");
}

#[test]
fn rejects_unterminated_char_literal() {
  let err = yaep_descr::read_grammar("TERM A; S : 'x #1;").expect_err("malformed literal must fail");
  assert_eq!(err.code(), yaep_core::ErrorCode::DescriptionSyntaxError);
}
