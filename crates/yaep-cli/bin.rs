//! Thin demonstration CLI (spec §6.4, grounded in `radlr-cli`'s use of
//! `clap`): reads a `.g` grammar description and a token file, recognizes,
//! and prints either the resulting translation tree or the parse error.
//! Not part of the core's tested surface.

use clap::Parser as ClapParser;
use yaep_core::{Forest, NodeId, Parser, TranslationNode};

#[derive(ClapParser, Debug)]
#[command(name = "yaep", about = "Recognize a token stream against a YAEP grammar description")]
struct Args {
  /// Path to a `.g` grammar description file.
  grammar: String,
  /// Path to a token file: one `code [attr]` pair per line.
  tokens: String,
  #[arg(long, default_value_t = 1)]
  lookahead_level: u8,
  /// Build the full shared packed forest instead of selecting one derivation.
  #[arg(long)]
  forest: bool,
  /// With a single derivation selected, prefer the cost-minimal one.
  #[arg(long)]
  cost: bool,
  #[arg(long)]
  error_recovery: bool,
}

fn main() {
  env_logger::init();
  let args = Args::parse();

  if let Err(msg) = run(&args) {
    eprintln!("error: {msg}");
    std::process::exit(1);
  }
}

fn run(args: &Args) -> Result<(), String> {
  let src = std::fs::read_to_string(&args.grammar).map_err(|e| format!("reading {}: {e}", args.grammar))?;
  let builder = yaep_descr::read_grammar(&src).map_err(|e| e.to_string())?;
  let builder = builder
    .set_lookahead_level(args.lookahead_level)
    .set_one_parse(!args.forest)
    .set_cost(args.cost)
    .set_error_recovery(args.error_recovery);
  let grammar = builder.prepare().map_err(|e| e.to_string())?;

  let tokens_src =
    std::fs::read_to_string(&args.tokens).map_err(|e| format!("reading {}: {e}", args.tokens))?;
  let pairs = parse_tokens(&tokens_src)?;
  let mut it = pairs.into_iter();

  let parser = Parser::parse(&grammar, || it.next(), |info| {
    println!(
      "recovered at token {}: skipped {} token(s), absorbed {} into 'error'",
      info.position, info.tokens_skipped, info.tokens_ignored
    );
  })
  .map_err(|e| e.to_string())?;

  let outcome = yaep_core::translate(&parser).map_err(|e| e.to_string())?;
  if outcome.ambiguous {
    println!("# ambiguous parse (printing {})", if args.forest { "the shared forest" } else { "the selected derivation" });
  }
  print_node(&outcome.forest, outcome.root, 0);
  Ok(())
}

/// One `code [attr]` pair per non-empty line.
fn parse_tokens(src: &str) -> Result<Vec<(i32, i64)>, String> {
  let mut out = Vec::new();
  for (lineno, line) in src.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    let mut parts = line.split_whitespace();
    let code: i32 = parts
      .next()
      .ok_or_else(|| format!("token file line {}: missing code", lineno + 1))?
      .parse()
      .map_err(|_| format!("token file line {}: invalid code", lineno + 1))?;
    let attr: i64 = match parts.next() {
      Some(s) => s.parse().map_err(|_| format!("token file line {}: invalid attr", lineno + 1))?,
      None => 0,
    };
    out.push((code, attr));
  }
  Ok(out)
}

fn print_node(forest: &Forest, id: NodeId, depth: usize) {
  let indent = "  ".repeat(depth);
  match forest.get(id) {
    TranslationNode::Terminal { symbol, attr } => {
      println!("{indent}Terminal(symbol={}, attr={attr})", symbol.index());
    }
    TranslationNode::Anode { name, cost, children } => {
      println!("{indent}{name} (cost={cost})");
      for &child in children {
        print_node(forest, child, depth + 1);
      }
    }
    TranslationNode::Alt { alternatives } => {
      println!("{indent}Alt");
      for &alt in alternatives {
        print_node(forest, alt, depth + 1);
      }
    }
    TranslationNode::ErrorSpan { tokens } => {
      println!("{indent}ErrorSpan");
      for &tok in tokens {
        print_node(forest, tok, depth + 1);
      }
    }
  }
}
