//! End-to-end coverage of ingest -> analyse -> build-table -> run-parser,
//! spanning `llgen-grammar` and `llgen-runtime`.

use std::collections::BTreeMap;

use llgen_grammar::{build_table, Grammar, GrammarError, GrammarSpec, Symbol};
use llgen_runtime::{parse, ParseError, Token};

fn spec(start: &str, productions: &[(&str, &[&str])]) -> GrammarSpec {
    GrammarSpec {
        start: start.to_string(),
        productions: productions
            .iter()
            .map(|(head, bodies)| {
                (
                    head.to_string(),
                    bodies.iter().map(|b| b.to_string()).collect(),
                )
            })
            .collect::<BTreeMap<_, _>>(),
    }
}

/// `Expr -> Sum TOK_EOF`, `Sum -> Primary SumPrime`,
/// `SumPrime -> + Primary SumPrime | - Primary SumPrime | $`,
/// `Primary -> ( Sum ) | TOK_INT`.
fn arithmetic_grammar() -> Grammar {
    Grammar::from_spec(&spec(
        "Expr",
        &[
            ("Expr", &["Sum TOK_EOF"]),
            ("Sum", &["Primary SumPrime"]),
            (
                "SumPrime",
                &["+ Primary SumPrime", "- Primary SumPrime", "$"],
            ),
            ("Primary", &["( Sum )", "TOK_INT"]),
        ],
    ))
    .unwrap()
}

fn terminal(grammar: &Grammar, rendering: &str) -> Symbol {
    grammar
        .terminals()
        .find(|&s| grammar.display_symbol(s) == rendering)
        .unwrap_or_else(|| panic!("no terminal renders as {rendering}"))
}

#[test]
fn scenario_1_flat_addition() {
    let grammar = arithmetic_grammar();
    let (table, ..) = build_table(&grammar).unwrap();
    let int = terminal(&grammar, "TOK_INT");
    let plus = terminal(&grammar, "+");
    let tokens = vec![
        Token::new(int, "1", 1, 1),
        Token::new(plus, "+", 1, 2),
        Token::new(int, "2", 1, 3),
        Token::new(Symbol::End, "", 1, 4),
    ];
    let tree = parse(&grammar, &table, tokens).unwrap();
    assert_eq!(tree.non_terminal, grammar.start());
    let lexemes: Vec<String> = tree
        .terminal_listing()
        .iter()
        .map(|t| t.lexeme.clone())
        .collect();
    assert_eq!(lexemes, vec!["1", "+", "2", ""]);
}

#[test]
fn scenario_2_parenthesised_subtraction() {
    let grammar = arithmetic_grammar();
    let (table, ..) = build_table(&grammar).unwrap();
    let int = terminal(&grammar, "TOK_INT");
    let minus = terminal(&grammar, "-");
    let open = terminal(&grammar, "(");
    let close = terminal(&grammar, ")");
    let tokens = vec![
        Token::new(open, "(", 1, 1),
        Token::new(int, "3", 1, 2),
        Token::new(minus, "-", 1, 3),
        Token::new(int, "4", 1, 4),
        Token::new(close, ")", 1, 5),
        Token::new(Symbol::End, "", 1, 6),
    ];
    let tree = parse(&grammar, &table, tokens).unwrap();
    let primary = &tree.children[0].children[0];
    let inner_sum = &primary.children[0];
    let inner_terminals: Vec<String> = inner_sum
        .terminal_listing()
        .iter()
        .map(|t| t.lexeme.clone())
        .collect();
    assert_eq!(inner_terminals, vec!["3", "-", "4"]);
}

#[test]
fn scenario_3_unexpected_operator_is_a_parse_error() {
    let grammar = arithmetic_grammar();
    let (table, ..) = build_table(&grammar).unwrap();
    let int = terminal(&grammar, "TOK_INT");
    // '*' never appears in the grammar, so it has no interned terminal id;
    // stand in with an id no production predicts on.
    let star = Symbol::Terminal(u32::MAX);
    let tokens = vec![
        Token::new(int, "1", 1, 1),
        Token::new(star, "*", 1, 2),
        Token::new(int, "2", 1, 3),
        Token::new(Symbol::End, "", 1, 4),
    ];
    let err = parse(&grammar, &table, tokens).unwrap_err();
    assert!(matches!(err, ParseError::NoProduction { .. }));
}

#[test]
fn scenario_4_direct_left_recursion_is_rejected() {
    let g = spec("Item", &[("Item", &["Item + TOK_EOF", "- TOK_EOF"])]);
    assert!(matches!(
        Grammar::from_spec(&g),
        Err(GrammarError::DirectLeftRecursion { .. })
    ));
}

#[test]
fn scenario_5_ll1_conflict_names_both_productions() {
    let g = spec(
        "Item",
        &[
            ("Item", &["+ NodeB TOK_EOF", "+ NodeC TOK_EOF"]),
            ("NodeB", &["-"]),
            ("NodeC", &["*"]),
        ],
    );
    let grammar = Grammar::from_spec(&g).unwrap();
    let err = build_table(&grammar).unwrap_err();
    assert_eq!(err.head, "Item");
    assert_eq!(err.lookahead, "+");
}

#[test]
fn scenario_6_dangling_else_binds_to_nearest_if() {
    let grammar = Grammar::from_spec(&spec(
        "Start",
        &[
            ("Start", &["Stmt TOK_EOF"]),
            ("Stmt", &["IF ( Expr ) Stmt Else", "TOK_ID ;", "$"]),
            ("Else", &["ELSE Stmt", "$"]),
            ("Expr", &["TOK_ID"]),
        ],
    ))
    .unwrap();
    let (table, ..) = build_table(&grammar).unwrap();

    let id = terminal(&grammar, "TOK_ID");
    let if_kw = terminal(&grammar, "IF");
    let else_kw = terminal(&grammar, "ELSE");
    let open = terminal(&grammar, "(");
    let close = terminal(&grammar, ")");
    let semi = terminal(&grammar, ";");

    // if (ID) if (ID) ID; else ID; TOK_EOF
    let tokens = vec![
        Token::new(if_kw, "if", 1, 1),
        Token::new(open, "(", 1, 2),
        Token::new(id, "a", 1, 3),
        Token::new(close, ")", 1, 4),
        Token::new(if_kw, "if", 1, 5),
        Token::new(open, "(", 1, 6),
        Token::new(id, "b", 1, 7),
        Token::new(close, ")", 1, 8),
        Token::new(id, "c", 1, 9),
        Token::new(semi, ";", 1, 10),
        Token::new(else_kw, "else", 1, 11),
        Token::new(id, "d", 1, 12),
        Token::new(semi, ";", 1, 13),
        Token::new(Symbol::End, "", 1, 14),
    ];

    let tree = parse(&grammar, &table, tokens).unwrap();
    let outer_stmt = &tree.children[0];
    let outer_else = &outer_stmt.children[2];
    assert!(
        outer_else.empty,
        "the else clause must not attach to the outer if"
    );

    let inner_stmt = &outer_stmt.children[1];
    let inner_else = &inner_stmt.children[2];
    assert!(
        !inner_else.empty,
        "the else clause must attach to the nearest (inner) if"
    );
}
