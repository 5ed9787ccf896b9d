//! FIRST and FOLLOW set computation (§4.3, §4.4 of the specification).
//!
//! Both are classical fixed-point iterations over the grammar's
//! productions, ported directly from `lapex-parser`'s `util.rs` and
//! `ll_parser/mod.rs`: arrays indexed by non-terminal id, iterate until a
//! full pass inserts nothing new.

use std::collections::{BTreeMap, BTreeSet};

use crate::grammar::Grammar;
use crate::symbol::Symbol;

pub type SymbolSet = BTreeSet<Symbol>;
pub type SetTable = BTreeMap<Symbol, SymbolSet>;

/// FIRST(α) for a symbol sequence, given already-computed FIRST sets for
/// every non-terminal. Mirrors `get_first_terminals_of_sequence` in the
/// teacher: walks the sequence left to right, stopping as soon as a
/// non-nullable symbol is found, carrying ε forward only if every symbol
/// seen so far (including the last) was nullable.
pub fn first_of_sequence(sequence: &[Symbol], first_sets: &SetTable) -> SymbolSet {
    let mut result = SymbolSet::new();
    for (i, &symbol) in sequence.iter().enumerate() {
        let is_last = i + 1 == sequence.len();
        match symbol {
            Symbol::Terminal(_) | Symbol::End => {
                result.insert(symbol);
                return result;
            }
            Symbol::Epsilon => {
                if is_last {
                    result.insert(Symbol::Epsilon);
                }
            }
            Symbol::NonTerminal(_) => {
                let first_of_symbol = first_sets
                    .get(&symbol)
                    .expect("FIRST set missing for known non-terminal");
                let has_epsilon = first_of_symbol.contains(&Symbol::Epsilon);
                for &s in first_of_symbol {
                    if s != Symbol::Epsilon {
                        result.insert(s);
                    }
                }
                if !has_epsilon {
                    return result;
                }
                if is_last {
                    result.insert(Symbol::Epsilon);
                }
            }
        }
    }
    result
}

/// Computes FIRST(A) for every non-terminal `A` (§4.3).
pub fn compute_first_sets(grammar: &Grammar) -> SetTable {
    let mut first_sets: SetTable = grammar
        .non_terminals()
        .map(|nt| (nt, SymbolSet::new()))
        .collect();

    loop {
        let mut changed = false;
        for production in grammar.productions() {
            let first_of_rhs = first_of_sequence(production.body(), &first_sets);
            let first_of_head = first_sets
                .get_mut(&production.head())
                .expect("head is a known non-terminal");
            for symbol in first_of_rhs {
                changed |= first_of_head.insert(symbol);
            }
        }
        if !changed {
            break;
        }
    }

    first_sets
}

/// Computes FOLLOW(A) for every non-terminal `A` (§4.4). FOLLOW(start) is
/// seeded with the end-of-input terminal before the fixed point runs,
/// synthesising the "fresh, unused follow terminal" the data model
/// promises for the start symbol (§3, §9 Open Question resolution).
pub fn compute_follow_sets(grammar: &Grammar, first_sets: &SetTable) -> SetTable {
    let mut follow_sets: SetTable = grammar
        .non_terminals()
        .map(|nt| (nt, SymbolSet::new()))
        .collect();
    follow_sets
        .get_mut(&grammar.start())
        .expect("start symbol is a known non-terminal")
        .insert(Symbol::End);

    loop {
        let mut changed = false;
        for production in grammar.productions() {
            let mut trailer = follow_sets[&production.head()].clone();
            for &symbol in production.body().iter().rev() {
                match symbol {
                    Symbol::Terminal(_) | Symbol::End => {
                        trailer = SymbolSet::from([symbol]);
                    }
                    Symbol::Epsilon => {}
                    Symbol::NonTerminal(_) => {
                        let follow_of_symbol = follow_sets.get_mut(&symbol).unwrap();
                        for &t in &trailer {
                            changed |= follow_of_symbol.insert(t);
                        }
                        let first_of_symbol = &first_sets[&symbol];
                        trailer = if first_of_symbol.contains(&Symbol::Epsilon) {
                            let mut next = first_of_symbol.clone();
                            next.remove(&Symbol::Epsilon);
                            next.extend(follow_sets[&symbol].iter().copied());
                            next
                        } else {
                            first_of_symbol.clone()
                        };
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    follow_sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarSpec;
    use std::collections::BTreeMap;

    fn grammar(start: &str, productions: &[(&str, &[&str])]) -> Grammar {
        let spec = GrammarSpec {
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
        };
        Grammar::from_spec(&spec).unwrap()
    }

    #[test]
    fn first_set_of_nullable_chain() {
        // Primary -> ( Expr ) | TOK_INT
        // Expr -> Primary Tail
        // Tail -> + Primary Tail | $
        let g = grammar(
            "Expr",
            &[
                ("Primary", &["( Expr )", "TOK_INT"]),
                ("Expr", &["Primary Tail TOK_EOF"]),
                ("Tail", &["+ Primary Tail", "$"]),
            ],
        );
        let first = compute_first_sets(&g);
        let tail = g.symbols().lookup_non_terminal("Tail").unwrap();
        let first_tail = &first[&tail];
        assert!(first_tail.contains(&Symbol::Epsilon));
        assert!(first_tail.iter().any(|s| g.display_symbol(*s) == "+"));
    }

    #[test]
    fn follow_set_includes_end_for_start() {
        let g = grammar("Expr", &[("Expr", &["TOK_INT TOK_EOF"])]);
        let first = compute_first_sets(&g);
        let follow = compute_follow_sets(&g, &first);
        let expr = g.start();
        assert!(follow[&expr].contains(&Symbol::End));
    }

    #[test]
    fn follow_set_propagates_through_nullable_tail() {
        let g = grammar(
            "Expr",
            &[
                ("Primary", &["( Expr )", "TOK_INT"]),
                ("Expr", &["Primary Tail TOK_EOF"]),
                ("Tail", &["+ Primary Tail", "$"]),
            ],
        );
        let first = compute_first_sets(&g);
        let follow = compute_follow_sets(&g, &first);
        let primary = g.symbols().lookup_non_terminal("Primary").unwrap();
        // Primary is followed by ')' (from the parenthesised case), '+'
        // (from Tail's recursive case), and TOK_EOF (end of the top rule).
        assert!(follow[&primary].iter().any(|s| g.display_symbol(*s) == ")"));
        assert!(follow[&primary].iter().any(|s| g.display_symbol(*s) == "+"));
        assert!(follow[&primary].contains(&Symbol::End));
    }

    #[test]
    fn fixed_point_is_idempotent() {
        let g = grammar(
            "Expr",
            &[
                ("Primary", &["( Expr )", "TOK_INT"]),
                ("Expr", &["Primary Tail TOK_EOF"]),
                ("Tail", &["+ Primary Tail", "$"]),
            ],
        );
        let first = compute_first_sets(&g);
        let first_again = compute_first_sets(&g);
        assert_eq!(first, first_again);
        let follow = compute_follow_sets(&g, &first);
        let follow_again = compute_follow_sets(&g, &first);
        assert_eq!(follow, follow_again);
    }
}
