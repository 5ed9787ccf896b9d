//! Predict-set computation and parse-table construction (§4.5, §4.6).

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display};

use crate::grammar::Grammar;
use crate::sets::{compute_first_sets, compute_follow_sets, SetTable};
use crate::symbol::Symbol;

#[derive(Debug, PartialEq)]
pub struct TableError {
    pub head: String,
    pub lookahead: String,
    pub existing_production: String,
    pub conflicting_production: String,
}

impl Error for TableError {}

impl Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LL(1) conflict on ({}, {}): '{}' and '{}' both predict this cell",
            self.head, self.lookahead, self.existing_production, self.conflicting_production
        )
    }
}

/// `NonTerminal -> (Terminal -> Production)`, represented as a flat map
/// keyed by `(head, lookahead)`, each value the index of the selected
/// production within [`Grammar::productions`].
#[derive(Debug, Default)]
pub struct ParseTable {
    cells: BTreeMap<(Symbol, Symbol), usize>,
}

impl ParseTable {
    pub fn get(&self, head: Symbol, lookahead: Symbol) -> Option<usize> {
        self.cells.get(&(head, lookahead)).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, Symbol, usize)> + '_ {
        self.cells.iter().map(|(&(h, t), &idx)| (h, t, idx))
    }
}

/// Computes FIRST, FOLLOW, and every production's predict set, then
/// builds the parse table, reporting the first genuine LL(1) conflict
/// found in grammar declaration order (§4.6, §9 "production order vs.
/// set order").
///
/// A cell predicted by both a non-terminal's epsilon alternative and one
/// of its non-epsilon alternatives (e.g. `if (...) Stmt Else` vs. `Else
/// -> $`, the classic dangling-else case: `else` ends up in both FIRST of
/// the shift alternative and, via FOLLOW, the epsilon one) is not treated
/// as ambiguous: the non-epsilon alternative wins, so the table always
/// shifts where a real alternative is available rather than arbitrarily
/// closing the construct. Any other two-production collision is a real
/// conflict and gets reported.
pub fn build_table(grammar: &Grammar) -> Result<(ParseTable, SetTable, SetTable), TableError> {
    let first_sets = compute_first_sets(grammar);
    let follow_sets = compute_follow_sets(grammar, &first_sets);

    let mut table = ParseTable::default();
    for (index, production) in grammar.productions().iter().enumerate() {
        let predict = predict_set(production.body(), production.head(), &first_sets, &follow_sets);
        for &terminal in &predict {
            let key = (production.head(), terminal);
            if let Some(&existing_index) = table.cells.get(&key) {
                if existing_index != index {
                    let existing_production = &grammar.productions()[existing_index];
                    match (existing_production.is_epsilon(), production.is_epsilon()) {
                        (true, false) => {
                            table.cells.insert(key, index);
                        }
                        (false, true) => {}
                        _ => {
                            return Err(TableError {
                                head: grammar.display_symbol(production.head()),
                                lookahead: grammar.display_symbol(terminal),
                                existing_production: production_text(grammar, existing_production),
                                conflicting_production: production_text(grammar, production),
                            });
                        }
                    }
                }
            } else {
                table.cells.insert(key, index);
            }
        }
        production.set_predict_set(predict.into_iter().collect());
    }

    Ok((table, first_sets, follow_sets))
}

/// The augmented-FIRST (predict) set of one production body, per §4.5:
/// the minimal leading-symbol form, matching the grounding Python source
/// exactly (see DESIGN.md for the nullable-prefix alternative this
/// deliberately does not implement).
fn predict_set(
    body: &[Symbol],
    head: Symbol,
    first_sets: &SetTable,
    follow_sets: &SetTable,
) -> std::collections::BTreeSet<Symbol> {
    let leading = body[0];
    let mut predict = match leading {
        Symbol::Terminal(_) | Symbol::End => std::collections::BTreeSet::from([leading]),
        Symbol::Epsilon => std::collections::BTreeSet::new(),
        Symbol::NonTerminal(_) => first_sets[&leading].clone(),
    };
    if leading.is_epsilon() || predict.remove(&Symbol::Epsilon) {
        predict.extend(follow_sets[&head].iter().copied());
    }
    predict
}

fn production_text(grammar: &Grammar, production: &crate::production::Production) -> String {
    let body: Vec<String> = production
        .body()
        .iter()
        .map(|&s| grammar.display_symbol(s))
        .collect();
    format!("{} -> {}", grammar.display_symbol(production.head()), body.join(" "))
}
