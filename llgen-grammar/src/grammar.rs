use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::production::Production;
use crate::symbol::{classify, RawSymbol, Symbol, SymbolTable};

/// The ambient, structured shape of a grammar as it crosses the process
/// boundary (§3.1, §6 of the specification). The textual grammar format
/// itself is out of scope for this crate; callers (the CLI, tests) load
/// or construct a `GrammarSpec` and hand it to [`Grammar::from_spec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarSpec {
    pub start: String,
    pub productions: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, PartialEq)]
pub enum GrammarError {
    UnclassifiableToken {
        head: String,
        body: String,
        token: String,
    },
    UnknownNonTerminal {
        head: String,
        body: String,
        name: String,
    },
    EpsilonNotSole {
        head: String,
        body: String,
    },
    EmptyProductionBody {
        head: String,
    },
    DirectLeftRecursion {
        head: String,
        body: String,
    },
    EmptyGrammar,
    MissingStart {
        start: String,
    },
    StartWithoutProductions {
        start: String,
    },
    StartMissingEndOfInput {
        start: String,
    },
}

impl Error for GrammarError {}

impl Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UnclassifiableToken { head, body, token } => write!(
                f,
                "unclassifiable token '{token}' in production {head} -> {body}"
            ),
            GrammarError::UnknownNonTerminal { head, body, name } => write!(
                f,
                "reference to undeclared non-terminal '{name}' in production {head} -> {body}"
            ),
            GrammarError::EpsilonNotSole { head, body } => write!(
                f,
                "'$' must be the sole token of a production body, found in {head} -> {body}"
            ),
            GrammarError::EmptyProductionBody { head } => {
                write!(f, "production body for '{head}' has no tokens")
            }
            GrammarError::DirectLeftRecursion { head, body } => write!(
                f,
                "direct left recursion in production {head} -> {body}"
            ),
            GrammarError::EmptyGrammar => write!(f, "grammar declares no productions"),
            GrammarError::MissingStart { start } => {
                write!(f, "start symbol '{start}' has no declared productions")
            }
            GrammarError::StartWithoutProductions { start } => {
                write!(f, "start symbol '{start}' has an empty production list")
            }
            GrammarError::StartMissingEndOfInput { start } => write!(
                f,
                "start symbol '{start}' has no production ending in the end-of-input terminal"
            ),
        }
    }
}

/// A fully ingested grammar: the symbol table, every production grouped
/// implicitly by head (productions carry their own head), and the start
/// symbol. Immutable once built.
#[derive(Debug)]
pub struct Grammar {
    symbols: SymbolTable,
    productions: Vec<Production>,
    start: Symbol,
}

impl Grammar {
    /// Ingests a [`GrammarSpec`] per §4.2 of the specification.
    pub fn from_spec(spec: &GrammarSpec) -> Result<Self, GrammarError> {
        if spec.productions.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        let mut symbols = SymbolTable::new();
        for head in spec.productions.keys() {
            symbols.intern_non_terminal(head);
        }

        let mut productions = Vec::new();
        for (head_name, bodies) in &spec.productions {
            let head = symbols
                .lookup_non_terminal(head_name)
                .expect("head was just interned");
            for body_text in bodies {
                let body = resolve_body(&mut symbols, head_name, body_text, head)?;
                productions.push(Production::new(head, body));
            }
        }

        let start = symbols
            .lookup_non_terminal(&spec.start)
            .ok_or_else(|| GrammarError::MissingStart {
                start: spec.start.clone(),
            })?;
        let start_productions: Vec<&Production> =
            productions.iter().filter(|p| p.head() == start).collect();
        if start_productions.is_empty() {
            return Err(GrammarError::StartWithoutProductions {
                start: spec.start.clone(),
            });
        }
        if !start_productions
            .iter()
            .any(|p| p.body().contains(&Symbol::End))
        {
            return Err(GrammarError::StartMissingEndOfInput {
                start: spec.start.clone(),
            });
        }

        Ok(Grammar {
            symbols,
            productions,
            start,
        })
    }

    pub fn start(&self) -> Symbol {
        self.start
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn productions_of(&self, head: Symbol) -> impl Iterator<Item = &Production> {
        self.productions.iter().filter(move |p| p.head() == head)
    }

    pub fn non_terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.non_terminals()
    }

    pub fn terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.terminals()
    }

    pub fn display_symbol(&self, symbol: Symbol) -> String {
        self.symbols.display(symbol)
    }
}

fn resolve_body(
    symbols: &mut SymbolTable,
    head_name: &str,
    body_text: &str,
    head: Symbol,
) -> Result<Vec<Symbol>, GrammarError> {
    let tokens: Vec<&str> = body_text.split_whitespace().collect();
    let mut body = Vec::with_capacity(tokens.len());
    for token in &tokens {
        let raw = classify(token).map_err(|_| GrammarError::UnclassifiableToken {
            head: head_name.to_string(),
            body: body_text.to_string(),
            token: token.to_string(),
        })?;
        let symbol = match raw {
            RawSymbol::Epsilon => Symbol::Epsilon,
            RawSymbol::NamedTerminal(name) if name == "TOK_EOF" => Symbol::End,
            RawSymbol::NamedTerminal(name) => symbols.intern_named_terminal(name),
            RawSymbol::LiteralTerminal(c) => symbols.intern_literal_terminal(c),
            RawSymbol::NonTerminal(name) => {
                symbols
                    .lookup_non_terminal(name)
                    .ok_or_else(|| GrammarError::UnknownNonTerminal {
                        head: head_name.to_string(),
                        body: body_text.to_string(),
                        name: name.to_string(),
                    })?
            }
        };
        body.push(symbol);
    }

    if body.is_empty() {
        return Err(GrammarError::EmptyProductionBody {
            head: head_name.to_string(),
        });
    }
    if body.iter().any(Symbol::is_epsilon) && body.len() != 1 {
        return Err(GrammarError::EpsilonNotSole {
            head: head_name.to_string(),
            body: body_text.to_string(),
        });
    }
    if body[0] == head {
        return Err(GrammarError::DirectLeftRecursion {
            head: head_name.to_string(),
            body: body_text.to_string(),
        });
    }

    Ok(body)
}
