//! The table-driven predictive parse loop (§4.7 of the specification):
//! a symbol stack drives what to expect next, a parallel node stack
//! accumulates the tree being built. Grounded in the state machine the
//! generated C++ `Parser::parse` method runs, generalised here into one
//! function any emitted Rust parser calls into instead of re-inlining the
//! loop per grammar (see DESIGN.md for why).

use std::error::Error;
use std::fmt::{self, Display};
use std::rc::Rc;

use llgen_grammar::{Grammar, ParseTable, Symbol};

use crate::source::{SliceTokenSource, TokenSource};
use crate::token::Token;
use crate::tree::ParseNode;

/// One entry of the symbol stack. `NonTerminalEnd` is pushed alongside a
/// non-terminal's expansion so its completion can be detected by position
/// rather than by re-identifying which non-terminal just finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseEntry {
    Terminal(Symbol),
    NonTerminal(Symbol),
    NonTerminalEnd,
}

#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// No table cell exists for this non-terminal under the lookahead
    /// (including a lookahead of "no token left").
    NoProduction {
        non_terminal: Symbol,
        found: Option<Rc<Token>>,
    },
    /// The next token's kind does not match the terminal the stack expects.
    TerminalMismatch {
        expected: Symbol,
        found: Option<Rc<Token>>,
    },
}

impl Error for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NoProduction { found, .. } | ParseError::TerminalMismatch { found, .. } => {
                match found {
                    Some(token) => write!(
                        f,
                        "unexpected token '{}' at {}:{}",
                        token.lexeme, token.line, token.column
                    ),
                    None => write!(f, "unexpected end of input"),
                }
            }
        }
    }
}

/// Parses an already materialised token sequence against `grammar`/`table`.
pub fn parse(
    grammar: &Grammar,
    table: &ParseTable,
    tokens: impl IntoIterator<Item = Token>,
) -> Result<ParseNode, ParseError> {
    run(grammar, table, SliceTokenSource::new(tokens))
}

/// Runs the predictive parse over any [`TokenSource`], so a streaming
/// lexer can drive the same loop without materialising its tokens first.
pub fn run<S: TokenSource>(
    grammar: &Grammar,
    table: &ParseTable,
    mut tokens: S,
) -> Result<ParseNode, ParseError> {
    let mut symbol_stack = vec![ParseEntry::NonTerminal(grammar.start())];
    let mut node_stack: Vec<ParseNode> = Vec::new();

    while let Some(focus) = symbol_stack.pop() {
        match focus {
            ParseEntry::NonTerminal(non_terminal) => {
                let lookahead = tokens.peek();
                let production_index = lookahead
                    .as_ref()
                    .and_then(|token| table.get(non_terminal, token.kind))
                    .ok_or_else(|| ParseError::NoProduction {
                        non_terminal,
                        found: lookahead.clone(),
                    })?;
                let production = &grammar.productions()[production_index];

                if production.is_epsilon() {
                    let child = ParseNode::empty(non_terminal);
                    if let Some(parent) = node_stack.last_mut() {
                        parent.push_child(child);
                    } else {
                        node_stack.push(child);
                    }
                } else {
                    node_stack.push(ParseNode::non_empty(non_terminal));
                    symbol_stack.push(ParseEntry::NonTerminalEnd);
                    for &symbol in production.body().iter().rev() {
                        symbol_stack.push(match symbol {
                            Symbol::NonTerminal(_) => ParseEntry::NonTerminal(symbol),
                            _ => ParseEntry::Terminal(symbol),
                        });
                    }
                }
            }
            ParseEntry::Terminal(expected) => {
                let token = tokens.peek().ok_or(ParseError::TerminalMismatch {
                    expected,
                    found: None,
                })?;
                if token.kind != expected {
                    return Err(ParseError::TerminalMismatch {
                        expected,
                        found: Some(token),
                    });
                }
                tokens.advance();
                node_stack
                    .last_mut()
                    .expect("terminal consumed with no open node")
                    .push_terminal(token);
            }
            ParseEntry::NonTerminalEnd => {
                if node_stack.len() == 1 {
                    break;
                }
                let completed = node_stack.pop().expect("NonTerminalEnd with no open node");
                node_stack
                    .last_mut()
                    .expect("completed node has no parent")
                    .push_child(completed);
            }
        }
    }

    Ok(node_stack.pop().expect("root node always present"))
}
