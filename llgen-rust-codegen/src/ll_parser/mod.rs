//! The one conforming emitter shipped here (§4.8 of the specification):
//! one `parser.rs` carrying a token-name enum, a non-terminal-name enum, a
//! lazily-built table, and a thin `parse` wrapper. Grounded structurally in
//! `lapex-cpp-codegen`'s `ll_parser` module, which is the only *complete*
//! LL(1) emitter in the teacher repo; `lapex-rust-codegen`'s own
//! `ll_parser` is an unimplemented `todo!()`, so there is no working Rust
//! emitter to imitate line-for-line here, only its declared `quote`
//! dependency and the structural shape of the C++ one.

use std::io::Write;
use std::path::Path;

use llgen_codegen::GeneratedCode;
use llgen_grammar::{Grammar, GrammarSpec, Symbol};
use quote::{format_ident, quote};

const HEADER: &str = "// Generated by llgen. Do not edit by hand.\n\
// Requires in the consuming crate's Cargo.toml: llgen-grammar, llgen-runtime,\n\
// once_cell, serde_json.\n\n";

/// Renders `grammar` (already validated and built from `spec`) as a single
/// `parser.rs` file.
pub fn generate(spec: &GrammarSpec, grammar: &Grammar) -> Result<GeneratedCode, std::io::Error> {
    let grammar_json =
        serde_json::to_string(spec).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let non_terminal_variants: Vec<_> = grammar
        .non_terminals()
        .map(|symbol| format_ident!("{}", grammar.display_symbol(symbol)))
        .collect();

    let terminal_variants: Vec<_> = grammar
        .terminals()
        .map(|symbol| terminal_ident(grammar, symbol))
        .collect();

    let body = quote! {
        /// The grammar this parser recognizes, serialized once at
        /// generation time so the table can be rebuilt without depending
        /// on whatever produced it originally.
        pub static GRAMMAR_JSON: &str = #grammar_json;

        static GRAMMAR: once_cell::sync::Lazy<llgen_grammar::Grammar> =
            once_cell::sync::Lazy::new(|| {
                let spec: llgen_grammar::GrammarSpec = serde_json::from_str(GRAMMAR_JSON)
                    .expect("embedded grammar JSON is well-formed");
                llgen_grammar::Grammar::from_spec(&spec)
                    .expect("embedded grammar was validated at generation time")
            });

        static TABLE: once_cell::sync::Lazy<llgen_grammar::ParseTable> =
            once_cell::sync::Lazy::new(|| {
                llgen_grammar::build_table(&GRAMMAR)
                    .expect("embedded grammar was validated at generation time")
                    .0
            });

        /// Non-terminals declared by this grammar, for diagnostics only;
        /// the parser itself dispatches on `llgen_grammar::Symbol`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum NonTerminalName {
            #(#non_terminal_variants,)*
        }

        /// Terminals declared by this grammar, for diagnostics only. `Eof`
        /// stands for the end-of-input terminal (`TOK_EOF` in grammar
        /// text).
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum TerminalName {
            #(#terminal_variants,)*
            Eof,
        }

        /// Parses `tokens` against the embedded grammar and table.
        pub fn parse(
            tokens: impl IntoIterator<Item = llgen_runtime::Token>,
        ) -> Result<llgen_runtime::ParseNode, llgen_runtime::ParseError> {
            llgen_runtime::parse(&GRAMMAR, &TABLE, tokens)
        }
    };

    let mut generated = GeneratedCode::new();
    generated.add_generated_code(Path::new("parser.rs"), |w| {
        write!(w, "{HEADER}{body}")
    })?;
    Ok(generated)
}

/// Named terminals (`TOK_INT`) are already valid Rust identifiers; literal
/// terminals (`+`, `(`) are not, so they get a mechanical `LitNN` name keyed
/// on their codepoint. Any emitter that faithfully renders the table is
/// conforming, so this cosmetic scheme is not part of the contract.
fn terminal_ident(grammar: &Grammar, symbol: Symbol) -> proc_macro2::Ident {
    let rendering = grammar.display_symbol(symbol);
    let is_plain_ident = rendering
        .chars()
        .next()
        .map_or(false, |c| c == '_' || c.is_ascii_alphabetic())
        && rendering.chars().all(|c| c == '_' || c.is_ascii_alphanumeric());
    if is_plain_ident {
        format_ident!("{}", rendering)
    } else {
        let codepoint = rendering.chars().next().expect("terminal rendering is non-empty") as u32;
        format_ident!("Lit{}", codepoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn spec() -> GrammarSpec {
        GrammarSpec {
            start: "Expr".to_string(),
            productions: BTreeMap::from([
                ("Expr".to_string(), vec!["Primary + Primary TOK_EOF".to_string(), "Primary TOK_EOF".to_string()]),
                ("Primary".to_string(), vec!["TOK_INT".to_string(), "( Expr )".to_string()]),
            ]),
        }
    }

    #[test]
    fn emits_a_single_parser_file() {
        let spec = spec();
        let grammar = Grammar::from_spec(&spec).unwrap();
        let generated = generate(&spec, &grammar).unwrap();
        let files: Vec<_> = generated.iter().collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, Path::new("parser.rs"));
    }

    #[test]
    fn embeds_grammar_json_and_wrapper_function() {
        let spec = spec();
        let grammar = Grammar::from_spec(&spec).unwrap();
        let generated = generate(&spec, &grammar).unwrap();
        let (_, source) = generated.iter().next().unwrap();
        assert!(source.contains("GRAMMAR_JSON"));
        assert!(source.contains("\"start\":\"Expr\""));
        assert!(source.contains("pub fn parse"));
        assert!(source.contains("llgen_runtime :: parse"));
    }

    #[test]
    fn names_non_terminals_and_literal_terminals() {
        let spec = spec();
        let grammar = Grammar::from_spec(&spec).unwrap();
        let generated = generate(&spec, &grammar).unwrap();
        let (_, source) = generated.iter().next().unwrap();
        assert!(source.contains("enum NonTerminalName"));
        assert!(source.contains("Expr"));
        assert!(source.contains("Primary"));
        // '(' has codepoint 40, '+' has codepoint 43.
        assert!(source.contains("Lit40"));
        assert!(source.contains("Lit43"));
    }
}
