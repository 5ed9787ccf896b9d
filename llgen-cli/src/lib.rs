//! Thin library behind the `llgen` binary: load a grammar, run analysis,
//! and either emit a parser or print the computed sets/table. Mirrors the
//! teacher's own `lapex`/`lapex-cli` split — a library crate holding the
//! logic, a binary crate holding nothing but argument parsing.

use std::{
    error::Error,
    fmt::{self, Display},
    fs,
    path::Path,
};

use llgen_grammar::{build_table, Grammar, GrammarError, GrammarSpec, TableError};

#[derive(Debug)]
pub enum GenerateError {
    Io { path: std::path::PathBuf, error: std::io::Error },
    MalformedGrammar { path: std::path::PathBuf, error: serde_json::Error },
    Grammar(GrammarError),
    Table(TableError),
}

impl Error for GenerateError {}

impl Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Io { path, error } => {
                write!(f, "could not read '{}': {error}", path.display())
            }
            GenerateError::MalformedGrammar { path, error } => {
                write!(f, "'{}' is not a well-formed grammar: {error}", path.display())
            }
            GenerateError::Grammar(error) => write!(f, "{error}"),
            GenerateError::Table(error) => write!(f, "{error}"),
        }
    }
}

fn load_spec(grammar_path: &Path) -> Result<GrammarSpec, GenerateError> {
    let contents = fs::read_to_string(grammar_path).map_err(|error| GenerateError::Io {
        path: grammar_path.to_path_buf(),
        error,
    })?;
    serde_json::from_str(&contents).map_err(|error| GenerateError::MalformedGrammar {
        path: grammar_path.to_path_buf(),
        error,
    })
}

/// `llgen generate <grammar.json> --target <dir>`: ingest, build the
/// table, emit the one conforming Rust parser, and write it under
/// `target_path` (created if missing).
pub fn generate(grammar_path: &Path, target_path: &Path) -> Result<(), GenerateError> {
    let spec = load_spec(grammar_path)?;
    let grammar = Grammar::from_spec(&spec).map_err(GenerateError::Grammar)?;
    build_table(&grammar).map_err(GenerateError::Table)?;

    let generated = llgen_rust_codegen::generate(&spec, &grammar).map_err(|error| GenerateError::Io {
        path: target_path.to_path_buf(),
        error,
    })?;

    fs::create_dir_all(target_path).map_err(|error| GenerateError::Io {
        path: target_path.to_path_buf(),
        error,
    })?;
    for (name, contents) in generated.iter() {
        let out_path = target_path.join(name);
        fs::write(&out_path, contents).map_err(|error| GenerateError::Io {
            path: out_path,
            error,
        })?;
    }
    Ok(())
}

/// `llgen table <grammar.json>`: ingest, build the table, and print
/// FIRST/FOLLOW and the table cells for inspection.
pub fn print_table(grammar_path: &Path) -> Result<(), GenerateError> {
    let spec = load_spec(grammar_path)?;
    let grammar = Grammar::from_spec(&spec).map_err(GenerateError::Grammar)?;
    let (table, first_sets, follow_sets) = build_table(&grammar).map_err(GenerateError::Table)?;

    println!("FIRST sets:");
    for non_terminal in grammar.non_terminals() {
        let rendering = set_to_string(&grammar, &first_sets[&non_terminal]);
        println!("  FIRST({}) = {{ {} }}", grammar.display_symbol(non_terminal), rendering);
    }

    println!("FOLLOW sets:");
    for non_terminal in grammar.non_terminals() {
        let rendering = set_to_string(&grammar, &follow_sets[&non_terminal]);
        println!("  FOLLOW({}) = {{ {} }}", grammar.display_symbol(non_terminal), rendering);
    }

    println!("Parse table ({} cells):", table.len());
    for (head, lookahead, index) in table.iter() {
        let production = &grammar.productions()[index];
        let body: Vec<String> = production
            .body()
            .iter()
            .map(|&s| grammar.display_symbol(s))
            .collect();
        println!(
            "  [{}, {}] -> {} -> {}",
            grammar.display_symbol(head),
            grammar.display_symbol(lookahead),
            grammar.display_symbol(head),
            body.join(" ")
        );
    }

    Ok(())
}

fn set_to_string(grammar: &Grammar, set: &llgen_grammar::SymbolSet) -> String {
    set.iter()
        .map(|&s| grammar.display_symbol(s))
        .collect::<Vec<_>>()
        .join(", ")
}
