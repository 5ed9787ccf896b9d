use std::path::Path;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLine {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Generate a parser from a grammar")]
    Generate {
        grammar: String,
        #[arg(long, help = "The target directory to write the generated code to", default_value = "./generated/")]
        target: String,
    },
    #[command(about = "Print FIRST/FOLLOW sets and the parse table")]
    Table { grammar: String },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = CommandLine::parse();
    match cli.command {
        Commands::Generate { grammar, target } => {
            llgen_cli::generate(Path::new(&grammar), Path::new(&target))?;
        }
        Commands::Table { grammar } => {
            llgen_cli::print_table(Path::new(&grammar))?;
        }
    }
    Ok(())
}
