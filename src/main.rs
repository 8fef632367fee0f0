use clap::{Parser as ClapParser, Subcommand};
use clause_lang::cli::{self, CheckOptions, CliError, InspectFormat};
use clause_lang::{ConditionEngine, FactSheet, output, registry::PredicateRegistry};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "clause")]
#[command(about = "Clause - parse and evaluate boolean condition strings")]
#[command(version)]
struct Cli {
    /// Log parser and evaluator decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a condition against a set of facts
    Check {
        /// The condition to evaluate
        condition: String,

        /// Facts as a JSON object (reads from stdin if piped and not provided)
        #[arg(short, long, conflicts_with = "facts_file")]
        facts: Option<String>,

        /// Read facts from a JSON file
        #[arg(long)]
        facts_file: Option<PathBuf>,

        /// Print the parsed tree before the result
        #[arg(long)]
        explain: bool,
    },

    /// Print the token stream of a condition
    Tokens {
        condition: String,

        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Print the parsed expression tree of a condition
    Tree {
        condition: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List documentation topics, or show one
    Docs {
        /// Topic name (omit to list topics)
        topic: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "clause_lang=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            condition,
            facts,
            facts_file,
            explain,
        } => run_check(condition, facts, facts_file, explain),
        Commands::Tokens { condition, json } => {
            print!("{}", cli::render_tokens(&condition, format(json)));
            Ok(())
        }
        Commands::Tree { condition, json } => {
            let engine = ConditionEngine::new(
                PredicateRegistry::builder().with(&FactSheet::new()).build(),
            );
            print!("{}", cli::render_tree(&engine, &condition, format(json)));
            Ok(())
        }
        Commands::Docs { topic: None } => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Docs { topic: Some(topic) } => cli::get_doc_topic(&topic).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn format(json: bool) -> InspectFormat {
    if json {
        InspectFormat::Json
    } else {
        InspectFormat::Text
    }
}

fn run_check(
    condition: String,
    facts: Option<String>,
    facts_file: Option<PathBuf>,
    explain: bool,
) -> Result<(), CliError> {
    let facts = match (facts, facts_file) {
        (Some(s), _) => Some(s),
        (None, Some(path)) => Some(
            fs::read_to_string(&path).map_err(|source| CliError::FactsFile { path, source })?,
        ),
        (None, None) if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        (None, None) => None,
    };

    let options = CheckOptions { condition, facts };
    let result = cli::execute_check(&options)?;

    if explain {
        println!("{}", output::to_json_pretty(&result.tree));
    }
    println!("{}", result.satisfied);
    Ok(())
}
