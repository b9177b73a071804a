//! scmdesc - Structural causal model description checker
//!
//! Parses terms, equations and node lines and prints the extracted structure.
//!
//! # Usage
//!
//! ```bash
//! scmdesc node "gaussian(mu_=1-0.3AB, sigma_=2)" --parents A,B
//! scmdesc node --file nodes.txt --parents A,B
//! scmdesc equation "2 + A - 2.8B" --parents A,B
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use scm_desc::{
    dsl,
    error::Result,
    model::{Coefficients, Vocabulary},
    ScriptResolver,
};
use tracing_subscriber::EnvFilter;

/// Structural causal model description checker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Comma separated, ordered parent variables
    #[arg(short, long, global = true, value_delimiter = ',')]
    parents: Vec<String>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a single term
    Term {
        /// The term, e.g. "-0.3AB"
        term: String,
    },
    /// Parse an equation and print its coefficients
    Equation {
        /// The equation, e.g. "2 + A - 2.8B"
        equation: String,
    },
    /// Parse node lines
    Node {
        /// The node line, e.g. "bernoulli(p_=2A)"
        #[arg(required_unless_present = "file")]
        line: Option<String>,

        /// Read node lines from a file instead
        #[arg(short, long, value_name = "FILE", conflicts_with = "line")]
        file: Option<PathBuf>,

        /// Directory that relative script paths are resolved against
        #[arg(long, value_name = "DIR")]
        script_root: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let parents = Vocabulary::new(args.parents.iter().map(|p| p.trim()))?;

    match args.command {
        Command::Term { term } => {
            let term = dsl::parse_term(&term, &parents)?;
            println!(
                "parents={:?} coefficient={}",
                term.parents.names(&parents),
                term.coefficient
            );
        }
        Command::Equation { equation } => {
            let terms = dsl::parse_equation(&equation, &parents)?;
            for term in &terms {
                println!(
                    "parents={:?} coefficient={}",
                    term.parents.names(&parents),
                    term.coefficient
                );
            }
            let coefs = Coefficients::from_terms(&terms, parents.len())?;
            println!(
                "bias={} linear={:?} interactions={:?}",
                coefs.bias, coefs.linear, coefs.interactions
            );
        }
        Command::Node {
            line,
            file,
            script_root,
        } => {
            let resolver = build_resolver(script_root, file.as_deref());
            let nodes = match (&line, &file) {
                (Some(line), _) => vec![dsl::parse_node(line, &parents, &resolver)?],
                (None, Some(file)) => dsl::parse_file(file, &parents, &resolver)?,
                (None, None) => Vec::new(),
            };
            for node in nodes {
                println!("{}", node);
            }
        }
    }

    Ok(())
}

/// Scripts are looked up next to the description file unless a root is given.
fn build_resolver(script_root: Option<PathBuf>, file: Option<&Path>) -> ScriptResolver {
    let root = script_root.or_else(|| {
        file.and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
    });
    match root {
        Some(root) => ScriptResolver::new().with_root(root),
        None => ScriptResolver::new(),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
