use clap::{Parser as ClapParser, Subcommand};
use cql_filter::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "cql")]
#[command(about = "cql - parse OGC Common Query Language filters into a syntax tree")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CQL filter and print its tree as JSON
    Parse {
        /// The CQL filter (reads from stdin if not provided)
        query: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// CRS recorded on a BBOX that names none
        #[arg(long)]
        default_crs: Option<String>,
    },

    /// Validate the syntax of a CQL filter
    Check {
        /// The CQL filter (reads from stdin if not provided)
        query: Option<String>,

        /// CRS recorded on a BBOX that names none
        #[arg(long)]
        default_crs: Option<String>,
    },
}

fn main() {
    cli::init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            query,
            pretty,
            default_crs,
        } => run_parse(query, pretty, default_crs),
        Commands::Check { query, default_crs } => run_check(query, default_crs),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_query(query: Option<String>) -> Result<String, CliError> {
    match query {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn run_parse(query: Option<String>, pretty: bool, default_crs: Option<String>) -> Result<(), CliError> {
    let options = CheckOptions {
        query: read_query(query)?,
        default_crs,
    };

    match cli::execute_parse(&options)? {
        CheckResult::Parsed(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{}", json);
        }
        CheckResult::Empty => println!("null"),
        CheckResult::SyntaxValid => println!("Syntax is valid"),
    }
    Ok(())
}

fn run_check(query: Option<String>, default_crs: Option<String>) -> Result<(), CliError> {
    let options = CheckOptions {
        query: read_query(query)?,
        default_crs,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid | CheckResult::Parsed(_) => println!("Syntax is valid"),
        CheckResult::Empty => println!("Empty filter"),
    }
    Ok(())
}
