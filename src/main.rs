use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use filterql::storage::{CollectionAccessor, FindOptions};
use filterql::{fixtures, logging, MemoryStore, StoreConfig};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "filterql")]
#[command(about = "Translate JPA-style queries into document-store filters", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the filter document of a query
    Translate {
        /// Query, e.g. "name = ?1 and age > 18"
        query: String,

        /// Positional parameter as JSON, repeatable. Invalid JSON is taken as a string.
        #[arg(long = "param", short)]
        params: Vec<String>,
    },

    /// Print the order document of a key list
    Order {
        /// Key list, e.g. "byLastNameAnd-Age"
        keys: String,
    },

    /// Run a query against documents loaded from a JSON fixture file
    Run {
        /// Fixture file: {"collection": [documents...]}
        #[arg(long)]
        data: PathBuf,

        /// Collection to query
        #[arg(long, short)]
        collection: String,

        query: String,

        #[arg(long = "param", short)]
        params: Vec<String>,

        /// Key list to sort by
        #[arg(long)]
        order: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the connection settings resolved from the environment
    Config {
        /// TOML file to read before applying environment overrides
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() {
    logging::init(logging::DEFAULT_FILTER);

    let args = Args::parse();
    if let Err(e) = run(args.command) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Translate { query, params } => {
            let filter = filterql::filter_document(&query, &parse_params(&params))?;
            print_json(&filter)
        }
        Command::Order { keys } => print_json(&filterql::order_document(&keys)?),
        Command::Run {
            data,
            collection,
            query,
            params,
            order,
            limit,
        } => {
            let store = MemoryStore::new();
            fixtures::load_json(&store, &data)?;

            let filter = filterql::filter_document(&query, &parse_params(&params))?;
            let options = FindOptions {
                sort: order
                    .as_deref()
                    .map(filterql::order_document)
                    .transpose()?,
                skip: 0,
                limit,
            };
            let documents = store.collection(&collection)?.find(Some(&filter), &options)?;
            tracing::info!("{} documents matched", documents.len());
            print_json(&Value::Array(documents))
        }
        Command::Config { file } => {
            let config = match file {
                Some(path) => StoreConfig::from_file(&path)?,
                None => StoreConfig::from_env()?,
            };
            print_json(&serde_json::to_value(&config)?)?;
            println!("{} {}", "•".dimmed(), config.redacted_uri());
            Ok(())
        }
    }
}

/// Parse each parameter as JSON, falling back to a plain string.
fn parse_params(raw: &[String]) -> Vec<Value> {
    raw.iter()
        .map(|p| serde_json::from_str(p).unwrap_or_else(|_| Value::String(p.clone())))
        .collect()
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
