//! The quex command line interface.
//!
//! Point quex at a database and it produces example queries for any table,
//! in SQL or document-pipeline form, optionally executing them.
//!
//! # Usage
//!
//! ```bash
//! # Five mixed SQL examples for a table
//! quex generate sales --database-url sqlite://data.db
//!
//! # Three grouping queries, executed against the store
//! quex generate sales -c group_by -n 3 --run
//!
//! # Interactive session
//! quex repl
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;
use quex::catalog;
use quex::config::Config;
use quex::prelude::*;
use quex::schema::fields_from_sample;

#[derive(Parser)]
#[command(name = "quex")]
#[command(author = "quex contributors")]
#[command(version = "0.3.0")]
#[command(about = "Example queries for any dataset, no query language required", long_about = None)]
#[command(after_help = "EXAMPLES:
    quex generate sales --database-url sqlite://data.db
    quex generate films --dialect document -c match -n 1
    quex upload titanic.csv passengers
    quex repl")]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "QUEX_DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate example queries for a dataset
    Generate {
        /// Table or collection name
        dataset: String,

        /// Query dialect to render
        #[arg(short, long, value_enum, default_value = "sql")]
        dialect: Dialect,

        /// Restrict to one pattern category (e.g. group_by, match)
        #[arg(short, long)]
        category: Option<String>,

        /// How many queries to return
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Execute SQL queries and show their results
        #[arg(long)]
        run: bool,
    },
    /// List datasets visible on the connection
    Explore,
    /// Load a CSV file into a new table
    Upload {
        /// CSV file path
        file: PathBuf,
        /// Name for the new dataset
        dataset: String,
    },
    /// Show the pattern category reference
    Categories,
    /// Interactive session
    Repl,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Generate {
            ref dataset,
            dialect,
            ref category,
            count,
            run,
        }) => generate_cmd(&cli, dataset, dialect, category.as_deref(), count, run).await,
        Some(Commands::Explore) => explore_cmd(&cli).await,
        Some(Commands::Upload {
            ref file,
            ref dataset,
        }) => upload_cmd(&cli, file, dataset).await,
        Some(Commands::Categories) => {
            show_categories();
            Ok(())
        }
        Some(Commands::Repl) => repl_cmd(&cli).await,
        None => {
            println!("{}", "quex: example queries for any dataset".cyan().bold());
            println!();
            println!("Usage: quex <COMMAND> [OPTIONS]");
            println!();
            println!("Try: quex --help");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Resolve the connection URL from flag, environment, or config file.
fn resolve_url(cli: &Cli) -> Result<String> {
    let config = Config::load()?;
    config.resolve_url(cli.database_url.clone()).ok_or_else(|| {
        anyhow!("no database URL. Use --database-url, QUEX_DATABASE_URL, or ~/.quex.toml")
    })
}

async fn connect(cli: &Cli) -> Result<Db> {
    let url = resolve_url(cli)?;
    Ok(Db::connect(&url).await?)
}

async fn generate_cmd(
    cli: &Cli,
    dataset: &str,
    dialect: Dialect,
    category: Option<&str>,
    count: Option<usize>,
    run: bool,
) -> Result<()> {
    let config = Config::load()?;
    let count = count.or(config.default_count).unwrap_or(DEFAULT_COUNT);
    let category = parse_category(category, dialect)?;

    let db = connect(cli).await?;
    let queries = synthesize(&db, dataset, dialect, category, count).await?;
    present_queries(&db, dataset, &queries, run).await;
    Ok(())
}

/// Introspect the dataset in dialect-appropriate form and run the core
/// synthesis pipeline.
async fn synthesize(
    db: &Db,
    dataset: &str,
    dialect: Dialect,
    category: Option<Category>,
    count: usize,
) -> Result<Vec<GeneratedQuery>> {
    let schema = match dialect {
        Dialect::Sql => db.describe(dataset).await?,
        Dialect::Document => fields_from_sample(&db.sample_documents(dataset).await?),
    };
    Ok(quex::generate(&schema, dataset, dialect, category, count)?)
}

fn parse_category(raw: Option<&str>, dialect: Dialect) -> Result<Option<Category>> {
    match raw {
        None => Ok(None),
        Some(raw) => {
            let category = raw
                .parse::<Category>()
                .map_err(|_| QuexError::unknown_category(raw, dialect))?;
            Ok(Some(category))
        }
    }
}

/// Print each generated query; with `run`, execute SQL artifacts against
/// the store. A failing query is reported and the batch continues.
async fn present_queries(db: &Db, dataset: &str, queries: &[GeneratedQuery], run: bool) {
    println!(
        "{}",
        format!("Example queries for {dataset}:").green().bold()
    );
    for (i, query) in queries.iter().enumerate() {
        println!();
        println!("{} {}", format!("{}.", i + 1).cyan(), query.description);
        println!("   {}", query.artifact.to_string().white().bold());

        if !run {
            continue;
        }
        match &query.artifact {
            QueryArtifact::Sql(sql) => match db.fetch_all(sql).await {
                Ok(rows) => print_rows(&rows),
                Err(e) => eprintln!("   {} {}", "✗".red(), e.to_string().red()),
            },
            QueryArtifact::Document(_) => {
                println!(
                    "   {}",
                    "(document queries are rendered, not executed here)".dimmed()
                );
            }
        }
    }
}

async fn explore_cmd(cli: &Cli) -> Result<()> {
    let db = connect(cli).await?;
    print_datasets(&db).await
}

async fn print_datasets(db: &Db) -> Result<()> {
    let datasets = db.list_datasets().await?;
    if datasets.is_empty() {
        println!("{}", "(no datasets found)".dimmed());
    } else {
        println!("{}", "Available datasets:".green().bold());
        for name in datasets {
            println!("  {}", name);
        }
    }
    Ok(())
}

async fn upload_cmd(cli: &Cli, file: &PathBuf, dataset: &str) -> Result<()> {
    let db = connect(cli).await?;
    let rows = db.upload_csv(file, dataset).await?;
    println!(
        "{} Loaded {} rows into '{}'",
        "✓".green(),
        rows.to_string().cyan(),
        dataset
    );
    show_sample(&db, dataset).await;
    Ok(())
}

/// Print column names and a few sample rows of a dataset.
async fn show_sample(db: &Db, dataset: &str) {
    match db.sample_documents(dataset).await {
        Ok(rows) if !rows.is_empty() => {
            println!("{}", "Sample data:".dimmed());
            print_rows(&rows);
        }
        Ok(_) => println!("{}", "(dataset is empty)".dimmed()),
        Err(e) => eprintln!("{} {}", "✗".red(), e.to_string().red()),
    }
}

/// Render rows as an aligned table, truncating long results for display:
/// more than nine rows shows the first eight, an ellipsis, and the last.
fn print_rows(rows: &[HashMap<String, serde_json::Value>]) {
    if rows.is_empty() {
        println!("   {}", "(no results)".dimmed());
        return;
    }

    let mut columns: Vec<&String> = rows[0].keys().collect();
    columns.sort();

    let mut widths: HashMap<&String, usize> = columns.iter().map(|c| (*c, c.len())).collect();
    for row in rows {
        for (col, val) in row {
            let len = val_to_string(val).len();
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(len);
            }
        }
    }

    let header: Vec<String> = columns
        .iter()
        .map(|c| format!("{:width$}", c, width = widths[*c]))
        .collect();
    println!("   {}", header.join(" │ ").white().bold());
    let sep: Vec<String> = columns.iter().map(|c| "─".repeat(widths[*c])).collect();
    println!("   {}", sep.join("─┼─").dimmed());

    let print_row = |row: &HashMap<String, serde_json::Value>| {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| {
                let val = row.get(*c).map(val_to_string).unwrap_or_default();
                format!("{:width$}", val, width = widths[*c])
            })
            .collect();
        println!("   {}", cells.join(" │ "));
    };

    if rows.len() > 9 {
        for row in &rows[..8] {
            print_row(row);
        }
        println!("   {}", "...".dimmed());
        print_row(&rows[rows.len() - 1]);
    } else {
        for row in rows {
            print_row(row);
        }
    }

    println!("   {} row(s) returned", rows.len().to_string().cyan());
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => val.to_string(),
    }
}

fn show_categories() {
    println!("{}", "quex pattern categories".cyan().bold());
    println!();
    println!(
        "{:10} {:15} {:8} {}",
        "Dialect".white().bold(),
        "Category".white().bold(),
        "Variants".white().bold(),
        "Shapes".white().bold()
    );
    println!("{}", "─".repeat(72).dimmed());

    for dialect in [Dialect::Sql, Dialect::Document] {
        for &category in Category::all_for(dialect) {
            let variants: Vec<_> = catalog::patterns(dialect)
                .filter(|p| p.category == category)
                .collect();
            let shapes: Vec<&str> = variants.iter().map(|p| p.id).collect();
            println!(
                "{:10} {:15} {:8} {}",
                dialect.to_string().cyan(),
                category.name().yellow(),
                variants.len(),
                shapes.join(", ").dimmed()
            );
        }
    }
}

/// Fixed phrase table resolving free-form query-type commands.
fn phrase_lookup(line: &str) -> Option<(Dialect, Option<Category>)> {
    match line {
        "example sql queries" => Some((Dialect::Sql, None)),
        "example mongo queries" | "example document queries" => Some((Dialect::Document, None)),
        _ => {
            let (dialect, rest) = line
                .strip_prefix("sql ")
                .map(|rest| (Dialect::Sql, rest))
                .or_else(|| line.strip_prefix("mongo ").map(|rest| (Dialect::Document, rest)))
                .or_else(|| {
                    line.strip_prefix("document ")
                        .map(|rest| (Dialect::Document, rest))
                })?;
            let category = rest.parse::<Category>().ok()?;
            (category.dialect() == dialect).then_some((dialect, Some(category)))
        }
    }
}

fn show_commands() {
    println!("{}", "Available commands:".cyan().bold());
    println!("  {}  - List commands", "commands".yellow());
    println!("  {}  - List tables and collections", "explore database".yellow());
    println!("  {}  - Connect to a different database", "switch database".yellow());
    println!("  {}  - Load a CSV file as a new dataset", "upload dataset".yellow());
    println!("  {} - Example queries for the selected dataset", "generate queries".yellow());
    println!("  {}  - Leave the session", "exit".yellow());
    println!();
    println!("{}", "Or type a dataset name to select it, or a query-type".dimmed());
    println!("{}", "phrase like 'example sql queries' or 'mongo match'.".dimmed());
}

async fn repl_cmd(cli: &Cli) -> Result<()> {
    use rustyline::DefaultEditor;
    use rustyline::error::ReadlineError;

    let mut db = connect(cli).await?;
    let mut dataset: Option<String> = None;
    let mut dialect = Dialect::Sql;
    let count = Config::load()?.default_count.unwrap_or(DEFAULT_COUNT);

    println!("{}", "quex interactive session".cyan().bold());
    println!("{}", "Type 'commands' for help, 'exit' to quit.".dimmed());
    println!();
    print_datasets(&db).await?;

    let mut rl = DefaultEditor::new()?;
    let history_path = dirs::home_dir()
        .map(|p| p.join(".quex_history"))
        .unwrap_or_default();
    let _ = rl.load_history(&history_path);

    loop {
        let prompt = match &dataset {
            Some(name) => format!("quex[{dialect}->{name}]> "),
            None => "quex> ".to_string(),
        };
        match rl.readline(&prompt.cyan().bold().to_string()) {
            Ok(line) => {
                let line = line.trim().to_lowercase();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match line.as_str() {
                    "exit" | "quit" => break,
                    "commands" | "help" => show_commands(),
                    "explore database" | "explore databases" => {
                        print_datasets(&db).await?;
                    }
                    "switch database" => match prompt_line(&mut rl, "Connection URL: ") {
                        Some(url) => match Db::connect(&url).await {
                            Ok(new_db) => {
                                db = new_db;
                                dataset = None;
                                println!("{} Connected", "✓".green());
                                print_datasets(&db).await?;
                            }
                            Err(e) => eprintln!("{} {}", "✗".red(), e.to_string().red()),
                        },
                        None => continue,
                    },
                    "upload dataset" => {
                        let Some(path) = prompt_line(&mut rl, "CSV file path: ") else {
                            continue;
                        };
                        let Some(name) = prompt_line(&mut rl, "Dataset name: ") else {
                            continue;
                        };
                        match db.upload_csv(&PathBuf::from(path), &name).await {
                            Ok(rows) => {
                                println!("{} Loaded {rows} rows into '{name}'", "✓".green());
                                dataset = Some(name);
                            }
                            Err(e) => eprintln!("{} {}", "✗".red(), e.to_string().red()),
                        }
                    }
                    "generate queries" => {
                        run_generation(&db, &dataset, dialect, None, count).await;
                    }
                    other => {
                        if let Some((new_dialect, category)) = phrase_lookup(other) {
                            dialect = new_dialect;
                            run_generation(&db, &dataset, dialect, category, count).await;
                        } else if dataset_exists(&db, other).await {
                            dataset = Some(other.to_string());
                            println!("Using dataset: {}", other.cyan());
                            show_sample(&db, other).await;
                        } else {
                            println!(
                                "{}",
                                "Unknown command. Type 'commands' for help.".yellow()
                            );
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);
    println!("{}", "Goodbye!".green());
    Ok(())
}

fn prompt_line(rl: &mut rustyline::DefaultEditor, prompt: &str) -> Option<String> {
    match rl.readline(prompt) {
        Ok(line) if !line.trim().is_empty() => Some(line.trim().to_string()),
        _ => None,
    }
}

async fn dataset_exists(db: &Db, name: &str) -> bool {
    db.list_datasets()
        .await
        .map(|names| names.iter().any(|n| n == name))
        .unwrap_or(false)
}

/// Generate and present queries inside the session, executing SQL ones.
async fn run_generation(
    db: &Db,
    dataset: &Option<String>,
    dialect: Dialect,
    category: Option<Category>,
    count: usize,
) {
    let Some(dataset) = dataset else {
        println!("{}", "Select a dataset first (type its name).".yellow());
        return;
    };
    match synthesize(db, dataset, dialect, category, count).await {
        Ok(queries) => present_queries(db, dataset, &queries, true).await,
        Err(e) => eprintln!("{} {}", "✗".red(), e.to_string().red()),
    }
}
