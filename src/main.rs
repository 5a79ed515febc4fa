//! Salesheet CLI - Transform weekly store sales extracts
//!
//! # Main Commands
//!
//! ```bash
//! salesheet serve                    # Start HTTP server (port 3000)
//! salesheet transform BG01.csv      # Transform one store extract
//! salesheet stores                  # Show this machine's store mapping
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! salesheet parse BG01.csv          # Just parse the CSV to raw rows
//! salesheet example-config          # Print a sample config document
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use chrono::NaiveDate;
use salesheet::api::logs::{log_info, log_success};
use salesheet::{
    build_report, example_config, load_store_csv, machine_name, render, ConfigStore,
    ReportResponse,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salesheet")]
#[command(about = "Transform weekly store sales extracts into report tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a store CSV into the full report table
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// Config directory (default: $SALESHEET_CONFIG_DIR or .salesheet)
        #[arg(short, long)]
        config_dir: Option<PathBuf>,

        /// Override the configured report start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Parse a store CSV and dump the raw rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show this machine's store mapping and run counters
    Stores {
        /// Config directory (default: $SALESHEET_CONFIG_DIR or .salesheet)
        #[arg(short, long)]
        config_dir: Option<PathBuf>,
    },

    /// Print a sample config document
    ExampleConfig,

    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Config directory (default: $SALESHEET_CONFIG_DIR or .salesheet)
        #[arg(short, long)]
        config_dir: Option<PathBuf>,

        /// Directory of per-store CSV extracts (default: $SALESHEET_DATA_DIR or .)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Console table
    Table,
    /// CSV of display strings
    Csv,
    /// JSON payload with format tags and row kinds
    Json,
}

fn config_dir_or_env(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("SALESHEET_CONFIG_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(".salesheet"))
}

fn data_dir_or_env(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("SALESHEET_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transform {
            input,
            config_dir,
            start_date,
            output,
            format,
        } => cmd_transform(&input, config_dir, start_date, output.as_deref(), format),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Stores { config_dir } => cmd_stores(config_dir),

        Commands::ExampleConfig => cmd_example_config(),

        Commands::Serve {
            port,
            config_dir,
            data_dir,
        } => cmd_serve(port, config_dir, data_dir).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_transform(
    input: &Path,
    config_dir: Option<PathBuf>,
    start_date: Option<NaiveDate>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ConfigStore::with_dir(config_dir_or_env(config_dir));
    config.record_run(&machine_name())?;

    log_info(format!("Reading extract: {}", input.display()));
    let raw = load_store_csv(input)?;
    log_info(format!(
        "{} raw rows, {} year column(s){}",
        raw.rows.len(),
        raw.years.len(),
        if raw.has_target { ", target present" } else { "" }
    ));

    let start = start_date.unwrap_or_else(|| config.start_date());
    let mapping = config.week_mapping();
    let table = build_report(raw, start, &mapping);
    log_success(format!(
        "Report built: {} rows, {} columns",
        table.rows.len(),
        table.columns.len()
    ));

    let store = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("store");

    match format {
        OutputFormat::Table => {
            let rendered = render::render_console(&table);
            write_output(&rendered, output)?;
        }
        OutputFormat::Csv => match output {
            Some(path) => {
                let file = fs::File::create(path)?;
                render::write_csv(&table, file)?;
                eprintln!("Output written to: {}", path.display());
            }
            None => render::write_csv(&table, std::io::stdout())?,
        },
        OutputFormat::Json => {
            let response = ReportResponse::from_table(store, &table);
            let json = serde_json::to_string_pretty(&response)?;
            write_output(&json, output)?;
        }
    }

    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing extract: {}", input.display());

    let raw = load_store_csv(input)?;
    eprintln!(
        "   Years: {}",
        raw.years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!("   Rows: {}", raw.rows.len());

    let json = serde_json::to_string_pretty(&raw)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_stores(config_dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigStore::with_dir(config_dir_or_env(config_dir));
    let machine = machine_name();

    match config.config.machines.get(&machine) {
        Some(entry) => {
            println!("Machine: {}", machine);
            println!("Runs: {}", entry.times_ran);
            if let Some(ref last) = entry.last_ran {
                println!("Last ran: {}", last);
            }
            if entry.stores.is_empty() {
                println!("No stores mapped yet.");
            } else {
                println!("Stores:");
                for store in &entry.stores {
                    println!("  - {}", store);
                }
            }
        }
        None => {
            println!("Machine '{}' is not registered.", machine);
            println!("It will be registered on the next transform or serve run.");
        }
    }

    Ok(())
}

fn cmd_example_config() -> Result<(), Box<dyn std::error::Error>> {
    let config = example_config();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

async fn cmd_serve(
    port: u16,
    config_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = config_dir_or_env(config_dir);
    let data_dir = data_dir_or_env(data_dir);

    let mut config = ConfigStore::with_dir(&config_dir);
    config.record_run(&machine_name())?;

    salesheet::server::start_server(port, config_dir, data_dir).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
