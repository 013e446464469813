//! Salesagg CLI - clean and aggregate sales transaction exports
//!
//! ```bash
//! salesagg inspect sales.csv                               # Columns and first rows
//! salesagg clean sales.csv --date-order month-first -o clean.csv
//! salesagg analyze sales.csv --date-order month-first      # All views as tables
//! salesagg analyze sales.csv --date-order day-first --view monthly --format json
//! ```
//!
//! The date convention can also come from `SALESAGG_DATE_ORDER` (a `.env`
//! file in the working directory is loaded first). Set `RUST_LOG=debug` for
//! per-rule cleaning counts.

use clap::{Parser, Subcommand, ValueEnum};
use salesagg::{
    analyze_csv, clean_csv, preview_csv_file, render_table, view_json, views_json,
    write_cleaned_csv, AnalysisOptions, DateOrder, ViewKind,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "salesagg")]
#[command(about = "Clean and aggregate e-commerce sales transactions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the columns and first rows of a CSV file
    Inspect {
        /// Input CSV file
        input: PathBuf,

        /// Number of rows to show
        #[arg(short, long, default_value = "5")]
        rows: usize,
    },

    /// Clean a CSV file and write the cleaned rows as CSV
    Clean {
        /// Input CSV file
        input: PathBuf,

        /// Day/month order of numeric dates (day-first or month-first)
        #[arg(long, env = "SALESAGG_DATE_ORDER")]
        date_order: DateOrder,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clean a CSV file and print the aggregate views
    Analyze {
        /// Input CSV file
        input: PathBuf,

        /// Day/month order of numeric dates (day-first or month-first)
        #[arg(long, env = "SALESAGG_DATE_ORDER")]
        date_order: DateOrder,

        /// Entries in ranked views
        #[arg(long, env = "SALESAGG_TOP_N", default_value = "10")]
        top: usize,

        /// Transactions with at least this many items are excluded from the basket view
        #[arg(long, env = "SALESAGG_BULK_THRESHOLD", default_value = "2000")]
        bulk_threshold: i64,

        /// Only this view (monthly, products, product-quantity, baskets, customers)
        #[arg(long)]
        view: Option<ViewKind>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect { input, rows } => cmd_inspect(&input, rows),

        Commands::Clean {
            input,
            date_order,
            output,
        } => cmd_clean(&input, date_order, output.as_deref()),

        Commands::Analyze {
            input,
            date_order,
            top,
            bulk_threshold,
            view,
            format,
            output,
        } => {
            let options = AnalysisOptions::new(date_order)
                .with_top_n(top)
                .with_bulk_order_threshold(bulk_threshold);
            cmd_analyze(&input, &options, view, format, output.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_inspect(input: &Path, rows: usize) -> Result<(), Box<dyn std::error::Error>> {
    let preview = preview_csv_file(input, rows)?;

    println!("Loaded data with shape: ({}, {})", preview.row_count, preview.headers.len());
    println!("Encoding: {}", preview.encoding);
    println!("Columns: {}", preview.headers.join(", "));
    println!("First {} rows:", preview.sample.len());
    println!("{}", preview.headers.join(" | "));
    for row in &preview.sample {
        println!("{}", row.join(" | "));
    }

    Ok(())
}

fn cmd_clean(
    input: &Path,
    date_order: DateOrder,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let cleaned = clean_csv(input, date_order)?;

    match output {
        Some(path) => {
            let file = fs::File::create(path)?;
            write_cleaned_csv(&cleaned.rows, io::BufWriter::new(file))?;
            eprintln!("Output written to: {}", path.display());
        }
        None => write_cleaned_csv(&cleaned.rows, io::stdout().lock())?,
    }

    Ok(())
}

fn cmd_analyze(
    input: &Path,
    options: &AnalysisOptions,
    view: Option<ViewKind>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = analyze_csv(input, options)?;
    let views = &result.views;

    let content = match (format, view) {
        (OutputFormat::Json, Some(kind)) => view_json(views, kind, options.top_n)?,
        (OutputFormat::Json, None) => views_json(views)?,
        (OutputFormat::Table, Some(kind)) => render_table(views, kind, options.top_n),
        (OutputFormat::Table, None) => ViewKind::ALL
            .iter()
            .map(|kind| render_table(views, *kind, options.top_n))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    write_output(&content, output)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", content)?;
        }
    }
    Ok(())
}
