//! # gsheet-cli
//!
//! Command-line interface for spreadsheet-backed records.

mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use gsheet_cache::SheetCache;
use gsheet_core::{LedgerEntry, MemoryTransport, Record, SheetsTransport, StoreConfig, Template};
use gsheet_http::{EnvToken, HttpTransport};
use gsheet_store::{SheetRecordStore, SheetView};
use output::OutputFormat;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// gsheet - treat spreadsheet tabs as tables of records
#[derive(Parser)]
#[command(name = "gsheet")]
#[command(author, version, about = "Spreadsheet-backed record store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to <config dir>/gsheet/config.yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use an in-memory sample spreadsheet instead of the Sheets API
    #[arg(long, global = true)]
    memory: bool,

    /// Output format (json, table)
    #[arg(short = 'f', long = "format", global = true, default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List every sheet with its header count
    Sheets,
    /// Print the records of a sheet
    Show {
        sheet: String,
        /// Show canonical fields (proje_adi, tutar, ...) instead of raw columns
        #[arg(long)]
        fields: bool,
    },
    /// Append a ledger row (date, description, amount, type, category)
    Append {
        sheet: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: String,
        /// Entry type, e.g. Gelir or Gider
        #[arg(long = "type", value_name = "TYPE")]
        kind: String,
        #[arg(long, default_value = "")]
        category: String,
        /// Entry date (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Change cells of one record
    Update {
        sheet: String,
        /// Zero-based record index (row 0 is the first row below the headers)
        row: usize,
        /// Header and new value
        #[arg(short = 's', long = "set", value_name = "HEADER=VALUE", required = true)]
        set: Vec<String>,
    },
    /// Create a sheet
    Create {
        name: String,
        /// Header row taken from a template
        #[arg(short, long, conflicts_with = "header")]
        template: Option<Template>,
        /// Header cell, repeatable
        #[arg(long = "header", value_name = "NAME")]
        header: Vec<String>,
    },
    /// Delete a sheet by title or numeric id
    Delete { sheet: String },
    /// List the available sheet templates
    Templates,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    if let Command::Templates = cli.command {
        return output::print_templates(cli.format);
    }

    let transport = open_transport(&cli)?;
    let cache = SheetCache::new(SheetRecordStore::new(transport));
    run(cli.command, &cache, cli.format).await
}

/// Build the transport selected by the command line.
fn open_transport(cli: &Cli) -> Result<Arc<dyn SheetsTransport>> {
    if cli.memory {
        tracing::info!("using the in-memory sample spreadsheet");
        return Ok(Arc::new(MemoryTransport::sample()));
    }
    let config = StoreConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::info!(spreadsheet = %config.spreadsheet_id, "using the Sheets API");
    let credentials = Arc::new(EnvToken::new(config.token_env.clone()));
    let transport = HttpTransport::new(&config, credentials)?;
    Ok(Arc::new(transport))
}

async fn run(command: Command, cache: &SheetCache, format: OutputFormat) -> Result<()> {
    match command {
        Command::Sheets => {
            let sheets = cache.store().list_sheets().await?;
            output::print_sheets(&sheets, format)
        }
        Command::Show { sheet, fields } => {
            let data = cache
                .load(&sheet)
                .await
                .with_context(|| format!("Failed to read sheet '{sheet}'"))?;
            output::print_sheet(&SheetView::new(data), fields, format)
        }
        Command::Append {
            sheet,
            description,
            amount,
            kind,
            category,
            date,
        } => {
            let entry = LedgerEntry {
                date: date.unwrap_or_else(today),
                description,
                amount,
                kind,
                category,
            };
            cache.load(&sheet).await?;
            cache.append_record(&sheet, entry).await.settled().await?;
            report(&format!("Appended a row to '{sheet}'"), format);
            if let Some(data) = cache.get(&sheet).await {
                output::print_sheet(&SheetView::new(data), false, format)?;
            }
            Ok(())
        }
        Command::Update { sheet, row, set } => {
            let changes = parse_assignments(row, &set)?;
            let data = cache.load(&sheet).await?;
            let Some(current) = data.record(row) else {
                bail!(
                    "Sheet '{sheet}' has no record {row} ({} records)",
                    data.records.len()
                );
            };
            if let Some(unknown) = changes
                .values
                .keys()
                .find(|h| !data.headers.contains(*h))
            {
                bail!("Sheet '{sheet}' has no column '{unknown}'");
            }

            let mut record = current.clone();
            record.merge(&changes);
            cache.update_record(&sheet, row, record).await.settled().await?;
            report(&format!("Updated record {row} of '{sheet}'"), format);
            Ok(())
        }
        Command::Create {
            name,
            template,
            header,
        } => {
            let headers = template.map_or(header, Template::header_row);
            let info = cache.store().create_sheet(&name, &headers).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
                OutputFormat::Table => report(
                    &format!("Created sheet '{}' (id {})", info.title, info.sheet_id),
                    format,
                ),
            }
            Ok(())
        }
        Command::Delete { sheet } => {
            let (sheet_id, title) = resolve_sheet_id(cache, &sheet).await?;
            cache.store().delete_sheet(sheet_id).await?;
            cache.invalidate(&title).await;
            report(&format!("Deleted sheet '{title}'"), format);
            Ok(())
        }
        Command::Templates => output::print_templates(format),
    }
}

/// Parse `HEADER=VALUE` arguments into a partial record.
fn parse_assignments(row: usize, assignments: &[String]) -> Result<Record> {
    let mut record = Record::new(row);
    for assignment in assignments {
        let (header, value) = assignment.split_once('=').with_context(|| {
            format!("Invalid assignment: '{assignment}'. Expected HEADER=VALUE format")
        })?;
        record.set(header.trim(), value);
    }
    Ok(record)
}

/// Accept either a numeric sheet id or a sheet title, returning both the id
/// and the title.
async fn resolve_sheet_id(cache: &SheetCache, sheet: &str) -> Result<(i64, String)> {
    let sheets = cache.store().list_sheets().await?;
    let by_title = sheets.iter().find(|s| s.title == sheet);
    let by_id = || {
        let id = sheet.parse::<i64>().ok()?;
        sheets.iter().find(|s| s.sheet_id == id)
    };
    match by_title.or_else(by_id) {
        Some(info) => Ok((info.sheet_id, info.title.clone())),
        None => bail!("No sheet named or numbered '{sheet}'"),
    }
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn report(message: &str, format: OutputFormat) {
    if format == OutputFormat::Table {
        println!("{} {message}", "✓".green().bold());
    }
}
