//! Command-line front end. A plain caller of the Record Store contract and
//! the import/export/search helpers; holds no state of its own.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::export::{export_to_file, EXPORT_HEADER};
use crate::extraction::{scan_file, FileTextExtractor};
use crate::import::import_file;
use crate::models::{ExportFormat, Producer, ProducerFields, SearchField};
use crate::search::{
    ai_search, ai_supplier_query, companies_query, launch_web_search, producer_product_query,
    supplier_query, BrowserLauncher, GeminiClient,
};
use crate::store::RecordStore;

#[derive(Parser, Debug)]
#[command(name = "energy-directory", version, about = "Directory of energy producers")]
pub struct Cli {
    /// Database file (overrides config and ENERGY_DIRECTORY_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to config.toml in the data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a producer
    Add(NewProducerArgs),
    /// Change a producer; omitted fields keep their current value
    Update {
        id: i64,
        #[command(flatten)]
        fields: ChangedFieldsArgs,
    },
    /// Delete a producer by id
    Delete { id: i64 },
    /// List all producers
    List {
        #[arg(long)]
        json: bool,
    },
    /// Case-insensitive substring search
    Search {
        term: String,
        #[arg(long, default_value = "name")]
        by: SearchField,
    },
    /// Import producers from a .csv or .txt file
    Import { file: PathBuf },
    /// Export all producers (format inferred from the extension unless given)
    Export {
        file: PathBuf,
        #[arg(long)]
        format: Option<ExportFormat>,
    },
    /// Open a web search for a producer's products
    WebSearch { id: i64 },
    /// Ask the AI search for companies producing a keyword
    AiSearch { keyword: String },
    /// Scan a PDF/TXT/CSV file for product keywords
    Scan {
        file: PathBuf,
        /// Search suppliers for the Nth keyword (1-based)
        #[arg(long)]
        pick: Option<usize>,
        /// Use AI search instead of opening the browser
        #[arg(long, requires = "pick")]
        ai: bool,
    },
}

#[derive(Args, Debug)]
pub struct NewProducerArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub contact: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, default_value = "")]
    pub products: String,
    #[arg(long, default_value = "")]
    pub category: String,
}

#[derive(Args, Debug)]
pub struct ChangedFieldsArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub contact: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub products: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
}

impl ChangedFieldsArgs {
    fn apply_to(&self, current: &Producer) -> ProducerFields {
        let pick = |new: &Option<String>, old: &str| new.clone().unwrap_or_else(|| old.to_string());
        ProducerFields {
            name: pick(&self.name, &current.name),
            contact: pick(&self.contact, &current.contact),
            address: pick(&self.address, &current.address),
            products: pick(&self.products, &current.products),
            category: pick(&self.category, &current.category),
        }
    }
}

/// Resolve configuration with CLI overrides applied.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig, AppError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    Ok(apply_overrides(cli, config))
}

fn apply_overrides(cli: &Cli, mut config: AppConfig) -> AppConfig {
    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    config
}

/// Run one command against an open store, writing user-facing output to `out`.
pub fn execute(
    command: &Command,
    store: &RecordStore,
    config: &AppConfig,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    match command {
        Command::Add(args) => {
            let p = store.create(&ProducerFields::new(
                args.name.as_str(),
                args.contact.as_str(),
                args.address.as_str(),
                args.products.as_str(),
                args.category.as_str(),
            ))?;
            writeln!(out, "Added producer {} ({})", p.id, p.name)?;
        }
        Command::Update { id, fields } => {
            let current = store.get(*id)?.ok_or(crate::store::StoreError::NotFound(*id))?;
            let p = store.update(*id, &fields.apply_to(&current))?;
            writeln!(out, "Updated producer {} ({})", p.id, p.name)?;
        }
        Command::Delete { id } => {
            store.delete(*id)?;
            writeln!(out, "Deleted producer {id}")?;
        }
        Command::List { json } => {
            let producers = store.get_all()?;
            if *json {
                let body = serde_json::to_string_pretty(&producers)?;
                writeln!(out, "{body}")?;
            } else {
                print_table(out, &producers)?;
            }
        }
        Command::Search { term, by } => {
            let producers = store.search(term, Some(*by))?;
            print_table(out, &producers)?;
        }
        Command::Import { file } => {
            let summary = import_file(store, file)?;
            writeln!(out, "Producer import complete ({} data rows):", summary.total_rows())?;
            writeln!(out, "  - Successfully imported: {} records.", summary.imported)?;
            writeln!(out, "  - Skipped (Duplicates): {} records.", summary.skipped_duplicates)?;
            writeln!(out, "  - Skipped (Malformed rows): {} records.", summary.skipped_malformed)?;
        }
        Command::Export { file, format } => {
            let format = format.or_else(|| ExportFormat::from_path(file)).ok_or_else(|| {
                AppError::Usage(format!(
                    "Cannot infer export format from {}; pass --format csv|pdf",
                    file.display()
                ))
            })?;
            let rows = export_to_file(store, file, format, config)?;
            writeln!(out, "Exported {rows} producers to {}", file.display())?;
        }
        Command::WebSearch { id } => {
            let producer = store.get(*id)?.ok_or(crate::store::StoreError::NotFound(*id))?;
            let query = producer_product_query(&producer)?;
            let url = launch_web_search(&BrowserLauncher, &query)?;
            writeln!(out, "Opened {url}")?;
        }
        Command::AiSearch { keyword } => {
            let query = companies_query(keyword)?;
            let client = GeminiClient::from_config(config)?;
            let summary = ai_search(&client, &query)?;
            writeln!(out, "AI search for '{query}':\n\n{summary}")?;
        }
        Command::Scan { file, pick, ai } => {
            let extractor = FileTextExtractor::new(config.pdf_scan_enabled);
            let keywords = scan_file(&extractor, file)?;
            if keywords.is_empty() {
                writeln!(out, "No product keywords found in {}", file.display())?;
                return Ok(());
            }
            for (i, kw) in keywords.iter().enumerate() {
                writeln!(out, "{:>2}. {kw}", i + 1)?;
            }
            if let Some(n) = pick {
                let keyword = n
                    .checked_sub(1)
                    .and_then(|i| keywords.get(i))
                    .ok_or_else(|| AppError::Usage(format!("--pick must be between 1 and {}", keywords.len())))?;
                if *ai {
                    let query = ai_supplier_query(keyword)?;
                    let client = GeminiClient::from_config(config)?;
                    let summary = ai_search(&client, &query)?;
                    writeln!(out, "AI search for '{query}':\n\n{summary}")?;
                } else {
                    let url = launch_web_search(&BrowserLauncher, &supplier_query(keyword)?)?;
                    writeln!(out, "Opened {url}")?;
                }
            }
        }
    }
    Ok(())
}

fn print_table(out: &mut dyn Write, producers: &[Producer]) -> std::io::Result<()> {
    if producers.is_empty() {
        return writeln!(out, "No producers found.");
    }
    writeln!(out, "{}", EXPORT_HEADER.join(" | "))?;
    for p in producers {
        writeln!(
            out,
            "{} | {} | {} | {} | {} | {}",
            p.id, p.name, p.contact, p.address, p.products, p.category
        )?;
    }
    Ok(())
}
