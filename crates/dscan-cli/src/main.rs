//! DScan CLI: manage scanned PDF documents from the command line.
//!
//! Configuration comes from the environment (see `dscan_core::Config`);
//! `DSCAN_DATA_DIR` selects where the database and managed files live.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dscan_app::{DocumentScanner, PathScanner};
use dscan_cli::{print_documents_table, App};
use dscan_core::{Config, Resource};
use dscan_infra::{init_telemetry, shutdown_telemetry, LogFormat};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dscan", about = "Scanned document manager")]
struct Cli {
    /// Override DSCAN_DATA_DIR
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List documents, most recently modified first
    List {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Import a scanned PDF into managed storage
    Import {
        /// Path to the PDF produced by the scanner
        pdf: PathBuf,
    },
    /// Rename a document
    Rename {
        /// Document id, unique id prefix, or current name
        document: String,
        /// New name
        name: String,
    },
    /// Delete a document and its file
    Delete {
        /// Document id, unique id prefix, or current name
        document: String,
    },
    /// Print a shareable URI for a document
    Share {
        /// Document id, unique id prefix, or current name
        document: String,
    },
    /// Follow the document list and print every change until interrupted
    Watch,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let data_dir = cli.data_dir.map(|dir| dir.display().to_string());
    let config = Config::from_lookup(|key| match key {
        "DSCAN_DATA_DIR" if data_dir.is_some() => data_dir.clone(),
        _ => std::env::var(key).ok(),
    });
    config.validate().context("Invalid configuration")?;

    init_telemetry(LogFormat::parse(&config.log_format))
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    let mut app = App::bootstrap(config).await?;
    let result = run(&mut app, cli.command).await;

    app.close().await;
    shutdown_telemetry();
    result
}

async fn run(app: &mut App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List { format } => {
            let docs = app.load_documents().await?;
            match format {
                OutputFormat::Table => print_documents_table(&docs),
                OutputFormat::Json => print_json(&docs)?,
            }
        }
        Commands::Import { pdf } => {
            let outcome = PathScanner::new(pdf).scan().await?;
            match app.controller.import_scan(outcome) {
                Some(mutation) => println!("{}", app.finish(mutation).await?),
                None => println!("Scan cancelled"),
            }
        }
        Commands::Rename { document, name } => {
            let record = app.find_document(&document).await?;
            app.controller.open_rename_dialog(record.clone());
            match app.controller.rename_document(record, name) {
                Some(mutation) => println!("{}", app.finish(mutation).await?),
                None => println!("Name unchanged"),
            }
        }
        Commands::Delete { document } => {
            let record = app.find_document(&document).await?;
            let mutation = app.controller.delete_document_with_file(record);
            println!("{}", app.finish(mutation).await?);
        }
        Commands::Share { document } => {
            let record = app.find_document(&document).await?;
            println!("{}", app.controller.share_uri(&record)?);
        }
        Commands::Watch => watch(app).await?,
    }
    Ok(())
}

async fn watch(app: &App) -> anyhow::Result<()> {
    app.controller.start();
    let mut rx = app.controller.documents();

    loop {
        let current = rx.borrow_and_update().clone();
        match current {
            Resource::Idle | Resource::Loading => println!("Loading..."),
            Resource::Success(docs) => {
                println!();
                print_documents_table(&docs);
            }
            Resource::Error(message) => anyhow::bail!(message),
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping");
                break;
            }
        }
    }
    Ok(())
}
