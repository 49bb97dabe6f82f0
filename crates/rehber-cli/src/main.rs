//! `rehber` — command-line client for the rehber directory server.
//!
//! # Usage
//!
//! ```
//! rehber --url http://localhost:5280 list
//! rehber import kisiler.csv
//! rehber export --format json -o kisiler.json
//! rehber template
//! ```

mod client;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rehber", about = "Command-line client for the rehber directory")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the rehber server (default: http://localhost:5280).
  #[arg(long, env = "REHBER_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List contacts, optionally filtered by free text.
  List {
    /// Substring matched against name, phone, and email.
    #[arg(long)]
    text: Option<String>,
  },
  /// Import a CSV file of contacts.
  Import {
    /// Path to the CSV file.
    file: PathBuf,
  },
  /// Export the directory to stdout or a file.
  Export {
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
    /// Write to this path instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Write the CSV import template.
  Template {
    /// Output path (default: kisi-listesi-sablonu.csv).
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Format {
  Csv,
  Json,
}

impl Format {
  fn as_str(self) -> &'static str {
    match self {
      Self::Csv => "csv",
      Self::Json => "json",
    }
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  // Quiet by default; RUST_LOG opts in.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:5280".to_string()),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::List { text } => list(&client, text.as_deref()).await,
    Command::Import { file } => import(&client, &file).await,
    Command::Export { format, output } => {
      export(&client, format, output.as_deref()).await
    }
    Command::Template { output } => template(output.as_deref()),
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn list(client: &ApiClient, text: Option<&str>) -> Result<()> {
  let contacts = client.list_contacts(text).await?;
  if contacts.is_empty() {
    println!("no contacts");
    return Ok(());
  }

  for contact in &contacts {
    let email = contact.email.as_deref().unwrap_or("-");
    let company = contact.company.as_deref().unwrap_or("-");
    println!(
      "{}\t{}\t{}\t{}\t{}",
      contact.contact_id, contact.name, contact.phone, email, company
    );
  }
  println!("{} contact(s)", contacts.len());
  Ok(())
}

async fn import(client: &ApiClient, file: &std::path::Path) -> Result<()> {
  let body = std::fs::read_to_string(file)
    .with_context(|| format!("reading {}", file.display()))?;

  let summary = client.import_csv(body).await?;
  println!(
    "imported: {}, merged: {}, rejected: {}",
    summary.imported,
    summary.merged,
    summary.rejected.len()
  );
  for rejection in &summary.rejected {
    println!("  row {}: {}", rejection.row, rejection.reason);
  }
  Ok(())
}

async fn export(
  client: &ApiClient,
  format: Format,
  output: Option<&std::path::Path>,
) -> Result<()> {
  let payload = client.export(format.as_str()).await?;
  match output {
    Some(path) => {
      std::fs::write(path, payload)
        .with_context(|| format!("writing {}", path.display()))?;
      println!("wrote {}", path.display());
    }
    None => print!("{payload}"),
  }
  Ok(())
}

fn template(output: Option<&std::path::Path>) -> Result<()> {
  let path = output.unwrap_or(std::path::Path::new("kisi-listesi-sablonu.csv"));
  std::fs::write(path, rehber_csv::IMPORT_TEMPLATE)
    .with_context(|| format!("writing {}", path.display()))?;
  println!("wrote {}", path.display());
  Ok(())
}
