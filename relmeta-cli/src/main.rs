//! relmeta CLI tool
//!
//! Compiles a directory of content-type models into relational metadata and
//! inspects the result: tables, creation order and identifier shortening.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use relmeta::{create_metadata, shorten, Metadata, MetadataConfig};
use relmeta_cli::{dependency_ordering, load_config, model_loader};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "relmeta")]
#[command(about = "Relational metadata compiler for content-type models")]
#[command(version = "0.1.0")]
struct Cli {
    /// Model file or directory of `*.json` models
    #[arg(long, default_value = "models")]
    models: PathBuf,

    /// Config file (defaults to config/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum identifier length, overriding the config (0 = unlimited)
    #[arg(long)]
    max_identifier_length: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the models and print the metadata as JSON
    Compile {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// List compiled tables with column, index and foreign key counts
    Tables,

    /// Print the order in which tables can be created
    Order,

    /// Shorten one identifier built from its parts
    Shorten {
        /// Name parts, e.g. `complexes complexhasonecomplex links`
        #[arg(required = true)]
        parts: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.quiet {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();
    } else if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let result = load_config(cli.config.as_deref(), cli.max_identifier_length).and_then(|config| {
        match &cli.command {
            Commands::Compile { output, pretty } => {
                handle_compile(&cli, &config, output.as_ref(), *pretty)
            }
            Commands::Tables => handle_tables(&cli, &config),
            Commands::Order => handle_order(&cli, &config),
            Commands::Shorten { parts } => handle_shorten(&config, parts),
        }
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "❌ Error:".red().bold(), e);
        process::exit(1);
    }
}

fn compile(cli: &Cli, config: &MetadataConfig) -> anyhow::Result<Metadata> {
    let models = model_loader::load_models(&cli.models)?;
    if models.is_empty() {
        log::warn!("no models found in {}", cli.models.display());
    }
    create_metadata(&models, config).context("failed to compile models")
}

fn handle_compile(
    cli: &Cli,
    config: &MetadataConfig,
    output: Option<&PathBuf>,
    pretty: bool,
) -> anyhow::Result<()> {
    let metadata = compile(cli, config)?;
    let json = if pretty {
        serde_json::to_string_pretty(&metadata)?
    } else {
        serde_json::to_string(&metadata)?
    };

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            if !cli.quiet {
                println!(
                    "{} Wrote {} table(s) to {}",
                    "✅".green(),
                    metadata.len(),
                    path.display()
                );
            }
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_tables(cli: &Cli, config: &MetadataConfig) -> anyhow::Result<()> {
    let metadata = compile(cli, config)?;

    println!("\n📊 {}\n", "Tables".bold());
    for table in metadata.tables() {
        let kind = if table.uid == table.table_name {
            "pivot".dimmed()
        } else {
            table.uid.as_str().cyan()
        };
        println!(
            "  {} ({}) columns: {}, indexes: {}, foreign keys: {}",
            table.table_name.bold(),
            kind,
            table.columns().count(),
            table.indexes.len(),
            table.foreign_keys.len()
        );
    }
    println!("\n📈 Summary: {} table(s)", metadata.len());
    Ok(())
}

fn handle_order(cli: &Cli, config: &MetadataConfig) -> anyhow::Result<()> {
    let metadata = compile(cli, config)?;
    let order = dependency_ordering::creation_order(&metadata)?;

    for (i, table) in order.iter().enumerate() {
        println!("  {}. {}", i + 1, table);
    }
    Ok(())
}

fn handle_shorten(config: &MetadataConfig, parts: &[String]) -> anyhow::Result<()> {
    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
    let name = shorten(&parts, config.max_identifier_length)?;
    println!("{name}");
    Ok(())
}
