//! fati-import - FATI territorial data loader
//!
//! Fills the FATI database from the health and education spreadsheet
//! exports and the administrative boundary CSVs, then tops it up with
//! generated facilities, demo accounts and alerts.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fati_common::config::{load_toml_config, RootFolderInitializer, RootFolderResolver, TomlConfig};
use fati_import::config::{resolve_populate_options, PopulateOverrides};
use fati_import::db::summary::load_summary;
use fati_import::services::RegionSeeder;
use fati_import::workflow::run_populate;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for fati-import
#[derive(Parser, Debug)]
#[command(name = "fati-import")]
#[command(about = "Territorial data loader for the FATI database")]
#[command(version)]
struct Cli {
    /// Root folder holding fati.db
    #[arg(long, global = true)]
    root_folder: Option<PathBuf>,

    /// Database file (overrides the root folder)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// TOML bootstrap configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import JSON exports, generate fallbacks and seed demo data
    Populate(PopulateArgs),
    /// Create the built-in Senegal regions
    SeedGeography,
    /// Print row counts of every table
    Summary {
        /// Print JSON instead of labelled lines
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct PopulateArgs {
    /// Health sector JSON export
    #[arg(long)]
    health_json: Option<PathBuf>,

    /// Education sector JSON export
    #[arg(long)]
    education_json: Option<PathBuf>,

    /// Directory holding the SEN_adm CSV files
    #[arg(long)]
    geo_dir: Option<PathBuf>,

    /// Import JSON only, never generate fallback data
    #[arg(long)]
    only_json: bool,

    /// Skip JSON import and only generate data
    #[arg(long)]
    only_generate: bool,

    #[arg(long)]
    min_health_values: Option<u32>,

    #[arg(long)]
    min_education_values: Option<u32>,

    #[arg(long)]
    min_health_facilities: Option<u32>,

    #[arg(long)]
    min_education_facilities: Option<u32>,

    #[arg(long)]
    min_alerts: Option<u32>,

    /// Seed of the random generator
    #[arg(long)]
    seed: Option<u64>,

    /// Last year of generated series (defaults to the current year)
    #[arg(long)]
    reference_year: Option<i32>,

    /// Print the run statistics as JSON
    #[arg(long)]
    json: bool,
}

impl From<&PopulateArgs> for PopulateOverrides {
    fn from(args: &PopulateArgs) -> Self {
        Self {
            health_json: args.health_json.clone(),
            education_json: args.education_json.clone(),
            geo_dir: args.geo_dir.clone(),
            only_json: args.only_json,
            only_generate: args.only_generate,
            min_health_values: args.min_health_values,
            min_education_values: args.min_education_values,
            min_health_facilities: args.min_health_facilities,
            min_education_facilities: args.min_education_facilities,
            min_alerts: args.min_alerts,
            seed: args.seed,
            reference_year: args.reference_year,
        }
    }
}

/// `RUST_LOG` wins, then the CLI level, then the TOML level
fn init_tracing(cli_level: Option<&str>, toml: &TomlConfig) -> Result<()> {
    let level = cli_level.unwrap_or(toml.logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let file_layer = match &toml.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let toml = load_toml_config(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(cli.log_level.as_deref(), &toml)?;

    info!(
        "Starting fati-import v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let (db_path, existed) = match &cli.database {
        Some(path) => (path.clone(), path.exists()),
        None => {
            let root_folder = RootFolderResolver::new(cli.root_folder.clone(), &toml).resolve();
            let initializer = RootFolderInitializer::new(root_folder);
            initializer
                .ensure_directory_exists()
                .context("Failed to initialize root folder")?;
            (initializer.database_path(), initializer.database_exists())
        }
    };
    if existed {
        info!("Database: {} (existing)", db_path.display());
    } else {
        info!("Database: {} (new, schema will be created)", db_path.display());
    }

    let db = fati_import::db::init_database_pool(&db_path)
        .await
        .context("Failed to open database")?;

    match &cli.command {
        Command::Populate(args) => {
            let options = resolve_populate_options(&db, &toml, PopulateOverrides::from(args)).await?;
            let stats = run_populate(&db, &options).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
        }
        Command::SeedGeography => {
            let stats = RegionSeeder::new(db.clone()).seed().await?;
            println!("{}", stats.display_string());
        }
        Command::Summary { json } => {
            let summary = load_summary(&db).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for line in summary.lines() {
                    println!("{}", line);
                }
            }
        }
    }

    db.close().await;
    Ok(())
}
