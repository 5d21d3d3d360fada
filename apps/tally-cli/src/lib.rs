//! # tally-cli: Operator Command Line
//!
//! Parses arguments, opens the database named by [`AppConfig`], runs one
//! catalog, stock or order operation and returns its result as JSON.
//!
//! ```text
//! tally order create --file intent.json
//!   │
//!   ├── AppConfig::load()          TALLY_* environment
//!   ├── App::open(config)          pool + migrations + OrderEngine
//!   └── commands::order::execute   OrderIntent::from_json → create_order
//!         │
//!         ▼
//!   { "orderId": "ORD0001" }
//! ```

pub mod commands;
pub mod config;
pub mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tally_db::{Database, OrderEngine};

pub use config::{AppConfig, ConfigError};
pub use error::{CliError, ErrorCode};

#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(about = "Tally - order and inventory engine for the shop counter", long_about = None)]
pub struct Cli {
    /// Database file (overrides TALLY_DATABASE_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Catalog products
    Product(commands::product::ProductArgs),
    /// Product categories
    Category(commands::category::CategoryArgs),
    /// Stock checks and manual adjustments
    Stock(commands::stock::StockArgs),
    /// Order create / update / delete / show / list
    Order(commands::order::OrderArgs),
    /// Invoice figures for an order
    Invoice(commands::invoice::InvoiceArgs),
}

/// Everything a command needs.
#[derive(Debug, Clone)]
pub struct App {
    pub db: Database,
    pub engine: OrderEngine,
    pub config: AppConfig,
}

impl App {
    /// Connects to the configured database and runs migrations.
    pub async fn open(config: AppConfig) -> Result<Self, CliError> {
        let db = Database::new(config.db_config()).await?;
        Ok(App::with_database(db, config))
    }

    pub fn with_database(db: Database, config: AppConfig) -> Self {
        let engine = OrderEngine::new(db.clone(), config.engine_config());
        App { db, engine, config }
    }
}

/// Runs one parsed command line against a freshly opened database.
pub async fn run(cli: Cli, mut config: AppConfig) -> Result<Value, CliError> {
    if let Some(path) = cli.db {
        config.database_path = path;
    }

    let app = App::open(config).await?;
    let result = execute(&app, cli.command).await;
    app.db.close().await;
    result
}

/// Dispatches a command against an open [`App`].
pub async fn execute(app: &App, command: Commands) -> Result<Value, CliError> {
    match command {
        Commands::Product(args) => commands::product::execute(app, args).await,
        Commands::Category(args) => commands::category::execute(app, args).await,
        Commands::Stock(args) => commands::stock::execute(app, args).await,
        Commands::Order(args) => commands::order::execute(app, args).await,
        Commands::Invoice(args) => commands::invoice::execute(app, args).await,
    }
}
