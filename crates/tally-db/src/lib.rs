//! # tally-db: Storage and Transaction Layer for Tally
//!
//! SQLite-backed catalog, stock ledger, order sequence and the order
//! mutation engine that runs every change as one exclusive unit of work.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Data Flow                                │
//! │                                                                         │
//! │  tally CLI (order create --file intent.json)                           │
//! │       │  OrderIntent (validated in tally-core)                         │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐                                             │   │
//! │  │   │  OrderEngine  │──── Database::exclusive (BEGIN IMMEDIATE)   │   │
//! │  │   └──┬─────┬──────┘                                             │   │
//! │  │      │     │                                                    │   │
//! │  │      ▼     ▼                                                    │   │
//! │  │  ┌────────┐ ┌──────────┐ ┌──────────────┐ ┌──────────────────┐ │   │
//! │  │  │ ledger │ │ sequence │ │ repositories │ │ migrations       │ │   │
//! │  │  │ stock  │ │ ORD0001  │ │ product      │ │ 001_initial.sql  │ │   │
//! │  │  │ deltas │ │          │ │ category     │ │ (embedded)       │ │   │
//! │  │  │        │ │          │ │ order        │ │                  │ │   │
//! │  │  └────────┘ └──────────┘ └──────────────┘ └──────────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (./tally.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`unit_of_work`] - Exclusive transaction scope
//! - [`ledger`] - Stock checks and deltas
//! - [`sequence`] - Order id allocation
//! - [`repository`] - Product, category and order persistence
//! - [`engine`] - Order create / update / delete
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::OrderIntent;
//! use tally_db::{Database, DbConfig, EngineConfig, OrderEngine};
//!
//! let db = Database::new(DbConfig::new("./tally.db")).await?;
//! let engine = OrderEngine::new(db.clone(), EngineConfig::default());
//!
//! let intent = OrderIntent::from_json(&body)?;
//! let order_id = engine.create_order(&intent).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sequence;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::{EngineConfig, OrderEngine};
pub use error::{DbError, DbResult};
pub use ledger::{StockCheck, StockLedger, StockOutcome};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
