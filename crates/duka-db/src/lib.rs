//! # duka-db: Database Layer for Duka POS
//!
//! This crate provides database access for the Duka POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Duka POS Data Flow                               │
//! │                                                                         │
//! │  Register / admin screen                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     duka-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (catalog.rs,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  sale.rs, …)  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CatalogRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ SaleRepo      │    │ ...          │  │   │
//! │  │   │ Management    │    │ ShiftRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (duka.db, WAL mode)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, sale, shift, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use duka_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("path/to/duka.db")).await?;
//!
//! // Use repositories
//! let entries = db.catalog().search("rice", 20).await?;
//! let tax = db.settings().tax_config().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::{
    CatalogRepository, NewProduct, NewVariant, ProductUpdate, VariantUpdate,
};
pub use repository::report::ReportRepository;
pub use repository::sale::{SaleRepository, SettledSale};
pub use repository::settings::SettingsRepository;
pub use repository::shift::ShiftRepository;
pub use repository::user::UserRepository;
