//! # Repository Module
//!
//! Database repository implementations for Duka POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.catalog().search("rice", 20)                               │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  CatalogRepository                                                     │
//! │  ├── search(&self, query, limit)                                       │
//! │  ├── find_by_barcode(&self, barcode)                                   │
//! │  ├── create_product(&self, ...)                                        │
//! │  └── adjust_stock(&self, ...)                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test against an in-memory database                          │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Products, variants, categories, brands,
//!   suppliers, stock adjustments
//! - [`shift::ShiftRepository`] - Shift open/close lifecycle
//! - [`sale::SaleRepository`] - Atomic settlement and sale reads
//! - [`settings::SettingsRepository`] - Key/value store and typed tax config
//! - [`user::UserRepository`] - Operator accounts and authentication
//! - [`report::ReportRepository`] - Sales and inventory reporting

pub mod catalog;
pub mod report;
pub mod sale;
pub mod settings;
pub mod shift;
pub mod user;
