//! # Settings Repository
//!
//! String key/value store plus typed accessors for the values the register
//! needs at startup.
//!
//! ## Known Keys
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ Key              │ Meaning                                              │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ store_name       │ Shown on receipts and the title bar                  │
//! │ currency_symbol  │ Display prefix, e.g. "KSh"                           │
//! │ tax_rate         │ Percentage as a decimal string, e.g. "16.0"          │
//! │ tax_inclusive    │ "1" = prices include tax, "0" = tax added on top     │
//! │ receipt_footer   │ Free text under the receipt total                    │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! Defaults are seeded by the initial migration; `get` falls back to them
//! so a wiped settings table never breaks the register.

use std::collections::HashMap;

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use duka_core::validation::validate_tax_rate_bps;
use duka_core::{TaxConfig, TaxMode, TaxRate};

/// Fallback values for known keys, used when a row is missing.
const DEFAULTS: &[(&str, &str)] = &[
    ("store_name", "Duka POS"),
    ("currency_symbol", "KSh"),
    ("tax_rate", "16.0"),
    ("tax_inclusive", "0"),
    ("receipt_footer", "Thank you for shopping with us!"),
];

/// Repository for the settings store.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets a setting, falling back to the built-in default for known keys.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.or_else(|| {
            DEFAULTS
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }))
    }

    /// Sets a setting (upsert).
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, "Setting updated");
        Ok(())
    }

    /// Returns all settings as a map.
    pub async fn all(&self) -> DbResult<HashMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }

    /// Loads the typed tax configuration from `tax_rate` and `tax_inclusive`.
    ///
    /// Unparseable or out-of-range values fall back to the defaults rather
    /// than taking the register down.
    pub async fn tax_config(&self) -> DbResult<TaxConfig> {
        let rate = self
            .get("tax_rate")
            .await?
            .and_then(|v| v.trim().parse::<f64>().ok())
            .map(TaxRate::from_percentage)
            .filter(|r| validate_tax_rate_bps(r.bps()).is_ok())
            .unwrap_or_else(|| TaxRate::from_bps(1600));

        let mode = match self.get("tax_inclusive").await?.as_deref() {
            Some("1") => TaxMode::Inclusive,
            _ => TaxMode::Exclusive,
        };

        Ok(TaxConfig::new(rate, mode))
    }

    /// Returns the configured currency symbol.
    pub async fn currency_symbol(&self) -> DbResult<String> {
        Ok(self
            .get("currency_symbol")
            .await?
            .unwrap_or_else(|| "KSh".to_string()))
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
