//! # Shift Repository
//!
//! Shift open/close lifecycle.
//!
//! ## Shift Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Shift Lifecycle                                   │
//! │                                                                         │
//! │  1. OPEN                                                               │
//! │     └── start_shift(user, opening_cash) → Shift { ended_at: None }     │
//! │         Rejected if the user already has an open shift.                │
//! │                                                                         │
//! │  2. SELL                                                               │
//! │     └── every settlement attaches to the open shift                    │
//! │                                                                         │
//! │  3. CLOSE                                                              │
//! │     └── close_shift(shift, closing_cash) → Shift { ended_at: Some }    │
//! │         Closing twice is rejected.                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The one-open-shift-per-user rule is enforced both here and by a partial
//! unique index on `shifts(user_id) WHERE ended_at IS NULL`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use duka_core::validation::validate_cash_count_cents;
use duka_core::Shift;

/// Repository for shift database operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Opens a shift for a user with an opening cash count.
    ///
    /// ## Errors
    /// - [`DbError::ShiftAlreadyOpen`] when the user has an open shift
    /// - Validation error for a negative cash count
    pub async fn start_shift(&self, user_id: &str, opening_cash_cents: i64) -> DbResult<Shift> {
        validate_cash_count_cents(opening_cash_cents).map_err(duka_core::CoreError::from)?;

        if self.active_shift(user_id).await?.is_some() {
            return Err(DbError::ShiftAlreadyOpen {
                user_id: user_id.to_string(),
            });
        }

        let shift = Shift {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            opening_cash_cents,
            closing_cash_cents: None,
            started_at: Utc::now(),
            ended_at: None,
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO shifts (id, user_id, opening_cash_cents, closing_cash_cents, started_at, ended_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&shift.id)
        .bind(&shift.user_id)
        .bind(shift.opening_cash_cents)
        .bind(shift.closing_cash_cents)
        .bind(shift.started_at)
        .bind(shift.ended_at)
        .execute(&self.pool)
        .await;

        // The partial unique index catches the race the pre-check misses
        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.message().contains("UNIQUE constraint failed") => {
                return Err(DbError::ShiftAlreadyOpen {
                    user_id: user_id.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        info!(shift_id = %shift.id, user_id = %user_id, "Shift opened");
        Ok(shift)
    }

    /// Returns the user's open shift, if any.
    pub async fn active_shift(&self, user_id: &str) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, user_id, opening_cash_cents, closing_cash_cents, started_at, ended_at
            FROM shifts
            WHERE user_id = ?1 AND ended_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Closes a shift with a closing cash count.
    ///
    /// The guarded UPDATE only matches an open shift, so closing twice
    /// surfaces as NotFound rather than silently rewriting the close.
    pub async fn close_shift(&self, shift_id: &str, closing_cash_cents: i64) -> DbResult<Shift> {
        validate_cash_count_cents(closing_cash_cents).map_err(duka_core::CoreError::from)?;

        let updated = sqlx::query(
            r#"
            UPDATE shifts
            SET closing_cash_cents = ?1, ended_at = ?2
            WHERE id = ?3 AND ended_at IS NULL
            "#,
        )
        .bind(closing_cash_cents)
        .bind(Utc::now())
        .bind(shift_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("Open shift", shift_id));
        }

        let shift = self
            .get_by_id(shift_id)
            .await?
            .ok_or_else(|| DbError::not_found("Shift", shift_id))?;

        info!(shift_id = %shift_id, "Shift closed");
        Ok(shift)
    }

    /// Gets a shift by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, user_id, opening_cash_cents, closing_cash_cents, started_at, ended_at
            FROM shifts WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Lists a user's shifts, most recent first.
    pub async fn shifts_for_user(&self, user_id: &str, limit: i64) -> DbResult<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, user_id, opening_cash_cents, closing_cash_cents, started_at, ended_at
            FROM shifts
            WHERE user_id = ?1
            ORDER BY started_at DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(user_id = %user_id, count = shifts.len(), "Listed shifts");
        Ok(shifts)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
