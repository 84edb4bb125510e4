//! Withdrawal ledger repository
//!
//! Owns the Take operation and the reporting queries over `sel3a_taken`.
//! Ledger rows are append-only: nothing in this service updates or deletes
//! them, so `remaining_quantity + sum(taken_quantity)` always reconstructs
//! the total ever added for an item.

use anyhow::Result;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::report::{
    TakenDetailEntry, TakenDetailsResponse, TakenReportRow, TakenSummaryRow,
};

/// Outcome of a take attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeOutcome {
    /// Stock was decremented and a ledger row appended
    Taken,
    /// No item with the given ID exists
    NotFound,
    /// The requested quantity exceeds the remaining stock
    InsufficientStock,
}

/// Withdrawal ledger repository
#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Create a new ledger repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Take a quantity from an item.
    ///
    /// The decrement is conditional (`quantity >= $1`) so the stock check
    /// and the write are a single indivisible statement: two concurrent
    /// takes can never both pass the check against the same stale value.
    /// The ledger insert happens in the same transaction, so a failure on
    /// either side leaves no partial record.
    pub async fn take(&self, sel3a_id: Uuid, taken_by: &str, quantity: i32) -> Result<TakeOutcome> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE sel3a
            SET quantity = quantity - $1
            WHERE id = $2 AND quantity >= $1
            "#,
        )
        .bind(quantity)
        .bind(sel3a_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            // Zero rows means either an unknown item or not enough stock;
            // re-check existence to report the right failure.
            let exists = sqlx::query("SELECT 1 FROM sel3a WHERE id = $1")
                .bind(sel3a_id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();

            tx.rollback().await?;

            return Ok(if exists {
                TakeOutcome::InsufficientStock
            } else {
                TakeOutcome::NotFound
            });
        }

        sqlx::query(
            r#"
            INSERT INTO sel3a_taken (sel3a_id, taken_by, taken_quantity)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(sel3a_id)
        .bind(taken_by)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("{} took {} from item {}", taken_by, quantity, sel3a_id);
        Ok(TakeOutcome::Taken)
    }

    /// Every ledger entry joined with item name and taker display name,
    /// newest first
    pub async fn report_all(&self) -> Result<Vec<TakenReportRow>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, s.name AS sel3a_name, t.taken_quantity,
                   COALESCE(u.name, t.taken_by) AS taken_by, t.taken_at
            FROM sel3a_taken t
            JOIN sel3a s ON t.sel3a_id = s.id
            LEFT JOIN users u ON t.taken_by = u.email
            ORDER BY t.taken_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let report = rows
            .into_iter()
            .map(|row| TakenReportRow {
                id: row.get("id"),
                sel3a_name: row.get("sel3a_name"),
                taken_quantity: row.get("taken_quantity"),
                taken_by: row.get("taken_by"),
                taken_at: row.get("taken_at"),
            })
            .collect();

        Ok(report)
    }

    /// Per-item totals of quantities ever taken. Items without takes are
    /// included with a zero total.
    pub async fn report_summary(&self) -> Result<Vec<TakenSummaryRow>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id AS sel3a_id, s.name AS sel3a_name,
                   COALESCE(SUM(t.taken_quantity), 0)::BIGINT AS total_taken_quantity
            FROM sel3a s
            LEFT JOIN sel3a_taken t ON s.id = t.sel3a_id
            GROUP BY s.id, s.name
            ORDER BY s.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let summary = rows
            .into_iter()
            .map(|row| TakenSummaryRow {
                sel3a_id: row.get("sel3a_id"),
                sel3a_name: row.get("sel3a_name"),
                total_taken_quantity: row.get("total_taken_quantity"),
            })
            .collect();

        Ok(summary)
    }

    /// Per-item detail report: remaining quantity, derived total ever
    /// added, and the newest-first withdrawal history
    pub async fn report_details(&self, sel3a_id: Uuid) -> Result<Option<TakenDetailsResponse>> {
        let item_row = sqlx::query(
            r#"
            SELECT name, added_by, quantity,
                   quantity + COALESCE(
                       (SELECT SUM(taken_quantity) FROM sel3a_taken WHERE sel3a_id = $1), 0
                   )::BIGINT AS total_added
            FROM sel3a
            WHERE id = $1
            "#,
        )
        .bind(sel3a_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(item_row) = item_row else {
            return Ok(None);
        };

        let detail_rows = sqlx::query(
            r#"
            SELECT id, taken_quantity, taken_by, taken_at
            FROM sel3a_taken
            WHERE sel3a_id = $1
            ORDER BY taken_at DESC
            "#,
        )
        .bind(sel3a_id)
        .fetch_all(&self.pool)
        .await?;

        let details = detail_rows
            .into_iter()
            .map(|row| TakenDetailEntry {
                id: row.get("id"),
                taken_quantity: row.get("taken_quantity"),
                taken_by: row.get("taken_by"),
                taken_at: row.get("taken_at"),
            })
            .collect();

        Ok(Some(TakenDetailsResponse {
            sel3a_name: item_row.get("name"),
            added_by: item_row.get("added_by"),
            remaining_quantity: item_row.get("quantity"),
            total_added: item_row.get("total_added"),
            details,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::ItemRepository;
    use common::database::{DatabaseConfig, init_pool};

    async fn test_pool() -> PgPool {
        init_pool(&DatabaseConfig::from_env().unwrap())
            .await
            .unwrap()
    }

    /// Needs a live PostgreSQL with db/schema.sql applied.
    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn test_take_scenario() {
        let pool = test_pool().await;
        let items = ItemRepository::new(pool.clone());
        let ledger = LedgerRepository::new(pool);

        let pen = items.create("pen", 1.5, 10, "alice@x").await.unwrap();

        assert_eq!(
            ledger.take(pen.id, "bob@x", 5).await.unwrap(),
            TakeOutcome::Taken
        );

        let after = items.find_by_id(pen.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 5);

        let details = ledger.report_details(pen.id).await.unwrap().unwrap();
        assert_eq!(details.remaining_quantity, 5);
        assert_eq!(details.total_added, 10);
        assert_eq!(details.details.len(), 1);
        assert_eq!(details.details[0].taken_quantity, 5);
        assert_eq!(details.details[0].taken_by, "bob@x");

        // Requesting more than the remaining 5 must not go through.
        assert_eq!(
            ledger.take(pen.id, "bob@x", 6).await.unwrap(),
            TakeOutcome::InsufficientStock
        );
        let after = items.find_by_id(pen.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 5);

        items.delete(pen.id).await.unwrap();
    }

    /// Needs a live PostgreSQL with db/schema.sql applied.
    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn test_take_unknown_item_is_not_found() {
        let pool = test_pool().await;
        let ledger = LedgerRepository::new(pool);

        assert_eq!(
            ledger.take(Uuid::new_v4(), "bob@x", 1).await.unwrap(),
            TakeOutcome::NotFound
        );
    }

    /// Concurrent takes must never jointly overdraw the starting stock,
    /// and each success must leave exactly one ledger row.
    /// Needs a live PostgreSQL with db/schema.sql applied.
    #[tokio::test(flavor = "multi_thread")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn test_concurrent_takes_never_overdraw() {
        let pool = test_pool().await;
        let items = ItemRepository::new(pool.clone());
        let ledger = LedgerRepository::new(pool);

        let start_quantity = 10;
        let item = items
            .create("contested", 2.0, start_quantity, "alice@x")
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let ledger = ledger.clone();
            let id = item.id;
            handles.push(tokio::spawn(async move {
                ledger.take(id, &format!("taker-{}@x", i), 3).await.unwrap()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() == TakeOutcome::Taken {
                successes += 1;
            }
        }

        // At most floor(10 / 3) takes of 3 can succeed.
        assert!(successes <= start_quantity / 3);

        let after = items.find_by_id(item.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, start_quantity - successes * 3);
        assert!(after.quantity >= 0);

        // Ledger invariant: remaining + taken == total ever added, with
        // exactly one record per successful take.
        let details = ledger.report_details(item.id).await.unwrap().unwrap();
        assert_eq!(details.details.len() as i32, successes);
        let taken_sum: i64 = details.details.iter().map(|d| d.taken_quantity as i64).sum();
        assert_eq!(details.remaining_quantity as i64 + taken_sum, start_quantity as i64);
        assert_eq!(details.total_added, start_quantity as i64);

        items.delete(item.id).await.unwrap();
    }

    /// Needs a live PostgreSQL with db/schema.sql applied.
    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn test_summary_includes_untaken_items() {
        let pool = test_pool().await;
        let items = ItemRepository::new(pool.clone());
        let ledger = LedgerRepository::new(pool);

        let item = items.create("untouched", 3.0, 7, "alice@x").await.unwrap();

        let summary = ledger.report_summary().await.unwrap();
        let row = summary
            .iter()
            .find(|r| r.sel3a_id == item.id)
            .expect("item missing from summary");
        assert_eq!(row.total_taken_quantity, 0);

        items.delete(item.id).await.unwrap();
    }
}
