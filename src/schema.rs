//! Database schema management for the PostgreSQL record store.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` when `DATABASE_URL` is set.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Every entity kind shares the `records` table: the record itself is a JSONB
/// document, and the `property_id` / `work_order_id` columns are lifted out
/// of it for filtering and cascades. `record_ids` holds the per-kind id
/// counter, which only ever moves forward. Safe to call on every startup.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            kind          TEXT   NOT NULL,
            id            BIGINT NOT NULL,
            property_id   BIGINT,
            work_order_id BIGINT,
            body          JSONB  NOT NULL,
            PRIMARY KEY (kind, id)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS record_ids (
            kind    TEXT PRIMARY KEY,
            last_id BIGINT NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Property-scoped listings and the delete cascade
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_records_property_id
            ON records (property_id, kind);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_records_work_order_id
            ON records (work_order_id)
            WHERE work_order_id IS NOT NULL;
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
