//! PostgreSQL store.
//!
//! Records are kept as JSONB documents in one `records` table (see
//! `schema.rs`). Every mutating call runs in its own transaction, so the
//! id bump, the write and any cascade commit or fail together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};

use super::{Repository, Snapshot, SnapshotRead};
use crate::error::StoreResult;
use crate::models::{Entity, EntityKind, ListFilter, Property, WorkOrder};

// ---

const NEXT_ID: &str = r#"
    INSERT INTO record_ids (kind, last_id) VALUES ($1, 1)
    ON CONFLICT (kind) DO UPDATE SET last_id = record_ids.last_id + 1
    RETURNING last_id
"#;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a pool whose schema has already been created.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode<E: Entity>(body: Value) -> StoreResult<E> {
    Ok(serde_json::from_value(body)?)
}

async fn write<E: Entity>(tx: &mut Transaction<'_, Postgres>, record: &E) -> StoreResult<()> {
    // ---
    sqlx::query(
        r#"
        INSERT INTO records (kind, id, property_id, work_order_id, body)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (kind, id) DO UPDATE SET
            property_id   = EXCLUDED.property_id,
            work_order_id = EXCLUDED.work_order_id,
            body          = EXCLUDED.body
        "#,
    )
    .bind(E::KIND.as_str())
    .bind(record.id())
    .bind(record.property_id().map(i64::from))
    .bind(record.work_order_id())
    .bind(serde_json::to_value(record)?)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Clear a reference held in field `field` of every `E` that points at `target`.
async fn unlink<E: Entity>(
    tx: &mut Transaction<'_, Postgres>,
    field: &str,
    target: i64,
    now: DateTime<Utc>,
    clear: fn(&mut E),
) -> StoreResult<()> {
    // ---
    let rows: Vec<(Value,)> = sqlx::query_as(
        r#"
        SELECT body FROM records
        WHERE kind = $1 AND (body->>$2)::BIGINT = $3
        FOR UPDATE
        "#,
    )
    .bind(E::KIND.as_str())
    .bind(field)
    .bind(target)
    .fetch_all(&mut **tx)
    .await?;

    for (body,) in rows {
        let mut record: E = decode(body)?;
        clear(&mut record);
        record.touch(now);
        write(tx, &record).await?;
    }
    Ok(())
}

async fn cascade(
    tx: &mut Transaction<'_, Postgres>,
    kind: EntityKind,
    id: i64,
    now: DateTime<Utc>,
) -> StoreResult<()> {
    // ---
    match kind {
        EntityKind::Property => {
            sqlx::query(
                r#"
                DELETE FROM records
                WHERE kind = $1 AND work_order_id IN (
                    SELECT id FROM records WHERE kind = $2 AND property_id = $3
                )
                "#,
            )
            .bind(EntityKind::WorkOrderCost.as_str())
            .bind(EntityKind::WorkOrder.as_str())
            .bind(id)
            .execute(&mut **tx)
            .await?;

            let owned: Vec<String> = EntityKind::PROPERTY_OWNED
                .iter()
                .map(|k| k.as_str().to_string())
                .collect();
            let removed = sqlx::query("DELETE FROM records WHERE property_id = $1 AND kind = ANY($2)")
                .bind(id)
                .bind(owned)
                .execute(&mut **tx)
                .await?;
            tracing::debug!("property {} cascade removed {} records", id, removed.rows_affected());
        }
        EntityKind::WorkOrder => {
            sqlx::query("DELETE FROM records WHERE kind = $1 AND work_order_id = $2")
                .bind(EntityKind::WorkOrderCost.as_str())
                .bind(id)
                .execute(&mut **tx)
                .await?;
        }
        EntityKind::PropertyGroup => {
            unlink::<Property>(tx, "groupId", id, now, |p| p.group_id = None).await?;
        }
        EntityKind::Staff => {
            unlink::<WorkOrder>(tx, "assignedStaffId", id, now, |wo| {
                wo.assigned_staff_id = None
            })
            .await?;
        }
        _ => {}
    }
    Ok(())
}

/// Every record of one kind, ordered by id.
async fn all<E: Entity>(tx: &mut Transaction<'_, Postgres>) -> StoreResult<Vec<E>> {
    // ---
    let rows: Vec<(Value,)> =
        sqlx::query_as("SELECT body FROM records WHERE kind = $1 ORDER BY id")
            .bind(E::KIND.as_str())
            .fetch_all(&mut **tx)
            .await?;
    rows.into_iter().map(|(body,)| decode(body)).collect()
}

#[async_trait]
impl SnapshotRead for PgStore {
    async fn snapshot(&self) -> StoreResult<Snapshot> {
        // ---
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let snapshot = Snapshot {
            properties: all(&mut tx).await?,
            sensors: all(&mut tx).await?,
            inspections: all(&mut tx).await?,
            groups: all(&mut tx).await?,
        };
        tx.commit().await?;
        Ok(snapshot)
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for PgStore {
    async fn create(&self, new: E::New) -> StoreResult<E> {
        // ---
        let mut tx = self.pool.begin().await?;
        let (id,): (i64,) = sqlx::query_as(NEXT_ID)
            .bind(E::KIND.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let record = E::build(id, Utc::now(), new);
        write(&mut tx, &record).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<E>> {
        // ---
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT body FROM records WHERE kind = $1 AND id = $2")
                .bind(E::KIND.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|(body,)| decode(body)).transpose()
    }

    async fn list(&self, filter: ListFilter) -> StoreResult<Vec<E>> {
        // ---
        let (property_id, work_order_id) = match filter {
            ListFilter::Property(p) => (Some(p.get()), None),
            ListFilter::WorkOrder(w) => (None, Some(w)),
            ListFilter::All | ListFilter::Group(_) => (None, None),
        };

        let rows: Vec<(Value,)> = sqlx::query_as(
            r#"
            SELECT body FROM records
            WHERE kind = $1
              AND ($2::BIGINT IS NULL OR property_id = $2)
              AND ($3::BIGINT IS NULL OR work_order_id = $3)
            ORDER BY id
            "#,
        )
        .bind(E::KIND.as_str())
        .bind(property_id)
        .bind(work_order_id)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for (body,) in rows {
            let record: E = decode(body)?;
            if filter.matches(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn update(&self, id: i64, patch: E::Patch) -> StoreResult<Option<E>> {
        // ---
        let mut tx = self.pool.begin().await?;
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT body FROM records WHERE kind = $1 AND id = $2 FOR UPDATE")
                .bind(E::KIND.as_str())
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((body,)) = row else {
            return Ok(None);
        };

        let mut record: E = decode(body)?;
        record.apply(patch);
        record.touch(Utc::now());
        write(&mut tx, &record).await?;
        tx.commit().await?;
        Ok(Some(record))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        // ---
        let mut tx = self.pool.begin().await?;
        let done = sqlx::query("DELETE FROM records WHERE kind = $1 AND id = $2")
            .bind(E::KIND.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if done.rows_affected() == 0 {
            return Ok(false);
        }

        cascade(&mut tx, E::KIND, id, Utc::now()).await?;
        tx.commit().await?;
        Ok(true)
    }
}
