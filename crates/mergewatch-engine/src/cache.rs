// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Persistent merge status cache
//!
//! One row per target branch, stamped with the reference tip it was computed
//! against. When the reference moves, the first lookup that notices drops the
//! whole table: every stored answer is stale at once.

use crate::error::{EngineError, EngineResult};
use crate::status::MergeStatus;
use chrono::{DateTime, Utc};
use mergewatch_git::CommitId;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info, instrument, warn};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS merge_status (
    branch TEXT PRIMARY KEY NOT NULL,
    reference_id TEXT NOT NULL,
    target_id TEXT NOT NULL,
    status TEXT NOT NULL,
    computed_at TEXT NOT NULL
)";

/// A stored determination for one target branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Target branch name
    pub branch: String,
    /// Reference tip the status was computed against
    pub reference: CommitId,
    /// Target tip the status was computed for
    pub target: CommitId,
    /// The cached outcome
    pub status: MergeStatus,
    /// When the row was written
    pub computed_at: DateTime<Utc>,
}

/// SQLite-backed cache of merge statuses
#[derive(Debug, Clone)]
pub struct MergeStatusCache {
    pool: SqlitePool,
}

impl MergeStatusCache {
    /// Opens (creating if needed) the cache database and its table.
    ///
    /// `":memory:"` gives a private in-process database.
    pub async fn connect(database: &str) -> EngineResult<Self> {
        let pool = if database == ":memory:" {
            // Every connection to sqlite::memory: is its own database
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await?
        } else {
            let options = SqliteConnectOptions::new()
                .filename(database)
                .create_if_missing(true);
            SqlitePoolOptions::new().connect_with(options).await?
        };

        let cache = Self::from_pool(pool);
        cache.ensure_schema().await?;
        debug!(database, "Merge status cache ready");
        Ok(cache)
    }

    /// Wraps an existing pool; call [`ensure_schema`](Self::ensure_schema) before use
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the cache table if it does not exist
    pub async fn ensure_schema(&self) -> EngineResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Looks up the entry for `branch`, provided it was computed against
    /// `current_reference`.
    ///
    /// Any row from another reference invalidates the entire cache, whichever
    /// branch it belongs to.
    #[instrument(skip(self, current_reference), fields(reference = %current_reference))]
    pub async fn get(
        &self,
        branch: &str,
        current_reference: &CommitId,
    ) -> EngineResult<Option<CacheEntry>> {
        self.ensure_schema().await?;

        let stale: Option<String> = sqlx::query_scalar(
            "SELECT reference_id FROM merge_status WHERE reference_id <> ? LIMIT 1",
        )
        .bind(current_reference.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(stale_reference) = stale {
            info!(
                stale_reference = %stale_reference,
                "Reference branch moved; dropping merge status cache"
            );
            sqlx::query("DROP TABLE IF EXISTS merge_status")
                .execute(&self.pool)
                .await?;
            self.ensure_schema().await?;
            return Ok(None);
        }

        let row = sqlx::query(
            "SELECT branch, reference_id, target_id, status, computed_at
             FROM merge_status WHERE branch = ?",
        )
        .bind(branch)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(decode_row(&row)?)
    }

    /// Stores a definitive status, replacing any previous row for `branch`
    #[instrument(skip(self, status), fields(status = status.kind()))]
    pub async fn put(
        &self,
        branch: &str,
        reference: &CommitId,
        target: &CommitId,
        status: &MergeStatus,
    ) -> EngineResult<()> {
        if !status.is_cacheable() {
            return Err(EngineError::NotCacheable(status.kind().to_string()));
        }
        let encoded = status.encode()?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM merge_status WHERE branch = ?")
            .bind(branch)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO merge_status (branch, reference_id, target_id, status, computed_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(branch)
        .bind(reference.as_str())
        .bind(target.as_str())
        .bind(&encoded)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!("Cached merge status");
        Ok(())
    }

    /// All readable entries, ordered by branch name
    pub async fn entries(&self) -> EngineResult<Vec<CacheEntry>> {
        self.ensure_schema().await?;
        let rows = sqlx::query(
            "SELECT branch, reference_id, target_id, status, computed_at
             FROM merge_status ORDER BY branch",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(entry) = decode_row(row)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Number of stored rows
    pub async fn len(&self) -> EngineResult<usize> {
        self.ensure_schema().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM merge_status")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Whether no rows are stored
    pub async fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Removes every row
    pub async fn clear(&self) -> EngineResult<()> {
        sqlx::query("DROP TABLE IF EXISTS merge_status")
            .execute(&self.pool)
            .await?;
        self.ensure_schema().await?;
        info!("Merge status cache cleared");
        Ok(())
    }

    /// The underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Turns a row into an entry; unreadable rows are treated as absent
fn decode_row(row: &SqliteRow) -> EngineResult<Option<CacheEntry>> {
    let branch: String = row.try_get("branch")?;
    let reference: String = row.try_get("reference_id")?;
    let target: String = row.try_get("target_id")?;
    let status: String = row.try_get("status")?;
    let computed_at: String = row.try_get("computed_at")?;

    let (Ok(reference), Ok(target)) = (CommitId::parse(&reference), CommitId::parse(&target)) else {
        warn!(branch = %branch, "Ignoring cache row with malformed commit ids");
        return Ok(None);
    };
    let Some(status) = MergeStatus::decode(&status) else {
        return Ok(None);
    };
    let computed_at = match DateTime::parse_from_rfc3339(&computed_at) {
        Ok(at) => at.with_timezone(&Utc),
        Err(e) => {
            warn!(branch = %branch, error = %e, "Ignoring cache row with malformed timestamp");
            return Ok(None);
        }
    };

    Ok(Some(CacheEntry {
        branch,
        reference,
        target,
        status,
        computed_at,
    }))
}
