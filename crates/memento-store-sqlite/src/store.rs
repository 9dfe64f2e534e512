//! [`SqliteStore`]: the SQLite implementation of [`HistoryStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use memento_core::{
  store::HistoryStore,
  version::{HistoryBounds, ResourceId, Version, VersionHistory, VersionId},
};

use crate::{
  Error, Result,
  encode::{RawVersion, decode_versions, encode_id, encode_limit, encode_ts},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Memento history store backed by a single SQLite file.
///
/// Cloning shares the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, as used by the tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Register a new original resource with no versions.
  pub async fn add_resource(&self, resource: &ResourceId) -> Result<()> {
    let id_str = resource.to_string();
    let at_str = encode_ts(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO resources (resource_id, created_at) VALUES (?1, ?2)",
          rusqlite::params![id_str, at_str],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::ResourceExists(resource.to_string()));
    }
    Ok(())
  }

  /// Append a version of `resource` stamped `timestamp` (truncated to the
  /// second). The store assigns the version id.
  pub async fn record_version(
    &self,
    resource: &ResourceId,
    timestamp: DateTime<Utc>,
  ) -> Result<Version> {
    if !self.resource_exists(resource).await? {
      return Err(Error::ResourceNotFound(resource.to_string()));
    }

    let id_str = resource.to_string();
    let ts_str = encode_ts(timestamp);

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO versions (resource_id, timestamp) VALUES (?1, ?2)",
          rusqlite::params![id_str, ts_str],
        )?;
        Ok(RawVersion { version_id: conn.last_insert_rowid(), timestamp: ts_str })
      })
      .await?;

    raw.into_version()
  }

  async fn select_versions(
    &self,
    sql: &'static str,
    resource: &ResourceId,
    at: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<Version>> {
    let id_str = resource.to_string();
    let at_str = encode_ts(at);
    let limit_val = encode_limit(limit);

    let raws: Vec<RawVersion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![id_str, at_str, limit_val],
            RawVersion::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    decode_versions(raws)
  }
}

// ─── HistoryStore impl ───────────────────────────────────────────────────────

const VERSIONS_BEFORE: &str = "SELECT version_id, timestamp FROM versions
   WHERE resource_id = ?1 AND timestamp < ?2
   ORDER BY timestamp DESC, version_id DESC
   LIMIT ?3";

const VERSIONS_AFTER: &str = "SELECT version_id, timestamp FROM versions
   WHERE resource_id = ?1 AND timestamp > ?2
   ORDER BY timestamp ASC, version_id ASC
   LIMIT ?3";

impl HistoryStore for SqliteStore {
  type Error = Error;

  async fn resource_exists<'a>(&'a self, resource: &'a ResourceId) -> Result<bool> {
    let id_str = resource.to_string();
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM resources WHERE resource_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn get_history<'a>(&'a self, resource: &'a ResourceId) -> Result<Option<VersionHistory>> {
    if !self.resource_exists(resource).await? {
      return Ok(None);
    }

    let id_str = resource.to_string();
    let raws: Vec<RawVersion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT version_id, timestamp FROM versions WHERE resource_id = ?1
           ORDER BY timestamp ASC, version_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawVersion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(Some(VersionHistory::new(resource.clone(), decode_versions(raws)?)))
  }

  async fn get_bounds<'a>(&'a self, resource: &'a ResourceId) -> Result<Option<HistoryBounds>> {
    let id_str = resource.to_string();

    let (count, first, last): (i64, Option<RawVersion>, Option<RawVersion>) = self
      .conn
      .call(move |conn| {
        let count: i64 = conn.query_row(
          "SELECT COUNT(*) FROM versions WHERE resource_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?;

        let first = conn
          .query_row(
            "SELECT version_id, timestamp FROM versions WHERE resource_id = ?1
             ORDER BY timestamp ASC, version_id ASC LIMIT 1",
            rusqlite::params![id_str],
            RawVersion::from_row,
          )
          .optional()?;

        let last = conn
          .query_row(
            "SELECT version_id, timestamp FROM versions WHERE resource_id = ?1
             ORDER BY timestamp DESC, version_id DESC LIMIT 1",
            rusqlite::params![id_str],
            RawVersion::from_row,
          )
          .optional()?;

        Ok((count, first, last))
      })
      .await?;

    let (Some(first), Some(last)) = (first, last) else {
      return Ok(None);
    };

    Ok(Some(HistoryBounds {
      first: first.into_version()?,
      last:  last.into_version()?,
      count: u64::try_from(count).map_err(|_| Error::OutOfRange(count))?,
    }))
  }

  async fn count_between<'a>(
    &'a self,
    resource: &'a ResourceId,
    a: VersionId,
    b: VersionId,
  ) -> Result<u64> {
    let id_str = resource.to_string();
    let a_val = encode_id(a)?;
    let b_val = encode_id(b)?;

    // Ok(Err(id)) names the version that could not be found.
    let count: std::result::Result<i64, i64> = self
      .conn
      .call(move |conn| {
        let stamp = |id: i64| {
          conn
            .query_row(
              "SELECT timestamp FROM versions WHERE resource_id = ?1 AND version_id = ?2",
              rusqlite::params![id_str, id],
              |r| r.get::<_, String>(0),
            )
            .optional()
        };

        let Some(ta) = stamp(a_val)? else { return Ok(Err(a_val)) };
        let Some(tb) = stamp(b_val)? else { return Ok(Err(b_val)) };
        let ((lo_ts, lo_id), (hi_ts, hi_id)) = if (&ta, a_val) <= (&tb, b_val) {
          ((ta, a_val), (tb, b_val))
        } else {
          ((tb, b_val), (ta, a_val))
        };

        // Row-value comparison: versions sharing a timestamp order by id.
        let n: i64 = conn.query_row(
          "SELECT COUNT(*) FROM versions
           WHERE resource_id = ?1
             AND (timestamp, version_id) > (?2, ?3)
             AND (timestamp, version_id) < (?4, ?5)",
          rusqlite::params![id_str, lo_ts, lo_id, hi_ts, hi_id],
          |r| r.get(0),
        )?;
        Ok(Ok(n))
      })
      .await?;

    let count = count.map_err(|id| Error::VersionNotFound(id as u64))?;
    u64::try_from(count).map_err(|_| Error::OutOfRange(count))
  }

  async fn versions_before<'a>(
    &'a self,
    resource: &'a ResourceId,
    before: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<Version>> {
    self.select_versions(VERSIONS_BEFORE, resource, before, limit).await
  }

  async fn versions_after<'a>(
    &'a self,
    resource: &'a ResourceId,
    after: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<Version>> {
    self.select_versions(VERSIONS_AFTER, resource, after, limit).await
  }
}
