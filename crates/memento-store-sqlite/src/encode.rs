//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored in the compact `YYYYMMDDHHMMSS` form; version ids
//! are SQLite integer row ids.

use chrono::{DateTime, Utc};
use memento_core::{
  datetime::{format_store_timestamp, parse_store_timestamp},
  version::{Version, VersionId},
};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_ts(dt: DateTime<Utc>) -> String { format_store_timestamp(dt) }

pub fn decode_ts(s: &str) -> Result<DateTime<Utc>> { Ok(parse_store_timestamp(s)?) }

// ─── Version ids ─────────────────────────────────────────────────────────────

pub fn encode_id(id: VersionId) -> Result<i64> {
  i64::try_from(id.0).map_err(|_| Error::VersionNotFound(id.0))
}

pub fn decode_id(raw: i64) -> Result<VersionId> {
  u64::try_from(raw).map(VersionId).map_err(|_| Error::OutOfRange(raw))
}

pub fn encode_limit(limit: usize) -> i64 { i64::try_from(limit).unwrap_or(i64::MAX) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `versions` row as read from the database, before validation.
pub struct RawVersion {
  pub version_id: i64,
  pub timestamp:  String,
}

impl RawVersion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { version_id: row.get(0)?, timestamp: row.get(1)? })
  }

  pub fn into_version(self) -> Result<Version> {
    Ok(Version { id: decode_id(self.version_id)?, timestamp: decode_ts(&self.timestamp)? })
  }
}

pub fn decode_versions(raws: Vec<RawVersion>) -> Result<Vec<Version>> {
  raws.into_iter().map(RawVersion::into_version).collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn malformed_stored_timestamp_is_rejected() {
    let raw = RawVersion { version_id: 1, timestamp: "2012-01-01".into() };
    assert!(matches!(raw.into_version(), Err(Error::Core(_))));
  }

  #[test]
  fn negative_row_id_is_rejected() {
    assert!(matches!(decode_id(-1), Err(Error::OutOfRange(-1))));
  }

  #[test]
  fn timestamps_sort_as_text() {
    let a = encode_ts(Utc.with_ymd_and_hms(2012, 9, 30, 23, 59, 59).unwrap());
    let b = encode_ts(Utc.with_ymd_and_hms(2012, 10, 1, 0, 0, 0).unwrap());
    assert!(a < b);
  }
}
