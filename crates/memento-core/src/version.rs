//! Versions ("mementos") and the identifiers that address them.
//!
//! A version is an immutable `(id, timestamp)` pair read from the history
//! store. A resource's history is the ascending sequence of its versions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Resource identifier ─────────────────────────────────────────────────────

/// Characters that may never appear in an original-resource identifier.
const FORBIDDEN: &[char] = &['<', '>', '[', ']', '{', '}', '|', '#'];

/// A validated original-resource identifier.
///
/// Inner spaces are normalised to `_`, so `Main Page` and `Main_Page` name
/// the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
  pub fn parse(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
      || trimmed.chars().any(|c| c.is_control() || FORBIDDEN.contains(&c))
    {
      return Err(Error::InvalidTitle(raw.to_string()));
    }
    Ok(Self(trimmed.replace(' ', "_")))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ResourceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for ResourceId {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<ResourceId> for String {
  fn from(value: ResourceId) -> Self { value.0 }
}

// ─── Versions ────────────────────────────────────────────────────────────────

/// Opaque store-assigned version identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VersionId(pub u64);

impl fmt::Display for VersionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// One stored state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
  pub id:        VersionId,
  pub timestamp: DateTime<Utc>,
}

impl Version {
  pub fn new(id: u64, timestamp: DateTime<Utc>) -> Self {
    Self { id: VersionId(id), timestamp }
  }
}

/// A read-only snapshot of one resource's versions, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionHistory {
  resource: ResourceId,
  versions: Vec<Version>,
}

impl VersionHistory {
  /// Build a history, ordering `versions` by timestamp then id.
  pub fn new(resource: ResourceId, mut versions: Vec<Version>) -> Self {
    versions.sort_by_key(|v| (v.timestamp, v.id));
    Self { resource, versions }
  }

  pub fn resource(&self) -> &ResourceId { &self.resource }

  pub fn versions(&self) -> &[Version] { &self.versions }

  pub fn len(&self) -> usize { self.versions.len() }

  pub fn is_empty(&self) -> bool { self.versions.is_empty() }

  pub fn first(&self) -> Option<&Version> { self.versions.first() }

  pub fn last(&self) -> Option<&Version> { self.versions.last() }

  /// The first, last and total count, or `None` for an empty history.
  pub fn bounds(&self) -> Option<HistoryBounds> {
    Some(HistoryBounds {
      first: *self.first()?,
      last:  *self.last()?,
      count: self.versions.len() as u64,
    })
  }
}

/// The extremes of a non-empty history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryBounds {
  pub first: Version,
  pub last:  Version,
  pub count: u64,
}

// ─── Pivots ──────────────────────────────────────────────────────────────────

/// Which side of a pivot a paginated scan walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  /// Versions strictly after the pivot, closest first.
  Ascending,
  /// Versions strictly before the pivot, closest first.
  Descending,
}

impl Direction {
  /// The URL token for this direction.
  pub fn token(self) -> &'static str {
    match self {
      Self::Ascending => "1",
      Self::Descending => "-1",
    }
  }

  pub fn from_token(token: &str) -> Option<Self> {
    match token {
      "1" => Some(Self::Ascending),
      "-1" => Some(Self::Descending),
      _ => None,
    }
  }
}

/// The anchor of a paginated TimeMap scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
  pub timestamp: DateTime<Utc>,
  pub direction: Direction,
}
