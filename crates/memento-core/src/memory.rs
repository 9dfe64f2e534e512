//! [`MemoryStore`], an in-process [`HistoryStore`] over fixed histories.
//!
//! Useful for tests and for hosts that already hold histories in memory.

use std::{collections::BTreeMap, convert::Infallible};

use chrono::{DateTime, Utc};

use crate::{
  store::HistoryStore,
  version::{HistoryBounds, ResourceId, Version, VersionHistory, VersionId},
};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  histories: BTreeMap<ResourceId, VersionHistory>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Register `resource` with the given versions, replacing any previous
  /// history. An empty `versions` registers a resource with no history.
  pub fn insert(&mut self, resource: ResourceId, versions: Vec<Version>) {
    let history = VersionHistory::new(resource.clone(), versions);
    self.histories.insert(resource, history);
  }

  fn versions(&self, resource: &ResourceId) -> &[Version] {
    self
      .histories
      .get(resource)
      .map(VersionHistory::versions)
      .unwrap_or_default()
  }
}

impl HistoryStore for MemoryStore {
  type Error = Infallible;

  async fn resource_exists<'a>(&'a self, resource: &'a ResourceId) -> Result<bool, Infallible> {
    Ok(self.histories.contains_key(resource))
  }

  async fn get_history<'a>(
    &'a self,
    resource: &'a ResourceId,
  ) -> Result<Option<VersionHistory>, Infallible> {
    Ok(self.histories.get(resource).cloned())
  }

  async fn get_bounds<'a>(
    &'a self,
    resource: &'a ResourceId,
  ) -> Result<Option<HistoryBounds>, Infallible> {
    Ok(self.histories.get(resource).and_then(VersionHistory::bounds))
  }

  async fn count_between<'a>(
    &'a self,
    resource: &'a ResourceId,
    a: VersionId,
    b: VersionId,
  ) -> Result<u64, Infallible> {
    // Histories are sorted by (timestamp, id), so positions order versions
    // even within a shared timestamp.
    let versions = self.versions(resource);
    let position = |id| versions.iter().position(|v| v.id == id);
    let (Some(pa), Some(pb)) = (position(a), position(b)) else {
      return Ok(0);
    };
    Ok(pa.abs_diff(pb).saturating_sub(1) as u64)
  }

  async fn versions_before<'a>(
    &'a self,
    resource: &'a ResourceId,
    before: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<Version>, Infallible> {
    Ok(
      self
        .versions(resource)
        .iter()
        .rev()
        .filter(|v| v.timestamp < before)
        .take(limit)
        .copied()
        .collect(),
    )
  }

  async fn versions_after<'a>(
    &'a self,
    resource: &'a ResourceId,
    after: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<Version>, Infallible> {
    Ok(
      self
        .versions(resource)
        .iter()
        .filter(|v| v.timestamp > after)
        .take(limit)
        .copied()
        .collect(),
    )
  }
}
