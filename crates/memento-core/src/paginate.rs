//! TimeMap pagination.
//!
//! A TimeMap page holds at most `limit` versions, always newest first. A
//! group of versions sharing a timestamp is never split across pages, even
//! when it alone exceeds `limit`. The main page of a large history holds the
//! newest versions; further pages are anchored at a [`Pivot`] and reached
//! through continuation links emitted at each boundary of the page that
//! still has versions beyond it.
//!
//! Following the older-boundary continuation of every page, starting from
//! the main page, visits every version of the history exactly once.

use chrono::{DateTime, Duration, Utc};

use crate::{
  Error, Result,
  datetime::format_store_timestamp,
  store::HistoryStore,
  uri::UriScheme,
  version::{Direction, HistoryBounds, Pivot, ResourceId, Version},
};

/// Which part of the history a TimeMap covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
  /// The whole history, trimmed to the newest `limit` versions.
  Full,
  /// The `limit` versions closest to a pivot, on one side of it.
  Pivot(Pivot),
}

/// A link to a further page of the TimeMap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
  pub pivot:     Pivot,
  pub uri:       String,
  /// Window of the linked page.
  pub from:      DateTime<Utc>,
  pub until:     DateTime<Utc>,
  /// Versions beyond the boundary this continuation leads across.
  pub remaining: u64,
}

/// One rendered page of a TimeMap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMapPage {
  pub resource:      ResourceId,
  /// Newest first.
  pub entries:       Vec<Version>,
  pub window_start:  DateTime<Utc>,
  pub window_end:    DateTime<Utc>,
  pub self_uri:      String,
  /// Older-boundary continuation first, then newer-boundary.
  pub continuations: Vec<Continuation>,
  pub bounds:        HistoryBounds,
}

impl TimeMapPage {
  pub fn is_paginated(&self) -> bool { !self.continuations.is_empty() }
}

/// Slices a resource's history into TimeMap pages of at most `limit`
/// versions.
pub struct TimeMapPaginator<'a, S> {
  store: &'a S,
  uris:  &'a UriScheme,
  limit: usize,
}

impl<'a, S: HistoryStore> TimeMapPaginator<'a, S> {
  /// `limit` is clamped to at least one version per page.
  pub fn new(store: &'a S, uris: &'a UriScheme, limit: usize) -> Self {
    Self { store, uris, limit: limit.max(1) }
  }

  pub fn limit(&self) -> usize { self.limit }

  /// Versions strictly before `before`, newest first.
  pub async fn scan_descending(
    &self,
    resource: &ResourceId,
    before: DateTime<Utc>,
  ) -> Result<Vec<Version>> {
    self.fill(resource, Direction::Descending, before).await
  }

  /// Versions strictly after `after`, newest first.
  ///
  /// The store hands back the versions closest to the pivot (oldest first);
  /// they are only reordered after the page has been filled, so the page
  /// stays anchored at the pivot.
  pub async fn scan_ascending(
    &self,
    resource: &ResourceId,
    after: DateTime<Utc>,
  ) -> Result<Vec<Version>> {
    let mut versions = self.fill(resource, Direction::Ascending, after).await?;
    versions.reverse();
    Ok(versions)
  }

  /// Versions on the `pivot` side of its timestamp, newest first.
  pub async fn scan(&self, resource: &ResourceId, pivot: Pivot) -> Result<Vec<Version>> {
    match pivot.direction {
      Direction::Ascending => self.scan_ascending(resource, pivot.timestamp).await,
      Direction::Descending => self.scan_descending(resource, pivot.timestamp).await,
    }
  }

  /// Build the TimeMap page for `scope`, including its continuation links.
  ///
  /// Fails with [`Error::EmptyHistory`] if the resource has no versions and
  /// with [`Error::InvalidPivot`] if the pivot selects nothing.
  pub async fn page(&self, resource: &ResourceId, scope: Scope) -> Result<TimeMapPage> {
    let bounds = self
      .store
      .get_bounds(resource)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::EmptyHistory(resource.to_string()))?;

    let entries = match scope {
      // Second precision: everything up to and including the last version.
      Scope::Full => {
        self
          .scan_descending(resource, bounds.last.timestamp + Duration::seconds(1))
          .await?
      }
      Scope::Pivot(pivot) => self.scan(resource, pivot).await?,
    };

    let (Some(&newest), Some(&oldest)) = (entries.first(), entries.last()) else {
      let stamp = match scope {
        Scope::Pivot(pivot) => format_store_timestamp(pivot.timestamp),
        Scope::Full => resource.to_string(),
      };
      return Err(Error::InvalidPivot(stamp));
    };

    let mut continuations = Vec::new();

    let older = self.remaining(resource, bounds.first, oldest).await?;
    if older > 0 {
      let pivot = Pivot { timestamp: oldest.timestamp, direction: Direction::Descending };
      continuations.extend(self.continuation(resource, pivot, older).await?);
    }

    let newer = self.remaining(resource, bounds.last, newest).await?;
    if newer > 0 {
      let pivot = Pivot { timestamp: newest.timestamp, direction: Direction::Ascending };
      continuations.extend(self.continuation(resource, pivot, newer).await?);
    }

    tracing::debug!(
      %resource,
      entries = entries.len(),
      total = bounds.count,
      older,
      newer,
      "built TimeMap page"
    );

    Ok(TimeMapPage {
      resource: resource.clone(),
      window_start: oldest.timestamp,
      window_end: newest.timestamp,
      self_uri: self.uris.timemap_for(resource, scope),
      entries,
      continuations,
      bounds,
    })
  }

  /// Up to `limit` versions walking away from `at`, nearest first.
  ///
  /// Pivots carry only a timestamp, so a page never ends inside a group of
  /// versions sharing one: a trailing partial group is left to the next
  /// page, and a group that alone overflows the page is taken whole.
  async fn fill(
    &self,
    resource: &ResourceId,
    direction: Direction,
    at: DateTime<Utc>,
  ) -> Result<Vec<Version>> {
    let limit = self.limit;
    let mut found = self.fetch(resource, direction, at, limit.saturating_add(1)).await?;
    if found.len() <= limit {
      return Ok(found);
    }

    let edge = found[limit - 1].timestamp;
    if found[limit].timestamp != edge {
      found.truncate(limit);
      return Ok(found);
    }

    let split = found[..limit].partition_point(|v| v.timestamp != edge);
    if split > 0 {
      found.truncate(split);
      return Ok(found);
    }

    // The whole page shares one timestamp: widen until the group ends.
    let mut want = limit.saturating_mul(2);
    loop {
      let mut found = self.fetch(resource, direction, at, want).await?;
      let group = found.partition_point(|v| v.timestamp == edge);
      if group < found.len() || found.len() < want {
        tracing::debug!(%resource, %edge, group, limit, "timestamp group overflows the page");
        found.truncate(group);
        return Ok(found);
      }
      want = want.saturating_mul(2);
    }
  }

  async fn fetch(
    &self,
    resource: &ResourceId,
    direction: Direction,
    at: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<Version>> {
    let found = match direction {
      Direction::Descending => self.store.versions_before(resource, at, limit).await,
      Direction::Ascending => self.store.versions_after(resource, at, limit).await,
    };
    found.map_err(Error::store)
  }

  /// Number of versions between `edge` (a history bound) and `entry`
  /// (the page's extreme entry on that side), counting the bound itself.
  /// Pages hold whole timestamp groups, so these are exactly the versions
  /// beyond the page.
  async fn remaining(&self, resource: &ResourceId, edge: Version, entry: Version) -> Result<u64> {
    if edge.id == entry.id {
      return Ok(0);
    }
    let between = self
      .store
      .count_between(resource, edge.id, entry.id)
      .await
      .map_err(Error::store)?;
    Ok(between + 1)
  }

  async fn continuation(
    &self,
    resource: &ResourceId,
    pivot: Pivot,
    remaining: u64,
  ) -> Result<Option<Continuation>> {
    let linked = self.scan(resource, pivot).await?;
    let (Some(newest), Some(oldest)) = (linked.first(), linked.last()) else {
      tracing::warn!(%resource, pivot = %pivot.timestamp, "continuation scan came back empty");
      return Ok(None);
    };
    let (from, until) = (oldest.timestamp, newest.timestamp);

    Ok(Some(Continuation {
      pivot,
      uri: self.uris.timemap_pivot(resource, pivot),
      from,
      until,
      remaining,
    }))
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use chrono::TimeZone;

  use super::*;
  use crate::{memory::MemoryStore, version::VersionId};

  const BASE: &str = "http://example.com/wiki";

  fn at(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)
  }

  /// A resource whose versions 1..=n fall on consecutive days.
  fn history(n: u64) -> (MemoryStore, ResourceId) {
    let id = ResourceId::parse("Page").unwrap();
    let mut store = MemoryStore::new();
    store.insert(id.clone(), (1..=n).map(|i| Version::new(i, at(i as i64))).collect());
    (store, id)
  }

  fn ids(versions: &[Version]) -> Vec<u64> { versions.iter().map(|v| v.id.0).collect() }

  fn assert_well_formed(page: &TimeMapPage, limit: usize) {
    assert!(page.entries.len() <= limit);
    assert!(page.entries.windows(2).all(|w| (w[0].timestamp, w[0].id) > (w[1].timestamp, w[1].id)));
    for e in &page.entries {
      assert!(page.window_start <= e.timestamp && e.timestamp <= page.window_end);
    }
    for c in &page.continuations {
      assert!(c.from <= c.until);
    }
  }

  #[tokio::test]
  async fn small_history_is_unpaginated() {
    let (store, id) = history(3);
    let uris = UriScheme::new(BASE);
    let page = TimeMapPaginator::new(&store, &uris, 10).page(&id, Scope::Full).await.unwrap();

    assert_eq!(ids(&page.entries), vec![3, 2, 1]);
    assert!(!page.is_paginated());
    assert_eq!(page.self_uri, "http://example.com/wiki/TimeMap/Page");
    assert_eq!(page.window_start, at(1));
    assert_eq!(page.window_end, at(3));
  }

  #[tokio::test]
  async fn exactly_limit_is_unpaginated() {
    let (store, id) = history(10);
    let uris = UriScheme::new(BASE);
    let page = TimeMapPaginator::new(&store, &uris, 10).page(&id, Scope::Full).await.unwrap();
    assert_eq!(page.entries.len(), 10);
    assert!(!page.is_paginated());
  }

  #[tokio::test]
  async fn single_version_has_no_continuations() {
    let (store, id) = history(1);
    let uris = UriScheme::new(BASE);
    let page = TimeMapPaginator::new(&store, &uris, 10).page(&id, Scope::Full).await.unwrap();
    assert_eq!(ids(&page.entries), vec![1]);
    assert!(page.continuations.is_empty());
  }

  #[tokio::test]
  async fn twenty_five_versions_in_pages_of_ten() {
    let (store, id) = history(25);
    let uris = UriScheme::new(BASE);
    let paginator = TimeMapPaginator::new(&store, &uris, 10);

    let main = paginator.page(&id, Scope::Full).await.unwrap();
    assert_well_formed(&main, 10);
    assert_eq!(ids(&main.entries), (16..=25).rev().collect::<Vec<_>>());
    assert_eq!(main.continuations.len(), 1);

    let older = &main.continuations[0];
    assert_eq!(older.pivot, Pivot { timestamp: at(16), direction: Direction::Descending });
    assert_eq!(older.uri, "http://example.com/wiki/TimeMap/20120117000000/-1/Page");
    assert_eq!(older.remaining, 15);
    assert_eq!((older.from, older.until), (at(6), at(15)));

    let second = paginator.page(&id, Scope::Pivot(older.pivot)).await.unwrap();
    assert_well_formed(&second, 10);
    assert_eq!(ids(&second.entries), (6..=15).rev().collect::<Vec<_>>());
    assert_eq!(second.self_uri, older.uri);

    let directions: Vec<Direction> = second.continuations.iter().map(|c| c.pivot.direction).collect();
    assert_eq!(directions, vec![Direction::Descending, Direction::Ascending]);
    assert_eq!(second.continuations[0].pivot.timestamp, at(6));
    assert_eq!(second.continuations[0].remaining, 5);
    assert_eq!(second.continuations[1].pivot.timestamp, at(15));
    assert_eq!(second.continuations[1].remaining, 10);
    assert_eq!((second.continuations[1].from, second.continuations[1].until), (at(16), at(25)));
    assert_eq!((second.window_start, second.window_end), (older.from, older.until));

    let third = paginator
      .page(&id, Scope::Pivot(second.continuations[0].pivot))
      .await
      .unwrap();
    assert_eq!(ids(&third.entries), vec![5, 4, 3, 2, 1]);
    assert_eq!(third.continuations.len(), 1);
    assert_eq!(third.continuations[0].pivot.direction, Direction::Ascending);
  }

  #[tokio::test]
  async fn following_older_links_visits_every_version_once() {
    for (n, limit) in [(1, 1), (7, 3), (25, 10), (30, 10), (31, 10), (100, 7)] {
      let (store, id) = history(n);
      let uris = UriScheme::new(BASE);
      let paginator = TimeMapPaginator::new(&store, &uris, limit);

      let mut seen = Vec::new();
      let mut page = paginator.page(&id, Scope::Full).await.unwrap();
      loop {
        assert_well_formed(&page, limit);
        seen.extend(ids(&page.entries));
        let next = page
          .continuations
          .iter()
          .find(|c| c.pivot.direction == Direction::Descending)
          .map(|c| c.pivot);
        match next {
          Some(pivot) => page = paginator.page(&id, Scope::Pivot(pivot)).await.unwrap(),
          None => break,
        }
      }

      let unique: BTreeSet<u64> = seen.iter().copied().collect();
      assert_eq!(seen.len(), n as usize, "n={n} limit={limit}");
      assert_eq!(unique, (1..=n).collect::<BTreeSet<_>>(), "n={n} limit={limit}");
    }
  }

  /// A resource holding `(id, day)` versions.
  fn history_of(versions: &[(u64, i64)]) -> (MemoryStore, ResourceId) {
    let id = ResourceId::parse("Page").unwrap();
    let mut store = MemoryStore::new();
    store.insert(id.clone(), versions.iter().map(|&(v, d)| Version::new(v, at(d))).collect());
    (store, id)
  }

  /// Every page reached from the main page through older-boundary links.
  async fn older_pages(paginator: &TimeMapPaginator<'_, MemoryStore>, id: &ResourceId) -> Vec<TimeMapPage> {
    let mut pages = vec![paginator.page(id, Scope::Full).await.unwrap()];
    while let Some(pivot) = pages
      .last()
      .and_then(|p| p.continuations.iter().find(|c| c.pivot.direction == Direction::Descending))
      .map(|c| c.pivot)
    {
      pages.push(paginator.page(id, Scope::Pivot(pivot)).await.unwrap());
    }
    pages
  }

  #[tokio::test]
  async fn shared_timestamps_are_not_split_across_pages() {
    let (store, id) = history_of(&[(1, 1), (2, 2), (3, 2), (4, 3)]);
    let uris = UriScheme::new(BASE);
    let paginator = TimeMapPaginator::new(&store, &uris, 2);

    let pages = older_pages(&paginator, &id).await;
    let listed: Vec<Vec<u64>> = pages.iter().map(|p| ids(&p.entries)).collect();
    assert_eq!(listed, vec![vec![4], vec![3, 2], vec![1]]);

    assert_eq!(pages[0].continuations[0].remaining, 3);
    assert_eq!(pages[1].continuations[0].remaining, 1);
    assert_eq!(pages[1].continuations[1].remaining, 1);
    for page in &pages {
      assert_well_formed(page, 2);
    }
  }

  #[tokio::test]
  async fn following_older_links_with_shared_timestamps() {
    for (group, limit) in [(2u64, 3usize), (3, 2), (3, 5), (4, 4), (5, 1), (1, 2)] {
      let versions: Vec<(u64, i64)> = (1..=20u64).map(|v| (v, ((v - 1) / group) as i64)).collect();
      let (store, id) = history_of(&versions);
      let uris = UriScheme::new(BASE);
      let paginator = TimeMapPaginator::new(&store, &uris, limit);

      let pages = older_pages(&paginator, &id).await;
      let mut seen: Vec<u64> = pages.iter().flat_map(|p| ids(&p.entries)).collect();
      assert_eq!(seen.len(), 20, "group={group} limit={limit}");
      seen.sort_unstable();
      assert_eq!(seen, (1..=20).collect::<Vec<_>>(), "group={group} limit={limit}");

      for page in &pages {
        assert_well_formed(page, limit.max(group as usize));
      }
    }
  }

  #[tokio::test]
  async fn oversized_timestamp_group_is_listed_whole() {
    let (store, id) = history_of(&[(1, 1), (2, 2), (3, 2), (4, 2), (5, 3)]);
    let uris = UriScheme::new(BASE);
    let paginator = TimeMapPaginator::new(&store, &uris, 2);

    let pages = older_pages(&paginator, &id).await;
    let listed: Vec<Vec<u64>> = pages.iter().map(|p| ids(&p.entries)).collect();
    assert_eq!(listed, vec![vec![5], vec![4, 3, 2], vec![1]]);
  }

  #[tokio::test]
  async fn ascending_page_is_anchored_at_the_pivot() {
    let (store, id) = history(25);
    let uris = UriScheme::new(BASE);
    let paginator = TimeMapPaginator::new(&store, &uris, 5);
    let pivot = Pivot { timestamp: at(3), direction: Direction::Ascending };

    let page = paginator.page(&id, Scope::Pivot(pivot)).await.unwrap();
    assert_eq!(ids(&page.entries), vec![8, 7, 6, 5, 4]);
    assert_eq!(page.self_uri, "http://example.com/wiki/TimeMap/20120104000000/1/Page");
  }

  #[tokio::test]
  async fn pivot_at_the_boundary_is_invalid() {
    let (store, id) = history(5);
    let uris = UriScheme::new(BASE);
    let paginator = TimeMapPaginator::new(&store, &uris, 10);

    for pivot in [
      Pivot { timestamp: at(1), direction: Direction::Descending },
      Pivot { timestamp: at(5), direction: Direction::Ascending },
    ] {
      let err = paginator.page(&id, Scope::Pivot(pivot)).await.unwrap_err();
      assert!(matches!(err, Error::InvalidPivot(_)), "{err}");
    }
  }

  #[tokio::test]
  async fn empty_history() {
    let id = ResourceId::parse("Empty").unwrap();
    let mut store = MemoryStore::new();
    store.insert(id.clone(), vec![]);
    let uris = UriScheme::new(BASE);
    let err = TimeMapPaginator::new(&store, &uris, 10).page(&id, Scope::Full).await.unwrap_err();
    assert!(matches!(err, Error::EmptyHistory(_)));
  }

  #[tokio::test]
  async fn bounds_travel_with_the_page() {
    let (store, id) = history(12);
    let uris = UriScheme::new(BASE);
    let page = TimeMapPaginator::new(&store, &uris, 4).page(&id, Scope::Full).await.unwrap();
    assert_eq!(page.bounds.first.id, VersionId(1));
    assert_eq!(page.bounds.last.id, VersionId(12));
    assert_eq!(page.bounds.count, 12);
  }
}
