//! The `HistoryStore` trait, the version history port.
//!
//! The trait is implemented by storage backends (e.g. `memento-store-sqlite`
//! or [`MemoryStore`](crate::memory::MemoryStore)). Negotiation and
//! pagination depend on this abstraction and never touch storage directly.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::version::{HistoryBounds, ResourceId, VersionHistory, VersionId};

/// Read access to the version histories of original resources.
///
/// Every call is treated as an independent snapshot read; consistency under
/// concurrent writes is the implementation's concern.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HistoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether the original resource is known at all, versions or not.
  fn resource_exists<'a>(
    &'a self,
    resource: &'a ResourceId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// The complete ordered history. Returns `None` if the resource does not
  /// exist.
  fn get_history<'a>(
    &'a self,
    resource: &'a ResourceId,
  ) -> impl Future<Output = Result<Option<VersionHistory>, Self::Error>> + Send + 'a;

  /// First version, last version and total count. Returns `None` if the
  /// resource has no versions.
  fn get_bounds<'a>(
    &'a self,
    resource: &'a ResourceId,
  ) -> impl Future<Output = Result<Option<HistoryBounds>, Self::Error>> + Send + 'a;

  /// Number of versions strictly between the two given versions in
  /// `(timestamp, id)` order, so versions sharing a timestamp with either
  /// endpoint are counted by id. The arguments may be passed in either order.
  fn count_between<'a>(
    &'a self,
    resource: &'a ResourceId,
    a: VersionId,
    b: VersionId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Up to `limit` versions with a timestamp strictly before `before`,
  /// newest first.
  fn versions_before<'a>(
    &'a self,
    resource: &'a ResourceId,
    before: DateTime<Utc>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<crate::version::Version>, Self::Error>> + Send + 'a;

  /// Up to `limit` versions with a timestamp strictly after `after`,
  /// oldest first.
  fn versions_after<'a>(
    &'a self,
    resource: &'a ResourceId,
    after: DateTime<Utc>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<crate::version::Version>, Self::Error>> + Send + 'a;
}
