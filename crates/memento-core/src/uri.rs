//! URI construction and the TimeMap URL grammar.
//!
//! | Resource | Shape |
//! |----------|-------|
//! | original | `<base>/<id>` |
//! | memento  | `<base>/<id>?oldid=<version>` |
//! | TimeGate | `<base>/TimeGate/<id>` |
//! | TimeMap  | `<base>/TimeMap/<id>` |
//! | paged TimeMap | `<base>/TimeMap/<YYYYMMDDHHMMSS>/<1\|-1>/<id>` |

use crate::{
  Error, Result,
  datetime::{format_store_timestamp, parse_store_timestamp},
  paginate::Scope,
  version::{Direction, Pivot, ResourceId, VersionId},
};

pub const TIMEGATE_SEGMENT: &str = "TimeGate";
pub const TIMEMAP_SEGMENT: &str = "TimeMap";

/// Builds every URI the protocol emits from a single base.
#[derive(Debug, Clone)]
pub struct UriScheme {
  base: String,
}

impl UriScheme {
  pub fn new(base: impl Into<String>) -> Self {
    let base: String = base.into();
    Self { base: base.trim_end_matches('/').to_string() }
  }

  pub fn base(&self) -> &str { &self.base }

  pub fn original(&self, id: &ResourceId) -> String { format!("{}/{id}", self.base) }

  pub fn memento(&self, id: &ResourceId, version: VersionId) -> String {
    format!("{}/{id}?oldid={version}", self.base)
  }

  pub fn timegate(&self, id: &ResourceId) -> String {
    format!("{}/{TIMEGATE_SEGMENT}/{id}", self.base)
  }

  pub fn timemap(&self, id: &ResourceId) -> String {
    format!("{}/{TIMEMAP_SEGMENT}/{id}", self.base)
  }

  pub fn timemap_pivot(&self, id: &ResourceId, pivot: Pivot) -> String {
    format!(
      "{}/{TIMEMAP_SEGMENT}/{}/{}/{id}",
      self.base,
      format_store_timestamp(pivot.timestamp),
      pivot.direction.token(),
    )
  }

  /// The TimeMap URI for `scope`.
  pub fn timemap_for(&self, id: &ResourceId, scope: Scope) -> String {
    match scope {
      Scope::Full => self.timemap(id),
      Scope::Pivot(pivot) => self.timemap_pivot(id, pivot),
    }
  }
}

// ─── TimeMap path grammar ────────────────────────────────────────────────────

/// A TimeMap request path, parsed once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMapTarget {
  pub scope:    Scope,
  pub resource: ResourceId,
}

impl TimeMapTarget {
  /// Parse the part of the request path following `/TimeMap/`.
  ///
  /// A leading all-digit segment followed by a `-*[0-9]` segment marks a
  /// pivot; anything else is taken as a plain identifier.
  pub fn parse(path: &str) -> Result<Self> {
    let path = path.trim_start_matches('/');

    if let Some((stamp, direction, rest)) = split_pivot(path) {
      let direction = Direction::from_token(direction)
        .ok_or_else(|| Error::InvalidPivot(path.to_string()))?;
      let timestamp = parse_store_timestamp(stamp)
        .map_err(|_| Error::InvalidPivot(stamp.to_string()))?;
      return Ok(Self {
        scope:    Scope::Pivot(Pivot { timestamp, direction }),
        resource: ResourceId::parse(rest)?,
      });
    }

    Ok(Self { scope: Scope::Full, resource: ResourceId::parse(path)? })
  }
}

fn split_pivot(path: &str) -> Option<(&str, &str, &str)> {
  let mut parts = path.splitn(3, '/');
  let stamp = parts.next()?;
  let direction = parts.next()?;
  let rest = parts.next()?;

  let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
  let unsigned = direction.trim_start_matches('-');
  (digits(stamp) && unsigned.len() == 1 && digits(unsigned)).then_some((stamp, direction, rest))
}
