//! Datetime negotiation: choosing the memento that best represents a
//! resource at a requested instant.
//!
//! The chosen memento is the newest one not after the requested datetime.
//! A request that predates the whole history is answered according to
//! [`BeforeFirst`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
  Error, Result,
  datetime::format_http_date,
  version::{Version, VersionHistory},
};

/// What to do when the requested datetime predates the first version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BeforeFirst {
  /// Answer with the earliest version.
  #[default]
  Earliest,
  /// Fail with [`Error::NoMementoBefore`].
  NotFound,
}

/// The selected memento and its neighbourhood in the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationResult {
  pub selected: Version,
  pub is_first: bool,
  pub is_last:  bool,
  pub previous: Option<Version>,
  pub next:     Option<Version>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeNegotiator {
  pub before_first: BeforeFirst,
}

impl TimeNegotiator {
  pub fn new(before_first: BeforeFirst) -> Self { Self { before_first } }

  pub fn negotiate(
    &self,
    history: &VersionHistory,
    requested: DateTime<Utc>,
  ) -> Result<NegotiationResult> {
    let versions = history.versions();
    let (Some(first), Some(last)) = (versions.first(), versions.last()) else {
      return Err(Error::EmptyHistory(history.resource().to_string()));
    };

    let not_after = versions.partition_point(|v| v.timestamp <= requested);
    let index = match not_after.checked_sub(1) {
      Some(i) => i,
      None if self.before_first == BeforeFirst::Earliest => 0,
      None => {
        return Err(Error::NoMementoBefore {
          resource:  history.resource().to_string(),
          requested: format_http_date(requested),
        });
      }
    };

    let selected = versions[index];
    tracing::debug!(
      resource = %history.resource(),
      %requested,
      selected = %selected.id,
      "negotiated memento"
    );

    Ok(NegotiationResult {
      selected,
      is_first: selected.timestamp == first.timestamp,
      is_last: selected.timestamp == last.timestamp,
      previous: index.checked_sub(1).map(|i| versions[i]),
      next: versions.get(index + 1).copied(),
    })
  }
}

/// Negotiate with the default [`BeforeFirst::Earliest`] policy.
pub fn negotiate(history: &VersionHistory, requested: DateTime<Utc>) -> Result<NegotiationResult> {
  TimeNegotiator::default().negotiate(history, requested)
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;
  use crate::version::{ResourceId, VersionId};

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap() }

  fn three() -> VersionHistory {
    VersionHistory::new(
      ResourceId::parse("Page").unwrap(),
      vec![
        Version::new(1, at(2012, 1, 1)),
        Version::new(2, at(2012, 6, 1)),
        Version::new(3, at(2013, 1, 1)),
      ],
    )
  }

  #[test]
  fn interior_selection() {
    let r = negotiate(&three(), at(2012, 7, 1)).unwrap();
    assert_eq!(r.selected.id, VersionId(2));
    assert!(!r.is_first);
    assert!(!r.is_last);
    assert_eq!(r.previous.map(|v| v.id), Some(VersionId(1)));
    assert_eq!(r.next.map(|v| v.id), Some(VersionId(3)));
  }

  #[test]
  fn before_first_falls_back_to_earliest() {
    let r = negotiate(&three(), at(2011, 1, 1)).unwrap();
    assert_eq!(r.selected.id, VersionId(1));
    assert!(r.is_first);
    assert!(r.previous.is_none());
    assert_eq!(r.next.map(|v| v.id), Some(VersionId(2)));
  }

  #[test]
  fn before_first_can_be_rejected() {
    let negotiator = TimeNegotiator::new(BeforeFirst::NotFound);
    let err = negotiator.negotiate(&three(), at(2011, 1, 1)).unwrap_err();
    assert!(matches!(err, Error::NoMementoBefore { .. }));
    assert!(negotiator.negotiate(&three(), at(2012, 1, 1)).is_ok());
  }

  #[test]
  fn after_last_selects_last() {
    let r = negotiate(&three(), at(2020, 1, 1)).unwrap();
    assert_eq!(r.selected.id, VersionId(3));
    assert!(r.is_last);
    assert!(r.next.is_none());
  }

  #[test]
  fn exact_timestamp_selects_that_version() {
    let r = negotiate(&three(), at(2012, 6, 1)).unwrap();
    assert_eq!(r.selected.id, VersionId(2));
    let r = negotiate(&three(), at(2012, 6, 1) - Duration::seconds(1)).unwrap();
    assert_eq!(r.selected.id, VersionId(1));
  }

  #[test]
  fn shared_timestamp_selects_highest_id() {
    let history = VersionHistory::new(
      ResourceId::parse("Page").unwrap(),
      vec![
        Version::new(3, at(2012, 6, 1)),
        Version::new(1, at(2012, 1, 1)),
        Version::new(4, at(2013, 1, 1)),
        Version::new(2, at(2012, 6, 1)),
      ],
    );

    for t in [at(2012, 6, 1), at(2012, 7, 1)] {
      let r = negotiate(&history, t).unwrap();
      assert_eq!(r.selected.id, VersionId(3), "t={t}");
      assert_eq!(r.previous.map(|v| v.id), Some(VersionId(2)));
      assert_eq!(r.next.map(|v| v.id), Some(VersionId(4)));
      assert!(!r.is_first && !r.is_last);
    }
  }

  #[test]
  fn single_version_is_first_and_last() {
    let history = VersionHistory::new(
      ResourceId::parse("Page").unwrap(),
      vec![Version::new(7, at(2012, 1, 1))],
    );
    for t in [at(2000, 1, 1), at(2012, 1, 1), at(2030, 1, 1)] {
      let r = negotiate(&history, t).unwrap();
      assert!(r.is_first && r.is_last);
      assert!(r.previous.is_none() && r.next.is_none());
    }
  }

  #[test]
  fn empty_history_is_an_error() {
    let history = VersionHistory::new(ResourceId::parse("Page").unwrap(), vec![]);
    assert!(matches!(negotiate(&history, at(2012, 1, 1)), Err(Error::EmptyHistory(_))));
  }

  #[test]
  fn closest_not_after_else_earliest() {
    let base = at(2010, 1, 1);
    let history = VersionHistory::new(
      ResourceId::parse("Page").unwrap(),
      (0..40u64)
        .map(|n| Version::new(n + 1, base + Duration::days((n * n) as i64)))
        .collect(),
    );
    let first = *history.first().unwrap();
    let last = *history.last().unwrap();

    for offset in (-30..1700).step_by(7) {
      let t = base + Duration::days(offset);
      let r = negotiate(&history, t).unwrap();
      assert!(r.selected.timestamp <= t || r.selected == first, "t={t}");
      if let Some(next) = r.next {
        assert!(next.timestamp > t || r.selected == first, "skipped a closer version at t={t}");
      }
    }

    assert!(negotiate(&history, last.timestamp).unwrap().is_last);
    assert!(negotiate(&history, first.timestamp).unwrap().is_first);
  }
}
