//! Builders for the canonical Memento relation entries.

use chrono::{DateTime, Utc};
use memento_core::datetime::format_http_date;

use crate::{LINK_FORMAT, LinkEntry, MementoRoles};

/// The TimeMap's own entry, spanning its rendered window.
pub fn self_timemap(uri: &str, from: DateTime<Utc>, until: DateTime<Utc>) -> LinkEntry {
  LinkEntry::new(uri, "self")
    .with_param("type", LINK_FORMAT)
    .with_param("from", format_http_date(from))
    .with_param("until", format_http_date(until))
}

/// A continuation page of a paginated TimeMap.
pub fn timemap(uri: &str, from: DateTime<Utc>, until: DateTime<Utc>) -> LinkEntry {
  LinkEntry::new(uri, "timemap")
    .with_param("type", LINK_FORMAT)
    .with_param("from", format_http_date(from))
    .with_param("until", format_http_date(until))
}

/// A TimeMap reference without a window, as advertised by a TimeGate.
pub fn timemap_ref(uri: &str) -> LinkEntry {
  LinkEntry::new(uri, "timemap").with_param("type", LINK_FORMAT)
}

/// The original resource. Inside a TimeMap the original doubles as its own
/// TimeGate.
pub fn original(uri: &str, in_timemap: bool) -> LinkEntry {
  let rel = if in_timemap {
    "original latest-version timegate"
  } else {
    "original latest-version"
  };
  LinkEntry::new(uri, rel)
}

pub fn timegate(uri: &str) -> LinkEntry { LinkEntry::new(uri, "timegate") }

/// A memento entry with its positional qualifiers.
pub fn memento(uri: &str, datetime: DateTime<Utc>, roles: MementoRoles) -> LinkEntry {
  LinkEntry::new(uri, memento_rel(roles)).with_param("datetime", format_http_date(datetime))
}

/// Relation types for a memento, qualifiers in fixed order, `memento` last.
pub fn memento_rel(roles: MementoRoles) -> String {
  let mut tokens = Vec::with_capacity(6);
  if roles.first {
    tokens.push("first");
  }
  if roles.last {
    tokens.push("last");
  }
  if roles.prev {
    tokens.push("prev predecessor-version");
  }
  if roles.next {
    tokens.push("next successor-version");
  }
  tokens.push("memento");
  tokens.join(" ")
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn memento_relations() {
    let r = |first, last, prev, next| memento_rel(MementoRoles { first, last, prev, next });
    assert_eq!(r(false, false, false, false), "memento");
    assert_eq!(r(true, true, false, false), "first last memento");
    assert_eq!(r(true, false, false, false), "first memento");
    assert_eq!(r(false, false, false, true), "next successor-version memento");
    assert_eq!(r(false, true, false, true), "last next successor-version memento");
    assert_eq!(r(true, false, true, false), "first prev predecessor-version memento");
  }

  #[test]
  fn original_relations() {
    assert_eq!(original("u", true).rel, "original latest-version timegate");
    assert_eq!(original("u", false).rel, "original latest-version");
  }

  #[test]
  fn memento_carries_datetime() {
    let dt = Utc.with_ymd_and_hms(2012, 6, 1, 0, 0, 0).unwrap();
    let entry = memento("u", dt, MementoRoles::default());
    assert_eq!(entry.param("datetime"), Some("Fri, 01 Jun 2012 00:00:00 GMT"));
  }
}
