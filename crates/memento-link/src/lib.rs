//! Link-format codec for Memento.
//!
//! Renders TimeMap bodies (`application/link-format`) and `Link` header
//! values from typed relation entries, and parses such text back. Pure
//! synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use chrono::Utc;
//! use memento_link::{MementoLink, MementoRoles, TimeMapDocument, relation};
//!
//! let now = Utc::now();
//! let doc = TimeMapDocument {
//!   self_link:     relation::self_timemap("http://example.com/TimeMap/Page", now, now),
//!   continuations: vec![],
//!   original:      relation::original("http://example.com/Page", true),
//!   mementos:      vec![MementoLink {
//!     target:   "http://example.com/Page?oldid=1".into(),
//!     datetime: now,
//!     roles:    MementoRoles { first: true, last: true, ..Default::default() },
//!   }],
//! };
//! println!("{}", doc.render());
//! ```

pub mod error;
mod parse;
pub mod relation;
mod serialize;

use chrono::{DateTime, Utc};
pub use error::{Error, Result};

/// Media type of TimeMap bodies.
pub const LINK_FORMAT: &str = "application/link-format";

// ─── Public types
// ─────────────────────────────────────────────────────────────

/// One `<target>; rel="..."; key="value"` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
  pub target: String,
  /// Space-separated relation types, e.g. `first memento`.
  pub rel:    String,
  /// Target attributes other than `rel`, in output order.
  pub params: Vec<(String, String)>,
}

impl LinkEntry {
  pub fn new(target: impl Into<String>, rel: impl Into<String>) -> Self {
    Self { target: target.into(), rel: rel.into(), params: Vec::new() }
  }

  pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
    self.params.push((key.to_string(), value.into()));
    self
  }

  /// The value of the first parameter named `key` (case-insensitive).
  pub fn param(&self, key: &str) -> Option<&str> {
    self
      .params
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(key))
      .map(|(_, v)| v.as_str())
  }

  /// Whether `token` is one of this entry's relation types.
  pub fn has_rel(&self, token: &str) -> bool {
    self.rel.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case(token))
  }
}

/// The positions a memento occupies relative to a negotiation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MementoRoles {
  pub first: bool,
  pub last:  bool,
  pub prev:  bool,
  pub next:  bool,
}

impl MementoRoles {
  pub fn union(self, other: Self) -> Self {
    Self {
      first: self.first || other.first,
      last:  self.last || other.last,
      prev:  self.prev || other.prev,
      next:  self.next || other.next,
    }
  }
}

/// A memento to be rendered with its `datetime` and positional roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MementoLink {
  pub target:   String,
  pub datetime: DateTime<Utc>,
  pub roles:    MementoRoles,
}

/// The entries of one TimeMap, rendered in wire order: self, continuations,
/// original, mementos newest first.
#[derive(Debug, Clone)]
pub struct TimeMapDocument {
  pub self_link:     LinkEntry,
  /// Older-boundary continuation first, then newer-boundary.
  pub continuations: Vec<LinkEntry>,
  pub original:      LinkEntry,
  pub mementos:      Vec<MementoLink>,
}

impl TimeMapDocument {
  pub fn entries(&self) -> Vec<LinkEntry> { serialize::document_entries(self) }

  /// Render as an `application/link-format` body.
  pub fn render(&self) -> String { render_body(&self.entries()) }
}

// ─── Public API
// ───────────────────────────────────────────────────────────────

/// Render entries as a link-format body, one entry per line.
pub fn render_body(entries: &[LinkEntry]) -> String {
  serialize::render(entries, serialize::BODY_SEPARATOR)
}

/// Render entries as a single-line `Link` header value.
pub fn render_header(entries: &[LinkEntry]) -> String {
  serialize::render(entries, serialize::HEADER_SEPARATOR)
}

/// Merge mementos sharing a target and order them newest first.
pub fn merge_mementos(mementos: Vec<MementoLink>) -> Vec<MementoLink> {
  serialize::merge_mementos(mementos)
}

/// Parse link-format text (a body or a `Link` header value).
pub fn parse(input: &str) -> Result<Vec<LinkEntry>> { parse::parse(input) }

// ─── Round-trip test ─────────────────────────────────────────────────────────
