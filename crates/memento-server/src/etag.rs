//! ETag computation for TimeMap bodies.
//!
//! ETags are SHA-256 hashes over the rendered link-format body, so any
//! change to the entries, their relations or the continuation links yields
//! a new tag.

use sha2::{Digest, Sha256};

/// Compute a strong, quoted ETag for `body`.
pub fn compute_etag(body: &str) -> String {
  let hash = Sha256::digest(body.as_bytes());
  format!("\"{}\"", hex::encode(hash))
}

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Accepts `*`, comma-separated lists, weak validators and bare (unquoted)
/// tags.
pub fn if_none_match(header: &str, etag: &str) -> bool {
  let current = strip_etag(etag);
  header
    .split(',')
    .map(str::trim)
    .any(|candidate| candidate == "*" || strip_etag(candidate) == current)
}

fn strip_etag(s: &str) -> &str { s.trim_start_matches("W/").trim_matches('"') }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_body_same_etag() {
    assert_eq!(compute_etag("<a>; rel=\"self\""), compute_etag("<a>; rel=\"self\""));
    assert_ne!(compute_etag("<a>; rel=\"self\""), compute_etag("<b>; rel=\"self\""));
  }

  #[test]
  fn etag_is_quoted_hex() {
    let etag = compute_etag("x");
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    assert_eq!(etag.len(), 64 + 2);
  }

  #[test]
  fn if_none_match_forms() {
    let etag = compute_etag("body");
    let bare = etag.trim_matches('"').to_string();
    assert!(if_none_match(&etag, &etag));
    assert!(if_none_match(&bare, &etag));
    assert!(if_none_match(&format!("W/{etag}"), &etag));
    assert!(if_none_match(&format!("\"stale\", {etag}"), &etag));
    assert!(if_none_match("*", &etag));
    assert!(!if_none_match("\"stale\"", &etag));
  }
}
