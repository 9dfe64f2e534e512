//! GET and HEAD handlers for TimeGates.
//!
//! A TimeGate redirects to the memento that best matches the requested
//! `Accept-Datetime` and advertises the surrounding mementos in `Link`.

use axum::{
  http::{HeaderMap, Method, StatusCode, header},
  response::Response,
};
use chrono::Utc;
use memento_core::{
  datetime::parse_http_date,
  negotiate::{NegotiationResult, TimeNegotiator},
  store::HistoryStore,
  uri::UriScheme,
  version::{ResourceId, Version},
};
use memento_link::{LinkEntry, MementoLink, MementoRoles, merge_mementos, relation, render_header};

use crate::{AppState, error::Error, handlers::body_for};

pub async fn handler<S>(
  state: &AppState<S>,
  method: &Method,
  headers: &HeaderMap,
  resource: &str,
) -> Result<Response, Error>
where
  S: HistoryStore + 'static,
{
  let resource = ResourceId::parse(resource)?;

  let history = state
    .store
    .get_history(&resource)
    .await
    .map_err(memento_core::Error::store)?
    .ok_or_else(|| memento_core::Error::ResourceNotFound(resource.to_string()))?;

  let requested = match headers.get("accept-datetime") {
    Some(raw) => parse_http_date(&String::from_utf8_lossy(raw.as_bytes()))?,
    None => Utc::now(),
  };

  let result = TimeNegotiator::new(state.config.before_first).negotiate(&history, requested)?;
  let link = link_header(&state.uris, &resource, &result, history.first(), history.last());
  let location = state.uris.memento(&resource, result.selected.id);

  tracing::debug!(%resource, %location, "timegate redirect");

  Ok(
    Response::builder()
      .status(StatusCode::FOUND)
      .header(header::LOCATION, location)
      .header(header::LINK, link)
      .body(body_for(method, String::new()))?,
  )
}

/// Build the `Link` header value for a negotiation result.
pub fn link_header(
  uris: &UriScheme,
  resource: &ResourceId,
  result: &NegotiationResult,
  first: Option<&Version>,
  last: Option<&Version>,
) -> String {
  let role = |v: Option<&Version>, roles: MementoRoles| v.map(|&v| (v, roles));
  let mut versions: Vec<(Version, MementoRoles)> = [
    role(Some(&result.selected), MementoRoles {
      first: result.is_first,
      last: result.is_last,
      ..Default::default()
    }),
    role(first, MementoRoles { first: true, ..Default::default() }),
    role(last, MementoRoles { last: true, ..Default::default() }),
    role(result.previous.as_ref(), MementoRoles { prev: true, ..Default::default() }),
    role(result.next.as_ref(), MementoRoles { next: true, ..Default::default() }),
  ]
  .into_iter()
  .flatten()
  .collect();
  // Newest first, ties by id, so merging keeps history order.
  versions.sort_by(|(a, _), (b, _)| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));

  let mementos = versions
    .into_iter()
    .map(|(v, roles)| MementoLink {
      target: uris.memento(resource, v.id),
      datetime: v.timestamp,
      roles,
    })
    .collect();

  let mut entries: Vec<LinkEntry> = vec![
    relation::original(&uris.original(resource), false),
    relation::timegate(&uris.timegate(resource)),
    relation::timemap_ref(&uris.timemap(resource)),
  ];
  entries.extend(
    merge_mementos(mementos)
      .into_iter()
      .map(|m| relation::memento(&m.target, m.datetime, m.roles)),
  );
  render_header(&entries)
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use memento_core::{negotiate::negotiate, version::VersionHistory};

  use super::*;

  #[test]
  fn link_header_merges_and_orders_mementos() {
    let uris = UriScheme::new("http://x");
    let page = ResourceId::parse("P").unwrap();
    let day = |d| Utc.with_ymd_and_hms(2012, 1, d, 0, 0, 0).unwrap();
    let history = VersionHistory::new(page.clone(), vec![
      Version::new(1, day(1)),
      Version::new(2, day(2)),
      Version::new(3, day(3)),
    ]);

    let result = negotiate(&history, day(2)).unwrap();
    let value = link_header(&uris, &page, &result, history.first(), history.last());
    let entries = memento_link::parse(&value).unwrap();

    let rels: Vec<&str> = entries.iter().map(|e| e.rel.as_str()).collect();
    assert_eq!(rels, vec![
      "original latest-version",
      "timegate",
      "timemap",
      "last next successor-version memento",
      "memento",
      "first prev predecessor-version memento",
    ]);
    assert_eq!(entries[4].target, "http://x/P?oldid=2");
  }

  #[test]
  fn single_version_is_first_and_last() {
    let uris = UriScheme::new("http://x");
    let page = ResourceId::parse("P").unwrap();
    let at = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
    let history = VersionHistory::new(page.clone(), vec![Version::new(7, at)]);

    let result = negotiate(&history, at).unwrap();
    let value = link_header(&uris, &page, &result, history.first(), history.last());
    let entries = memento_link::parse(&value).unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[3].rel, "first last memento");
  }

  #[test]
  fn shared_timestamps_are_listed_by_id() {
    let uris = UriScheme::new("http://x");
    let page = ResourceId::parse("P").unwrap();
    let day = |d| Utc.with_ymd_and_hms(2012, 1, d, 0, 0, 0).unwrap();
    let history = VersionHistory::new(page.clone(), vec![
      Version::new(8, day(1)),
      Version::new(9, day(2)),
      Version::new(10, day(2)),
    ]);

    let result = negotiate(&history, day(2)).unwrap();
    assert_eq!(result.selected.id.0, 10);
    let value = link_header(&uris, &page, &result, history.first(), history.last());
    let entries = memento_link::parse(&value).unwrap();

    let mementos: Vec<(&str, &str)> = entries[3..]
      .iter()
      .map(|e| (e.target.as_str(), e.rel.as_str()))
      .collect();
    assert_eq!(mementos, vec![
      ("http://x/P?oldid=10", "last memento"),
      ("http://x/P?oldid=9", "prev predecessor-version memento"),
      ("http://x/P?oldid=8", "first memento"),
    ]);
  }
}
