//! GET and HEAD handlers for TimeMaps.

use axum::{
  http::{HeaderMap, Method, StatusCode, header},
  response::Response,
};
use memento_core::{
  paginate::{TimeMapPage, TimeMapPaginator},
  store::HistoryStore,
  uri::{TimeMapTarget, UriScheme},
};
use memento_link::{LINK_FORMAT, MementoLink, MementoRoles, TimeMapDocument, relation};

use crate::{
  AppState,
  error::Error,
  etag::{compute_etag, if_none_match},
  handlers::body_for,
};

pub async fn handler<S>(
  state: &AppState<S>,
  method: &Method,
  headers: &HeaderMap,
  path: &str,
) -> Result<Response, Error>
where
  S: HistoryStore + 'static,
{
  let target = TimeMapTarget::parse(path)?;

  let exists = state
    .store
    .resource_exists(&target.resource)
    .await
    .map_err(memento_core::Error::store)?;
  if !exists {
    return Err(memento_core::Error::ResourceNotFound(target.resource.to_string()).into());
  }

  let paginator =
    TimeMapPaginator::new(&*state.store, &state.uris, state.config.mementos_per_page);
  let page = paginator.page(&target.resource, target.scope).await?;

  let body = document(&state.uris, &page).render();
  let etag = compute_etag(&body);

  let not_modified = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| if_none_match(v, &etag));

  let builder = Response::builder().header(header::ETAG, &etag);
  if not_modified {
    return Ok(builder.status(StatusCode::NOT_MODIFIED).body(body_for(method, String::new()))?);
  }

  tracing::debug!(
    resource = %page.resource,
    entries = page.entries.len(),
    paginated = page.is_paginated(),
    "timemap rendered"
  );

  Ok(
    builder
      .status(StatusCode::OK)
      .header(header::CONTENT_TYPE, LINK_FORMAT)
      .header(header::CONTENT_LENGTH, body.len())
      .body(body_for(method, body))?,
  )
}

/// Lay out one TimeMap page as a link-format document.
pub fn document(uris: &UriScheme, page: &TimeMapPage) -> TimeMapDocument {
  let mementos = page
    .entries
    .iter()
    .map(|v| MementoLink {
      target:   uris.memento(&page.resource, v.id),
      datetime: v.timestamp,
      roles:    MementoRoles {
        first: v.timestamp == page.bounds.first.timestamp,
        last: v.timestamp == page.bounds.last.timestamp,
        ..Default::default()
      },
    })
    .collect();

  TimeMapDocument {
    self_link: relation::self_timemap(&page.self_uri, page.window_start, page.window_end),
    continuations: page
      .continuations
      .iter()
      .map(|c| relation::timemap(&c.uri, c.from, c.until))
      .collect(),
    original: relation::original(&uris.original(&page.resource), true),
    mementos,
  }
}
