pub mod timegate;
pub mod timemap;

use axum::{body::Body, http::Method};

/// `Vary` value carried by every TimeGate response.
pub(super) const VARY_TIMEGATE: &str = "negotiate,accept-datetime";

/// The response body for `method`: HEAD answers carry headers only.
pub(super) fn body_for(method: &Method, body: String) -> Body {
  if *method == Method::HEAD {
    Body::empty()
  } else {
    Body::from(body)
  }
}
