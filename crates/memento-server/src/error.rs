//! Error types and their HTTP rendering.
//!
//! Protocol errors are rendered as a short plain-text body of the form
//! `<message-key>: <param>, <param>`, where the key names the endpoint, the
//! status and the failure (e.g. `timegate-400-date`).

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use memento_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Protocol(#[from] memento_core::Error),

  #[error("method not allowed")]
  MethodNotAllowed,

  #[error("failed to build response: {0}")]
  Http(#[from] axum::http::Error),
}

/// The endpoint an error was raised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
  TimeGate,
  TimeMap,
}

impl Endpoint {
  fn prefix(self) -> &'static str {
    match self {
      Self::TimeGate => "timegate",
      Self::TimeMap => "timemap",
    }
  }
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::Protocol(e) => StatusCode::from_u16(e.kind().status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
      Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
      Error::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Message key for this error as raised by `endpoint`.
  pub fn message_key(&self, endpoint: Endpoint) -> String {
    let suffix = match self {
      Error::MethodNotAllowed => "405",
      Error::Http(_) => "500",
      Error::Protocol(e) => match e.kind() {
        ErrorKind::ResourceNotFound | ErrorKind::InvalidTitle => "404-title",
        ErrorKind::EmptyHistory => "404-empty",
        ErrorKind::NoMementoBefore => "404-before",
        ErrorKind::InvalidDatetime | ErrorKind::InvalidPivot => "400-date",
        ErrorKind::Internal => "500",
      },
    };
    format!("{}-{suffix}", endpoint.prefix())
  }

  /// Render this error as a response from `endpoint`.
  pub fn into_response_at(self, endpoint: Endpoint) -> Response {
    let status = self.status();
    let key = self.message_key(endpoint);
    let params = match &self {
      Error::Protocol(e) => e.params(),
      Error::MethodNotAllowed | Error::Http(_) => Vec::new(),
    };

    if status.is_server_error() {
      tracing::error!(error = %self, key, "request failed");
    } else {
      tracing::debug!(error = %self, key, "request rejected");
    }

    let body = if params.is_empty() {
      format!("{key}\n")
    } else {
      format!("{key}: {}\n", params.join(", "))
    };

    let mut res = (status, body).into_response();
    if matches!(self, Error::MethodNotAllowed) {
      res
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
    }
    res
  }
}
