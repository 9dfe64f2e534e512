//! Error types for `memento-core`.
//!
//! Every failure the protocol layer can report is a variant here. Each one
//! maps to an [`ErrorKind`] carrying the message key the host renders, and
//! exposes the substitution parameters for that message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("resource not found: {0}")]
  ResourceNotFound(String),

  #[error("invalid resource identifier: {0:?}")]
  InvalidTitle(String),

  #[error("invalid datetime: {0:?}")]
  InvalidDatetime(String),

  #[error("invalid TimeMap pivot: {0:?}")]
  InvalidPivot(String),

  #[error("resource {0} has no versions")]
  EmptyHistory(String),

  #[error("no memento of {resource} exists at or before {requested}")]
  NoMementoBefore { resource: String, requested: String },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The protocol-level classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  ResourceNotFound,
  InvalidTitle,
  InvalidDatetime,
  InvalidPivot,
  EmptyHistory,
  NoMementoBefore,
  Internal,
}

impl ErrorKind {
  /// HTTP status code this kind is surfaced as.
  pub fn status(self) -> u16 {
    match self {
      Self::ResourceNotFound
      | Self::InvalidTitle
      | Self::EmptyHistory
      | Self::NoMementoBefore => 404,
      Self::InvalidDatetime | Self::InvalidPivot => 400,
      Self::Internal => 500,
    }
  }
}

impl Error {
  /// Box an arbitrary store error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
      Self::InvalidTitle(_) => ErrorKind::InvalidTitle,
      Self::InvalidDatetime(_) => ErrorKind::InvalidDatetime,
      Self::InvalidPivot(_) => ErrorKind::InvalidPivot,
      Self::EmptyHistory(_) => ErrorKind::EmptyHistory,
      Self::NoMementoBefore { .. } => ErrorKind::NoMementoBefore,
      Self::Store(_) => ErrorKind::Internal,
    }
  }

  /// Message substitution parameters, in positional order.
  pub fn params(&self) -> Vec<String> {
    match self {
      Self::ResourceNotFound(v)
      | Self::InvalidTitle(v)
      | Self::InvalidDatetime(v)
      | Self::InvalidPivot(v)
      | Self::EmptyHistory(v) => vec![v.clone()],
      Self::NoMementoBefore { resource, requested } => {
        vec![resource.clone(), requested.clone()]
      }
      Self::Store(e) => vec![e.to_string()],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_errors_are_never_500() {
    let errors = [
      Error::ResourceNotFound("Main_Page".into()),
      Error::InvalidTitle("".into()),
      Error::InvalidDatetime("bad-input".into()),
      Error::InvalidPivot("2012/7/x".into()),
      Error::EmptyHistory("Main_Page".into()),
    ];
    for e in errors {
      assert!(e.kind().status() < 500, "{e} surfaced as 5xx");
    }
  }

  #[test]
  fn params_carry_offending_value() {
    let e = Error::InvalidDatetime("bad-input".into());
    assert_eq!(e.kind().status(), 400);
    assert_eq!(e.params(), vec!["bad-input".to_string()]);
  }

  #[test]
  fn store_failures_are_internal() {
    let e = Error::store(std::io::Error::other("disk full"));
    assert_eq!(e.kind(), ErrorKind::Internal);
    assert_eq!(e.kind().status(), 500);
    assert_eq!(e.params(), vec!["disk full".to_string()]);
  }
}
