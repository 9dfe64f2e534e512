//! Error types for the memento-link codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("link entry has no <target>: {0}")]
  MissingTarget(String),

  #[error("link entry has no rel parameter: {0}")]
  MissingRel(String),

  #[error("malformed link parameter: {0}")]
  MalformedParam(String),

  #[error("unterminated quoted string in: {0}")]
  UnterminatedQuote(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
