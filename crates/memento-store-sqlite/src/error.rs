//! Error type for `memento-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] memento_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("stored value out of range: {0}")]
  OutOfRange(i64),

  #[error("resource not found: {0}")]
  ResourceNotFound(String),

  #[error("resource already exists: {0}")]
  ResourceExists(String),

  #[error("version {0} not found")]
  VersionNotFound(u64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
