//! Core types and algorithms for Memento time-based content negotiation.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! knows how to pick the memento that best matches a requested datetime and
//! how to slice a version history into bounded TimeMap pages; fetching the
//! history is delegated to a [`store::HistoryStore`] implementation.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod datetime;
pub mod error;
pub mod memory;
pub mod negotiate;
pub mod paginate;
pub mod store;
pub mod uri;
pub mod version;

pub use error::{Error, ErrorKind, Result};
