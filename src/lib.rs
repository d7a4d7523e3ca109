//! moon-day library
//!
//! Exposes the cache, fetcher, range collector and CLI modules so the binary
//! and the integration tests share one implementation.

pub mod cache;
pub mod cli;
pub mod data;
pub mod output;
pub mod range;
