//! Persistent cache of fetched lunar-day rows
//!
//! Entries live in a single redb file, one table named `cache`, keyed by
//! `<DD.MM.YYYY>-<location>`. Entries never expire: once a day has been
//! fetched for a location it is served from disk until a bypass refetch
//! overwrites it.

mod key;
mod store;

pub use key::CacheKey;
pub use store::{CacheError, CacheStore};
