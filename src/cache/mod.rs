//! TTL-aware lookup cache.

pub mod store;

pub use store::{CacheEntry, CacheKey, LookupCache};
