//! Caching layer for resolutions
//!
//! Every non-trivial query goes through the [`ResolutionCache`]: the first
//! query for a (key, context types) pair runs the Cartesian search, every
//! later one is a map read.
//!
//! Only raw registration entries are cached. Instantiation happens after the
//! cache on every call, so constructed values are never shared between
//! queries.

mod resolution_cache;

pub use resolution_cache::{CacheKey, CacheStats, CachedEntries, ResolutionCache};
