//! Process-local response caching.
//!
//! Public read endpoints are expensive to compute (they aggregate several
//! related collections per request), read-mostly, and tolerant of short
//! staleness. This module provides:
//!
//! - [`TtlStore`]: a string-keyed map with per-entry absolute expiry,
//!   lazy eviction, and prefix invalidation.
//! - [`keys`]: canonical key derivation, one pure function per query shape.
//!
//! Behavior is controlled via `corale.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! reference_ttl_secs = 3600
//! list_ttl_secs = 300
//! detail_ttl_secs = 60
//! ```

mod config;
pub mod keys;
mod store;

pub use config::CacheConfig;
pub use store::TtlStore;
