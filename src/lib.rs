//! Corale is a metadata catalog service for arrangement-music databases:
//! artists and their aliases, circles, releases, tracks, credits, and the
//! official source works the tracks arrange.
//!
//! The crate is organized in layers:
//!
//! - [`domain`]: entity records and the dual-identity name codec.
//! - [`cache`]: the process-local TTL store and cache key derivation.
//! - [`application`]: repository traits, the public aggregation pipelines,
//!   and the optimistic-lock conflict checker.
//! - [`infra`]: Postgres repositories, the HTTP surface, and telemetry.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
