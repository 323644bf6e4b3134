use std::time::Duration;

use serde::Deserialize;

const DEFAULT_REFERENCE_TTL_SECS: u64 = 3600;
const DEFAULT_LIST_TTL_SECS: u64 = 300;
const DEFAULT_DETAIL_TTL_SECS: u64 = 60;

/// TTL tiers for the public read cache.
///
/// Reference data (categories, official works) changes rarely and gets the
/// longest TTL; paged lists sit in the middle; detail pages embed the most
/// relations and go stale fastest, so they get the shortest TTL. A TTL of
/// zero is not a supported way to disable caching; flip `enabled` instead.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
    pub reference_ttl_secs: u64,
    pub list_ttl_secs: u64,
    pub detail_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reference_ttl_secs: DEFAULT_REFERENCE_TTL_SECS,
            list_ttl_secs: DEFAULT_LIST_TTL_SECS,
            detail_ttl_secs: DEFAULT_DETAIL_TTL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn reference_ttl(&self) -> Duration {
        Duration::from_secs(self.reference_ttl_secs.max(1))
    }

    pub fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_secs.max(1))
    }

    pub fn detail_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_ttl_secs.max(1))
    }
}
