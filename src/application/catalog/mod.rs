//! Public read aggregation.
//!
//! Every public endpoint follows one fixed pipeline: resolve identity and
//! filters, fetch the primary page (plus a count for lists), collect the
//! join keys, bulk-fetch each related collection keyed by those ids, merge
//! in memory, shape the response. The whole computation sits behind the TTL
//! cache: on a hit the pipeline is not invoked at all.
//!
//! Query count is the defining property: one query per related collection,
//! never one per primary row.

mod artists;
mod bundle;
mod circles;
mod merge;
mod official;
mod releases;
mod tracks;
mod types;

pub use artists::ArtistListParams;
pub use circles::CircleListParams;
pub use releases::ReleaseListParams;
pub use types::{
    ArtistTracksView, CircleListItem, CircleSummary, CircleTracksView, CreditView, NameEntry,
    OriginView, ReleaseDetailView, ReleaseListItem, ReleaseSummary, SongTracksView, TrackView,
    WorkView,
};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::application::names::{NameResolver, ResolveError};
use crate::application::repos::{
    ArtistsRepo, CategoriesRepo, CirclesRepo, OfficialRepo, ReleasesRepo, RepoError, TracksRepo,
};
use crate::cache::{CacheConfig, TtlStore};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("failed to serialize response payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<ResolveError> for CatalogError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound => Self::NotFound {
                entity: "artist name",
            },
            ResolveError::Repo(err) => Self::Repo(err),
        }
    }
}

/// Constructor dependencies for [`PublicCatalog`].
pub struct CatalogDeps {
    pub artists: Arc<dyn ArtistsRepo>,
    pub circles: Arc<dyn CirclesRepo>,
    pub releases: Arc<dyn ReleasesRepo>,
    pub tracks: Arc<dyn TracksRepo>,
    pub official: Arc<dyn OfficialRepo>,
    pub categories: Arc<dyn CategoriesRepo>,
    pub store: Arc<TtlStore>,
    pub cache: CacheConfig,
}

/// The public read service: aggregation pipelines wrapped in the TTL cache.
pub struct PublicCatalog {
    artists: Arc<dyn ArtistsRepo>,
    circles: Arc<dyn CirclesRepo>,
    releases: Arc<dyn ReleasesRepo>,
    tracks: Arc<dyn TracksRepo>,
    official: Arc<dyn OfficialRepo>,
    categories: Arc<dyn CategoriesRepo>,
    resolver: NameResolver,
    store: Arc<TtlStore>,
    cache: CacheConfig,
}

impl PublicCatalog {
    pub fn new(deps: CatalogDeps) -> Self {
        let resolver = NameResolver::new(Arc::clone(&deps.artists));
        Self {
            artists: deps.artists,
            circles: deps.circles,
            releases: deps.releases,
            tracks: deps.tracks,
            official: deps.official,
            categories: deps.categories,
            resolver,
            store: deps.store,
            cache: deps.cache,
        }
    }

    fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    /// Cache wrapper: key lookup first, compute-and-store on miss. Payloads
    /// are stored as `serde_json::Value`, so a hit returns exactly the bytes
    /// the miss produced.
    async fn cached<F, Fut>(
        &self,
        key: String,
        ttl: Duration,
        compute: F,
    ) -> Result<Value, CatalogError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, CatalogError>>,
    {
        if !self.cache.enabled {
            return compute().await;
        }

        if let Some(hit) = self.store.get(&key) {
            return Ok(hit);
        }

        let value = compute().await?;
        debug!(key = %key, "cache fill");
        self.store.set(key, value.clone(), ttl);
        Ok(value)
    }
}
