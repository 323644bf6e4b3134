use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, VARY},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::application::admin::AdminCatalog;
use crate::application::catalog::{
    ArtistListParams, CircleListParams, PublicCatalog, ReleaseListParams,
};
use crate::application::pagination::PageRequest;
use crate::application::repos::{CircleSortBy, SortOrder};
use crate::cache::CacheConfig;
use crate::infra::db::PostgresRepositories;

use super::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<PublicCatalog>,
    pub admin: Arc<AdminCatalog>,
    pub db: Arc<PostgresRepositories>,
    pub cache: CacheConfig,
    pub admin_token: Option<Arc<str>>,
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/official-works", get(list_official_works))
        .route("/api/artists", get(list_artists))
        .route("/api/artists/{name_id}/tracks", get(artist_tracks))
        .route("/api/circles", get(list_circles))
        .route("/api/circles/{id}/tracks", get(circle_tracks))
        .route("/api/releases", get(list_releases))
        .route("/api/releases/{id}", get(release_detail))
        .route("/api/tracks/{id}", get(track_detail))
        .route("/api/songs/{id}/tracks", get(song_tracks))
        .route("/healthz", get(health));

    // The admin surface only exists when a token is configured.
    let router = if state.admin_token.is_some() {
        router.merge(super::admin::build_admin_router(state.clone()))
    } else {
        router
    };

    router.with_state(state)
}

/// Attach the shared caching headers. Hit and miss produce the same headers,
/// so intermediaries cannot tell them apart.
fn cached_json(ttl: Duration, payload: Value) -> Response {
    let secs = ttl.as_secs();
    let mut response = Json(payload).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&format!(
        "public, max-age={secs}, stale-while-revalidate={secs}"
    )) {
        headers.insert(CACHE_CONTROL, value);
    }
    headers.insert(VARY, HeaderValue::from_static("Accept-Encoding"));
    response
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<u32>,
    limit: Option<u32>,
}

impl PageQuery {
    fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArtistQuery {
    search: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CircleQuery {
    search: Option<String>,
    sort_by: Option<CircleSortBy>,
    sort_order: Option<SortOrder>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReleaseQuery {
    circle_id: Option<Uuid>,
    year: Option<i32>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn health(State(state): State<AppState>) -> Response {
    match state.db.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            tracing::error!(target: "corale::http", error = %err, "database health check failed");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

async fn list_categories(State(state): State<AppState>) -> Result<Response, ApiError> {
    let payload = state.catalog.list_categories().await?;
    Ok(cached_json(state.cache.reference_ttl(), payload))
}

async fn list_official_works(State(state): State<AppState>) -> Result<Response, ApiError> {
    let payload = state.catalog.list_official_works().await?;
    Ok(cached_json(state.cache.reference_ttl(), payload))
}

async fn list_artists(
    State(state): State<AppState>,
    Query(query): Query<ArtistQuery>,
) -> Result<Response, ApiError> {
    let params = ArtistListParams {
        search: query.search,
        page: PageRequest::new(query.page, query.limit),
    };
    let payload = state.catalog.list_artists(params).await?;
    Ok(cached_json(state.cache.list_ttl(), payload))
}

async fn artist_tracks(
    State(state): State<AppState>,
    Path(name_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let payload = state.catalog.artist_tracks(&name_id, query.request()).await?;
    Ok(cached_json(state.cache.list_ttl(), payload))
}

async fn list_circles(
    State(state): State<AppState>,
    Query(query): Query<CircleQuery>,
) -> Result<Response, ApiError> {
    let params = CircleListParams {
        search: query.search,
        sort_by: query.sort_by.unwrap_or_default(),
        sort_order: query.sort_order.unwrap_or_default(),
        page: PageRequest::new(query.page, query.limit),
    };
    let payload = state.catalog.list_circles(params).await?;
    Ok(cached_json(state.cache.list_ttl(), payload))
}

async fn circle_tracks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let payload = state.catalog.circle_tracks(id, query.request()).await?;
    Ok(cached_json(state.cache.list_ttl(), payload))
}

async fn list_releases(
    State(state): State<AppState>,
    Query(query): Query<ReleaseQuery>,
) -> Result<Response, ApiError> {
    let params = ReleaseListParams {
        circle_id: query.circle_id,
        year: query.year,
        page: PageRequest::new(query.page, query.limit),
    };
    let payload = state.catalog.list_releases(params).await?;
    Ok(cached_json(state.cache.list_ttl(), payload))
}

async fn release_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let payload = state.catalog.release_detail(id).await?;
    Ok(cached_json(state.cache.detail_ttl(), payload))
}

async fn track_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let payload = state.catalog.track_detail(id).await?;
    Ok(cached_json(state.cache.detail_ttl(), payload))
}

async fn song_tracks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let payload = state.catalog.song_tracks(id, query.request()).await?;
    Ok(cached_json(state.cache.list_ttl(), payload))
}
