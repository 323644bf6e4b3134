//! Repository traits describing persistence adapters.
//!
//! The public aggregation pipelines depend on these traits only, which is
//! what lets the structural query-count properties be asserted against
//! in-memory fakes. Bulk methods take a batch of ids and return rows for the
//! whole batch in one call; a conforming implementation issues exactly one
//! query per bulk method invocation.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::domain::entities::{
    AliasType, ArtistAliasRecord, ArtistRecord, CategoryRecord, CircleRecord, OfficialSongRecord,
    OfficialWorkRecord, ReleaseRecord, TrackRecord,
};
use crate::domain::names::NameRef;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("integrity error: {message}")]
    Integrity { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

// ============================================================================
// Filters and sort parameters
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NameEntryFilter {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircleSortBy {
    #[default]
    Name,
    ReleaseCount,
}

impl CircleSortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::ReleaseCount => "release_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CircleFilter {
    pub search: Option<String>,
    pub sort_by: CircleSortBy,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseFilter {
    pub circle_id: Option<Uuid>,
    pub year: Option<i32>,
}

// ============================================================================
// Read-side row shapes
// ============================================================================

/// One row of the unified name-entry space: either an artist's main name or
/// one of its aliases, with the parent artist resolved. `alias_type` is set
/// on alias rows only.
#[derive(Debug, Clone)]
pub struct NameEntryRow {
    pub entry_id: Uuid,
    pub display_name: String,
    pub parent_artist_id: Uuid,
    pub parent_artist_name: String,
    pub is_main_name: bool,
    pub alias_type: Option<AliasType>,
}

#[derive(Debug, Clone)]
pub struct CircleWithReleaseCount {
    pub circle: CircleRecord,
    pub release_count: i64,
}

/// Bulk row: one circle attached to one release.
#[derive(Debug, Clone)]
pub struct ReleaseCircleRow {
    pub release_id: Uuid,
    pub circle: CircleRecord,
}

/// Bulk row: one credited role on one track, with the performer's display
/// name and parent artist already joined in. `artist_id`/`alias_id` carry
/// the dual identity; exactly one is set.
#[derive(Debug, Clone)]
pub struct CreditRow {
    pub track_id: Uuid,
    pub artist_id: Option<Uuid>,
    pub alias_id: Option<Uuid>,
    pub parent_artist_id: Uuid,
    pub display_name: String,
    pub role: String,
}

impl CreditRow {
    pub fn name_ref(&self) -> Option<NameRef> {
        match (self.artist_id, self.alias_id) {
            (Some(artist_id), None) => Some(NameRef::main(artist_id)),
            (None, Some(alias_id)) => Some(NameRef::alias(alias_id)),
            _ => None,
        }
    }
}

/// Bulk row: one official source song behind one track.
#[derive(Debug, Clone)]
pub struct TrackOriginRow {
    pub track_id: Uuid,
    pub song_id: Uuid,
    pub song_title: String,
    pub work_id: Uuid,
    pub work_title: String,
}

// ============================================================================
// Read repositories
// ============================================================================

#[async_trait]
pub trait ArtistsRepo: Send + Sync {
    async fn find_artist(&self, id: Uuid) -> Result<Option<ArtistRecord>, RepoError>;

    async fn find_alias(&self, id: Uuid) -> Result<Option<ArtistAliasRecord>, RepoError>;

    async fn list_name_entries(
        &self,
        filter: &NameEntryFilter,
        page: PageRequest,
    ) -> Result<Vec<NameEntryRow>, RepoError>;

    async fn count_name_entries(&self, filter: &NameEntryFilter) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait CirclesRepo: Send + Sync {
    async fn find_circle(&self, id: Uuid) -> Result<Option<CircleRecord>, RepoError>;

    async fn list_circles(
        &self,
        filter: &CircleFilter,
        page: PageRequest,
    ) -> Result<Vec<CircleWithReleaseCount>, RepoError>;

    async fn count_circles(&self, filter: &CircleFilter) -> Result<u64, RepoError>;

    /// Bulk fetch: circles for a batch of releases, one call per batch.
    async fn circles_for_releases(
        &self,
        release_ids: &[Uuid],
    ) -> Result<Vec<ReleaseCircleRow>, RepoError>;
}

#[async_trait]
pub trait ReleasesRepo: Send + Sync {
    async fn find_release(&self, id: Uuid) -> Result<Option<ReleaseRecord>, RepoError>;

    async fn list_releases(
        &self,
        filter: &ReleaseFilter,
        page: PageRequest,
    ) -> Result<Vec<ReleaseRecord>, RepoError>;

    async fn count_releases(&self, filter: &ReleaseFilter) -> Result<u64, RepoError>;

    /// Bulk fetch: releases by id, one call per batch.
    async fn releases_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ReleaseRecord>, RepoError>;
}

#[async_trait]
pub trait TracksRepo: Send + Sync {
    async fn find_track(&self, id: Uuid) -> Result<Option<TrackRecord>, RepoError>;

    async fn tracks_for_release(&self, release_id: Uuid) -> Result<Vec<TrackRecord>, RepoError>;

    async fn tracks_for_name(
        &self,
        name: NameRef,
        page: PageRequest,
    ) -> Result<Vec<TrackRecord>, RepoError>;

    async fn count_tracks_for_name(&self, name: NameRef) -> Result<u64, RepoError>;

    /// Release dates of every release carrying a track credited to `name`,
    /// nulls included. The caller filters and sorts in memory because it
    /// also derives first/latest aggregates from the sorted list.
    async fn release_dates_for_name(&self, name: NameRef) -> Result<Vec<Option<Date>>, RepoError>;

    async fn tracks_for_circle(
        &self,
        circle_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<TrackRecord>, RepoError>;

    async fn count_tracks_for_circle(&self, circle_id: Uuid) -> Result<u64, RepoError>;

    async fn tracks_for_song(
        &self,
        song_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<TrackRecord>, RepoError>;

    async fn count_tracks_for_song(&self, song_id: Uuid) -> Result<u64, RepoError>;

    /// Bulk fetch: all credit rows for a batch of tracks, one call per batch.
    async fn credits_for_tracks(&self, track_ids: &[Uuid]) -> Result<Vec<CreditRow>, RepoError>;

    /// Bulk fetch: official source songs for a batch of tracks, one call per
    /// batch.
    async fn origins_for_tracks(
        &self,
        track_ids: &[Uuid],
    ) -> Result<Vec<TrackOriginRow>, RepoError>;
}

#[async_trait]
pub trait OfficialRepo: Send + Sync {
    async fn find_song(&self, id: Uuid) -> Result<Option<OfficialSongRecord>, RepoError>;

    async fn find_work(&self, id: Uuid) -> Result<Option<OfficialWorkRecord>, RepoError>;

    async fn list_works(&self) -> Result<Vec<OfficialWorkRecord>, RepoError>;

    /// Bulk fetch: songs for a batch of works, one call per batch.
    async fn songs_for_works(
        &self,
        work_ids: &[Uuid],
    ) -> Result<Vec<OfficialSongRecord>, RepoError>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;
}

// ============================================================================
// Write repositories (admin surface)
// ============================================================================

#[derive(Debug, Clone)]
pub struct UpdateArtistParams {
    pub id: Uuid,
    pub name: String,
    pub country: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateCircleParams {
    pub name: String,
    pub country: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateCircleParams {
    pub id: Uuid,
    pub name: String,
    pub country: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateReleaseParams {
    pub id: Uuid,
    pub title: String,
    pub catalog_number: Option<String>,
    pub event_name: Option<String>,
    pub release_date: Option<Date>,
    pub category_id: Option<Uuid>,
}

#[async_trait]
pub trait ArtistsWriteRepo: Send + Sync {
    async fn update_artist(&self, params: UpdateArtistParams) -> Result<ArtistRecord, RepoError>;
}

#[async_trait]
pub trait CirclesWriteRepo: Send + Sync {
    async fn create_circle(&self, params: CreateCircleParams) -> Result<CircleRecord, RepoError>;

    async fn update_circle(&self, params: UpdateCircleParams) -> Result<CircleRecord, RepoError>;

    async fn delete_circle(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait ReleasesWriteRepo: Send + Sync {
    async fn update_release(&self, params: UpdateReleaseParams)
    -> Result<ReleaseRecord, RepoError>;
}
