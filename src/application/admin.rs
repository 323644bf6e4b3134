//! Admin mutation services.
//!
//! Validation and authentication happen upstream; what remains here is the
//! part worth being careful about: the optimistic-lock gate in front of each
//! update, and the cache invalidation that follows every successful write.
//! Invalidation runs synchronously before the mutation's response is
//! returned, so the next public read cannot observe stale cached aggregates
//! for the touched prefixes.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use time::Date;
use tracing::info;
use uuid::Uuid;

use crate::application::conflict::{self, VersionStamp};
use crate::application::repos::{
    ArtistsRepo, ArtistsWriteRepo, CirclesRepo, CirclesWriteRepo, CreateCircleParams,
    ReleasesRepo, ReleasesWriteRepo, RepoError, UpdateArtistParams, UpdateCircleParams,
    UpdateReleaseParams,
};
use crate::cache::TtlStore;
use crate::cache::keys::prefix;
use crate::domain::entities::{ArtistRecord, CircleRecord, ReleaseRecord};

/// Cached aggregates that embed artist names (credit lists everywhere).
const ARTIST_PREFIXES: &[&str] = &[
    prefix::ARTISTS,
    prefix::ARTIST_TRACKS,
    prefix::CIRCLE_TRACKS,
    prefix::SONG_TRACKS,
    prefix::RELEASE_DETAIL,
    prefix::TRACK_DETAIL,
];

/// Cached aggregates that embed circle names: every circle list page plus
/// every track view's release summary.
const CIRCLE_PREFIXES: &[&str] = &[
    prefix::CIRCLES,
    prefix::CIRCLE_TRACKS,
    prefix::RELEASES,
    prefix::RELEASE_DETAIL,
    prefix::ARTIST_TRACKS,
    prefix::SONG_TRACKS,
    prefix::TRACK_DETAIL,
];

const RELEASE_PREFIXES: &[&str] = &[
    prefix::RELEASES,
    prefix::RELEASE_DETAIL,
    prefix::CIRCLE_TRACKS,
    prefix::ARTIST_TRACKS,
    prefix::SONG_TRACKS,
    prefix::TRACK_DETAIL,
];

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("entity was modified by another editor")]
    Conflict { current: Value },
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("failed to serialize current entity: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct UpdateArtistCommand {
    pub id: Uuid,
    /// Client's last-seen `updated_at`, stripped from the field payload.
    pub expected_updated_at: Option<VersionStamp>,
    pub name: String,
    pub country: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateCircleCommand {
    pub name: String,
    pub country: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateCircleCommand {
    pub id: Uuid,
    pub expected_updated_at: Option<VersionStamp>,
    pub name: String,
    pub country: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateReleaseCommand {
    pub id: Uuid,
    pub expected_updated_at: Option<VersionStamp>,
    pub title: String,
    pub catalog_number: Option<String>,
    pub event_name: Option<String>,
    pub release_date: Option<Date>,
    pub category_id: Option<Uuid>,
}

pub struct AdminDeps {
    pub artists: Arc<dyn ArtistsRepo>,
    pub artists_write: Arc<dyn ArtistsWriteRepo>,
    pub circles: Arc<dyn CirclesRepo>,
    pub circles_write: Arc<dyn CirclesWriteRepo>,
    pub releases: Arc<dyn ReleasesRepo>,
    pub releases_write: Arc<dyn ReleasesWriteRepo>,
    pub store: Arc<TtlStore>,
}

pub struct AdminCatalog {
    artists: Arc<dyn ArtistsRepo>,
    artists_write: Arc<dyn ArtistsWriteRepo>,
    circles: Arc<dyn CirclesRepo>,
    circles_write: Arc<dyn CirclesWriteRepo>,
    releases: Arc<dyn ReleasesRepo>,
    releases_write: Arc<dyn ReleasesWriteRepo>,
    store: Arc<TtlStore>,
}

impl AdminCatalog {
    pub fn new(deps: AdminDeps) -> Self {
        Self {
            artists: deps.artists,
            artists_write: deps.artists_write,
            circles: deps.circles,
            circles_write: deps.circles_write,
            releases: deps.releases,
            releases_write: deps.releases_write,
            store: deps.store,
        }
    }

    pub async fn update_artist(
        &self,
        command: UpdateArtistCommand,
    ) -> Result<ArtistRecord, AdminError> {
        let current = self
            .artists
            .find_artist(command.id)
            .await?
            .ok_or(AdminError::NotFound { entity: "artist" })?;

        if let Some(found) =
            conflict::check(command.expected_updated_at.as_ref(), Some(&current))
        {
            return Err(AdminError::Conflict {
                current: serde_json::to_value(found.current)?,
            });
        }

        let updated = self
            .artists_write
            .update_artist(UpdateArtistParams {
                id: command.id,
                name: command.name,
                country: command.country,
                notes: command.notes,
            })
            .await?;

        self.invalidate("artist", ARTIST_PREFIXES);
        Ok(updated)
    }

    pub async fn create_circle(
        &self,
        command: CreateCircleCommand,
    ) -> Result<CircleRecord, AdminError> {
        let created = self
            .circles_write
            .create_circle(CreateCircleParams {
                name: command.name,
                country: command.country,
                website: command.website,
            })
            .await?;

        self.invalidate("circle", CIRCLE_PREFIXES);
        Ok(created)
    }

    pub async fn update_circle(
        &self,
        command: UpdateCircleCommand,
    ) -> Result<CircleRecord, AdminError> {
        let current = self
            .circles
            .find_circle(command.id)
            .await?
            .ok_or(AdminError::NotFound { entity: "circle" })?;

        if let Some(found) =
            conflict::check(command.expected_updated_at.as_ref(), Some(&current))
        {
            return Err(AdminError::Conflict {
                current: serde_json::to_value(found.current)?,
            });
        }

        let updated = self
            .circles_write
            .update_circle(UpdateCircleParams {
                id: command.id,
                name: command.name,
                country: command.country,
                website: command.website,
            })
            .await?;

        self.invalidate("circle", CIRCLE_PREFIXES);
        Ok(updated)
    }

    pub async fn delete_circle(&self, id: Uuid) -> Result<(), AdminError> {
        self.circles
            .find_circle(id)
            .await?
            .ok_or(AdminError::NotFound { entity: "circle" })?;

        self.circles_write.delete_circle(id).await?;
        self.invalidate("circle", CIRCLE_PREFIXES);
        Ok(())
    }

    pub async fn update_release(
        &self,
        command: UpdateReleaseCommand,
    ) -> Result<ReleaseRecord, AdminError> {
        let current = self
            .releases
            .find_release(command.id)
            .await?
            .ok_or(AdminError::NotFound { entity: "release" })?;

        if let Some(found) =
            conflict::check(command.expected_updated_at.as_ref(), Some(&current))
        {
            return Err(AdminError::Conflict {
                current: serde_json::to_value(found.current)?,
            });
        }

        let updated = self
            .releases_write
            .update_release(UpdateReleaseParams {
                id: command.id,
                title: command.title,
                catalog_number: command.catalog_number,
                event_name: command.event_name,
                release_date: command.release_date,
                category_id: command.category_id,
            })
            .await?;

        self.invalidate("release", RELEASE_PREFIXES);
        Ok(updated)
    }

    fn invalidate(&self, entity: &'static str, prefixes: &[&str]) {
        let mut dropped = 0;
        for prefix in prefixes {
            dropped += self.store.invalidate_by_prefix(prefix);
        }
        info!(entity, dropped, "invalidated cached aggregates after write");
    }
}
