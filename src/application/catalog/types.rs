//! Public response shapes.
//!
//! Related collections are embedded as named arrays; there is no separate
//! "include" mechanism. List views flatten the [`Paged`] envelope.

use serde::Serialize;
use time::Date;
use uuid::Uuid;

use crate::application::pagination::Paged;
use crate::domain::entities::{CircleRecord, OfficialSongRecord, OfficialWorkRecord};

/// A public artist identity: the artist's main name or one of its aliases,
/// addressed by one opaque id.
#[derive(Debug, Clone, Serialize)]
pub struct NameEntry {
    pub id: String,
    pub display_name: String,
    pub parent_artist_id: Uuid,
    pub parent_artist_name: String,
    pub is_main_name: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_type: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditView {
    pub name_id: String,
    pub display_name: String,
    /// The artist behind the credited identity, whether the credit uses the
    /// main name or an alias.
    pub parent_artist_id: Uuid,
    pub is_main_name: bool,
    /// Deduplicated across credit rows, sorted alphabetically.
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OriginView {
    pub song_id: Uuid,
    pub song_title: String,
    pub work_id: Uuid,
    pub work_title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircleSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&CircleRecord> for CircleSummary {
    fn from(circle: &CircleRecord) -> Self {
        Self {
            id: circle.id,
            name: circle.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseSummary {
    pub id: Uuid,
    pub title: String,
    pub release_date: Option<Date>,
    pub circles: Vec<CircleSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackView {
    pub id: Uuid,
    pub title: String,
    pub disc_number: i16,
    pub track_number: i16,
    pub duration_seconds: Option<i32>,
    pub release: ReleaseSummary,
    pub credits: Vec<CreditView>,
    pub origins: Vec<OriginView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistTracksView {
    pub artist: NameEntry,
    /// Derived from the sorted list of non-null release dates.
    pub first_release_date: Option<Date>,
    pub latest_release_date: Option<Date>,
    #[serde(flatten)]
    pub tracks: Paged<TrackView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircleListItem {
    pub id: Uuid,
    pub name: String,
    pub country: Option<String>,
    pub website: Option<String>,
    pub release_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircleTracksView {
    pub circle: CircleRecord,
    #[serde(flatten)]
    pub tracks: Paged<TrackView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseListItem {
    pub id: Uuid,
    pub title: String,
    pub catalog_number: Option<String>,
    pub event_name: Option<String>,
    pub release_date: Option<Date>,
    pub category_id: Option<Uuid>,
    pub circles: Vec<CircleSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseDetailView {
    pub id: Uuid,
    pub title: String,
    pub catalog_number: Option<String>,
    pub event_name: Option<String>,
    pub release_date: Option<Date>,
    pub category_id: Option<Uuid>,
    pub circles: Vec<CircleSummary>,
    pub tracks: Vec<TrackView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SongTracksView {
    pub song: OfficialSongRecord,
    pub work: OfficialWorkRecord,
    #[serde(flatten)]
    pub tracks: Paged<TrackView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkView {
    pub id: Uuid,
    pub title: String,
    pub series: Option<String>,
    pub release_year: Option<i32>,
    pub songs: Vec<OfficialSongRecord>,
}
