//! Stored entity records.
//!
//! These mirror the relational rows one to one. Derived, request-time shapes
//! (name entries, aggregated track views) live in the application layer.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ArtistRecord {
    pub id: Uuid,
    pub name: String,
    pub country: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Kind of alternate name an artist publishes under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "alias_type", rename_all = "lowercase")]
pub enum AliasType {
    Stage,
    Romanized,
    Former,
    Unit,
}

impl AliasType {
    pub fn code(self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::Romanized => "romanized",
            Self::Former => "former",
            Self::Unit => "unit",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ArtistAliasRecord {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub name: String,
    pub alias_type: AliasType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CircleRecord {
    pub id: Uuid,
    pub name: String,
    pub country: Option<String>,
    pub website: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReleaseRecord {
    pub id: Uuid,
    pub title: String,
    pub catalog_number: Option<String>,
    pub event_name: Option<String>,
    pub release_date: Option<Date>,
    pub category_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrackRecord {
    pub id: Uuid,
    pub release_id: Uuid,
    pub disc_number: i16,
    pub track_number: i16,
    pub title: String,
    pub duration_seconds: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OfficialWorkRecord {
    pub id: Uuid,
    pub title: String,
    pub series: Option<String>,
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OfficialSongRecord {
    pub id: Uuid,
    pub work_id: Uuid,
    pub title: String,
    pub composer: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
}
