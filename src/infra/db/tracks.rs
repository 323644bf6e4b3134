use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{CreditRow, RepoError, TrackOriginRow, TracksRepo};
use crate::domain::entities::TrackRecord;
use crate::domain::names::NameRef;

use super::{PostgresRepositories, map_sqlx_error};

const TRACK_COLUMNS: &str = "t.id, t.release_id, t.disc_number, t.track_number, t.title, \
     t.duration_seconds, t.created_at, t.updated_at";

/// The dual identity picks the credit column: a main-name reference matches
/// rows credited directly to the artist, an alias reference matches rows
/// credited to that alias only.
fn credit_column(name: NameRef) -> (&'static str, Uuid) {
    match name {
        NameRef::Main { artist_id } => ("cr.artist_id", artist_id),
        NameRef::Alias { alias_id } => ("cr.alias_id", alias_id),
    }
}

#[derive(sqlx::FromRow)]
struct CreditDbRow {
    track_id: Uuid,
    artist_id: Option<Uuid>,
    alias_id: Option<Uuid>,
    parent_artist_id: Uuid,
    display_name: String,
    role: String,
}

impl From<CreditDbRow> for CreditRow {
    fn from(row: CreditDbRow) -> Self {
        Self {
            track_id: row.track_id,
            artist_id: row.artist_id,
            alias_id: row.alias_id,
            parent_artist_id: row.parent_artist_id,
            display_name: row.display_name,
            role: row.role,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TrackOriginDbRow {
    track_id: Uuid,
    song_id: Uuid,
    song_title: String,
    work_id: Uuid,
    work_title: String,
}

impl From<TrackOriginDbRow> for TrackOriginRow {
    fn from(row: TrackOriginDbRow) -> Self {
        Self {
            track_id: row.track_id,
            song_id: row.song_id,
            song_title: row.song_title,
            work_id: row.work_id,
            work_title: row.work_title,
        }
    }
}

#[async_trait]
impl TracksRepo for PostgresRepositories {
    async fn find_track(&self, id: Uuid) -> Result<Option<TrackRecord>, RepoError> {
        sqlx::query_as::<_, TrackRecord>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks t WHERE t.id = $1",
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn tracks_for_release(&self, release_id: Uuid) -> Result<Vec<TrackRecord>, RepoError> {
        sqlx::query_as::<_, TrackRecord>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks t \
             WHERE t.release_id = $1 \
             ORDER BY t.disc_number, t.track_number",
        ))
        .bind(release_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn tracks_for_name(
        &self,
        name: NameRef,
        page: PageRequest,
    ) -> Result<Vec<TrackRecord>, RepoError> {
        let (column, id) = credit_column(name);

        sqlx::query_as::<_, TrackRecord>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks t \
             INNER JOIN releases r ON r.id = t.release_id \
             WHERE EXISTS (SELECT 1 FROM credits cr \
                           WHERE cr.track_id = t.id AND {column} = $1) \
             ORDER BY r.release_date DESC NULLS LAST, t.disc_number, t.track_number, t.id \
             LIMIT $2 OFFSET $3",
        ))
        .bind(id)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn count_tracks_for_name(&self, name: NameRef) -> Result<u64, RepoError> {
        let (column, id) = credit_column(name);

        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM tracks t \
             WHERE EXISTS (SELECT 1 FROM credits cr \
                           WHERE cr.track_id = t.id AND {column} = $1)",
        ))
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn release_dates_for_name(&self, name: NameRef) -> Result<Vec<Option<Date>>, RepoError> {
        let (column, id) = credit_column(name);

        // One row per release the name appears on, nulls kept; the caller
        // owns filtering and ordering.
        sqlx::query_scalar::<_, Option<Date>>(&format!(
            "SELECT r.release_date FROM releases r \
             WHERE EXISTS (SELECT 1 FROM tracks t \
                           INNER JOIN credits cr ON cr.track_id = t.id \
                           WHERE t.release_id = r.id AND {column} = $1)",
        ))
        .bind(id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn tracks_for_circle(
        &self,
        circle_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<TrackRecord>, RepoError> {
        sqlx::query_as::<_, TrackRecord>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks t \
             INNER JOIN releases r ON r.id = t.release_id \
             INNER JOIN release_circles rc ON rc.release_id = r.id \
             WHERE rc.circle_id = $1 \
             ORDER BY r.release_date DESC NULLS LAST, t.disc_number, t.track_number, t.id \
             LIMIT $2 OFFSET $3",
        ))
        .bind(circle_id)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn count_tracks_for_circle(&self, circle_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tracks t \
             INNER JOIN release_circles rc ON rc.release_id = t.release_id \
             WHERE rc.circle_id = $1",
        )
        .bind(circle_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn tracks_for_song(
        &self,
        song_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<TrackRecord>, RepoError> {
        sqlx::query_as::<_, TrackRecord>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks t \
             INNER JOIN releases r ON r.id = t.release_id \
             INNER JOIN track_origins o ON o.track_id = t.id \
             WHERE o.song_id = $1 \
             ORDER BY r.release_date DESC NULLS LAST, t.disc_number, t.track_number, t.id \
             LIMIT $2 OFFSET $3",
        ))
        .bind(song_id)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn count_tracks_for_song(&self, song_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM track_origins o WHERE o.song_id = $1",
        )
        .bind(song_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn credits_for_tracks(&self, track_ids: &[Uuid]) -> Result<Vec<CreditRow>, RepoError> {
        if track_ids.is_empty() {
            return Ok(Vec::new());
        }

        // Direct artist credits and alias credits come back through one
        // union, parent artist joined in for both halves.
        let rows = sqlx::query_as::<_, CreditDbRow>(
            "SELECT cr.track_id, cr.artist_id, NULL::uuid AS alias_id, \
                    a.id AS parent_artist_id, a.name AS display_name, cr.role \
             FROM credits cr \
             INNER JOIN artists a ON a.id = cr.artist_id \
             WHERE cr.track_id = ANY($1) \
             UNION ALL \
             SELECT cr.track_id, NULL::uuid, cr.alias_id, p.id, al.name, cr.role \
             FROM credits cr \
             INNER JOIN artist_aliases al ON al.id = cr.alias_id \
             INNER JOIN artists p ON p.id = al.artist_id \
             WHERE cr.track_id = ANY($2)",
        )
        .bind(track_ids)
        .bind(track_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CreditRow::from).collect())
    }

    async fn origins_for_tracks(
        &self,
        track_ids: &[Uuid],
    ) -> Result<Vec<TrackOriginRow>, RepoError> {
        if track_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, TrackOriginDbRow>(
            "SELECT o.track_id, s.id AS song_id, s.title AS song_title, \
                    w.id AS work_id, w.title AS work_title \
             FROM track_origins o \
             INNER JOIN official_songs s ON s.id = o.song_id \
             INNER JOIN official_works w ON w.id = s.work_id \
             WHERE o.track_id = ANY($1) \
             ORDER BY o.track_id, LOWER(s.title)",
        )
        .bind(track_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TrackOriginRow::from).collect())
    }
}
