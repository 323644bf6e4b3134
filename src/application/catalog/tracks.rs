//! Single-track detail and per-source-song arrangement listings.

use serde_json::Value;
use tokio::try_join;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, Paged};
use crate::cache::keys;

use super::bundle::TrackBundle;
use super::types::{SongTracksView, TrackView};
use super::{CatalogError, PublicCatalog};

impl PublicCatalog {
    pub async fn track_detail(&self, track_id: Uuid) -> Result<Value, CatalogError> {
        let key = keys::track_detail(track_id);

        self.cached(key, self.cache.detail_ttl(), || async {
            let track = self
                .tracks
                .find_track(track_id)
                .await?
                .ok_or(CatalogError::NotFound { entity: "track" })?;

            let page_tracks = [track];
            let bundle = TrackBundle::load(
                self.tracks.as_ref(),
                self.releases.as_ref(),
                self.circles.as_ref(),
                &page_tracks,
                &[],
            )
            .await?;

            Ok(serde_json::to_value(bundle.shape(&page_tracks[0])?)?)
        })
        .await
    }

    /// Arrangement tracks derived from one official source song.
    pub async fn song_tracks(
        &self,
        song_id: Uuid,
        page: PageRequest,
    ) -> Result<Value, CatalogError> {
        let key = keys::song_tracks(song_id, page.page(), page.limit());

        self.cached(key, self.cache.list_ttl(), || async {
            let song = self
                .official
                .find_song(song_id)
                .await?
                .ok_or(CatalogError::NotFound { entity: "song" })?;
            let work = self
                .official
                .find_work(song.work_id)
                .await?
                .ok_or(CatalogError::NotFound { entity: "song" })?;

            let (page_tracks, total) = try_join!(
                self.tracks.tracks_for_song(song_id, page),
                self.tracks.count_tracks_for_song(song_id),
            )?;

            let bundle = TrackBundle::load(
                self.tracks.as_ref(),
                self.releases.as_ref(),
                self.circles.as_ref(),
                &page_tracks,
                &[],
            )
            .await?;

            let data: Vec<TrackView> = page_tracks
                .iter()
                .map(|track| bundle.shape(track))
                .collect::<Result<_, _>>()?;

            let view = SongTracksView {
                song,
                work,
                tracks: Paged::new(data, total, page),
            };
            Ok(serde_json::to_value(view)?)
        })
        .await
    }
}
