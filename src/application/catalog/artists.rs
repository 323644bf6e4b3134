//! Artist-facing pipelines: the unified name-entry list and the per-identity
//! track aggregation.

use serde_json::Value;
use tokio::try_join;

use crate::application::pagination::{PageRequest, Paged};
use crate::application::repos::{NameEntryFilter, NameEntryRow};
use crate::cache::keys;
use crate::domain::names::NameRef;
use crate::domain::entities::AliasType;

use super::bundle::TrackBundle;
use super::types::{ArtistTracksView, NameEntry, TrackView};
use super::{CatalogError, PublicCatalog};

#[derive(Debug, Clone, Default)]
pub struct ArtistListParams {
    pub search: Option<String>,
    pub page: PageRequest,
}

fn name_entry_view(row: NameEntryRow) -> NameEntry {
    let name_ref = if row.is_main_name {
        NameRef::main(row.parent_artist_id)
    } else {
        NameRef::alias(row.entry_id)
    };
    NameEntry {
        id: name_ref.encode(),
        display_name: row.display_name,
        parent_artist_id: row.parent_artist_id,
        parent_artist_name: row.parent_artist_name,
        is_main_name: row.is_main_name,
        alias_type: row.alias_type.map(AliasType::code),
    }
}

impl PublicCatalog {
    /// Paged list over the unified name-entry space: every artist's main
    /// name plus every alias, as one addressable identity list.
    pub async fn list_artists(&self, params: ArtistListParams) -> Result<Value, CatalogError> {
        let page = params.page;
        // An explicitly empty search means no search, matching the cache
        // key normalization.
        let search = params.search.filter(|term| !term.is_empty());
        let key = keys::artist_list(search.as_deref(), page.page(), page.limit());

        self.cached(key, self.cache.list_ttl(), || async {
            let filter = NameEntryFilter { search };
            let (rows, total) = try_join!(
                self.artists.list_name_entries(&filter, page),
                self.artists.count_name_entries(&filter),
            )?;

            let data: Vec<NameEntry> = rows.into_iter().map(name_entry_view).collect();
            Ok(serde_json::to_value(Paged::new(data, total, page))?)
        })
        .await
    }

    /// All tracks credited to one identity, with full aggregation and the
    /// first/latest release-date aggregates.
    pub async fn artist_tracks(
        &self,
        name_id: &str,
        page: PageRequest,
    ) -> Result<Value, CatalogError> {
        let name_ref = NameRef::parse(name_id).map_err(|_| CatalogError::NotFound {
            entity: "artist name",
        })?;
        // Key on the canonical encoding, not the raw path segment.
        let key = keys::artist_tracks(&name_ref.encode(), page.page(), page.limit());

        self.cached(key, self.cache.list_ttl(), || async {
            let resolved = self.resolver().resolve(name_ref).await?;

            let (page_tracks, total, dates) = try_join!(
                self.tracks.tracks_for_name(name_ref, page),
                self.tracks.count_tracks_for_name(name_ref),
                self.tracks.release_dates_for_name(name_ref),
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

            // First/latest come from the sorted non-null dates, which is the
            // same list a discography view would render.
            let mut dates: Vec<_> = dates.into_iter().flatten().collect();
            dates.sort_unstable();

            let view = ArtistTracksView {
                artist: NameEntry {
                    id: resolved.name_ref.encode(),
                    display_name: resolved.display_name,
                    parent_artist_id: resolved.artist_id,
                    parent_artist_name: resolved.parent_artist_name,
                    is_main_name: resolved.name_ref.is_main(),
                    alias_type: resolved.alias_type.map(AliasType::code),
                },
                first_release_date: dates.first().copied(),
                latest_release_date: dates.last().copied(),
                tracks: Paged::new(data, total, page),
            };
            Ok(serde_json::to_value(view)?)
        })
        .await
    }
}
