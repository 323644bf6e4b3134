//! Circle pipelines: the sortable circle list and per-circle tracks.

use serde_json::Value;
use tokio::try_join;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, Paged};
use crate::application::repos::{CircleFilter, CircleSortBy, SortOrder};
use crate::cache::keys;

use super::bundle::TrackBundle;
use super::types::{CircleListItem, CircleTracksView, TrackView};
use super::{CatalogError, PublicCatalog};

#[derive(Debug, Clone, Default)]
pub struct CircleListParams {
    pub search: Option<String>,
    pub sort_by: CircleSortBy,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

impl PublicCatalog {
    pub async fn list_circles(&self, params: CircleListParams) -> Result<Value, CatalogError> {
        let page = params.page;
        let search = params.search.filter(|term| !term.is_empty());
        let key = keys::circle_list(
            search.as_deref(),
            params.sort_by,
            params.sort_order,
            page.page(),
            page.limit(),
        );

        self.cached(key, self.cache.list_ttl(), || async {
            let filter = CircleFilter {
                search,
                sort_by: params.sort_by,
                sort_order: params.sort_order,
            };
            let (rows, total) = try_join!(
                self.circles.list_circles(&filter, page),
                self.circles.count_circles(&filter),
            )?;

            let data: Vec<CircleListItem> = rows
                .into_iter()
                .map(|row| CircleListItem {
                    id: row.circle.id,
                    name: row.circle.name,
                    country: row.circle.country,
                    website: row.circle.website,
                    release_count: row.release_count,
                })
                .collect();
            Ok(serde_json::to_value(Paged::new(data, total, page))?)
        })
        .await
    }

    /// All tracks across a circle's releases, fully aggregated.
    pub async fn circle_tracks(
        &self,
        circle_id: Uuid,
        page: PageRequest,
    ) -> Result<Value, CatalogError> {
        let key = keys::circle_tracks(circle_id, page.page(), page.limit());

        self.cached(key, self.cache.list_ttl(), || async {
            let circle = self
                .circles
                .find_circle(circle_id)
                .await?
                .ok_or(CatalogError::NotFound { entity: "circle" })?;

            let (page_tracks, total) = try_join!(
                self.tracks.tracks_for_circle(circle_id, page),
                self.tracks.count_tracks_for_circle(circle_id),
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

            let view = CircleTracksView {
                circle,
                tracks: Paged::new(data, total, page),
            };
            Ok(serde_json::to_value(view)?)
        })
        .await
    }
}
