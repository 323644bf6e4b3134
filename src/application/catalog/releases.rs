//! Release pipelines: the filterable list and the full detail view.

use serde_json::Value;
use tokio::try_join;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, Paged};
use crate::application::repos::ReleaseFilter;
use crate::cache::keys;

use super::bundle::TrackBundle;
use super::merge::RelatedIndex;
use super::types::{CircleSummary, ReleaseDetailView, ReleaseListItem, TrackView};
use super::{CatalogError, PublicCatalog};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseListParams {
    pub circle_id: Option<Uuid>,
    pub year: Option<i32>,
    pub page: PageRequest,
}

impl PublicCatalog {
    pub async fn list_releases(&self, params: ReleaseListParams) -> Result<Value, CatalogError> {
        let page = params.page;
        let key = keys::release_list(params.circle_id, params.year, page.page(), page.limit());

        self.cached(key, self.cache.list_ttl(), || async {
            let filter = ReleaseFilter {
                circle_id: params.circle_id,
                year: params.year,
            };
            let (releases, total) = try_join!(
                self.releases.list_releases(&filter, page),
                self.releases.count_releases(&filter),
            )?;

            // One related collection here, so one bulk fetch.
            let release_ids: Vec<Uuid> = releases.iter().map(|release| release.id).collect();
            let circle_rows = self.circles.circles_for_releases(&release_ids).await?;
            let circles = RelatedIndex::build(circle_rows, |row| row.release_id);

            let data: Vec<ReleaseListItem> = releases
                .into_iter()
                .map(|release| ReleaseListItem {
                    circles: circles
                        .get(&release.id)
                        .map(|row| CircleSummary::from(&row.circle))
                        .collect(),
                    id: release.id,
                    title: release.title,
                    catalog_number: release.catalog_number,
                    event_name: release.event_name,
                    release_date: release.release_date,
                    category_id: release.category_id,
                })
                .collect();
            Ok(serde_json::to_value(Paged::new(data, total, page))?)
        })
        .await
    }

    pub async fn release_detail(&self, release_id: Uuid) -> Result<Value, CatalogError> {
        let key = keys::release_detail(release_id);

        self.cached(key, self.cache.detail_ttl(), || async {
            let release = self
                .releases
                .find_release(release_id)
                .await?
                .ok_or(CatalogError::NotFound { entity: "release" })?;

            let release_tracks = self.tracks.tracks_for_release(release_id).await?;

            let bundle = TrackBundle::load(
                self.tracks.as_ref(),
                self.releases.as_ref(),
                self.circles.as_ref(),
                &release_tracks,
                &[release_id],
            )
            .await?;

            let tracks: Vec<TrackView> = release_tracks
                .iter()
                .map(|track| bundle.shape(track))
                .collect::<Result<_, _>>()?;

            let view = ReleaseDetailView {
                circles: bundle.circles_for_release(release.id),
                id: release.id,
                title: release.title,
                catalog_number: release.catalog_number,
                event_name: release.event_name,
                release_date: release.release_date,
                category_id: release.category_id,
                tracks,
            };
            Ok(serde_json::to_value(view)?)
        })
        .await
    }
}
