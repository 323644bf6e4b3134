//! Reference data: official source works with their songs, and release
//! categories. Both change rarely and live in the longest TTL tier.

use serde_json::Value;
use uuid::Uuid;

use crate::cache::keys;

use super::merge::RelatedIndex;
use super::types::WorkView;
use super::{CatalogError, PublicCatalog};

impl PublicCatalog {
    pub async fn list_official_works(&self) -> Result<Value, CatalogError> {
        let key = keys::official_works();

        self.cached(key, self.cache.reference_ttl(), || async {
            let works = self.official.list_works().await?;

            let work_ids: Vec<Uuid> = works.iter().map(|work| work.id).collect();
            let songs = self.official.songs_for_works(&work_ids).await?;
            let songs = RelatedIndex::build(songs, |song| song.work_id);

            let data: Vec<WorkView> = works
                .into_iter()
                .map(|work| WorkView {
                    songs: songs.get(&work.id).cloned().collect(),
                    id: work.id,
                    title: work.title,
                    series: work.series,
                    release_year: work.release_year,
                })
                .collect();
            Ok(serde_json::to_value(data)?)
        })
        .await
    }

    pub async fn list_categories(&self) -> Result<Value, CatalogError> {
        let key = keys::categories();

        self.cached(key, self.cache.reference_ttl(), || async {
            let categories = self.categories.list_categories().await?;
            Ok(serde_json::to_value(categories)?)
        })
        .await
    }
}
