use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{CategoriesRepo, OfficialRepo, RepoError};
use crate::domain::entities::{CategoryRecord, OfficialSongRecord, OfficialWorkRecord};

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl OfficialRepo for PostgresRepositories {
    async fn find_song(&self, id: Uuid) -> Result<Option<OfficialSongRecord>, RepoError> {
        sqlx::query_as::<_, OfficialSongRecord>(
            "SELECT id, work_id, title, composer FROM official_songs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_work(&self, id: Uuid) -> Result<Option<OfficialWorkRecord>, RepoError> {
        sqlx::query_as::<_, OfficialWorkRecord>(
            "SELECT id, title, series, release_year FROM official_works WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_works(&self) -> Result<Vec<OfficialWorkRecord>, RepoError> {
        sqlx::query_as::<_, OfficialWorkRecord>(
            "SELECT id, title, series, release_year FROM official_works \
             ORDER BY release_year NULLS LAST, LOWER(title), id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn songs_for_works(
        &self,
        work_ids: &[Uuid],
    ) -> Result<Vec<OfficialSongRecord>, RepoError> {
        if work_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, OfficialSongRecord>(
            "SELECT id, work_id, title, composer FROM official_songs \
             WHERE work_id = ANY($1) \
             ORDER BY work_id, LOWER(title), id",
        )
        .bind(work_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl CategoriesRepo for PostgresRepositories {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, name, sort_order FROM categories ORDER BY sort_order, LOWER(name), id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
