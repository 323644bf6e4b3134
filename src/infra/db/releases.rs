use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    ReleaseFilter, ReleasesRepo, ReleasesWriteRepo, RepoError, UpdateReleaseParams,
};
use crate::domain::entities::ReleaseRecord;

use super::{PostgresRepositories, map_sqlx_error};

const RELEASE_COLUMNS: &str =
    "id, title, catalog_number, event_name, release_date, category_id, created_at, updated_at";

#[async_trait]
impl ReleasesRepo for PostgresRepositories {
    async fn find_release(&self, id: Uuid) -> Result<Option<ReleaseRecord>, RepoError> {
        sqlx::query_as::<_, ReleaseRecord>(&format!(
            "SELECT {RELEASE_COLUMNS} FROM releases WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_releases(
        &self,
        filter: &ReleaseFilter,
        page: PageRequest,
    ) -> Result<Vec<ReleaseRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT r.id, r.title, r.catalog_number, r.event_name, r.release_date, \
             r.category_id, r.created_at, r.updated_at \
             FROM releases r WHERE TRUE",
        );
        Self::apply_release_filter(&mut qb, filter);
        qb.push(" ORDER BY r.release_date DESC NULLS LAST, LOWER(r.title), r.id");
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(page.limit()));
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        qb.build_query_as::<ReleaseRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_releases(&self, filter: &ReleaseFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM releases r WHERE TRUE");
        Self::apply_release_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn releases_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ReleaseRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, ReleaseRecord>(&format!(
            "SELECT {RELEASE_COLUMNS} FROM releases WHERE id = ANY($1)",
        ))
        .bind(ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl ReleasesWriteRepo for PostgresRepositories {
    async fn update_release(
        &self,
        params: UpdateReleaseParams,
    ) -> Result<ReleaseRecord, RepoError> {
        sqlx::query_as::<_, ReleaseRecord>(&format!(
            "UPDATE releases \
             SET title = $2, catalog_number = $3, event_name = $4, release_date = $5, \
                 category_id = $6, updated_at = now() \
             WHERE id = $1 \
             RETURNING {RELEASE_COLUMNS}",
        ))
        .bind(params.id)
        .bind(params.title)
        .bind(params.catalog_number)
        .bind(params.event_name)
        .bind(params.release_date)
        .bind(params.category_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)
    }
}
