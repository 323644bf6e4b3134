use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    CircleFilter, CircleSortBy, CircleWithReleaseCount, CirclesRepo, CirclesWriteRepo,
    CreateCircleParams, ReleaseCircleRow, RepoError, UpdateCircleParams,
};
use crate::domain::entities::CircleRecord;

use super::{PostgresRepositories, map_sqlx_error};

const CIRCLE_COLUMNS: &str = "id, name, country, website, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CircleListDbRow {
    id: Uuid,
    name: String,
    country: Option<String>,
    website: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    release_count: i64,
}

#[derive(sqlx::FromRow)]
struct ReleaseCircleDbRow {
    release_id: Uuid,
    id: Uuid,
    name: String,
    country: Option<String>,
    website: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ReleaseCircleDbRow> for ReleaseCircleRow {
    fn from(row: ReleaseCircleDbRow) -> Self {
        Self {
            release_id: row.release_id,
            circle: CircleRecord {
                id: row.id,
                name: row.name,
                country: row.country,
                website: row.website,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

#[async_trait]
impl CirclesRepo for PostgresRepositories {
    async fn find_circle(&self, id: Uuid) -> Result<Option<CircleRecord>, RepoError> {
        sqlx::query_as::<_, CircleRecord>(
            "SELECT id, name, country, website, created_at, updated_at \
             FROM circles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_circles(
        &self,
        filter: &CircleFilter,
        page: PageRequest,
    ) -> Result<Vec<CircleWithReleaseCount>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT c.id, c.name, c.country, c.website, c.created_at, c.updated_at, \
             (SELECT COUNT(*) FROM release_circles rc WHERE rc.circle_id = c.id) \
             AS release_count \
             FROM circles c",
        );
        Self::apply_circle_filter(&mut qb, filter);

        // Sort columns come from the enum, never from request text.
        qb.push(" ORDER BY ");
        match filter.sort_by {
            CircleSortBy::Name => qb.push("LOWER(c.name) "),
            CircleSortBy::ReleaseCount => qb.push("release_count "),
        };
        qb.push(filter.sort_order.as_sql());
        qb.push(", c.id");
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(page.limit()));
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb
            .build_query_as::<CircleListDbRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| CircleWithReleaseCount {
                circle: CircleRecord {
                    id: row.id,
                    name: row.name,
                    country: row.country,
                    website: row.website,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                },
                release_count: row.release_count,
            })
            .collect())
    }

    async fn count_circles(&self, filter: &CircleFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM circles c");
        Self::apply_circle_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn circles_for_releases(
        &self,
        release_ids: &[Uuid],
    ) -> Result<Vec<ReleaseCircleRow>, RepoError> {
        if release_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ReleaseCircleDbRow>(
            "SELECT rc.release_id, c.id, c.name, c.country, c.website, \
                    c.created_at, c.updated_at \
             FROM release_circles rc \
             INNER JOIN circles c ON c.id = rc.circle_id \
             WHERE rc.release_id = ANY($1) \
             ORDER BY rc.release_id, LOWER(c.name)",
        )
        .bind(release_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ReleaseCircleRow::from).collect())
    }
}

#[async_trait]
impl CirclesWriteRepo for PostgresRepositories {
    async fn create_circle(&self, params: CreateCircleParams) -> Result<CircleRecord, RepoError> {
        sqlx::query_as::<_, CircleRecord>(&format!(
            "INSERT INTO circles (id, name, country, website) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CIRCLE_COLUMNS}",
        ))
        .bind(Uuid::new_v4())
        .bind(params.name)
        .bind(params.country)
        .bind(params.website)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_circle(&self, params: UpdateCircleParams) -> Result<CircleRecord, RepoError> {
        sqlx::query_as::<_, CircleRecord>(&format!(
            "UPDATE circles \
             SET name = $2, country = $3, website = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING {CIRCLE_COLUMNS}",
        ))
        .bind(params.id)
        .bind(params.name)
        .bind(params.country)
        .bind(params.website)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_circle(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM circles WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
