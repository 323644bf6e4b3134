//! Postgres-backed repository implementations.
//!
//! Every bulk method issues a single statement over `= ANY($ids)`, which is
//! what keeps page assembly at a fixed number of queries regardless of page
//! size.

mod artists;
mod circles;
mod official;
mod releases;
mod tracks;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    QueryBuilder, Postgres,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{CircleFilter, NameEntryFilter, ReleaseFilter, RepoError};

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    fn apply_name_entry_filter<'q>(
        qb: &mut QueryBuilder<'q, Postgres>,
        filter: &'q NameEntryFilter,
    ) {
        if let Some(search) = filter.search.as_ref() {
            qb.push(" WHERE entries.display_name ILIKE ");
            qb.push_bind(format!("%{search}%"));
        }
    }

    fn apply_circle_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q CircleFilter) {
        if let Some(search) = filter.search.as_ref() {
            qb.push(" WHERE c.name ILIKE ");
            qb.push_bind(format!("%{search}%"));
        }
    }

    fn apply_release_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q ReleaseFilter) {
        if let Some(circle_id) = filter.circle_id {
            qb.push(
                " AND EXISTS (SELECT 1 FROM release_circles rc \
                 WHERE rc.release_id = r.id AND rc.circle_id = ",
            );
            qb.push_bind(circle_id);
            qb.push(")");
        }

        if let Some(year) = filter.year {
            qb.push(" AND EXTRACT(YEAR FROM r.release_date) = ");
            qb.push_bind(year as i64);
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}
