use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    ArtistsRepo, ArtistsWriteRepo, NameEntryFilter, NameEntryRow, RepoError, UpdateArtistParams,
};
use crate::domain::entities::{AliasType, ArtistAliasRecord, ArtistRecord};

use super::{PostgresRepositories, map_sqlx_error};

/// Both halves of the name-entry union share this shape: an artist row
/// contributes itself as its own parent with no alias type, an alias row
/// contributes the joined parent artist and its `alias_type`.
const NAME_ENTRY_UNION: &str = "\
    SELECT a.id AS entry_id, a.name AS display_name, \
           a.id AS parent_artist_id, a.name AS parent_artist_name, \
           TRUE AS is_main_name, CAST(NULL AS alias_type) AS alias_type \
    FROM artists a \
    UNION ALL \
    SELECT al.id, al.name, p.id, p.name, FALSE, al.alias_type \
    FROM artist_aliases al \
    INNER JOIN artists p ON p.id = al.artist_id";

#[derive(sqlx::FromRow)]
struct NameEntryDbRow {
    entry_id: Uuid,
    display_name: String,
    parent_artist_id: Uuid,
    parent_artist_name: String,
    is_main_name: bool,
    alias_type: Option<AliasType>,
}

impl From<NameEntryDbRow> for NameEntryRow {
    fn from(row: NameEntryDbRow) -> Self {
        Self {
            entry_id: row.entry_id,
            display_name: row.display_name,
            parent_artist_id: row.parent_artist_id,
            parent_artist_name: row.parent_artist_name,
            is_main_name: row.is_main_name,
            alias_type: row.alias_type,
        }
    }
}

#[async_trait]
impl ArtistsRepo for PostgresRepositories {
    async fn find_artist(&self, id: Uuid) -> Result<Option<ArtistRecord>, RepoError> {
        sqlx::query_as::<_, ArtistRecord>(
            "SELECT id, name, country, notes, created_at, updated_at \
             FROM artists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_alias(&self, id: Uuid) -> Result<Option<ArtistAliasRecord>, RepoError> {
        sqlx::query_as::<_, ArtistAliasRecord>(
            "SELECT id, artist_id, name, alias_type, created_at, updated_at \
             FROM artist_aliases WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_name_entries(
        &self,
        filter: &NameEntryFilter,
        page: PageRequest,
    ) -> Result<Vec<NameEntryRow>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM (");
        qb.push(NAME_ENTRY_UNION);
        qb.push(") entries");
        Self::apply_name_entry_filter(&mut qb, filter);
        qb.push(" ORDER BY LOWER(entries.display_name), entries.entry_id");
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(page.limit()));
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb
            .build_query_as::<NameEntryDbRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(NameEntryRow::from).collect())
    }

    async fn count_name_entries(&self, filter: &NameEntryFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM (");
        qb.push(NAME_ENTRY_UNION);
        qb.push(") entries");
        Self::apply_name_entry_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }
}

#[async_trait]
impl ArtistsWriteRepo for PostgresRepositories {
    async fn update_artist(&self, params: UpdateArtistParams) -> Result<ArtistRecord, RepoError> {
        sqlx::query_as::<_, ArtistRecord>(
            "UPDATE artists \
             SET name = $2, country = $3, notes = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, country, notes, created_at, updated_at",
        )
        .bind(params.id)
        .bind(params.name)
        .bind(params.country)
        .bind(params.notes)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)
    }
}
