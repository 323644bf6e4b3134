//! Resolving a parsed [`NameRef`] back to its underlying rows.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::repos::{ArtistsRepo, RepoError};
use crate::domain::entities::AliasType;
use crate::domain::names::NameRef;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("name identity not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A fully resolved public identity.
#[derive(Debug, Clone)]
pub struct ResolvedName {
    pub name_ref: NameRef,
    pub artist_id: Uuid,
    pub display_name: String,
    pub parent_artist_name: String,
    pub alias_type: Option<AliasType>,
}

pub struct NameResolver {
    artists: Arc<dyn ArtistsRepo>,
}

impl NameResolver {
    pub fn new(artists: Arc<dyn ArtistsRepo>) -> Self {
        Self { artists }
    }

    /// Resolve a name reference against the artist/alias rows.
    ///
    /// A main name resolves through the artist row directly. An alias
    /// resolves through the alias row and then its parent artist; an alias
    /// whose parent has been deleted concurrently resolves as `NotFound`
    /// rather than surfacing a dangling reference.
    pub async fn resolve(&self, name_ref: NameRef) -> Result<ResolvedName, ResolveError> {
        match name_ref {
            NameRef::Main { artist_id } => {
                let artist = self
                    .artists
                    .find_artist(artist_id)
                    .await?
                    .ok_or(ResolveError::NotFound)?;
                Ok(ResolvedName {
                    name_ref,
                    artist_id: artist.id,
                    parent_artist_name: artist.name.clone(),
                    display_name: artist.name,
                    alias_type: None,
                })
            }
            NameRef::Alias { alias_id } => {
                let alias = self
                    .artists
                    .find_alias(alias_id)
                    .await?
                    .ok_or(ResolveError::NotFound)?;
                let parent = self
                    .artists
                    .find_artist(alias.artist_id)
                    .await?
                    .ok_or(ResolveError::NotFound)?;
                Ok(ResolvedName {
                    name_ref,
                    artist_id: parent.id,
                    display_name: alias.name,
                    parent_artist_name: parent.name,
                    alias_type: Some(alias.alias_type),
                })
            }
        }
    }
}
