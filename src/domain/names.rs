//! Dual-identity name references.
//!
//! The public API addresses an artist identity either by the artist's main
//! name or by one of its aliases. Both live in one id space: a main name
//! serializes as `{artist_uuid}__main__`, an alias as its bare uuid. The
//! suffix is reserved, so the two encodings can never collide. The string
//! form exists only at the serialization boundary; everything past the
//! parser works with the tagged [`NameRef`] variant.

use thiserror::Error;
use uuid::Uuid;

/// Reserved suffix marking a main-name id. Alias ids are uuids and can never
/// end with it.
pub const MAIN_NAME_SUFFIX: &str = "__main__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameRef {
    Main { artist_id: Uuid },
    Alias { alias_id: Uuid },
}

#[derive(Debug, Error)]
pub enum NameIdError {
    #[error("malformed name id `{0}`")]
    Malformed(String),
}

impl NameRef {
    pub fn main(artist_id: Uuid) -> Self {
        Self::Main { artist_id }
    }

    pub fn alias(alias_id: Uuid) -> Self {
        Self::Alias { alias_id }
    }

    pub fn is_main(&self) -> bool {
        matches!(self, Self::Main { .. })
    }

    /// Serialize into the public id string.
    pub fn encode(&self) -> String {
        match self {
            Self::Main { artist_id } => format!("{artist_id}{MAIN_NAME_SUFFIX}"),
            Self::Alias { alias_id } => alias_id.to_string(),
        }
    }

    /// Decode a public id string. A trailing reserved suffix marks a main
    /// name; anything else must be a bare alias uuid.
    pub fn parse(raw: &str) -> Result<Self, NameIdError> {
        if let Some(stripped) = raw.strip_suffix(MAIN_NAME_SUFFIX) {
            let artist_id = Uuid::parse_str(stripped)
                .map_err(|_| NameIdError::Malformed(raw.to_string()))?;
            Ok(Self::Main { artist_id })
        } else {
            let alias_id =
                Uuid::parse_str(raw).map_err(|_| NameIdError::Malformed(raw.to_string()))?;
            Ok(Self::Alias { alias_id })
        }
    }
}
