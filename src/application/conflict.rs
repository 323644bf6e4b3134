//! Optimistic-lock conflict detection for admin mutations.
//!
//! An update payload may carry the `updated_at` value the client last saw,
//! either as integer unix milliseconds or an RFC 3339 string. Before the
//! mutation proceeds, the stamp is compared against the entity's current
//! `updated_at`; a mismatch means someone else edited the row in between,
//! and the caller gets the current server-side entity back so the client can
//! reconcile without a second round trip. The check is a pure precondition
//! gate: it never writes.

use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Normalized value of a stamp that failed to parse. It can never equal a
/// real timestamp, so a garbled stamp produces a conflict instead of a
/// crash.
const INVALID_STAMP: i64 = i64::MIN;

/// Client-supplied "last known" timestamp.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VersionStamp {
    Millis(i64),
    Text(String),
}

impl VersionStamp {
    /// Normalize to whole unix milliseconds. Database timestamps carry
    /// microseconds and clients usually carry milliseconds, so comparison
    /// happens at millisecond precision.
    pub fn normalize(&self) -> i64 {
        match self {
            Self::Millis(millis) => *millis,
            Self::Text(text) => OffsetDateTime::parse(text, &Rfc3339)
                .map(unix_millis)
                .unwrap_or(INVALID_STAMP),
        }
    }
}

fn unix_millis(when: OffsetDateTime) -> i64 {
    (when.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Entities whose concurrent edits are detectable.
pub trait Versioned {
    fn version_stamp(&self) -> Option<OffsetDateTime>;
}

#[derive(Debug, Clone)]
pub struct Conflict<T> {
    pub current: T,
}

/// Compare a client stamp against the current entity.
///
/// Skips (returns `None`) when the client did not send a stamp, when there
/// is no current entity, or when the entity carries no timestamp; the stamp
/// is an opt-in precondition, not a security gate. Equal normalized stamps
/// mean no conflict; anything else returns the current entity.
pub fn check<T: Versioned + Clone>(
    requested: Option<&VersionStamp>,
    current: Option<&T>,
) -> Option<Conflict<T>> {
    let requested = requested?;
    let entity = current?;
    let current_stamp = unix_millis(entity.version_stamp()?);

    if requested.normalize() == current_stamp {
        None
    } else {
        Some(Conflict {
            current: entity.clone(),
        })
    }
}

impl Versioned for crate::domain::entities::ArtistRecord {
    fn version_stamp(&self) -> Option<OffsetDateTime> {
        Some(self.updated_at)
    }
}

impl Versioned for crate::domain::entities::CircleRecord {
    fn version_stamp(&self) -> Option<OffsetDateTime> {
        Some(self.updated_at)
    }
}

impl Versioned for crate::domain::entities::ReleaseRecord {
    fn version_stamp(&self) -> Option<OffsetDateTime> {
        Some(self.updated_at)
    }
}
