//! The shared "track bundle": every track-shaped endpoint needs the same
//! related collections (credits, releases, circles, source songs) attached
//! to a page of tracks. Fetched as four bulk queries fired together and
//! awaited together; only the merge depends on all of them, so no ordering
//! between the fetches is assumed.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use uuid::Uuid;

use crate::application::repos::{
    CirclesRepo, CreditRow, ReleaseCircleRow, ReleasesRepo, RepoError, TrackOriginRow, TracksRepo,
};
use crate::domain::entities::{ReleaseRecord, TrackRecord};

use super::CatalogError;
use super::merge::RelatedIndex;
use super::types::{CircleSummary, CreditView, OriginView, ReleaseSummary, TrackView};

pub(super) struct TrackBundle {
    credits: RelatedIndex<Uuid, CreditRow>,
    releases: HashMap<Uuid, ReleaseRecord>,
    circles: RelatedIndex<Uuid, ReleaseCircleRow>,
    origins: RelatedIndex<Uuid, TrackOriginRow>,
}

fn dedup_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

impl TrackBundle {
    /// Bulk-fetch all related collections for one page of tracks. Exactly
    /// four repository calls regardless of the page size.
    ///
    /// `seed_release_ids` joins the release key set even when no track on
    /// the page references it; the release detail view needs its circles
    /// even for a release with no tracks yet.
    pub async fn load(
        tracks_repo: &dyn TracksRepo,
        releases_repo: &dyn ReleasesRepo,
        circles_repo: &dyn CirclesRepo,
        page_tracks: &[TrackRecord],
        seed_release_ids: &[Uuid],
    ) -> Result<Self, CatalogError> {
        let track_ids = dedup_ids(page_tracks.iter().map(|track| track.id));
        let release_ids = dedup_ids(
            seed_release_ids
                .iter()
                .copied()
                .chain(page_tracks.iter().map(|track| track.release_id)),
        );

        let (credit_rows, release_rows, circle_rows, origin_rows) = tokio::try_join!(
            tracks_repo.credits_for_tracks(&track_ids),
            releases_repo.releases_by_ids(&release_ids),
            circles_repo.circles_for_releases(&release_ids),
            tracks_repo.origins_for_tracks(&track_ids),
        )?;

        Ok(Self {
            credits: RelatedIndex::build(credit_rows, |row| row.track_id),
            releases: release_rows
                .into_iter()
                .map(|release| (release.id, release))
                .collect(),
            circles: RelatedIndex::build(circle_rows, |row| row.release_id),
            origins: RelatedIndex::build(origin_rows, |row| row.track_id),
        })
    }

    pub fn circles_for_release(&self, release_id: Uuid) -> Vec<CircleSummary> {
        self.circles
            .get(&release_id)
            .map(|row| CircleSummary::from(&row.circle))
            .collect()
    }

    /// Project one track with its related groups attached.
    pub fn shape(&self, track: &TrackRecord) -> Result<TrackView, CatalogError> {
        let release = self.releases.get(&track.release_id).ok_or_else(|| {
            CatalogError::Repo(RepoError::Integrity {
                message: format!(
                    "track {} references release {} which was not fetched",
                    track.id, track.release_id
                ),
            })
        })?;

        Ok(TrackView {
            id: track.id,
            title: track.title.clone(),
            disc_number: track.disc_number,
            track_number: track.track_number,
            duration_seconds: track.duration_seconds,
            release: ReleaseSummary {
                id: release.id,
                title: release.title.clone(),
                release_date: release.release_date,
                circles: self.circles_for_release(release.id),
            },
            credits: self.shape_credits(track.id),
            origins: self
                .origins
                .get(&track.id)
                .map(|row| OriginView {
                    song_id: row.song_id,
                    song_title: row.song_title.clone(),
                    work_id: row.work_id,
                    work_title: row.work_title.clone(),
                })
                .collect(),
        })
    }

    /// Group credit rows by performer identity, deduplicating roles across
    /// rows. Role order is alphabetical; database order across credit rows
    /// is unspecified, so grouping by encoded name id keeps the credit list
    /// deterministic as well.
    fn shape_credits(&self, track_id: Uuid) -> Vec<CreditView> {
        let mut grouped: BTreeMap<String, (String, Uuid, bool, BTreeSet<String>)> = BTreeMap::new();
        for row in self.credits.get(&track_id) {
            let Some(name_ref) = row.name_ref() else {
                continue;
            };
            let entry = grouped.entry(name_ref.encode()).or_insert_with(|| {
                (
                    row.display_name.clone(),
                    row.parent_artist_id,
                    name_ref.is_main(),
                    BTreeSet::new(),
                )
            });
            entry.3.insert(row.role.clone());
        }

        let mut credits: Vec<CreditView> = grouped
            .into_iter()
            .map(
                |(name_id, (display_name, parent_artist_id, is_main_name, roles))| CreditView {
                    name_id,
                    display_name,
                    parent_artist_id,
                    is_main_name,
                    roles: roles.into_iter().collect(),
                },
            )
            .collect();
        credits.sort_by(|a, b| {
            (a.display_name.to_lowercase(), &a.name_id)
                .cmp(&(b.display_name.to_lowercase(), &b.name_id))
        });
        credits
    }
}
