//! In-memory repository fakes.
//!
//! Bulk fetches count their invocations, which is what lets tests assert the
//! fixed-query-count property of page assembly instead of timing anything.
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use time::macros::datetime;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use corale::application::pagination::PageRequest;
use corale::application::repos::{
    ArtistsRepo, ArtistsWriteRepo, CategoriesRepo, CircleFilter, CircleSortBy,
    CircleWithReleaseCount, CirclesRepo, CirclesWriteRepo, CreateCircleParams, CreditRow,
    NameEntryFilter, NameEntryRow, OfficialRepo, ReleaseCircleRow, ReleaseFilter, ReleasesRepo,
    ReleasesWriteRepo, RepoError, SortOrder, TrackOriginRow, TracksRepo, UpdateArtistParams,
    UpdateCircleParams, UpdateReleaseParams,
};
use corale::domain::entities::{
    ArtistAliasRecord, ArtistRecord, CategoryRecord, CircleRecord, OfficialSongRecord,
    OfficialWorkRecord, ReleaseRecord, TrackRecord,
};
use corale::domain::names::NameRef;

pub const STAMP: OffsetDateTime = datetime!(2024-06-01 12:00:00 UTC);

pub fn artist(name: &str) -> ArtistRecord {
    ArtistRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        country: None,
        notes: None,
        created_at: STAMP,
        updated_at: STAMP,
    }
}

pub fn alias(artist_id: Uuid, name: &str) -> ArtistAliasRecord {
    ArtistAliasRecord {
        id: Uuid::new_v4(),
        artist_id,
        name: name.to_string(),
        alias_type: corale::domain::entities::AliasType::Stage,
        created_at: STAMP,
        updated_at: STAMP,
    }
}

pub fn circle(name: &str) -> CircleRecord {
    CircleRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        country: None,
        website: None,
        created_at: STAMP,
        updated_at: STAMP,
    }
}

pub fn release(title: &str, release_date: Option<Date>) -> ReleaseRecord {
    ReleaseRecord {
        id: Uuid::new_v4(),
        title: title.to_string(),
        catalog_number: None,
        event_name: None,
        release_date,
        category_id: None,
        created_at: STAMP,
        updated_at: STAMP,
    }
}

pub fn track(release_id: Uuid, track_number: i16, title: &str) -> TrackRecord {
    TrackRecord {
        id: Uuid::new_v4(),
        release_id,
        disc_number: 1,
        track_number,
        title: title.to_string(),
        duration_seconds: None,
        created_at: STAMP,
        updated_at: STAMP,
    }
}

pub fn work(title: &str) -> OfficialWorkRecord {
    OfficialWorkRecord {
        id: Uuid::new_v4(),
        title: title.to_string(),
        series: None,
        release_year: None,
    }
}

pub fn song(work_id: Uuid, title: &str) -> OfficialSongRecord {
    OfficialSongRecord {
        id: Uuid::new_v4(),
        work_id,
        title: title.to_string(),
        composer: None,
    }
}

pub fn category(name: &str, sort_order: i32) -> CategoryRecord {
    CategoryRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        sort_order,
    }
}

pub struct FakeCredit {
    pub track_id: Uuid,
    pub artist_id: Option<Uuid>,
    pub alias_id: Option<Uuid>,
    pub role: String,
}

#[derive(Default)]
pub struct Counters {
    pub credits_bulk: AtomicUsize,
    pub releases_bulk: AtomicUsize,
    pub circles_bulk: AtomicUsize,
    pub origins_bulk: AtomicUsize,
    pub songs_bulk: AtomicUsize,
    pub category_lists: AtomicUsize,
}

impl Counters {
    pub fn bulk_total(&self) -> usize {
        self.credits_bulk.load(Ordering::SeqCst)
            + self.releases_bulk.load(Ordering::SeqCst)
            + self.circles_bulk.load(Ordering::SeqCst)
            + self.origins_bulk.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeCatalogRepo {
    pub artists: Vec<ArtistRecord>,
    pub aliases: Vec<ArtistAliasRecord>,
    pub circles: Vec<CircleRecord>,
    /// (release_id, circle_id)
    pub release_circles: Vec<(Uuid, Uuid)>,
    pub releases: Vec<ReleaseRecord>,
    pub tracks: Vec<TrackRecord>,
    pub credits: Vec<FakeCredit>,
    pub works: Vec<OfficialWorkRecord>,
    pub songs: Vec<OfficialSongRecord>,
    /// (track_id, song_id)
    pub origins: Vec<(Uuid, Uuid)>,
    pub categories: Vec<CategoryRecord>,
    pub counters: Counters,
}

impl FakeCatalogRepo {
    fn page_slice<T: Clone>(items: Vec<T>, page: PageRequest) -> Vec<T> {
        items
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect()
    }

    fn credit_matches(credit: &FakeCredit, name: NameRef) -> bool {
        match name {
            NameRef::Main { artist_id } => credit.artist_id == Some(artist_id),
            NameRef::Alias { alias_id } => credit.alias_id == Some(alias_id),
        }
    }

    fn tracks_credited_to(&self, name: NameRef) -> Vec<TrackRecord> {
        self.tracks
            .iter()
            .filter(|track| {
                self.credits
                    .iter()
                    .any(|credit| credit.track_id == track.id && Self::credit_matches(credit, name))
            })
            .cloned()
            .collect()
    }

    fn release_count(&self, circle_id: Uuid) -> i64 {
        self.release_circles
            .iter()
            .filter(|(_, c)| *c == circle_id)
            .count() as i64
    }
}

#[async_trait]
impl ArtistsRepo for FakeCatalogRepo {
    async fn find_artist(&self, id: Uuid) -> Result<Option<ArtistRecord>, RepoError> {
        Ok(self.artists.iter().find(|a| a.id == id).cloned())
    }

    async fn find_alias(&self, id: Uuid) -> Result<Option<ArtistAliasRecord>, RepoError> {
        Ok(self.aliases.iter().find(|a| a.id == id).cloned())
    }

    async fn list_name_entries(
        &self,
        filter: &NameEntryFilter,
        page: PageRequest,
    ) -> Result<Vec<NameEntryRow>, RepoError> {
        let mut entries: Vec<NameEntryRow> = self
            .artists
            .iter()
            .map(|a| NameEntryRow {
                entry_id: a.id,
                display_name: a.name.clone(),
                parent_artist_id: a.id,
                parent_artist_name: a.name.clone(),
                is_main_name: true,
                alias_type: None,
            })
            .chain(self.aliases.iter().filter_map(|al| {
                let parent = self.artists.iter().find(|a| a.id == al.artist_id)?;
                Some(NameEntryRow {
                    entry_id: al.id,
                    display_name: al.name.clone(),
                    parent_artist_id: parent.id,
                    parent_artist_name: parent.name.clone(),
                    is_main_name: false,
                    alias_type: Some(al.alias_type),
                })
            }))
            .collect();

        if let Some(search) = filter.search.as_ref() {
            let needle = search.to_lowercase();
            entries.retain(|e| e.display_name.to_lowercase().contains(&needle));
        }
        entries.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        });

        Ok(Self::page_slice(entries, page))
    }

    async fn count_name_entries(&self, filter: &NameEntryFilter) -> Result<u64, RepoError> {
        let all = self
            .list_name_entries(filter, PageRequest::new(Some(1), Some(100)))
            .await?;
        Ok(all.len() as u64)
    }
}

#[async_trait]
impl CirclesRepo for FakeCatalogRepo {
    async fn find_circle(&self, id: Uuid) -> Result<Option<CircleRecord>, RepoError> {
        Ok(self.circles.iter().find(|c| c.id == id).cloned())
    }

    async fn list_circles(
        &self,
        filter: &CircleFilter,
        page: PageRequest,
    ) -> Result<Vec<CircleWithReleaseCount>, RepoError> {
        let mut rows: Vec<CircleWithReleaseCount> = self
            .circles
            .iter()
            .filter(|c| match filter.search.as_ref() {
                Some(search) => c.name.to_lowercase().contains(&search.to_lowercase()),
                None => true,
            })
            .map(|c| CircleWithReleaseCount {
                release_count: self.release_count(c.id),
                circle: c.clone(),
            })
            .collect();

        rows.sort_by(|a, b| {
            let ordering = match filter.sort_by {
                CircleSortBy::Name => a
                    .circle
                    .name
                    .to_lowercase()
                    .cmp(&b.circle.name.to_lowercase()),
                CircleSortBy::ReleaseCount => a.release_count.cmp(&b.release_count),
            };
            match filter.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(Self::page_slice(rows, page))
    }

    async fn count_circles(&self, filter: &CircleFilter) -> Result<u64, RepoError> {
        let all = self
            .list_circles(filter, PageRequest::new(Some(1), Some(100)))
            .await?;
        Ok(all.len() as u64)
    }

    async fn circles_for_releases(
        &self,
        release_ids: &[Uuid],
    ) -> Result<Vec<ReleaseCircleRow>, RepoError> {
        self.counters.circles_bulk.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .release_circles
            .iter()
            .filter(|(release_id, _)| release_ids.contains(release_id))
            .filter_map(|(release_id, circle_id)| {
                let circle = self.circles.iter().find(|c| c.id == *circle_id)?;
                Some(ReleaseCircleRow {
                    release_id: *release_id,
                    circle: circle.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl ReleasesRepo for FakeCatalogRepo {
    async fn find_release(&self, id: Uuid) -> Result<Option<ReleaseRecord>, RepoError> {
        Ok(self.releases.iter().find(|r| r.id == id).cloned())
    }

    async fn list_releases(
        &self,
        filter: &ReleaseFilter,
        page: PageRequest,
    ) -> Result<Vec<ReleaseRecord>, RepoError> {
        let rows: Vec<ReleaseRecord> = self
            .releases
            .iter()
            .filter(|r| match filter.circle_id {
                Some(circle_id) => self
                    .release_circles
                    .iter()
                    .any(|(rel, cir)| *rel == r.id && *cir == circle_id),
                None => true,
            })
            .filter(|r| match filter.year {
                Some(year) => r.release_date.is_some_and(|d| d.year() == year),
                None => true,
            })
            .cloned()
            .collect();
        Ok(Self::page_slice(rows, page))
    }

    async fn count_releases(&self, filter: &ReleaseFilter) -> Result<u64, RepoError> {
        let all = self
            .list_releases(filter, PageRequest::new(Some(1), Some(100)))
            .await?;
        Ok(all.len() as u64)
    }

    async fn releases_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ReleaseRecord>, RepoError> {
        self.counters.releases_bulk.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .releases
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TracksRepo for FakeCatalogRepo {
    async fn find_track(&self, id: Uuid) -> Result<Option<TrackRecord>, RepoError> {
        Ok(self.tracks.iter().find(|t| t.id == id).cloned())
    }

    async fn tracks_for_release(&self, release_id: Uuid) -> Result<Vec<TrackRecord>, RepoError> {
        let mut rows: Vec<TrackRecord> = self
            .tracks
            .iter()
            .filter(|t| t.release_id == release_id)
            .cloned()
            .collect();
        rows.sort_by_key(|t| (t.disc_number, t.track_number));
        Ok(rows)
    }

    async fn tracks_for_name(
        &self,
        name: NameRef,
        page: PageRequest,
    ) -> Result<Vec<TrackRecord>, RepoError> {
        Ok(Self::page_slice(self.tracks_credited_to(name), page))
    }

    async fn count_tracks_for_name(&self, name: NameRef) -> Result<u64, RepoError> {
        Ok(self.tracks_credited_to(name).len() as u64)
    }

    async fn release_dates_for_name(&self, name: NameRef) -> Result<Vec<Option<Date>>, RepoError> {
        let credited = self.tracks_credited_to(name);
        Ok(self
            .releases
            .iter()
            .filter(|r| credited.iter().any(|t| t.release_id == r.id))
            .map(|r| r.release_date)
            .collect())
    }

    async fn tracks_for_circle(
        &self,
        circle_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<TrackRecord>, RepoError> {
        let rows: Vec<TrackRecord> = self
            .tracks
            .iter()
            .filter(|t| {
                self.release_circles
                    .iter()
                    .any(|(rel, cir)| *rel == t.release_id && *cir == circle_id)
            })
            .cloned()
            .collect();
        Ok(Self::page_slice(rows, page))
    }

    async fn count_tracks_for_circle(&self, circle_id: Uuid) -> Result<u64, RepoError> {
        let all = self
            .tracks_for_circle(circle_id, PageRequest::new(Some(1), Some(100)))
            .await?;
        Ok(all.len() as u64)
    }

    async fn tracks_for_song(
        &self,
        song_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<TrackRecord>, RepoError> {
        let rows: Vec<TrackRecord> = self
            .tracks
            .iter()
            .filter(|t| {
                self.origins
                    .iter()
                    .any(|(track, song)| *track == t.id && *song == song_id)
            })
            .cloned()
            .collect();
        Ok(Self::page_slice(rows, page))
    }

    async fn count_tracks_for_song(&self, song_id: Uuid) -> Result<u64, RepoError> {
        let all = self
            .tracks_for_song(song_id, PageRequest::new(Some(1), Some(100)))
            .await?;
        Ok(all.len() as u64)
    }

    async fn credits_for_tracks(&self, track_ids: &[Uuid]) -> Result<Vec<CreditRow>, RepoError> {
        self.counters.credits_bulk.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .credits
            .iter()
            .filter(|credit| track_ids.contains(&credit.track_id))
            .filter_map(|credit| {
                let (parent, display_name) = match (credit.artist_id, credit.alias_id) {
                    (Some(artist_id), None) => {
                        let artist = self.artists.iter().find(|a| a.id == artist_id)?;
                        (artist.id, artist.name.clone())
                    }
                    (None, Some(alias_id)) => {
                        let alias = self.aliases.iter().find(|a| a.id == alias_id)?;
                        (alias.artist_id, alias.name.clone())
                    }
                    _ => return None,
                };
                Some(CreditRow {
                    track_id: credit.track_id,
                    artist_id: credit.artist_id,
                    alias_id: credit.alias_id,
                    parent_artist_id: parent,
                    display_name,
                    role: credit.role.clone(),
                })
            })
            .collect())
    }

    async fn origins_for_tracks(
        &self,
        track_ids: &[Uuid],
    ) -> Result<Vec<TrackOriginRow>, RepoError> {
        self.counters.origins_bulk.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .origins
            .iter()
            .filter(|(track_id, _)| track_ids.contains(track_id))
            .filter_map(|(track_id, song_id)| {
                let song = self.songs.iter().find(|s| s.id == *song_id)?;
                let work = self.works.iter().find(|w| w.id == song.work_id)?;
                Some(TrackOriginRow {
                    track_id: *track_id,
                    song_id: song.id,
                    song_title: song.title.clone(),
                    work_id: work.id,
                    work_title: work.title.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl OfficialRepo for FakeCatalogRepo {
    async fn find_song(&self, id: Uuid) -> Result<Option<OfficialSongRecord>, RepoError> {
        Ok(self.songs.iter().find(|s| s.id == id).cloned())
    }

    async fn find_work(&self, id: Uuid) -> Result<Option<OfficialWorkRecord>, RepoError> {
        Ok(self.works.iter().find(|w| w.id == id).cloned())
    }

    async fn list_works(&self) -> Result<Vec<OfficialWorkRecord>, RepoError> {
        Ok(self.works.clone())
    }

    async fn songs_for_works(
        &self,
        work_ids: &[Uuid],
    ) -> Result<Vec<OfficialSongRecord>, RepoError> {
        self.counters.songs_bulk.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .songs
            .iter()
            .filter(|s| work_ids.contains(&s.work_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CategoriesRepo for FakeCatalogRepo {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        self.counters.category_lists.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.categories.clone();
        rows.sort_by(|a, b| (a.sort_order, &a.name).cmp(&(b.sort_order, &b.name)));
        Ok(rows)
    }
}

/// Mutable fake for the admin surface. Only `find_*` reads and the write
/// methods carry behavior; list reads are unused by the mutation paths.
#[derive(Default)]
pub struct FakeAdminRepo {
    pub artists: Mutex<Vec<ArtistRecord>>,
    pub circles: Mutex<Vec<CircleRecord>>,
    pub releases: Mutex<Vec<ReleaseRecord>>,
}

fn locked<T>(mutex: &Mutex<Vec<T>>) -> std::sync::MutexGuard<'_, Vec<T>> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ArtistsRepo for FakeAdminRepo {
    async fn find_artist(&self, id: Uuid) -> Result<Option<ArtistRecord>, RepoError> {
        Ok(locked(&self.artists).iter().find(|a| a.id == id).cloned())
    }

    async fn find_alias(&self, _id: Uuid) -> Result<Option<ArtistAliasRecord>, RepoError> {
        Ok(None)
    }

    async fn list_name_entries(
        &self,
        _filter: &NameEntryFilter,
        _page: PageRequest,
    ) -> Result<Vec<NameEntryRow>, RepoError> {
        Ok(Vec::new())
    }

    async fn count_name_entries(&self, _filter: &NameEntryFilter) -> Result<u64, RepoError> {
        Ok(0)
    }
}

#[async_trait]
impl CirclesRepo for FakeAdminRepo {
    async fn find_circle(&self, id: Uuid) -> Result<Option<CircleRecord>, RepoError> {
        Ok(locked(&self.circles).iter().find(|c| c.id == id).cloned())
    }

    async fn list_circles(
        &self,
        _filter: &CircleFilter,
        _page: PageRequest,
    ) -> Result<Vec<CircleWithReleaseCount>, RepoError> {
        Ok(Vec::new())
    }

    async fn count_circles(&self, _filter: &CircleFilter) -> Result<u64, RepoError> {
        Ok(0)
    }

    async fn circles_for_releases(
        &self,
        _release_ids: &[Uuid],
    ) -> Result<Vec<ReleaseCircleRow>, RepoError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl ReleasesRepo for FakeAdminRepo {
    async fn find_release(&self, id: Uuid) -> Result<Option<ReleaseRecord>, RepoError> {
        Ok(locked(&self.releases).iter().find(|r| r.id == id).cloned())
    }

    async fn list_releases(
        &self,
        _filter: &ReleaseFilter,
        _page: PageRequest,
    ) -> Result<Vec<ReleaseRecord>, RepoError> {
        Ok(Vec::new())
    }

    async fn count_releases(&self, _filter: &ReleaseFilter) -> Result<u64, RepoError> {
        Ok(0)
    }

    async fn releases_by_ids(&self, _ids: &[Uuid]) -> Result<Vec<ReleaseRecord>, RepoError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl ArtistsWriteRepo for FakeAdminRepo {
    async fn update_artist(&self, params: UpdateArtistParams) -> Result<ArtistRecord, RepoError> {
        let mut artists = locked(&self.artists);
        let record = artists
            .iter_mut()
            .find(|a| a.id == params.id)
            .ok_or(RepoError::NotFound)?;
        record.name = params.name;
        record.country = params.country;
        record.notes = params.notes;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }
}

#[async_trait]
impl CirclesWriteRepo for FakeAdminRepo {
    async fn create_circle(&self, params: CreateCircleParams) -> Result<CircleRecord, RepoError> {
        let record = CircleRecord {
            id: Uuid::new_v4(),
            name: params.name,
            country: params.country,
            website: params.website,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        locked(&self.circles).push(record.clone());
        Ok(record)
    }

    async fn update_circle(&self, params: UpdateCircleParams) -> Result<CircleRecord, RepoError> {
        let mut circles = locked(&self.circles);
        let record = circles
            .iter_mut()
            .find(|c| c.id == params.id)
            .ok_or(RepoError::NotFound)?;
        record.name = params.name;
        record.country = params.country;
        record.website = params.website;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn delete_circle(&self, id: Uuid) -> Result<(), RepoError> {
        let mut circles = locked(&self.circles);
        let before = circles.len();
        circles.retain(|c| c.id != id);
        if circles.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ReleasesWriteRepo for FakeAdminRepo {
    async fn update_release(
        &self,
        params: UpdateReleaseParams,
    ) -> Result<ReleaseRecord, RepoError> {
        let mut releases = locked(&self.releases);
        let record = releases
            .iter_mut()
            .find(|r| r.id == params.id)
            .ok_or(RepoError::NotFound)?;
        record.title = params.title;
        record.catalog_number = params.catalog_number;
        record.event_name = params.event_name;
        record.release_date = params.release_date;
        record.category_id = params.category_id;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }
}
