//! End-to-end aggregation pipeline tests over in-memory repositories.

mod fakes;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use time::macros::date;
use uuid::Uuid;

use corale::application::catalog::{
    ArtistListParams, CatalogDeps, CatalogError, CircleListParams, PublicCatalog,
};
use corale::application::pagination::PageRequest;
use corale::application::repos::{CircleSortBy, SortOrder};
use corale::cache::{CacheConfig, TtlStore};
use corale::domain::names::NameRef;

use fakes::{FakeCatalogRepo, FakeCredit, artist, category, circle, release, song, track, work};

fn catalog(repo: Arc<FakeCatalogRepo>, cache_enabled: bool) -> PublicCatalog {
    PublicCatalog::new(CatalogDeps {
        artists: repo.clone(),
        circles: repo.clone(),
        releases: repo.clone(),
        tracks: repo.clone(),
        official: repo.clone(),
        categories: repo,
        store: Arc::new(TtlStore::new()),
        cache: CacheConfig {
            enabled: cache_enabled,
            ..CacheConfig::default()
        },
    })
}

fn default_page() -> PageRequest {
    PageRequest::new(None, None)
}

/// A release with `track_count` tracks, each credited to one artist and
/// derived from one official song.
fn release_scenario(track_count: i16) -> (FakeCatalogRepo, Uuid) {
    let performer = artist("Performer");
    let group = circle("Group");
    let album = release("Album", Some(date!(2023 - 05 - 01)));
    let source_work = work("Work");
    let source_song = song(source_work.id, "Song");

    let mut repo = FakeCatalogRepo::default();
    repo.release_circles.push((album.id, group.id));
    for n in 1..=track_count {
        let t = track(album.id, n, &format!("Track {n}"));
        repo.credits.push(FakeCredit {
            track_id: t.id,
            artist_id: Some(performer.id),
            alias_id: None,
            role: "arrange".to_string(),
        });
        repo.origins.push((t.id, source_song.id));
        repo.tracks.push(t);
    }

    let release_id = album.id;
    repo.artists.push(performer);
    repo.circles.push(group);
    repo.releases.push(album);
    repo.songs.push(source_song);
    repo.works.push(source_work);
    (repo, release_id)
}

#[tokio::test]
async fn release_detail_query_count_does_not_scale_with_track_count() {
    let (small_repo, small_id) = release_scenario(1);
    let (large_repo, large_id) = release_scenario(50);
    let small_repo = Arc::new(small_repo);
    let large_repo = Arc::new(large_repo);

    catalog(small_repo.clone(), false)
        .release_detail(small_id)
        .await
        .expect("small release detail");
    catalog(large_repo.clone(), false)
        .release_detail(large_id)
        .await
        .expect("large release detail");

    // One bulk fetch per related collection, regardless of page size.
    assert_eq!(small_repo.counters.bulk_total(), 4);
    assert_eq!(large_repo.counters.bulk_total(), 4);
}

#[tokio::test]
async fn release_detail_embeds_credits_circles_and_origins() {
    let (repo, release_id) = release_scenario(2);
    let performer_id = repo.artists[0].id;
    let repo = Arc::new(repo);

    let view = catalog(repo, false)
        .release_detail(release_id)
        .await
        .expect("release detail");

    assert_eq!(view["circles"][0]["name"], "Group");
    assert_eq!(view["tracks"].as_array().map(Vec::len), Some(2));
    let first = &view["tracks"][0];
    assert_eq!(first["credits"][0]["display_name"], "Performer");
    assert_eq!(
        first["credits"][0]["parent_artist_id"],
        performer_id.to_string()
    );
    assert_eq!(first["credits"][0]["roles"][0], "arrange");
    assert_eq!(first["origins"][0]["song_title"], "Song");
    assert_eq!(first["release"]["circles"][0]["name"], "Group");
}

#[tokio::test]
async fn alias_credit_links_back_to_its_parent_artist() {
    let performer = artist("Performer");
    let stage = fakes::alias(performer.id, "Stage Name");
    let album = release("Album", None);
    let credited = track(album.id, 1, "Track");

    let mut repo = FakeCatalogRepo::default();
    repo.credits.push(FakeCredit {
        track_id: credited.id,
        artist_id: None,
        alias_id: Some(stage.id),
        role: "vocal".to_string(),
    });
    let track_id = credited.id;
    let performer_id = performer.id;
    let stage_id = stage.id;
    repo.artists.push(performer);
    repo.aliases.push(stage);
    repo.releases.push(album);
    repo.tracks.push(credited);

    let view = catalog(Arc::new(repo), false)
        .track_detail(track_id)
        .await
        .expect("track detail");

    let credit = &view["credits"][0];
    assert_eq!(credit["name_id"], stage_id.to_string());
    assert_eq!(credit["display_name"], "Stage Name");
    assert_eq!(credit["parent_artist_id"], performer_id.to_string());
    assert_eq!(credit["is_main_name"], false);
}

#[tokio::test]
async fn circle_list_sorts_by_release_count() {
    let quiet = circle("Alpha");
    let busy = circle("Beta");
    let first = release("One", None);
    let second = release("Two", None);
    let third = release("Three", None);

    let mut repo = FakeCatalogRepo::default();
    repo.release_circles.push((first.id, quiet.id));
    repo.release_circles.push((second.id, busy.id));
    repo.release_circles.push((third.id, busy.id));
    repo.releases.extend([first, second, third]);
    repo.circles.extend([quiet, busy]);

    let view = catalog(Arc::new(repo), false)
        .list_circles(CircleListParams {
            search: None,
            sort_by: CircleSortBy::ReleaseCount,
            sort_order: SortOrder::Desc,
            page: default_page(),
        })
        .await
        .expect("circle list");

    assert_eq!(view["total"], 2);
    assert_eq!(view["data"][0]["name"], "Beta");
    assert_eq!(view["data"][0]["release_count"], 2);
    assert_eq!(view["data"][1]["release_count"], 1);
}

#[tokio::test]
async fn cached_reads_skip_the_repository_and_return_identical_payloads() {
    let mut repo = FakeCatalogRepo::default();
    repo.categories.push(category("Album", 1));
    repo.categories.push(category("Single", 2));
    let repo = Arc::new(repo);

    let service = catalog(repo.clone(), true);
    let first = service.list_categories().await.expect("first read");
    let second = service.list_categories().await.expect("second read");

    assert_eq!(first, second);
    assert_eq!(repo.counters.category_lists.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn disabled_cache_recomputes_every_read() {
    let mut repo = FakeCatalogRepo::default();
    repo.categories.push(category("Album", 1));
    let repo = Arc::new(repo);

    let service = catalog(repo.clone(), false);
    service.list_categories().await.expect("first read");
    service.list_categories().await.expect("second read");

    assert_eq!(repo.counters.category_lists.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn artist_list_unions_main_names_and_aliases() {
    let performer = artist("Zun Mei");
    let stage = fakes::alias(performer.id, "A-Side");
    let performer_id = performer.id;
    let stage_id = stage.id;

    let mut repo = FakeCatalogRepo::default();
    repo.artists.push(performer);
    repo.aliases.push(stage);

    let view = catalog(Arc::new(repo), false)
        .list_artists(ArtistListParams {
            search: None,
            page: default_page(),
        })
        .await
        .expect("artist list");

    assert_eq!(view["total"], 2);
    // Sorted case-insensitively: the alias comes first.
    assert_eq!(view["data"][0]["id"], stage_id.to_string());
    assert_eq!(view["data"][0]["is_main_name"], false);
    assert_eq!(view["data"][0]["alias_type"], "stage");
    assert_eq!(
        view["data"][1]["id"],
        NameRef::main(performer_id).encode()
    );
    assert_eq!(view["data"][1]["is_main_name"], true);
    // Main-name entries carry no alias type at all.
    assert!(view["data"][1].get("alias_type").is_none());
}

#[tokio::test]
async fn artist_tracks_derives_first_and_latest_release_dates() {
    let performer = artist("Performer");
    let early = release("Early", Some(date!(2020 - 01 - 01)));
    let late = release("Late", Some(date!(2022 - 05 - 05)));
    let undated = release("Undated", None);

    let mut repo = FakeCatalogRepo::default();
    for album in [&early, &late, &undated] {
        let t = track(album.id, 1, "Track");
        repo.credits.push(FakeCredit {
            track_id: t.id,
            artist_id: Some(performer.id),
            alias_id: None,
            role: "vocal".to_string(),
        });
        repo.tracks.push(t);
    }
    let name_id = NameRef::main(performer.id).encode();
    repo.artists.push(performer);
    repo.releases.extend([early, late, undated]);

    let view = catalog(Arc::new(repo), false)
        .artist_tracks(&name_id, default_page())
        .await
        .expect("artist tracks");

    assert_eq!(view["first_release_date"], "2020-01-01");
    assert_eq!(view["latest_release_date"], "2022-05-05");
    assert_eq!(view["total"], 3);
    assert_eq!(view["artist"]["is_main_name"], true);
}

#[tokio::test]
async fn dangling_alias_is_not_found() {
    let orphan = fakes::alias(Uuid::new_v4(), "Orphan");
    let name_id = NameRef::alias(orphan.id).encode();

    let mut repo = FakeCatalogRepo::default();
    repo.aliases.push(orphan);

    let err = catalog(Arc::new(repo), false)
        .artist_tracks(&name_id, default_page())
        .await
        .expect_err("orphan alias must not resolve");
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn malformed_name_id_is_not_found() {
    let repo = Arc::new(FakeCatalogRepo::default());

    let err = catalog(repo, false)
        .artist_tracks("definitely-not-a-uuid", default_page())
        .await
        .expect_err("malformed id must not resolve");
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn official_works_embed_their_songs_in_one_bulk_fetch() {
    let first_work = work("First");
    let second_work = work("Second");

    let mut repo = FakeCatalogRepo::default();
    repo.songs.push(song(first_work.id, "Opening"));
    repo.songs.push(song(first_work.id, "Ending"));
    repo.songs.push(song(second_work.id, "Theme"));
    repo.works.extend([first_work, second_work]);
    let repo = Arc::new(repo);

    let view = catalog(repo.clone(), false)
        .list_official_works()
        .await
        .expect("official works");

    assert_eq!(view.as_array().map(Vec::len), Some(2));
    assert_eq!(view[0]["songs"].as_array().map(Vec::len), Some(2));
    assert_eq!(repo.counters.songs_bulk.load(Ordering::SeqCst), 1);
}
