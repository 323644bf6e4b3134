//! Cache key derivation.
//!
//! One pure function per query shape. Every key is
//! `public:<endpoint-tag>:<p1>=<p2>=...` with a fixed, load-bearing
//! parameter order: equal parameters always produce the identical string,
//! and the leading tag keeps distinct shapes from colliding. Absent optional
//! parameters serialize as the empty string rather than being omitted, so
//! "absent" and "explicitly empty" normalize identically.

use uuid::Uuid;

use crate::application::repos::{CircleSortBy, SortOrder};

const NAMESPACE: &str = "public";

/// Key prefixes used for wholesale invalidation after admin writes.
pub mod prefix {
    pub const ARTISTS: &str = "public:artists:";
    pub const ARTIST_TRACKS: &str = "public:artist-tracks:";
    pub const CIRCLES: &str = "public:circles:";
    pub const CIRCLE_TRACKS: &str = "public:circle-tracks:";
    pub const RELEASES: &str = "public:releases:";
    pub const RELEASE_DETAIL: &str = "public:release-detail:";
    pub const TRACK_DETAIL: &str = "public:track-detail:";
    pub const SONG_TRACKS: &str = "public:song-tracks:";
    pub const CATEGORIES: &str = "public:categories:";
}

fn derive(tag: &str, params: &[&str]) -> String {
    format!("{NAMESPACE}:{tag}:{}", params.join("="))
}

fn opt(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

pub fn categories() -> String {
    derive("categories", &[])
}

pub fn official_works() -> String {
    derive("works", &[])
}

pub fn artist_list(search: Option<&str>, page: u32, limit: u32) -> String {
    derive(
        "artists",
        &[opt(search), &page.to_string(), &limit.to_string()],
    )
}

pub fn artist_tracks(name_id: &str, page: u32, limit: u32) -> String {
    derive(
        "artist-tracks",
        &[name_id, &page.to_string(), &limit.to_string()],
    )
}

pub fn circle_list(
    search: Option<&str>,
    sort_by: CircleSortBy,
    sort_order: SortOrder,
    page: u32,
    limit: u32,
) -> String {
    derive(
        "circles",
        &[
            opt(search),
            sort_by.as_str(),
            sort_order.as_str(),
            &page.to_string(),
            &limit.to_string(),
        ],
    )
}

pub fn circle_tracks(circle_id: Uuid, page: u32, limit: u32) -> String {
    derive(
        "circle-tracks",
        &[
            &circle_id.to_string(),
            &page.to_string(),
            &limit.to_string(),
        ],
    )
}

pub fn release_list(circle_id: Option<Uuid>, year: Option<i32>, page: u32, limit: u32) -> String {
    let circle = circle_id.map(|id| id.to_string()).unwrap_or_default();
    let year = year.map(|y| y.to_string()).unwrap_or_default();
    derive(
        "releases",
        &[&circle, &year, &page.to_string(), &limit.to_string()],
    )
}

pub fn release_detail(release_id: Uuid) -> String {
    derive("release-detail", &[&release_id.to_string()])
}

pub fn track_detail(track_id: Uuid) -> String {
    derive("track-detail", &[&track_id.to_string()])
}

pub fn song_tracks(song_id: Uuid, page: u32, limit: u32) -> String {
    derive(
        "song-tracks",
        &[&song_id.to_string(), &page.to_string(), &limit.to_string()],
    )
}
