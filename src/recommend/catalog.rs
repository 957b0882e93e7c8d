//! The catalog boundary the recommendation core depends on.
//!
//! [`Catalog`] is implemented over HTTP by [`crate::spotify::SpotifyClient`]
//! and by in-memory fakes in tests. The free functions here add the paging
//! and batching rules on top of the raw single-request operations; every
//! request they issue is awaited before the next one starts.

use std::future::Future;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    error::{CatalogError, CatalogResult},
    types::{
        AlbumTrack, AlbumTrackPage, AlbumTracksOptions, Artist, MAX_IDS_PER_REQUEST, Page,
        PlaylistItem, PlaylistItemsOptions, Track,
    },
};

/// Read access to the music catalog.
///
/// Each method maps to exactly one request. Implementations report non-2xx
/// answers as [`CatalogError::Status`] so callers can tell a missing entity
/// from a transient failure.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// One page of a playlist's items.
    async fn playlist_items(
        &self,
        playlist_id: &str,
        options: &PlaylistItemsOptions,
    ) -> CatalogResult<Page<PlaylistItem>>;

    /// One page of an album's track listing. Listings carry no popularity.
    async fn album_tracks(
        &self,
        album_id: &str,
        options: &AlbumTracksOptions,
    ) -> CatalogResult<AlbumTrackPage>;

    /// Full track records for at most [`MAX_IDS_PER_REQUEST`] ids, in request order.
    /// Unknown ids come back as empty slots.
    async fn several_tracks(
        &self,
        ids: &[String],
        market: Option<&str>,
    ) -> CatalogResult<Vec<Option<Track>>>;

    /// Full artist records for at most [`MAX_IDS_PER_REQUEST`] ids, in request order.
    async fn several_artists(&self, ids: &[String]) -> CatalogResult<Vec<Option<Artist>>>;
}

/// Outcome of a batched lookup.
#[derive(Debug)]
pub struct Batched<T> {
    /// Results of the successful batches, concatenated in batch order.
    pub items: Vec<Option<T>>,
    /// Number of requests issued.
    pub batches: usize,
    /// Errors of the rejected batches; those batches contributed nothing.
    pub failures: Vec<CatalogError>,
}

impl<T> Batched<T> {
    /// `true` when at least one request was issued and every one of them failed.
    pub fn all_failed(&self) -> bool {
        self.batches > 0 && self.failures.len() == self.batches
    }
}

async fn in_batches<T, F, Fut>(ids: &[String], mut fetch: F) -> Batched<T>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = CatalogResult<Vec<Option<T>>>>,
{
    let mut batched = Batched {
        items: Vec::with_capacity(ids.len()),
        batches: 0,
        failures: Vec::new(),
    };

    for (index, chunk) in ids.chunks(MAX_IDS_PER_REQUEST).enumerate() {
        batched.batches += 1;
        match fetch(chunk.to_vec()).await {
            Ok(items) => batched.items.extend(items),
            Err(e) => {
                warn!(batch = index, size = chunk.len(), "skipping batch: {}", e);
                batched.failures.push(e);
            }
        }
    }

    batched
}

/// Resolves full track records for any number of ids.
///
/// Ids are split into sequential requests of at most 50; a rejected request is
/// logged and skipped.
///
/// # Arguments
///
/// * `catalog` - Catalog to query
/// * `ids` - Track ids, any number
/// * `market` - Optional market code passed to every request
///
/// # Returns
///
/// A [`Batched`] whose `items` are the successful batches concatenated in
/// batch order. 120 ids issue three requests of 50, 50 and 20 ids.
///
/// # Example
///
/// ```
/// let ids: Vec<String> = listing.iter().map(|t| t.id.clone()).collect();
/// let batched = fetch_tracks_by_ids(&client, &ids, Some("SE")).await;
/// if batched.all_failed() {
///     warning!("no track could be resolved");
/// }
/// ```
pub async fn fetch_tracks_by_ids<C>(
    catalog: &C,
    ids: &[String],
    market: Option<&str>,
) -> Batched<Track>
where
    C: Catalog + ?Sized,
{
    in_batches(ids, move |chunk| async move {
        catalog.several_tracks(&chunk, market).await
    })
    .await
}

/// Resolves full artist records for any number of ids, 50 per request.
pub async fn fetch_artists_by_ids<C>(catalog: &C, ids: &[String]) -> Batched<Artist>
where
    C: Catalog + ?Sized,
{
    in_batches(ids, move |chunk| async move { catalog.several_artists(&chunk).await })
        .await
}

/// Every track slot of a playlist, following pagination.
///
/// Pages of `page_limit` items are requested one after another until the
/// requested offset plus the items received reaches the reported total.
/// Unresolvable entries stay as empty slots.
///
/// # Errors
///
/// The first failing page request is returned; no partial listing is kept.
pub async fn fetch_all_playlist_tracks<C>(
    catalog: &C,
    playlist_id: &str,
    market: Option<&str>,
    page_limit: u32,
) -> CatalogResult<Vec<Option<Track>>>
where
    C: Catalog + ?Sized,
{
    let mut tracks = Vec::new();
    let mut offset = 0;

    loop {
        let options = PlaylistItemsOptions {
            market: market.map(str::to_string),
            limit: Some(page_limit),
            offset: Some(offset),
        };
        let page = catalog.playlist_items(playlist_id, &options).await?;
        debug!(
            playlist_id,
            offset,
            items = page.items.len(),
            total = page.total,
            "playlist page"
        );

        let more = page.has_more_after(offset);
        offset += page.items.len() as u32;
        tracks.extend(page.items.into_iter().map(|item| item.track));

        if !more {
            return Ok(tracks);
        }
    }
}

/// Every track listed on an album, following pagination.
///
/// Paging works as in [`fetch_all_playlist_tracks`]. Listings carry no
/// popularity; resolve the ids with [`fetch_tracks_by_ids`] for that.
pub async fn fetch_all_album_tracks<C>(
    catalog: &C,
    album_id: &str,
    market: Option<&str>,
    page_limit: u32,
) -> CatalogResult<Vec<AlbumTrack>>
where
    C: Catalog + ?Sized,
{
    let mut tracks = Vec::new();
    let mut offset = 0;

    loop {
        let options = AlbumTracksOptions {
            market: market.map(str::to_string),
            limit: Some(page_limit),
            offset: Some(offset),
        };
        let page = catalog.album_tracks(album_id, &options).await?;
        debug!(
            album_id,
            offset,
            items = page.items.len(),
            total = page.total,
            "album page"
        );

        let more = page.has_more_after(offset);
        offset += page.items.len() as u32;
        tracks.extend(page.items);

        if !more {
            return Ok(tracks);
        }
    }
}
